//! Case Warden core: incident intake, investigation lifecycle, audit trail,
//! and notifications.
//!
//! The crate is organized around a single state machine. Incidents are
//! reported into `Open`, move to `UnderInvestigation` on assignment, to
//! `Pending` when the investigator submits a report, and end `Closed` on
//! approval or bounce back through `Reopened` on rejection. The
//! [`engine::CaseLifecycleEngine`] is the only writer of status; everything
//! else (audit, notifications, storage) hangs off its transitions.
//!
//! Persistence, the user directory, and the vehicle registry are consumed
//! through traits in [`db`] and [`directory`]; the in-memory implementations
//! double as the reference semantics and the test backends.

pub mod audit;
pub mod auth;
pub mod db;
pub mod directory;
pub mod dispatch;
pub mod engine;
pub mod incident;
pub mod notify;

pub use audit::{AuditAction, AuditEvent, AuditLogEntry, AuditRecorder};
pub use auth::{Actor, Role, UserRef};
pub use db::{
    AuditQuery, AuditRepository, IncidentFilter, IncidentRepository, IncidentUpdate,
    MemoryAuditRepository, MemoryIncidentRepository, MemoryNotificationRepository,
    NotificationRepository, PaginatedResult, Pagination, StoreError,
};
pub use directory::{Directory, MemoryDirectory, MemoryVehicleLookup, VehicleLookup};
pub use dispatch::ChannelRegistry;
pub use engine::{
    CaseLifecycleEngine, EngineConfig, EngineError, ReportSubmission, ReviewDecision,
    ReviewSubmission,
};
pub use incident::{
    CaseFile, CaseFileStatus, CasePriority, Evidence, EvidenceKind, Incident, IncidentStatus,
    IncidentType, InvestigationReport, InvolvementRole, Location, NewIncident, Note,
    OfficerReview, PersonInvolved, PersonRole, ReportStatus, ReviewStatus, Severity,
    TimelineEntry, UpdateIncident, VehicleInvolvement,
};
pub use notify::{Notification, NotificationKind, Notifier};

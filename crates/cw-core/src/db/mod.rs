//! Persistence contracts for Case Warden.
//!
//! The underlying document store is an external concern; the core consumes it
//! only through these repository traits, which require atomic single-document
//! conditional update, atomic array-append, and atomic sequence increment.
//! The in-memory implementations are the reference implementations of that
//! contract and back the test suites.

mod error;
mod pagination;

pub mod audit_repo;
pub mod incident_repo;
pub mod notification_repo;

pub use error::StoreError;
pub use pagination::{PaginatedResult, Pagination, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

pub use audit_repo::{AuditQuery, AuditRepository, MemoryAuditRepository, MAX_AUDIT_RESULTS};
pub use incident_repo::{
    IncidentFilter, IncidentRepository, IncidentUpdate, MemoryIncidentRepository,
};
pub use notification_repo::{MemoryNotificationRepository, NotificationRepository};

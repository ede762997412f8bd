//! Incident data models for Case Warden.
//!
//! This module defines the core data structures used throughout the system to
//! represent investigation cases: the incident document, its embedded case
//! file, the append-only timeline, and the intake/update payload shapes.
//!
//! ## Legacy field shapes
//!
//! Historical records were written through more than one schema shape: a
//! single `vehicle` reference vs. a `vehicles[]` list, a `type` field vs. an
//! `incident_type` field, and a date-only `occurred_date` vs. a full
//! `occurred_at` timestamp. Every write path keeps both shapes in sync via
//! [`Incident::normalize`]: the canonical field is written and mirrored into
//! the legacy-named field whenever only one side is populated. This is a
//! compatibility policy, not an error.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Category of a reported incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentType {
    Theft,
    Accident,
    Vandalism,
    TrafficViolation,
    Dui,
    Abandoned,
    SuspiciousActivity,
    Other,
}

impl IncidentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentType::Theft => "theft",
            IncidentType::Accident => "accident",
            IncidentType::Vandalism => "vandalism",
            IncidentType::TrafficViolation => "traffic_violation",
            IncidentType::Dui => "dui",
            IncidentType::Abandoned => "abandoned",
            IncidentType::SuspiciousActivity => "suspicious_activity",
            IncidentType::Other => "other",
        }
    }
}

impl fmt::Display for IncidentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Severity of an incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// Top-level lifecycle status of an incident.
///
/// Single source of truth for where the incident is in its life. Must stay
/// consistent with the embedded [`CaseFileStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentStatus {
    /// Newly reported, no investigator assigned.
    Open,
    /// An investigator has been assigned and is working the case.
    UnderInvestigation,
    /// A report has been submitted and awaits officer review.
    Pending,
    /// Review approved the report; the case is closed.
    Closed,
    /// Review rejected the report; the case is back with the investigator.
    Reopened,
}

impl IncidentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentStatus::Open => "open",
            IncidentStatus::UnderInvestigation => "under_investigation",
            IncidentStatus::Pending => "pending",
            IncidentStatus::Closed => "closed",
            IncidentStatus::Reopened => "reopened",
        }
    }
}

impl fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Geographic location of an incident.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    /// Free-text address as reported.
    pub address: String,
}

/// How a vehicle was involved in an incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvolvementRole {
    Stolen,
    Damaged,
    Suspect,
    Witness,
    Other,
}

/// A vehicle reference with its involvement role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleInvolvement {
    /// Opaque reference into the external vehicle registry.
    pub vehicle: Uuid,
    pub role: InvolvementRole,
}

/// Role of a person attached to an incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonRole {
    Suspect,
    Victim,
    Witness,
    Driver,
    Owner,
    Other,
}

/// A person involved in an incident.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonInvolved {
    pub name: String,
    pub role: PersonRole,
    pub contact: Option<String>,
}

/// Type of an evidence attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceKind {
    Photo,
    Video,
    Document,
    Physical,
    Statement,
    Other,
}

/// An evidence attachment. The core stores only an opaque URL reference;
/// object storage and content validation are external concerns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evidence {
    pub kind: EvidenceKind,
    pub url: String,
    pub description: Option<String>,
    pub collected_by: Uuid,
    pub collected_at: DateTime<Utc>,
}

/// One entry in an incident's append-only timeline.
///
/// Entries are never edited or removed, only appended. Every status
/// transition produces exactly one entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub timestamp: DateTime<Utc>,
    /// Short machine-readable action label, e.g. `investigator_assigned`.
    pub action: String,
    pub description: String,
    pub actor: Uuid,
}

impl TimelineEntry {
    pub fn new(action: impl Into<String>, description: impl Into<String>, actor: Uuid) -> Self {
        Self {
            timestamp: Utc::now(),
            action: action.into(),
            description: description.into(),
            actor,
        }
    }
}

/// A free-form annotation on an incident.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub author: Uuid,
    pub text: String,
    /// Private notes are visible only to staff roles.
    pub private: bool,
    pub created_at: DateTime<Utc>,
}

impl Note {
    pub fn new(author: Uuid, text: impl Into<String>, private: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            author,
            text: text.into(),
            private,
            created_at: Utc::now(),
        }
    }
}

/// Status of the embedded case file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseFileStatus {
    NotAssigned,
    Assigned,
    UnderInvestigation,
    ReportSubmitted,
    ReviewComplete,
    Closed,
}

impl fmt::Display for CaseFileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CaseFileStatus::NotAssigned => "not_assigned",
            CaseFileStatus::Assigned => "assigned",
            CaseFileStatus::UnderInvestigation => "under_investigation",
            CaseFileStatus::ReportSubmitted => "report_submitted",
            CaseFileStatus::ReviewComplete => "review_complete",
            CaseFileStatus::Closed => "closed",
        };
        write!(f, "{}", s)
    }
}

/// Investigation priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CasePriority {
    Low,
    Medium,
    High,
    Urgent,
}

/// Status of the investigation report within the case file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pending,
    Submitted,
    Reviewed,
    Approved,
    Rejected,
}

/// The investigator's report, set once on submission and advanced by review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestigationReport {
    pub submitted_by: Uuid,
    pub submitted_at: DateTime<Utc>,
    pub content: String,
    pub findings: String,
    pub recommendations: String,
    pub conclusion: String,
    /// Opaque URL references into object storage.
    pub attachments: Vec<String>,
    pub status: ReportStatus,
}

/// Status of the officer review record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Pending,
    InProgress,
    Completed,
}

/// The officer's review record, set only during report review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfficerReview {
    pub reviewed_by: Uuid,
    pub reviewed_at: DateTime<Utc>,
    pub actions: String,
    pub notes: Option<String>,
    pub conclusion: String,
    pub status: ReviewStatus,
}

/// Investigation sub-record embedded in an incident.
///
/// Present once assignment has occurred; absent before that.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseFile {
    pub status: CaseFileStatus,
    pub priority: CasePriority,
    pub assigned_investigator: Option<Uuid>,
    pub investigation_start: Option<DateTime<Utc>>,
    pub investigation_end: Option<DateTime<Utc>>,
    pub report: Option<InvestigationReport>,
    pub officer_review: Option<OfficerReview>,
    /// Number of times review has sent the case back to the investigator.
    pub reopen_count: u32,
}

impl CaseFile {
    /// Creates a case file for a fresh assignment.
    pub fn assigned(investigator: Uuid, priority: CasePriority) -> Self {
        Self {
            status: CaseFileStatus::Assigned,
            priority,
            assigned_investigator: Some(investigator),
            investigation_start: Some(Utc::now()),
            investigation_end: None,
            report: None,
            officer_review: None,
            reopen_count: 0,
        }
    }
}

/// Represents an investigation case being tracked through its lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Incident {
    /// Opaque, stable identifier.
    pub id: Uuid,
    /// Human-readable unique number, `INC-YYMM-NNNN`. Never reused.
    pub incident_number: String,
    pub title: String,
    pub description: String,
    /// Canonical incident category.
    pub incident_type: IncidentType,
    /// Legacy `type` field, mirrored from `incident_type` on every write.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub legacy_type: Option<IncidentType>,
    pub severity: Severity,
    pub location: Location,
    /// Canonical vehicle list.
    pub vehicles: Vec<VehicleInvolvement>,
    /// Legacy single-vehicle reference, mirrored from `vehicles[0]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle: Option<Uuid>,
    pub persons: Vec<PersonInvolved>,
    pub evidence: Vec<Evidence>,
    /// The reporting user. Required, immutable after creation.
    pub reported_by: Uuid,
    /// Set only by the assignment transition.
    pub assigned_to: Option<Uuid>,
    pub assigned_by: Option<Uuid>,
    pub status: IncidentStatus,
    /// Present once assignment has occurred.
    pub case_file: Option<CaseFile>,
    /// Append-only ordered log of actions taken on this incident.
    pub timeline: Vec<TimelineEntry>,
    pub notes: Vec<Note>,
    /// Canonical occurrence timestamp.
    pub occurred_at: Option<DateTime<Utc>>,
    /// Legacy date-only field, mirrored from `occurred_at`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurred_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Incident {
    /// Keeps canonical and legacy field shapes in sync.
    ///
    /// Applied on every write path: whichever side of a legacy pair is
    /// populated is treated as the source, and the other side is filled in.
    /// When both are populated the canonical field wins.
    pub fn normalize(&mut self) {
        // vehicles[] <-> vehicle
        if self.vehicles.is_empty() {
            if let Some(vehicle) = self.vehicle {
                self.vehicles.push(VehicleInvolvement {
                    vehicle,
                    role: InvolvementRole::Other,
                });
            }
        }
        self.vehicle = self.vehicles.first().map(|v| v.vehicle);

        // incident_type <-> type
        self.legacy_type = Some(self.incident_type);

        // occurred_at <-> occurred_date
        if self.occurred_at.is_none() {
            if let Some(date) = self.occurred_date {
                self.occurred_at = date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
            }
        }
        self.occurred_date = self.occurred_at.map(|dt| dt.date_naive());
    }

    /// The case file's current status, `NotAssigned` when absent.
    pub fn case_status(&self) -> CaseFileStatus {
        self.case_file
            .as_ref()
            .map(|c| c.status)
            .unwrap_or(CaseFileStatus::NotAssigned)
    }
}

/// Intake payload for creating an incident.
///
/// Accepts both the canonical and the legacy field shapes; creation
/// normalizes whichever side is populated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewIncident {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incident_type: Option<IncidentType>,
    /// Legacy `type` field.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub legacy_type: Option<IncidentType>,
    pub severity: Option<Severity>,
    pub location: Option<Location>,
    #[serde(default)]
    pub vehicles: Vec<VehicleInvolvement>,
    /// Legacy single-vehicle reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle: Option<Uuid>,
    #[serde(default)]
    pub persons: Vec<PersonInvolved>,
    #[serde(default)]
    pub evidence: Vec<Evidence>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurred_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurred_date: Option<NaiveDate>,
}

/// Free-field update payload. Status and case-file fields are never touched
/// here; those change only through lifecycle transitions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateIncident {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incident_type: Option<IncidentType>,
    /// Legacy `type` field.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub legacy_type: Option<IncidentType>,
    pub severity: Option<Severity>,
    pub location: Option<Location>,
    pub vehicles: Option<Vec<VehicleInvolvement>>,
    /// Legacy single-vehicle reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle: Option<Uuid>,
    pub persons: Option<Vec<PersonInvolved>>,
    pub evidence: Option<Vec<Evidence>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurred_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurred_date: Option<NaiveDate>,
}

/// Formats a human-readable incident number from a monthly sequence value.
///
/// The sequence value comes from the store's atomic increment primitive, so
/// numbers are unique even under concurrent creation.
pub fn format_incident_number(prefix: &str, when: DateTime<Utc>, seq: u64) -> String {
    format!(
        "{}-{:02}{:02}-{:04}",
        prefix,
        when.year() % 100,
        when.month(),
        seq
    )
}

/// The sequence key for a given month, e.g. `incident:2608`.
pub fn sequence_key(prefix: &str, when: DateTime<Utc>) -> String {
    format!(
        "{}:{:02}{:02}",
        prefix.to_lowercase(),
        when.year() % 100,
        when.month()
    )
}

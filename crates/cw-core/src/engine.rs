//! Case lifecycle engine.
//!
//! All status transitions go through here. Each transition checks the actor's
//! role (and ownership where relevant), validates the source status against a
//! declarative rule table, and commits through the store's conditional update
//! so concurrent transitions on the same incident serialize cleanly. Audit
//! and notification side effects run after the commit and can never fail the
//! transition itself.

use crate::audit::{AuditAction, AuditEvent, AuditRecorder};
use crate::auth::{Actor, Role};
use crate::db::{
    IncidentFilter, IncidentRepository, IncidentUpdate, PaginatedResult, Pagination, StoreError,
};
use crate::directory::{Directory, VehicleLookup};
use crate::incident::{
    format_incident_number, sequence_key, CaseFile, CaseFileStatus, CasePriority, Incident,
    IncidentStatus, IncidentType, InvestigationReport, NewIncident, Note, OfficerReview,
    ReportStatus, ReviewStatus, Severity, TimelineEntry, UpdateIncident,
};
use crate::notify::{NotificationKind, Notifier};
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Errors surfaced by engine operations.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("role '{role}' may not {action}")]
    Forbidden { role: Role, action: &'static str },

    #[error("cannot {action} while incident is '{status}'")]
    InvalidState {
        action: &'static str,
        status: IncidentStatus,
    },

    #[error("validation failed: {0}")]
    ValidationFailed(String),

    #[error("referenced {entity} does not exist: {id}")]
    ReferenceNotFound { entity: &'static str, id: String },

    #[error("sequence error: {0}")]
    Sequence(String),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl EngineError {
    fn incident_not_found(id: Uuid) -> Self {
        EngineError::NotFound {
            entity: "Incident",
            id: id.to_string(),
        }
    }

    fn forbidden(actor: &Actor, action: &'static str) -> Self {
        EngineError::Forbidden {
            role: actor.role,
            action,
        }
    }
}

/// Maps a conditional-update failure back into engine terms: a conflict means
/// a concurrent transition won the race, which the caller sees as the
/// incident no longer being in a valid state for this action.
fn commit_error(err: StoreError, action: &'static str, status: IncidentStatus) -> EngineError {
    match err {
        StoreError::Conflict(_) => EngineError::InvalidState { action, status },
        StoreError::NotFound { id, .. } => EngineError::NotFound {
            entity: "Incident",
            id,
        },
        other => EngineError::Storage(other),
    }
}

/// One row in the transition rule table.
struct TransitionRule {
    action: &'static str,
    allowed_roles: &'static [Role],
    from: &'static [IncidentStatus],
}

const ASSIGN: TransitionRule = TransitionRule {
    action: "assign investigator",
    allowed_roles: &[Role::Admin],
    from: &[IncidentStatus::Open, IncidentStatus::UnderInvestigation],
};

const SUBMIT: TransitionRule = TransitionRule {
    action: "submit report",
    allowed_roles: &[Role::Investigator],
    from: &[IncidentStatus::UnderInvestigation, IncidentStatus::Reopened],
};

const REVIEW: TransitionRule = TransitionRule {
    action: "review report",
    allowed_roles: &[Role::Officer],
    from: &[IncidentStatus::Pending],
};

impl TransitionRule {
    fn check_role(&self, actor: &Actor) -> Result<(), EngineError> {
        if actor.has_any_role(self.allowed_roles) {
            Ok(())
        } else {
            Err(EngineError::forbidden(actor, self.action))
        }
    }

    fn check_status(&self, incident: &Incident) -> Result<(), EngineError> {
        if self.from.contains(&incident.status) {
            Ok(())
        } else {
            Err(EngineError::InvalidState {
                action: self.action,
                status: incident.status,
            })
        }
    }
}

/// Officer verdict on a submitted report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    Approve,
    Reject,
}

/// Payload for report submission.
#[derive(Debug, Clone, Default)]
pub struct ReportSubmission {
    pub content: String,
    pub findings: String,
    pub recommendations: String,
    pub conclusion: String,
    pub attachments: Vec<String>,
}

/// Payload for officer review.
#[derive(Debug, Clone)]
pub struct ReviewSubmission {
    pub decision: ReviewDecision,
    pub actions: String,
    pub notes: Option<String>,
    pub conclusion: String,
}

/// Engine tunables.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Prefix for generated incident numbers.
    pub number_prefix: String,
    /// Maximum number of reject-reopen cycles per case. `None` means
    /// unlimited.
    pub max_reopen_cycles: Option<u32>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            number_prefix: "INC".to_string(),
            max_reopen_cycles: None,
        }
    }
}

/// Drives incidents through their lifecycle.
#[derive(Clone)]
pub struct CaseLifecycleEngine {
    incidents: Arc<dyn IncidentRepository>,
    audit: AuditRecorder,
    notifier: Notifier,
    directory: Arc<dyn Directory>,
    vehicles: Arc<dyn VehicleLookup>,
    config: EngineConfig,
}

impl CaseLifecycleEngine {
    pub fn new(
        incidents: Arc<dyn IncidentRepository>,
        audit: AuditRecorder,
        notifier: Notifier,
        directory: Arc<dyn Directory>,
        vehicles: Arc<dyn VehicleLookup>,
        config: EngineConfig,
    ) -> Self {
        Self {
            incidents,
            audit,
            notifier,
            directory,
            vehicles,
            config,
        }
    }

    /// Creates a new incident in `Open` status with a unique, monotonic
    /// incident number. Any authenticated user may report.
    #[instrument(skip(self, new), fields(actor = %actor.audit_identity()))]
    pub async fn create_incident(
        &self,
        actor: &Actor,
        new: NewIncident,
    ) -> Result<Incident, EngineError> {
        if new.title.trim().is_empty() {
            return Err(EngineError::ValidationFailed("title is required".into()));
        }
        if new.description.trim().is_empty() {
            return Err(EngineError::ValidationFailed(
                "description is required".into(),
            ));
        }
        let incident_type = new
            .incident_type
            .or(new.legacy_type)
            .unwrap_or(IncidentType::Other);
        let location = new.location.ok_or_else(|| {
            EngineError::ValidationFailed("location is required".into())
        })?;

        for involvement in &new.vehicles {
            self.require_vehicle(involvement.vehicle).await?;
        }
        if let Some(vehicle) = new.vehicle {
            self.require_vehicle(vehicle).await?;
        }

        let now = Utc::now();
        let seq = self
            .incidents
            .next_sequence(&sequence_key(&self.config.number_prefix, now))
            .await
            .map_err(|err| EngineError::Sequence(err.to_string()))?;
        let number = format_incident_number(&self.config.number_prefix, now, seq);

        let mut incident = Incident {
            id: Uuid::new_v4(),
            incident_number: number.clone(),
            title: new.title,
            description: new.description,
            incident_type,
            legacy_type: None,
            severity: new.severity.unwrap_or(Severity::Medium),
            location,
            vehicles: new.vehicles,
            vehicle: new.vehicle,
            persons: new.persons,
            evidence: new.evidence,
            reported_by: actor.id,
            assigned_to: None,
            assigned_by: None,
            status: IncidentStatus::Open,
            case_file: None,
            timeline: vec![TimelineEntry::new(
                "incident_created",
                format!("Incident {} reported", number),
                actor.id,
            )],
            notes: Vec::new(),
            occurred_at: new.occurred_at,
            occurred_date: new.occurred_date,
            created_at: now,
            updated_at: now,
        };
        incident.normalize();

        let created = self.incidents.create(&incident).await?;
        info!(incident = %created.incident_number, "incident created");

        self.audit
            .record(
                actor,
                AuditEvent::new(AuditAction::Create, "incident", "reported a new incident")
                    .resource_id(created.id)
                    .meta("incident_number", &created.incident_number)
                    .meta("severity", created.severity.to_string()),
            )
            .await;
        self.notifier
            .notify_role(
                Role::Admin,
                NotificationKind::Info,
                "New incident reported",
                &format!("{}: {}", created.incident_number, created.title),
                created.severity == Severity::Critical,
                Some(created.id),
            )
            .await;

        Ok(created)
    }

    /// Assigns (or reassigns) an investigator. Admin only.
    ///
    /// Moves the incident to `UnderInvestigation` and creates or replaces the
    /// embedded case file. The reopen counter survives reassignment.
    #[instrument(skip(self), fields(actor = %actor.audit_identity(), %incident_id))]
    pub async fn assign_investigator(
        &self,
        actor: &Actor,
        incident_id: Uuid,
        investigator_id: Uuid,
        priority: CasePriority,
    ) -> Result<Incident, EngineError> {
        ASSIGN.check_role(actor)?;

        let investigator = self
            .directory
            .get_user(investigator_id)
            .await?
            .ok_or(EngineError::ReferenceNotFound {
                entity: "User",
                id: investigator_id.to_string(),
            })?;
        if investigator.role != Role::Investigator {
            return Err(EngineError::ValidationFailed(format!(
                "user '{}' is not an investigator",
                investigator.name
            )));
        }
        if !investigator.active {
            return Err(EngineError::ValidationFailed(format!(
                "investigator '{}' is inactive",
                investigator.name
            )));
        }

        let incident = self
            .incidents
            .get(incident_id)
            .await?
            .ok_or_else(|| EngineError::incident_not_found(incident_id))?;
        ASSIGN.check_status(&incident)?;

        let mut case_file = CaseFile::assigned(investigator_id, priority);
        if let Some(existing) = &incident.case_file {
            case_file.reopen_count = existing.reopen_count;
        }

        let update = IncidentUpdate {
            status: Some(IncidentStatus::UnderInvestigation),
            case_file: Some(case_file),
            assigned_to: Some(investigator_id),
            assigned_by: Some(actor.id),
            ..Default::default()
        };
        let entry = TimelineEntry::new(
            "investigator_assigned",
            format!("Investigator {} assigned", investigator.name),
            actor.id,
        );
        let updated = self
            .incidents
            .update_guarded(incident_id, incident.status, &update, entry)
            .await
            .map_err(|err| commit_error(err, ASSIGN.action, incident.status))?;
        info!(incident = %updated.incident_number, investigator = %investigator.name, "investigator assigned");

        self.audit
            .record(
                actor,
                AuditEvent::new(AuditAction::Update, "incident", "assigned an investigator")
                    .resource_id(updated.id)
                    .meta("investigator", investigator_id.to_string()),
            )
            .await;
        self.notifier
            .notify_user(
                investigator_id,
                NotificationKind::Info,
                "Case assigned to you",
                &format!("{}: {}", updated.incident_number, updated.title),
                priority == CasePriority::Urgent,
                Some(updated.id),
            )
            .await;

        Ok(updated)
    }

    /// Submits the investigation report. Only the assigned investigator may
    /// submit, and only while the case is with them.
    #[instrument(skip(self, submission), fields(actor = %actor.audit_identity(), %incident_id))]
    pub async fn submit_report(
        &self,
        actor: &Actor,
        incident_id: Uuid,
        submission: ReportSubmission,
    ) -> Result<Incident, EngineError> {
        SUBMIT.check_role(actor)?;

        let incident = self
            .incidents
            .get(incident_id)
            .await?
            .ok_or_else(|| EngineError::incident_not_found(incident_id))?;

        // Ownership is checked before the payload: a non-assignee learns
        // they are forbidden, not what a valid report looks like.
        if incident.assigned_to != Some(actor.id) {
            return Err(EngineError::forbidden(actor, SUBMIT.action));
        }
        SUBMIT.check_status(&incident)?;

        if submission.content.trim().is_empty() {
            return Err(EngineError::ValidationFailed(
                "report content is required".into(),
            ));
        }
        if submission.findings.trim().is_empty() {
            return Err(EngineError::ValidationFailed("findings are required".into()));
        }
        if submission.recommendations.trim().is_empty() {
            return Err(EngineError::ValidationFailed(
                "recommendations are required".into(),
            ));
        }
        if submission.conclusion.trim().is_empty() {
            return Err(EngineError::ValidationFailed(
                "conclusion is required".into(),
            ));
        }

        let mut case_file = incident
            .case_file
            .clone()
            .unwrap_or_else(|| CaseFile::assigned(actor.id, CasePriority::Medium));
        case_file.status = CaseFileStatus::ReportSubmitted;
        case_file.report = Some(InvestigationReport {
            submitted_by: actor.id,
            submitted_at: Utc::now(),
            content: submission.content,
            findings: submission.findings,
            recommendations: submission.recommendations,
            conclusion: submission.conclusion,
            attachments: submission.attachments,
            status: ReportStatus::Submitted,
        });

        let update = IncidentUpdate {
            status: Some(IncidentStatus::Pending),
            case_file: Some(case_file),
            ..Default::default()
        };
        let entry = TimelineEntry::new(
            "report_submitted",
            "Investigation report submitted for review",
            actor.id,
        );
        let updated = self
            .incidents
            .update_guarded(incident_id, incident.status, &update, entry)
            .await
            .map_err(|err| commit_error(err, SUBMIT.action, incident.status))?;
        info!(incident = %updated.incident_number, "report submitted");

        self.audit
            .record(
                actor,
                AuditEvent::new(AuditAction::Update, "incident", "submitted investigation report")
                    .resource_id(updated.id),
            )
            .await;
        self.notifier
            .notify_user(
                updated.reported_by,
                NotificationKind::Info,
                "Investigation report submitted",
                &format!("{} is awaiting review", updated.incident_number),
                false,
                Some(updated.id),
            )
            .await;
        self.notifier
            .notify_role(
                Role::Admin,
                NotificationKind::Info,
                "Report awaiting review",
                &format!("{}: report submitted", updated.incident_number),
                false,
                Some(updated.id),
            )
            .await;

        Ok(updated)
    }

    /// Reviews a submitted report. Officer only.
    ///
    /// Approval closes the case; rejection sends it back to the investigator
    /// as `Reopened` and bumps the reopen counter.
    #[instrument(skip(self, review), fields(actor = %actor.audit_identity(), %incident_id))]
    pub async fn review_report(
        &self,
        actor: &Actor,
        incident_id: Uuid,
        review: ReviewSubmission,
    ) -> Result<Incident, EngineError> {
        REVIEW.check_role(actor)?;

        let incident = self
            .incidents
            .get(incident_id)
            .await?
            .ok_or_else(|| EngineError::incident_not_found(incident_id))?;
        REVIEW.check_status(&incident)?;

        let mut case_file = incident.case_file.clone().ok_or(EngineError::InvalidState {
            action: REVIEW.action,
            status: incident.status,
        })?;
        let report_status = case_file.report.as_ref().map(|r| r.status);
        if report_status != Some(ReportStatus::Submitted) {
            return Err(EngineError::InvalidState {
                action: REVIEW.action,
                status: incident.status,
            });
        }

        if review.conclusion.trim().is_empty() {
            return Err(EngineError::ValidationFailed(
                "review conclusion is required".into(),
            ));
        }

        let approved = review.decision == ReviewDecision::Approve;
        if !approved {
            if let Some(cap) = self.config.max_reopen_cycles {
                if case_file.reopen_count >= cap {
                    return Err(EngineError::ValidationFailed(format!(
                        "reopen limit of {} cycles reached",
                        cap
                    )));
                }
            }
        }

        case_file.officer_review = Some(OfficerReview {
            reviewed_by: actor.id,
            reviewed_at: Utc::now(),
            actions: review.actions,
            notes: review.notes,
            conclusion: review.conclusion,
            status: ReviewStatus::Completed,
        });

        let (next_status, action_label, description) = if approved {
            case_file.status = CaseFileStatus::ReviewComplete;
            case_file.investigation_end = Some(Utc::now());
            if let Some(report) = case_file.report.as_mut() {
                report.status = ReportStatus::Approved;
            }
            (
                IncidentStatus::Closed,
                "report_approved",
                "Report approved; case closed".to_string(),
            )
        } else {
            case_file.status = CaseFileStatus::UnderInvestigation;
            case_file.reopen_count += 1;
            if let Some(report) = case_file.report.as_mut() {
                report.status = ReportStatus::Rejected;
            }
            (
                IncidentStatus::Reopened,
                "report_rejected",
                format!(
                    "Report rejected; case reopened (cycle {})",
                    case_file.reopen_count
                ),
            )
        };

        let investigator = case_file.assigned_investigator;
        let update = IncidentUpdate {
            status: Some(next_status),
            case_file: Some(case_file),
            ..Default::default()
        };
        let entry = TimelineEntry::new(action_label, description, actor.id);
        let updated = self
            .incidents
            .update_guarded(incident_id, incident.status, &update, entry)
            .await
            .map_err(|err| commit_error(err, REVIEW.action, incident.status))?;
        info!(incident = %updated.incident_number, approved, "report reviewed");

        self.audit
            .record(
                actor,
                AuditEvent::new(AuditAction::Review, "incident", "reviewed investigation report")
                    .resource_id(updated.id)
                    .meta("decision", if approved { "approve" } else { "reject" }),
            )
            .await;

        if approved {
            self.notifier
                .notify_user(
                    updated.reported_by,
                    NotificationKind::Success,
                    "Case closed",
                    &format!("{} has been resolved", updated.incident_number),
                    false,
                    Some(updated.id),
                )
                .await;
        } else {
            self.notifier
                .notify_user(
                    updated.reported_by,
                    NotificationKind::Info,
                    "Case reopened",
                    &format!(
                        "{} was returned for further investigation",
                        updated.incident_number
                    ),
                    false,
                    Some(updated.id),
                )
                .await;
            if let Some(investigator) = investigator {
                self.notifier
                    .notify_user(
                        investigator,
                        NotificationKind::Warning,
                        "Report rejected",
                        &format!("{} needs further investigation", updated.incident_number),
                        false,
                        Some(updated.id),
                    )
                    .await;
            }
        }

        Ok(updated)
    }

    /// Updates an incident's free fields. Staff roles may edit any incident;
    /// the original reporter may edit their own. The status and case file
    /// are untouched; those move only through lifecycle transitions.
    #[instrument(skip(self, changes), fields(actor = %actor.audit_identity(), %incident_id))]
    pub async fn update_incident(
        &self,
        actor: &Actor,
        incident_id: Uuid,
        changes: UpdateIncident,
    ) -> Result<Incident, EngineError> {
        let incident = self
            .incidents
            .get(incident_id)
            .await?
            .ok_or_else(|| EngineError::incident_not_found(incident_id))?;

        let staff = actor.has_any_role(&[Role::Admin, Role::Officer, Role::Investigator]);
        if !staff && incident.reported_by != actor.id {
            return Err(EngineError::forbidden(actor, "update incident"));
        }

        // Legacy payload shapes fold into the canonical fields here; the
        // store-level normalize pass keeps the mirrors consistent.
        let vehicles = changes.vehicles.clone().or_else(|| {
            changes.vehicle.map(|vehicle| {
                vec![crate::incident::VehicleInvolvement {
                    vehicle,
                    role: crate::incident::InvolvementRole::Other,
                }]
            })
        });
        if let Some(vehicles) = &vehicles {
            for involvement in vehicles {
                self.require_vehicle(involvement.vehicle).await?;
            }
        }
        let occurred_at = changes.occurred_at.or_else(|| {
            changes
                .occurred_date
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc())
        });

        let update = IncidentUpdate {
            title: changes.title,
            description: changes.description,
            incident_type: changes.incident_type.or(changes.legacy_type),
            severity: changes.severity,
            location: changes.location,
            vehicles,
            persons: changes.persons,
            evidence: changes.evidence,
            occurred_at,
            ..Default::default()
        };
        let entry = TimelineEntry::new("incident_updated", "Incident details updated", actor.id);
        let updated = self
            .incidents
            .update_guarded(incident_id, incident.status, &update, entry)
            .await
            .map_err(|err| commit_error(err, "update incident", incident.status))?;

        self.audit
            .record(
                actor,
                AuditEvent::new(AuditAction::Update, "incident", "updated incident details")
                    .resource_id(updated.id),
            )
            .await;

        Ok(updated)
    }

    /// Adds a note. Staff may note any incident; the reporter may add
    /// non-private notes to their own.
    #[instrument(skip(self, text), fields(actor = %actor.audit_identity(), %incident_id))]
    pub async fn add_note(
        &self,
        actor: &Actor,
        incident_id: Uuid,
        text: String,
        private: bool,
    ) -> Result<Incident, EngineError> {
        if text.trim().is_empty() {
            return Err(EngineError::ValidationFailed("note text is required".into()));
        }

        let incident = self
            .incidents
            .get(incident_id)
            .await?
            .ok_or_else(|| EngineError::incident_not_found(incident_id))?;

        let staff = actor.has_any_role(&[Role::Admin, Role::Officer, Role::Investigator]);
        if !staff && (incident.reported_by != actor.id || private) {
            return Err(EngineError::forbidden(actor, "add note"));
        }

        let updated = self
            .incidents
            .append_note(incident_id, Note::new(actor.id, text, private))
            .await
            .map_err(|err| commit_error(err, "add note", incident.status))?;

        self.audit
            .record(
                actor,
                AuditEvent::new(AuditAction::Update, "incident", "added a note")
                    .resource_id(updated.id),
            )
            .await;

        Ok(updated)
    }

    /// Deletes an incident. Admins and officers may delete any incident;
    /// the original reporter may delete their own.
    #[instrument(skip(self), fields(actor = %actor.audit_identity(), %incident_id))]
    pub async fn delete_incident(
        &self,
        actor: &Actor,
        incident_id: Uuid,
    ) -> Result<(), EngineError> {
        let incident = self
            .incidents
            .get(incident_id)
            .await?
            .ok_or_else(|| EngineError::incident_not_found(incident_id))?;

        let privileged = actor.has_any_role(&[Role::Admin, Role::Officer]);
        if !privileged && incident.reported_by != actor.id {
            return Err(EngineError::forbidden(actor, "delete incident"));
        }

        if !self.incidents.delete(incident_id).await? {
            return Err(EngineError::incident_not_found(incident_id));
        }
        info!(incident = %incident.incident_number, "incident deleted");

        self.audit
            .record(
                actor,
                AuditEvent::new(AuditAction::Delete, "incident", "deleted incident")
                    .resource_id(incident_id)
                    .meta("incident_number", &incident.incident_number),
            )
            .await;

        Ok(())
    }

    /// Fetches one incident. Staff see everything; reporters only their own.
    pub async fn get_incident(
        &self,
        actor: &Actor,
        incident_id: Uuid,
    ) -> Result<Incident, EngineError> {
        let incident = self
            .incidents
            .get(incident_id)
            .await?
            .ok_or_else(|| EngineError::incident_not_found(incident_id))?;

        let staff = actor.has_any_role(&[Role::Admin, Role::Officer, Role::Investigator]);
        if !staff && incident.reported_by != actor.id {
            return Err(EngineError::forbidden(actor, "view incident"));
        }
        Ok(incident)
    }

    /// Lists incidents. Reporters are transparently scoped to their own.
    pub async fn list_incidents(
        &self,
        actor: &Actor,
        mut filter: IncidentFilter,
        pagination: Pagination,
    ) -> Result<PaginatedResult<Incident>, EngineError> {
        let staff = actor.has_any_role(&[Role::Admin, Role::Officer, Role::Investigator]);
        if !staff {
            filter.reported_by = Some(actor.id);
        }

        let items = self.incidents.list(&filter, &pagination).await?;
        let total = self.incidents.count(&filter).await?;
        Ok(PaginatedResult::new(items, total, &pagination))
    }

    /// All incidents involving a vehicle. Staff only.
    pub async fn incidents_by_vehicle(
        &self,
        actor: &Actor,
        vehicle_id: Uuid,
    ) -> Result<Vec<Incident>, EngineError> {
        if !actor.has_any_role(&[Role::Admin, Role::Officer, Role::Investigator]) {
            return Err(EngineError::forbidden(actor, "search incidents by vehicle"));
        }
        Ok(self.incidents.find_by_vehicle(vehicle_id).await?)
    }

    /// All incidents reported by a user. Staff, or the user themselves.
    pub async fn incidents_by_reporter(
        &self,
        actor: &Actor,
        user_id: Uuid,
    ) -> Result<Vec<Incident>, EngineError> {
        let staff = actor.has_any_role(&[Role::Admin, Role::Officer, Role::Investigator]);
        if !staff && actor.id != user_id {
            return Err(EngineError::forbidden(actor, "list another user's incidents"));
        }
        Ok(self.incidents.find_by_reporter(user_id).await?)
    }

    async fn require_vehicle(&self, vehicle_id: Uuid) -> Result<(), EngineError> {
        match self.vehicles.vehicle_exists(vehicle_id).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(EngineError::ReferenceNotFound {
                entity: "Vehicle",
                id: vehicle_id.to_string(),
            }),
            Err(err) => {
                warn!(%vehicle_id, error = %err, "vehicle registry lookup failed");
                Err(EngineError::Storage(err))
            }
        }
    }
}

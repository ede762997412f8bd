//! End-to-end lifecycle tests against the in-memory backends.

use std::sync::Arc;

use cw_core::{
    Actor, AuditEvent, AuditLogEntry, AuditQuery, AuditRecorder, AuditRepository,
    CaseLifecycleEngine, CasePriority, ChannelRegistry, EngineConfig, EngineError, IncidentStatus,
    IncidentType, Location, MemoryAuditRepository, MemoryDirectory, MemoryIncidentRepository,
    MemoryNotificationRepository, MemoryVehicleLookup, NewIncident, NotificationRepository,
    Notifier, ReportSubmission, ReviewDecision, ReviewSubmission, Role, StoreError,
    UpdateIncident, UserRef,
};
use uuid::Uuid;

struct World {
    engine: CaseLifecycleEngine,
    registry: ChannelRegistry,
    vehicles: Arc<MemoryVehicleLookup>,
    notifications: Arc<MemoryNotificationRepository>,
    admin: Actor,
    officer: Actor,
    investigator: Actor,
    reporter: Actor,
}

fn init_tracing() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("cw_core=debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

async fn world() -> World {
    world_with_audit(Arc::new(MemoryAuditRepository::new())).await
}

async fn world_with_audit(audit_repo: Arc<dyn AuditRepository>) -> World {
    init_tracing();
    let directory = Arc::new(MemoryDirectory::new());
    let vehicles = Arc::new(MemoryVehicleLookup::new());
    let notifications = Arc::new(MemoryNotificationRepository::new());
    let registry = ChannelRegistry::new();
    let notifier = Notifier::new(notifications.clone(), registry.clone(), directory.clone());
    let engine = CaseLifecycleEngine::new(
        Arc::new(MemoryIncidentRepository::new()),
        AuditRecorder::new(audit_repo),
        notifier,
        directory.clone(),
        vehicles.clone(),
        EngineConfig::default(),
    );

    let admin = Actor::new(Uuid::new_v4(), "ada", Role::Admin);
    let officer = Actor::new(Uuid::new_v4(), "omar", Role::Officer);
    let investigator = Actor::new(Uuid::new_v4(), "ines", Role::Investigator);
    let reporter = Actor::new(Uuid::new_v4(), "rita", Role::Reporter);
    for actor in [&admin, &officer, &investigator, &reporter] {
        directory
            .insert(UserRef::new(actor.id, actor.name.clone(), actor.role))
            .await;
    }

    World {
        engine,
        registry,
        vehicles,
        notifications,
        admin,
        officer,
        investigator,
        reporter,
    }
}

fn new_incident(title: &str) -> NewIncident {
    NewIncident {
        title: title.to_string(),
        description: "integration test incident".to_string(),
        incident_type: Some(IncidentType::Vandalism),
        location: Some(Location {
            latitude: 59.91,
            longitude: 10.75,
            address: "Main St 1".to_string(),
        }),
        ..Default::default()
    }
}

fn report() -> ReportSubmission {
    ReportSubmission {
        content: "full account".to_string(),
        findings: "paint matched a nearby can".to_string(),
        recommendations: "close".to_string(),
        conclusion: "isolated act".to_string(),
        attachments: Vec::new(),
    }
}

fn review(decision: ReviewDecision) -> ReviewSubmission {
    ReviewSubmission {
        decision,
        actions: "checked the evidence".to_string(),
        notes: None,
        conclusion: "review done".to_string(),
    }
}

#[tokio::test]
async fn timeline_only_grows_and_keeps_order() {
    let w = world().await;
    let incident = w
        .engine
        .create_incident(&w.reporter, new_incident("tagged wall"))
        .await
        .unwrap();

    let mut seen = incident.timeline.clone();
    let after_assign = w
        .engine
        .assign_investigator(&w.admin, incident.id, w.investigator.id, CasePriority::Low)
        .await
        .unwrap();

    // Every earlier entry survives unchanged at the same position.
    assert_eq!(after_assign.timeline.len(), seen.len() + 1);
    for (old, new) in seen.iter().zip(after_assign.timeline.iter()) {
        assert_eq!(old.action, new.action);
        assert_eq!(old.timestamp, new.timestamp);
    }
    seen = after_assign.timeline;

    let after_submit = w
        .engine
        .submit_report(&w.investigator, incident.id, report())
        .await
        .unwrap();
    assert_eq!(after_submit.timeline.len(), seen.len() + 1);
    assert_eq!(after_submit.timeline.last().unwrap().action, "report_submitted");
}

#[tokio::test]
async fn concurrent_assignment_has_exactly_one_winner() {
    let w = world().await;
    let incident = w
        .engine
        .create_incident(&w.reporter, new_incident("race"))
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let engine = w.engine.clone();
        let admin = w.admin.clone();
        let investigator = w.investigator.id;
        let id = incident.id;
        handles.push(tokio::spawn(async move {
            engine
                .assign_investigator(&admin, id, investigator, CasePriority::High)
                .await
        }));
    }

    let mut wins = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => wins += 1,
            // Losers see the incident already past Open with a fresh case
            // file; reassignment from UnderInvestigation is legal, so a
            // loser can also succeed as a reassign. Count distinct timeline
            // growth below instead of asserting failures here.
            Err(EngineError::InvalidState { .. }) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert!(wins >= 1);

    let after = w.engine.get_incident(&w.admin, incident.id).await.unwrap();
    assert_eq!(after.status, IncidentStatus::UnderInvestigation);
    let assigns = after
        .timeline
        .iter()
        .filter(|e| e.action == "investigator_assigned")
        .count();
    assert_eq!(assigns, wins, "one timeline entry per committed transition");
}

#[tokio::test]
async fn concurrent_creation_yields_unique_numbers() {
    let w = world().await;
    let engine = w.engine.clone();

    let mut handles = Vec::new();
    for i in 0..50 {
        let engine = engine.clone();
        let reporter = w.reporter.clone();
        handles.push(tokio::spawn(async move {
            engine
                .create_incident(&reporter, new_incident(&format!("incident {i}")))
                .await
        }));
    }

    let mut numbers = std::collections::HashSet::new();
    for handle in handles {
        let incident = handle.await.unwrap().unwrap();
        assert!(
            numbers.insert(incident.incident_number.clone()),
            "duplicate number {}",
            incident.incident_number
        );
    }
    assert_eq!(numbers.len(), 50);
}

#[tokio::test]
async fn legacy_vehicle_field_round_trips() {
    let w = world().await;
    let vehicle = Uuid::new_v4();
    w.vehicles.insert(vehicle).await;

    let mut payload = new_incident("legacy shape");
    payload.vehicle = Some(vehicle);
    let incident = w
        .engine
        .create_incident(&w.reporter, payload)
        .await
        .unwrap();

    // Both shapes populated after creation.
    assert_eq!(incident.vehicle, Some(vehicle));
    assert_eq!(incident.vehicles[0].vehicle, vehicle);

    // Lookup by vehicle finds it, and the serialized document carries both
    // field names.
    let found = w
        .engine
        .incidents_by_vehicle(&w.investigator, vehicle)
        .await
        .unwrap();
    assert_eq!(found.len(), 1);

    let json = serde_json::to_value(&incident).unwrap();
    assert_eq!(json["vehicle"], serde_json::json!(vehicle.to_string()));
    assert!(json["vehicles"].as_array().unwrap().len() == 1);
    assert_eq!(json["type"], json["incident_type"]);

    // Updating through the legacy single-vehicle field keeps the mirrors.
    let replacement = Uuid::new_v4();
    w.vehicles.insert(replacement).await;
    let updated = w
        .engine
        .update_incident(
            &w.admin,
            incident.id,
            UpdateIncident {
                vehicle: Some(replacement),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.vehicle, Some(replacement));
    assert_eq!(updated.vehicles[0].vehicle, replacement);
}

#[tokio::test]
async fn reject_then_resubmit_then_close() {
    let w = world().await;
    let incident = w
        .engine
        .create_incident(&w.reporter, new_incident("bounce"))
        .await
        .unwrap();
    w.engine
        .assign_investigator(&w.admin, incident.id, w.investigator.id, CasePriority::High)
        .await
        .unwrap();
    w.engine
        .submit_report(&w.investigator, incident.id, report())
        .await
        .unwrap();

    let reopened = w
        .engine
        .review_report(&w.officer, incident.id, review(ReviewDecision::Reject))
        .await
        .unwrap();
    assert_eq!(reopened.status, IncidentStatus::Reopened);

    w.engine
        .submit_report(&w.investigator, incident.id, report())
        .await
        .unwrap();
    let closed = w
        .engine
        .review_report(&w.officer, incident.id, review(ReviewDecision::Approve))
        .await
        .unwrap();
    assert_eq!(closed.status, IncidentStatus::Closed);
    assert_eq!(closed.case_file.unwrap().reopen_count, 1);
}

#[tokio::test]
async fn both_review_outcomes_notify_the_reporter() {
    let w = world().await;
    let incident = w
        .engine
        .create_incident(&w.reporter, new_incident("outcome"))
        .await
        .unwrap();
    w.engine
        .assign_investigator(&w.admin, incident.id, w.investigator.id, CasePriority::High)
        .await
        .unwrap();
    w.engine
        .submit_report(&w.investigator, incident.id, report())
        .await
        .unwrap();
    let before = w.notifications.count_for_user(w.reporter.id).await.unwrap();

    w.engine
        .review_report(&w.officer, incident.id, review(ReviewDecision::Reject))
        .await
        .unwrap();
    let after_reject = w.notifications.count_for_user(w.reporter.id).await.unwrap();
    assert_eq!(after_reject, before + 1, "rejection must reach the reporter");

    w.engine
        .submit_report(&w.investigator, incident.id, report())
        .await
        .unwrap();
    w.engine
        .review_report(&w.officer, incident.id, review(ReviewDecision::Approve))
        .await
        .unwrap();
    let after_approve = w.notifications.count_for_user(w.reporter.id).await.unwrap();
    assert!(after_approve > after_reject, "approval must reach the reporter");

    // The investigator still hears about the rejection.
    let investigator_inbox = w
        .notifications
        .list_for_user(w.investigator.id, &cw_core::Pagination::default())
        .await
        .unwrap();
    assert!(investigator_inbox
        .iter()
        .any(|n| n.title == "Report rejected"));
}

#[tokio::test]
async fn assignment_pushes_realtime_notification() {
    let w = world().await;
    let mut rx = w.registry.connect(w.investigator.id).await;

    let incident = w
        .engine
        .create_incident(&w.reporter, new_incident("push me"))
        .await
        .unwrap();
    w.engine
        .assign_investigator(&w.admin, incident.id, w.investigator.id, CasePriority::High)
        .await
        .unwrap();

    let pushed = rx.recv().await.unwrap();
    assert_eq!(pushed.user_id, w.investigator.id);
    assert_eq!(pushed.incident_id, Some(incident.id));

    // The durable record exists too.
    assert_eq!(
        w.notifications.unread_count(w.investigator.id).await.unwrap(),
        1
    );
}

struct FailingAuditRepository;

#[async_trait::async_trait]
impl AuditRepository for FailingAuditRepository {
    async fn append(&self, _entry: &AuditLogEntry) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("audit store down".to_string()))
    }

    async fn query(&self, _query: &AuditQuery) -> Result<Vec<AuditLogEntry>, StoreError> {
        Err(StoreError::Unavailable("audit store down".to_string()))
    }
}

#[tokio::test]
async fn audit_failure_never_fails_the_transition() {
    let w = world_with_audit(Arc::new(FailingAuditRepository)).await;

    let incident = w
        .engine
        .create_incident(&w.reporter, new_incident("resilient"))
        .await
        .unwrap();
    let assigned = w
        .engine
        .assign_investigator(&w.admin, incident.id, w.investigator.id, CasePriority::High)
        .await
        .unwrap();
    assert_eq!(assigned.status, IncidentStatus::UnderInvestigation);
}

#[tokio::test]
async fn audit_recorder_swallow_is_observable() {
    let recorder = AuditRecorder::new(Arc::new(FailingAuditRepository));
    let actor = Actor::new(Uuid::new_v4(), "ada", Role::Admin);
    let outcome = recorder
        .record(
            &actor,
            AuditEvent::new(cw_core::AuditAction::Create, "incident", "create"),
        )
        .await;
    assert!(outcome.is_none());
}

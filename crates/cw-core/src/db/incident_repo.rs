//! Incident repository contract and in-memory implementation.
//!
//! No business rules live here; guards and transition logic belong to the
//! lifecycle engine. The repository only provides the atomic primitives the
//! engine relies on: conditional (compare-and-set) update, array append, and
//! sequence increment.

use super::pagination::Pagination;
use super::StoreError;
use crate::incident::{
    CaseFile, Evidence, Incident, IncidentStatus, IncidentType, Location, Note, PersonInvolved,
    Severity, TimelineEntry, VehicleInvolvement,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Filter criteria for listing incidents.
#[derive(Debug, Clone, Default)]
pub struct IncidentFilter {
    /// Filter by status (any match).
    pub status: Option<Vec<IncidentStatus>>,
    /// Filter by severity (any match).
    pub severity: Option<Vec<Severity>>,
    /// Filter by incident type (any match).
    pub incident_type: Option<Vec<IncidentType>>,
    /// Filter by the reporting user.
    pub reported_by: Option<Uuid>,
    /// Filter by the assigned investigator.
    pub assigned_to: Option<Uuid>,
    /// Minimum created_at timestamp.
    pub since: Option<DateTime<Utc>>,
    /// Maximum created_at timestamp.
    pub until: Option<DateTime<Utc>>,
    /// Substring search over title, description, and incident number.
    pub query: Option<String>,
}

/// Field set applied in a single atomic document update.
///
/// `status` and `case_file` change only through engine transitions; the rest
/// are free fields. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct IncidentUpdate {
    pub status: Option<IncidentStatus>,
    pub case_file: Option<CaseFile>,
    pub assigned_to: Option<Uuid>,
    pub assigned_by: Option<Uuid>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub incident_type: Option<IncidentType>,
    pub severity: Option<Severity>,
    pub location: Option<Location>,
    pub vehicles: Option<Vec<VehicleInvolvement>>,
    pub persons: Option<Vec<PersonInvolved>>,
    pub evidence: Option<Vec<Evidence>>,
    pub occurred_at: Option<DateTime<Utc>>,
}

/// Repository trait for incident persistence.
#[async_trait]
pub trait IncidentRepository: Send + Sync {
    /// Creates a new incident document.
    async fn create(&self, incident: &Incident) -> Result<Incident, StoreError>;

    /// Gets an incident by id.
    async fn get(&self, id: Uuid) -> Result<Option<Incident>, StoreError>;

    /// Lists incidents matching the filter, newest first.
    async fn list(
        &self,
        filter: &IncidentFilter,
        pagination: &Pagination,
    ) -> Result<Vec<Incident>, StoreError>;

    /// Counts incidents matching the filter.
    async fn count(&self, filter: &IncidentFilter) -> Result<u64, StoreError>;

    /// All incidents referencing the given vehicle (canonical or legacy field).
    async fn find_by_vehicle(&self, vehicle_id: Uuid) -> Result<Vec<Incident>, StoreError>;

    /// All incidents reported by the given user.
    async fn find_by_reporter(&self, user_id: Uuid) -> Result<Vec<Incident>, StoreError>;

    /// Atomically applies the field set and appends one timeline entry,
    /// conditional on the document's current status.
    ///
    /// Fails with [`StoreError::Conflict`] when the stored status no longer
    /// equals `expected_status`, so two racing transitions on the same
    /// incident can never both succeed.
    async fn update_guarded(
        &self,
        id: Uuid,
        expected_status: IncidentStatus,
        update: &IncidentUpdate,
        entry: TimelineEntry,
    ) -> Result<Incident, StoreError>;

    /// Atomically appends a timeline entry without touching other fields.
    async fn append_timeline(&self, id: Uuid, entry: TimelineEntry)
        -> Result<Incident, StoreError>;

    /// Atomically appends a note.
    async fn append_note(&self, id: Uuid, note: Note) -> Result<Incident, StoreError>;

    /// Deletes an incident. Returns whether a document was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Atomically increments and returns the named sequence counter.
    ///
    /// The first call for a key returns 1.
    async fn next_sequence(&self, key: &str) -> Result<u64, StoreError>;
}

/// In-memory implementation of [`IncidentRepository`].
///
/// All mutating operations take the write lock for their full duration, which
/// gives them the same atomicity the contract requires from a real document
/// store.
pub struct MemoryIncidentRepository {
    incidents: Arc<RwLock<HashMap<Uuid, Incident>>>,
    sequences: Arc<RwLock<HashMap<String, u64>>>,
}

impl Default for MemoryIncidentRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryIncidentRepository {
    pub fn new() -> Self {
        Self {
            incidents: Arc::new(RwLock::new(HashMap::new())),
            sequences: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Snapshot of all stored incidents, for assertions in tests.
    pub async fn snapshot(&self) -> Vec<Incident> {
        self.incidents.read().await.values().cloned().collect()
    }

    fn matches(incident: &Incident, filter: &IncidentFilter) -> bool {
        if let Some(statuses) = &filter.status {
            if !statuses.contains(&incident.status) {
                return false;
            }
        }
        if let Some(severities) = &filter.severity {
            if !severities.contains(&incident.severity) {
                return false;
            }
        }
        if let Some(types) = &filter.incident_type {
            if !types.contains(&incident.incident_type) {
                return false;
            }
        }
        if let Some(reporter) = filter.reported_by {
            if incident.reported_by != reporter {
                return false;
            }
        }
        if let Some(assignee) = filter.assigned_to {
            if incident.assigned_to != Some(assignee) {
                return false;
            }
        }
        if let Some(since) = filter.since {
            if incident.created_at < since {
                return false;
            }
        }
        if let Some(until) = filter.until {
            if incident.created_at > until {
                return false;
            }
        }
        if let Some(query) = &filter.query {
            let needle = query.to_lowercase();
            let haystack = format!(
                "{} {} {}",
                incident.title, incident.description, incident.incident_number
            )
            .to_lowercase();
            if !haystack.contains(&needle) {
                return false;
            }
        }
        true
    }

    fn apply_update(incident: &mut Incident, update: &IncidentUpdate) {
        if let Some(status) = update.status {
            incident.status = status;
        }
        if let Some(case_file) = &update.case_file {
            incident.case_file = Some(case_file.clone());
        }
        if let Some(assigned_to) = update.assigned_to {
            incident.assigned_to = Some(assigned_to);
        }
        if let Some(assigned_by) = update.assigned_by {
            incident.assigned_by = Some(assigned_by);
        }
        if let Some(title) = &update.title {
            incident.title = title.clone();
        }
        if let Some(description) = &update.description {
            incident.description = description.clone();
        }
        if let Some(incident_type) = update.incident_type {
            incident.incident_type = incident_type;
        }
        if let Some(severity) = update.severity {
            incident.severity = severity;
        }
        if let Some(location) = &update.location {
            incident.location = location.clone();
        }
        if let Some(vehicles) = &update.vehicles {
            incident.vehicles = vehicles.clone();
        }
        if let Some(persons) = &update.persons {
            incident.persons = persons.clone();
        }
        if let Some(evidence) = &update.evidence {
            incident.evidence = evidence.clone();
        }
        if let Some(occurred_at) = update.occurred_at {
            incident.occurred_at = Some(occurred_at);
        }
        incident.normalize();
        incident.updated_at = Utc::now();
    }
}

#[async_trait]
impl IncidentRepository for MemoryIncidentRepository {
    async fn create(&self, incident: &Incident) -> Result<Incident, StoreError> {
        let mut incidents = self.incidents.write().await;

        if incidents.contains_key(&incident.id) {
            return Err(StoreError::Constraint(format!(
                "incident '{}' already exists",
                incident.id
            )));
        }
        if incidents
            .values()
            .any(|i| i.incident_number == incident.incident_number)
        {
            return Err(StoreError::Constraint(format!(
                "incident number '{}' already in use",
                incident.incident_number
            )));
        }

        incidents.insert(incident.id, incident.clone());
        Ok(incident.clone())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Incident>, StoreError> {
        Ok(self.incidents.read().await.get(&id).cloned())
    }

    async fn list(
        &self,
        filter: &IncidentFilter,
        pagination: &Pagination,
    ) -> Result<Vec<Incident>, StoreError> {
        let incidents = self.incidents.read().await;

        let mut result: Vec<Incident> = incidents
            .values()
            .filter(|i| Self::matches(i, filter))
            .cloned()
            .collect();

        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let offset = pagination.offset() as usize;
        let limit = pagination.limit() as usize;
        Ok(result.into_iter().skip(offset).take(limit).collect())
    }

    async fn count(&self, filter: &IncidentFilter) -> Result<u64, StoreError> {
        let incidents = self.incidents.read().await;
        Ok(incidents.values().filter(|i| Self::matches(i, filter)).count() as u64)
    }

    async fn find_by_vehicle(&self, vehicle_id: Uuid) -> Result<Vec<Incident>, StoreError> {
        let incidents = self.incidents.read().await;
        let mut result: Vec<Incident> = incidents
            .values()
            .filter(|i| {
                i.vehicles.iter().any(|v| v.vehicle == vehicle_id)
                    || i.vehicle == Some(vehicle_id)
            })
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    async fn find_by_reporter(&self, user_id: Uuid) -> Result<Vec<Incident>, StoreError> {
        let incidents = self.incidents.read().await;
        let mut result: Vec<Incident> = incidents
            .values()
            .filter(|i| i.reported_by == user_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    async fn update_guarded(
        &self,
        id: Uuid,
        expected_status: IncidentStatus,
        update: &IncidentUpdate,
        entry: TimelineEntry,
    ) -> Result<Incident, StoreError> {
        let mut incidents = self.incidents.write().await;

        let incident = incidents
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("Incident", id))?;

        if incident.status != expected_status {
            return Err(StoreError::Conflict(format!(
                "incident {} is '{}', expected '{}'",
                id, incident.status, expected_status
            )));
        }

        Self::apply_update(incident, update);
        incident.timeline.push(entry);
        Ok(incident.clone())
    }

    async fn append_timeline(
        &self,
        id: Uuid,
        entry: TimelineEntry,
    ) -> Result<Incident, StoreError> {
        let mut incidents = self.incidents.write().await;
        let incident = incidents
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("Incident", id))?;
        incident.timeline.push(entry);
        incident.updated_at = Utc::now();
        Ok(incident.clone())
    }

    async fn append_note(&self, id: Uuid, note: Note) -> Result<Incident, StoreError> {
        let mut incidents = self.incidents.write().await;
        let incident = incidents
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("Incident", id))?;
        incident.notes.push(note);
        incident.updated_at = Utc::now();
        Ok(incident.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.incidents.write().await.remove(&id).is_some())
    }

    async fn next_sequence(&self, key: &str) -> Result<u64, StoreError> {
        let mut sequences = self.sequences.write().await;
        let counter = sequences.entry(key.to_string()).or_insert(0);
        *counter += 1;
        Ok(*counter)
    }
}

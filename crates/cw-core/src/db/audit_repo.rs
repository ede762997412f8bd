//! Audit trail repository contract and in-memory implementation.
//!
//! The audit trail is append-only: entries are never updated or deleted, and
//! the contract deliberately offers no way to do either.

use super::StoreError;
use crate::audit::{AuditAction, AuditLogEntry};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Hard ceiling on rows returned from a single audit query.
pub const MAX_AUDIT_RESULTS: usize = 500;

/// Filter criteria for querying the audit trail.
#[derive(Debug, Clone, Default)]
pub struct AuditQuery {
    pub actor: Option<Uuid>,
    pub action: Option<AuditAction>,
    pub resource_type: Option<String>,
    pub resource_id: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    /// Maximum rows to return, clamped to [`MAX_AUDIT_RESULTS`].
    pub limit: Option<usize>,
}

impl AuditQuery {
    pub fn effective_limit(&self) -> usize {
        self.limit
            .unwrap_or(MAX_AUDIT_RESULTS)
            .min(MAX_AUDIT_RESULTS)
    }
}

/// Repository trait for the audit trail.
#[async_trait]
pub trait AuditRepository: Send + Sync {
    /// Appends an entry to the trail.
    async fn append(&self, entry: &AuditLogEntry) -> Result<(), StoreError>;

    /// Queries the trail, newest first.
    async fn query(&self, query: &AuditQuery) -> Result<Vec<AuditLogEntry>, StoreError>;
}

/// In-memory implementation of [`AuditRepository`].
#[derive(Default)]
pub struct MemoryAuditRepository {
    entries: Arc<RwLock<Vec<AuditLogEntry>>>,
}

impl MemoryAuditRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    fn matches(entry: &AuditLogEntry, query: &AuditQuery) -> bool {
        if let Some(actor) = query.actor {
            if entry.user != actor {
                return false;
            }
        }
        if let Some(action) = query.action {
            if entry.action != action {
                return false;
            }
        }
        if let Some(resource_type) = &query.resource_type {
            if &entry.resource_type != resource_type {
                return false;
            }
        }
        if let Some(resource_id) = &query.resource_id {
            if entry.resource_id.as_deref() != Some(resource_id.as_str()) {
                return false;
            }
        }
        if let Some(since) = query.since {
            if entry.timestamp < since {
                return false;
            }
        }
        if let Some(until) = query.until {
            if entry.timestamp > until {
                return false;
            }
        }
        true
    }
}

#[async_trait]
impl AuditRepository for MemoryAuditRepository {
    async fn append(&self, entry: &AuditLogEntry) -> Result<(), StoreError> {
        self.entries.write().await.push(entry.clone());
        Ok(())
    }

    async fn query(&self, query: &AuditQuery) -> Result<Vec<AuditLogEntry>, StoreError> {
        let entries = self.entries.read().await;
        let mut result: Vec<AuditLogEntry> = entries
            .iter()
            .filter(|e| Self::matches(e, query))
            .cloned()
            .collect();
        result.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        result.truncate(query.effective_limit());
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(user: Uuid, action: AuditAction, resource_id: Option<&str>) -> AuditLogEntry {
        AuditLogEntry {
            id: Uuid::new_v4(),
            user,
            user_name: "tester".to_string(),
            action,
            resource_type: "incident".to_string(),
            resource_id: resource_id.map(str::to_string),
            description: "test entry".to_string(),
            success: true,
            ip_address: None,
            user_agent: None,
            metadata: Default::default(),
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn append_and_query_by_actor() {
        let repo = MemoryAuditRepository::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        repo.append(&entry(alice, AuditAction::Create, Some("a")))
            .await
            .unwrap();
        repo.append(&entry(bob, AuditAction::Update, Some("b")))
            .await
            .unwrap();
        repo.append(&entry(alice, AuditAction::Delete, Some("c")))
            .await
            .unwrap();

        let result = repo
            .query(&AuditQuery {
                actor: Some(alice),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|e| e.user == alice));
    }

    #[tokio::test]
    async fn query_filters_by_resource() {
        let repo = MemoryAuditRepository::new();
        let user = Uuid::new_v4();
        repo.append(&entry(user, AuditAction::Create, Some("inc-1")))
            .await
            .unwrap();
        repo.append(&entry(user, AuditAction::Update, Some("inc-2")))
            .await
            .unwrap();

        let result = repo
            .query(&AuditQuery {
                resource_id: Some("inc-2".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].action, AuditAction::Update);
    }

    #[tokio::test]
    async fn query_limit_is_clamped() {
        let repo = MemoryAuditRepository::new();
        let user = Uuid::new_v4();
        for _ in 0..10 {
            repo.append(&entry(user, AuditAction::Read, None))
                .await
                .unwrap();
        }

        let result = repo
            .query(&AuditQuery {
                limit: Some(3),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(result.len(), 3);

        let query = AuditQuery {
            limit: Some(MAX_AUDIT_RESULTS * 10),
            ..Default::default()
        };
        assert_eq!(query.effective_limit(), MAX_AUDIT_RESULTS);
    }
}

//! Audit trail recording.
//!
//! Every sensitive operation produces an audit entry describing who did what
//! to which resource, and whether it succeeded. Recording is deliberately
//! infallible from the caller's point of view: a primary operation that has
//! already committed must never be failed retroactively because the trail
//! write broke. Failures are logged and swallowed.

use crate::auth::Actor;
use crate::db::{AuditQuery, AuditRepository, StoreError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

/// Closed set of auditable action kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Login,
    Create,
    Read,
    Update,
    Delete,
    Export,
    Upload,
    Download,
    Search,
    FailedLogin,
    PasswordReset,
    PermissionChange,
    ConsentUpdate,
    Review,
    Other,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Login => "login",
            AuditAction::Create => "create",
            AuditAction::Read => "read",
            AuditAction::Update => "update",
            AuditAction::Delete => "delete",
            AuditAction::Export => "export",
            AuditAction::Upload => "upload",
            AuditAction::Download => "download",
            AuditAction::Search => "search",
            AuditAction::FailedLogin => "failed_login",
            AuditAction::PasswordReset => "password_reset",
            AuditAction::PermissionChange => "permission_change",
            AuditAction::ConsentUpdate => "consent_update",
            AuditAction::Review => "review",
            AuditAction::Other => "other",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One immutable entry in the audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: Uuid,
    /// Acting user's id.
    pub user: Uuid,
    /// Acting user's display identity at the time of the action.
    pub user_name: String,
    pub action: AuditAction,
    pub resource_type: String,
    pub resource_id: Option<String>,
    pub description: String,
    pub success: bool,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    pub timestamp: DateTime<Utc>,
}

/// Description of an action to record. Built by the caller, stamped by the
/// recorder.
#[derive(Debug, Clone)]
pub struct AuditEvent {
    pub action: AuditAction,
    pub resource_type: String,
    pub resource_id: Option<String>,
    pub description: String,
    pub success: bool,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub metadata: HashMap<String, String>,
}

impl AuditEvent {
    pub fn new(
        action: AuditAction,
        resource_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            action,
            resource_type: resource_type.into(),
            resource_id: None,
            description: description.into(),
            success: true,
            ip_address: None,
            user_agent: None,
            metadata: HashMap::new(),
        }
    }

    pub fn resource_id(mut self, id: impl ToString) -> Self {
        self.resource_id = Some(id.to_string());
        self
    }

    /// Client address, when the calling layer has one.
    pub fn ip_address(mut self, ip: impl Into<String>) -> Self {
        self.ip_address = Some(ip.into());
        self
    }

    /// Client user agent, when the calling layer has one.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn failed(mut self) -> Self {
        self.success = false;
        self
    }

    pub fn meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Records audit entries against a backing repository.
#[derive(Clone)]
pub struct AuditRecorder {
    repo: Arc<dyn AuditRepository>,
}

impl AuditRecorder {
    pub fn new(repo: Arc<dyn AuditRepository>) -> Self {
        Self { repo }
    }

    /// Records an event. Never returns an error: on repository failure the
    /// entry is logged at warn level and dropped, and `None` is returned.
    pub async fn record(&self, actor: &Actor, event: AuditEvent) -> Option<AuditLogEntry> {
        let entry = AuditLogEntry {
            id: Uuid::new_v4(),
            user: actor.id,
            user_name: actor.audit_identity(),
            action: event.action,
            resource_type: event.resource_type,
            resource_id: event.resource_id,
            description: event.description,
            success: event.success,
            ip_address: event.ip_address,
            user_agent: event.user_agent,
            metadata: event.metadata,
            timestamp: Utc::now(),
        };

        match self.repo.append(&entry).await {
            Ok(()) => Some(entry),
            Err(err) => {
                warn!(
                    action = %entry.action,
                    resource_type = %entry.resource_type,
                    error = %err,
                    "failed to record audit entry"
                );
                None
            }
        }
    }

    /// Queries the trail, newest first.
    pub async fn query(&self, query: &AuditQuery) -> Result<Vec<AuditLogEntry>, StoreError> {
        self.repo.query(query).await
    }
}

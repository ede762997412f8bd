//! User notifications: durable store plus best-effort real-time push.
//!
//! Delivery is two-phase. The durable record is written first so a user who
//! is offline still sees the notification later; real-time push is attempted
//! afterwards and may silently miss. Like the audit trail, notification
//! failures never propagate into the operation that triggered them.

use crate::auth::Role;
use crate::db::{NotificationRepository, PaginatedResult, Pagination, StoreError};
use crate::directory::Directory;
use crate::dispatch::ChannelRegistry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

/// Visual category of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Info,
    Warning,
    Success,
    Error,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NotificationKind::Info => "info",
            NotificationKind::Warning => "warning",
            NotificationKind::Success => "success",
            NotificationKind::Error => "error",
        };
        write!(f, "{}", s)
    }
}

/// A notification addressed to a single user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub read: bool,
    /// Urgent notifications are surfaced more prominently by clients.
    pub urgent: bool,
    /// The incident this notification is about, when there is one.
    pub incident_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        user_id: Uuid,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        incident_id: Option<Uuid>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            kind,
            title: title.into(),
            message: message.into(),
            read: false,
            urgent: false,
            incident_id,
            created_at: Utc::now(),
        }
    }

    pub fn urgent(mut self) -> Self {
        self.urgent = true;
        self
    }
}

/// Sends notifications: durable write, then best-effort push.
#[derive(Clone)]
pub struct Notifier {
    store: Arc<dyn NotificationRepository>,
    registry: ChannelRegistry,
    directory: Arc<dyn Directory>,
}

impl Notifier {
    pub fn new(
        store: Arc<dyn NotificationRepository>,
        registry: ChannelRegistry,
        directory: Arc<dyn Directory>,
    ) -> Self {
        Self {
            store,
            registry,
            directory,
        }
    }

    /// Notifies a single user. Infallible: store failures are logged and the
    /// notification is dropped; push misses are expected and silent.
    pub async fn notify_user(
        &self,
        user_id: Uuid,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        urgent: bool,
        incident_id: Option<Uuid>,
    ) {
        let mut notification = Notification::new(user_id, kind, title, message, incident_id);
        notification.urgent = urgent;

        if let Err(err) = self.store.create(&notification).await {
            warn!(%user_id, error = %err, "failed to persist notification");
            return;
        }
        self.registry.push(&notification).await;
    }

    /// Notifies every active user holding the given role. Each recipient is
    /// handled independently; one failure never blocks the others.
    pub async fn notify_role(
        &self,
        role: Role,
        kind: NotificationKind,
        title: &str,
        message: &str,
        urgent: bool,
        incident_id: Option<Uuid>,
    ) {
        let users = match self.directory.users_with_role(role).await {
            Ok(users) => users,
            Err(err) => {
                warn!(role = %role, error = %err, "failed to resolve notification recipients");
                return;
            }
        };

        for user in users {
            self.notify_user(user.id, kind, title, message, urgent, incident_id)
                .await;
        }
    }

    /// A user's notifications, newest first, with pagination metadata.
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        pagination: &Pagination,
    ) -> Result<PaginatedResult<Notification>, StoreError> {
        let items = self.store.list_for_user(user_id, pagination).await?;
        let total = self.store.count_for_user(user_id).await?;
        Ok(PaginatedResult::new(items, total, pagination))
    }

    pub async fn mark_read(&self, id: Uuid, user_id: Uuid) -> Result<Notification, StoreError> {
        self.store.mark_read(id, user_id).await
    }

    pub async fn unread_count(&self, user_id: Uuid) -> Result<u64, StoreError> {
        self.store.unread_count(user_id).await
    }

    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, StoreError> {
        self.store.delete(id, user_id).await
    }

    pub async fn clear_for_user(&self, user_id: Uuid) -> Result<u64, StoreError> {
        self.store.clear_for_user(user_id).await
    }
}

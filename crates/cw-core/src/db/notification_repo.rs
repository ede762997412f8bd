//! Notification store contract and in-memory implementation.
//!
//! This is the durable half of notification delivery; real-time push is a
//! separate, best-effort concern handled by the dispatcher.

use super::pagination::Pagination;
use super::StoreError;
use crate::notify::Notification;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Repository trait for persisted notifications.
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Persists a notification.
    async fn create(&self, notification: &Notification) -> Result<(), StoreError>;

    /// Lists a user's notifications, newest first.
    async fn list_for_user(
        &self,
        user_id: Uuid,
        pagination: &Pagination,
    ) -> Result<Vec<Notification>, StoreError>;

    /// Marks a notification read. Scoped to the owner: marking someone
    /// else's notification reports not-found.
    async fn mark_read(&self, id: Uuid, user_id: Uuid) -> Result<Notification, StoreError>;

    /// Total notifications stored for a user.
    async fn count_for_user(&self, user_id: Uuid) -> Result<u64, StoreError>;

    /// Number of unread notifications for a user.
    async fn unread_count(&self, user_id: Uuid) -> Result<u64, StoreError>;

    /// Deletes a notification, owner-scoped. Returns whether one was removed.
    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, StoreError>;

    /// Removes all of a user's notifications. Returns how many were removed.
    async fn clear_for_user(&self, user_id: Uuid) -> Result<u64, StoreError>;
}

/// In-memory implementation of [`NotificationRepository`].
#[derive(Default)]
pub struct MemoryNotificationRepository {
    notifications: Arc<RwLock<HashMap<Uuid, Notification>>>,
}

impl MemoryNotificationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NotificationRepository for MemoryNotificationRepository {
    async fn create(&self, notification: &Notification) -> Result<(), StoreError> {
        self.notifications
            .write()
            .await
            .insert(notification.id, notification.clone());
        Ok(())
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        pagination: &Pagination,
    ) -> Result<Vec<Notification>, StoreError> {
        let notifications = self.notifications.read().await;
        let mut result: Vec<Notification> = notifications
            .values()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let offset = pagination.offset() as usize;
        let limit = pagination.limit() as usize;
        Ok(result.into_iter().skip(offset).take(limit).collect())
    }

    async fn mark_read(&self, id: Uuid, user_id: Uuid) -> Result<Notification, StoreError> {
        let mut notifications = self.notifications.write().await;
        match notifications.get_mut(&id) {
            Some(n) if n.user_id == user_id => {
                n.read = true;
                Ok(n.clone())
            }
            _ => Err(StoreError::not_found("Notification", id)),
        }
    }

    async fn count_for_user(&self, user_id: Uuid) -> Result<u64, StoreError> {
        let notifications = self.notifications.read().await;
        Ok(notifications
            .values()
            .filter(|n| n.user_id == user_id)
            .count() as u64)
    }

    async fn unread_count(&self, user_id: Uuid) -> Result<u64, StoreError> {
        let notifications = self.notifications.read().await;
        Ok(notifications
            .values()
            .filter(|n| n.user_id == user_id && !n.read)
            .count() as u64)
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, StoreError> {
        let mut notifications = self.notifications.write().await;
        match notifications.get(&id) {
            Some(n) if n.user_id == user_id => {
                notifications.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn clear_for_user(&self, user_id: Uuid) -> Result<u64, StoreError> {
        let mut notifications = self.notifications.write().await;
        let before = notifications.len();
        notifications.retain(|_, n| n.user_id != user_id);
        Ok((before - notifications.len()) as u64)
    }
}

//! Real-time notification dispatch.
//!
//! Connected clients register an unbounded channel keyed by user id. Push is
//! strictly best-effort: a user without a live channel is skipped, and a
//! channel whose receiver has gone away is removed on the failed send. The
//! durable record lives in the notification store regardless.

use crate::notify::Notification;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tracing::debug;
use uuid::Uuid;

/// Registry of live client channels, one per user.
///
/// A reconnecting user replaces their previous channel; the old receiver is
/// dropped and its sender fails, which is indistinguishable from a normal
/// disconnect.
#[derive(Clone, Default)]
pub struct ChannelRegistry {
    channels: Arc<RwLock<HashMap<Uuid, mpsc::UnboundedSender<Notification>>>>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a channel for the user, returning the receiving end.
    /// Any existing channel for the same user is replaced.
    pub async fn connect(&self, user_id: Uuid) -> mpsc::UnboundedReceiver<Notification> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.channels.write().await.insert(user_id, tx);
        debug!(%user_id, "realtime channel connected");
        rx
    }

    /// Removes the user's channel, if any.
    pub async fn disconnect(&self, user_id: Uuid) {
        if self.channels.write().await.remove(&user_id).is_some() {
            debug!(%user_id, "realtime channel disconnected");
        }
    }

    pub async fn is_connected(&self, user_id: Uuid) -> bool {
        self.channels.read().await.contains_key(&user_id)
    }

    /// Pushes a notification to its recipient's live channel.
    ///
    /// Returns whether delivery was handed to a live channel. A missing or
    /// dead channel is not an error; dead channels are pruned here.
    pub async fn push(&self, notification: &Notification) -> bool {
        let user_id = notification.user_id;

        let delivered = {
            let channels = self.channels.read().await;
            match channels.get(&user_id) {
                Some(tx) => tx.send(notification.clone()).is_ok(),
                None => return false,
            }
        };

        if !delivered {
            self.channels.write().await.remove(&user_id);
            debug!(%user_id, "pruned dead realtime channel");
        }
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NotificationKind;

    fn notification(user_id: Uuid) -> Notification {
        Notification::new(
            user_id,
            NotificationKind::Info,
            "Case update",
            "details",
            None,
        )
    }

    #[tokio::test]
    async fn push_delivers_to_connected_user() {
        let registry = ChannelRegistry::new();
        let user = Uuid::new_v4();
        let mut rx = registry.connect(user).await;

        assert!(registry.push(&notification(user)).await);
        let received = rx.recv().await.unwrap();
        assert_eq!(received.user_id, user);
    }

    #[tokio::test]
    async fn push_to_absent_user_is_noop() {
        let registry = ChannelRegistry::new();
        assert!(!registry.push(&notification(Uuid::new_v4())).await);
    }

    #[tokio::test]
    async fn reconnect_replaces_channel() {
        let registry = ChannelRegistry::new();
        let user = Uuid::new_v4();
        let mut first = registry.connect(user).await;
        let mut second = registry.connect(user).await;

        assert!(registry.push(&notification(user)).await);
        assert!(second.recv().await.is_some());
        // The first receiver's sender was replaced; it never sees the push.
        assert!(first.try_recv().is_err());
    }

    #[tokio::test]
    async fn dead_channel_is_pruned_on_push() {
        let registry = ChannelRegistry::new();
        let user = Uuid::new_v4();
        let rx = registry.connect(user).await;
        drop(rx);

        assert!(!registry.push(&notification(user)).await);
        assert!(!registry.is_connected(user).await);
    }

    #[tokio::test]
    async fn disconnect_removes_channel() {
        let registry = ChannelRegistry::new();
        let user = Uuid::new_v4();
        let _rx = registry.connect(user).await;
        assert!(registry.is_connected(user).await);

        registry.disconnect(user).await;
        assert!(!registry.is_connected(user).await);
    }
}

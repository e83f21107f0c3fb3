use tokio::sync::watch;
use tracing::{debug, info};

use crate::error::Result;
use crate::models::notification::Notification;
use crate::services::api_client::ApiClient;
use crate::store::resource::{LoadOutcome, ResourceStore, Snapshot};

const NOTIFICATIONS: &str = "notifications";

/// Session-wide notification list with its unread count.
pub struct NotificationCenter {
    api: ApiClient,
    notifications: ResourceStore<Notification>,
}

impl NotificationCenter {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            notifications: ResourceStore::new(),
        }
    }

    pub async fn start(&self) -> Result<LoadOutcome> {
        self.refresh().await
    }

    pub async fn refresh(&self) -> Result<LoadOutcome> {
        let outcome = self
            .notifications
            .load(NOTIFICATIONS, self.api.notifications())
            .await?;
        if let LoadOutcome::Applied(count) = outcome {
            debug!("Loaded {} notifications, {} unread", count, self.unread_count());
        }
        Ok(outcome)
    }

    /// Drops everything, including a refresh still in flight.
    pub fn teardown(&self) {
        self.notifications.reset();
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot<Notification>> {
        self.notifications.subscribe()
    }

    pub fn snapshot(&self) -> Snapshot<Notification> {
        self.notifications.snapshot()
    }

    pub fn unread_count(&self) -> usize {
        self.notifications
            .with_items(|items| items.iter().filter(|n| !n.is_read).count())
    }

    /// Marks one notification as read. Returns false when there was nothing to
    /// do: unknown id or already read.
    pub async fn mark_read(&self, notification_id: &str) -> Result<bool> {
        let unread = self
            .notifications
            .get(notification_id)
            .map(|n| !n.is_read)
            .unwrap_or(false);
        if !unread {
            return Ok(false);
        }

        self.api.mark_notification_read(notification_id).await?;
        self.notifications
            .update_item(notification_id, |n| n.is_read = true);
        info!("Notification {} marked as read", notification_id);
        Ok(true)
    }
}

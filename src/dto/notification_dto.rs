use serde::Deserialize;

use crate::models::notification::Notification;

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationListResponse {
    #[serde(default)]
    pub notifications: Vec<Notification>,
}

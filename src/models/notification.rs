use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::resource::Identified;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    JobApproved,
    JobRejected,
    JobStatusUpdate,
    #[serde(other)]
    Unknown,
}

/// How a notification is presented: which marker sits next to the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationTone {
    Success,
    Danger,
    Info,
    Plain,
}

impl NotificationKind {
    pub fn tone(&self) -> NotificationTone {
        match self {
            NotificationKind::JobApproved => NotificationTone::Success,
            NotificationKind::JobRejected => NotificationTone::Danger,
            NotificationKind::JobStatusUpdate => NotificationTone::Info,
            NotificationKind::Unknown => NotificationTone::Plain,
        }
    }

    pub fn marker(&self) -> &'static str {
        match self.tone() {
            NotificationTone::Success => "[ok]",
            NotificationTone::Danger => "[x]",
            NotificationTone::Info => "[~]",
            NotificationTone::Plain => "[-]",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub is_read: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl Identified for Notification {
    fn id(&self) -> &str {
        &self.id
    }
}

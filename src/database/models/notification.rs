use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    pub id: i64,
    /// Recipient profile id
    #[sqlx(rename = "user_id")]
    pub user: i64,
    pub message: String,
    pub link: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Notifications are always created unread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub user: i64,
    pub message: String,
    pub link: String,
}

impl NewNotification {
    pub fn new(user: i64, message: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            user,
            message: message.into(),
            link: link.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationPatch {
    pub is_read: Option<bool>,
}

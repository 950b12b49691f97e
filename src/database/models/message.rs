use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Chat message on a contract. `sender` and `receiver` are user names.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Message {
    pub id: i64,
    pub sender: String,
    pub receiver: String,
    #[sqlx(rename = "contract_id")]
    pub contract: i64,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewMessage {
    pub sender: String,
    pub receiver: String,
    pub contract: i64,
    #[serde(default)]
    pub content: String,
}

/// Edits to a stored message; the contract and timestamp are fixed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessagePatch {
    pub sender: Option<String>,
    pub receiver: Option<String>,
    pub content: Option<String>,
}

impl Message {
    pub fn apply(&mut self, patch: MessagePatch) {
        if let Some(v) = patch.sender {
            self.sender = v;
        }
        if let Some(v) = patch.receiver {
            self.receiver = v;
        }
        if let Some(v) = patch.content {
            self.content = v;
        }
    }
}

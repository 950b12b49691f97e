use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Login credentials, kept apart from the public profile.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Account {
    pub user_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub user_name: String,
    pub email: String,
    pub password_hash: String,
}

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Proposal status. `Pending` is initial; `Accepted` and `Rejected` are terminal
/// in the normal flow, though moving between them is not forbidden.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid proposal status: {0}")]
pub struct InvalidProposalStatus(pub String);

impl ProposalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalStatus::Pending => "pending",
            ProposalStatus::Accepted => "accepted",
            ProposalStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ProposalStatus::Accepted | ProposalStatus::Rejected)
    }

    /// True when moving from one terminal state to a different one.
    pub fn reopens(&self, next: ProposalStatus) -> bool {
        self.is_terminal() && next != *self
    }
}

impl FromStr for ProposalStatus {
    type Err = InvalidProposalStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ProposalStatus::Pending),
            "accepted" => Ok(ProposalStatus::Accepted),
            "rejected" => Ok(ProposalStatus::Rejected),
            other => Err(InvalidProposalStatus(other.to_string())),
        }
    }
}

impl TryFrom<String> for ProposalStatus {
    type Error = InvalidProposalStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Proposal {
    pub id: i64,
    #[sqlx(rename = "project_id")]
    pub project: i64,
    #[sqlx(rename = "freelancer_id")]
    pub freelancer: i64,
    pub description: String,
    pub price: Option<Decimal>,
    #[sqlx(try_from = "String")]
    pub status: ProposalStatus,
    pub created_at: DateTime<Utc>,
}

/// New proposals always start `pending`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProposal {
    pub project: i64,
    pub freelancer: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProposalPatch {
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub status: Option<ProposalStatus>,
}

impl ProposalPatch {
    pub fn status(status: ProposalStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }
}

impl Proposal {
    pub fn apply(&mut self, patch: ProposalPatch) {
        if let Some(v) = patch.description {
            self.description = v;
        }
        if let Some(v) = patch.price {
            self.price = Some(v);
        }
        if let Some(v) = patch.status {
            self.status = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_is_initial_and_not_terminal() {
        assert_eq!(ProposalStatus::default(), ProposalStatus::Pending);
        assert!(!ProposalStatus::Pending.is_terminal());
        assert!(ProposalStatus::Accepted.is_terminal());
        assert!(ProposalStatus::Rejected.is_terminal());
    }

    #[test]
    fn reopening_only_between_distinct_terminal_states() {
        assert!(ProposalStatus::Rejected.reopens(ProposalStatus::Accepted));
        assert!(ProposalStatus::Accepted.reopens(ProposalStatus::Rejected));
        assert!(!ProposalStatus::Accepted.reopens(ProposalStatus::Accepted));
        assert!(!ProposalStatus::Pending.reopens(ProposalStatus::Accepted));
    }

    #[test]
    fn status_patch_deserializes_lowercase() {
        let patch: ProposalPatch = serde_json::from_str(r#"{"status":"accepted"}"#).unwrap();
        assert_eq!(patch.status, Some(ProposalStatus::Accepted));
        assert!(serde_json::from_str::<ProposalPatch>(r#"{"status":"maybe"}"#).is_err());
    }
}

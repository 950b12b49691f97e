use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractStatus {
    Active,
    Completed,
    Cancelled,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid contract status: {0}")]
pub struct InvalidContractStatus(pub String);

impl ContractStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractStatus::Active => "active",
            ContractStatus::Completed => "completed",
            ContractStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for ContractStatus {
    type Err = InvalidContractStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(ContractStatus::Active),
            "completed" => Ok(ContractStatus::Completed),
            "cancelled" => Ok(ContractStatus::Cancelled),
            other => Err(InvalidContractStatus(other.to_string())),
        }
    }
}

/// A contract is created empty by proposal acceptance; dates, status and
/// terms are filled in later by an explicit update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contract {
    pub id: i64,
    pub proposal: i64,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<ContractStatus>,
    pub terms: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for Contract {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let status: Option<String> = row.try_get("status")?;
        let status = status
            .map(|s| s.parse::<ContractStatus>())
            .transpose()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "status".to_string(),
                source: Box::new(e),
            })?;

        Ok(Self {
            id: row.try_get("id")?,
            proposal: row.try_get("proposal_id")?,
            start_date: row.try_get("start_date")?,
            end_date: row.try_get("end_date")?,
            status,
            terms: row.try_get("terms")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContractPatch {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<ContractStatus>,
    pub terms: Option<String>,
}

impl ContractPatch {
    pub fn is_empty(&self) -> bool {
        self.start_date.is_none() && self.end_date.is_none() && self.status.is_none() && self.terms.is_none()
    }
}

impl Contract {
    pub fn apply(&mut self, patch: ContractPatch) {
        if let Some(v) = patch.start_date {
            self.start_date = Some(v);
        }
        if let Some(v) = patch.end_date {
            self.end_date = Some(v);
        }
        if let Some(v) = patch.status {
            self.status = Some(v);
        }
        if let Some(v) = patch.terms {
            self.terms = Some(v);
        }
    }
}

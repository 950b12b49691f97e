use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub id: i64,
    #[sqlx(rename = "owner_id")]
    pub owner: i64,
    pub title: String,
    pub description: String,
    pub budget: Option<Decimal>,
    /// Expected duration in days
    pub duration: Option<i32>,
    pub skills_required: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewProject {
    pub owner: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub budget: Option<Decimal>,
    #[serde(default)]
    pub duration: Option<i32>,
    #[serde(default, alias = "skills")]
    pub skills_required: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub budget: Option<Decimal>,
    pub duration: Option<i32>,
    #[serde(alias = "skills")]
    pub skills_required: Option<Vec<String>>,
}

impl Project {
    pub fn apply(&mut self, patch: ProjectPatch) {
        if let Some(v) = patch.title {
            self.title = v;
        }
        if let Some(v) = patch.description {
            self.description = v;
        }
        if let Some(v) = patch.budget {
            self.budget = Some(v);
        }
        if let Some(v) = patch.duration {
            self.duration = Some(v);
        }
        if let Some(v) = patch.skills_required {
            self.skills_required = v;
        }
    }
}

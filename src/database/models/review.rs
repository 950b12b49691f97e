use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const MIN_RATING: i16 = 1;
pub const MAX_RATING: i16 = 5;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Review {
    pub id: i64,
    #[sqlx(rename = "reviewer_id")]
    pub reviewer: i64,
    #[sqlx(rename = "reviewee_id")]
    pub reviewee: i64,
    #[sqlx(rename = "project_id")]
    pub project: i64,
    pub rating: i16,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewReview {
    pub reviewer: i64,
    pub reviewee: i64,
    pub project: i64,
    pub rating: i16,
    #[serde(default)]
    pub comment: String,
}

impl NewReview {
    pub fn rating_in_range(&self) -> bool {
        (MIN_RATING..=MAX_RATING).contains(&self.rating)
    }
}

/// Only the verdict of a review can change, not who wrote it or about what.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewPatch {
    pub rating: Option<i16>,
    pub comment: Option<String>,
}

impl ReviewPatch {
    pub fn rating_in_range(&self) -> bool {
        self.rating.map_or(true, |r| (MIN_RATING..=MAX_RATING).contains(&r))
    }
}

impl Review {
    pub fn apply(&mut self, patch: ReviewPatch) {
        if let Some(v) = patch.rating {
            self.rating = v;
        }
        if let Some(v) = patch.comment {
            self.comment = v;
        }
    }
}

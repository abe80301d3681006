use serde::{Deserialize, Serialize};
use chrono::Utc;

/// Default search radius in miles.
pub const DEFAULT_DISTANCE: i32 = 15;

pub const GENDER_ANY: &str = "any";
pub const GENDER_SAME: &str = "same";

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct MatchPref {
    pub id: i64,
    pub user_id: i64,
    pub distance: i32,
    pub gender: String,
    pub created_at: chrono::DateTime<Utc>,
    pub updated_at: chrono::DateTime<Utc>,
}

#[derive(sqlx::FromRow, Serialize, Debug)]
pub struct MatchPrefSummary {
    pub distance: i32,
    pub gender: String,
}

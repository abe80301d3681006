use serde::{Deserialize, Serialize};
use chrono::Utc;

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub id: i64,
    pub user_id: i64,
    pub answers: String,
    pub created_at: chrono::DateTime<Utc>,
    pub updated_at: chrono::DateTime<Utc>,
}

/// A scoring candidate: someone else's answers plus what the filters looked at.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct CandidateRow {
    pub user_id: i64,
    pub answers: String,
    pub gender: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub distance: Option<i32>,
    pub gender_pref: Option<String>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct MatchCharacteristics {
    pub gender: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Serialize, Debug)]
pub struct CandidatePrefs {
    pub distance: Option<i32>,
    pub gender: Option<String>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub user_id: i64,
    pub answers: String,
    pub match_characteristics: MatchCharacteristics,
    pub match_prefs: CandidatePrefs,
}

impl From<CandidateRow> for Candidate {
    fn from(row: CandidateRow) -> Self {
        Candidate {
            user_id: row.user_id,
            answers: row.answers,
            match_characteristics: MatchCharacteristics {
                gender: row.gender,
                latitude: row.latitude,
                longitude: row.longitude,
            },
            match_prefs: CandidatePrefs {
                distance: row.distance,
                gender: row.gender_pref,
            },
        }
    }
}

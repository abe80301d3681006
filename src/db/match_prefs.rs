use sqlx::PgPool;

use crate::models::match_pref::{MatchPref, MatchPrefSummary};

pub const SQL_UPSERT_MATCH_PREF: &str = r#"
INSERT INTO match_prefs (user_id, distance, gender, created_at, updated_at)
VALUES ($1, $2, $3, NOW(), NOW())
ON CONFLICT (user_id) DO UPDATE
SET distance = EXCLUDED.distance, gender = EXCLUDED.gender, updated_at = NOW()
RETURNING *
"#;

pub const SQL_MATCH_PREF_BY_USER: &str =
    "SELECT distance, gender FROM match_prefs WHERE user_id = $1";

pub async fn upsert_match_pref(
    pool: &PgPool,
    user_id: i64,
    distance: i32,
    gender: &str,
) -> sqlx::Result<MatchPref> {
    sqlx::query_as::<_, MatchPref>(SQL_UPSERT_MATCH_PREF)
        .bind(user_id)
        .bind(distance)
        .bind(gender)
        .fetch_one(pool)
        .await
}

pub async fn find_by_user(pool: &PgPool, user_id: i64) -> sqlx::Result<Option<MatchPrefSummary>> {
    sqlx::query_as::<_, MatchPrefSummary>(SQL_MATCH_PREF_BY_USER)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

use sqlx::PgPool;

use crate::models::answer::{Answer, CandidateRow};
use crate::utils::geo::BoundingBox;

pub const SQL_UPSERT_ANSWERS: &str = r#"
INSERT INTO answers (user_id, answers, created_at, updated_at)
VALUES ($1, $2, NOW(), NOW())
ON CONFLICT (user_id) DO UPDATE SET answers = EXCLUDED.answers, updated_at = NOW()
RETURNING *
"#;

pub const SQL_ANSWERS_BY_USER: &str = "SELECT * FROM answers WHERE user_id = $1";

pub const SQL_DELETE_ANSWERS: &str = "DELETE FROM answers WHERE user_id = $1";

pub const SQL_CANDIDATES_IN_BOX: &str = r#"
SELECT a.user_id, a.answers, u.gender, u.latitude, u.longitude,
       mp.distance, mp.gender AS gender_pref
FROM answers a
JOIN users u ON u.id = a.user_id
LEFT JOIN match_prefs mp ON mp.user_id = a.user_id
WHERE a.user_id <> $1
  AND u.latitude BETWEEN $2 AND $3
  AND u.longitude BETWEEN $4 AND $5
ORDER BY a.user_id
"#;

pub async fn upsert_answers(pool: &PgPool, user_id: i64, answers: &str) -> sqlx::Result<Answer> {
    sqlx::query_as::<_, Answer>(SQL_UPSERT_ANSWERS)
        .bind(user_id)
        .bind(answers)
        .fetch_one(pool)
        .await
}

pub async fn find_by_user(pool: &PgPool, user_id: i64) -> sqlx::Result<Option<Answer>> {
    sqlx::query_as::<_, Answer>(SQL_ANSWERS_BY_USER)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn delete_by_user(pool: &PgPool, user_id: i64) -> sqlx::Result<u64> {
    let result = sqlx::query(SQL_DELETE_ANSWERS)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Everyone else's answers inside `bounds`; gender filtering happens in Rust.
pub async fn candidates_in_box(
    pool: &PgPool,
    user_id: i64,
    bounds: &BoundingBox,
) -> sqlx::Result<Vec<CandidateRow>> {
    sqlx::query_as::<_, CandidateRow>(SQL_CANDIDATES_IN_BOX)
        .bind(user_id)
        .bind(bounds.min_lat)
        .bind(bounds.max_lat)
        .bind(bounds.min_long)
        .bind(bounds.max_long)
        .fetch_all(pool)
        .await
}

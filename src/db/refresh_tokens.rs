use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::refresh_token::RefreshToken;

pub const SQL_INSERT_REFRESH_TOKEN: &str = r#"
INSERT INTO refresh_tokens (user_id, token_hash, expires_at, created_at)
VALUES ($1, $2, $3, NOW())
RETURNING id
"#;

pub const SQL_REFRESH_TOKEN_BY_ID: &str =
    "SELECT * FROM refresh_tokens WHERE id = $1 AND user_id = $2";

pub const SQL_DELETE_REFRESH_TOKEN: &str =
    "DELETE FROM refresh_tokens WHERE id = $1 AND user_id = $2";

pub const SQL_DELETE_REFRESH_TOKENS_FOR_USER: &str =
    "DELETE FROM refresh_tokens WHERE user_id = $1";

pub async fn insert_token(
    pool: &PgPool,
    user_id: i64,
    token_hash: &str,
    expires_at: DateTime<Utc>,
) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>(SQL_INSERT_REFRESH_TOKEN)
        .bind(user_id)
        .bind(token_hash)
        .bind(expires_at)
        .fetch_one(pool)
        .await
}

pub async fn find_token(pool: &PgPool, id: i64, user_id: i64) -> sqlx::Result<Option<RefreshToken>> {
    sqlx::query_as::<_, RefreshToken>(SQL_REFRESH_TOKEN_BY_ID)
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn delete_token(pool: &PgPool, id: i64, user_id: i64) -> sqlx::Result<u64> {
    let result = sqlx::query(SQL_DELETE_REFRESH_TOKEN)
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn delete_all_for_user(pool: &PgPool, user_id: i64) -> sqlx::Result<u64> {
    let result = sqlx::query(SQL_DELETE_REFRESH_TOKENS_FOR_USER)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

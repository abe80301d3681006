use sqlx::PgPool;

use crate::models::notification_pref::{NotificationPref, NotificationSetting};

pub const SQL_INSERT_NOTIFICATION_PREF: &str = r#"
INSERT INTO notification_prefs (user_id, code, email, sms, created_at, updated_at)
VALUES ($1, $2, $3, $4, NOW(), NOW())
RETURNING *
"#;

// Flags left out of an update keep their stored value, or FALSE for a new row.
pub const SQL_UPSERT_NOTIFICATION_PREF: &str = r#"
INSERT INTO notification_prefs (user_id, code, email, sms, created_at, updated_at)
VALUES ($1, $2, COALESCE($3, FALSE), COALESCE($4, FALSE), NOW(), NOW())
ON CONFLICT (user_id, code) DO UPDATE
SET email = COALESCE($3, notification_prefs.email),
    sms = COALESCE($4, notification_prefs.sms),
    updated_at = NOW()
RETURNING *
"#;

pub const SQL_SETTINGS_BY_USER: &str =
    "SELECT code, email, sms FROM notification_prefs WHERE user_id = $1 ORDER BY code";

pub const SQL_SETTING_BY_USER_AND_CODE: &str =
    "SELECT code, email, sms FROM notification_prefs WHERE user_id = $1 AND code = $2";

pub async fn insert_pref(
    pool: &PgPool,
    user_id: i64,
    code: &str,
    email: bool,
    sms: bool,
) -> sqlx::Result<NotificationPref> {
    sqlx::query_as::<_, NotificationPref>(SQL_INSERT_NOTIFICATION_PREF)
        .bind(user_id)
        .bind(code)
        .bind(email)
        .bind(sms)
        .fetch_one(pool)
        .await
}

pub async fn upsert_pref(
    pool: &PgPool,
    user_id: i64,
    code: &str,
    email: Option<bool>,
    sms: Option<bool>,
) -> sqlx::Result<NotificationPref> {
    sqlx::query_as::<_, NotificationPref>(SQL_UPSERT_NOTIFICATION_PREF)
        .bind(user_id)
        .bind(code)
        .bind(email)
        .bind(sms)
        .fetch_one(pool)
        .await
}

pub async fn settings_for_user(pool: &PgPool, user_id: i64) -> sqlx::Result<Vec<NotificationSetting>> {
    sqlx::query_as::<_, NotificationSetting>(SQL_SETTINGS_BY_USER)
        .bind(user_id)
        .fetch_all(pool)
        .await
}

pub async fn setting(
    pool: &PgPool,
    user_id: i64,
    code: &str,
) -> sqlx::Result<Option<NotificationSetting>> {
    sqlx::query_as::<_, NotificationSetting>(SQL_SETTING_BY_USER_AND_CODE)
        .bind(user_id)
        .bind(code)
        .fetch_optional(pool)
        .await
}

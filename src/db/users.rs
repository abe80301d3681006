use sqlx::PgPool;

use crate::models::user::{
    GetUserCredentials, MatchContext, NearbyUser, NewUser, PersonalInformation, User, UserLocation,
};
use crate::utils::geo::BoundingBox;

pub const SQL_INSERT_USER: &str = r#"
INSERT INTO users (name, password, first_name, last_name, email, phone, gender, latitude, longitude, created_at, updated_at)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW(), NOW())
RETURNING *
"#;

pub const SQL_USER_BY_ID: &str = "SELECT * FROM users WHERE id = $1";

pub const SQL_USER_BY_NAME: &str = "SELECT * FROM users WHERE name = $1";

pub const SQL_CREDENTIALS_BY_EMAIL: &str = "SELECT id, password FROM users WHERE email = $1";

pub const SQL_UPDATE_LOCATION: &str = r#"
UPDATE users
SET latitude = $1, longitude = $2, city = $3, state = $4, state_code = $5,
    country = $6, country_code = $7, postal_code = $8, updated_at = NOW()
WHERE id = $9
"#;

pub const SQL_UPDATE_PERSONAL_INFORMATION: &str = r#"
UPDATE users
SET name = $1, first_name = $2, last_name = $3, gender = $4, phone = COALESCE($5, phone), updated_at = NOW()
WHERE id = $6
"#;

pub const SQL_UPDATE_EMAIL: &str = r#"
UPDATE users SET email = $1, is_email_verified = FALSE, updated_at = NOW() WHERE id = $2
"#;

pub const SQL_UPDATE_PHOTO_LINK: &str =
    "UPDATE users SET photo_link = $1, updated_at = NOW() WHERE id = $2";

pub const SQL_NEARBY_VERIFIED: &str = r#"
SELECT first_name
FROM users
WHERE is_email_verified = TRUE
  AND latitude BETWEEN $1 AND $2
  AND longitude BETWEEN $3 AND $4
"#;

pub const SQL_MATCH_CONTEXT: &str = r#"
SELECT u.gender, u.latitude, u.longitude, mp.distance, mp.gender AS gender_pref
FROM users u
LEFT JOIN match_prefs mp ON mp.user_id = u.id
WHERE u.id = $1
"#;

pub async fn insert_user(pool: &PgPool, user: &NewUser) -> sqlx::Result<User> {
    sqlx::query_as::<_, User>(SQL_INSERT_USER)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.gender)
        .bind(user.latitude)
        .bind(user.longitude)
        .fetch_one(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>(SQL_USER_BY_ID)
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_name(pool: &PgPool, name: &str) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>(SQL_USER_BY_NAME)
        .bind(name)
        .fetch_optional(pool)
        .await
}

pub async fn find_credentials_by_email(
    pool: &PgPool,
    email: &str,
) -> sqlx::Result<Option<GetUserCredentials>> {
    sqlx::query_as::<_, GetUserCredentials>(SQL_CREDENTIALS_BY_EMAIL)
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn update_location(pool: &PgPool, id: i64, location: &UserLocation) -> sqlx::Result<u64> {
    let result = sqlx::query(SQL_UPDATE_LOCATION)
        .bind(location.latitude)
        .bind(location.longitude)
        .bind(&location.city)
        .bind(&location.state)
        .bind(&location.state_code)
        .bind(&location.country)
        .bind(&location.country_code)
        .bind(&location.postal_code)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn update_personal_information(
    pool: &PgPool,
    id: i64,
    info: &PersonalInformation,
) -> sqlx::Result<u64> {
    let result = sqlx::query(SQL_UPDATE_PERSONAL_INFORMATION)
        .bind(&info.name)
        .bind(&info.first_name)
        .bind(&info.last_name)
        .bind(&info.gender)
        .bind(&info.phone)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn update_email(pool: &PgPool, id: i64, email: &str) -> sqlx::Result<u64> {
    let result = sqlx::query(SQL_UPDATE_EMAIL)
        .bind(email)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn update_photo_link(pool: &PgPool, id: i64, photo_link: &str) -> sqlx::Result<u64> {
    let result = sqlx::query(SQL_UPDATE_PHOTO_LINK)
        .bind(photo_link)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn nearby_verified(pool: &PgPool, bounds: &BoundingBox) -> sqlx::Result<Vec<NearbyUser>> {
    sqlx::query_as::<_, NearbyUser>(SQL_NEARBY_VERIFIED)
        .bind(bounds.min_lat)
        .bind(bounds.max_lat)
        .bind(bounds.min_long)
        .bind(bounds.max_long)
        .fetch_all(pool)
        .await
}

pub async fn match_context(pool: &PgPool, id: i64) -> sqlx::Result<Option<MatchContext>> {
    sqlx::query_as::<_, MatchContext>(SQL_MATCH_CONTEXT)
        .bind(id)
        .fetch_optional(pool)
        .await
}

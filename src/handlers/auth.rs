use actix_web::{web, HttpRequest, HttpResponse};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use validator::Validate;
use log::{info, warn};
use crate::config::Config;
use crate::db;
use crate::errors::AppError;
use crate::utils::jwt::{authorize_user, service_access_token, user_access_token};
use crate::utils::password::{hash_password, verify_password};
use crate::utils::validation::validate_payload;

const REFRESH_SECRET_LEN: usize = 48;

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ClientCredentialsRequest {
    #[validate(length(min = 1, message = "Client id is required"))]
    client_id: String,
    #[validate(length(min = 1, message = "Client secret is required"))]
    client_secret: String,
}

#[derive(Deserialize, Validate)]
pub struct PasswordGrantRequest {
    #[validate(email(message = "Invalid email format"))]
    email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    user_id: i64,
    refresh_token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    status: u16,
    access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
    token_type: &'static str,
    expires_in: i64,
}

impl TokenResponse {
    fn new(config: &Config, access_token: String, refresh_token: Option<String>) -> Self {
        TokenResponse {
            status: 200,
            access_token,
            refresh_token,
            token_type: "Bearer",
            expires_in: config.access_token_ttl_minutes * 60,
        }
    }
}

/// Splits `"<id>.<secret>"`.
pub fn parse_refresh_token(token: &str) -> Option<(i64, &str)> {
    let (id, secret) = token.split_once('.')?;
    if secret.is_empty() {
        return None;
    }
    Some((id.parse().ok()?, secret))
}

/// Stores a bcrypt hash of a new secret and returns the token to hand out.
pub async fn issue_refresh_token(
    pool: &PgPool,
    config: &Config,
    user_id: i64,
) -> Result<String, AppError> {
    let secret: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(REFRESH_SECRET_LEN)
        .map(char::from)
        .collect();

    let token_hash = hash_password(secret.clone()).await?;
    let expires_at = chrono::Utc::now() + chrono::Duration::days(config.refresh_token_ttl_days);

    let id = db::refresh_tokens::insert_token(pool, user_id, &token_hash, expires_at)
        .await
        .map_err(AppError::database)?;

    Ok(format!("{}.{}", id, secret))
}

// POST /api/auth/token/grant-type/client-credentials
pub async fn token_grant_type_client_credentials(
    req: web::Json<ClientCredentialsRequest>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    validate_payload(&*req)?;

    if !config.client_credentials_enabled() {
        return Err(AppError::Unauthorized("Client credentials grant is disabled".to_string()));
    }

    if req.client_id != config.client_id || req.client_secret != config.client_secret {
        warn!("auth.client_credentials.rejected client={}", req.client_id);
        return Err(AppError::Unauthorized("Invalid client credentials".to_string()));
    }

    let access_token = service_access_token(&config)?;
    Ok(HttpResponse::Ok().json(TokenResponse::new(&config, access_token, None)))
}

// POST /api/auth/token/grant-type/password
pub async fn token_grant_type_password(
    req: web::Json<PasswordGrantRequest>,
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    validate_payload(&*req)?;

    let user = db::users::find_credentials_by_email(&pool, &req.email)
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::NotFound("Email not found".to_string()))?;

    let req = req.into_inner();
    if !verify_password(req.password, user.password).await? {
        return Err(AppError::Unauthorized("Invalid password".to_string()));
    }

    let access_token = user_access_token(&config, user.id)?;
    let refresh_token = issue_refresh_token(&pool, &config, user.id).await?;

    info!("auth.password_grant user={}", user.id);
    Ok(HttpResponse::Ok().json(TokenResponse::new(&config, access_token, Some(refresh_token))))
}

// POST /api/auth/token/grant-type/refresh-token
pub async fn token_grant_type_refresh_token(
    req: web::Json<RefreshTokenRequest>,
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    let (token_id, secret) = parse_refresh_token(&req.refresh_token)
        .ok_or_else(|| AppError::Unauthorized("Malformed refresh token".to_string()))?;

    let stored = db::refresh_tokens::find_token(&pool, token_id, req.user_id)
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::Unauthorized("Unknown refresh token".to_string()))?;

    if stored.is_expired() {
        db::refresh_tokens::delete_token(&pool, stored.id, stored.user_id)
            .await
            .map_err(AppError::database)?;
        return Err(AppError::Unauthorized("Refresh token expired".to_string()));
    }

    if !verify_password(secret.to_string(), stored.token_hash).await? {
        return Err(AppError::Unauthorized("Unknown refresh token".to_string()));
    }

    let access_token = user_access_token(&config, stored.user_id)?;
    Ok(HttpResponse::Ok().json(TokenResponse::new(&config, access_token, None)))
}

// DELETE /api/auth/token/refresh-token
pub async fn refresh_token_delete(
    http: HttpRequest,
    req: web::Json<RefreshTokenRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    authorize_user(&http, req.user_id)?;

    let (token_id, _) = parse_refresh_token(&req.refresh_token)
        .ok_or_else(|| AppError::BadRequest("Malformed refresh token".to_string()))?;

    let deleted = db::refresh_tokens::delete_token(&pool, token_id, req.user_id)
        .await
        .map_err(AppError::database)?;

    if deleted == 0 {
        return Err(AppError::NotFound("Refresh token not found".to_string()));
    }

    Ok(super::ok_with(serde_json::json!({ "deleted": deleted })))
}

// DELETE /api/auth/token/refresh-token/all/{userId}
pub async fn refresh_token_delete_all(
    http: HttpRequest,
    user_id: web::Path<i64>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let user_id = user_id.into_inner();
    authorize_user(&http, user_id)?;

    let deleted = db::refresh_tokens::delete_all_for_user(&pool, user_id)
        .await
        .map_err(AppError::database)?;

    info!("auth.refresh_tokens.revoked user={} count={}", user_id, deleted);
    Ok(super::ok_with(serde_json::json!({ "deleted": deleted })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_token_parsing() {
        assert_eq!(parse_refresh_token("12.abcDEF"), Some((12, "abcDEF")));
        assert_eq!(parse_refresh_token("12."), None);
        assert_eq!(parse_refresh_token("abc.def"), None);
        assert_eq!(parse_refresh_token("nodot"), None);
    }

    #[test]
    fn refresh_token_is_omitted_when_absent() {
        let config = Config::default();
        let body = serde_json::to_value(TokenResponse::new(&config, "abc".to_string(), None)).unwrap();
        assert_eq!(body["tokenType"], "Bearer");
        assert_eq!(body["expiresIn"], 3600);
        assert!(body.get("refreshToken").is_none());
    }
}

use jsonwebtoken::{encode, decode, Header, Validation, EncodingKey, DecodingKey};
use serde::{Deserialize, Serialize};

use actix_web_httpauth::extractors::bearer::BearerAuth;
use actix_web::dev::ServiceRequest;
use actix_web::{web, Error, HttpMessage, HttpRequest};
use log::warn;

use crate::config::Config;
use crate::errors::AppError;

/// Subject of tokens issued through the client-credentials grant.
pub const SERVICE_SUBJECT: &str = "service";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

impl Claims {
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }

    pub fn is_service(&self) -> bool {
        self.sub == SERVICE_SUBJECT
    }
}

/// Generates a JWT for `sub` that expires after `ttl`.
pub fn generate_token(
    sub: &str,
    secret: &str,
    ttl: chrono::Duration,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        sub: sub.to_string(),
        exp: (chrono::Utc::now() + ttl).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Validates a JWT token and returns the claims if valid.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(jsonwebtoken::Algorithm::HS256),
    )
    .map(|data| data.claims)
}

/// Access token for a user, with the configured lifetime.
pub fn user_access_token(config: &Config, user_id: i64) -> Result<String, AppError> {
    generate_token(
        &user_id.to_string(),
        &config.jwt_secret,
        chrono::Duration::minutes(config.access_token_ttl_minutes),
    )
    .map_err(|_| AppError::InternalServerError("Token generation failed".to_string()))
}

pub fn service_access_token(config: &Config) -> Result<String, AppError> {
    generate_token(
        SERVICE_SUBJECT,
        &config.jwt_secret,
        chrono::Duration::minutes(config.access_token_ttl_minutes),
    )
    .map_err(|_| AppError::InternalServerError("Token generation failed".to_string()))
}

/// Validator function for the `HttpAuthentication::bearer` middleware.
/// Valid claims are stored in the request extensions for the handlers.
pub async fn validator(
    req: ServiceRequest,
    credentials: BearerAuth,
) -> Result<ServiceRequest, (Error, ServiceRequest)> {
    let secret = match req.app_data::<web::Data<Config>>() {
        Some(config) => config.jwt_secret.clone(),
        None => {
            return Err((
                AppError::InternalServerError("Configuration missing".to_string()).into(),
                req,
            ))
        }
    };

    match validate_token(credentials.token(), &secret) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            Ok(req)
        }
        Err(e) => {
            warn!("auth.token.rejected {}", e);
            Err((AppError::Unauthorized("Invalid token".to_string()).into(), req))
        }
    }
}

/// Claims placed by [`validator`].
pub fn current_claims(req: &HttpRequest) -> Result<Claims, AppError> {
    req.extensions()
        .get::<Claims>()
        .cloned()
        .ok_or_else(|| AppError::Unauthorized("Missing token".to_string()))
}

/// Allows the request to act for `user_id`: the user themself or a service token.
pub fn authorize_user(req: &HttpRequest, user_id: i64) -> Result<Claims, AppError> {
    let claims = current_claims(req)?;
    if claims.is_service() || claims.user_id() == Some(user_id) {
        Ok(claims)
    } else {
        Err(AppError::Forbidden(format!(
            "Not authorized to act for user {}",
            user_id
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    const SECRET: &str = "unit-test-secret";

    #[test]
    fn token_round_trip() {
        let token = generate_token("42", SECRET, chrono::Duration::minutes(5)).unwrap();
        let claims = validate_token(&token, SECRET).unwrap();
        assert_eq!(claims.user_id(), Some(42));
        assert!(!claims.is_service());
    }

    #[test]
    fn expired_and_foreign_tokens_are_rejected() {
        let expired = generate_token("42", SECRET, chrono::Duration::minutes(-10)).unwrap();
        assert!(validate_token(&expired, SECRET).is_err());

        let foreign = generate_token("42", "another-secret", chrono::Duration::minutes(5)).unwrap();
        assert!(validate_token(&foreign, SECRET).is_err());
    }

    #[test]
    fn service_claims_have_no_user_id() {
        let claims = Claims { sub: SERVICE_SUBJECT.to_string(), exp: 0 };
        assert!(claims.is_service());
        assert_eq!(claims.user_id(), None);
    }

    #[test]
    fn authorize_user_checks_ownership() {
        let req = TestRequest::default().to_http_request();
        req.extensions_mut().insert(Claims { sub: "7".to_string(), exp: 0 });

        assert!(authorize_user(&req, 7).is_ok());
        assert!(matches!(authorize_user(&req, 8), Err(AppError::Forbidden(_))));
    }

    #[test]
    fn service_token_may_act_for_anyone() {
        let req = TestRequest::default().to_http_request();
        req.extensions_mut().insert(Claims { sub: SERVICE_SUBJECT.to_string(), exp: 0 });
        assert!(authorize_user(&req, 12345).is_ok());
    }

    #[test]
    fn missing_claims_are_unauthorized() {
        let req = TestRequest::default().to_http_request();
        assert!(matches!(current_claims(&req), Err(AppError::Unauthorized(_))));
    }
}

use actix_web::rt::task::spawn_blocking;
use bcrypt::{hash, verify};

use crate::errors::AppError;

const BCRYPT_COST: u32 = 10;

/// Hashes on the blocking pool, bcrypt is deliberately slow.
pub async fn hash_password(password: String) -> Result<String, AppError> {
    spawn_blocking(move || hash(password, BCRYPT_COST))
        .await
        .map_err(|_| AppError::InternalServerError("Hashing failed".to_string()))?
        .map_err(|e| AppError::InternalServerError(e.to_string()))
}

pub async fn verify_password(password: String, hashed: String) -> Result<bool, AppError> {
    spawn_blocking(move || verify(password, &hashed))
        .await
        .map_err(|_| AppError::InternalServerError("Password verification error".to_string()))?
        .map_err(|e| AppError::InternalServerError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn hash_then_verify() {
        let hashed = hash_password("correct horse".to_string()).await.unwrap();
        assert!(verify_password("correct horse".to_string(), hashed.clone()).await.unwrap());
        assert!(!verify_password("wrong horse".to_string(), hashed).await.unwrap());
    }
}

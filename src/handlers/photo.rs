use actix_multipart::Multipart;
use actix_web::{web, HttpRequest, HttpResponse};
use futures_util::StreamExt;
use log::error;
use serde_json::json;
use sqlx::PgPool;
use std::path::Path;

use crate::config::Config;
use crate::db;
use crate::errors::AppError;
use crate::services::photos::{remove_photo, store_photo};
use crate::utils::jwt::current_claims;

// POST /api/users/photo
pub async fn upload_photo(
    req: HttpRequest,
    payload: web::Payload,
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    let user_id = current_claims(&req)?
        .user_id()
        .ok_or_else(|| AppError::Forbidden("Only users can upload a profile photo".to_string()))?;

    let mut multipart = Multipart::new(req.headers(), payload);
    let mut file_data = Vec::new();

    // Collect file data
    while let Some(item) = multipart.next().await {
        let mut field = item.map_err(|err| {
            error!("users.photo.multipart {:?}", err);
            AppError::BadRequest("Invalid multipart field".to_string())
        })?;

        if field.name() != "file" {
            return Err(AppError::BadRequest("Invalid field name: expected 'file'".to_string()));
        }

        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|err| {
                error!("users.photo.chunk {:?}", err);
                AppError::BadRequest("Failed to read chunk".to_string())
            })?;
            if file_data.len() + chunk.len() > config.photo_max_bytes {
                return Err(AppError::BadRequest(format!(
                    "File size exceeds {} bytes",
                    config.photo_max_bytes
                )));
            }
            file_data.extend_from_slice(&chunk);
        }
    }

    let dir = Path::new(&config.photo_dir);
    let photo_link = store_photo(dir, &file_data).await?;

    // The file is only kept once the user row points at it.
    let updated = match db::users::update_photo_link(&pool, user_id, &photo_link).await {
        Ok(updated) => updated,
        Err(e) => {
            remove_photo(dir, &photo_link).await;
            return Err(AppError::database(e));
        }
    };
    if updated == 0 {
        remove_photo(dir, &photo_link).await;
        return Err(AppError::NotFound(format!("User {} not found", user_id)));
    }

    Ok(HttpResponse::Ok().json(json!({ "status": 200, "message": "ok", "photoLink": photo_link })))
}

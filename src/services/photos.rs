use log::{error, info, warn};
use std::path::Path;
use uuid::Uuid;

use crate::errors::AppError;

/// URL prefix the photo directory is served under.
pub const PUBLIC_PATH: &str = "/public/images-profiles";

const ALLOWED_TYPES: [&str; 3] = ["image/jpeg", "image/jpg", "image/png"];

/// Checks the file type by content, writes it under `dir` with a fresh name and
/// returns the public link.
pub async fn store_photo(dir: &Path, data: &[u8]) -> Result<String, AppError> {
    if data.is_empty() {
        return Err(AppError::BadRequest("File part is missing".to_string()));
    }

    let file_type = infer::get(data)
        .ok_or_else(|| AppError::BadRequest("Unable to detect file type".to_string()))?;

    if !ALLOWED_TYPES.contains(&file_type.mime_type()) {
        return Err(AppError::BadRequest(
            "Only JPEG, JPG, and PNG files are allowed".to_string(),
        ));
    }

    let file_name = format!("{}.{}", Uuid::new_v4(), file_type.extension());

    tokio::fs::create_dir_all(dir).await.map_err(|e| {
        error!("users.photo.mkdir.failed {}", e);
        AppError::InternalServerError("Could not store photo".to_string())
    })?;
    tokio::fs::write(dir.join(&file_name), data).await.map_err(|e| {
        error!("users.photo.write.failed {}", e);
        AppError::InternalServerError("Could not store photo".to_string())
    })?;

    info!("users.photo.stored {} ({} bytes)", file_name, data.len());
    Ok(format!("{}/{}", PUBLIC_PATH, file_name))
}

/// Deletes a photo written by [`store_photo`], given its public link.
pub async fn remove_photo(dir: &Path, link: &str) {
    let Some(file_name) = link.rsplit('/').next().filter(|name| !name.is_empty()) else {
        return;
    };
    match tokio::fs::remove_file(dir.join(file_name)).await {
        Ok(()) => info!("users.photo.removed {}", file_name),
        Err(e) => warn!("users.photo.remove.failed {} {}", file_name, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Smallest useful PNG header, enough for content sniffing.
    const PNG_HEADER: [u8; 16] = [
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52,
    ];

    #[actix_web::test]
    async fn stores_png_under_fresh_name() {
        let dir = tempfile::tempdir().unwrap();
        let link = store_photo(dir.path(), &PNG_HEADER).await.unwrap();

        assert!(link.starts_with("/public/images-profiles/"));
        assert!(link.ends_with(".png"));

        let file_name = link.rsplit('/').next().unwrap();
        let written = std::fs::read(dir.path().join(file_name)).unwrap();
        assert_eq!(written, PNG_HEADER);
    }

    #[actix_web::test]
    async fn removes_stored_photo_by_link() {
        let dir = tempfile::tempdir().unwrap();
        let link = store_photo(dir.path(), &PNG_HEADER).await.unwrap();

        remove_photo(dir.path(), &link).await;
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[actix_web::test]
    async fn rejects_other_types() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = b"%PDF-1.4\n%\xe2\xe3\xcf\xd3\n";
        let err = store_photo(dir.path(), pdf).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[actix_web::test]
    async fn rejects_empty_upload() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            store_photo(dir.path(), &[]).await,
            Err(AppError::BadRequest(_))
        ));
    }
}

use actix_web::HttpResponse;
use serde::Serialize;
use serde_json::json;

pub mod auth;
pub mod mail;
pub mod matches;
pub mod notifications;
pub mod photo;
pub mod survey;
pub mod users;

/// `{ "status": 200, "message": "ok", "data": … }`
pub(crate) fn ok_with<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": 200, "message": "ok", "data": data }))
}

/// Field-level validation failures the front end highlights individually.
pub(crate) fn field_errors<T: Serialize>(errors: T) -> HttpResponse {
    HttpResponse::BadRequest().json(json!({
        "status": 400,
        "message": "Bad Request",
        "errors": errors,
    }))
}

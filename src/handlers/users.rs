use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;
use log::{info, warn};
use crate::config::Config;
use crate::db;
use crate::errors::AppError;
use crate::models::user::{split_full_name, user_name, NewUser, PersonalInformation, UserLocation};
use crate::utils::jwt::{authorize_user, user_access_token};
use crate::utils::password::{hash_password, verify_password};
use crate::utils::validation::{validate_coordinates, validate_payload, validate_phone};

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 50, message = "First name must be between 1 and 50 characters"))]
    first_name: String,

    #[validate(length(min = 1, max = 50, message = "Last name must be between 1 and 50 characters"))]
    last_name: String,

    #[validate(email(message = "Invalid email format"))]
    email: String,

    phone: Option<String>,

    #[validate(length(min = 8, max = 64, message = "Password must be between 8 and 64 characters"))]
    password: String,

    gender: Option<String>,

    latitude: Option<f64>,

    longitude: Option<f64>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    username: String,
    pass: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationUpdate {
    user_id: i64,
    latitude: f64,
    longitude: f64,
    city: Option<String>,
    state: Option<String>,
    state_code: Option<String>,
    country: Option<String>,
    country_code: Option<String>,
    postal_code: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInformationUpdate {
    user_id: i64,
    #[serde(default)]
    fullname: String,
    #[serde(default)]
    gender: String,
    phone: Option<String>,
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EmailUpdate {
    user_id: i64,

    #[validate(email(message = "Invalid email format"))]
    email: String,
}

fn authenticated(token: String) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "authenticated": true, "token": token }))
}

// POST /api/users/create
pub async fn create_user(
    req: web::Json<CreateUserRequest>,
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    validate_payload(&*req)?;
    if let Some(phone) = &req.phone {
        validate_phone(phone)?;
    }
    match (req.latitude, req.longitude) {
        (Some(lat), Some(long)) => validate_coordinates(lat, long)?,
        (None, None) => {}
        _ => {
            return Err(AppError::BadRequest(
                "Latitude and longitude must be given together".to_string(),
            ))
        }
    }

    let req = req.into_inner();
    let password_hash = hash_password(req.password).await?;

    let new_user = NewUser {
        name: user_name(&req.first_name, &req.last_name),
        password_hash,
        first_name: req.first_name,
        last_name: req.last_name,
        email: req.email,
        phone: req.phone,
        gender: req.gender,
        latitude: req.latitude,
        longitude: req.longitude,
    };

    let user = db::users::insert_user(&pool, &new_user)
        .await
        .map_err(|e| AppError::database_or_conflict(e, "Email or user name already exists"))?;

    info!("users.create user={} name={}", user.id, user.name);

    let token = user_access_token(&config, user.id)?;
    Ok(HttpResponse::Created().json(json!({ "authenticated": true, "token": token })))
}

// POST /api/users/login
pub async fn read_login(
    req: web::Json<LoginRequest>,
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    let req = req.into_inner();

    let user = match db::users::find_credentials_by_email(&pool, &req.username)
        .await
        .map_err(AppError::database)?
    {
        Some(user) => user,
        None => return Ok(HttpResponse::NotFound().json(json!({ "authenticated": false }))),
    };

    if !verify_password(req.pass, user.password).await? {
        warn!("users.login.rejected user={}", user.id);
        return Ok(HttpResponse::Unauthorized().json(json!({ "authenticated": false })));
    }

    Ok(authenticated(user_access_token(&config, user.id)?))
}

// GET /api/users/name/{username}
pub async fn read_one_user(
    name: web::Path<String>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let user = db::users::find_by_name(&pool, &name)
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", name)))?;

    Ok(HttpResponse::Ok().json(json!({ "user": user })))
}

// GET /api/users/id/{id}
pub async fn read_user_by_id(
    http: HttpRequest,
    user_id: web::Path<i64>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let user_id = user_id.into_inner();
    authorize_user(&http, user_id)?;

    let user = db::users::find_by_id(&pool, user_id)
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

    Ok(HttpResponse::Ok().json(json!({ "status": 200, "message": "ok", "user": user })))
}

// PUT /api/users/location/update
pub async fn update_user_location(
    http: HttpRequest,
    req: web::Json<LocationUpdate>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    authorize_user(&http, req.user_id)?;
    validate_coordinates(req.latitude, req.longitude)?;

    let req = req.into_inner();
    let location = UserLocation {
        latitude: req.latitude,
        longitude: req.longitude,
        city: req.city,
        state: req.state,
        state_code: req.state_code,
        country: req.country,
        country_code: req.country_code,
        postal_code: req.postal_code,
    };

    let updated = db::users::update_location(&pool, req.user_id, &location)
        .await
        .map_err(AppError::database)?;

    if updated == 0 {
        return Err(AppError::NotFound(format!("User {} not found", req.user_id)));
    }

    Ok(super::ok_with(json!({ "updated": updated })))
}

// PUT /api/users/profile/update/required
pub async fn update_personal_information(
    http: HttpRequest,
    req: web::Json<PersonalInformationUpdate>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    authorize_user(&http, req.user_id)?;

    let names = split_full_name(&req.fullname);
    let gender = req.gender.trim();

    let mut errors = Vec::new();
    if names.is_none() {
        errors.push(json!({ "error": "IVN", "message": "Invalid Name" }));
    }
    if gender.is_empty() || gender.chars().count() > 50 {
        errors.push(json!({ "error": "IVG", "message": "Invalid Gender" }));
    }
    let (first_name, last_name) = match names {
        Some(names) if errors.is_empty() => names,
        _ => return Ok(super::field_errors(errors)),
    };

    if let Some(phone) = &req.phone {
        validate_phone(phone)?;
    }

    let info = PersonalInformation {
        name: user_name(&first_name, &last_name),
        first_name,
        last_name,
        gender: Some(gender.to_string()),
        phone: req.phone.clone(),
    };

    let updated = db::users::update_personal_information(&pool, req.user_id, &info)
        .await
        .map_err(|e| AppError::database_or_conflict(e, "User name already exists"))?;

    if updated == 0 {
        return Err(AppError::NotFound(format!("User {} not found", req.user_id)));
    }

    Ok(super::ok_with(json!({ "updated": updated, "name": info.name })))
}

// PUT /api/users/email/update
pub async fn update_email_address(
    http: HttpRequest,
    req: web::Json<EmailUpdate>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    authorize_user(&http, req.user_id)?;
    validate_payload(&*req)?;

    let updated = db::users::update_email(&pool, req.user_id, &req.email)
        .await
        .map_err(|e| AppError::database_or_conflict(e, "Email already exists"))?;

    if updated == 0 {
        return Err(AppError::NotFound(format!("User {} not found", req.user_id)));
    }

    info!("users.email.updated user={}", req.user_id);
    Ok(super::ok_with(json!({ "updated": updated, "isEmailVerified": false })))
}

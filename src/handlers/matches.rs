use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::PgPool;
use log::info;
use crate::config::Config;
use crate::db;
use crate::errors::AppError;
use crate::services::matching::{candidate_pool, parse_answers, score_candidates};
use crate::services::relationships::RelationshipsClient;
use crate::utils::geo::{BoundingBox, NEARBY_RADIUS_MILES};
use crate::utils::jwt::{authorize_user, user_access_token};
use crate::utils::validation::validate_coordinates;

/// Placeholder value of an untouched select box in the preferences form.
const DEFAULT_CHOICE: &str = "default";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchPreferencesRequest {
    user_id: i64,
    distance: Value,
    gender: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateRequest {
    user_id: i64,
}

/// `Ok(None)` when the form still shows its placeholder.
fn distance_choice(value: &Value) -> Result<Option<i32>, AppError> {
    let distance = match value {
        Value::String(s) if s == DEFAULT_CHOICE => return Ok(None),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        Value::Number(n) => n.as_i64(),
        _ => None,
    };

    distance
        .filter(|miles| *miles >= 1)
        .and_then(|miles| i32::try_from(miles).ok())
        .map(Some)
        .ok_or_else(|| {
            AppError::BadRequest("Distance must be a positive whole number of miles".to_string())
        })
}

// POST /api/matches/preferences/submit
pub async fn update_match_preferences(
    http: HttpRequest,
    req: web::Json<MatchPreferencesRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    authorize_user(&http, req.user_id)?;

    let distance = distance_choice(&req.distance)?;
    let gender = req.gender.trim();

    let mut errors = Vec::new();
    if distance.is_none() {
        errors.push(json!({ "matchProximityPref": true }));
    }
    if gender == DEFAULT_CHOICE || gender.is_empty() {
        errors.push(json!({ "matchGenderPref": true }));
    }

    let distance = match distance {
        Some(distance) if errors.is_empty() => distance,
        _ => return Ok(super::field_errors(errors)),
    };

    let prefs = db::match_prefs::upsert_match_pref(&pool, req.user_id, distance, gender)
        .await
        .map_err(AppError::database)?;

    Ok(HttpResponse::Ok().json(prefs))
}

// GET /api/matches/near/location/{lat}/{long}
pub async fn read_matches_nearby(
    path: web::Path<(String, String)>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let (lat, long) = path.into_inner();
    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|_| AppError::BadRequest("Latitude must be a number".to_string()))?;
    let long: f64 = long
        .trim()
        .parse()
        .map_err(|_| AppError::BadRequest("Longitude must be a number".to_string()))?;
    validate_coordinates(lat, long)?;

    let bounds = BoundingBox::around(lat, long, NEARBY_RADIUS_MILES);
    let riders = db::users::nearby_verified(&pool, &bounds)
        .await
        .map_err(AppError::database)?;

    Ok(HttpResponse::Ok().json(riders))
}

// GET /api/matches/preferences/user/id/{userid}
pub async fn read_user_matches_preferences_by_id(
    http: HttpRequest,
    user_id: web::Path<i64>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let user_id = user_id.into_inner();
    authorize_user(&http, user_id)?;

    let prefs = db::match_prefs::find_by_user(&pool, user_id)
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| {
            AppError::NotFound(format!("No match preferences were found for user {}.", user_id))
        })?;

    Ok(super::ok_with(prefs))
}

// POST /api/matches/calculate
pub async fn calculate_user_matches(
    http: HttpRequest,
    req: web::Json<CalculateRequest>,
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    relationships: web::Data<RelationshipsClient>,
) -> Result<HttpResponse, AppError> {
    let user_id = req.user_id;
    authorize_user(&http, user_id)?;

    let own = db::answers::find_by_user(&pool, user_id)
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::NotFound(format!("No survey answers for user {}", user_id)))?;

    let own = parse_answers(&own.answers).map_err(|e| {
        AppError::InternalServerError(format!("Stored answers for user {} are invalid: {}", user_id, e))
    })?;

    let candidates = candidate_pool(&pool, user_id).await?;
    let scores = score_candidates(&own, &candidates);

    info!(
        "matches.calculate user={} candidates={} scored={}",
        user_id,
        candidates.len(),
        scores.len()
    );

    if scores.is_empty() {
        return Ok(super::ok_with(Vec::<Value>::new()));
    }

    let token = user_access_token(&config, user_id)?;
    let created = relationships.create(&token, user_id, &scores).await?;

    Ok(HttpResponse::Ok().json(created))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_accepts_numbers_and_numeric_strings() {
        assert_eq!(distance_choice(&json!(15)).unwrap(), Some(15));
        assert_eq!(distance_choice(&json!("25")).unwrap(), Some(25));
        assert_eq!(distance_choice(&json!(1200)).unwrap(), Some(1200));
    }

    #[test]
    fn distance_placeholder_is_not_an_error() {
        assert_eq!(distance_choice(&json!("default")).unwrap(), None);
    }

    #[test]
    fn distance_must_be_a_positive_whole_number() {
        assert!(distance_choice(&json!(0)).is_err());
        assert!(distance_choice(&json!(-5)).is_err());
        assert!(distance_choice(&json!(i64::from(i32::MAX) + 1)).is_err());
        assert!(distance_choice(&json!("far")).is_err());
        assert!(distance_choice(&json!(null)).is_err());
        assert!(distance_choice(&json!(12.5)).is_err());
    }
}

use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use log::info;
use crate::config::Config;
use crate::db;
use crate::errors::AppError;
use crate::models::notification_pref::{NEW_BUDDY, NEW_REQUEST};
use crate::models::user::User;
use crate::services::mailer::{prefixed_subject, MailMessage, MailTransport};
use crate::utils::jwt::authorize_user;
use crate::utils::validation::validate_notification_code;
use super::mail::deliver;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePreferenceRequest {
    user_id: i64,
    code: String,
    #[serde(default)]
    email: bool,
    #[serde(default)]
    sms: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePreferenceRequest {
    user_id: i64,
    code: String,
    email: Option<bool>,
    sms: Option<bool>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchEventRequest {
    addressee_id: i64,
    requester_id: i64,
}

/// Which side of a relationship event is told about it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchEvent {
    /// The addressee hears about a new request.
    NewRequest,
    /// The requester hears that the addressee accepted.
    Accepted,
}

impl MatchEvent {
    pub fn code(self) -> &'static str {
        match self {
            MatchEvent::NewRequest => NEW_REQUEST,
            MatchEvent::Accepted => NEW_BUDDY,
        }
    }
}

pub fn compose(event: MatchEvent, recipient: &User, other: &User, config: &Config) -> MailMessage {
    let other_name = other.display_name();
    let (subject, body) = match event {
        MatchEvent::NewRequest => (
            "You have a new riding buddy request",
            format!(
                "{} would like to ride with you. Log in to VeloMatchr to accept or decline the request.",
                other_name
            ),
        ),
        MatchEvent::Accepted => (
            "Your riding buddy request was accepted",
            format!(
                "{} accepted your request. Log in to VeloMatchr to send them a message and plan a ride.",
                other_name
            ),
        ),
    };

    MailMessage {
        from: config.mail_from.clone(),
        to: recipient.email.clone(),
        subject: prefixed_subject(subject),
        text: Some(format!("Hi {},\n\n{}", recipient.first_name, body)),
        html: Some(format!("<p>Hi {},</p><p>{}</p>", recipient.first_name, body)),
    }
}

async fn load_user(pool: &PgPool, user_id: i64) -> Result<User, AppError> {
    db::users::find_by_id(pool, user_id)
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))
}

async fn notify(
    pool: &PgPool,
    config: &Config,
    mailer: &dyn MailTransport,
    event: MatchEvent,
    recipient_id: i64,
    other_id: i64,
) -> Result<HttpResponse, AppError> {
    let recipient = load_user(pool, recipient_id).await?;
    let other = load_user(pool, other_id).await?;

    let wants_email = db::notification_prefs::setting(pool, recipient_id, event.code())
        .await
        .map_err(AppError::database)?
        .map_or(false, |setting| setting.email);

    if !wants_email {
        return Ok(HttpResponse::Ok().json(json!({ "status": 200, "message": "ok", "sent": false })));
    }

    deliver(mailer, compose(event, &recipient, &other, config)).await?;
    info!("notifications.sent code={} user={}", event.code(), recipient_id);

    Ok(HttpResponse::Ok().json(json!({ "status": 200, "message": "ok", "sent": true })))
}

// POST /api/notifications/preferences
pub async fn create_notification_preferences(
    http: HttpRequest,
    req: web::Json<CreatePreferenceRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    authorize_user(&http, req.user_id)?;
    validate_notification_code(&req.code)?;

    let pref = db::notification_prefs::insert_pref(&pool, req.user_id, &req.code, req.email, req.sms)
        .await
        .map_err(|e| AppError::database_or_conflict(e, "Notification preference already exists"))?;

    Ok(HttpResponse::Created().json(json!({ "status": 201, "message": "created", "data": pref })))
}

// PUT /api/notifications/preferences
pub async fn update_notification_preferences(
    http: HttpRequest,
    req: web::Json<UpdatePreferenceRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    authorize_user(&http, req.user_id)?;
    validate_notification_code(&req.code)?;

    let pref = db::notification_prefs::upsert_pref(&pool, req.user_id, &req.code, req.email, req.sms)
        .await
        .map_err(AppError::database)?;

    Ok(super::ok_with(pref))
}

// GET /api/users/notifications/preferences/{userId}
pub async fn read_user_notification_preferences(
    http: HttpRequest,
    user_id: web::Path<i64>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let user_id = user_id.into_inner();
    authorize_user(&http, user_id)?;

    let prefs = db::notification_prefs::settings_for_user(&pool, user_id)
        .await
        .map_err(AppError::database)?;

    Ok(super::ok_with(json!({ "userNotificationPrefs": prefs })))
}

// POST /api/notifications/send/new-match-request/ids
pub async fn send_new_match_request(
    http: HttpRequest,
    req: web::Json<MatchEventRequest>,
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    mailer: web::Data<dyn MailTransport>,
) -> Result<HttpResponse, AppError> {
    authorize_user(&http, req.requester_id)?;
    notify(&pool, &config, &**mailer, MatchEvent::NewRequest, req.addressee_id, req.requester_id).await
}

// POST /api/notifications/send/new-match-accepted/ids
pub async fn send_new_match_accepted(
    http: HttpRequest,
    req: web::Json<MatchEventRequest>,
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    mailer: web::Data<dyn MailTransport>,
) -> Result<HttpResponse, AppError> {
    authorize_user(&http, req.addressee_id)?;
    notify(&pool, &config, &**mailer, MatchEvent::Accepted, req.requester_id, req.addressee_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(id: i64, first: &str, last: &str, email: &str) -> User {
        User {
            id,
            name: format!("{}.{}", first, &last[..1]),
            password: String::new(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: email.to_string(),
            phone: None,
            gender: None,
            latitude: None,
            longitude: None,
            city: None,
            state: None,
            state_code: None,
            country: None,
            country_code: None,
            postal_code: None,
            photo_link: None,
            is_email_verified: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn request_mail_goes_to_addressee() {
        let addressee = user(1, "Ana", "Bell", "ana@example.org");
        let requester = user(2, "Cy", "Dunn", "cy@example.org");
        let message = compose(MatchEvent::NewRequest, &addressee, &requester, &Config::default());

        assert_eq!(message.to, "ana@example.org");
        assert!(message.subject.starts_with("[VELOMATCHR] "));
        assert!(message.text.unwrap().contains("Cy D. would like to ride with you"));
    }

    #[test]
    fn accepted_mail_names_the_addressee() {
        let addressee = user(1, "Ana", "Bell", "ana@example.org");
        let requester = user(2, "Cy", "Dunn", "cy@example.org");
        let message = compose(MatchEvent::Accepted, &requester, &addressee, &Config::default());

        assert_eq!(message.to, "cy@example.org");
        assert!(message.html.unwrap().contains("Ana B. accepted your request"));
    }

    #[test]
    fn events_map_to_preference_codes() {
        assert_eq!(MatchEvent::NewRequest.code(), "newRequest");
        assert_eq!(MatchEvent::Accepted.code(), "newBuddy");
    }
}

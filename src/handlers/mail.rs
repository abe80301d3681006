use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;
use log::info;
use crate::config::Config;
use crate::db;
use crate::errors::AppError;
use crate::services::mailer::{prefixed_subject, MailMessage, MailTransport};
use crate::services::mx::{mx_exists, MxLookup};
use crate::services::relationships::RelationshipsClient;
use crate::utils::jwt::{authorize_user, service_access_token};
use crate::utils::validation::{validate_payload, validate_proxy};

const MIN_MATCH_MAIL_LEN: usize = 2;

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendMailRequest {
    #[validate(length(min = 1, message = "From address is required"))]
    from_address: String,
    #[validate(length(min = 1, message = "To address is required"))]
    to_address: String,
    #[validate(length(min = 1, message = "Subject is required"))]
    subject: String,
    message: String,
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipMailRequest {
    #[validate(length(min = 1, message = "From address is required"))]
    from_address: String,
    #[validate(length(min = 1, message = "To address is required"))]
    to_address: String,
    #[validate(length(min = 1, message = "Subject is required"))]
    subject: String,
    text: Option<String>,
    html: Option<String>,
}

#[derive(Deserialize)]
pub struct BodyParts {
    html: String,
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchMailRequest {
    addressee_proxy: String,
    requester_proxy: String,
    subject: String,
    user_id: i64,
    body_parts: BodyParts,
}

/// Relay sender: `"First L. (VeloMatchr Buddy)" <buddy-<proxy>@<domain>>`.
pub fn relay_from_address(display_name: &str, prefix: &str, proxy: &str, domain: &str) -> String {
    let display_name: String = display_name
        .chars()
        .filter(|c| !matches!(c, '"' | '\\' | '<' | '>'))
        .collect();
    format!(
        "\"{} (VeloMatchr Buddy)\" <{}{}@{}>",
        display_name.trim(),
        prefix,
        proxy,
        domain
    )
}

/// Single attempt: 200 with the server reply or 500 with the transport error.
pub(crate) async fn deliver(
    mailer: &dyn MailTransport,
    message: MailMessage,
) -> Result<String, AppError> {
    mailer
        .send(message)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))
}

// POST /api/mail/send
pub async fn send_mail(
    req: web::Json<SendMailRequest>,
    mailer: web::Data<dyn MailTransport>,
) -> Result<HttpResponse, AppError> {
    validate_payload(&*req)?;

    let req = req.into_inner();
    let message = MailMessage {
        from: req.from_address,
        to: req.to_address,
        subject: prefixed_subject(&req.subject),
        text: None,
        html: Some(req.message),
    };

    let reply = deliver(&**mailer, message).await?;
    Ok(HttpResponse::Ok().json(json!({ "status": 200, "data": reply })))
}

// POST /api/mail/relationship/send
pub async fn send_relationship_mail(
    req: web::Json<RelationshipMailRequest>,
    mailer: web::Data<dyn MailTransport>,
) -> Result<HttpResponse, AppError> {
    validate_payload(&*req)?;

    let req = req.into_inner();
    let message = MailMessage {
        from: req.from_address,
        to: req.to_address,
        subject: prefixed_subject(&req.subject),
        text: req.text.filter(|t| !t.is_empty()),
        html: req.html.filter(|h| !h.is_empty()),
    };

    let reply = deliver(&**mailer, message).await?;
    Ok(HttpResponse::Ok().json(json!({ "status": 200, "data": reply })))
}

// POST /api/mail/match
pub async fn mail_match(
    http: HttpRequest,
    req: web::Json<MatchMailRequest>,
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    mailer: web::Data<dyn MailTransport>,
    relationships: web::Data<RelationshipsClient>,
) -> Result<HttpResponse, AppError> {
    authorize_user(&http, req.user_id)?;

    let mut errors = Vec::new();
    if req.body_parts.html.trim().chars().count() < MIN_MATCH_MAIL_LEN {
        errors.push(json!({ "body": true }));
    }
    if req.subject.trim().chars().count() < MIN_MATCH_MAIL_LEN {
        errors.push(json!({ "subject": true }));
    }
    if !errors.is_empty() {
        return Ok(super::field_errors(errors));
    }

    validate_proxy(&req.addressee_proxy)?;
    validate_proxy(&req.requester_proxy)?;

    let sender = db::users::find_by_id(&pool, req.user_id)
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", req.user_id)))?;

    let token = service_access_token(&config)?;
    let to = relationships
        .email_for_proxy(&token, &req.addressee_proxy)
        .await?;

    let req = req.into_inner();
    let message = MailMessage {
        from: relay_from_address(
            &sender.display_name(),
            config.proxy_prefix(),
            &req.requester_proxy,
            &config.mail_domain,
        ),
        to,
        subject: prefixed_subject(&req.subject),
        text: req.body_parts.text.filter(|t| !t.is_empty()),
        html: Some(req.body_parts.html),
    };

    deliver(&**mailer, message).await?;
    info!("mail.match.relayed from_user={}", req.user_id);

    Ok(HttpResponse::Ok().json(json!({ "status": 200, "message": "ok" })))
}

// GET /api/mail/mx/{email}
pub async fn check_mx(
    email: web::Path<String>,
    resolver: web::Data<dyn MxLookup>,
) -> Result<HttpResponse, AppError> {
    let exists = mx_exists(&**resolver, &email).await;
    Ok(HttpResponse::Ok().json(json!({ "status": 200, "message": "ok", "mxExists": exists })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relay_address_uses_prefix_and_domain() {
        assert_eq!(
            relay_from_address("Ana B.", "buddy-", "x1y2", "velomatchr.com"),
            "\"Ana B. (VeloMatchr Buddy)\" <buddy-x1y2@velomatchr.com>"
        );
        assert_eq!(
            relay_from_address("Ana B.", "dev-buddy-", "x1y2", "velomatchr.com"),
            "\"Ana B. (VeloMatchr Buddy)\" <dev-buddy-x1y2@velomatchr.com>"
        );
    }

    #[test]
    fn relay_address_strips_quoting_characters() {
        let from = relay_from_address("An\"a <B.>", "buddy-", "p", "velomatchr.com");
        assert_eq!(from, "\"Ana B. (VeloMatchr Buddy)\" <buddy-p@velomatchr.com>");
    }
}

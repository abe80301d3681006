use actix_cors::Cors;
use actix_web::middleware::Condition;
use actix_web::web;
use actix_web_httpauth::middleware::HttpAuthentication;

use crate::config::Config;

use crate::handlers::{auth, mail, matches, notifications, photo, survey, users};

/// Any-origin CORS, switched on only for local development.
pub fn cors(config: &Config) -> Condition<Cors> {
    Condition::new(config.cors_enabled, Cors::permissive())
}

/// Mounts the `/api` route table. Resources that need a bearer token are wrapped
/// individually.
pub fn configure(cfg: &mut web::ServiceConfig) {
    let bearer = HttpAuthentication::bearer(crate::utils::jwt::validator);

    cfg.service(
        web::scope("/api")
            // auth
            .service(
                web::resource("/auth/token/grant-type/client-credentials")
                    .route(web::post().to(auth::token_grant_type_client_credentials)),
            )
            .service(
                web::resource("/auth/token/grant-type/password")
                    .route(web::post().to(auth::token_grant_type_password)),
            )
            .service(
                web::resource("/auth/token/grant-type/refresh-token")
                    .route(web::post().to(auth::token_grant_type_refresh_token)),
            )
            .service(
                web::resource("/auth/token/refresh-token")
                    .wrap(bearer.clone())
                    .route(web::delete().to(auth::refresh_token_delete)),
            )
            .service(
                web::resource("/auth/token/refresh-token/all/{userId}")
                    .wrap(bearer.clone())
                    .route(web::delete().to(auth::refresh_token_delete_all)),
            )
            // users
            .service(web::resource("/users/create").route(web::post().to(users::create_user)))
            .service(web::resource("/users/login").route(web::post().to(users::read_login)))
            .service(
                web::resource("/users/name/{username}").route(web::get().to(users::read_one_user)),
            )
            .service(
                web::resource("/users/id/{id}")
                    .wrap(bearer.clone())
                    .route(web::get().to(users::read_user_by_id)),
            )
            .service(
                web::resource("/users/location/update")
                    .wrap(bearer.clone())
                    .route(web::put().to(users::update_user_location)),
            )
            .service(
                web::resource("/users/profile/update/required")
                    .wrap(bearer.clone())
                    .route(web::put().to(users::update_personal_information)),
            )
            .service(
                web::resource("/users/email/update")
                    .wrap(bearer.clone())
                    .route(web::put().to(users::update_email_address)),
            )
            .service(
                web::resource("/users/photo")
                    .wrap(bearer.clone())
                    .route(web::post().to(photo::upload_photo)),
            )
            .service(
                web::resource("/users/notifications/preferences/{userId}")
                    .wrap(bearer.clone())
                    .route(web::get().to(notifications::read_user_notification_preferences)),
            )
            // matches
            .service(
                web::resource("/matches/preferences/submit")
                    .wrap(bearer.clone())
                    .route(web::post().to(matches::update_match_preferences)),
            )
            .service(
                web::resource("/matches/near/location/{lat}/{long}")
                    .route(web::get().to(matches::read_matches_nearby)),
            )
            .service(
                web::resource("/matches/preferences/user/id/{userid}")
                    .wrap(bearer.clone())
                    .route(web::get().to(matches::read_user_matches_preferences_by_id)),
            )
            .service(
                web::resource("/matches/calculate")
                    .wrap(bearer.clone())
                    .route(web::post().to(matches::calculate_user_matches)),
            )
            // survey
            .service(
                web::resource("/survey/submit")
                    .wrap(bearer.clone())
                    .route(web::post().to(survey::update_survey_response)),
            )
            .service(
                web::resource("/survey/user/id/{userid}")
                    .wrap(bearer.clone())
                    .route(web::get().to(survey::read_survey_response))
                    .route(web::delete().to(survey::delete_survey_response)),
            )
            .service(
                web::resource("/survey/except/id/{userid}")
                    .wrap(bearer.clone())
                    .route(web::get().to(survey::read_survey_response_except)),
            )
            // notifications
            .service(
                web::resource("/notifications/preferences")
                    .wrap(bearer.clone())
                    .route(web::post().to(notifications::create_notification_preferences))
                    .route(web::put().to(notifications::update_notification_preferences)),
            )
            .service(
                web::resource("/notifications/send/new-match-request/ids")
                    .wrap(bearer.clone())
                    .route(web::post().to(notifications::send_new_match_request)),
            )
            .service(
                web::resource("/notifications/send/new-match-accepted/ids")
                    .wrap(bearer.clone())
                    .route(web::post().to(notifications::send_new_match_accepted)),
            )
            // mail
            .service(
                web::resource("/mail/send")
                    .wrap(bearer.clone())
                    .route(web::post().to(mail::send_mail)),
            )
            .service(
                web::resource("/mail/relationship/send")
                    .wrap(bearer.clone())
                    .route(web::post().to(mail::send_relationship_mail)),
            )
            .service(
                web::resource("/mail/match")
                    .wrap(bearer)
                    .route(web::post().to(mail::mail_match)),
            )
            .service(web::resource("/mail/mx/{email}").route(web::get().to(mail::check_mx))),
    );
}

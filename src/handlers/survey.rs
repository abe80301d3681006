use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use sqlx::PgPool;
use log::info;
use crate::db;
use crate::errors::AppError;
use crate::models::answer::Candidate;
use crate::services::matching::candidate_pool;
use crate::utils::jwt::authorize_user;

/// A survey form: `userId` plus one entry per question, in question order.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveySubmission {
    user_id: i64,
    #[serde(flatten)]
    answers: Map<String, Value>,
}

fn invalid_question(key: &str) -> Value {
    json!({ "error": "IVQ", "message": "Invalid Question", "key": key })
}

fn answer_value(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) if n.as_f64().map_or(false, f64::is_finite) => Some(n.to_string()),
        Value::String(s) => {
            let s = s.trim();
            match s.parse::<f64>() {
                Ok(v) if v.is_finite() => Some(s.to_string()),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Joins the answers in submission order, or lists every question that is not a number.
pub fn collect_answers(answers: &Map<String, Value>) -> Result<String, Vec<Value>> {
    if answers.is_empty() {
        return Err(vec![invalid_question("answers")]);
    }

    let mut values = Vec::with_capacity(answers.len());
    let mut errors = Vec::new();
    for (key, value) in answers {
        match answer_value(value) {
            Some(v) => values.push(v),
            None => errors.push(invalid_question(key)),
        }
    }

    if errors.is_empty() {
        Ok(values.join(","))
    } else {
        Err(errors)
    }
}

// POST /api/survey/submit
pub async fn update_survey_response(
    http: HttpRequest,
    req: web::Json<SurveySubmission>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    authorize_user(&http, req.user_id)?;

    let answers = match collect_answers(&req.answers) {
        Ok(answers) => answers,
        Err(errors) => return Ok(super::field_errors(errors)),
    };

    let stored = db::answers::upsert_answers(&pool, req.user_id, &answers)
        .await
        .map_err(AppError::database)?;

    info!("survey.submit user={} questions={}", req.user_id, req.answers.len());
    Ok(HttpResponse::Ok().json(stored))
}

// GET /api/survey/user/id/{userid}
pub async fn read_survey_response(
    http: HttpRequest,
    user_id: web::Path<i64>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let user_id = user_id.into_inner();
    authorize_user(&http, user_id)?;

    let answers = db::answers::find_by_user(&pool, user_id)
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::NotFound(format!("No survey answers for user {}", user_id)))?;

    Ok(HttpResponse::Ok().json(answers))
}

// GET /api/survey/except/id/{userid}
pub async fn read_survey_response_except(
    http: HttpRequest,
    user_id: web::Path<i64>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let user_id = user_id.into_inner();
    authorize_user(&http, user_id)?;

    let candidates: Vec<Candidate> = candidate_pool(&pool, user_id)
        .await?
        .into_iter()
        .map(Candidate::from)
        .collect();

    Ok(HttpResponse::Ok().json(candidates))
}

// DELETE /api/survey/user/id/{userid}
pub async fn delete_survey_response(
    http: HttpRequest,
    user_id: web::Path<i64>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let user_id = user_id.into_inner();
    authorize_user(&http, user_id)?;

    let deleted = db::answers::delete_by_user(&pool, user_id)
        .await
        .map_err(AppError::database)?;

    if deleted == 0 {
        return Err(AppError::NotFound(format!("No survey answers for user {}", user_id)));
    }

    Ok(super::ok_with(json!({ "deleted": deleted })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(body: Value) -> Map<String, Value> {
        match body {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn answers_keep_submission_order() {
        let answers = form(json!({ "q3": "5", "q1": 2, "q2": " 4 " }));
        assert_eq!(collect_answers(&answers).unwrap(), "5,2,4");
    }

    #[test]
    fn every_bad_question_is_reported() {
        let answers = form(json!({ "q1": "", "q2": 3, "q3": "often", "q4": null }));
        let errors = collect_answers(&answers).unwrap_err();
        let keys: Vec<&str> = errors.iter().map(|e| e["key"].as_str().unwrap()).collect();
        assert_eq!(keys, vec!["q1", "q3", "q4"]);
        assert!(errors.iter().all(|e| e["error"] == "IVQ"));
    }

    #[test]
    fn empty_form_is_rejected() {
        assert!(collect_answers(&Map::new()).is_err());
    }

    #[test]
    fn user_id_is_not_an_answer() {
        let submission: SurveySubmission =
            serde_json::from_value(json!({ "userId": 4, "q1": "1", "q2": "2" })).unwrap();
        assert_eq!(submission.user_id, 4);
        assert_eq!(collect_answers(&submission.answers).unwrap(), "1,2");
    }
}

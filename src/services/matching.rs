//! Survey-distance scoring and candidate selection.
//!
//! A score is the sum of absolute per-question differences between two answer
//! vectors, so lower means closer. Scores are handed to the relationships API
//! unranked.

use log::warn;
use serde::Serialize;
use sqlx::PgPool;

use crate::db;
use crate::errors::AppError;
use crate::models::answer::CandidateRow;
use crate::models::match_pref::{DEFAULT_DISTANCE, GENDER_ANY, GENDER_SAME};
use crate::utils::geo::BoundingBox;

/// `[candidateId, score]`, serialized as a two element array.
#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct MatchScore(pub i64, pub f64);

/// Parses a stored comma-joined answer string.
pub fn parse_answers(raw: &str) -> Result<Vec<f64>, String> {
    raw.split(',')
        .map(|entry| {
            let entry = entry.trim();
            entry
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .ok_or_else(|| format!("'{}' is not a number", entry))
        })
        .collect()
}

/// `None` when the vectors cannot be compared question by question.
pub fn score(own: &[f64], other: &[f64]) -> Option<f64> {
    if own.len() != other.len() {
        return None;
    }
    Some(own.iter().zip(other).map(|(a, b)| (a - b).abs()).sum())
}

/// Scores every usable candidate. Malformed or differently sized vectors are skipped.
pub fn score_candidates(own: &[f64], candidates: &[CandidateRow]) -> Vec<MatchScore> {
    candidates
        .iter()
        .filter_map(|candidate| {
            let answers = match parse_answers(&candidate.answers) {
                Ok(answers) => answers,
                Err(e) => {
                    warn!("matches.score.skip user={} {}", candidate.user_id, e);
                    return None;
                }
            };
            match score(own, &answers) {
                Some(total) => Some(MatchScore(candidate.user_id, total)),
                None => {
                    warn!(
                        "matches.score.skip user={} expected {} answers, got {}",
                        candidate.user_id,
                        own.len(),
                        answers.len()
                    );
                    None
                }
            }
        })
        .collect()
}

/// Gender filter between the requester and one candidate.
///
/// * requester wants `any`: the candidate must also accept `any`, or accept `same`
///   and share the requester's gender.
/// * requester wants `same`: the candidate must share the requester's gender.
/// * anything else: no filter.
pub fn gender_compatible(
    requester_gender: Option<&str>,
    requester_pref: &str,
    candidate_gender: Option<&str>,
    candidate_pref: Option<&str>,
) -> bool {
    let same_gender = matches!((requester_gender, candidate_gender), (Some(a), Some(b)) if a == b);

    match requester_pref {
        GENDER_ANY => match candidate_pref {
            Some(GENDER_ANY) => true,
            Some(GENDER_SAME) => same_gender,
            _ => false,
        },
        GENDER_SAME => same_gender,
        _ => true,
    }
}

/// Other users whose answers may be scored against `user_id`.
pub async fn candidate_pool(pool: &PgPool, user_id: i64) -> Result<Vec<CandidateRow>, AppError> {
    let context = db::users::match_context(pool, user_id)
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

    let (lat, long) = match (context.latitude, context.longitude) {
        (Some(lat), Some(long)) => (lat, long),
        _ => {
            return Err(AppError::BadRequest(format!(
                "User {} has no location set",
                user_id
            )))
        }
    };

    let distance = context.distance.unwrap_or(DEFAULT_DISTANCE);
    let gender_pref = context.gender_pref.as_deref().unwrap_or(GENDER_ANY);
    let bounds = BoundingBox::around(lat, long, f64::from(distance));

    let rows = db::answers::candidates_in_box(pool, user_id, &bounds)
        .await
        .map_err(AppError::database)?;

    Ok(rows
        .into_iter()
        .filter(|row| {
            gender_compatible(
                context.gender.as_deref(),
                gender_pref,
                row.gender.as_deref(),
                row.gender_pref.as_deref(),
            )
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(user_id: i64, answers: &str) -> CandidateRow {
        CandidateRow {
            user_id,
            answers: answers.to_string(),
            gender: None,
            latitude: None,
            longitude: None,
            distance: None,
            gender_pref: None,
        }
    }

    #[test]
    fn identical_answers_score_zero() {
        assert_eq!(score(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]), Some(0.0));
    }

    #[test]
    fn score_is_sum_of_absolute_differences() {
        assert_eq!(score(&[1.0, 2.0, 3.0], &[4.0, 4.0, 4.0]), Some(6.0));
        assert_eq!(score(&[5.0, 1.0], &[1.0, 5.0]), Some(8.0));
    }

    #[test]
    fn length_mismatch_has_no_score() {
        assert_eq!(score(&[1.0, 2.0, 3.0], &[1.0, 2.0]), None);
    }

    #[test]
    fn parse_accepts_whitespace_and_rejects_garbage() {
        assert_eq!(parse_answers("1, 2,3").unwrap(), vec![1.0, 2.0, 3.0]);
        assert!(parse_answers("1,,3").is_err());
        assert!(parse_answers("1,x,3").is_err());
        assert!(parse_answers("").is_err());
        assert!(parse_answers("1,NaN").is_err());
    }

    #[test]
    fn score_candidates_skips_unusable_rows() {
        let own = [1.0, 2.0, 3.0];
        let candidates = vec![
            candidate(10, "1,2,3"),
            candidate(11, "4,4,4"),
            candidate(12, "4,4"),
            candidate(13, "4,four,4"),
        ];

        let scores = score_candidates(&own, &candidates);
        assert_eq!(scores, vec![MatchScore(10, 0.0), MatchScore(11, 6.0)]);
    }

    #[test]
    fn empty_pool_scores_nothing() {
        assert!(score_candidates(&[1.0], &[]).is_empty());
    }

    #[test]
    fn scores_serialize_as_pairs() {
        let json = serde_json::to_value(vec![MatchScore(3, 6.0)]).unwrap();
        assert_eq!(json, serde_json::json!([[3, 6.0]]));
    }

    #[test]
    fn requester_open_to_anyone() {
        let me = Some("female");
        assert!(gender_compatible(me, "any", Some("male"), Some("any")));
        assert!(gender_compatible(me, "any", Some("female"), Some("same")));
        assert!(!gender_compatible(me, "any", Some("male"), Some("same")));
        assert!(!gender_compatible(me, "any", Some("male"), None));
    }

    #[test]
    fn requester_wants_same_gender() {
        let me = Some("male");
        assert!(gender_compatible(me, "same", Some("male"), Some("any")));
        assert!(!gender_compatible(me, "same", Some("female"), Some("any")));
        assert!(!gender_compatible(None, "same", None, Some("any")));
    }

    #[test]
    fn other_preferences_do_not_filter() {
        assert!(gender_compatible(Some("male"), "female", Some("male"), None));
    }
}

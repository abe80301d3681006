//! Client for the external relationships API.

use log::error;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::services::matching::MatchScore;

#[derive(Clone)]
pub struct RelationshipsClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateRelationships<'a> {
    matches: &'a [MatchScore],
    user_id: i64,
}

#[derive(Deserialize)]
struct EmailAddressResponse {
    data: Vec<EmailAddressEntry>,
}

#[derive(Deserialize)]
struct EmailAddressEntry {
    requester: EmailHolder,
}

#[derive(Deserialize)]
struct EmailHolder {
    email: String,
}

impl RelationshipsClient {
    pub fn new(base_url: &str) -> Self {
        RelationshipsClient {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/relationships/{}", self.base_url, path)
    }

    /// Forwards scores to `POST /api/relationships/create`, returning its body as-is.
    pub async fn create(
        &self,
        token: &str,
        user_id: i64,
        matches: &[MatchScore],
    ) -> Result<serde_json::Value, AppError> {
        let response = self
            .http
            .post(self.url("create"))
            .bearer_auth(token)
            .json(&CreateRelationships { matches, user_id })
            .send()
            .await
            .map_err(upstream_error)?;

        response.json().await.map_err(upstream_error)
    }

    /// Real address behind a relationship proxy.
    pub async fn email_for_proxy(&self, token: &str, proxy: &str) -> Result<String, AppError> {
        let response = self
            .http
            .get(self.url(&format!("email-address/{}", proxy)))
            .bearer_auth(token)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(upstream_error)?;

        let body: EmailAddressResponse = response.json().await.map_err(upstream_error)?;
        body.data
            .into_iter()
            .next()
            .map(|entry| entry.requester.email)
            .ok_or_else(|| AppError::NotFound(format!("No relationship for proxy {}", proxy)))
    }
}

fn upstream_error(err: reqwest::Error) -> AppError {
    error!("relationships.request.failed {}", err);
    AppError::InternalServerError(format!("Relationships API error: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_joined_without_double_slashes() {
        let client = RelationshipsClient::new("http://localhost:5000/");
        assert_eq!(
            client.url("create"),
            "http://localhost:5000/api/relationships/create"
        );
    }

    #[test]
    fn create_body_matches_wire_shape() {
        let matches = [MatchScore(4, 2.0)];
        let body = serde_json::to_value(CreateRelationships { matches: &matches, user_id: 9 }).unwrap();
        assert_eq!(body, serde_json::json!({ "matches": [[4, 2.0]], "userId": 9 }));
    }

    #[test]
    fn email_lookup_reads_first_requester() {
        let body: EmailAddressResponse = serde_json::from_str(
            r#"{"data":[{"requester":{"email":"a@example.org"}},{"requester":{"email":"b@example.org"}}]}"#,
        )
        .unwrap();
        assert_eq!(body.data[0].requester.email, "a@example.org");
    }
}

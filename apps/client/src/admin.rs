//! Admin console client. The API key is an explicit value injected at
//! construction — never read from ambient browser storage — and an empty
//! key fails every operation before it can reach the network.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::http::{error_from_response, ApiClient};

#[derive(Debug, Clone)]
pub struct AdminKey(String);

impl AdminKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

/// A job-creation form as the admin typed it: skill lists are free text,
/// years is a text field. `payload()` does the coercion.
#[derive(Debug, Clone, Default)]
pub struct JobDraft {
    pub title: String,
    pub company: String,
    pub role: String,
    pub jd_text: String,
    /// Comma-separated free text.
    pub must_have: String,
    /// Comma-separated free text.
    pub nice_to_have: String,
    /// Text field; coerced to a number, defaulting to 0.
    pub min_exp_years: String,
    pub location: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewJobPayload {
    pub title: String,
    pub company: String,
    pub role: String,
    pub jd_text: String,
    pub must_have: Vec<String>,
    pub nice_to_have: Vec<String>,
    pub min_exp_years: f64,
    pub location: String,
}

impl JobDraft {
    /// The outgoing wire payload: skill text split on commas (trimmed,
    /// empties dropped, order preserved) and years coerced to a number.
    pub fn payload(&self) -> NewJobPayload {
        NewJobPayload {
            title: self.title.clone(),
            company: self.company.clone(),
            role: self.role.clone(),
            jd_text: self.jd_text.clone(),
            must_have: parse_skill_list(&self.must_have),
            nice_to_have: parse_skill_list(&self.nice_to_have),
            min_exp_years: coerce_years(&self.min_exp_years),
            location: self.location.clone(),
        }
    }
}

/// Splits comma-separated skills: trimmed, empty segments dropped, input
/// order preserved.
pub fn parse_skill_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn coerce_years(raw: &str) -> f64 {
    raw.trim().parse().unwrap_or(0.0)
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RegisteredUser {
    pub email: String,
    pub candidate_id: String,
}

#[derive(Debug, Deserialize)]
struct UsersResponse {
    users: Vec<RegisteredUser>,
}

#[derive(Debug, Deserialize)]
struct CreateJobResponse {
    job_id: String,
}

pub struct AdminClient {
    api: ApiClient,
    key: AdminKey,
}

impl AdminClient {
    pub fn new(api: ApiClient, key: AdminKey) -> Self {
        Self { api, key }
    }

    fn require_key(&self) -> Result<&str> {
        if self.key.is_empty() {
            return Err(Error::Validation("Enter Admin API Key first!".to_string()));
        }
        Ok(&self.key.0)
    }

    /// Creates a job posting; returns the new job id.
    pub async fn create_job(&self, draft: &JobDraft) -> Result<String> {
        let key = self.require_key()?;
        let response = self
            .api
            .http
            .post(self.api.url("/admin/job/create"))
            .header("X-API-Key", key)
            .json(&draft.payload())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        let body: CreateJobResponse = response.json().await?;
        Ok(body.job_id)
    }

    /// Lists registered users. Fails closed: any non-2xx or transport error
    /// is an error, never partial data.
    pub async fn list_users(&self) -> Result<Vec<RegisteredUser>> {
        let key = self.require_key()?;
        let response = self
            .api
            .http
            .get(self.api.url("/admin/users"))
            .query(&[("admin_key", key)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        let body: UsersResponse = response.json().await?;
        Ok(body.users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_skill_parsing_trims_drops_empties_preserves_order() {
        assert_eq!(
            parse_skill_list("figma, , prototyping"),
            vec!["figma", "prototyping"]
        );
        assert_eq!(
            parse_skill_list(" react ,typescript,  jest  "),
            vec!["react", "typescript", "jest"]
        );
        assert!(parse_skill_list("").is_empty());
        assert!(parse_skill_list(" , ,, ").is_empty());
    }

    #[test]
    fn test_years_text_coerces_to_number() {
        let draft = JobDraft {
            min_exp_years: "2".to_string(),
            ..JobDraft::default()
        };
        assert_eq!(draft.payload().min_exp_years, 2.0);

        let blank = JobDraft::default();
        assert_eq!(blank.payload().min_exp_years, 0.0);

        let junk = JobDraft {
            min_exp_years: "lots".to_string(),
            ..JobDraft::default()
        };
        assert_eq!(junk.payload().min_exp_years, 0.0);
    }

    #[tokio::test]
    async fn test_empty_key_blocks_both_operations_before_network() {
        let server = MockServer::start().await;
        let client = AdminClient::new(ApiClient::new(server.uri()), AdminKey::new(""));

        assert!(matches!(
            client.create_job(&JobDraft::default()).await,
            Err(Error::Validation(_))
        ));
        assert!(matches!(client.list_users().await, Err(Error::Validation(_))));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_job_sends_header_and_coerced_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/admin/job/create"))
            .and(header("X-API-Key", "sekrit"))
            .and(body_partial_json(json!({
                "must_have": ["figma", "prototyping"],
                "min_exp_years": 2.0
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "job_id": "new-job-id"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = AdminClient::new(ApiClient::new(server.uri()), AdminKey::new("sekrit"));
        let draft = JobDraft {
            title: "Product Designer".to_string(),
            company: "Google".to_string(),
            role: "UI/UX Designer".to_string(),
            jd_text: "Design things".to_string(),
            must_have: "figma, , prototyping".to_string(),
            nice_to_have: "user research".to_string(),
            min_exp_years: "2".to_string(),
            location: "Bengaluru".to_string(),
        };
        let job_id = client.create_job(&draft).await.unwrap();
        assert_eq!(job_id, "new-job-id");
    }

    #[tokio::test]
    async fn test_list_users_sends_key_as_query_param() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/admin/users"))
            .and(query_param("admin_key", "sekrit"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "total_users": 1,
                "users": [{ "email": "a@b.com", "candidate_id": "123456" }]
            })))
            .mount(&server)
            .await;

        let client = AdminClient::new(ApiClient::new(server.uri()), AdminKey::new("sekrit"));
        let users = client.list_users().await.unwrap();
        assert_eq!(
            users,
            vec![RegisteredUser {
                email: "a@b.com".to_string(),
                candidate_id: "123456".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_list_users_fails_closed_on_forbidden() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/admin/users"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "detail": "Unauthorized: Invalid Admin Key"
            })))
            .mount(&server)
            .await;

        let client = AdminClient::new(ApiClient::new(server.uri()), AdminKey::new("wrong"));
        let err = client.list_users().await.unwrap_err();
        assert!(matches!(err, Error::Server { status: 403, .. }));
    }
}

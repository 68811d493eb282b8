//! Resume upload orchestration and the candidate's rankings view.

use chrono::{DateTime, Utc};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::http::{error_from_response, ApiClient};

/// Rankings shown per screen.
pub const DISPLAY_CAP: usize = 8;

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Ranking {
    pub candidate_id: String,
    pub score: f64,
    pub analysis: Value,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub resume_excerpt: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub ok: bool,
    pub candidate_id: String,
    pub job_id: String,
    pub analysis: Value,
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct CandidateIdResponse {
    candidate_id: String,
}

/// Candidate IDs are exactly six ASCII digits; nothing else may upload.
pub fn is_valid_candidate_id(id: &str) -> bool {
    id.len() == 6 && id.chars().all(|c| c.is_ascii_digit())
}

pub struct ScreeningClient {
    api: ApiClient,
}

impl ScreeningClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Fetches (or lazily creates) the stable candidate ID for an email.
    pub async fn fetch_candidate_id(&self, email: &str) -> Result<String> {
        let response = self
            .api
            .http
            .post(self.api.url("/generate_candidate_id"))
            .form(&[("email", email)])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        let body: CandidateIdResponse = response.json().await?;
        Ok(body.candidate_id)
    }

    /// Uploads a resume for scoring. Preconditions are enforced before any
    /// network I/O; a rejected call never reaches the backend.
    pub async fn upload(
        &self,
        job_id: &str,
        candidate_id: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadResponse> {
        if job_id.trim().is_empty() || bytes.is_empty() {
            return Err(Error::Validation(
                "Select a job and upload a resume first.".to_string(),
            ));
        }
        if !is_valid_candidate_id(candidate_id) {
            return Err(Error::Validation(
                "Add correct 6-digit Candidate ID before analyzing.".to_string(),
            ));
        }

        let form = Form::new()
            .text("candidate_id", candidate_id.to_string())
            .text("job_id", job_id.to_string())
            .part("file", Part::bytes(bytes).file_name(file_name.to_string()));

        let response = self
            .api
            .http
            .post(self.api.url("/resume/upload_file"))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            // The server's detail message is surfaced verbatim when present.
            return Err(error_from_response(response).await);
        }
        Ok(response.json().await?)
    }

    /// Fetches this candidate's rankings for a job. A missing id on either
    /// side is a silent no-op; network failures are logged, not surfaced.
    pub async fn fetch_rankings(&self, job_id: &str, candidate_id: &str) -> Vec<Ranking> {
        if job_id.is_empty() || candidate_id.is_empty() {
            return Vec::new();
        }
        match self.try_fetch_rankings(job_id, candidate_id).await {
            Ok(rankings) => rankings,
            Err(e) => {
                tracing::warn!("Error fetching rankings: {e}");
                Vec::new()
            }
        }
    }

    async fn try_fetch_rankings(&self, job_id: &str, candidate_id: &str) -> Result<Vec<Ranking>> {
        let response = self
            .api
            .http
            .get(self.api.url(&format!("/rankings/{job_id}")))
            .query(&[("candidate_id", candidate_id)])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        let body: Value = response.json().await?;
        // Tolerate a non-list body the same way the jobs client does.
        let Some(items) = body.as_array() else {
            return Ok(Vec::new());
        };
        Ok(items
            .iter()
            .filter_map(|item| serde_json::from_value(item.clone()).ok())
            .collect())
    }
}

/// The display projection: newest first by `created_at`, capped to
/// [`DISPLAY_CAP`] entries.
pub fn top_rankings(rankings: &[Ranking]) -> Vec<&Ranking> {
    let mut ordered: Vec<&Ranking> = rankings.iter().collect();
    ordered.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    ordered.truncate(DISPLAY_CAP);
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_candidate_id_validation() {
        assert!(is_valid_candidate_id("123456"));
        assert!(!is_valid_candidate_id("12345"));
        assert!(!is_valid_candidate_id("1234567"));
        assert!(!is_valid_candidate_id("12345a"));
        assert!(!is_valid_candidate_id("12 456"));
        assert!(!is_valid_candidate_id(""));
    }

    fn ranking_at(day: u32) -> Ranking {
        Ranking {
            candidate_id: "123456".to_string(),
            score: 50.0,
            analysis: json!({}),
            created_at: Utc.with_ymd_and_hms(2025, 1, day, 0, 0, 0).unwrap(),
            resume_excerpt: String::new(),
        }
    }

    #[test]
    fn test_top_rankings_orders_newest_first_and_caps_to_eight() {
        let rankings: Vec<Ranking> = (1..=12).map(ranking_at).collect();
        let top = top_rankings(&rankings);
        assert_eq!(top.len(), DISPLAY_CAP);
        assert_eq!(top[0].created_at, ranking_at(12).created_at);
        assert_eq!(top[7].created_at, ranking_at(5).created_at);
    }

    #[test]
    fn test_top_rankings_short_list_passes_through() {
        let rankings: Vec<Ranking> = (1..=3).map(ranking_at).collect();
        let top = top_rankings(&rankings);
        assert_eq!(top.len(), 3);
        assert_eq!(top[0].created_at, ranking_at(3).created_at);
    }

    #[tokio::test]
    async fn test_invalid_candidate_id_rejected_before_any_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/resume/upload_file"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = ScreeningClient::new(ApiClient::new(server.uri()));
        for bad in ["12345", "abcdef", "1234567", ""] {
            let err = client
                .upload("job-1", bad, "resume.pdf", b"content".to_vec())
                .await
                .unwrap_err();
            assert!(matches!(err, Error::Validation(_)), "{bad} should be rejected");
        }
    }

    #[tokio::test]
    async fn test_missing_job_or_file_rejected_before_any_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/resume/upload_file"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = ScreeningClient::new(ApiClient::new(server.uri()));
        assert!(client
            .upload("", "123456", "r.pdf", b"x".to_vec())
            .await
            .is_err());
        assert!(client
            .upload("job-1", "123456", "r.pdf", Vec::new())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_upload_success_returns_analysis() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/resume/upload_file"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "candidate_id": "123456",
                "job_id": "job-1",
                "analysis": { "accuracy": 71.5, "bucket": "frontend" },
                "message": "Resume analyzed successfully."
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ScreeningClient::new(ApiClient::new(server.uri()));
        let outcome = client
            .upload("job-1", "123456", "resume.pdf", b"resume bytes".to_vec())
            .await
            .unwrap();
        assert!(outcome.ok);
        assert_eq!(outcome.analysis["accuracy"], json!(71.5));
    }

    #[tokio::test]
    async fn test_server_detail_surfaced_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/resume/upload_file"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "detail": "Add correct candidate ID before trying again."
            })))
            .mount(&server)
            .await;

        let client = ScreeningClient::new(ApiClient::new(server.uri()));
        let err = client
            .upload("job-1", "123456", "resume.pdf", b"x".to_vec())
            .await
            .unwrap_err();
        match err {
            Error::Server { status, detail } => {
                assert_eq!(status, 403);
                assert_eq!(detail, "Add correct candidate ID before trying again.");
            }
            other => panic!("expected Server error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_rankings_silent_noop_on_missing_ids() {
        let server = MockServer::start().await;
        let client = ScreeningClient::new(ApiClient::new(server.uri()));
        assert!(client.fetch_rankings("", "123456").await.is_empty());
        assert!(client.fetch_rankings("job-1", "").await.is_empty());
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_rankings_failure_is_logged_not_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rankings/job-1"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = ScreeningClient::new(ApiClient::new(server.uri()));
        assert!(client.fetch_rankings("job-1", "123456").await.is_empty());
    }
}

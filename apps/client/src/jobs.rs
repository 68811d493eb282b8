//! Job directory client. No caching — every view re-fetches.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::error::Result;
use crate::http::ApiClient;

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Job {
    pub job_id: String,
    pub title: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

pub struct JobDirectoryClient {
    api: ApiClient,
}

impl JobDirectoryClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Fetches the directory. Any unrecognized response shape or network
    /// failure yields an empty list — the views render "no jobs" rather
    /// than erroring.
    pub async fn list_jobs(&self) -> Vec<Job> {
        match self.fetch().await {
            Ok(jobs) => jobs,
            Err(e) => {
                tracing::warn!("Failed to load jobs: {e}");
                Vec::new()
            }
        }
    }

    async fn fetch(&self) -> Result<Vec<Job>> {
        let response = self.api.http.get(self.api.url("/jobs")).send().await?;
        let body: Value = response.json().await?;
        Ok(normalize_jobs(&body))
    }
}

/// Normalizes the two shapes the backend has been seen to answer with —
/// a bare array, or an object wrapping the list under `jobs` — into one
/// ordered sequence. Anything else is empty.
pub fn normalize_jobs(body: &Value) -> Vec<Job> {
    let items = if let Some(list) = body.as_array() {
        list
    } else if let Some(list) = body.get("jobs").and_then(Value::as_array) {
        list
    } else {
        tracing::warn!("Unexpected jobs response shape");
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| serde_json::from_value(item.clone()).ok())
        .collect()
}

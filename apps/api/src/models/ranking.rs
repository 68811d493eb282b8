use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// One rankings row joined with the candidate's latest resume text.
#[derive(Debug, Clone, FromRow)]
pub struct RankingRow {
    pub candidate_id: String,
    pub score: f64,
    pub reasons: Value,
    pub created_at: DateTime<Utc>,
    pub raw_text: Option<String>,
}

/// Per-job ranking entry returned to candidates and admins.
#[derive(Debug, Clone, Serialize)]
pub struct RankingEntry {
    pub candidate_id: String,
    pub score: f64,
    pub analysis: Value,
    pub created_at: DateTime<Utc>,
    pub resume_excerpt: String,
}

impl From<RankingRow> for RankingEntry {
    fn from(row: RankingRow) -> Self {
        let excerpt = row
            .raw_text
            .as_deref()
            .map(|t| t.chars().take(300).collect())
            .unwrap_or_default();
        RankingEntry {
            candidate_id: row.candidate_id,
            score: row.score,
            analysis: row.reasons,
            created_at: row.created_at,
            resume_excerpt: excerpt,
        }
    }
}

/// Global ranking feed entry (all jobs, newest first).
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct GlobalRankingEntry {
    pub job_id: Uuid,
    pub company: Option<String>,
    pub role: Option<String>,
    pub candidate_id: String,
    pub score: f64,
    #[sqlx(rename = "reasons")]
    pub analysis: Value,
    pub created_at: DateTime<Utc>,
}

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Full job row, used by the scoring pipeline.
#[derive(Debug, Clone, FromRow)]
pub struct JobRow {
    pub id: Uuid,
    pub title: String,
    pub jd_text: String,
    pub must_have: Json<Vec<String>>,
    pub nice_to_have: Json<Vec<String>>,
    pub min_exp_years: f64,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Directory listing shape: jobs joined with job_meta, newest first.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct JobSummary {
    pub job_id: Uuid,
    pub title: String,
    pub company: Option<String>,
    pub role: Option<String>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Admin job-creation payload. Skill lists arrive pre-parsed as arrays;
/// `min_exp_years` is numeric on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct NewJob {
    pub title: String,
    pub company: String,
    pub role: String,
    pub jd_text: String,
    #[serde(default)]
    pub must_have: Vec<String>,
    #[serde(default)]
    pub nice_to_have: Vec<String>,
    #[serde(default)]
    pub min_exp_years: f64,
    pub location: Option<String>,
}

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::types::Json as Db;
use uuid::Uuid;

use crate::errors::AppError;
use crate::jobs::verify_admin_key;
use crate::models::candidate::CandidateBinding;
use crate::models::job::{JobSummary, NewJob};
use crate::state::AppState;

/// GET /jobs — the public directory, newest first. Responds with a bare
/// array (clients also tolerate a `{jobs: [...]}` wrapper from older
/// deployments, but this server emits the plain list).
pub async fn list_jobs(State(state): State<AppState>) -> Result<Json<Vec<JobSummary>>, AppError> {
    let jobs: Vec<JobSummary> = sqlx::query_as(
        "SELECT j.id AS job_id, j.title, jm.company, jm.role, j.location, j.created_at \
         FROM jobs j LEFT JOIN job_meta jm ON jm.job_id = j.id \
         ORDER BY j.created_at DESC",
    )
    .fetch_all(&state.db)
    .await?;
    Ok(Json(jobs))
}

/// POST /admin/job/create — gated by the `X-API-Key` header.
pub async fn create_job(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<NewJob>,
) -> Result<Json<Value>, AppError> {
    let provided = headers.get("x-api-key").and_then(|v| v.to_str().ok());
    verify_admin_key(provided, &state.config.admin_api_key)?;

    if payload.title.trim().is_empty() || payload.jd_text.trim().is_empty() {
        return Err(AppError::Validation(
            "title and jd_text are required".to_string(),
        ));
    }

    let job_id = Uuid::new_v4();
    let mut tx = state.db.begin().await?;

    sqlx::query(
        "INSERT INTO jobs (id, title, jd_text, must_have, nice_to_have, min_exp_years, \
         location, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(job_id)
    .bind(payload.title.trim())
    .bind(payload.jd_text.trim())
    .bind(Db(&payload.must_have))
    .bind(Db(&payload.nice_to_have))
    .bind(payload.min_exp_years)
    .bind(payload.location.as_deref())
    .bind(Utc::now())
    .execute(&mut *tx)
    .await?;

    sqlx::query("INSERT INTO job_meta (job_id, company, role) VALUES ($1, $2, $3)")
        .bind(job_id)
        .bind(payload.company.trim())
        .bind(payload.role.trim())
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!("Created job {job_id} ({} / {})", payload.company, payload.role);
    Ok(Json(json!({ "ok": true, "job_id": job_id })))
}

#[derive(Debug, Deserialize)]
pub struct AdminUsersQuery {
    pub admin_key: Option<String>,
}

/// GET /admin/users?admin_key= — registered emails with their candidate IDs.
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<AdminUsersQuery>,
) -> Result<Json<Value>, AppError> {
    verify_admin_key(query.admin_key.as_deref(), &state.config.admin_api_key)?;

    let users: Vec<CandidateBinding> =
        sqlx::query_as("SELECT email, candidate_id FROM candidate_ids ORDER BY email ASC")
            .fetch_all(&state.db)
            .await?;

    Ok(Json(json!({
        "ok": true,
        "total_users": users.len(),
        "users": users,
    })))
}

use axum::{
    extract::{Multipart, Path, Query, State},
    Form, Json,
};
use bytes::Bytes;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::types::Json as Db;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::ranking::{GlobalRankingEntry, RankingEntry, RankingRow};
use crate::screening::extract;
use crate::screening::parse::parse_resume_text;
use crate::screening::score::JobContext;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CandidateIdRequest {
    pub email: String,
}

/// POST /generate_candidate_id — returns the stable 6-digit ID for an email,
/// creating one on first request. The issued-ID notification is best-effort.
pub async fn generate_candidate_id(
    State(state): State<AppState>,
    Form(req): Form<CandidateIdRequest>,
) -> Result<Json<Value>, AppError> {
    let email = req.email.trim().to_lowercase();
    if email.is_empty() {
        return Err(AppError::Validation("email is required".to_string()));
    }

    let existing: Option<(String,)> =
        sqlx::query_as("SELECT candidate_id FROM candidate_ids WHERE email = $1")
            .bind(&email)
            .fetch_optional(&state.db)
            .await?;
    if let Some((candidate_id,)) = existing {
        tracing::debug!("Existing candidate ID found for {email}");
        return Ok(Json(json!({
            "ok": true,
            "candidate_id": candidate_id,
            "msg": "Already exists",
        })));
    }

    let candidate_id = allocate_candidate_id(&state.db).await?;
    sqlx::query("INSERT INTO candidate_ids (email, candidate_id) VALUES ($1, $2)")
        .bind(&email)
        .bind(&candidate_id)
        .execute(&state.db)
        .await?;

    if let Err(e) = state.notifier.candidate_id_issued(&email, &candidate_id).await {
        tracing::warn!("Candidate ID notification failed for {email}: {e}");
    }

    Ok(Json(json!({
        "ok": true,
        "candidate_id": candidate_id,
        "msg": "Created new",
    })))
}

/// Draws 6-digit IDs until one is free. The range holds 900k values, so a
/// bounded retry loop is plenty.
async fn allocate_candidate_id(db: &PgPool) -> Result<String, AppError> {
    for _ in 0..16 {
        let id = random_six_digits();
        let taken: Option<(String,)> =
            sqlx::query_as("SELECT candidate_id FROM candidate_ids WHERE candidate_id = $1")
                .bind(&id)
                .fetch_optional(db)
                .await?;
        if taken.is_none() {
            return Ok(id);
        }
    }
    Err(AppError::Internal(anyhow::anyhow!(
        "could not allocate a unique candidate id"
    )))
}

fn random_six_digits() -> String {
    let bytes = *Uuid::new_v4().as_bytes();
    let n = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    format!("{}", 100_000 + n % 900_000)
}

/// POST /resume/upload_file — multipart `candidate_id`, `job_id`, `file`.
///
/// Validation order matches the client contract: unknown candidate (403),
/// missing file (400), unsupported type (415), unreadable text (422),
/// unknown job (404).
pub async fn upload_resume(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let mut candidate_id: Option<String> = None;
    let mut job_id: Option<String> = None;
    let mut file: Option<(String, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart request: {e}")))?
    {
        match field.name() {
            Some("candidate_id") => {
                candidate_id = Some(field.text().await.map_err(multipart_error)?);
            }
            Some("job_id") => {
                job_id = Some(field.text().await.map_err(multipart_error)?);
            }
            Some("file") => {
                let name = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(multipart_error)?;
                file = Some((name, data));
            }
            _ => {}
        }
    }

    let candidate_id = candidate_id
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| AppError::Validation("candidate_id is required".to_string()))?;
    let job_id_raw = job_id
        .filter(|j| !j.trim().is_empty())
        .ok_or_else(|| AppError::Validation("job_id is required".to_string()))?;

    // Validate the candidate ID first.
    let known: Option<(String,)> =
        sqlx::query_as("SELECT candidate_id FROM candidate_ids WHERE candidate_id = $1")
            .bind(&candidate_id)
            .fetch_optional(&state.db)
            .await?;
    if known.is_none() {
        return Err(AppError::Forbidden(
            "Add correct candidate ID before trying again.".to_string(),
        ));
    }

    let (file_name, data) = file.ok_or_else(|| AppError::Validation("No file provided.".to_string()))?;
    if file_name.is_empty() {
        return Err(AppError::Validation("No file provided.".to_string()));
    }

    let text = extract::extract_text(&file_name, &data)?;
    let text = text.trim().to_string();
    if text.is_empty() {
        return Err(AppError::Unprocessable(
            "Parsed text is empty or unreadable.".to_string(),
        ));
    }

    // A malformed id cannot name a job, so it gets the same 404.
    let job_uuid: Uuid = job_id_raw
        .trim()
        .parse()
        .map_err(|_| AppError::NotFound("Job not found in database.".to_string()))?;
    let job: Option<crate::models::job::JobRow> = sqlx::query_as("SELECT * FROM jobs WHERE id = $1")
        .bind(job_uuid)
        .fetch_optional(&state.db)
        .await?;
    let job = job.ok_or_else(|| AppError::NotFound("Job not found in database.".to_string()))?;

    let meta: Option<(String, String)> =
        sqlx::query_as("SELECT company, role FROM job_meta WHERE job_id = $1")
            .bind(job_uuid)
            .fetch_optional(&state.db)
            .await?;
    let (company, role) = meta.unwrap_or_default();

    let parsed = parse_resume_text(&text);
    let context = JobContext {
        company: &company,
        role: &role,
        jd_text: &job.jd_text,
        must_have: &job.must_have.0,
        nice_to_have: &job.nice_to_have.0,
        min_exp_years: job.min_exp_years,
    };
    let analysis = state.scorer.score(&context, &parsed, &text).await?;

    let source = file_name.rsplit('.').next().unwrap_or_default().to_lowercase();
    let now = Utc::now();

    sqlx::query(
        "INSERT INTO resumes (candidate_id, source, raw_text, parsed, updated_at) \
         VALUES ($1, $2, $3, $4, $5) \
         ON CONFLICT (candidate_id) DO UPDATE SET source = EXCLUDED.source, \
         raw_text = EXCLUDED.raw_text, parsed = EXCLUDED.parsed, \
         updated_at = EXCLUDED.updated_at",
    )
    .bind(&candidate_id)
    .bind(&source)
    .bind(&text)
    .bind(Db(&parsed))
    .bind(now)
    .execute(&state.db)
    .await?;

    sqlx::query(
        "INSERT INTO rankings (job_id, candidate_id, score, reasons, created_at) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(job_uuid)
    .bind(&candidate_id)
    .bind(analysis.accuracy)
    .bind(Db(&analysis))
    .bind(now)
    .execute(&state.db)
    .await?;

    tracing::info!(
        "Scored resume for candidate {candidate_id} against job {job_uuid}: {}",
        analysis.accuracy
    );

    Ok(Json(json!({
        "ok": true,
        "candidate_id": candidate_id,
        "job_id": job_uuid,
        "analysis": analysis,
        "message": "Resume analyzed successfully.",
    })))
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::Validation(format!("Malformed multipart request: {e}"))
}

#[derive(Debug, Deserialize)]
pub struct RankingsQuery {
    pub candidate_id: Option<String>,
}

/// GET /rankings/:job_id?candidate_id= — per-job rankings. Scoped to one
/// candidate when the query parameter is present; empty list, never 404.
pub async fn rankings_for_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Query(query): Query<RankingsQuery>,
) -> Result<Json<Vec<RankingEntry>>, AppError> {
    let candidate = query.candidate_id.filter(|c| !c.is_empty());

    let rows: Vec<RankingRow> = if let Some(candidate_id) = candidate {
        sqlx::query_as(
            "SELECT r.candidate_id, r.score, r.reasons, r.created_at, res.raw_text \
             FROM rankings r \
             LEFT JOIN resumes res ON res.candidate_id = r.candidate_id \
             WHERE r.job_id = $1 AND r.candidate_id = $2 \
             ORDER BY r.score DESC, r.created_at DESC",
        )
        .bind(job_id)
        .bind(candidate_id)
        .fetch_all(&state.db)
        .await?
    } else {
        sqlx::query_as(
            "SELECT r.candidate_id, r.score, r.reasons, r.created_at, res.raw_text \
             FROM rankings r \
             LEFT JOIN resumes res ON res.candidate_id = r.candidate_id \
             WHERE r.job_id = $1 \
             ORDER BY r.score DESC",
        )
        .bind(job_id)
        .fetch_all(&state.db)
        .await?
    };

    Ok(Json(rows.into_iter().map(RankingEntry::from).collect()))
}

/// GET /rankings — global feed across jobs, newest first.
pub async fn all_rankings(
    State(state): State<AppState>,
) -> Result<Json<Vec<GlobalRankingEntry>>, AppError> {
    let rows: Vec<GlobalRankingEntry> = sqlx::query_as(
        "SELECT r.job_id, jm.company, jm.role, r.candidate_id, r.score, r.reasons, r.created_at \
         FROM rankings r \
         LEFT JOIN job_meta jm ON jm.job_id = r.job_id \
         ORDER BY r.created_at DESC",
    )
    .fetch_all(&state.db)
    .await?;
    Ok(Json(rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_six_digits_shape() {
        for _ in 0..100 {
            let id = random_six_digits();
            assert_eq!(id.len(), 6);
            assert!(id.chars().all(|c| c.is_ascii_digit()));
            let n: u32 = id.parse().unwrap();
            assert!((100_000..1_000_000).contains(&n));
        }
    }
}

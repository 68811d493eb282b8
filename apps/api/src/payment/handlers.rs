use axum::{
    extract::{Multipart, State},
    Json,
};
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::payment::{ProofImage, ResumeRequest};
use crate::state::AppState;

/// POST /api/save — multipart resume-creation profile with an optional
/// payment-proof image. Field names are part of the client contract.
pub async fn save_resume_request(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let mut request = ResumeRequest::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart request: {e}")))?
    {
        match field.name() {
            Some("name") => request.name = field.text().await.map_err(field_error)?,
            Some("email") => request.email = field.text().await.map_err(field_error)?,
            Some("phone") => request.phone = field.text().await.map_err(field_error)?,
            Some("senderNumber") => {
                request.sender_number = field.text().await.map_err(field_error)?
            }
            Some("role") => request.role = field.text().await.map_err(field_error)?,
            Some("skills") => request.skills = field.text().await.map_err(field_error)?,
            Some("projects") => request.projects = field.text().await.map_err(field_error)?,
            Some("achievements") => {
                request.achievements = field.text().await.map_err(field_error)?
            }
            Some("paymentProof") => {
                let file_name = field.file_name().unwrap_or("proof.png").to_string();
                let bytes = field.bytes().await.map_err(field_error)?;
                if !bytes.is_empty() {
                    request.proof = Some(ProofImage { file_name, bytes });
                }
            }
            _ => {}
        }
    }

    for (name, value) in [
        ("name", &request.name),
        ("email", &request.email),
        ("phone", &request.phone),
        ("senderNumber", &request.sender_number),
        ("role", &request.role),
    ] {
        if value.trim().is_empty() {
            return Err(AppError::Unprocessable(format!(
                "Field '{name}' is required"
            )));
        }
    }

    state
        .notifier
        .resume_request(&state.config.upi_payee_address, &request)
        .await
        .map_err(|e| AppError::External(format!("Notification delivery failed: {e}")))?;

    Ok(Json(json!({
        "ok": true,
        "msg": "Details received successfully, proof attached.",
    })))
}

fn field_error(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::Validation(format!("Malformed multipart request: {e}"))
}

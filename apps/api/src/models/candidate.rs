use serde::Serialize;
use sqlx::FromRow;

/// Email ↔ candidate-ID binding. One stable 6-digit ID per email.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CandidateBinding {
    pub email: String,
    pub candidate_id: String,
}

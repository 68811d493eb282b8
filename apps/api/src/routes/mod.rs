pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::auth::handlers as auth;
use crate::chat::handlers as chat;
use crate::jobs::handlers as jobs;
use crate::payment::handlers as payment;
use crate::screening::handlers as screening;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health::health_handler))
        // Job directory + admin console
        .route("/jobs", get(jobs::list_jobs))
        .route("/admin/job/create", post(jobs::create_job))
        .route("/admin/users", get(jobs::list_users))
        // Screening
        .route("/generate_candidate_id", post(screening::generate_candidate_id))
        .route("/resume/upload_file", post(screening::upload_resume))
        .route("/rankings", get(screening::all_rankings))
        .route("/rankings/:job_id", get(screening::rankings_for_job))
        // Auth
        .route("/api/register", post(auth::register))
        .route("/api/login", post(auth::login))
        .route("/api/session", get(auth::current_session))
        .route("/api/logout", post(auth::logout))
        .route("/api/auth/google", get(auth::google_begin))
        .route("/api/auth/google/callback", get(auth::google_callback))
        // Paid resume-creation intake
        .route("/api/save", post(payment::save_resume_request))
        // Assistant
        .route("/chat", post(chat::chat))
        .with_state(state)
}

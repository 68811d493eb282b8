use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::oauth::GoogleOAuth;
use crate::auth::{password, session};
use crate::errors::AppError;
use crate::models::user::{UserIdentity, UserRow};
use crate::state::AppState;

const OAUTH_STATE_COOKIE: &str = "oauth_state";

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /api/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let email = req.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::Validation("A valid email is required".to_string()));
    }
    if req.password.len() < 8 {
        return Err(AppError::Validation(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(&state.db)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict(
            "An account with this email already exists".to_string(),
        ));
    }

    let hash = password::hash_password(&req.password)?;
    let user_id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO users (id, name, email, password_hash) VALUES ($1, $2, $3, $4)",
    )
    .bind(user_id)
    .bind(req.name.trim())
    .bind(&email)
    .bind(&hash)
    .execute(&state.db)
    .await?;

    tracing::info!("Registered new account for {email}");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "ok": true, "user_id": user_id })),
    ))
}

/// POST /api/login
///
/// Unknown email, a wrong password, and an OAuth-only account with no hash
/// all collapse into the same generic 401 to avoid account enumeration.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Response, AppError> {
    let email = req.email.trim().to_lowercase();

    let user: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(&state.db)
        .await?;

    let user = user.ok_or_else(invalid_credentials)?;
    let hash = user.password_hash.as_deref().ok_or_else(invalid_credentials)?;
    if !password::verify_password(&req.password, hash) {
        return Err(invalid_credentials());
    }

    let token = session::issue_token(&state.config.session_secret, user.id, &user.email)?;
    let headers = AppendHeaders([(header::SET_COOKIE, session::session_cookie(&token))]);
    Ok((
        headers,
        Json(json!({ "ok": true, "user": UserIdentity::from(&user) })),
    )
        .into_response())
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid email or password".to_string())
}

/// GET /api/session
pub async fn current_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    let claims = session::require_session(&headers, &state.config.session_secret)?;

    let user_id: Uuid = claims
        .sub
        .parse()
        .map_err(|_| AppError::Unauthorized("Authentication required".to_string()))?;
    let user: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(&state.db)
        .await?;
    let user = user.ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

    Ok(Json(json!({ "user": UserIdentity::from(&user) })))
}

/// POST /api/logout
pub async fn logout() -> Response {
    let headers = AppendHeaders([(header::SET_COOKIE, session::clear_session_cookie())]);
    (headers, Json(json!({ "ok": true }))).into_response()
}

/// GET /api/auth/google — redirect to the consent screen.
pub async fn google_begin(State(state): State<AppState>) -> Result<Response, AppError> {
    let oauth = GoogleOAuth::from_config(&state.config)
        .ok_or_else(|| AppError::External("Google OAuth is not configured".to_string()))?;

    let nonce = Uuid::new_v4().simple().to_string();
    let url = oauth.authorize_url(&nonce);
    let headers = AppendHeaders([(header::SET_COOKIE, oauth_state_cookie(&nonce))]);
    Ok((headers, Redirect::temporary(&url)).into_response())
}

#[derive(Debug, Deserialize)]
pub struct OAuthCallback {
    pub code: String,
    pub state: String,
}

/// GET /api/auth/google/callback — exchange the code, upsert the account,
/// and establish the same session cookie credential login issues.
pub async fn google_callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<OAuthCallback>,
) -> Result<Response, AppError> {
    let oauth = GoogleOAuth::from_config(&state.config)
        .ok_or_else(|| AppError::External("Google OAuth is not configured".to_string()))?;

    let expected = session::cookie_value(&headers, OAUTH_STATE_COOKIE)
        .ok_or_else(|| AppError::Unauthorized("Missing OAuth state".to_string()))?;
    if expected != params.state {
        return Err(AppError::Unauthorized("OAuth state mismatch".to_string()));
    }

    let profile = oauth.exchange_code(&params.code).await?;
    let email = profile.email.trim().to_lowercase();

    // OAuth-only accounts keep a NULL password hash; an existing credential
    // account is linked rather than replaced.
    let user: UserRow = sqlx::query_as(
        "INSERT INTO users (id, name, email, password_hash, oauth_provider, oauth_subject) \
         VALUES ($1, $2, $3, NULL, 'google', $4) \
         ON CONFLICT (email) DO UPDATE \
         SET oauth_provider = 'google', oauth_subject = EXCLUDED.oauth_subject \
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(profile.name.as_deref())
    .bind(&email)
    .bind(&profile.sub)
    .fetch_one(&state.db)
    .await?;

    let token = session::issue_token(&state.config.session_secret, user.id, &user.email)?;
    let set_headers = AppendHeaders([
        (header::SET_COOKIE, session::session_cookie(&token)),
        (header::SET_COOKIE, clear_oauth_state_cookie()),
    ]);
    Ok((set_headers, Redirect::temporary("/")).into_response())
}

fn oauth_state_cookie(nonce: &str) -> String {
    format!("{OAUTH_STATE_COOKIE}={nonce}; Path=/; HttpOnly; SameSite=Lax; Max-Age=600")
}

fn clear_oauth_state_cookie() -> String {
    format!("{OAUTH_STATE_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

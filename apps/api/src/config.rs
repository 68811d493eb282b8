use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub admin_api_key: String,
    pub session_secret: String,
    pub chat_backend_url: String,
    pub chat_model: String,
    pub google_client_id: Option<String>,
    pub google_client_secret: Option<String>,
    pub oauth_redirect_url: String,
    pub upi_payee_address: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            admin_api_key: require_env("ADMIN_API_KEY")?,
            session_secret: require_env("SESSION_SECRET")?,
            chat_backend_url: std::env::var("CHAT_BACKEND_URL")
                .unwrap_or_else(|_| "http://localhost:11434".to_string()),
            chat_model: std::env::var("CHAT_MODEL").unwrap_or_else(|_| "llama3.2".to_string()),
            google_client_id: std::env::var("GOOGLE_CLIENT_ID").ok(),
            google_client_secret: std::env::var("GOOGLE_CLIENT_SECRET").ok(),
            oauth_redirect_url: std::env::var("OAUTH_REDIRECT_URL")
                .unwrap_or_else(|_| "http://localhost:8000/api/auth/google/callback".to_string()),
            upi_payee_address: std::env::var("UPI_PAYEE_ADDRESS")
                .unwrap_or_else(|_| "screening@upi".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

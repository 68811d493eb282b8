//! Google OAuth code flow: consent redirect, code exchange, profile fetch.

use serde::Deserialize;
use std::time::Duration;

use crate::config::Config;
use crate::errors::AppError;

const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleProfile {
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Clone)]
pub struct GoogleOAuth {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    redirect_url: String,
}

impl GoogleOAuth {
    /// `None` when the deployment has no Google credentials configured.
    pub fn from_config(config: &Config) -> Option<Self> {
        let client_id = config.google_client_id.clone()?;
        let client_secret = config.google_client_secret.clone()?;
        Some(Self {
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            client_id,
            client_secret,
            redirect_url: config.oauth_redirect_url.clone(),
        })
    }

    /// Consent-screen URL the browser is redirected to.
    pub fn authorize_url(&self, state: &str) -> String {
        format!(
            "{AUTH_URL}?response_type=code&client_id={}&redirect_uri={}&scope={}&state={}",
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_url),
            urlencoding::encode("openid email profile"),
            urlencoding::encode(state),
        )
    }

    /// Exchanges an authorization code for tokens, then fetches the profile.
    pub async fn exchange_code(&self, code: &str) -> Result<GoogleProfile, AppError> {
        let response = self
            .http
            .post(TOKEN_URL)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.redirect_url.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::External(format!("OAuth token request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::External(format!(
                "OAuth token endpoint returned {status}: {body}"
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::External(format!("OAuth token response unreadable: {e}")))?;

        let profile = self
            .http
            .get(USERINFO_URL)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(|e| AppError::External(format!("OAuth userinfo request failed: {e}")))?;

        if !profile.status().is_success() {
            let status = profile.status();
            return Err(AppError::External(format!(
                "OAuth userinfo endpoint returned {status}"
            )));
        }

        profile
            .json()
            .await
            .map_err(|e| AppError::External(format!("OAuth profile unreadable: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            database_url: "postgres://unused".to_string(),
            admin_api_key: "k".to_string(),
            session_secret: "s".to_string(),
            chat_backend_url: "http://localhost:11434".to_string(),
            chat_model: "llama3.2".to_string(),
            google_client_id: Some("client-id".to_string()),
            google_client_secret: Some("client-secret".to_string()),
            oauth_redirect_url: "http://localhost:8000/api/auth/google/callback".to_string(),
            upi_payee_address: "screening@upi".to_string(),
            port: 8000,
            rust_log: "info".to_string(),
        }
    }

    #[test]
    fn test_from_config_requires_both_credentials() {
        let mut config = test_config();
        assert!(GoogleOAuth::from_config(&config).is_some());
        config.google_client_secret = None;
        assert!(GoogleOAuth::from_config(&config).is_none());
    }

    #[test]
    fn test_authorize_url_encodes_parameters() {
        let oauth = GoogleOAuth::from_config(&test_config()).unwrap();
        let url = oauth.authorize_url("nonce-1");
        assert!(url.starts_with(AUTH_URL));
        assert!(url.contains("client_id=client-id"));
        assert!(url.contains("scope=openid%20email%20profile"));
        assert!(url.contains("state=nonce-1"));
        assert!(url.contains(&urlencoding::encode(
            "http://localhost:8000/api/auth/google/callback"
        ).into_owned()));
    }
}

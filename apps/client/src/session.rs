//! Explicit session state machine. Views read `SessionState` from the
//! provider instead of reacting to scattered async auth hooks; every
//! transition goes through the provider's methods.

use reqwest::header::{COOKIE, SET_COOKIE};
use serde::Deserialize;
use serde_json::json;

use crate::error::{Error, Result};
use crate::http::{error_from_response, ApiClient};

const SESSION_COOKIE: &str = "session";

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct UserIdentity {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub email: String,
}

/// The three states a view can observe.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Unauthenticated,
    /// A login or restore call is in flight.
    Loading,
    Authenticated(UserIdentity),
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    user: UserIdentity,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    user: UserIdentity,
}

/// Owns the session token and the observable state. This is the single
/// auth-state-change source for every view.
pub struct SessionProvider {
    api: ApiClient,
    state: SessionState,
    token: Option<String>,
}

impl SessionProvider {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            state: SessionState::Unauthenticated,
            token: None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// The session token for callers that need to hand it elsewhere.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Credential login. Any 401 surfaces as the generic `Error::Auth`.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<UserIdentity> {
        self.state = SessionState::Loading;

        let response = self
            .api
            .http
            .post(self.api.url("/api/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| {
                self.state = SessionState::Unauthenticated;
                Error::from(e)
            })?;

        if response.status().as_u16() == 401 {
            self.state = SessionState::Unauthenticated;
            return Err(Error::Auth);
        }
        if !response.status().is_success() {
            self.state = SessionState::Unauthenticated;
            return Err(error_from_response(response).await);
        }

        self.token = session_token_from_headers(response.headers());
        let body: LoginResponse = response.json().await.map_err(|e| {
            self.state = SessionState::Unauthenticated;
            Error::from(e)
        })?;

        self.state = SessionState::Authenticated(body.user.clone());
        Ok(body.user)
    }

    /// Re-validates a held token against the server, refreshing the
    /// identity. Without a token this is an immediate no-op.
    pub async fn restore(&mut self) -> Result<()> {
        let Some(token) = self.token.clone() else {
            self.state = SessionState::Unauthenticated;
            return Ok(());
        };
        self.state = SessionState::Loading;

        let response = self
            .api
            .http
            .get(self.api.url("/api/session"))
            .header(COOKIE, format!("{SESSION_COOKIE}={token}"))
            .send()
            .await
            .map_err(|e| {
                self.state = SessionState::Unauthenticated;
                Error::from(e)
            })?;

        if !response.status().is_success() {
            self.token = None;
            self.state = SessionState::Unauthenticated;
            return Ok(());
        }

        let body: SessionResponse = response.json().await.map_err(|e| {
            self.state = SessionState::Unauthenticated;
            Error::from(e)
        })?;
        self.state = SessionState::Authenticated(body.user);
        Ok(())
    }

    /// The URL a host should open to start the Google consent flow. The
    /// callback lands server-side and the session cookie is set there.
    pub fn oauth_authorize_url(&self) -> String {
        self.api.url("/api/auth/google")
    }

    /// Clears the session. The server call is best-effort — the local state
    /// transitions regardless.
    pub async fn logout(&mut self) {
        if let Some(token) = self.token.take() {
            let result = self
                .api
                .http
                .post(self.api.url("/api/logout"))
                .header(COOKIE, format!("{SESSION_COOKIE}={token}"))
                .send()
                .await;
            if let Err(e) = result {
                tracing::warn!("Logout request failed: {e}");
            }
        }
        self.state = SessionState::Unauthenticated;
    }
}

/// Pulls the session token out of a `Set-Cookie` response header.
fn session_token_from_headers(headers: &reqwest::header::HeaderMap) -> Option<String> {
    headers.get_all(SET_COOKIE).iter().find_map(|value| {
        let raw = value.to_str().ok()?;
        let first = raw.split(';').next()?;
        let (name, token) = first.trim().split_once('=')?;
        (name == SESSION_COOKIE && !token.is_empty()).then(|| token.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn user_body() -> serde_json::Value {
        json!({
            "ok": true,
            "user": { "id": "11111111-2222-3333-4444-555555555555", "name": "Asha", "email": "asha@example.com" }
        })
    }

    #[tokio::test]
    async fn test_login_success_transitions_to_authenticated() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("set-cookie", "session=tok123; Path=/; HttpOnly")
                    .set_body_json(user_body()),
            )
            .mount(&server)
            .await;

        let mut provider = SessionProvider::new(ApiClient::new(server.uri()));
        let user = provider.login("asha@example.com", "pw").await.unwrap();
        assert_eq!(user.email, "asha@example.com");
        assert_eq!(provider.token(), Some("tok123"));
        assert!(matches!(provider.state(), SessionState::Authenticated(u) if u.email == "asha@example.com"));
    }

    #[tokio::test]
    async fn test_login_401_is_generic_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/login"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"detail": "Invalid email or password"})),
            )
            .mount(&server)
            .await;

        let mut provider = SessionProvider::new(ApiClient::new(server.uri()));
        let err = provider.login("x@y.com", "bad").await.unwrap_err();
        assert!(matches!(err, Error::Auth));
        assert_eq!(*provider.state(), SessionState::Unauthenticated);
    }

    #[tokio::test]
    async fn test_logout_clears_state_and_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("set-cookie", "session=tok123; Path=/")
                    .set_body_json(user_body()),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/logout"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .mount(&server)
            .await;

        let mut provider = SessionProvider::new(ApiClient::new(server.uri()));
        provider.login("asha@example.com", "pw").await.unwrap();
        provider.logout().await;
        assert_eq!(*provider.state(), SessionState::Unauthenticated);
        assert_eq!(provider.token(), None);
    }

    #[tokio::test]
    async fn test_restore_without_token_is_noop() {
        let server = MockServer::start().await;
        let mut provider = SessionProvider::new(ApiClient::new(server.uri()));
        provider.restore().await.unwrap();
        assert_eq!(*provider.state(), SessionState::Unauthenticated);
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[test]
    fn test_session_token_parse_ignores_other_cookies() {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.append(SET_COOKIE, "theme=dark; Path=/".parse().unwrap());
        headers.append(SET_COOKIE, "session=abc; Path=/; HttpOnly".parse().unwrap());
        assert_eq!(session_token_from_headers(&headers).as_deref(), Some("abc"));
    }
}

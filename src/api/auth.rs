use reqwest::Method;
use serde_json::Value;

use super::models::{LoginRequest, LoginResponse, User};
use super::{parse_body, ApiClient};
use crate::error::{ConsoleError, Result};
use crate::notify::Toast;

pub const LOGIN_ENDPOINT: &str = "/auth/login";
pub const ME_ENDPOINT: &str = "/auth/me";

/// Login, identity check and logout on top of [`ApiClient`]
#[derive(Debug, Clone)]
pub struct AuthService {
    api: ApiClient,
}

impl AuthService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Rejected credentials are not a session expiry: the login call skips
    /// the global 401 handling and reports its own toast.
    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let body = serde_json::to_value(LoginRequest { email, password })?;
        let outcome = self.api.dispatch(Method::POST, LOGIN_ENDPOINT, Some(&body)).await;

        let response = match outcome {
            Ok((status, text)) if status.is_success() => {
                let value = parse_body(&text)?;
                serde_json::from_value::<LoginResponse>(value)?
            }
            Ok((status, text)) => {
                tracing::warn!(status = status.as_u16(), "login rejected");
                let detail = server_message(&text)
                    .unwrap_or_else(|| format!("server answered {}", status.as_u16()));
                return Err(self.login_failed(detail));
            }
            Err(e) => {
                tracing::error!("Login request failed: {}", e);
                return Err(self.login_failed(e.to_string()));
            }
        };

        let user = response.user;
        self.api.session().login(response.token, user.clone())?;
        self.api.notifier().notify(Toast::success(
            "Signed in",
            format!("Welcome, {}!", user.name),
        ));
        Ok(user)
    }

    fn login_failed(&self, detail: String) -> ConsoleError {
        self.api.notifier().notify(Toast {
            description: Some("Check your credentials and try again".to_string()),
            ..Toast::titled("Login failed")
        });
        ConsoleError::AuthenticationFailed(detail)
    }

    /// Confirm the stored token. Any failure drops the token quietly; a 401
    /// has already done so through the interceptor.
    pub async fn verify(&self) -> Option<User> {
        self.api.session().token()?;
        match self.api.get::<User>(ME_ENDPOINT).await {
            Ok(user) => {
                self.api.session().user_verified(user.clone());
                Some(user)
            }
            Err(e) => {
                tracing::warn!("Stored session rejected: {}", e);
                if self.api.session().token().is_some() {
                    self.api.session().logout();
                }
                None
            }
        }
    }

    pub async fn whoami(&self) -> Result<User> {
        if self.api.session().token().is_none() {
            return Err(ConsoleError::NotAuthenticated);
        }
        self.api.get(ME_ENDPOINT).await
    }

    pub fn logout(&self) {
        self.api.session().logout();
        self.api.notifier().notify(Toast::titled("Signed out"));
    }
}

fn server_message(body: &str) -> Option<String> {
    serde_json::from_str::<Value>(body)
        .ok()?
        .get("message")?
        .as_str()
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

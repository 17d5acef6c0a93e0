//! REST client for the admin backend.
//!
//! Every request carries the session's bearer token. Responses pass through
//! one interceptor: a 401 expires the session for every subscriber without a
//! toast, any other failure raises a destructive toast with the server's
//! `message` (or a fallback) and comes back as an error.

pub mod auth;
pub mod models;
pub mod resources;

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::config::ApiConfig;
use crate::error::{ConsoleError, Result};
use crate::menu::tree::MenuItem;
use crate::menu::MenuSource;
use crate::notify::{Notifier, Toast};
use crate::session::SessionStore;

pub const FALLBACK_ERROR_MESSAGE: &str = "An error occurred while processing the request";

/// Navigation feed for the signed-in user
pub const USER_MENUS_ENDPOINT: &str = "/menus-usuario";

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    log_requests: bool,
    session: SessionStore,
    notifier: Arc<dyn Notifier>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig, session: SessionStore, notifier: Arc<dyn Notifier>) -> Result<Self> {
        // reject garbage early instead of on the first request
        url::Url::parse(&config.base_url)?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            log_requests: config.enable_request_logging,
            session,
            notifier,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    pub fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let value = self.execute(Method::GET, endpoint, None).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(&self, endpoint: &str, body: &B) -> Result<T> {
        let body = serde_json::to_value(body)?;
        let value = self.execute(Method::POST, endpoint, Some(&body)).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn put<B: Serialize, T: DeserializeOwned>(&self, endpoint: &str, body: &B) -> Result<T> {
        let body = serde_json::to_value(body)?;
        let value = self.execute(Method::PUT, endpoint, Some(&body)).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn delete(&self, endpoint: &str) -> Result<()> {
        self.execute(Method::DELETE, endpoint, None).await?;
        Ok(())
    }

    /// Send and apply the response interceptor. Empty bodies decode as null.
    pub async fn execute(&self, method: Method, endpoint: &str, body: Option<&Value>) -> Result<Value> {
        let (status, text) = match self.dispatch(method, endpoint, body).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Request to {} failed: {}", endpoint, e);
                self.notifier.notify(Toast::error(FALLBACK_ERROR_MESSAGE));
                return Err(e);
            }
        };

        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!("401 from {}, ending session", endpoint);
            self.session.expire();
            return Err(ConsoleError::SessionExpired);
        }

        if !status.is_success() {
            let message = error_message(&text);
            self.notifier.notify(Toast::error(message.clone()));
            if status == StatusCode::NOT_FOUND {
                return Err(ConsoleError::NotFound(message));
            }
            return Err(ConsoleError::Request {
                status: status.as_u16(),
                message,
            });
        }

        parse_body(&text)
    }

    /// Raw round trip with the bearer token and no interceptor
    pub(crate) async fn dispatch(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<(StatusCode, String)> {
        let url = self.url(endpoint);
        if self.log_requests {
            tracing::debug!(%method, %url, "request");
        }

        let mut request = self.http.request(method.clone(), &url);
        if let Some(token) = self.session.token() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if self.log_requests {
            tracing::debug!(%method, %url, status = status.as_u16(), "response");
        }
        Ok((status, text))
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl MenuSource for ApiClient {
    async fn fetch_menus(&self) -> Result<Vec<MenuItem>> {
        self.get(USER_MENUS_ENDPOINT).await
    }
}

pub(crate) fn parse_body(text: &str) -> Result<Value> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(text)?)
}

/// `message` from an error body, or the fallback text
pub fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string())
}

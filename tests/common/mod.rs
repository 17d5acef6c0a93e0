#![allow(dead_code)]

use std::sync::Arc;

use erp_admin::api::ApiClient;
use erp_admin::config::ApiConfig;
use erp_admin::notify::ToastLog;
use erp_admin::session::storage::{MemoryTokenStorage, TokenStorage};
use erp_admin::session::SessionStore;
use wiremock::MockServer;

pub const TOKEN: &str = "token-123";

/// A mock admin API plus a console wired against it
pub struct Harness {
    pub server: MockServer,
    pub api: ApiClient,
    pub session: SessionStore,
    pub toasts: Arc<ToastLog>,
}

impl Harness {
    /// Console that already holds a stored token
    pub async fn signed_in() -> Self {
        Self::with_storage(Arc::new(MemoryTokenStorage::with_token(TOKEN))).await
    }

    pub async fn signed_out() -> Self {
        Self::with_storage(Arc::new(MemoryTokenStorage::default())).await
    }

    pub async fn with_storage(storage: Arc<dyn TokenStorage>) -> Self {
        let server = MockServer::start().await;
        let session = SessionStore::new(storage);
        let toasts = Arc::new(ToastLog::new());
        let config = ApiConfig {
            base_url: format!("{}/api", server.uri()),
            timeout_secs: 5,
            enable_request_logging: true,
        };
        let api = ApiClient::new(&config, session.clone(), toasts.clone()).expect("mock server url");
        Self {
            server,
            api,
            session,
            toasts,
        }
    }
}

mod common;

use std::sync::Arc;

use common::{Harness, TOKEN};
use erp_admin::api::auth::AuthService;
use erp_admin::api::FALLBACK_ERROR_MESSAGE;
use erp_admin::error::ConsoleError;
use erp_admin::session::storage::{FileTokenStorage, TokenStorage};
use erp_admin::types::routes;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn login_stores_token_and_user() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(FileTokenStorage::in_dir(dir.path()));
    let h = Harness::with_storage(storage.clone()).await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"email": "admin@empresa.com", "senha": "segredo"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "fresh-token",
            "usuario": {"id": 1, "nome": "Maria Santos", "email": "admin@empresa.com"}
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    let user = AuthService::new(h.api.clone())
        .login("admin@empresa.com", "segredo")
        .await
        .unwrap();

    assert_eq!(user.name, "Maria Santos");
    let state = h.session.snapshot();
    assert!(state.is_authenticated());
    assert_eq!(state.redirect.as_deref(), Some(routes::DASHBOARD));
    assert_eq!(storage.load().unwrap().as_deref(), Some("fresh-token"));

    let toast = h.toasts.last().unwrap();
    assert_eq!(toast.title, "Signed in");
    assert_eq!(toast.description.as_deref(), Some("Welcome, Maria Santos!"));
}

#[tokio::test]
async fn rejected_login_is_not_a_session_expiry() {
    let h = Harness::signed_out().await;
    let mut rx = h.session.subscribe();

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Credenciais inválidas"})))
        .mount(&h.server)
        .await;

    let err = AuthService::new(h.api.clone())
        .login("admin@empresa.com", "errada")
        .await
        .unwrap_err();

    assert!(matches!(err, ConsoleError::AuthenticationFailed(ref m) if m == "Credenciais inválidas"));
    assert!(!rx.has_changed().unwrap());
    assert!(!h.session.snapshot().expired);

    let toasts = h.toasts.snapshot();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].title, "Login failed");
}

#[tokio::test]
async fn unauthorized_anywhere_logs_everyone_out() {
    let h = Harness::signed_in().await;
    let mut first = h.session.subscribe();
    let mut second = h.session.subscribe();

    Mock::given(method("GET"))
        .and(path("/api/grupos"))
        .and(header("authorization", format!("Bearer {}", TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&h.server)
        .await;

    let err = h
        .api
        .list::<serde_json::Value>(erp_admin::api::resources::Resource::Groups)
        .await
        .unwrap_err();
    assert!(matches!(err, ConsoleError::SessionExpired));

    for rx in [&mut first, &mut second] {
        assert!(rx.has_changed().unwrap());
        let state = rx.borrow_and_update().clone();
        assert!(state.token.is_none());
        assert!(state.expired);
        assert_eq!(state.redirect.as_deref(), Some(routes::LOGIN));
    }
    assert!(h.toasts.snapshot().is_empty());
}

#[tokio::test]
async fn failures_toast_the_server_message_or_fallback() {
    let h = Harness::signed_in().await;

    Mock::given(method("GET"))
        .and(path("/api/usuarios"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "Banco indisponível"})))
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/grupos"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
        .mount(&h.server)
        .await;

    let first = h.api.get::<serde_json::Value>("/usuarios").await.unwrap_err();
    assert!(matches!(first, ConsoleError::Request { status: 500, .. }));
    let second = h.api.get::<serde_json::Value>("grupos").await.unwrap_err();
    assert_eq!(second.status_code(), Some(502));

    let toasts = h.toasts.snapshot();
    assert_eq!(toasts.len(), 2);
    assert!(toasts.iter().all(|t| t.is_destructive() && t.title == "Error"));
    assert_eq!(toasts[0].description.as_deref(), Some("Banco indisponível"));
    assert_eq!(toasts[1].description.as_deref(), Some(FALLBACK_ERROR_MESSAGE));
    assert_eq!(h.session.token().as_deref(), Some(TOKEN));
}

#[tokio::test]
async fn verify_confirms_the_stored_token() {
    let h = Harness::signed_in().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 7, "nome": "João", "email": "joao@empresa.com"
        })))
        .mount(&h.server)
        .await;

    let auth = AuthService::new(h.api.clone());
    let user = auth.verify().await.unwrap();
    assert_eq!(user.id, 7);
    assert!(h.session.is_authenticated());

    auth.logout();
    assert!(h.session.token().is_none());
    assert!(!h.session.snapshot().expired);
    assert!(matches!(auth.whoami().await, Err(ConsoleError::NotAuthenticated)));
}

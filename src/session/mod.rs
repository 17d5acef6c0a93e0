//! Session store.
//!
//! The session is a single immutable [`SessionState`] published through a
//! `tokio::sync::watch` channel. Every change is a discrete transition
//! (login, user verified, menus loaded, logout, expiry) that replaces the
//! whole value, so any holder of a [`SessionStore`] clone or a subscription
//! sees a logout the moment it happens.

pub mod storage;

use std::sync::Arc;
use tokio::sync::watch;

use crate::api::models::User;
use crate::error::Result;
use crate::menu::tree::MenuItem;
use crate::types::routes;
use storage::TokenStorage;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub token: Option<String>,
    pub user: Option<User>,
    /// Flat menu feed for the signed-in user
    pub menus: Vec<MenuItem>,
    /// Where the console should go next, set by login/logout
    pub redirect: Option<String>,
    /// Set when the last logout was forced by a 401
    pub expired: bool,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some() && self.user.is_some()
    }
}

#[derive(Clone)]
pub struct SessionStore {
    tx: Arc<watch::Sender<Arc<SessionState>>>,
    storage: Arc<dyn TokenStorage>,
}

impl SessionStore {
    /// Start from whatever token the storage already holds. The user is
    /// unknown until [`SessionStore::user_verified`].
    pub fn new(storage: Arc<dyn TokenStorage>) -> Self {
        let token = match storage.load() {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!("Could not read stored session: {}", e);
                None
            }
        };
        let (tx, _rx) = watch::channel(Arc::new(SessionState {
            token,
            ..SessionState::default()
        }));
        Self {
            tx: Arc::new(tx),
            storage,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<SessionState>> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> Arc<SessionState> {
        self.tx.borrow().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.tx.borrow().token.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.tx.borrow().is_authenticated()
    }

    pub fn login(&self, token: String, user: User) -> Result<()> {
        self.storage.save(&token)?;
        tracing::info!(user_id = user.id, "session started");
        self.publish(SessionState {
            token: Some(token),
            user: Some(user),
            menus: Vec::new(),
            redirect: Some(routes::DASHBOARD.to_string()),
            expired: false,
        });
        Ok(())
    }

    pub fn user_verified(&self, user: User) {
        let current = self.snapshot();
        if current.token.is_none() {
            return;
        }
        self.publish(SessionState {
            user: Some(user),
            ..SessionState::clone(&current)
        });
    }

    /// Replace the flat menu feed. Ignored once logged out so a late
    /// response cannot resurrect a cleared session.
    pub fn menus_loaded(&self, menus: Vec<MenuItem>) {
        let current = self.snapshot();
        if current.token.is_none() {
            tracing::debug!("dropping menu feed for a closed session");
            return;
        }
        self.publish(SessionState {
            menus,
            ..SessionState::clone(&current)
        });
    }

    pub fn logout(&self) {
        self.end(false);
    }

    /// Forced logout after a 401
    pub fn expire(&self) {
        self.end(true);
    }

    fn end(&self, expired: bool) {
        if let Err(e) = self.storage.clear() {
            tracing::warn!("Could not clear stored session: {}", e);
        }
        if expired {
            tracing::warn!("session expired, redirecting to {}", routes::LOGIN);
        } else {
            tracing::info!("session closed");
        }
        self.publish(SessionState {
            redirect: Some(routes::LOGIN.to_string()),
            expired,
            ..SessionState::default()
        });
    }

    fn publish(&self, state: SessionState) {
        self.tx.send_replace(Arc::new(state));
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("state", &*self.snapshot())
            .finish()
    }
}

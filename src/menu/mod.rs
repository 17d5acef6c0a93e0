//! Navigation menus: the feed source, the tree builder, icons and the
//! sidebar state machine.

pub mod icon;
pub mod sidebar;
pub mod tree;

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::watch;

use crate::error::{ConsoleError, Result};
use crate::session::{SessionState, SessionStore};
use sidebar::Sidebar;
use tree::MenuItem;

/// Anything that can hand over the signed-in user's flat menu feed
#[async_trait]
pub trait MenuSource: Send + Sync {
    async fn fetch_menus(&self) -> Result<Vec<MenuItem>>;
}

/// Two fixed entries for working without a backend
#[derive(Debug, Default, Clone)]
pub struct StaticMenuSource;

#[async_trait]
impl MenuSource for StaticMenuSource {
    async fn fetch_menus(&self) -> Result<Vec<MenuItem>> {
        Ok(vec![
            MenuItem::new(1, "Dashboard", None, 1)
                .with_route("/dashboard")
                .with_icon("home"),
            MenuItem::new(2, "Usuários", None, 2)
                .with_route("/usuarios")
                .with_icon("users"),
        ])
    }
}

/// Flat feed, derived tree and sidebar state for one console.
///
/// Once loaded, the store follows the session it was loaded from: menus
/// read as empty as soon as that session loses or changes its token.
#[derive(Debug, Clone)]
pub struct MenuStore {
    flat: Vec<MenuItem>,
    tree: Vec<MenuItem>,
    session: Option<watch::Receiver<Arc<SessionState>>>,
    loaded_for: Option<String>,
    loading: bool,
    error: Option<String>,
    sidebar_open: bool,
    pub sidebar: Sidebar,
}

impl Default for MenuStore {
    fn default() -> Self {
        Self {
            flat: Vec::new(),
            tree: Vec::new(),
            session: None,
            loaded_for: None,
            loading: false,
            error: None,
            sidebar_open: true,
            sidebar: Sidebar::new(),
        }
    }
}

impl MenuStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flat(&self) -> &[MenuItem] {
        if self.is_current() {
            self.flat.as_slice()
        } else {
            &[]
        }
    }

    pub fn tree(&self) -> &[MenuItem] {
        if self.is_current() {
            self.tree.as_slice()
        } else {
            &[]
        }
    }

    /// Menus still belong to the session's current token
    fn is_current(&self) -> bool {
        match &self.session {
            Some(rx) => rx.borrow().token == self.loaded_for,
            None => true,
        }
    }

    /// Drop menus left over from a session that has since logged out or
    /// expired. Returns whether anything was discarded.
    pub fn sync(&mut self) -> bool {
        if self.is_current() {
            return false;
        }
        tracing::info!("session changed, discarding menus");
        self.clear();
        true
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_sidebar_open(&self) -> bool {
        self.sidebar_open
    }

    pub fn toggle_sidebar(&mut self) -> bool {
        self.sidebar_open = !self.sidebar_open;
        self.sidebar_open
    }

    /// Fetch the feed while the session holds a token. A failed fetch keeps
    /// the previous menus and records the error.
    pub async fn load(&mut self, source: &dyn MenuSource, session: &SessionStore) -> Result<()> {
        if self.session.is_none() {
            self.session = Some(session.subscribe());
        }
        self.sync();
        if session.token().is_none() {
            tracing::debug!("no session, skipping menu fetch");
            return Ok(());
        }

        self.loading = true;
        let fetched = source.fetch_menus().await;
        self.loading = false;

        match fetched {
            Ok(items) => {
                tracing::info!(count = items.len(), "menus loaded");
                self.set_flat(items.clone())?;
                session.menus_loaded(items);
                Ok(())
            }
            Err(e) => {
                tracing::error!("Error fetching menus: {}", e);
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Replace the feed and rebuild the tree. A structural error leaves the
    /// tree empty and is both stored and returned.
    pub fn set_flat(&mut self, items: Vec<MenuItem>) -> Result<()> {
        let orphaned = tree::orphans(&items).len();
        if orphaned > 0 {
            tracing::warn!(count = orphaned, "menu entries with unknown parent dropped");
        }
        self.flat = items;
        self.loaded_for = self.session.as_ref().and_then(|rx| rx.borrow().token.clone());
        match tree::build_tree(&self.flat) {
            Ok(built) => {
                self.tree = built;
                self.error = None;
                Ok(())
            }
            Err(e) => {
                self.tree.clear();
                self.error = Some(e.to_string());
                Err(ConsoleError::MenuStructure(e))
            }
        }
    }

    pub fn clear(&mut self) {
        self.loaded_for = None;
        self.flat.clear();
        self.tree.clear();
        self.error = None;
        self.loading = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::User;
    use crate::session::storage::MemoryTokenStorage;

    struct FailingSource;

    #[async_trait]
    impl MenuSource for FailingSource {
        async fn fetch_menus(&self) -> Result<Vec<MenuItem>> {
            Err(ConsoleError::Request {
                status: 500,
                message: "boom".into(),
            })
        }
    }

    fn signed_in() -> SessionStore {
        let session = SessionStore::new(Arc::new(MemoryTokenStorage::default()));
        session
            .login(
                "tok".into(),
                User {
                    id: 1,
                    name: "Admin".into(),
                    email: "admin@empresa.com".into(),
                },
            )
            .unwrap();
        session
    }

    #[tokio::test]
    async fn loads_static_feed_into_tree_and_session() {
        let session = signed_in();
        let mut store = MenuStore::new();
        store.load(&StaticMenuSource, &session).await.unwrap();

        assert_eq!(store.tree().len(), 2);
        assert!(!store.is_loading());
        assert_eq!(session.snapshot().menus.len(), 2);
    }

    #[tokio::test]
    async fn skips_fetch_without_session() {
        let session = SessionStore::new(Arc::new(MemoryTokenStorage::default()));
        let mut store = MenuStore::new();
        store.load(&FailingSource, &session).await.unwrap();
        assert!(store.tree().is_empty());
        assert!(store.error().is_none());
    }

    #[tokio::test]
    async fn failed_fetch_keeps_previous_menus() {
        let session = signed_in();
        let mut store = MenuStore::new();
        store.load(&StaticMenuSource, &session).await.unwrap();

        assert!(store.load(&FailingSource, &session).await.is_err());
        assert_eq!(store.tree().len(), 2);
        assert!(store.error().is_some());
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn expiry_empties_the_menus_at_once() {
        let session = signed_in();
        let mut store = MenuStore::new();
        store.load(&StaticMenuSource, &session).await.unwrap();
        assert_eq!(store.tree().len(), 2);

        session.expire();
        assert!(store.tree().is_empty());
        assert!(store.flat().is_empty());
        assert!(store.sync());
        assert!(!store.sync());
    }

    #[tokio::test]
    async fn another_login_does_not_revive_old_menus() {
        let session = signed_in();
        let mut store = MenuStore::new();
        store.load(&StaticMenuSource, &session).await.unwrap();

        session.logout();
        session
            .login(
                "other".into(),
                User {
                    id: 2,
                    name: "Outra".into(),
                    email: "outra@empresa.com".into(),
                },
            )
            .unwrap();
        assert!(store.tree().is_empty());

        store.load(&StaticMenuSource, &session).await.unwrap();
        assert_eq!(store.tree().len(), 2);
    }

    #[test]
    fn sidebar_starts_open() {
        let mut store = MenuStore::new();
        assert!(store.is_sidebar_open());
        assert!(!store.toggle_sidebar());
    }
}

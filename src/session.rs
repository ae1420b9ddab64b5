//! Session store: the authenticated user and their bearer token.
//!
//! Created at login, torn down at logout, and injected into consuming
//! components instead of being read from ambient globals. Every
//! authenticated HTTP request and the WebSocket query string source
//! their token from here.

use std::sync::RwLock;

/// The authenticated user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub token: String,
}

/// Holder for the current session.
///
/// Interior mutability keeps login/logout cheap to thread through
/// `Arc` without making every consumer mutable.
#[derive(Debug, Default)]
pub struct SessionStore {
    inner: RwLock<Option<Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a session, replacing any existing one
    pub fn login(&self, session: Session) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(session);
    }

    /// Tear down the session
    pub fn logout(&self) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *guard = None;
    }

    /// Snapshot of the current session, if authenticated
    pub fn current(&self) -> Option<Session> {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        guard.clone()
    }

    /// The bearer token, if authenticated and non-empty
    pub fn token(&self) -> Option<String> {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        guard
            .as_ref()
            .map(|s| s.token.clone())
            .filter(|t| !t.is_empty())
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_session() -> Session {
        Session {
            user_id: "u1".to_string(),
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            token: "tok-123".to_string(),
        }
    }

    #[test]
    fn test_login_and_current() {
        // テスト項目: ログインするとセッションが取得できる
        // given (前提条件):
        let store = SessionStore::new();
        assert!(store.current().is_none());

        // when (操作):
        store.login(test_session());

        // then (期待する結果):
        assert_eq!(store.current(), Some(test_session()));
        assert_eq!(store.token().as_deref(), Some("tok-123"));
        assert!(store.is_authenticated());
    }

    #[test]
    fn test_logout_clears_session() {
        // テスト項目: ログアウトでセッションが破棄される
        // given (前提条件):
        let store = SessionStore::new();
        store.login(test_session());

        // when (操作):
        store.logout();

        // then (期待する結果):
        assert!(store.current().is_none());
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_empty_token_is_not_authenticated() {
        // テスト項目: 空のトークンは未認証として扱われる
        // given (前提条件):
        let store = SessionStore::new();
        let mut session = test_session();
        session.token = String::new();

        // when (操作):
        store.login(session);

        // then (期待する結果):
        assert!(store.token().is_none());
        assert!(!store.is_authenticated());
    }
}

//! Session store
//!
//! Holds the locally cached proof of authentication: the opaque bearer token
//! plus the user profile used for admin gating. The two records are written
//! and cleared together in one storage transaction, so a consistent store
//! never holds one without the other.

use shared::client::UserInfo;

use crate::storage::{LocalStore, StorageResult, TOKEN_KEY, USER_KEY};

/// Session store over the local key-value store
#[derive(Clone)]
pub struct SessionStore {
    store: LocalStore,
}

impl SessionStore {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    /// Store token and user as a pair, in one transaction
    pub fn login(&self, token: &str, user: &UserInfo) -> StorageResult<()> {
        let user_bytes = serde_json::to_vec(user)?;
        self.store
            .put_many(&[(TOKEN_KEY, token.as_bytes()), (USER_KEY, &user_bytes)])?;
        tracing::info!(username = %user.username, "Session stored");
        Ok(())
    }

    /// Clear token and user as a pair, in one transaction
    pub fn logout(&self) -> StorageResult<()> {
        self.store.delete_many(&[TOKEN_KEY, USER_KEY])?;
        tracing::info!("Session cleared");
        Ok(())
    }

    /// Current bearer token, if a session exists
    ///
    /// Unreadable storage is treated as anonymous; a renderable state is
    /// always preferred over a hard failure on the read path.
    pub fn token(&self) -> Option<String> {
        let bytes = match self.store.get_raw(TOKEN_KEY) {
            Ok(bytes) => bytes?,
            Err(err) => {
                tracing::warn!(error = %err, "Failed to read token, treating as anonymous");
                return None;
            }
        };
        match String::from_utf8(bytes) {
            Ok(token) => Some(token),
            Err(_) => {
                tracing::warn!("Stored token is not valid UTF-8, treating as anonymous");
                None
            }
        }
    }

    /// Current user profile, or `None` when anonymous
    ///
    /// Malformed persisted data is recovered as anonymous and reported.
    pub fn current_user(&self) -> Option<UserInfo> {
        let bytes = match self.store.get_raw(USER_KEY) {
            Ok(bytes) => bytes?,
            Err(err) => {
                tracing::warn!(error = %err, "Failed to read user, treating as anonymous");
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(user) => Some(user),
            Err(err) => {
                tracing::warn!(error = %err, "Stored user is malformed, treating as anonymous");
                None
            }
        }
    }

    /// Whether a session exists
    pub fn is_logged_in(&self) -> bool {
        self.token().is_some()
    }

    /// Whether the current user may see admin views
    pub fn is_admin(&self) -> bool {
        self.current_user().is_some_and(|user| user.is_admin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin_user() -> UserInfo {
        UserInfo {
            id: 1,
            username: "root".to_string(),
            role: "admin".to_string(),
        }
    }

    #[test]
    fn test_login_then_logout_clears_both_keys() {
        let store = LocalStore::open_in_memory().unwrap();
        let session = SessionStore::new(store.clone());

        session.login("tok-123", &admin_user()).unwrap();
        assert_eq!(session.token().as_deref(), Some("tok-123"));
        assert!(session.current_user().is_some());

        session.logout().unwrap();
        // Never one without the other
        assert!(store.get_raw(TOKEN_KEY).unwrap().is_none());
        assert!(store.get_raw(USER_KEY).unwrap().is_none());
        assert!(!session.is_logged_in());
        assert!(!session.is_admin());
    }

    #[test]
    fn test_admin_gating() {
        let store = LocalStore::open_in_memory().unwrap();
        let session = SessionStore::new(store);

        let mut user = admin_user();
        user.role = "customer".to_string();
        session.login("tok", &user).unwrap();
        assert!(session.is_logged_in());
        assert!(!session.is_admin());

        session.login("tok", &admin_user()).unwrap();
        assert!(session.is_admin());
    }

    #[test]
    fn test_malformed_user_is_anonymous() {
        let store = LocalStore::open_in_memory().unwrap();
        store.put_raw(USER_KEY, b"{definitely not json").unwrap();

        let session = SessionStore::new(store);
        assert!(session.current_user().is_none());
        assert!(!session.is_admin());
    }

    #[test]
    fn test_fresh_store_is_anonymous() {
        let store = LocalStore::open_in_memory().unwrap();
        let session = SessionStore::new(store);

        assert!(session.token().is_none());
        assert!(session.current_user().is_none());
    }
}

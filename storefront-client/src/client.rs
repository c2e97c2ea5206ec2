//! Storefront facade
//!
//! One injected instance wiring the local store, session, cart, and HTTP
//! client together, with an explicit open/teardown lifecycle. UI handlers
//! receive this instead of reaching into ambient storage.

use std::path::Path;

use shared::client::{Catalog, UserInfo};
use shared::models::Product;

use crate::cart::CartEngine;
use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::http::HttpClient;
use crate::session::SessionStore;
use crate::storage::LocalStore;

/// The storefront client engine
///
/// Dropping the value closes the underlying store.
pub struct Storefront {
    session: SessionStore,
    cart: CartEngine,
    http: HttpClient,
}

impl Storefront {
    /// Open the local store at `store_path` and wire up the engine
    ///
    /// A persisted session is restored: its token is attached to the HTTP
    /// client so authenticated calls work immediately after a restart.
    pub fn open(config: ClientConfig, store_path: impl AsRef<Path>) -> ClientResult<Self> {
        let store = LocalStore::open(store_path)?;
        Ok(Self::with_store(config, store))
    }

    fn with_store(config: ClientConfig, store: LocalStore) -> Self {
        let session = SessionStore::new(store.clone());
        let cart = CartEngine::new(store);

        // The persisted session is the sole source of the bearer token here;
        // a token left in the config must not outlive an anonymous session.
        let http = match session.token() {
            Some(token) => {
                tracing::info!("Restored persisted session");
                HttpClient::new(&config).with_token(token)
            }
            None => HttpClient::new(&config).without_token(),
        };

        Self {
            session,
            cart,
            http,
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn cart(&self) -> &CartEngine {
        &self.cart
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Authenticate against the API and persist the session
    ///
    /// Token and user are stored as a pair; subsequent requests carry the
    /// bearer token.
    pub async fn sign_in(&mut self, username: &str, password: &str) -> ClientResult<UserInfo> {
        let response = self.http.login(username, password).await?;
        self.session.login(&response.token, &response.user)?;
        self.http = self.http.clone().with_token(response.token);
        tracing::info!(username = %response.user.username, "Signed in");
        Ok(response.user)
    }

    /// Register a new account and persist the resulting session
    pub async fn sign_up(&mut self, username: &str, password: &str) -> ClientResult<UserInfo> {
        let response = self.http.register(username, password).await?;
        self.session.login(&response.token, &response.user)?;
        self.http = self.http.clone().with_token(response.token);
        tracing::info!(username = %response.user.username, "Registered");
        Ok(response.user)
    }

    /// Clear the persisted session and drop the token
    ///
    /// Purely local: the token is opaque to this client and the server keeps
    /// no session state for it.
    pub fn sign_out(&mut self) -> ClientResult<()> {
        self.session.logout()?;
        self.http = self.http.clone().without_token();
        Ok(())
    }

    /// Load products, categories, and brands from the API
    pub async fn load_catalog(&self) -> ClientResult<Catalog> {
        self.http.load_catalog().await
    }

    /// Fetch a single product (product detail view)
    pub async fn fetch_product(&self, id: i64) -> ClientResult<Product> {
        self.http.fetch_product(id).await
    }
}

//! Storefront Client - local state engine for the storefront UI
//!
//! Owns the client-side cart, session, and catalog-filter state on top of a
//! durable local key-value store, and talks to the remote catalog/auth API.

pub mod cart;
pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod session;
pub mod storage;

pub use cart::CartEngine;
pub use catalog::{CatalogState, FilterCriteria, visible_products};
pub use client::Storefront;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::HttpClient;
pub use session::SessionStore;
pub use storage::{LocalStore, StorageError, StorageResult};

// Re-export shared types for convenience
pub use shared::client::{Catalog, LoginResponse, UserInfo};
pub use shared::models::{Brand, CartItem, Category, Product};

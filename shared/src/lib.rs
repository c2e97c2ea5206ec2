//! Shared types for the storefront client
//!
//! Data models and API DTOs used by the client engine. These mirror the
//! JSON shapes served by the remote catalog/auth API.

pub mod client;
pub mod models;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use client::{Catalog, LoginRequest, LoginResponse, RegisterRequest, UserInfo};
pub use models::{Brand, CartItem, Category, Product};

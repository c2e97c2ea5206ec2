//! Data models
//!
//! Shapes match the remote API's JSON. All IDs are `i64`.

pub mod brand;
pub mod cart;
pub mod category;
pub mod product;

// Re-exports
pub use brand::*;
pub use cart::*;
pub use category::*;
pub use product::*;

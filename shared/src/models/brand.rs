//! Brand Model

use serde::{Deserialize, Serialize};

/// Brand entity
///
/// Read-only reference data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    pub id: i64,
    pub name: String,
}

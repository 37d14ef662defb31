//! Store (retail location) type definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use planocheck_types::Planogram;

/// A retail location and the shelf layout it is expected to follow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Store {
    pub id: u64,
    pub name: String,
    pub location: String,
    /// Expected product -> quantity. Empty means no expectation declared.
    #[serde(default)]
    pub planogram: Planogram,
    pub created_at: DateTime<Utc>,
}

/// Fields needed to register a new store; the repository assigns the id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStore {
    pub name: String,
    pub location: String,
    #[serde(default)]
    pub planogram: Planogram,
}

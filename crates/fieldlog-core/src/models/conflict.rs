//! Field conflict model

use serde::{Deserialize, Serialize};

use super::{FieldValue, Timestamp};

/// Field kept from the local side during a three-way merge while the server
/// held a different value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldConflict {
    /// Name of the conflicting field
    pub field: String,
    /// Local value that was kept
    pub local: FieldValue,
    /// Value the server had for the field
    pub server: FieldValue,
    /// When the conflict was detected (Unix seconds)
    pub detected_at: Timestamp,
}

use serde::{Deserialize, Serialize};

use crate::ConflictPolicy;

/// Settings for a [`Bridge`](crate::Bridge).
///
/// Missing fields fall back to their defaults, so hosts can embed a partial section
/// in their own configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Applied to all three registries.
    pub conflict_policy: ConflictPolicy,
    /// Announce registrations to the collaborator when one is available.
    pub announce: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            conflict_policy: ConflictPolicy::Overwrite,
            announce: true,
        }
    }
}

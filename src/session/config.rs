//! Session configuration, deserialized from the host at construction

use serde::{Deserialize, Serialize};

use crate::detect::RuleSet;

/// Quiet period before a pending pattern scan fires
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// RedactionSession configuration.
///
/// Every field has a default, so `{}` (or passing nothing at all) yields a
/// fully working session.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SessionConfig {
    /// Debounce quiet period in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Which pattern rules run during the synchronous scan
    #[serde(default)]
    pub rules: RuleSet,
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            rules: RuleSet::default(),
        }
    }
}

//! Automaton configuration.
//!
//! Supports defaults, JSON documents and environment variable overrides.

use serde::{Deserialize, Serialize};

use crate::error::AutomatonResult;

/// Environment variable overriding [`AutomatonConfig::name`].
pub const ENV_NAME: &str = "PNFA_NAME";

/// Environment variable overriding [`AutomatonConfig::seed`].
pub const ENV_SEED: &str = "PNFA_SEED";

/// Configuration for a top-level automaton.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomatonConfig {
    /// Label attached to the tracing span of every step and run.
    #[serde(default = "default_name")]
    pub name: String,

    /// Seed for the pseudo-random source. `None` seeds from OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_name() -> String {
    "automaton".to_string()
}

impl Default for AutomatonConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            seed: None,
        }
    }
}

impl AutomatonConfig {
    /// Create a named config.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the seed (builder pattern).
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Parse a JSON document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> AutomatonResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Defaults overridden by `PNFA_NAME` and `PNFA_SEED`.
    ///
    /// An unparsable seed is ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(name) = lookup(ENV_NAME) {
            config.name = name;
        }
        if let Some(seed) = lookup(ENV_SEED) {
            config.seed = seed.trim().parse().ok();
        }

        config
    }
}

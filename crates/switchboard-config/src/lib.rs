#![allow(clippy::must_use_candidate)]

mod env;
mod loader;
pub mod provider;
pub mod telemetry;

use indexmap::IndexMap;
use serde::Deserialize;

pub use provider::*;
pub use telemetry::{LogFormat, TelemetryConfig};

/// Top-level Switchboard configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Logging configuration
    #[serde(default)]
    pub telemetry: Option<TelemetryConfig>,
    /// Vendor connections keyed by a caller-chosen name
    #[serde(default)]
    pub providers: IndexMap<String, ProviderConfig>,
}

impl Config {
    /// Look up a provider entry by name
    pub fn provider(&self, name: &str) -> Option<&ProviderConfig> {
        self.providers.get(name)
    }
}

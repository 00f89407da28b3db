#![allow(dead_code)]

pub mod mock_vendor;

use switchboard_config::{Config, ProviderConfig};

/// API key every mock route expects
pub const TEST_KEY: &str = "test-key";

/// Provider entry pointed at a mock, with optional extra TOML lines
pub fn provider_config(vendor: &str, base_url: &str, extra: &str) -> ProviderConfig {
    let toml = format!(
        "[providers.mock]\nvendor = \"{vendor}\"\napi_key = \"{TEST_KEY}\"\nbase_url = \"{base_url}\"\n{extra}"
    );

    let mut config: Config = toml.parse().expect("valid test config");
    config.providers.swap_remove("mock").expect("mock provider present")
}

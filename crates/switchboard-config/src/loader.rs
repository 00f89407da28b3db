use std::path::Path;
use std::str::FromStr;

use secrecy::ExposeSecret;

use crate::Config;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, a placeholder cannot be
    /// expanded, the TOML is invalid, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        let config: Self = raw.parse()?;
        tracing::debug!(path = %path.display(), providers = config.providers.len(), "configuration loaded");

        Ok(config)
    }

    /// Check that the configuration can be used to build clients
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid entry
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.providers.is_empty() {
            anyhow::bail!("at least one provider must be configured");
        }

        for (name, provider) in &self.providers {
            if provider.api_key.expose_secret().trim().is_empty() {
                anyhow::bail!("provider '{name}' has an empty api_key");
            }

            if let Some(temperature) = provider.defaults.temperature
                && !(0.0..=2.0).contains(&temperature)
            {
                anyhow::bail!("provider '{name}': temperature must be between 0.0 and 2.0, got {temperature}");
            }

            if provider.defaults.max_completion_tokens == Some(0) {
                anyhow::bail!("provider '{name}': max_completion_tokens must be greater than 0");
            }

            if provider.timeout.is_some_and(|timeout| timeout.is_zero()) {
                anyhow::bail!("provider '{name}': timeout must be greater than 0");
            }
        }

        Ok(())
    }
}

impl FromStr for Config {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;
        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use secrecy::ExposeSecret;

    use crate::{Config, LogFormat, Vendor};

    #[test]
    fn parses_full_provider_entry() {
        let config: Config = r#"
            [telemetry]
            log_filter = "debug"
            format = "json"

            [providers.router]
            vendor = "open_router"
            api_key = "sk-or"
            base_url = "https://openrouter.example/api/v1"
            timeout = "30s"

            [providers.router.defaults]
            model = "meta-llama/llama-3-70b"
            max_completion_tokens = 256
            temperature = 0.3
            reasoning_effort = "low"
            system_prompt = "Answer tersely."
        "#
        .parse()
        .unwrap();

        let telemetry = config.telemetry.as_ref().unwrap();
        assert_eq!(telemetry.format, LogFormat::Json);
        assert_eq!(telemetry.log_filter.as_deref(), Some("debug"));

        let router = config.provider("router").unwrap();
        assert_eq!(router.vendor, Vendor::OpenRouter);
        assert_eq!(router.api_key.expose_secret(), "sk-or");
        assert_eq!(router.base_url.as_ref().unwrap().host_str(), Some("openrouter.example"));
        assert_eq!(router.timeout, Some(Duration::from_secs(30)));
        assert_eq!(router.defaults.max_completion_tokens, Some(256));
        assert_eq!(router.defaults.system_prompt.as_deref(), Some("Answer tersely."));
    }

    #[test]
    fn vendor_aliases_are_accepted() {
        let config: Config = r#"
            [providers.a]
            vendor = "groq"
            api_key = "k"

            [providers.b]
            vendor = "openrouter"
            api_key = "k"
        "#
        .parse()
        .unwrap();

        assert_eq!(config.provider("a").unwrap().vendor, Vendor::GroqCloud);
        assert_eq!(config.provider("b").unwrap().vendor, Vendor::OpenRouter);
    }

    #[test]
    fn provider_order_is_preserved() {
        let config: Config = r#"
            [providers.zeta]
            vendor = "xai"
            api_key = "k"

            [providers.alpha]
            vendor = "mistral"
            api_key = "k"
        "#
        .parse()
        .unwrap();

        let names: Vec<_> = config.providers.keys().map(String::as_str).collect();
        assert_eq!(names, ["zeta", "alpha"]);
    }

    #[test]
    fn empty_config_is_rejected() {
        let err = "".parse::<Config>().unwrap_err();
        assert!(err.to_string().contains("at least one provider"));
    }

    #[test]
    fn unknown_vendor_is_rejected() {
        let err = "[providers.x]\nvendor = \"cohere\"\napi_key = \"k\"\n".parse::<Config>().unwrap_err();
        assert!(err.to_string().contains("failed to parse config"));
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = "[providers.x]\nvendor = \"xai\"\napi_key = \"k\"\nretries = 3\n"
            .parse::<Config>()
            .unwrap_err();
        assert!(err.to_string().contains("failed to parse config"));
    }

    #[test]
    fn blank_api_key_is_rejected() {
        let err = "[providers.x]\nvendor = \"xai\"\napi_key = \"  \"\n".parse::<Config>().unwrap_err();
        assert!(err.to_string().contains("empty api_key"));
    }

    #[test]
    fn out_of_range_temperature_is_rejected() {
        let err = "[providers.x]\nvendor = \"xai\"\napi_key = \"k\"\n[providers.x.defaults]\ntemperature = 3.5\n"
            .parse::<Config>()
            .unwrap_err();
        assert!(err.to_string().contains("temperature"));
    }

    #[test]
    fn zero_token_limit_is_rejected() {
        let err = "[providers.x]\nvendor = \"xai\"\napi_key = \"k\"\n[providers.x.defaults]\nmax_completion_tokens = 0\n"
            .parse::<Config>()
            .unwrap_err();
        assert!(err.to_string().contains("max_completion_tokens"));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = "[providers.x]\nvendor = \"xai\"\napi_key = \"k\"\ntimeout = \"0s\"\n"
            .parse::<Config>()
            .unwrap_err();
        assert!(err.to_string().contains("timeout must be greater than 0"));
    }

    #[test]
    fn api_key_is_read_from_environment() {
        temp_env::with_var("SB_LOADER_KEY", Some("from-env"), || {
            let config: Config = "[providers.x]\nvendor = \"gemini\"\napi_key = \"{{ env.SB_LOADER_KEY }}\"\n"
                .parse()
                .unwrap();
            assert_eq!(config.provider("x").unwrap().api_key.expose_secret(), "from-env");
        });
    }
}

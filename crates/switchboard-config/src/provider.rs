use std::fmt;
use std::time::Duration;

use duration_str::deserialize_option_duration;
use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Configuration for a single vendor connection
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// Which vendor API this entry talks to
    pub vendor: Vendor,
    /// API key for authentication
    pub api_key: SecretString,
    /// Base URL override
    #[serde(default)]
    pub base_url: Option<Url>,
    /// Deadline applied to every call made through this provider
    #[serde(default, deserialize_with = "deserialize_option_duration")]
    pub timeout: Option<Duration>,
    /// Options used when a call leaves them unset
    #[serde(default)]
    pub defaults: DefaultOptions,
}

/// Supported vendors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum Vendor {
    /// `OpenAI` chat completions
    #[serde(rename = "openai")]
    OpenAi,
    /// Anthropic Messages API
    #[serde(rename = "anthropic")]
    Anthropic,
    /// Google Gemini (Generative Language API)
    #[serde(rename = "gemini")]
    Gemini,
    /// `GroqCloud`
    #[serde(rename = "groq_cloud", alias = "groq")]
    GroqCloud,
    /// Mistral AI
    #[serde(rename = "mistral")]
    Mistral,
    /// `OpenRouter`
    #[serde(rename = "open_router", alias = "openrouter")]
    OpenRouter,
    /// xAI
    #[serde(rename = "xai")]
    Xai,
    /// Anannas
    #[serde(rename = "anannas")]
    Anannas,
    /// Perplexity
    #[serde(rename = "perplexity")]
    Perplexity,
}

impl Vendor {
    /// Every supported vendor
    pub const ALL: [Self; 9] = [
        Self::OpenAi,
        Self::Anthropic,
        Self::Gemini,
        Self::GroqCloud,
        Self::Mistral,
        Self::OpenRouter,
        Self::Xai,
        Self::Anannas,
        Self::Perplexity,
    ];

    /// Stable lowercase identifier used in logs and config files
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Gemini => "gemini",
            Self::GroqCloud => "groq_cloud",
            Self::Mistral => "mistral",
            Self::OpenRouter => "open_router",
            Self::Xai => "xai",
            Self::Anannas => "anannas",
            Self::Perplexity => "perplexity",
        }
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-provider option defaults
///
/// Mirrors the per-call options; a value set on the call always wins.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefaultOptions {
    /// Model identifier
    #[serde(default)]
    pub model: Option<String>,
    /// Upper bound on generated tokens
    #[serde(default)]
    pub max_completion_tokens: Option<u32>,
    /// Sampling temperature
    #[serde(default)]
    pub temperature: Option<f64>,
    /// Reasoning effort hint (e.g. "low", "medium", "high")
    #[serde(default)]
    pub reasoning_effort: Option<String>,
    /// System prompt injected when the conversation has none
    #[serde(default)]
    pub system_prompt: Option<String>,
}

//! `OpenAI` and the vendors that speak its chat completion dialect

use std::sync::Arc;

use http::header::{AUTHORIZATION, HeaderMap};
use secrecy::{ExposeSecret, SecretString};
use switchboard_config::Vendor;
use url::Url;

use super::{Adapter, endpoint, secret_header, static_header};
use crate::convert::openai::build_request;
use crate::error::LlmError;
use crate::stream::{ChoicesDeltaParser, StreamParser};
use crate::transport::HttpRequest;
use crate::types::{Message, Options};

/// Request field carrying the token limit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenLimitField {
    /// `max_tokens`
    MaxTokens,
    /// `max_completion_tokens`
    MaxCompletionTokens,
}

/// How a vendor accepts the reasoning effort hint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReasoningStyle {
    /// Not sent
    Unsupported,
    /// `"reasoning_effort": "<effort>"`
    Flat,
    /// `"reasoning": {"effort": "<effort>"}`
    Nested,
}

/// Where an OpenAI-compatible vendor differs from `OpenAI`
#[derive(Debug)]
pub struct CompatProfile {
    pub vendor: Vendor,
    /// Base URL the `/chat/completions` path is appended to
    pub base_url: &'static str,
    pub token_limit: TokenLimitField,
    pub reasoning: ReasoningStyle,
    /// Whether the sampling temperature is forwarded
    pub temperature: bool,
    /// Headers sent on every request
    pub extra_headers: &'static [(&'static str, &'static str)],
}

pub static OPENAI: CompatProfile = CompatProfile {
    vendor: Vendor::OpenAi,
    base_url: "https://api.openai.com/v1",
    token_limit: TokenLimitField::MaxCompletionTokens,
    reasoning: ReasoningStyle::Flat,
    temperature: false,
    extra_headers: &[],
};

pub static GROQ_CLOUD: CompatProfile = CompatProfile {
    vendor: Vendor::GroqCloud,
    base_url: "https://api.groq.com/openai/v1",
    token_limit: TokenLimitField::MaxCompletionTokens,
    reasoning: ReasoningStyle::Flat,
    temperature: true,
    extra_headers: &[],
};

pub static MISTRAL: CompatProfile = CompatProfile {
    vendor: Vendor::Mistral,
    base_url: "https://api.mistral.ai/v1",
    token_limit: TokenLimitField::MaxTokens,
    reasoning: ReasoningStyle::Unsupported,
    temperature: true,
    extra_headers: &[],
};

pub static OPEN_ROUTER: CompatProfile = CompatProfile {
    vendor: Vendor::OpenRouter,
    base_url: "https://openrouter.ai/api/v1",
    token_limit: TokenLimitField::MaxTokens,
    reasoning: ReasoningStyle::Nested,
    temperature: true,
    extra_headers: &[
        ("http-referer", "https://github.com/switchboard-rs/switchboard"),
        ("x-title", "switchboard"),
    ],
};

pub static XAI: CompatProfile = CompatProfile {
    vendor: Vendor::Xai,
    base_url: "https://api.x.ai/v1",
    token_limit: TokenLimitField::MaxTokens,
    reasoning: ReasoningStyle::Flat,
    temperature: true,
    extra_headers: &[],
};

pub static ANANNAS: CompatProfile = CompatProfile {
    vendor: Vendor::Anannas,
    base_url: "https://api.anannas.ai/v1",
    token_limit: TokenLimitField::MaxTokens,
    reasoning: ReasoningStyle::Flat,
    temperature: true,
    extra_headers: &[],
};

pub static PERPLEXITY: CompatProfile = CompatProfile {
    vendor: Vendor::Perplexity,
    base_url: "https://api.perplexity.ai",
    token_limit: TokenLimitField::MaxTokens,
    reasoning: ReasoningStyle::Flat,
    temperature: true,
    extra_headers: &[],
};

impl CompatProfile {
    /// Profile for an OpenAI-compatible vendor
    pub fn for_vendor(vendor: Vendor) -> Option<&'static Self> {
        match vendor {
            Vendor::OpenAi => Some(&OPENAI),
            Vendor::GroqCloud => Some(&GROQ_CLOUD),
            Vendor::Mistral => Some(&MISTRAL),
            Vendor::OpenRouter => Some(&OPEN_ROUTER),
            Vendor::Xai => Some(&XAI),
            Vendor::Anannas => Some(&ANANNAS),
            Vendor::Perplexity => Some(&PERPLEXITY),
            Vendor::Anthropic | Vendor::Gemini => None,
        }
    }
}

/// Adapter for any vendor described by a [`CompatProfile`]
pub struct OpenAiCompatibleAdapter {
    profile: &'static CompatProfile,
    api_key: SecretString,
    base_url: Url,
}

impl OpenAiCompatibleAdapter {
    /// # Panics
    ///
    /// Panics if the profile's hardcoded base URL is invalid (should never happen).
    pub fn new(profile: &'static CompatProfile, api_key: SecretString, base_url: Option<Url>) -> Self {
        let base_url = base_url.unwrap_or_else(|| Url::parse(profile.base_url).expect("valid default URL"));

        Self {
            profile,
            api_key,
            base_url,
        }
    }

    fn headers(&self) -> Result<HeaderMap, LlmError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            secret_header(&format!("Bearer {}", self.api_key.expose_secret()))?,
        );

        for &(name, value) in self.profile.extra_headers {
            let (name, value) = static_header(name, value);
            headers.insert(name, value);
        }

        Ok(headers)
    }
}

impl Adapter for OpenAiCompatibleAdapter {
    fn name(&self) -> &str {
        self.profile.vendor.as_str()
    }

    fn build_request(&self, messages: &[Message], streaming: bool, options: &Options) -> Result<HttpRequest, LlmError> {
        let url = endpoint(&self.base_url, "/chat/completions")?;
        let body = build_request(self.profile, messages, streaming, options);

        HttpRequest::post_json(url, self.headers()?, &body)
    }

    fn stream_parser(&self) -> Option<Arc<dyn StreamParser>> {
        Some(Arc::new(ChoicesDeltaParser))
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use http::Method;
    use serde_json::json;

    use super::*;
    use crate::types::CompletionResponse;

    fn adapter(profile: &'static CompatProfile) -> OpenAiCompatibleAdapter {
        OpenAiCompatibleAdapter::new(profile, SecretString::from("sk-test"), None)
    }

    #[test]
    fn default_endpoints() {
        let cases = [
            (&OPENAI, "https://api.openai.com/v1/chat/completions"),
            (&GROQ_CLOUD, "https://api.groq.com/openai/v1/chat/completions"),
            (&MISTRAL, "https://api.mistral.ai/v1/chat/completions"),
            (&OPEN_ROUTER, "https://openrouter.ai/api/v1/chat/completions"),
            (&XAI, "https://api.x.ai/v1/chat/completions"),
            (&ANANNAS, "https://api.anannas.ai/v1/chat/completions"),
            (&PERPLEXITY, "https://api.perplexity.ai/chat/completions"),
        ];

        for (profile, expected) in cases {
            let request = adapter(profile).build_request(&[Message::user("hi")], false, &Options::new()).unwrap();
            assert_eq!(request.url.as_str(), expected, "{}", profile.vendor);
            assert_eq!(request.method, Method::POST);
        }
    }

    #[test]
    fn bearer_auth_is_sensitive() {
        let request = adapter(&OPENAI).build_request(&[Message::user("hi")], false, &Options::new()).unwrap();
        let auth = &request.headers[AUTHORIZATION];

        assert_eq!(auth, "Bearer sk-test");
        assert!(auth.is_sensitive());
    }

    #[test]
    fn open_router_sends_attribution_headers() {
        let request = adapter(&OPEN_ROUTER).build_request(&[Message::user("hi")], false, &Options::new()).unwrap();

        assert!(request.headers.contains_key("http-referer"));
        assert_eq!(request.headers["x-title"], "switchboard");
    }

    #[test]
    fn base_url_override_is_used() {
        let adapter = OpenAiCompatibleAdapter::new(
            &OPENAI,
            SecretString::from("k"),
            Some(Url::parse("http://127.0.0.1:8080/v1").unwrap()),
        );
        let request = adapter.build_request(&[Message::user("hi")], true, &Options::new()).unwrap();

        assert_eq!(request.url.as_str(), "http://127.0.0.1:8080/v1/chat/completions");
        let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
        assert_eq!(body["stream"], true);
    }

    #[test]
    fn replies_go_through_the_normalizer() {
        let body = Bytes::from_static(br#"{"choices":[{"message":{"role":"assistant","content":"hi"}}]}"#);
        assert_eq!(adapter(&XAI).parse_response(&body).unwrap(), CompletionResponse::assistant("hi"));

        let error = adapter(&XAI).parse_response(&Bytes::from_static(b"hello")).unwrap_err();
        assert!(matches!(error, LlmError::Decode(_)));
    }

    #[test]
    fn body_carries_caller_options() {
        let options = Options::new().with_model("m").with_max_completion_tokens(50);
        let request = adapter(&OPENAI).build_request(&[Message::user("hi")], false, &options).unwrap();
        let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();

        assert_eq!(
            body,
            json!({
                "model": "m",
                "messages": [{"role": "user", "content": "hi"}],
                "stream": false,
                "max_completion_tokens": 50
            })
        );
    }
}

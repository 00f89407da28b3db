use indexmap::IndexMap;
use switchboard_config::DefaultOptions;

use super::Tool;

/// Per-call generation options
///
/// Every field is optional. An unset field (including an empty string or a
/// zero token limit) is never sent to the vendor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Options {
    /// Model identifier
    pub model: Option<String>,
    /// Upper bound on generated tokens
    pub max_completion_tokens: Option<u32>,
    /// Sampling temperature
    pub temperature: Option<f64>,
    /// Reasoning effort hint
    pub reasoning_effort: Option<String>,
    /// System prompt injected when the conversation does not start with one
    pub system_prompt: Option<String>,
    /// Tools offered to the model, keyed by function name
    pub tools: IndexMap<String, Tool>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    #[must_use]
    pub fn with_max_completion_tokens(mut self, limit: u32) -> Self {
        self.max_completion_tokens = Some(limit);
        self
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    #[must_use]
    pub fn with_reasoning_effort(mut self, effort: impl Into<String>) -> Self {
        self.reasoning_effort = Some(effort.into());
        self
    }

    #[must_use]
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Offer a tool to the model, keyed by its name
    #[must_use]
    pub fn with_tool(mut self, tool: Tool) -> Self {
        self.tools.insert(tool.name.clone(), tool);
        self
    }

    pub fn model(&self) -> Option<&str> {
        non_empty(self.model.as_deref())
    }

    pub fn max_completion_tokens(&self) -> Option<u32> {
        self.max_completion_tokens.filter(|limit| *limit > 0)
    }

    pub fn reasoning_effort(&self) -> Option<&str> {
        non_empty(self.reasoning_effort.as_deref())
    }

    pub fn system_prompt(&self) -> Option<&str> {
        non_empty(self.system_prompt.as_deref())
    }

    /// Fill every unset field from provider defaults
    #[must_use]
    pub fn or_defaults(&self, defaults: &DefaultOptions) -> Self {
        let mut merged = self.clone();

        if merged.model().is_none() {
            merged.model.clone_from(&defaults.model);
        }
        if merged.max_completion_tokens().is_none() {
            merged.max_completion_tokens = defaults.max_completion_tokens;
        }
        if merged.temperature.is_none() {
            merged.temperature = defaults.temperature;
        }
        if merged.reasoning_effort().is_none() {
            merged.reasoning_effort.clone_from(&defaults.reasoning_effort);
        }
        if merged.system_prompt().is_none() {
            merged.system_prompt.clone_from(&defaults.system_prompt);
        }

        merged
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_values_read_as_unset() {
        let options = Options {
            model: Some(String::new()),
            max_completion_tokens: Some(0),
            reasoning_effort: Some(String::new()),
            system_prompt: Some(String::new()),
            ..Options::default()
        };

        assert_eq!(options.model(), None);
        assert_eq!(options.max_completion_tokens(), None);
        assert_eq!(options.reasoning_effort(), None);
        assert_eq!(options.system_prompt(), None);
    }

    #[test]
    fn call_options_win_over_defaults() {
        let defaults = DefaultOptions {
            model: Some("default-model".to_owned()),
            max_completion_tokens: Some(256),
            temperature: Some(0.2),
            reasoning_effort: Some("low".to_owned()),
            system_prompt: Some("be brief".to_owned()),
        };

        let merged = Options::new()
            .with_model("chosen")
            .with_temperature(1.0)
            .or_defaults(&defaults);

        assert_eq!(merged.model(), Some("chosen"));
        assert_eq!(merged.temperature, Some(1.0));
        assert_eq!(merged.max_completion_tokens(), Some(256));
        assert_eq!(merged.reasoning_effort(), Some("low"));
        assert_eq!(merged.system_prompt(), Some("be brief"));
    }

    #[test]
    fn empty_model_is_replaced_by_default() {
        let defaults = DefaultOptions {
            model: Some("fallback".to_owned()),
            ..DefaultOptions::default()
        };

        let merged = Options::new().with_model("").or_defaults(&defaults);
        assert_eq!(merged.model(), Some("fallback"));
    }

    #[test]
    fn tools_are_keyed_by_name() {
        let options = Options::new().with_tool(Tool::new("lookup", "Look something up"));
        assert!(options.tools.contains_key("lookup"));
    }
}

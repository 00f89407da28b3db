use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Properties accepted by a tool, keyed by parameter name
pub type InputSchema = IndexMap<String, PropertySchema>;

/// A function the model may call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    /// Function name
    pub name: String,
    /// What the function does
    #[serde(default)]
    pub description: String,
    /// Parameters
    #[serde(default)]
    pub input_schema: InputSchema,
}

/// A single tool parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertySchema {
    /// JSON type name (e.g. "string", "number")
    #[serde(rename = "type")]
    pub kind: String,
    /// Human-readable description
    #[serde(default)]
    pub description: String,
    /// Whether the caller must supply this parameter
    #[serde(default)]
    pub required: bool,
}

impl Tool {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: InputSchema::new(),
        }
    }

    /// Add a parameter, replacing any previous one with the same name
    #[must_use]
    pub fn with_property(
        mut self,
        name: impl Into<String>,
        kind: impl Into<String>,
        description: impl Into<String>,
        required: bool,
    ) -> Self {
        self.input_schema.insert(
            name.into(),
            PropertySchema {
                kind: kind.into(),
                description: description.into(),
                required,
            },
        );
        self
    }

    /// Names of required parameters, in declaration order
    pub fn required_properties(&self) -> Vec<String> {
        self.input_schema
            .iter()
            .filter(|(_, property)| property.required)
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// JSON Schema object describing the parameters
    ///
    /// The per-property `required` flag is lifted into the schema's
    /// top-level `required` array.
    pub fn parameters_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .input_schema
            .iter()
            .map(|(name, property)| {
                let mut schema = json!({ "type": property.kind });
                if !property.description.is_empty() {
                    schema["description"] = Value::String(property.description.clone());
                }
                (name.clone(), schema)
            })
            .collect();

        let mut schema = json!({
            "type": "object",
            "properties": properties,
        });

        let required = self.required_properties();
        if !required.is_empty() {
            schema["required"] = json!(required);
        }

        schema
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn schema_lifts_required_flags() {
        let tool = Tool::new("get_weather", "Current weather")
            .with_property("city", "string", "City name", true)
            .with_property("unit", "string", "", false);

        assert_eq!(
            tool.parameters_schema(),
            json!({
                "type": "object",
                "properties": {
                    "city": {"type": "string", "description": "City name"},
                    "unit": {"type": "string"}
                },
                "required": ["city"]
            })
        );
    }

    #[test]
    fn schema_without_required_properties_omits_array() {
        let tool = Tool::new("now", "Current time");
        assert_eq!(tool.parameters_schema(), json!({"type": "object", "properties": {}}));
    }

    #[test]
    fn property_names_stay_unique() {
        let tool = Tool::new("f", "")
            .with_property("x", "string", "", false)
            .with_property("x", "number", "", true);

        assert_eq!(tool.input_schema.len(), 1);
        assert_eq!(tool.input_schema["x"].kind, "number");
    }
}

//! Typed access to tool-call arguments.

use serde::de::DeserializeOwned;

use crate::error::QuintetError;

/// Arguments supplied by the model for a tool call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolArguments {
    raw: serde_json::Value,
}

impl ToolArguments {
    pub fn new(raw: serde_json::Value) -> Self {
        Self { raw }
    }

    /// Parse the argument string a provider returned.
    ///
    /// Non-JSON text is kept as a string so validation can report it.
    pub fn from_json_str(text: &str) -> Self {
        let raw = serde_json::from_str(text)
            .unwrap_or_else(|_| serde_json::Value::String(text.to_string()));
        Self { raw }
    }

    pub fn raw(&self) -> &serde_json::Value {
        &self.raw
    }

    /// Required string argument.
    pub fn get_str(&self, key: &str) -> Result<&str, QuintetError> {
        self.get_str_opt(key)
            .ok_or_else(|| QuintetError::InvalidArgument(format!("missing string argument '{key}'")))
    }

    /// Optional string argument; blank strings count as absent.
    pub fn get_str_opt(&self, key: &str) -> Option<&str> {
        self.raw
            .get(key)
            .and_then(|v| v.as_str())
            .filter(|s| !s.trim().is_empty())
    }

    pub fn get_i64(&self, key: &str) -> Result<i64, QuintetError> {
        self.raw
            .get(key)
            .and_then(|v| v.as_i64())
            .ok_or_else(|| QuintetError::InvalidArgument(format!("missing integer argument '{key}'")))
    }

    pub fn get_bool(&self, key: &str) -> Result<bool, QuintetError> {
        self.raw
            .get(key)
            .and_then(|v| v.as_bool())
            .ok_or_else(|| QuintetError::InvalidArgument(format!("missing boolean argument '{key}'")))
    }

    /// Deserialize the whole argument object into `T`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, QuintetError> {
        Ok(serde_json::from_value(self.raw.clone())?)
    }
}

impl From<serde_json::Value> for ToolArguments {
    fn from(raw: serde_json::Value) -> Self {
        Self::new(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_typed_fields() {
        let args = ToolArguments::new(json!({"location": "Guangzhou", "days": 2, "metric": true}));
        assert_eq!(args.get_str("location").unwrap(), "Guangzhou");
        assert_eq!(args.get_i64("days").unwrap(), 2);
        assert!(args.get_bool("metric").unwrap());
        assert!(args.get_str("missing").is_err());
    }

    #[test]
    fn blank_strings_are_treated_as_missing() {
        let args = ToolArguments::new(json!({"query": "   "}));
        assert_eq!(args.get_str_opt("query"), None);
    }

    #[test]
    fn non_json_argument_text_is_preserved() {
        let args = ToolArguments::from_json_str("Guangzhou");
        assert_eq!(args.raw(), &json!("Guangzhou"));
        let parsed = ToolArguments::from_json_str(r#"{"query":"rust"}"#);
        assert_eq!(parsed.get_str("query").unwrap(), "rust");
    }
}

//! Widget configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{WidgetError, WidgetResult};

/// How completions of overlapping evaluations are applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResponsePolicy {
    /// Every completion is applied in arrival order; the last to arrive wins
    #[default]
    LastArrival,
    /// Completions older than the newest request are discarded
    LatestRequest,
}

impl std::str::FromStr for ResponsePolicy {
    type Err = WidgetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "last-arrival" => Ok(Self::LastArrival),
            "latest-request" => Ok(Self::LatestRequest),
            other => Err(WidgetError::config(format!(
                "unknown response policy '{other}' (expected last-arrival or latest-request)"
            ))),
        }
    }
}

/// Widget configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    /// Evaluation endpoint (relative in the browser, absolute natively)
    pub endpoint: String,
    /// Id of the expression input field
    pub input_id: String,
    /// Id of the result display element
    pub result_id: String,
    /// Id of the error display element
    pub error_id: String,
    /// Selector of the keypad container
    pub keypad_selector: String,
    /// Key that submits the expression from the input field
    pub submit_key: String,
    /// Error text when the service fails without a message
    pub fallback_error: String,
    /// Handling of overlapping evaluations
    pub response_policy: ResponsePolicy,
    /// Fill an empty keypad container with the default layout
    pub populate_keypad: bool,
    /// Request timeout in seconds (native client only)
    pub timeout_secs: Option<u64>,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            endpoint: Self::DEFAULT_ENDPOINT.to_string(),
            input_id: "expr".to_string(),
            result_id: "result".to_string(),
            error_id: "error".to_string(),
            keypad_selector: ".keys".to_string(),
            submit_key: "Enter".to_string(),
            fallback_error: Self::DEFAULT_FALLBACK_ERROR.to_string(),
            response_policy: ResponsePolicy::default(),
            populate_keypad: false,
            timeout_secs: None,
        }
    }
}

impl WidgetConfig {
    /// Default evaluation endpoint
    pub const DEFAULT_ENDPOINT: &'static str = "/api/eval";

    /// Default error text for failures without a message
    pub const DEFAULT_FALLBACK_ERROR: &'static str = "Evaluation failed";

    /// Parses a configuration from JSON; missing fields take defaults
    pub fn from_json_str(json: &str) -> WidgetResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration from a JSON file
    pub fn from_file(path: &Path) -> WidgetResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Sets the endpoint
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Sets the response policy
    #[must_use]
    pub fn with_policy(mut self, policy: ResponsePolicy) -> Self {
        self.response_policy = policy;
        self
    }

    /// Checks that every required value is present
    pub fn validate(&self) -> WidgetResult<()> {
        let required = [
            ("endpoint", &self.endpoint),
            ("input_id", &self.input_id),
            ("result_id", &self.result_id),
            ("error_id", &self.error_id),
            ("keypad_selector", &self.keypad_selector),
            ("submit_key", &self.submit_key),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(WidgetError::config(format!("{name} must not be empty")));
            }
        }
        if self.timeout_secs == Some(0) {
            return Err(WidgetError::config("timeout_secs must be positive"));
        }
        Ok(())
    }
}

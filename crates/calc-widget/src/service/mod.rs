//! Evaluation Service contract
//!
//! The expression grammar lives on the server. This module only knows the
//! wire shape:
//!
//! ```text
//! POST <endpoint>   {"expression": "2+2"}
//! 2xx               {"value": 4}
//! non-2xx           {"error": "Unexpected end of expression"}
//! ```
//!
//! [`interpret_response`] turns a raw status + body into the outcome shown
//! by the widget, so every [`Evaluator`] implementation reports failures
//! identically.

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
mod fetch;
#[cfg(feature = "native")]
mod http;
mod mock;

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub use fetch::FetchEvaluator;
#[cfg(feature = "native")]
pub use http::HttpEvaluator;
pub use mock::{ScriptedEvaluator, ScriptedReply};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Request body sent to the Evaluation Service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationRequest {
    /// The trimmed expression
    pub expression: String,
}

impl EvaluationRequest {
    /// Creates a request for `expression`
    #[must_use]
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
        }
    }
}

/// A successful evaluation
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Evaluation {
    /// The `value` field of the response, if any
    pub value: Option<Value>,
}

impl Evaluation {
    /// Creates an evaluation carrying `value`
    #[must_use]
    pub fn with_value(value: impl Into<Value>) -> Self {
        Self {
            value: Some(value.into()),
        }
    }

    /// Text for the result display; empty when no value came back
    #[must_use]
    pub fn display_text(&self) -> String {
        self.value.as_ref().map(display_value).unwrap_or_default()
    }
}

/// A failed evaluation.
///
/// `Display` yields exactly the text shown in the error display.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationError {
    /// The request never produced a response
    #[error("{0}")]
    Transport(String),
    /// The service answered with a non-success status
    #[error("{message}")]
    Service {
        /// HTTP status code
        status: u16,
        /// Service message, or the fallback text
        message: String,
    },
}

impl EvaluationError {
    /// Create a transport error
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Status code for service failures
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport(_) => None,
            Self::Service { status, .. } => Some(*status),
        }
    }
}

/// Outcome of one evaluation call
pub type EvaluationOutcome = Result<Evaluation, EvaluationError>;

/// Something that can evaluate an expression remotely
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait Evaluator: std::fmt::Debug {
    /// Sends one request and awaits exactly one outcome
    async fn evaluate(&self, request: &EvaluationRequest) -> EvaluationOutcome;
}

/// Interprets a raw service response.
///
/// A body that is not a JSON object is treated as `{}`: on success that
/// yields an empty value, on failure the `fallback` message.
pub fn interpret_response(status: u16, body: &[u8], fallback: &str) -> EvaluationOutcome {
    let fields = match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };

    if !(200..300).contains(&status) {
        let message = fields
            .get("error")
            .and_then(error_message)
            .unwrap_or_else(|| fallback.to_string());
        return Err(EvaluationError::Service { status, message });
    }

    Ok(Evaluation {
        value: fields.get("value").cloned(),
    })
}

/// Coerces a response value into display text
#[must_use]
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                format_float(n.as_f64().unwrap_or_default())
            }
        }
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Formats like a browser's `String(number)`.
///
/// Magnitudes in `[1e-6, 1e21)` print positionally with the shortest
/// round-trip digits (`4.0` shows as `4`); everything else uses exponent
/// form with an explicit sign (`1e+21`, `1e-7`).
fn format_float(f: f64) -> String {
    if f == 0.0 {
        return "0".to_string();
    }
    if !f.is_finite() {
        return f.to_string();
    }
    let magnitude = f.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return format!("{f}");
    }
    let scientific = format!("{f:e}");
    match scientific.split_once('e') {
        Some((digits, exponent)) if !exponent.starts_with('-') => format!("{digits}e+{exponent}"),
        _ => scientific,
    }
}

/// Only a present, non-blank `error` replaces the fallback
fn error_message(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(display_value(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const FALLBACK: &str = "Evaluation failed";

    // ===== Request tests =====

    #[test]
    fn test_request_wire_shape() {
        let req = EvaluationRequest::new("5*5");
        assert_eq!(serde_json::to_value(&req).unwrap(), json!({"expression": "5*5"}));
    }

    // ===== interpret_response success tests =====

    #[test]
    fn test_success_with_integral_float() {
        let out = interpret_response(200, br#"{"value": 4.0}"#, FALLBACK).unwrap();
        assert_eq!(out.display_text(), "4");
    }

    #[test]
    fn test_success_with_fraction() {
        let out = interpret_response(200, br#"{"value": 2.5}"#, FALLBACK).unwrap();
        assert_eq!(out.display_text(), "2.5");
    }

    #[test]
    fn test_success_without_value() {
        let out = interpret_response(200, b"{}", FALLBACK).unwrap();
        assert_eq!(out.value, None);
        assert_eq!(out.display_text(), "");
    }

    #[test]
    fn test_success_with_malformed_body() {
        let out = interpret_response(200, b"<html>oops</html>", FALLBACK).unwrap();
        assert_eq!(out.display_text(), "");
    }

    #[test]
    fn test_success_with_non_object_body() {
        let out = interpret_response(200, b"42", FALLBACK).unwrap();
        assert_eq!(out.value, None);
    }

    #[test]
    fn test_success_with_null_value() {
        let out = interpret_response(200, br#"{"value": null}"#, FALLBACK).unwrap();
        assert_eq!(out.display_text(), "");
    }

    #[test]
    fn test_other_2xx_counts_as_success() {
        assert!(interpret_response(204, b"", FALLBACK).is_ok());
    }

    // ===== interpret_response failure tests =====

    #[test]
    fn test_failure_with_service_message() {
        let err = interpret_response(
            400,
            br#"{"error": "Unexpected end of expression"}"#,
            FALLBACK,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Unexpected end of expression");
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn test_failure_without_message_uses_fallback() {
        let err = interpret_response(500, b"{}", FALLBACK).unwrap_err();
        assert_eq!(err.to_string(), FALLBACK);
    }

    #[test]
    fn test_failure_with_malformed_body_uses_fallback() {
        let err = interpret_response(502, b"Bad Gateway", FALLBACK).unwrap_err();
        assert_eq!(err.to_string(), FALLBACK);
    }

    #[test]
    fn test_failure_with_blank_message_uses_fallback() {
        let err = interpret_response(400, br#"{"error": ""}"#, FALLBACK).unwrap_err();
        assert_eq!(err.to_string(), FALLBACK);
    }

    #[test]
    fn test_failure_with_numeric_message() {
        let err = interpret_response(400, br#"{"error": 17}"#, FALLBACK).unwrap_err();
        assert_eq!(err.to_string(), "17");
    }

    #[test]
    fn test_failure_ignores_value_field() {
        let err = interpret_response(400, br#"{"value": 4}"#, FALLBACK).unwrap_err();
        assert_eq!(err.to_string(), FALLBACK);
    }

    // ===== display_value tests =====

    #[test]
    fn test_display_value_primitives() {
        assert_eq!(display_value(&json!(null)), "");
        assert_eq!(display_value(&json!(true)), "true");
        assert_eq!(display_value(&json!(25)), "25");
        assert_eq!(display_value(&json!(-3)), "-3");
        assert_eq!(display_value(&json!("NaN")), "NaN");
    }

    #[test]
    fn test_display_value_floats() {
        assert_eq!(display_value(&json!(25.0)), "25");
        assert_eq!(display_value(&json!(-0.0)), "0");
        assert_eq!(display_value(&json!(0.1)), "0.1");
        assert_eq!(display_value(&json!(3.1622776601683795)), "3.1622776601683795");
        assert_eq!(display_value(&json!(1e20)), "100000000000000000000");
        assert_eq!(display_value(&json!(0.000001)), "0.000001");
    }

    #[test]
    fn test_display_value_exponent_form() {
        assert_eq!(display_value(&json!(1e21)), "1e+21");
        assert_eq!(display_value(&json!(1e-7)), "1e-7");
        assert_eq!(display_value(&json!(-2.5e-8)), "-2.5e-8");
        // 2^100 and sin(pi), as a float-returning service sends them
        assert_eq!(
            display_value(&json!(1.2676506002282294e30)),
            "1.2676506002282294e+30"
        );
        assert_eq!(
            display_value(&json!(1.2246467991473532e-16)),
            "1.2246467991473532e-16"
        );
    }

    #[test]
    fn test_display_value_compound() {
        assert_eq!(display_value(&json!([1, 2])), "[1,2]");
        assert_eq!(display_value(&json!({"a": 1})), r#"{"a":1}"#);
    }

    // ===== EvaluationError tests =====

    #[test]
    fn test_transport_error_display_is_raw_message() {
        let err = EvaluationError::transport("Failed to fetch");
        assert_eq!(err.to_string(), "Failed to fetch");
        assert_eq!(err.status(), None);
    }
}

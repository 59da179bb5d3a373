//! Browser client for the Evaluation Service (`window.fetch`)

use async_trait::async_trait;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use super::{interpret_response, EvaluationError, EvaluationOutcome, EvaluationRequest, Evaluator};
use crate::config::WidgetConfig;

/// Evaluator that POSTs through the page's fetch API
#[derive(Debug, Clone)]
pub struct FetchEvaluator {
    endpoint: String,
    fallback: String,
}

impl FetchEvaluator {
    /// Create an evaluator for `endpoint` (may be page-relative)
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            fallback: WidgetConfig::DEFAULT_FALLBACK_ERROR.to_string(),
        }
    }

    /// Create an evaluator from configuration
    #[must_use]
    pub fn from_config(config: &WidgetConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            fallback: config.fallback_error.clone(),
        }
    }

    /// Returns the endpoint
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post(&self, request: &EvaluationRequest) -> EvaluationOutcome {
        let window =
            web_sys::window().ok_or_else(|| EvaluationError::transport("no window available"))?;
        let body = serde_json::to_string(request)
            .map_err(|e| EvaluationError::Transport(e.to_string()))?;

        let headers = web_sys::Headers::new().map_err(transport_error)?;
        headers
            .set("Content-Type", "application/json")
            .map_err(transport_error)?;

        let init = web_sys::RequestInit::new();
        init.set_method("POST");
        init.set_headers(&headers);
        init.set_body(&JsValue::from_str(&body));

        let req = web_sys::Request::new_with_str_and_init(&self.endpoint, &init)
            .map_err(transport_error)?;

        let response = JsFuture::from(window.fetch_with_request(&req))
            .await
            .map_err(transport_error)?;
        let response: web_sys::Response = response.dyn_into().map_err(transport_error)?;

        let status = response.status();
        // An unreadable body is handled like an unparseable one
        let text = match response.text() {
            Ok(promise) => JsFuture::from(promise)
                .await
                .ok()
                .and_then(|v| v.as_string())
                .unwrap_or_default(),
            Err(_) => String::new(),
        };

        interpret_response(status, text.as_bytes(), &self.fallback)
    }
}

#[async_trait(?Send)]
impl Evaluator for FetchEvaluator {
    async fn evaluate(&self, request: &EvaluationRequest) -> EvaluationOutcome {
        self.post(request).await
    }
}

/// Uses the JS error's own message, as the page would show it
fn transport_error(value: JsValue) -> EvaluationError {
    let message = value
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| value.as_string())
        .unwrap_or_else(|| format!("{value:?}"));
    EvaluationError::Transport(message)
}

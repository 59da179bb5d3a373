//! Native HTTP client for the Evaluation Service

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{interpret_response, EvaluationError, EvaluationOutcome, EvaluationRequest, Evaluator};
use crate::config::WidgetConfig;
use crate::error::WidgetResult;

/// Evaluator that POSTs to an HTTP endpoint
#[derive(Debug, Clone)]
pub struct HttpEvaluator {
    endpoint: String,
    client: reqwest::Client,
    fallback: String,
}

impl HttpEvaluator {
    /// Default request timeout
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Create an evaluator for an absolute endpoint URL
    pub fn new(endpoint: impl Into<String>) -> WidgetResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Self::DEFAULT_TIMEOUT)
            .build()?;
        Ok(Self::with_client(endpoint, client))
    }

    /// Create an evaluator from configuration
    pub fn from_config(config: &WidgetConfig) -> WidgetResult<Self> {
        config.validate()?;
        let timeout = config
            .timeout_secs
            .map_or(Self::DEFAULT_TIMEOUT, Duration::from_secs);
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(config.endpoint.clone(), client)
            .with_fallback(config.fallback_error.clone()))
    }

    /// Create an evaluator with a custom reqwest client
    pub fn with_client(endpoint: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            endpoint: endpoint.into(),
            client,
            fallback: WidgetConfig::DEFAULT_FALLBACK_ERROR.to_string(),
        }
    }

    /// Sets the message used when the service fails without one
    #[must_use]
    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = fallback.into();
        self
    }

    /// Returns the endpoint URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends one request and interprets the response
    pub async fn post(&self, request: &EvaluationRequest) -> EvaluationOutcome {
        debug!(endpoint = %self.endpoint, expression = %request.expression, "posting expression");

        let resp = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "evaluation request failed");
                EvaluationError::Transport(e.to_string())
            })?;

        let status = resp.status().as_u16();
        // An unreadable body is handled like an unparseable one
        let body = resp.bytes().await.unwrap_or_default();
        debug!(status, bytes = body.len(), "evaluation response received");

        interpret_response(status, &body, &self.fallback)
    }
}

#[async_trait]
impl Evaluator for HttpEvaluator {
    async fn evaluate(&self, request: &EvaluationRequest) -> EvaluationOutcome {
        self.post(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_keeps_endpoint() {
        let eval = HttpEvaluator::new("http://127.0.0.1:8000/api/eval").unwrap();
        assert_eq!(eval.endpoint(), "http://127.0.0.1:8000/api/eval");
    }

    #[test]
    fn test_from_config() {
        let config = WidgetConfig {
            endpoint: "http://localhost:9/api/eval".into(),
            fallback_error: "nope".into(),
            timeout_secs: Some(2),
            ..WidgetConfig::default()
        };
        let eval = HttpEvaluator::from_config(&config).unwrap();
        assert_eq!(eval.endpoint(), "http://localhost:9/api/eval");
        assert_eq!(eval.fallback, "nope");
    }

    #[test]
    fn test_from_config_rejects_invalid() {
        let config = WidgetConfig::default().with_endpoint("");
        assert!(HttpEvaluator::from_config(&config).is_err());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        // Port 9 (discard) is closed on test machines
        let eval = HttpEvaluator::new("http://127.0.0.1:9/api/eval").unwrap();
        let err = eval.post(&EvaluationRequest::new("1+1")).await.unwrap_err();
        assert!(matches!(err, EvaluationError::Transport(_)));
        assert!(!err.to_string().is_empty());
    }
}

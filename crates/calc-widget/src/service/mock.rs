//! Scripted evaluator for tests and offline demos
//!
//! Replies are raw status + body pairs pushed through the same
//! [`interpret_response`] path as the real clients, so tests exercise the
//! response handling rather than a shortcut around it.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{interpret_response, EvaluationError, EvaluationOutcome, EvaluationRequest, Evaluator};
use crate::config::WidgetConfig;

/// One canned reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedReply {
    /// An HTTP response
    Response {
        /// Status code
        status: u16,
        /// Raw body
        body: String,
    },
    /// The request fails before any response
    TransportFailure(String),
}

impl ScriptedReply {
    /// 200 with `{"value": value}`
    #[must_use]
    pub fn value(value: impl Into<Value>) -> Self {
        let value: Value = value.into();
        Self::Response {
            status: 200,
            body: json!({ "value": value }).to_string(),
        }
    }

    /// `status` with `{"error": message}`
    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        Self::Response {
            status,
            body: json!({ "error": message }).to_string(),
        }
    }

    /// `status` with an arbitrary body
    #[must_use]
    pub fn raw(status: u16, body: &str) -> Self {
        Self::Response {
            status,
            body: body.to_string(),
        }
    }

    /// A transport failure with `message`
    #[must_use]
    pub fn transport(message: &str) -> Self {
        Self::TransportFailure(message.to_string())
    }
}

/// Evaluator that answers from a queue of scripted replies
#[derive(Debug, Default)]
pub struct ScriptedEvaluator {
    replies: Mutex<VecDeque<ScriptedReply>>,
    requests: Mutex<Vec<EvaluationRequest>>,
    fallback: String,
}

impl ScriptedEvaluator {
    /// Message returned once the script runs dry
    pub const EXHAUSTED: &'static str = "no scripted reply left";

    /// Creates an evaluator with an empty script
    #[must_use]
    pub fn new() -> Self {
        Self {
            fallback: WidgetConfig::DEFAULT_FALLBACK_ERROR.to_string(),
            ..Self::default()
        }
    }

    /// Creates an evaluator that answers with `replies` in order
    #[must_use]
    pub fn with_replies(replies: impl IntoIterator<Item = ScriptedReply>) -> Self {
        let evaluator = Self::new();
        for reply in replies {
            evaluator.push(reply);
        }
        evaluator
    }

    /// Appends a reply to the script
    pub fn push(&self, reply: ScriptedReply) {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(reply);
    }

    /// Requests received so far
    #[must_use]
    pub fn requests(&self) -> Vec<EvaluationRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of requests received so far
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Answers `request` synchronously
    pub fn answer(&self, request: &EvaluationRequest) -> EvaluationOutcome {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());
        let reply = self
            .replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        match reply {
            Some(ScriptedReply::Response { status, body }) => {
                interpret_response(status, body.as_bytes(), &self.fallback)
            }
            Some(ScriptedReply::TransportFailure(message)) => {
                Err(EvaluationError::Transport(message))
            }
            None => Err(EvaluationError::transport(Self::EXHAUSTED)),
        }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl Evaluator for ScriptedEvaluator {
    async fn evaluate(&self, request: &EvaluationRequest) -> EvaluationOutcome {
        self.answer(request)
    }
}

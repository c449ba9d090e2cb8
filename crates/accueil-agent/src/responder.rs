use crate::llm::{LanguageModel, ModelError};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Why the fallback reply was used instead of a generated one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelFailure {
    pub kind: &'static str,
    pub message: String,
}

impl From<&ModelError> for ModelFailure {
    fn from(err: &ModelError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Text to speak to the caller, and how it was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    /// Set when `text` is the fallback phrase.
    pub failure: Option<ModelFailure>,
    pub latency_ms: u64,
}

impl Reply {
    pub fn is_fallback(&self) -> bool {
        self.failure.is_some()
    }
}

/// Asks the language model for a grounded reply, never failing.
///
/// Any error, including the call running past `timeout`, yields the fixed
/// fallback phrase so the call is never left in silence.
#[derive(Clone)]
pub struct ResponseGenerator {
    model: Arc<dyn LanguageModel>,
    timeout: Duration,
    fallback_reply: String,
}

impl std::fmt::Debug for ResponseGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseGenerator")
            .field("model", &self.model.model_name())
            .field("timeout", &self.timeout)
            .field("fallback_reply", &self.fallback_reply)
            .finish()
    }
}

impl ResponseGenerator {
    pub fn new(
        model: Arc<dyn LanguageModel>,
        timeout: Duration,
        fallback_reply: impl Into<String>,
    ) -> Self {
        Self {
            model,
            timeout,
            fallback_reply: fallback_reply.into(),
        }
    }

    pub fn model(&self) -> &dyn LanguageModel {
        self.model.as_ref()
    }

    pub fn fallback_reply(&self) -> &str {
        &self.fallback_reply
    }

    pub async fn generate(&self, system_prompt: &str, utterance: &str) -> Reply {
        let started = Instant::now();
        let result = match tokio::time::timeout(
            self.timeout,
            self.model.complete(system_prompt, utterance),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(ModelError::Timeout(self.timeout.as_millis() as u64)),
        };
        let latency_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(text) if !text.trim().is_empty() => Reply {
                text: text.trim().to_string(),
                failure: None,
                latency_ms,
            },
            Ok(_) => self.fallback(&ModelError::EmptyContent, latency_ms),
            Err(err) => self.fallback(&err, latency_ms),
        }
    }

    fn fallback(&self, err: &ModelError, latency_ms: u64) -> Reply {
        let failure = ModelFailure::from(err);
        tracing::warn!(
            model = self.model.model_name(),
            kind = failure.kind,
            latency_ms,
            "language model failed, using fallback reply: {}",
            err
        );
        Reply {
            text: self.fallback_reply.clone(),
            failure: Some(failure),
            latency_ms,
        }
    }
}

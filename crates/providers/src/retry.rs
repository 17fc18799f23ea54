use std::time::Duration;

use crate::adapter::InferenceClient;
use crate::types::{InferenceRequest, InferenceResult};
use mealchat_core::{InferenceError, RetryConfig};

/// Retry schedule for inference calls
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            initial_delay_ms: config.initial_delay_ms,
            max_delay_ms: config.max_delay_ms,
            backoff_multiplier: config.backoff_multiplier,
        }
    }
}

impl RetryPolicy {
    /// A single attempt, no retries
    pub fn none() -> Self {
        Self { max_attempts: 1, ..Default::default() }
    }

    /// Calculate delay for the given attempt (0-indexed)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay_ms = if attempt == 0 {
            0
        } else {
            let delay = self.initial_delay_ms as f64 * self.backoff_multiplier.powi(attempt as i32 - 1);
            delay.min(self.max_delay_ms as f64) as u64
        };

        Duration::from_millis(delay_ms)
    }

    /// Check if we should retry given the attempt number
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

/// Check if an error is retryable
pub fn is_retryable_error(error: &InferenceError) -> bool {
    error.is_transient()
}

/// Decorator that re-issues transient failures under a [`RetryPolicy`]
pub struct RetryingClient<C> {
    inner: C,
    policy: RetryPolicy,
}

impl<C> RetryingClient<C> {
    pub fn new(inner: C, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

#[async_trait::async_trait]
impl<C: InferenceClient> InferenceClient for RetryingClient<C> {
    async fn generate(&self, request: InferenceRequest) -> InferenceResult {
        let mut attempt = 0;
        loop {
            let delay = self.policy.delay_for_attempt(attempt);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            match self.inner.generate(request.clone()).await {
                Ok(reply) => return Ok(reply),
                Err(err) if is_retryable_error(&err) && self.policy.should_retry(attempt + 1) => {
                    tracing::warn!(attempt = attempt + 1, max = self.policy.max_attempts, error = %err, "retrying inference call");
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

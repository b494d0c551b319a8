use std::time::Duration;

use tracing::{error, warn};

use crate::backend::{GenerationBackend, GenerationRequest, GenerationResult};
use crate::error::GenerationError;

/// Exponential backoff around a single generation call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Zero is treated as one.
    pub max_retries: u32,
    /// Wait before the second attempt; doubles after each failure.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn attempts(&self) -> u32 {
        self.max_retries.max(1)
    }

    /// Wait after the zero-based failed attempt `attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Call `backend.generate` until it succeeds, fails permanently, or the
/// policy's attempts run out. The last error is returned unchanged.
pub async fn generate_with_retry<B>(
    backend: &B,
    request: &GenerationRequest,
    policy: &RetryPolicy,
) -> Result<GenerationResult, GenerationError>
where
    B: GenerationBackend + ?Sized,
{
    let attempts = policy.attempts();
    let mut attempt = 0;
    loop {
        match backend.generate(request).await {
            Ok(result) => return Ok(result),
            Err(e) if !e.is_transient() => {
                error!(error = %e, "generation failed permanently, not retrying");
                return Err(e);
            }
            Err(e) if attempt + 1 >= attempts => {
                error!(attempts, error = %e, "generation failed after all attempts");
                return Err(e);
            }
            Err(e) => {
                let delay = policy.delay_for(attempt);
                warn!(
                    attempt = attempt + 1,
                    of = attempts,
                    retry_in_ms = delay.as_millis() as u64,
                    error = %e,
                    "generation attempt failed"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

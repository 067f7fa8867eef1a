use std::future::Future;
use std::time::Duration;

use rand::Rng;

use crate::constants::{BACKOFF_BASE_SECONDS, BACKOFF_CAP_SECONDS, MAX_RETRIES};
use crate::error::AiError;

/// Run a provider call with classification-driven retry. Transient failures
/// (overload, quota) back off exponentially; everything else propagates on
/// the first attempt. Each call gets its own retry counter.
pub async fn with_backoff<T, F, Fut>(label: &str, mut op: F) -> Result<T, AiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AiError>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt < MAX_RETRIES => {
                let delay = backoff_delay(attempt);
                tracing::warn!(
                    label,
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "provider call failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Exponential delay, doubling per attempt, with multiplicative jitter,
/// capped so a long retry chain cannot stall a batch worker indefinitely.
pub fn backoff_delay(attempt: usize) -> Duration {
    let exp = BACKOFF_BASE_SECONDS * 2f64.powi(attempt as i32);
    let capped = exp.min(BACKOFF_CAP_SECONDS);
    let jitter: f64 = rand::thread_rng().gen_range(0.8..=1.2);
    Duration::from_secs_f64((capped * jitter).min(BACKOFF_CAP_SECONDS))
}

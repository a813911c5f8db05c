use crate::error::FetchError;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Wait before the try that follows failed attempt `attempt` (1-based)
pub fn linear_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(attempt)
}

/// Run `operation` up to `max_attempts` times with linear backoff between failures.
///
/// `operation` receives the 1-based attempt number. Both the operation and the
/// backoff wait race `cancel`; dropping an in-flight attempt is how
/// its partial output gets cleaned up.
pub async fn retry_linear<F, Fut, T>(
    max_attempts: u32,
    backoff: Duration,
    cancel: &CancellationToken,
    label: &str,
    mut operation: F,
) -> Result<T, FetchError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let max_attempts = max_attempts.max(1);
    let mut last_error = String::new();

    for attempt in 1..=max_attempts {
        if cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }

        let result = tokio::select! {
            result = operation(attempt) => result,
            _ = cancel.cancelled() => Err(FetchError::Cancelled),
        };

        match result {
            Ok(value) => {
                if attempt > 1 {
                    debug!("{} succeeded on attempt {}", label, attempt);
                }
                return Ok(value);
            }
            Err(FetchError::Cancelled) => return Err(FetchError::Cancelled),
            Err(e) => {
                warn!("attempt {} failed for {}: {}", attempt, label, e);
                last_error = e.to_string();

                if attempt < max_attempts {
                    let delay = linear_delay(backoff, attempt);
                    tokio::select! {
                        _ = sleep(delay) => {}
                        _ = cancel.cancelled() => return Err(FetchError::Cancelled),
                    }
                }
            }
        }
    }

    Err(FetchError::Exhausted {
        attempts: max_attempts,
        last_error,
    })
}

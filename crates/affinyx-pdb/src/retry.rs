//! Bounded fixed-delay retry for flaky metadata fetches.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use affinyx_common::{AffinyxError, Result};

/// Attempt budget and the pause between attempts.
///
/// `attempts` counts total tries, so an operation that fails
/// `attempts - 1` times and then succeeds still returns the success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { attempts: 10, delay: Duration::from_secs(2) }
    }
}

impl RetryPolicy {
    /// Single attempt, no pause. Turns retried operations into one-shot
    /// calls, which keeps tests fast.
    pub const NONE: Self = Self { attempts: 1, delay: Duration::ZERO };

    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self { attempts: attempts.max(1), delay }
    }

    /// Same attempt budget with the pause removed.
    pub fn without_delay(self) -> Self {
        Self { delay: Duration::ZERO, ..self }
    }
}

/// Runs `op` until it succeeds or the attempt budget is spent.
pub(crate) async fn retry<T, F, Fut>(policy: &RetryPolicy, entry_id: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = policy.attempts.max(1);
    let mut last_error = String::from("no attempts were made");

    for attempt in 1..=attempts {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                warn!(
                    entry_id,
                    attempt,
                    max_attempts = attempts,
                    error = %err,
                    "Fetch attempt failed"
                );
                last_error = err.to_string();
                if attempt < attempts && !policy.delay.is_zero() {
                    tokio::time::sleep(policy.delay).await;
                }
            }
        }
    }

    Err(AffinyxError::RetryExhausted {
        entry_id: entry_id.to_string(),
        attempts,
        message: last_error,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn flaky(calls: &AtomicUsize, fail_first: usize) -> impl Future<Output = Result<u32>> + '_ {
        let n = calls.fetch_add(1, Ordering::SeqCst);
        async move {
            if n < fail_first {
                Err(AffinyxError::InvalidInput("transient failure".to_string()))
            } else {
                Ok(42)
            }
        }
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let policy = RetryPolicy::new(3, Duration::ZERO);
        let calls = AtomicUsize::new(0);
        let value = retry(&policy, "1M17", || flaky(&calls, 0)).await.unwrap();
        assert_eq!(value, 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failures() {
        let policy = RetryPolicy::new(3, Duration::ZERO);
        let calls = AtomicUsize::new(0);
        // Fails exactly attempts - 1 times, so the final try succeeds.
        let value = retry(&policy, "1M17", || flaky(&calls, 2)).await.unwrap();
        assert_eq!(value, 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausted_budget_propagates() {
        let policy = RetryPolicy::new(3, Duration::ZERO);
        let calls = AtomicUsize::new(0);
        let err = retry(&policy, "1M17", || flaky(&calls, 3)).await.unwrap_err();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        match err {
            AffinyxError::RetryExhausted { entry_id, attempts, message } => {
                assert_eq!(entry_id, "1M17");
                assert_eq!(attempts, 3);
                assert!(message.contains("transient failure"));
            }
            other => panic!("expected RetryExhausted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_zero_attempts_is_clamped_to_one() {
        let policy = RetryPolicy::new(0, Duration::ZERO);
        assert_eq!(policy.attempts, 1);
        let calls = AtomicUsize::new(0);
        let value = retry(&policy, "1M17", || flaky(&calls, 0)).await.unwrap();
        assert_eq!(value, 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_default_policy_budget() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.attempts, 10);
        assert_eq!(policy.delay, Duration::from_secs(2));
        assert_eq!(policy.without_delay().delay, Duration::ZERO);
    }
}

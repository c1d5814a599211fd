//! Common utilities shared by the page drivers and scenario checks
//!
//! Bounded polling and small text helpers.

use anyhow::Result;
use std::future::Future;
use std::time::{Duration, Instant};

// ============================================================================
// Polling
// ============================================================================

/// Configuration for polling operations
#[derive(Debug, Clone)]
pub struct PollConfig {
    pub timeout_ms: u64,
    pub initial_interval_ms: u64,
    pub max_interval_ms: u64,
    pub use_exponential_backoff: bool,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10000,
            initial_interval_ms: 100,
            max_interval_ms: 500,
            use_exponential_backoff: true,
        }
    }
}

/// Generic polling function with optional exponential backoff
///
/// Calls `check_fn` repeatedly until it returns `true` or timeout is reached.
/// Returns `true` if condition was met, `false` if timed out.
pub async fn wait_until<F, Fut>(check_fn: F, config: PollConfig) -> bool
where
    F: Fn() -> Fut,
    Fut: Future<Output = bool>,
{
    let start = Instant::now();
    let timeout = Duration::from_millis(config.timeout_ms);
    let mut interval = config.initial_interval_ms;

    while start.elapsed() < timeout {
        if check_fn().await {
            return true;
        }

        tokio::time::sleep(Duration::from_millis(interval)).await;

        if config.use_exponential_backoff {
            interval = (interval * 3 / 2).min(config.max_interval_ms);
        }
    }

    false
}

/// Run `attempt` up to `max_attempts` times, awaiting `recover` after each failure
///
/// Returns the last error once attempts are exhausted. An error from `recover`
/// ends the retries immediately.
pub async fn retry_with_recovery<T, A, AFut, R, RFut>(
    max_attempts: usize,
    attempt: A,
    recover: R,
) -> Result<T>
where
    A: Fn() -> AFut,
    AFut: Future<Output = Result<T>>,
    R: Fn() -> RFut,
    RFut: Future<Output = Result<()>>,
{
    let mut tries = 0;
    loop {
        tries += 1;
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(e) if tries >= max_attempts => return Err(e),
            Err(e) => {
                log::debug!("attempt {} failed: {:#}", tries, e);
                recover().await?;
            }
        }
    }
}

// ============================================================================
// Text Utilities
// ============================================================================

/// First `max_chars` characters of `text`, never splitting a code point
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Collapse runs of whitespace into single spaces and trim the ends
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("Gemeinschaften", 5), "Gemei");
        assert_eq!(truncate_chars("Grüße", 3), "Grü");
        assert_eq!(truncate_chars("kurz", 80), "kurz");
        assert_eq!(truncate_chars("", 80), "");
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(
            normalize_whitespace("  Gemeinschaften \n /  Nachbarn  "),
            "Gemeinschaften / Nachbarn"
        );
    }

    #[tokio::test]
    async fn test_wait_until_succeeds_after_retries() {
        let calls = AtomicU32::new(0);
        let config = PollConfig {
            timeout_ms: 1000,
            initial_interval_ms: 1,
            max_interval_ms: 2,
            use_exponential_backoff: false,
        };

        let met = wait_until(
            || async { calls.fetch_add(1, Ordering::SeqCst) >= 2 },
            config,
        )
        .await;

        assert!(met);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_recovers_between_attempts() {
        let attempts = AtomicU32::new(0);
        let recoveries = AtomicU32::new(0);

        let value = retry_with_recovery(
            3,
            || async {
                if attempts.fetch_add(1, Ordering::SeqCst) < 2 {
                    anyhow::bail!("Execution context was destroyed");
                }
                Ok("http://localhost:3000/de")
            },
            || async {
                recoveries.fetch_add(1, Ordering::SeqCst);
                Ok(())
            },
        )
        .await
        .unwrap();

        assert_eq!(value, "http://localhost:3000/de");
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        assert_eq!(recoveries.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retry_gives_up_with_last_error() {
        let attempts = AtomicU32::new(0);

        let result: Result<()> = retry_with_recovery(
            2,
            || async {
                let n = attempts.fetch_add(1, Ordering::SeqCst);
                anyhow::bail!("failure {}", n)
            },
            || async { Ok(()) },
        )
        .await;

        assert_eq!(result.unwrap_err().to_string(), "failure 1");
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_wait_until_times_out() {
        let config = PollConfig {
            timeout_ms: 20,
            initial_interval_ms: 5,
            max_interval_ms: 5,
            use_exponential_backoff: true,
        };

        assert!(!wait_until(|| async { false }, config).await);
    }
}

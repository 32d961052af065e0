//! Bounded polling for object conditions

use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

pub mod condition;
pub mod duration;

pub use condition::{Condition, ConditionError};
pub use duration::{parse_duration, DurationError, SignedDuration};

/// Timeout applied when none is configured
pub const DEFAULT_TIMEOUT: &str = "30s";

/// Pause between two checks
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Upper bound used for negative timeouts
pub const MAX_WAIT: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// How long a wait may take
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitBudget {
    /// Check exactly once, never sleep
    Once,

    /// Keep checking until the duration has elapsed
    Within(Duration),
}

impl WaitBudget {
    /// Zero checks once, negative waits up to a week
    pub fn from_timeout(timeout: SignedDuration) -> Self {
        if timeout.is_zero() {
            WaitBudget::Once
        } else if timeout.is_negative() {
            WaitBudget::Within(MAX_WAIT)
        } else {
            WaitBudget::Within(timeout.magnitude)
        }
    }

    /// Parse a timeout string, `None` meaning the default
    pub fn parse(timeout: Option<&str>) -> Result<Self, DurationError> {
        parse_duration(timeout.unwrap_or(DEFAULT_TIMEOUT)).map(Self::from_timeout)
    }

    pub fn limit(&self) -> Duration {
        match self {
            WaitBudget::Once => Duration::ZERO,
            WaitBudget::Within(limit) => *limit,
        }
    }
}

impl Default for WaitBudget {
    fn default() -> Self {
        WaitBudget::Within(Duration::from_secs(30))
    }
}

#[derive(thiserror::Error, Debug)]
pub enum PollError<E> {
    /// The budget ran out before the check matched
    #[error("timed out after {elapsed:?} ({attempts} checks)")]
    TimedOut { elapsed: Duration, attempts: u32 },

    /// The check itself failed
    #[error("{0}")]
    Check(E),
}

/// Call `check` until it returns `true` or the budget is spent.
///
/// Sleeps `min(interval, remaining)` between checks. Returns the number of
/// checks made.
pub async fn poll_until<F, Fut, E>(
    budget: WaitBudget,
    interval: Duration,
    mut check: F,
) -> Result<u32, PollError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, E>>,
{
    let started = Instant::now();
    let interval = interval.max(Duration::from_millis(1));
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        debug!("Checking condition (attempt {})", attempts);

        if check().await.map_err(PollError::Check)? {
            return Ok(attempts);
        }

        let elapsed = started.elapsed();
        let limit = match budget {
            WaitBudget::Once => {
                return Err(PollError::TimedOut { elapsed, attempts });
            }
            WaitBudget::Within(limit) => limit,
        };

        if elapsed >= limit {
            return Err(PollError::TimedOut { elapsed, attempts });
        }

        tokio::time::sleep(interval.min(limit - elapsed)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_budget_from_timeout() {
        assert_eq!(WaitBudget::parse(Some("0")).unwrap(), WaitBudget::Once);
        assert_eq!(
            WaitBudget::parse(Some("-1s")).unwrap(),
            WaitBudget::Within(MAX_WAIT)
        );
        assert_eq!(MAX_WAIT, Duration::from_secs(604_800));
        assert_eq!(
            WaitBudget::parse(None).unwrap(),
            WaitBudget::Within(Duration::from_secs(30))
        );
        assert!(WaitBudget::parse(Some("soon")).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_once_checks_a_single_time_without_sleeping() {
        let started = Instant::now();
        let calls = Cell::new(0);

        let result = poll_until(WaitBudget::Once, DEFAULT_POLL_INTERVAL, || {
            calls.set(calls.get() + 1);
            async { Ok::<_, String>(false) }
        })
        .await;

        assert!(matches!(result, Err(PollError::TimedOut { attempts: 1, .. })));
        assert_eq!(calls.get(), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_until_budget_is_spent() {
        let started = Instant::now();

        let result = poll_until(
            WaitBudget::Within(Duration::from_millis(2500)),
            Duration::from_secs(1),
            || async { Ok::<_, String>(false) },
        )
        .await;

        // checks at 0s, 1s, 2s and 2.5s
        assert!(matches!(result, Err(PollError::TimedOut { attempts: 4, .. })));
        assert!(started.elapsed() >= Duration::from_millis(2500));
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_returns_on_first_match() {
        let calls = Cell::new(0);

        let attempts = poll_until(WaitBudget::default(), DEFAULT_POLL_INTERVAL, || {
            calls.set(calls.get() + 1);
            let ready = calls.get() == 3;
            async move { Ok::<_, String>(ready) }
        })
        .await
        .unwrap();

        assert_eq!(attempts, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_check_errors_abort() {
        let result = poll_until(WaitBudget::default(), DEFAULT_POLL_INTERVAL, || async {
            Err::<bool, _>("forbidden".to_string())
        })
        .await;

        assert!(matches!(result, Err(PollError::Check(e)) if e == "forbidden"));
    }

    #[test]
    fn test_poll_error_messages() {
        let timed_out: PollError<String> = PollError::TimedOut {
            elapsed: Duration::from_secs(30),
            attempts: 31,
        };
        assert_eq!(timed_out.to_string(), "timed out after 30s (31 checks)");

        let failed = PollError::Check("forbidden".to_string());
        assert_eq!(failed.to_string(), "forbidden");

        let error: &dyn std::error::Error = &failed;
        assert!(error.source().is_none());
    }
}

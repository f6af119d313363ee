//! Bounded retry with exponential backoff.
//!
//! A single provider call reports its outcome as an [`Attempt`]; [`with_retry`] drives the
//! attempts sequentially and sleeps between them according to [`Backoff`].

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ForecastError, UpstreamFailure};

/// Outcome of one provider call.
#[derive(Debug)]
pub enum Attempt<T> {
    Success(T),
    /// Non-success status or transport failure; another attempt may help.
    Retryable(UpstreamFailure),
    /// Retrying cannot help, e.g. a 200 whose body has the wrong shape.
    Terminal(ForecastError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    /// Extra multiplier applied to the pending delay after a 429.
    #[serde(default = "default_rate_limit_factor")]
    pub rate_limit_factor: u32,
}

const fn default_max_attempts() -> u32 {
    3
}

const fn default_initial_delay_ms() -> u64 {
    1000
}

const fn default_rate_limit_factor() -> u32 {
    4
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            rate_limit_factor: default_rate_limit_factor(),
        }
    }
}

/// Delay schedule: 1s, 2s, 4s, ... with a 429 multiplying the pending delay first.
#[derive(Debug, Clone)]
pub struct Backoff {
    next: Duration,
    rate_limit_factor: u32,
}

impl Backoff {
    pub fn new(policy: &RetryPolicy) -> Self {
        Self {
            next: Duration::from_millis(policy.initial_delay_ms),
            rate_limit_factor: policy.rate_limit_factor.max(1),
        }
    }

    /// Delay to sleep after a failed attempt. Doubles the following delay.
    pub fn after_failure(&mut self, rate_limited: bool) -> Duration {
        if rate_limited {
            self.next = self.next.saturating_mul(self.rate_limit_factor);
        }
        let delay = self.next;
        self.next = self.next.saturating_mul(2);
        delay
    }
}

/// Run `op` until it succeeds, fails terminally, or the attempt budget is spent.
///
/// `op` receives the 1-based attempt number. No sleep follows the final attempt.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, ForecastError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Attempt<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut backoff = Backoff::new(policy);
    let mut attempt = 1;

    loop {
        let failure = match op(attempt).await {
            Attempt::Success(value) => return Ok(value),
            Attempt::Terminal(err) => return Err(err),
            Attempt::Retryable(failure) => failure,
        };

        if attempt >= max_attempts {
            return Err(ForecastError::UpstreamExhausted { attempts: attempt, failure });
        }

        let delay = backoff.after_failure(failure.is_rate_limited());
        warn!(
            attempt,
            max_attempts,
            delay_ms = delay.as_millis() as u64,
            %failure,
            "provider attempt failed, backing off"
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use std::sync::{Arc, Mutex};
    use tokio::time::Instant;

    fn server_error() -> UpstreamFailure {
        UpstreamFailure::status(StatusCode::INTERNAL_SERVER_ERROR, None)
    }

    fn rate_limited() -> UpstreamFailure {
        UpstreamFailure::status(StatusCode::TOO_MANY_REQUESTS, None)
    }

    #[test]
    fn backoff_doubles() {
        let mut backoff = Backoff::new(&RetryPolicy::default());
        assert_eq!(backoff.after_failure(false), Duration::from_millis(1000));
        assert_eq!(backoff.after_failure(false), Duration::from_millis(2000));
        assert_eq!(backoff.after_failure(false), Duration::from_millis(4000));
    }

    #[test]
    fn rate_limit_multiplies_before_doubling() {
        let mut backoff = Backoff::new(&RetryPolicy::default());
        assert_eq!(backoff.after_failure(true), Duration::from_millis(4000));
        assert_eq!(backoff.after_failure(false), Duration::from_millis(8000));
    }

    /// Records the instant each attempt starts, relative to the first.
    async fn run_recording(
        outcomes: Vec<Attempt<&'static str>>,
    ) -> (Result<&'static str, ForecastError>, Vec<Duration>) {
        let outcomes = Arc::new(Mutex::new(outcomes.into_iter()));
        let starts = Arc::new(Mutex::new(Vec::new()));
        let origin = Instant::now();

        let result = with_retry(&RetryPolicy::default(), |_| {
            let outcomes = Arc::clone(&outcomes);
            let starts = Arc::clone(&starts);
            async move {
                starts.lock().unwrap().push(origin.elapsed());
                outcomes.lock().unwrap().next().expect("more attempts than outcomes")
            }
        })
        .await;

        let starts = starts.lock().unwrap().clone();
        (result, starts)
    }

    #[tokio::test(start_paused = true)]
    async fn three_failures_sleep_one_then_two_seconds() {
        let (result, starts) = run_recording(vec![
            Attempt::Retryable(server_error()),
            Attempt::Retryable(server_error()),
            Attempt::Retryable(server_error()),
        ])
        .await;

        assert!(matches!(result, Err(ForecastError::UpstreamExhausted { attempts: 3, .. })));
        assert_eq!(starts, vec![Duration::ZERO, Duration::from_secs(1), Duration::from_secs(3)]);
    }

    #[tokio::test(start_paused = true)]
    async fn first_429_backs_off_four_times_longer() {
        let (result, starts) = run_recording(vec![
            Attempt::Retryable(rate_limited()),
            Attempt::Retryable(server_error()),
            Attempt::Success("sunny"),
        ])
        .await;

        assert_eq!(result.unwrap(), "sunny");
        assert_eq!(starts, vec![Duration::ZERO, Duration::from_secs(4), Duration::from_secs(12)]);
    }

    #[tokio::test(start_paused = true)]
    async fn terminal_failure_stops_immediately() {
        let (result, starts) = run_recording(vec![Attempt::Terminal(
            ForecastError::MalformedResponse("missing forecast".into()),
        )])
        .await;

        assert!(matches!(result, Err(ForecastError::MalformedResponse(_))));
        assert_eq!(starts.len(), 1);
    }
}

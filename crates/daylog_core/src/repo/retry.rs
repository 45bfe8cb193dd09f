//! Bounded retry with linear backoff.
//!
//! # Invariants
//! - An operation runs at most `max_retries + 1` times.
//! - The wait after failed attempt `n` is `base_delay * n`.
//! - No wait follows the final attempt.

use log::warn;
use std::fmt::Display;
use std::time::Duration;

pub const DEFAULT_MAX_RETRIES: u32 = 2;
pub const DEFAULT_RETRY_BASE_DELAY: Duration = Duration::from_millis(100);

/// Retry budget for storage writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first one.
    pub max_retries: u32,
    /// Multiplied by the attempt number to get each wait.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_RETRY_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    /// A policy that tries once and never waits.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Wait applied after the given failed attempt (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }
}

/// Returned when every attempt failed.
#[derive(Debug)]
pub struct RetryExhausted<E> {
    pub attempts: u32,
    pub last_error: E,
}

/// Runs `op` until it succeeds or the policy is exhausted, sleeping with
/// `std::thread::sleep` between attempts.
pub fn run_with_retry<T, E, F>(
    policy: &RetryPolicy,
    op_name: &str,
    op: F,
) -> Result<T, RetryExhausted<E>>
where
    E: Display,
    F: FnMut(u32) -> Result<T, E>,
{
    run_with_retry_and_sleep(policy, op_name, op, std::thread::sleep)
}

/// Same as [`run_with_retry`] with an injectable sleep.
pub fn run_with_retry_and_sleep<T, E, F, S>(
    policy: &RetryPolicy,
    op_name: &str,
    mut op: F,
    mut sleep: S,
) -> Result<T, RetryExhausted<E>>
where
    E: Display,
    F: FnMut(u32) -> Result<T, E>,
    S: FnMut(Duration),
{
    let max_attempts = policy.max_attempts();
    let mut attempt = 1;
    loop {
        match op(attempt) {
            Ok(value) => return Ok(value),
            Err(err) => {
                warn!(
                    "event=retry_attempt_failed module=repo op={op_name} attempt={attempt} max_attempts={max_attempts} error={err}"
                );
                if attempt >= max_attempts {
                    return Err(RetryExhausted {
                        attempts: attempt,
                        last_error: err,
                    });
                }
                sleep(policy.delay_for(attempt));
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{run_with_retry_and_sleep, RetryPolicy};
    use std::time::Duration;

    fn policy() -> RetryPolicy {
        RetryPolicy {
            max_retries: 2,
            base_delay: Duration::from_millis(100),
        }
    }

    #[test]
    fn delays_grow_linearly_and_stop_after_last_attempt() {
        let mut slept = Vec::new();
        let result: Result<(), _> = run_with_retry_and_sleep(
            &policy(),
            "test",
            |_| Err::<(), _>("boom"),
            |delay| slept.push(delay),
        );

        let exhausted = result.unwrap_err();
        assert_eq!(exhausted.attempts, 3);
        assert_eq!(exhausted.last_error, "boom");
        assert_eq!(
            slept,
            vec![Duration::from_millis(100), Duration::from_millis(200)]
        );
    }

    #[test]
    fn success_after_failures_returns_value() {
        let mut seen = Vec::new();
        let value = run_with_retry_and_sleep(
            &policy(),
            "test",
            |attempt| {
                seen.push(attempt);
                if attempt < 3 {
                    Err("transient")
                } else {
                    Ok(attempt * 10)
                }
            },
            |_| {},
        )
        .unwrap();

        assert_eq!(value, 30);
        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[test]
    fn no_retry_policy_runs_once() {
        let mut calls = 0;
        let result = run_with_retry_and_sleep(
            &RetryPolicy::no_retry(),
            "test",
            |_| {
                calls += 1;
                Err::<(), _>("fail")
            },
            |_| panic!("must not sleep"),
        );

        assert_eq!(result.unwrap_err().attempts, 1);
        assert_eq!(calls, 1);
    }
}

use std::io;
use std::thread;
use std::time::Duration;

/// Retry schedule for operations that can fail transiently
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one
    pub max_attempts: u32,
    /// Delay before the second attempt
    pub base_delay: Duration,
    /// Factor applied to the delay after every failed attempt
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            multiplier: 2,
        }
    }
}

impl RetryPolicy {
    /// Policy that retries without sleeping
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            multiplier: 1,
        }
    }

    /// Single attempt, no retry
    pub fn none() -> Self {
        Self::immediate(1)
    }

    /// Delay to wait after failed attempt number `attempt` (1-based)
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = self
            .multiplier
            .max(1)
            .saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor)
    }
}

/// The last error of an operation that did not succeed
#[derive(Debug)]
pub struct RetryFailure {
    pub error: io::Error,
    /// Attempts made, including the failing one
    pub attempts: u32,
    /// Whether the last error was still classified transient (retries exhausted)
    pub transient: bool,
}

impl std::fmt::Display for RetryFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.transient {
            write!(f, "{} (gave up after {} attempts)", self.error, self.attempts)
        } else {
            write!(f, "{}", self.error)
        }
    }
}

/// Run `op` until it succeeds, fails with a non-transient error, or the policy
/// runs out of attempts. Sleeps with exponential backoff between attempts.
pub fn retry_while_transient<T, C, F>(
    policy: &RetryPolicy,
    is_transient: C,
    mut op: F,
) -> Result<T, RetryFailure>
where
    C: Fn(&io::Error) -> bool,
    F: FnMut() -> io::Result<T>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(error) => {
                let transient = is_transient(&error);
                if !transient || attempt >= max_attempts {
                    return Err(RetryFailure {
                        error,
                        attempts: attempt,
                        transient,
                    });
                }

                let delay = policy.delay_after(attempt);
                tracing::debug!(attempt, ?delay, %error, "transient failure, retrying");
                thread::sleep(delay);
                attempt += 1;
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn busy() -> io::Error {
        io::Error::new(io::ErrorKind::Other, "file is locked")
    }

    fn is_busy(err: &io::Error) -> bool {
        err.to_string().contains("locked")
    }

    #[test]
    fn test_backoff_schedule() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_after(1), Duration::from_millis(500));
        assert_eq!(policy.delay_after(2), Duration::from_millis(1000));
        assert_eq!(policy.delay_after(3), Duration::from_millis(2000));
    }

    #[test]
    fn test_succeeds_after_transient_failures() {
        let calls = Cell::new(0);
        let result = retry_while_transient(&RetryPolicy::immediate(3), is_busy, || {
            calls.set(calls.get() + 1);
            if calls.get() < 3 {
                Err(busy())
            } else {
                Ok("done")
            }
        });
        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_gives_up_when_attempts_exhausted() {
        let calls = Cell::new(0);
        let result: Result<(), _> = retry_while_transient(&RetryPolicy::immediate(4), is_busy, || {
            calls.set(calls.get() + 1);
            Err(busy())
        });
        let failure = result.unwrap_err();
        assert_eq!(calls.get(), 4);
        assert_eq!(failure.attempts, 4);
        assert!(failure.transient);
    }

    #[test]
    fn test_non_transient_error_stops_immediately() {
        let calls = Cell::new(0);
        let result: Result<(), _> = retry_while_transient(&RetryPolicy::immediate(5), is_busy, || {
            calls.set(calls.get() + 1);
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
        });
        let failure = result.unwrap_err();
        assert_eq!(calls.get(), 1);
        assert!(!failure.transient);
        assert_eq!(failure.error.kind(), io::ErrorKind::PermissionDenied);
    }

    #[test]
    fn test_zero_attempts_still_tries_once() {
        let calls = Cell::new(0);
        let _ = retry_while_transient(&RetryPolicy::immediate(0), is_busy, || {
            calls.set(calls.get() + 1);
            Err::<(), _>(busy())
        });
        assert_eq!(calls.get(), 1);
    }
}

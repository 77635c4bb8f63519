//! Retry state machine for detail fetches.
//!
//! Only HTTP 429 is retried. Each rate-limited attempt backs off for twice
//! the previous delay (2, 4, 8, 16, 32 units with the defaults) and the
//! machine fails once the attempt budget is spent.

use crate::config::PipelineConfig;
use std::time::Duration;

/// Backoff schedule and attempt budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts allowed, the first one included
    pub max_attempts: u32,
    /// Delay after the first rate-limited attempt
    pub initial_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.max_attempts, config.backoff_unit.saturating_mul(2))
    }

    /// Delay applied after rate-limited attempt `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let doublings = attempt.saturating_sub(1).min(31);
        self.initial_delay.saturating_mul(1u32 << doublings)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}

/// Where a single identifier's fetch currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    /// Request `attempt` (1-based) is about to be or being sent
    Attempting { attempt: u32 },
    /// Attempt `attempt` was rate limited; waiting `delay` before the next
    BackingOff { attempt: u32, delay: Duration },
    Succeeded,
    Failed,
}

/// Explicit retry state: current phase plus attempts started
#[derive(Debug, Clone)]
pub struct RetryMachine {
    policy: RetryPolicy,
    state: FetchState,
    attempts: u32,
}

impl RetryMachine {
    pub fn new(policy: RetryPolicy) -> Self {
        let (state, attempts) = if policy.max_attempts == 0 {
            (FetchState::Failed, 0)
        } else {
            (FetchState::Attempting { attempt: 1 }, 1)
        };
        Self {
            policy,
            state,
            attempts,
        }
    }

    pub fn state(&self) -> FetchState {
        self.state
    }

    /// Attempts started so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// `Attempting -> BackingOff`. Returns the delay to sleep.
    ///
    /// Returns `None` if the machine is not currently attempting.
    pub fn rate_limited(&mut self) -> Option<Duration> {
        let FetchState::Attempting { attempt } = self.state else {
            return None;
        };
        let delay = self.policy.delay_for(attempt);
        self.state = FetchState::BackingOff { attempt, delay };
        Some(delay)
    }

    /// `BackingOff -> Attempting`, or `Failed` once the budget is spent.
    ///
    /// Returns `true` if another attempt may be made.
    pub fn resume(&mut self) -> bool {
        let FetchState::BackingOff { attempt, .. } = self.state else {
            return false;
        };
        if attempt >= self.policy.max_attempts {
            self.state = FetchState::Failed;
            false
        } else {
            self.attempts = attempt + 1;
            self.state = FetchState::Attempting {
                attempt: self.attempts,
            };
            true
        }
    }

    pub fn succeed(&mut self) {
        if let FetchState::Attempting { .. } = self.state {
            self.state = FetchState::Succeeded;
        }
    }

    /// Terminal failure without retry (non-429 status, bad body).
    pub fn fail(&mut self) {
        self.state = FetchState::Failed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> RetryPolicy {
        RetryPolicy::new(5, Duration::from_secs(2))
    }

    #[test]
    fn test_backoff_doubles_for_each_rate_limit() {
        let mut machine = RetryMachine::new(policy());
        let mut delays = Vec::new();

        while let FetchState::Attempting { .. } = machine.state() {
            let delay = machine.rate_limited().unwrap();
            delays.push(delay.as_secs());
            machine.resume();
        }

        assert_eq!(delays, vec![2, 4, 8, 16, 32]);
        assert_eq!(machine.state(), FetchState::Failed);
    }

    #[test]
    fn test_no_sixth_attempt() {
        let mut machine = RetryMachine::new(policy());
        for attempt in 1..=4 {
            assert_eq!(machine.state(), FetchState::Attempting { attempt });
            machine.rate_limited();
            assert!(machine.resume());
        }
        assert_eq!(machine.state(), FetchState::Attempting { attempt: 5 });
        assert_eq!(machine.rate_limited(), Some(Duration::from_secs(32)));
        assert_eq!(machine.attempts(), 5);
        assert!(!machine.resume());
        assert_eq!(machine.state(), FetchState::Failed);
        assert_eq!(machine.rate_limited(), None);
    }

    #[test]
    fn test_success_after_backoff() {
        let mut machine = RetryMachine::new(policy());
        machine.rate_limited();
        assert_eq!(
            machine.state(),
            FetchState::BackingOff {
                attempt: 1,
                delay: Duration::from_secs(2)
            }
        );
        machine.resume();
        machine.succeed();
        assert_eq!(machine.state(), FetchState::Succeeded);
    }

    #[test]
    fn test_fail_is_immediate() {
        let mut machine = RetryMachine::new(policy());
        machine.fail();
        assert_eq!(machine.state(), FetchState::Failed);
        assert!(!machine.resume());
    }

    #[test]
    fn test_policy_delay_schedule() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 5);
        let schedule: Vec<u64> = (1..=5).map(|a| policy.delay_for(a).as_secs()).collect();
        assert_eq!(schedule, vec![2, 4, 8, 16, 32]);

        // The machine sleeps exactly what the policy schedules
        let policy = RetryPolicy::new(3, Duration::from_millis(7));
        let mut machine = RetryMachine::new(policy);
        for attempt in 1..=3 {
            assert_eq!(machine.rate_limited(), Some(policy.delay_for(attempt)));
            machine.resume();
        }
        assert_eq!(machine.state(), FetchState::Failed);
    }
}

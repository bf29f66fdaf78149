/*!
 * Internet reachability check after association
 */

use crate::error::AttemptError;
use log::debug;
use std::time::Duration;

#[cfg(test)]
use mockall::automock;

/// Single round-trip check against an external host
#[cfg_attr(test, automock)]
pub trait ReachabilityChecker {
    fn check(&mut self, host: &str, timeout: Duration) -> Result<(), AttemptError>;
}

/// Waits for the link to settle, then checks reachability once
#[derive(Debug)]
pub struct ReachabilityProbe<R> {
    checker: R,
    host: String,
}

impl<R: ReachabilityChecker> ReachabilityProbe<R> {
    pub fn new(checker: R, host: impl Into<String>) -> Self {
        Self {
            checker,
            host: host.into(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn checker(&self) -> &R {
        &self.checker
    }

    /// Sleep `settle`, then probe the host once within `timeout`
    ///
    /// # Returns
    /// * `true` - The host answered
    /// * `false` - Timeout, error or negative answer
    pub fn probe(&mut self, settle: Duration, timeout: Duration) -> bool {
        if !settle.is_zero() {
            std::thread::sleep(settle);
        }

        match self.checker.check(&self.host, timeout) {
            Ok(()) => true,
            Err(e) => {
                debug!("reachability check on {} failed: {e}", self.host);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;

    #[test]
    fn test_probe_success() {
        let mut checker = MockReachabilityChecker::new();
        checker
            .expect_check()
            .with(eq("example.com"), eq(Duration::from_secs(3)))
            .times(1)
            .returning(|_, _| Ok(()));

        let mut probe = ReachabilityProbe::new(checker, "example.com");
        assert!(probe.probe(Duration::ZERO, Duration::from_secs(3)));
    }

    #[test]
    fn test_probe_timeout_is_unreachable() {
        let mut checker = MockReachabilityChecker::new();
        checker
            .expect_check()
            .times(1)
            .returning(|_, timeout| Err(AttemptError::ReachabilityTimeout(timeout)));

        let mut probe = ReachabilityProbe::new(checker, "example.com");
        assert!(!probe.probe(Duration::ZERO, Duration::from_millis(10)));
    }

    #[test]
    fn test_probe_waits_for_settle() {
        let mut checker = MockReachabilityChecker::new();
        checker.expect_check().returning(|_, _| Ok(()));

        let mut probe = ReachabilityProbe::new(checker, "example.com");
        let start = std::time::Instant::now();
        assert!(probe.probe(Duration::from_millis(50), Duration::from_secs(1)));
        assert!(start.elapsed() >= Duration::from_millis(50));
    }
}

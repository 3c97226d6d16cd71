//! Jittered retry delays.

use std::time::Duration;

use marker_lock_core::options::LockOptions;
use rand::Rng;

/// Uniformly random retry delays within fixed bounds, with a total budget.
///
/// Waiters that started together draw different delays, so they do not
/// retry in lockstep.
#[derive(Debug, Clone)]
pub(crate) struct Backoff {
    min: Duration,
    max: Duration,
    budget: Duration,
    waited: Duration,
}

impl Backoff {
    pub(crate) fn new(options: &LockOptions, budget: Duration) -> Self {
        Self {
            min: options.backoff_min,
            max: options.backoff_max,
            budget,
            waited: Duration::ZERO,
        }
    }

    /// Total time handed out so far.
    pub(crate) fn waited(&self) -> Duration {
        self.waited
    }

    /// Next delay, or `None` once the budget is used up.
    ///
    /// The last delay is cut short so the total never exceeds the budget.
    pub(crate) fn next_delay<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Duration> {
        let remaining = self.budget.checked_sub(self.waited)?;
        if remaining.is_zero() {
            return None;
        }

        let delay = rng.gen_range(self.min..=self.max).min(remaining);
        self.waited += delay;
        Some(delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn options(min_ms: u64, max_ms: u64) -> LockOptions {
        LockOptions {
            backoff_min: Duration::from_millis(min_ms),
            backoff_max: Duration::from_millis(max_ms),
            ..LockOptions::default()
        }
    }

    #[test]
    fn test_delays_stay_within_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut backoff = Backoff::new(&options(500, 1500), Duration::from_secs(3600));
        for _ in 0..200 {
            let delay = backoff.next_delay(&mut rng).unwrap();
            assert!(delay >= Duration::from_millis(500), "{delay:?}");
            assert!(delay <= Duration::from_millis(1500), "{delay:?}");
        }
    }

    #[test]
    fn test_delays_are_jittered() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut backoff = Backoff::new(&options(500, 1500), Duration::from_secs(3600));
        let first = backoff.next_delay(&mut rng).unwrap();
        let differs = (0..20).any(|_| backoff.next_delay(&mut rng).unwrap() != first);
        assert!(differs);
    }

    #[test]
    fn test_budget_is_never_exceeded() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut backoff = Backoff::new(&options(500, 1500), Duration::from_secs(2));
        let mut total = Duration::ZERO;
        while let Some(delay) = backoff.next_delay(&mut rng) {
            total += delay;
        }
        assert_eq!(total, Duration::from_secs(2));
        assert_eq!(backoff.waited(), total);
        assert!(backoff.next_delay(&mut rng).is_none());
    }

    #[test]
    fn test_short_budget_clamps_first_delay() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut backoff = Backoff::new(&options(500, 1500), Duration::from_millis(200));
        assert_eq!(
            backoff.next_delay(&mut rng),
            Some(Duration::from_millis(200))
        );
        assert_eq!(backoff.next_delay(&mut rng), None);
    }

    #[test]
    fn test_zero_budget_never_sleeps() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut backoff = Backoff::new(&options(500, 1500), Duration::ZERO);
        assert_eq!(backoff.next_delay(&mut rng), None);
    }

    #[test]
    fn test_fixed_range() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut backoff = Backoff::new(&options(100, 100), Duration::from_secs(1));
        assert_eq!(
            backoff.next_delay(&mut rng),
            Some(Duration::from_millis(100))
        );
    }
}

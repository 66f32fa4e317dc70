use std::time::Duration;

/// Attempt budget and exponential backoff for one provider.
///
/// `max_attempts` counts dispatches, including the first: with 3 the
/// provider is tried at most three times, sleeping `delay_for(0)` and
/// `delay_for(1)` in between.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub multiplier: f64,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, multiplier: f64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            multiplier,
        }
    }

    /// 3 attempts, 1500ms base, x1.3.
    pub fn primary() -> Self {
        Self::new(3, Duration::from_millis(1500), 1.3)
    }

    /// 2 attempts, 2000ms base, x1.5.
    pub fn secondary() -> Self {
        Self::new(2, Duration::from_millis(2000), 1.5)
    }

    /// Sleep before retry number `attempt + 1`: `base * multiplier^attempt`,
    /// rounded to the millisecond.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let ms = self.base_delay.as_millis() as f64 * self.multiplier.powi(exponent);
        Duration::from_millis(ms.round() as u64)
    }

    /// Whether another dispatch is allowed after `attempt` (0-indexed) failed.
    pub fn allows_retry_after(&self, attempt: u32) -> bool {
        attempt + 1 < self.max_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_backoff_schedule() {
        let p = RetryPolicy::primary();
        assert_eq!(p.delay_for(0), Duration::from_millis(1500));
        assert_eq!(p.delay_for(1), Duration::from_millis(1950));
        assert_eq!(p.delay_for(2), Duration::from_millis(2535));
    }

    #[test]
    fn secondary_backoff_schedule() {
        let p = RetryPolicy::secondary();
        assert_eq!(p.delay_for(0), Duration::from_millis(2000));
        assert_eq!(p.delay_for(1), Duration::from_millis(3000));
        assert_eq!(p.delay_for(2), Duration::from_millis(4500));
    }

    #[test]
    fn attempt_budget() {
        let p = RetryPolicy::primary();
        assert!(p.allows_retry_after(0));
        assert!(p.allows_retry_after(1));
        assert!(!p.allows_retry_after(2));

        let s = RetryPolicy::secondary();
        assert!(s.allows_retry_after(0));
        assert!(!s.allows_retry_after(1));
    }

    #[test]
    fn zero_attempts_clamped_to_one() {
        let p = RetryPolicy::new(0, Duration::from_millis(10), 2.0);
        assert_eq!(p.max_attempts, 1);
        assert!(!p.allows_retry_after(0));
    }
}

use std::time::Duration;

use rand::RngExt;

/// Delay before a failed key becomes due again.
///
/// `delay = min(base * 2^(attempts - 1), max) * (1 + U[0, jitter))`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackoffPolicy {
    pub base: Duration,
    pub max: Duration,
    pub jitter: f64,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base: Duration::from_secs(10),
            max: Duration::from_secs(60 * 60),
            jitter: 0.2,
        }
    }
}

impl BackoffPolicy {
    /// Un-jittered delay after the `attempts`-th failure (1-based).
    pub fn base_delay(&self, attempts: i32) -> Duration {
        let exponent = attempts.saturating_sub(1).clamp(0, 31) as u32;
        let factor = 2u32.saturating_pow(exponent);
        self.base.saturating_mul(factor).min(self.max)
    }

    pub fn delay(&self, attempts: i32) -> Duration {
        let delay = self.base_delay(attempts);
        if self.jitter <= 0.0 {
            return delay;
        }
        let mut rng = rand::rng();
        let spread: f64 = rng.random_range(0.0..self.jitter);
        delay.mul_f64(1.0 + spread)
    }
}

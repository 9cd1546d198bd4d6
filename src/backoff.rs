use std::time::Duration;

use rand::Rng;

use crate::errors::Error;

// Exponent cap keeping the shift well clear of overflow; the delay saturates
// at `max` long before this matters for sane configurations.
const MAX_EXPONENT: u32 = 10;

/// Exponential backoff schedule with jitter for refresh failures.
#[derive(Clone, Debug)]
pub struct BackoffPlan {
    initial: Duration,
    max: Duration,
}

impl BackoffPlan {
    pub fn new(initial: Duration, max: Duration) -> Result<Self, Error> {
        if initial.is_zero() {
            return Err(Error::Config("initial backoff must be > 0".into()));
        }
        Ok(Self { initial, max })
    }

    /// Delay before the next attempt after `failures` consecutive failures.
    ///
    /// Doubles per failure from `initial`, saturates at `max`, then adds a
    /// uniform jitter in `[0, 0.25 * capped)` on top. Deterministic given a
    /// seeded `rng`; never zero for a positive failure count.
    pub fn delay_for(&self, failures: u32, rng: &mut impl Rng) -> Duration {
        let exponent = failures.max(1).saturating_sub(1).min(MAX_EXPONENT);
        let exponential = self.initial.saturating_mul(1 << exponent);
        let capped = exponential.min(self.max);
        let jitter = capped.mul_f64(0.25 * rng.gen_range(0.0..1.0));
        capped + jitter
    }
}

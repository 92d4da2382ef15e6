//! Exponential backoff with jitter.

use rand::Rng;
use std::time::Duration;

/// Fraction of the base delay that may be added as jitter.
pub const JITTER_RATIO: f64 = 0.1;

/// Delay before the attempt following `attempt` (0-indexed), without jitter.
///
/// `min(base_ms * 2^attempt, max_ms)`, saturating instead of overflowing.
pub fn exponential_delay(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    let factor = 2u64.checked_pow(attempt).unwrap_or(u64::MAX);
    Duration::from_millis(base_ms.saturating_mul(factor).min(max_ms))
}

/// Calculate exponential backoff delay with jitter.
///
/// The result lies in `[d, d * 1.1)` where `d = exponential_delay(..)`.
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    let delay = exponential_delay(attempt, base_ms, max_ms);
    delay + jitter(delay, &mut rand::thread_rng())
}

/// Uniform jitter in `[0, JITTER_RATIO * delay)`, at microsecond resolution.
pub fn jitter<R: Rng + ?Sized>(delay: Duration, rng: &mut R) -> Duration {
    let range_us = delay.as_micros() as f64 * JITTER_RATIO;
    if range_us < 1.0 {
        return Duration::ZERO;
    }
    Duration::from_micros(rng.gen_range(0.0..range_us) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    #[test]
    fn test_exponential_growth() {
        assert_eq!(exponential_delay(0, 2000, 8000), Duration::from_millis(2000));
        assert_eq!(exponential_delay(1, 2000, 8000), Duration::from_millis(4000));
        assert_eq!(exponential_delay(2, 2000, 8000), Duration::from_millis(8000));
        assert_eq!(exponential_delay(3, 2000, 8000), Duration::from_millis(8000));
    }

    #[test]
    fn test_huge_attempt_saturates() {
        assert_eq!(exponential_delay(200, 1000, 8000), Duration::from_millis(8000));
    }

    #[test]
    fn test_backoff_bounds() {
        for attempt in 0..6 {
            let floor = exponential_delay(attempt, 100, 2000);
            for _ in 0..50 {
                let delay = calculate_backoff(attempt, 100, 2000);
                assert!(delay >= floor, "{delay:?} below {floor:?}");
                assert!(delay < floor.mul_f64(1.0 + JITTER_RATIO) + Duration::from_micros(1));
            }
        }
    }

    #[test]
    fn test_jitter_zero_for_tiny_delays() {
        let mut rng = StepRng::new(u64::MAX / 2, 1);
        assert_eq!(jitter(Duration::from_micros(5), &mut rng), Duration::ZERO);
    }
}

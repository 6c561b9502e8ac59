use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{trace, warn};

/// Inclusive millisecond range for the pause between requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayRange {
    #[serde(default = "default_min_ms")]
    pub min: u64,
    #[serde(default = "default_max_ms")]
    pub max: u64,
}

fn default_min_ms() -> u64 {
    400
}

fn default_max_ms() -> u64 {
    1200
}

impl Default for DelayRange {
    fn default() -> Self {
        Self {
            min: default_min_ms(),
            max: default_max_ms(),
        }
    }
}

impl DelayRange {
    pub fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    pub fn is_valid(&self) -> bool {
        self.min <= self.max
    }

    /// Draw a delay uniformly from `[min, max]`. `None` for an inverted range.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Option<Duration> {
        self.is_valid()
            .then(|| Duration::from_millis(rng.random_range(self.min..=self.max)))
    }

    /// Sleep for one jittered delay and return how long that was.
    ///
    /// An inverted range (e.g. only `max` set below the default `min`) does
    /// not sleep at all.
    pub async fn pause(&self) -> Duration {
        let Some(delay) = self.sample(&mut rand::rng()) else {
            warn!(
                min_ms = self.min,
                max_ms = self.max,
                "Delay range is inverted, skipping pause"
            );
            return Duration::ZERO;
        };
        trace!(delay_ms = delay.as_millis() as u64, "Jitter pause");
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    proptest! {
        #[test]
        fn test_sample_within_bounds(min in 0u64..5_000, span in 0u64..5_000, seed in any::<u64>()) {
            let range = DelayRange::new(min, min + span);
            let mut rng = StdRng::seed_from_u64(seed);
            let delay = range.sample(&mut rng).unwrap();
            prop_assert!(delay >= Duration::from_millis(range.min));
            prop_assert!(delay <= Duration::from_millis(range.max));
        }
    }

    #[test]
    fn test_degenerate_range() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(DelayRange::new(0, 0).sample(&mut rng), Some(Duration::ZERO));
        assert_eq!(
            DelayRange::new(250, 250).sample(&mut rng),
            Some(Duration::from_millis(250))
        );
    }

    #[test]
    fn test_inverted_range_has_no_sample() {
        let mut rng = StdRng::seed_from_u64(7);
        let range = DelayRange::new(900, 100);
        assert!(!range.is_valid());
        assert_eq!(range.sample(&mut rng), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_inverted_range_pause_does_not_sleep() {
        let range = DelayRange::new(400, 300);
        let before = tokio::time::Instant::now();
        let delay = range.pause().await;
        assert_eq!(delay, Duration::ZERO);
        assert_eq!(before.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_sleeps_sampled_delay() {
        let range = DelayRange::new(300, 300);
        let before = tokio::time::Instant::now();
        let delay = range.pause().await;
        assert_eq!(delay, Duration::from_millis(300));
        assert!(before.elapsed() >= Duration::from_millis(300));
    }
}

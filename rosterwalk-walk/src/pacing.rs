//! Pauses between UI interactions.
//!
//! Every wait the engine performs goes through a [`Pacer`], so tests can swap
//! real sleeping for an [`InstantPacer`] that only records what was asked for.
//! Randomized waits are described by a [`Jitter`]: `base + uniform(0, spread)`.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

// ============================================================================
// Jitter
// ============================================================================

/// A delay of `base` plus a uniformly random amount up to `spread`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Jitter {
    /// Fixed part of the delay.
    pub base: Duration,
    /// Upper bound of the random part.
    pub spread: Duration,
}

impl Jitter {
    /// No delay at all.
    pub const ZERO: Self = Self::fixed(Duration::ZERO);

    /// Creates a jittered delay.
    pub const fn new(base: Duration, spread: Duration) -> Self {
        Self { base, spread }
    }

    /// Creates a delay without a random part.
    pub const fn fixed(base: Duration) -> Self {
        Self {
            base,
            spread: Duration::ZERO,
        }
    }

    /// Creates a jittered delay from milliseconds.
    pub const fn from_millis(base_ms: u64, spread_ms: u64) -> Self {
        Self::new(Duration::from_millis(base_ms), Duration::from_millis(spread_ms))
    }

    /// Longest delay this jitter can produce.
    pub fn upper_bound(&self) -> Duration {
        self.base + self.spread
    }

    /// Draws a delay using the given random source.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let spread_ms = u64::try_from(self.spread.as_millis()).unwrap_or(u64::MAX);
        if spread_ms == 0 {
            return self.base;
        }
        self.base + Duration::from_millis(rng.gen_range(0..=spread_ms))
    }

    /// Draws a delay from the thread-local random source.
    pub fn sample_now(&self) -> Duration {
        self.sample(&mut rand::thread_rng())
    }
}

impl Default for Jitter {
    fn default() -> Self {
        Self::ZERO
    }
}

// ============================================================================
// Pacer
// ============================================================================

/// Something that can wait.
#[async_trait]
pub trait Pacer: Send + Sync {
    /// Waits for `duration`.
    async fn pause(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioPacer;

#[async_trait]
impl Pacer for TokioPacer {
    async fn pause(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

/// Returns immediately and remembers every requested pause.
#[derive(Debug, Default)]
pub struct InstantPacer {
    pauses: Mutex<Vec<Duration>>,
}

impl InstantPacer {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// All pauses requested so far.
    pub fn pauses(&self) -> Vec<Duration> {
        self.pauses.lock().map(|p| p.clone()).unwrap_or_default()
    }

    /// Sum of all pauses requested so far.
    pub fn total(&self) -> Duration {
        self.pauses().iter().sum()
    }
}

#[async_trait]
impl Pacer for InstantPacer {
    async fn pause(&self, duration: Duration) {
        if let Ok(mut pauses) = self.pauses.lock() {
            pauses.push(duration);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_fixed_jitter_is_constant() {
        let jitter = Jitter::fixed(Duration::from_millis(300));
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            assert_eq!(jitter.sample(&mut rng), Duration::from_millis(300));
        }
    }

    #[test]
    fn test_jitter_stays_in_bounds() {
        let jitter = Jitter::from_millis(500, 250);
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let d = jitter.sample(&mut rng);
            assert!(d >= Duration::from_millis(500));
            assert!(d <= jitter.upper_bound());
        }
    }

    #[test]
    fn test_zero_jitter() {
        assert_eq!(Jitter::ZERO.sample_now(), Duration::ZERO);
        assert_eq!(Jitter::default(), Jitter::ZERO);
    }

    #[tokio::test]
    async fn test_instant_pacer_records() {
        let pacer = InstantPacer::new();
        pacer.pause(Duration::from_millis(10)).await;
        pacer.pause(Duration::from_millis(15)).await;

        assert_eq!(pacer.pauses().len(), 2);
        assert_eq!(pacer.total(), Duration::from_millis(25));
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_pacer_sleeps() {
        let start = tokio::time::Instant::now();
        TokioPacer.pause(Duration::from_secs(2)).await;
        assert!(start.elapsed() >= Duration::from_secs(2));
    }
}

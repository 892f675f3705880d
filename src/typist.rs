use crate::layout::{COLS, ROWS};
use rand::rngs::ThreadRng;
use rand::Rng;
use std::time::Duration;

/// Autopilot that presses random keys at irregular intervals
pub struct GhostTypist {
    rng: ThreadRng,
    until_next: Duration,
}

impl Default for GhostTypist {
    fn default() -> Self {
        Self::new()
    }
}

impl GhostTypist {
    pub fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
            until_next: Duration::ZERO,
        }
    }

    /// Advance by `elapsed`; returns the key to press, if one is due.
    /// Gaps are drawn uniformly from half to one and a half times the mean.
    pub fn poll(&mut self, elapsed: Duration, mean_interval_ms: u64) -> Option<(u8, u8)> {
        if elapsed < self.until_next {
            self.until_next -= elapsed;
            return None;
        }
        let mean = mean_interval_ms.max(1);
        let gap = self.rng.gen_range(mean / 2..=mean + mean / 2);
        self.until_next = Duration::from_millis(gap);

        let row = self.rng.gen_range(0..ROWS);
        let col = self.rng.gen_range(0..COLS);
        Some((row, col))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_poll_presses() {
        let mut typist = GhostTypist::new();
        let (row, col) = typist.poll(Duration::ZERO, 200).unwrap();
        assert!(row < ROWS && col < COLS);
    }

    #[test]
    fn test_presses_are_spaced() {
        let mut typist = GhostTypist::new();
        typist.poll(Duration::ZERO, 200);
        // the next gap is at least half the mean
        assert!(typist.poll(Duration::from_millis(50), 200).is_none());
        assert!(typist.poll(Duration::from_millis(49), 200).is_none());

        let presses = (0..100)
            .filter(|_| typist.poll(Duration::from_millis(100), 200).is_some())
            .count();
        assert!((25..=100).contains(&presses), "{presses}");
    }
}

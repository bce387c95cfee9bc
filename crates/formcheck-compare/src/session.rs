//! Session aggregation

use formcheck_core::{FormcheckError, FormcheckResult, SessionStats};

/// Running similarity statistics for one session.
///
/// Only frames where both streams had a detection are recorded; frames
/// without a comparison are excluded rather than counted as 0.0.
#[derive(Debug, Clone, Default)]
pub struct SessionAggregator {
    count: u64,
    sum: f64,
    max: f64,
    min: f64,
}

impl SessionAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one score in O(1)
    pub fn record(&mut self, score: f64) {
        if self.count == 0 {
            self.max = score;
            self.min = score;
        } else {
            self.max = self.max.max(score);
            self.min = self.min.min(score);
        }
        self.sum += score;
        self.count += 1;
    }

    /// Number of recorded frames
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Running mean, if anything was recorded
    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }

    /// Produce the final statistics.
    ///
    /// Consumes the aggregator so the stats can never change afterwards.
    /// Fails with `EmptySession` when nothing was recorded, which callers
    /// must report differently from a perfect session.
    pub fn finalize(self) -> FormcheckResult<SessionStats> {
        if self.count == 0 {
            return Err(FormcheckError::EmptySession);
        }
        Ok(SessionStats {
            mean: self.sum / self.count as f64,
            max: self.max,
            min: self.min,
            count: self.count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_session() {
        assert_eq!(
            SessionAggregator::new().finalize(),
            Err(FormcheckError::EmptySession)
        );
    }

    #[test]
    fn test_summary() {
        let mut aggregator = SessionAggregator::new();
        for score in [0.9, 0.5, 0.7] {
            aggregator.record(score);
        }
        let stats = aggregator.finalize().unwrap();
        assert!((stats.mean - 0.7).abs() < 1e-12);
        assert_eq!(stats.max, 0.9);
        assert_eq!(stats.min, 0.5);
        assert_eq!(stats.count, 3);
    }

    #[test]
    fn test_single_negative_score() {
        let mut aggregator = SessionAggregator::new();
        aggregator.record(-0.25);
        let stats = aggregator.finalize().unwrap();
        assert_eq!(stats.max, -0.25);
        assert_eq!(stats.min, -0.25);
        assert_eq!(stats.mean, -0.25);
    }

    #[test]
    fn test_running_mean() {
        let mut aggregator = SessionAggregator::new();
        assert_eq!(aggregator.mean(), None);
        aggregator.record(1.0);
        aggregator.record(0.0);
        assert_eq!(aggregator.mean(), Some(0.5));
        assert_eq!(aggregator.count(), 2);
    }
}

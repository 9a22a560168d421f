//! Rolling z-score detector
//!
//! Priming takes [`PRIMING_SAMPLES`] samples: the window fills, then one more
//! sample slides it and the resulting window is the baseline. Classification
//! starts with the sample after that. Each new sample is compared against the mean and standard deviation of a moving window of
//! filtered values. A sample that deviates by more than `threshold` standard
//! deviations is a signal. Signal samples enter the window blended with the
//! previous filtered value (weight `influence`), so an ongoing event does not
//! drag the baseline along with it.

use libm::{fabsf, sqrtf};

use super::DetectionStrategy;
use crate::config::ZScoreParams;

/// Window length (lag) of the z-score detector
pub const ZSCORE_WINDOW: usize = 20;

/// Samples consumed before the first classification
pub const PRIMING_SAMPLES: usize = ZSCORE_WINDOW + 1;

#[derive(Debug, Clone)]
pub struct ZScoreDetector {
    params: ZScoreParams,
    /// Ring of filtered values; `next` is the oldest slot
    filtered: [f32; ZSCORE_WINDOW],
    next: usize,
    seen: usize,
    mean: f32,
    std_dev: f32,
    active: bool,
}

impl ZScoreDetector {
    pub fn new(params: ZScoreParams) -> Self {
        Self {
            params,
            filtered: [0.0; ZSCORE_WINDOW],
            next: 0,
            seen: 0,
            mean: 0.0,
            std_dev: 0.0,
            active: false,
        }
    }

    /// Returns true once the baseline is set
    pub fn is_primed(&self) -> bool {
        self.seen >= PRIMING_SAMPLES
    }

    pub fn mean(&self) -> f32 {
        self.mean
    }

    pub fn std_dev(&self) -> f32 {
        self.std_dev
    }

    /// Population mean and standard deviation of the filtered window
    fn refresh_stats(&mut self) {
        let n = ZSCORE_WINDOW as f32;
        let mean = self.filtered.iter().sum::<f32>() / n;
        let variance = self
            .filtered
            .iter()
            .map(|v| (v - mean) * (v - mean))
            .sum::<f32>()
            / n;
        self.mean = mean;
        self.std_dev = sqrtf(variance);
    }

    fn store(&mut self, value: f32) {
        self.filtered[self.next] = value;
        self.next = (self.next + 1) % ZSCORE_WINDOW;
    }
}

impl DetectionStrategy for ZScoreDetector {
    fn update(&mut self, sample: u16) -> bool {
        let value = sample as f32;

        if !self.is_primed() {
            self.store(value);
            self.seen += 1;
            if self.is_primed() {
                self.refresh_stats();
            }
            return false;
        }

        let signal = fabsf(value - self.mean) > self.params.threshold * self.std_dev;
        let stored = if signal {
            let newest = self.filtered[(self.next + ZSCORE_WINDOW - 1) % ZSCORE_WINDOW];
            self.params.influence * value + (1.0 - self.params.influence) * newest
        } else {
            value
        };
        self.store(stored);
        self.refresh_stats();

        self.active = signal;
        self.active
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn reset(&mut self) {
        *self = Self::new(self.params);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> ZScoreDetector {
        ZScoreDetector::new(ZScoreParams::default())
    }

    /// Baseline alternating between 1000 and 1002 (mean 1001, std 1)
    fn prime(d: &mut ZScoreDetector) {
        for i in 0..PRIMING_SAMPLES {
            assert!(!d.update(if i % 2 == 0 { 1000 } else { 1002 }));
        }
        assert!(d.is_primed());
    }

    #[test]
    fn test_priming_never_active() {
        let mut d = detector();
        for _ in 0..ZSCORE_WINDOW {
            assert!(!d.update(5000));
        }
        assert!(!d.is_primed());
    }

    #[test]
    fn test_sample_after_full_window_is_baseline() {
        let mut d = detector();
        for i in 0..ZSCORE_WINDOW {
            assert!(!d.update(if i % 2 == 0 { 1000 } else { 1002 }));
        }
        // Slides the window instead of being classified
        assert!(!d.update(900));
        assert!(d.is_primed());
        assert!(!d.is_active());
        assert!(d.mean() < 1000.0);

        let mut d = detector();
        prime(&mut d);
        assert!(d.update(900));
    }

    #[test]
    fn test_priming_stats() {
        let mut d = detector();
        prime(&mut d);
        assert!((d.mean() - 1001.0).abs() < 1e-3);
        assert!((d.std_dev() - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_large_dip_is_active() {
        let mut d = detector();
        prime(&mut d);
        assert!(d.update(900));
    }

    #[test]
    fn test_small_deviation_is_inactive() {
        let mut d = detector();
        prime(&mut d);
        assert!(!d.update(1004));
    }

    #[test]
    fn test_influence_limits_baseline_drift() {
        let mut d = detector();
        prime(&mut d);
        assert!(d.update(900));
        // Stored value is 0.5 * 900 + 0.5 * 1002, not 900
        assert!(d.mean() > 998.0);
    }

    #[test]
    fn test_returns_to_inactive() {
        let mut d = detector();
        prime(&mut d);
        assert!(d.update(900));
        assert!(!d.update(1001));
        assert!(!d.is_active());
    }
}

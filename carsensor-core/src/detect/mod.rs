//! Per-channel signal detection
//!
//! Turns the stream of raw conversions of one hall sensor into an
//! active/inactive classification. Two strategies exist behind
//! [`DetectionStrategy`]; the one to use is picked at construction time
//! through [`DetectorKind`].

pub mod rank_spread;
pub mod window;
pub mod zscore;

pub use rank_spread::{RankSpreadDetector, RANK_WINDOW};
pub use window::SignalWindow;
pub use zscore::{ZScoreDetector, PRIMING_SAMPLES, ZSCORE_WINDOW};

use crate::config::DetectorKind;

/// Classifier fed one raw sample per probe cycle
pub trait DetectionStrategy {
    /// Feed a sample and return the new classification
    fn update(&mut self, sample: u16) -> bool;

    /// Classification after the last update
    fn is_active(&self) -> bool;

    /// Forget all history
    fn reset(&mut self);
}

/// Detector of one sensor channel
#[derive(Debug, Clone)]
pub enum SensorDetector {
    RankSpread(RankSpreadDetector),
    ZScore(ZScoreDetector),
}

impl SensorDetector {
    /// Build a detector of the configured kind
    pub fn new(kind: DetectorKind) -> Self {
        match kind {
            DetectorKind::RankSpread(params) => {
                SensorDetector::RankSpread(RankSpreadDetector::new(params))
            }
            DetectorKind::ZScore(params) => SensorDetector::ZScore(ZScoreDetector::new(params)),
        }
    }
}

impl DetectionStrategy for SensorDetector {
    fn update(&mut self, sample: u16) -> bool {
        match self {
            SensorDetector::RankSpread(d) => d.update(sample),
            SensorDetector::ZScore(d) => d.update(sample),
        }
    }

    fn is_active(&self) -> bool {
        match self {
            SensorDetector::RankSpread(d) => d.is_active(),
            SensorDetector::ZScore(d) => d.is_active(),
        }
    }

    fn reset(&mut self) {
        match self {
            SensorDetector::RankSpread(d) => d.reset(),
            SensorDetector::ZScore(d) => d.reset(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RankSpreadParams, ZScoreParams};
    use proptest::prelude::*;

    fn kinds() -> [DetectorKind; 2] {
        [
            DetectorKind::RankSpread(RankSpreadParams::default()),
            DetectorKind::ZScore(ZScoreParams::default()),
        ]
    }

    #[test]
    fn test_kind_selects_strategy() {
        assert!(matches!(
            SensorDetector::new(kinds()[0]),
            SensorDetector::RankSpread(_)
        ));
        assert!(matches!(
            SensorDetector::new(kinds()[1]),
            SensorDetector::ZScore(_)
        ));
    }

    #[test]
    fn test_both_strategies_flag_a_sharp_dip() {
        for kind in kinds() {
            let mut d = SensorDetector::new(kind);
            for i in 0..40 {
                d.update(if i % 2 == 0 { 1000 } else { 1002 });
            }
            assert!(d.update(800), "{:?}", kind);
        }
    }

    proptest! {
        #[test]
        fn prop_constant_stream_never_active(value in any::<u16>(), len in 1usize..80) {
            for kind in kinds() {
                let mut d = SensorDetector::new(kind);
                for _ in 0..len {
                    prop_assert!(!d.update(value));
                }
                prop_assert!(!d.is_active());
            }
        }
    }
}

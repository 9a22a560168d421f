//! Rank/spread dip detector
//!
//! A magnet over a hall sensor pulls the sensed field down. The detector
//! looks for a pronounced low outlier: the window must show enough spread,
//! and nearly every entry must lie above the newest sample.

use super::window::SignalWindow;
use super::DetectionStrategy;
use crate::config::RankSpreadParams;

/// Window length of the rank/spread detector
pub const RANK_WINDOW: usize = 9;

#[derive(Debug, Clone)]
pub struct RankSpreadDetector {
    window: SignalWindow<RANK_WINDOW>,
    params: RankSpreadParams,
    active: bool,
}

impl RankSpreadDetector {
    pub fn new(params: RankSpreadParams) -> Self {
        Self {
            window: SignalWindow::new(),
            params,
            active: false,
        }
    }

    /// Classify `sample` against a window that already contains it
    fn classify(&self, sample: u16) -> bool {
        if !self.window.is_full() {
            return false;
        }
        let needed = RANK_WINDOW.saturating_sub(self.params.delta);
        self.window.spread() > self.params.spread_threshold
            && self.window.count_above(sample) >= needed
    }
}

impl DetectionStrategy for RankSpreadDetector {
    fn update(&mut self, sample: u16) -> bool {
        self.window.push(sample);
        self.active = self.classify(sample);
        self.active
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn reset(&mut self) {
        self.window.clear();
        self.active = false;
    }
}

//! Configuration type definitions
//!
//! Detector strategy selection and the timing budgets of the loops.

use embassy_time::Duration;

/// Parameters of the rank/spread dip detector
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RankSpreadParams {
    /// Minimum max-min spread of the window, in raw units
    pub spread_threshold: u16,
    /// Active when at least `window - delta` entries lie above the sample
    ///
    /// The comparison is inclusive. The heuristic is also described with a
    /// strict "more than `window - delta`", which with the defaults would need
    /// seven of nine entries above the sample. The inclusive form is kept so a
    /// sample that is the window minimum with exactly six higher entries
    /// still counts as a dip.
    pub delta: usize,
}

impl Default for RankSpreadParams {
    fn default() -> Self {
        Self {
            spread_threshold: 25,
            delta: 3,
        }
    }
}

/// Parameters of the rolling z-score detector
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ZScoreParams {
    /// Deviation, in standard deviations, that counts as a signal
    pub threshold: f32,
    /// Weight (0.0-1.0) a signal sample gets in the rolling statistics
    pub influence: f32,
}

impl Default for ZScoreParams {
    fn default() -> Self {
        Self {
            threshold: 7.5,
            influence: 0.5,
        }
    }
}

/// Detection strategy, chosen at construction time
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DetectorKind {
    RankSpread(RankSpreadParams),
    ZScore(ZScoreParams),
}

impl Default for DetectorKind {
    fn default() -> Self {
        DetectorKind::ZScore(ZScoreParams::default())
    }
}

/// Timing of the sample acquisition loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AcquisitionTiming {
    /// Pause between cycles without failures
    pub cycle_interval: Duration,
    /// Busy-flag polling interval while a conversion runs
    pub poll_interval: Duration,
    /// Budget for one conversion
    pub conversion_timeout: Duration,
    /// Pause before resetting converters after a failed cycle
    pub settle_delay: Duration,
}

impl Default for AcquisitionTiming {
    fn default() -> Self {
        Self {
            cycle_interval: Duration::from_millis(50),
            poll_interval: Duration::from_micros(50),
            conversion_timeout: Duration::from_millis(500),
            settle_delay: Duration::from_millis(200),
        }
    }
}

/// Timing of the register bridge and its links
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkTiming {
    /// Budget for handing an output request to the dispatcher
    pub forward_timeout: Duration,
    /// Budget for the decode stage to answer a read
    ///
    /// Must exceed `forward_timeout`: a read can queue behind a forward.
    pub reply_timeout: Duration,
    /// Pause before re-listening after a bus failure
    pub restart_backoff: Duration,
}

impl Default for LinkTiming {
    fn default() -> Self {
        Self {
            forward_timeout: Duration::from_millis(100),
            reply_timeout: Duration::from_millis(150),
            restart_backoff: Duration::from_secs(1),
        }
    }
}

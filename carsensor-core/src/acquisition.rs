//! Sample acquisition loop
//!
//! One cycle probes every channel in order: select input, start a single
//! conversion, poll the busy flag until done or the conversion budget runs
//! out, read the result and feed it to the channel's detector. A failing
//! channel is recorded and skipped; it never aborts the cycle.
//!
//! After a cycle with failures every converter is reset once the settle
//! delay has passed. Otherwise the loop sleeps the normal cycle interval.

use core::convert::Infallible;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::{Instant, Timer};
use heapless::Vec;

use crate::config::{
    AcquisitionTiming, DetectorKind, CHANNELS_PER_CONVERTER, MAX_CHANNELS, MAX_CONVERTERS,
};
use crate::detect::{DetectionStrategy, SensorDetector};
use crate::link::Rendezvous;
use crate::traits::AnalogConverter;

/// Why a single channel produced no sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProbeError {
    /// The converter rejected a bus operation
    Device,
    /// The conversion did not finish within its budget
    Timeout,
}

/// One physical sensor input
#[derive(Debug, Clone)]
pub struct SensorChannel {
    converter: usize,
    input: u8,
    detector: SensorDetector,
}

impl SensorChannel {
    /// Index of the converter this channel is wired to
    pub fn converter(&self) -> usize {
        self.converter
    }

    /// Input number on that converter
    pub fn input(&self) -> u8 {
        self.input
    }

    pub fn is_active(&self) -> bool {
        self.detector.is_active()
    }
}

/// Outcome of one acquisition cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CycleReport {
    /// Bit N set while channel N is active
    pub status: u8,
    /// Number of active channels
    pub active: u8,
    /// Bit N set if channel N failed this cycle
    pub failures: u8,
    /// Bit N set if channel N changed state this cycle
    pub transitions: u8,
    /// Raw sample of each channel, `None` on failure
    pub samples: [Option<u16>; MAX_CHANNELS],
}

impl CycleReport {
    pub fn has_failures(&self) -> bool {
        self.failures != 0
    }

    pub fn failure_count(&self) -> u32 {
        self.failures.count_ones()
    }

    /// True while `channel` is active
    pub fn is_active(&self, channel: u8) -> bool {
        self.status & (1 << channel) != 0
    }

    /// Channels that changed state this cycle, with their new state and sample
    pub fn changes(&self) -> impl Iterator<Item = (u8, bool, Option<u16>)> + '_ {
        (0..MAX_CHANNELS as u8)
            .filter(|&channel| self.transitions & (1 << channel) != 0)
            .map(|channel| (channel, self.is_active(channel), self.samples[channel as usize]))
    }
}

/// Owns the converters and the per-channel detectors
pub struct Acquisition<C> {
    converters: Vec<C, MAX_CONVERTERS>,
    channels: Vec<SensorChannel, MAX_CHANNELS>,
    timing: AcquisitionTiming,
}

impl<C: AnalogConverter> Acquisition<C> {
    /// Create channels for every input of every converter
    ///
    /// Channel numbers run converter by converter: inputs 0-3 of the first
    /// converter are channels 0-3, and so on.
    pub fn new(
        converters: Vec<C, MAX_CONVERTERS>,
        detector: DetectorKind,
        timing: AcquisitionTiming,
    ) -> Self {
        let mut channels = Vec::new();
        for converter in 0..converters.len() {
            for input in 0..CHANNELS_PER_CONVERTER {
                // MAX_CHANNELS = MAX_CONVERTERS * CHANNELS_PER_CONVERTER
                let _ = channels.push(SensorChannel {
                    converter,
                    input,
                    detector: SensorDetector::new(detector),
                });
            }
        }
        Self {
            converters,
            channels,
            timing,
        }
    }

    pub fn converter_count(&self) -> u8 {
        self.converters.len() as u8
    }

    pub fn channel_count(&self) -> u8 {
        self.channels.len() as u8
    }

    pub fn channels(&self) -> &[SensorChannel] {
        &self.channels
    }

    pub fn timing(&self) -> &AcquisitionTiming {
        &self.timing
    }

    /// Run one conversion on channel `index` and return the raw value
    pub async fn sample(&mut self, index: usize) -> Result<u16, ProbeError> {
        let channel = self.channels.get(index).ok_or(ProbeError::Device)?;
        let converter = self
            .converters
            .get_mut(channel.converter)
            .ok_or(ProbeError::Device)?;

        converter
            .select_channel(channel.input)
            .await
            .map_err(|_| ProbeError::Device)?;
        converter
            .start_conversion()
            .await
            .map_err(|_| ProbeError::Device)?;

        let start = Instant::now();
        while converter.is_busy().await.map_err(|_| ProbeError::Device)? {
            if start.elapsed() >= self.timing.conversion_timeout {
                return Err(ProbeError::Timeout);
            }
            Timer::after(self.timing.poll_interval).await;
        }

        converter.read_raw().await.map_err(|_| ProbeError::Device)
    }

    /// Probe every channel once
    ///
    /// A failed channel keeps its previous classification.
    pub async fn run_cycle(&mut self) -> CycleReport {
        let mut report = CycleReport::default();

        for index in 0..self.channels.len() {
            let bit = 1u8 << index;
            match self.sample(index).await {
                Ok(raw) => {
                    let detector = &mut self.channels[index].detector;
                    let was_active = detector.is_active();
                    if detector.update(raw) != was_active {
                        report.transitions |= bit;
                    }
                    report.samples[index] = Some(raw);
                }
                Err(_err) => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("Channel {} probe failed: {}", index, _err);
                    report.failures |= bit;
                }
            }
            if self.channels[index].is_active() {
                report.status |= bit;
                report.active += 1;
            }
        }

        report
    }

    /// Reset every converter to its baseline configuration
    ///
    /// Returns the number of converters that failed to reset.
    pub async fn reset_converters(&mut self) -> u8 {
        let mut failed = 0;
        for converter in self.converters.iter_mut() {
            if converter.reset().await.is_err() {
                #[cfg(feature = "defmt")]
                defmt::warn!("Converter {=u8:#04x} failed to reset", converter.address());
                failed += 1;
            }
        }
        failed
    }

    /// Let the bus settle, then reset every converter
    pub async fn recover(&mut self) -> u8 {
        Timer::after(self.timing.settle_delay).await;
        self.reset_converters().await
    }

    /// Pause after a cycle: recover from failures or wait the normal interval
    pub async fn finish_cycle(&mut self, report: &CycleReport) {
        if report.has_failures() {
            self.recover().await;
        } else {
            Timer::after(self.timing.cycle_interval).await;
        }
    }

    /// Acquire forever, handing each status byte to the register bridge
    ///
    /// `on_cycle` sees every report after the bridge accepted its status.
    pub async fn run<M, F>(&mut self, status: &Rendezvous<M, u8>, mut on_cycle: F) -> Infallible
    where
        M: RawMutex,
        F: FnMut(&CycleReport),
    {
        loop {
            let report = self.run_cycle().await;
            status.send(report.status).await;
            on_cycle(&report);
            self.finish_cycle(&report).await;
        }
    }
}

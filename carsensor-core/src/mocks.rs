//! Host-side stand-ins for hardware, used by unit tests

use carsensor_hal::{ActuatorPin, I2cTarget, InputPin, TargetEvent};
use carsensor_protocol::RAW_EVENT_BUF;
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::channel::Channel;
use heapless::Vec;

use crate::traits::{AnalogConverter, OutputExpander, ProbeDevice};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockBusError;

pub struct MockStrap {
    pub high: bool,
}

impl InputPin for MockStrap {
    fn is_high(&self) -> bool {
        self.high
    }
}

/// Converter returning a fixed value per input
#[derive(Debug, Clone)]
pub struct MockConverter {
    pub address: u8,
    pub values: [u16; 4],
    /// Busy polls before a conversion completes
    pub busy_polls: u32,
    /// Conversion never completes
    pub stuck: bool,
    /// Every bus operation fails
    pub fail_bus: bool,
    pub selected: u8,
    pub conversions: u32,
    pub resets: u32,
    remaining: u32,
}

impl MockConverter {
    pub fn new(address: u8) -> Self {
        Self {
            address,
            values: [1000; 4],
            busy_polls: 0,
            stuck: false,
            fail_bus: false,
            selected: 0,
            conversions: 0,
            resets: 0,
            remaining: 0,
        }
    }

    fn check(&self) -> Result<(), MockBusError> {
        if self.fail_bus {
            Err(MockBusError)
        } else {
            Ok(())
        }
    }
}

impl ProbeDevice for MockConverter {
    type Error = MockBusError;

    fn address(&self) -> u8 {
        self.address
    }

    async fn reset(&mut self) -> Result<(), MockBusError> {
        self.check()?;
        self.resets += 1;
        self.selected = 0;
        Ok(())
    }
}

impl AnalogConverter for MockConverter {
    async fn select_channel(&mut self, channel: u8) -> Result<(), MockBusError> {
        self.check()?;
        self.selected = channel;
        Ok(())
    }

    async fn start_conversion(&mut self) -> Result<(), MockBusError> {
        self.check()?;
        self.conversions += 1;
        self.remaining = self.busy_polls;
        Ok(())
    }

    async fn is_busy(&mut self) -> Result<bool, MockBusError> {
        self.check()?;
        if self.stuck {
            return Ok(true);
        }
        if self.remaining > 0 {
            self.remaining -= 1;
            return Ok(true);
        }
        Ok(false)
    }

    async fn read_raw(&mut self) -> Result<u16, MockBusError> {
        self.check()?;
        Ok(self.values[self.selected as usize % 4])
    }
}

/// Expander recording every byte written
#[derive(Debug, Clone)]
pub struct MockExpander {
    pub address: u8,
    /// Answers on the bus
    pub present: bool,
    pub fail_writes: bool,
    pub writes: Vec<u8, 16>,
}

impl MockExpander {
    pub fn new(address: u8) -> Self {
        Self {
            address,
            present: true,
            fail_writes: false,
            writes: Vec::new(),
        }
    }
}

impl ProbeDevice for MockExpander {
    type Error = MockBusError;

    fn address(&self) -> u8 {
        self.address
    }

    async fn reset(&mut self) -> Result<(), MockBusError> {
        self.write_bits(0).await
    }
}

impl OutputExpander for MockExpander {
    async fn write_bits(&mut self, value: u8) -> Result<(), MockBusError> {
        if !self.present || self.fail_writes {
            return Err(MockBusError);
        }
        self.writes.push(value).map_err(|_| MockBusError)
    }
}

/// Actuator pin remembering its last level and compare value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MockPin {
    pub high: bool,
    pub compare: Option<u16>,
    /// Number of digital level writes
    pub writes: u32,
}

impl ActuatorPin for MockPin {
    fn set_level(&mut self, high: bool) {
        self.high = high;
        self.writes += 1;
    }

    fn set_compare(&mut self, compare: u16) {
        self.compare = Some(compare);
        self.high = false;
    }
}

pub type ScriptedEvent = Result<(TargetEvent, Vec<u8, RAW_EVENT_BUF>), MockBusError>;

/// Events the mock host will produce, in order
pub type Script = Channel<NoopRawMutex, ScriptedEvent, 8>;

/// Bytes the target put on the wire for each Request
pub type ReplyLog = Channel<NoopRawMutex, Vec<u8, 2>, 4>;

/// Target peripheral driven by a script
pub struct MockTarget<'a> {
    script: &'a Script,
    replies: &'a ReplyLog,
    pub fail_listen: bool,
    pub listens: u32,
}

impl<'a> MockTarget<'a> {
    pub fn new(script: &'a Script, replies: &'a ReplyLog) -> Self {
        Self {
            script,
            replies,
            fail_listen: false,
            listens: 0,
        }
    }

    pub fn receive(payload: &[u8]) -> ScriptedEvent {
        Ok((
            TargetEvent::Receive,
            Vec::from_slice(payload).map_err(|_| MockBusError)?,
        ))
    }

    pub fn event(kind: TargetEvent) -> ScriptedEvent {
        Ok((kind, Vec::new()))
    }
}

impl I2cTarget for MockTarget<'_> {
    type Error = MockBusError;

    fn address(&self) -> u8 {
        0x34
    }

    async fn listen(&mut self) -> Result<(), MockBusError> {
        if self.fail_listen {
            return Err(MockBusError);
        }
        self.listens += 1;
        Ok(())
    }

    async fn wait_for_event(
        &mut self,
        buf: &mut [u8],
    ) -> Result<(TargetEvent, usize), MockBusError> {
        let (kind, payload) = self.script.receive().await?;
        let len = payload.len().min(buf.len());
        buf[..len].copy_from_slice(&payload[..len]);
        Ok((kind, len))
    }

    async fn reply(&mut self, data: &[u8]) -> Result<(), MockBusError> {
        let bytes = Vec::from_slice(data).map_err(|_| MockBusError)?;
        self.replies.try_send(bytes).map_err(|_| MockBusError)
    }
}

//! Register semantics
//!
//! [`RegisterBridge`] is a pure state machine: it takes decoded bus events,
//! mutates [`ResponseState`], drives the local actuator pins and tells the
//! caller what to do next. It never touches the bus itself.

use carsensor_hal::pwm::compare_for_duty;
use carsensor_hal::ActuatorPin;
use carsensor_protocol::{BusEvent, Register, Reply};

use crate::config::{AddressKind, BoardDescription, ACTUATOR_PINS};
use crate::dispatch::OutputRequest;

/// Static facts the register map reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BridgeContext {
    pub version: [u8; 3],
    /// Sensor channels in use (0-8)
    pub sensor_channels: u8,
    /// Remote output bits, 8 per detected expander
    pub output_bits: u8,
    /// Address the board answers on
    pub address: AddressKind,
    pub strap_pin: u8,
    /// Bit N set when pin N may enter PWM mode
    pub pwm_capable: u8,
    /// PWM counter top for the actuation period
    pub pwm_top: u16,
}

impl BridgeContext {
    pub fn new(
        board: &BoardDescription,
        address: AddressKind,
        converters: usize,
        expanders: usize,
        pwm_top: u16,
    ) -> Self {
        let channels = converters * crate::config::CHANNELS_PER_CONVERTER as usize;
        Self {
            version: board.version,
            sensor_channels: channels.min(crate::config::MAX_CHANNELS) as u8,
            output_bits: (expanders.min(crate::config::MAX_EXPANDERS) * 8) as u8,
            address,
            strap_pin: board.strap_pin,
            pwm_capable: board.pwm_capable,
            pwm_top,
        }
    }

    /// Returns true if writes must not drive `pin`
    ///
    /// At the alternate address the strap pin is being held low externally.
    pub fn is_gated(&self, pin: u8) -> bool {
        pin == self.strap_pin && self.address == AddressKind::Alternate
    }

    pub fn supports_pwm(&self, pin: u8) -> bool {
        (pin as usize) < ACTUATOR_PINS && self.pwm_capable & (1 << pin) != 0
    }
}

/// Mutable state behind the readable registers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseState {
    sticky: u8,
    last_raw: u8,
    pwm_duty: [Option<u8>; ACTUATOR_PINS],
}

impl ResponseState {
    pub const fn new() -> Self {
        Self {
            sticky: 0,
            last_raw: 0,
            pwm_duty: [None; ACTUATOR_PINS],
        }
    }

    /// Fold a raw status byte into the sticky byte
    ///
    /// Returns true if the raw status differs from the previous one.
    pub fn observe_status(&mut self, raw: u8) -> bool {
        let changed = raw != self.last_raw;
        self.last_raw = raw;
        self.sticky |= raw;
        changed
    }

    /// Read the sticky byte and rearm it with the live status
    pub fn take_sticky(&mut self) -> u8 {
        let value = self.sticky;
        self.sticky = self.last_raw;
        value
    }

    pub fn sticky(&self) -> u8 {
        self.sticky
    }

    pub fn last_raw(&self) -> u8 {
        self.last_raw
    }

    pub fn is_pwm(&self, pin: u8) -> bool {
        self.duty(pin).is_some()
    }

    /// Last duty written to `pin`, `None` while in digital mode
    pub fn duty(&self, pin: u8) -> Option<u8> {
        self.pwm_duty.get(pin as usize).copied().flatten()
    }

    fn set_duty(&mut self, pin: u8, duty: u8) {
        if let Some(slot) = self.pwm_duty.get_mut(pin as usize) {
            *slot = Some(duty);
        }
    }
}

/// What the decode stage has to do after an event
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    /// Nothing further
    Idle,
    /// Write to a register that does not accept writes
    Ignored(u8),
    /// Answer the pending read
    Reply(Reply),
    /// Hand a write to the output dispatcher
    Forward(OutputRequest),
}

/// Filters bus traffic down to what is worth a log line
///
/// Hosts poll the same register over and over; only changes are reported.
#[derive(Debug, Clone, Default)]
pub struct EventTrace {
    last: Option<BusEvent>,
}

impl EventTrace {
    pub const fn new() -> Self {
        Self { last: None }
    }

    /// Returns true if `event` differs from the last reported one
    pub fn is_new(&mut self, event: &BusEvent) -> bool {
        if *event == BusEvent::Finish || self.last.as_ref() == Some(event) {
            return false;
        }
        self.last = Some(*event);
        true
    }
}

/// Register map state machine
pub struct RegisterBridge<P> {
    ctx: BridgeContext,
    state: ResponseState,
    pins: [P; ACTUATOR_PINS],
}

impl<P: ActuatorPin> RegisterBridge<P> {
    pub fn new(ctx: BridgeContext, pins: [P; ACTUATOR_PINS]) -> Self {
        Self {
            ctx,
            state: ResponseState::new(),
            pins,
        }
    }

    pub fn context(&self) -> &BridgeContext {
        &self.ctx
    }

    pub fn state(&self) -> &ResponseState {
        &self.state
    }

    pub fn pins(&self) -> &[P; ACTUATOR_PINS] {
        &self.pins
    }

    /// Accept a status byte from acquisition
    pub fn observe_status(&mut self, raw: u8) -> bool {
        self.state.observe_status(raw)
    }

    /// Apply one bus event
    pub fn handle(&mut self, event: BusEvent) -> Outcome {
        match event {
            BusEvent::Receive {
                register: Some(register),
                value: Some(value),
            } => self.write(Register::from_addr(register), value),
            // Address-only writes just select the register for a later read
            BusEvent::Receive { .. } | BusEvent::Finish => Outcome::Idle,
            BusEvent::Request { register } => {
                Outcome::Reply(self.read(Register::from_addr(register)))
            }
        }
    }

    fn read(&mut self, register: Register) -> Reply {
        match register {
            Register::VersionMajor => Reply::byte(self.ctx.version[0]),
            Register::VersionMinor => Reply::byte(self.ctx.version[1]),
            Register::VersionPatch => Reply::byte(self.ctx.version[2]),
            Register::SensorCount => Reply::byte(self.ctx.sensor_channels),
            Register::OutputCount => Reply::byte(self.ctx.output_bits),
            Register::SensorState => Reply::byte(self.state.take_sticky()),
            _ => Reply::sentinel(),
        }
    }

    fn write(&mut self, register: Register, value: u8) -> Outcome {
        match register {
            Register::LocalOutput => {
                self.write_local(value);
                Outcome::Idle
            }
            Register::RemoteOutput(device) => Outcome::Forward(OutputRequest { device, value }),
            Register::PwmDuty(pin) => {
                if self.write_duty(pin, value) {
                    Outcome::Idle
                } else {
                    Outcome::Ignored(register.addr())
                }
            }
            other => Outcome::Ignored(other.addr()),
        }
    }

    fn write_local(&mut self, value: u8) {
        for (pin, output) in self.pins.iter_mut().enumerate() {
            let pin = pin as u8;
            if self.state.is_pwm(pin) || self.ctx.is_gated(pin) {
                continue;
            }
            output.set_level(value & (1 << pin) != 0);
        }
    }

    /// Switch `pin` to PWM with `duty`; false if the pin cannot do PWM
    fn write_duty(&mut self, pin: u8, duty: u8) -> bool {
        if !self.ctx.supports_pwm(pin) || self.ctx.is_gated(pin) {
            return false;
        }
        self.state.set_duty(pin, duty);
        self.pins[pin as usize].set_compare(compare_for_duty(self.ctx.pwm_top, duty));
        true
    }
}

//! Actuator and strap pins
//!
//! Switched pins follow the board's open-drain-like convention: a high level
//! drives the pin, a low level releases it to a pull-down. Pins wired to a
//! PWM slice are driven fully on or fully off while in digital mode.

use carsensor_hal::{ActuatorPin, InputPin};
use embassy_rp::gpio::{Flex, Pin, Pull};
use embassy_rp::pwm::PwmOutput;
use embassy_rp::Peri;
use embedded_hal::pwm::SetDutyCycle;

/// One host-driven actuator output
pub enum IoPin<'d> {
    /// Plain GPIO under SIO control
    Switched(Flex<'d>),
    /// Output of a PWM slice channel
    Modulated(PwmOutput<'d>),
}

impl<'d> IoPin<'d> {
    /// Switched pin, released low
    pub fn switched(pin: Peri<'d, impl Pin>) -> Self {
        let mut flex = Flex::new(pin);
        release(&mut flex);
        IoPin::Switched(flex)
    }

    /// PWM-capable pin, held fully off
    pub fn modulated(mut output: PwmOutput<'d>) -> Self {
        let _ = output.set_duty_cycle_fully_off();
        IoPin::Modulated(output)
    }
}

fn release(flex: &mut Flex<'_>) {
    flex.set_as_input();
    flex.set_pull(Pull::Down);
}

impl ActuatorPin for IoPin<'_> {
    fn set_level(&mut self, high: bool) {
        match self {
            IoPin::Switched(flex) if high => {
                flex.set_high();
                flex.set_as_output();
            }
            IoPin::Switched(flex) => release(flex),
            IoPin::Modulated(output) => {
                let result = if high {
                    output.set_duty_cycle_fully_on()
                } else {
                    output.set_duty_cycle_fully_off()
                };
                if result.is_err() {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("PWM level rejected");
                }
            }
        }
    }

    fn set_compare(&mut self, compare: u16) {
        match self {
            IoPin::Modulated(output) => {
                if output.set_duty_cycle(compare).is_err() {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("PWM compare {} rejected", compare);
                }
            }
            IoPin::Switched(_flex) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("PWM compare on a switched pin ignored");
            }
        }
    }
}

/// Pulled-up input used to sample the address strap at boot
///
/// Borrow the pin with `Peri::reborrow` so it can be handed to the actuator
/// bank once the strap has been read.
pub struct StrapInput<'d> {
    pin: Flex<'d>,
}

impl<'d> StrapInput<'d> {
    pub fn new(pin: Peri<'d, impl Pin>) -> Self {
        let mut pin = Flex::new(pin);
        pin.set_as_input();
        pin.set_pull(Pull::Up);
        Self { pin }
    }
}

impl InputPin for StrapInput<'_> {
    fn is_high(&self) -> bool {
        self.pin.is_high()
    }
}

//! Board pin assignment
//!
//! | Signal                         | GPIO           |
//! |--------------------------------|----------------|
//! | IO0 (strap), IO1, IO2, IO3     | 29, 28, 27, 26 |
//! | IO4, IO5, IO6, IO7             | 15, 14, 13, 12 |
//! | LED red, green, yellow (low on) | 6, 7, 10      |
//! | WS2812 indicator (PIO0)        | 16             |
//! | Device bus I2C0 SDA, SCL       | 0, 1           |
//! | Host bus I2C1 SDA, SCL         | 2, 3           |
//!
//! IO1..IO5 have their own PWM slice outputs (slice 6A, 5B, 5A, 7B, 7A).
//! IO6 and IO7 would share slice 6 with IO1 and stay digital.

use carsensor_core::config::{AddressKind, ACTUATOR_PINS};
use carsensor_hal::PwmTiming;
use carsensor_hal_rp2040::pwm::slice_config;
use carsensor_hal_rp2040::{IoPin, StrapInput};
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::{
    PIN_10, PIN_12, PIN_13, PIN_14, PIN_15, PIN_26, PIN_27, PIN_28, PIN_29, PIN_6, PIN_7,
    PWM_SLICE5, PWM_SLICE6, PWM_SLICE7,
};
use embassy_rp::pwm::Pwm;
use embassy_rp::Peri;

/// The eight actuator pins, in register bit order
pub struct IoPins {
    pub io0: Peri<'static, PIN_29>,
    pub io1: Peri<'static, PIN_28>,
    pub io2: Peri<'static, PIN_27>,
    pub io3: Peri<'static, PIN_26>,
    pub io4: Peri<'static, PIN_15>,
    pub io5: Peri<'static, PIN_14>,
    pub io6: Peri<'static, PIN_13>,
    pub io7: Peri<'static, PIN_12>,
}

/// PWM slices serving IO1..IO5
pub struct PwmSlices {
    pub slice5: Peri<'static, PWM_SLICE5>,
    pub slice6: Peri<'static, PWM_SLICE6>,
    pub slice7: Peri<'static, PWM_SLICE7>,
}

impl IoPins {
    /// Every IO pin as a pulled-up input, IO0 first
    ///
    /// The inputs borrow the pins; dropping them returns the pins to reset
    /// state for [`IoPins::into_actuators`].
    pub fn boot_inputs(&mut self) -> [StrapInput<'_>; ACTUATOR_PINS] {
        [
            StrapInput::new(self.io0.reborrow()),
            StrapInput::new(self.io1.reborrow()),
            StrapInput::new(self.io2.reborrow()),
            StrapInput::new(self.io3.reborrow()),
            StrapInput::new(self.io4.reborrow()),
            StrapInput::new(self.io5.reborrow()),
            StrapInput::new(self.io6.reborrow()),
            StrapInput::new(self.io7.reborrow()),
        ]
    }

    /// Build the actuator bank, IO1..IO5 on PWM slices
    ///
    /// Returns `None` if a slice does not hand out the expected channel.
    pub fn into_actuators(
        self,
        slices: PwmSlices,
        timing: PwmTiming,
    ) -> Option<[IoPin<'static>; ACTUATOR_PINS]> {
        let (io1, _) = Pwm::new_output_a(slices.slice6, self.io1, slice_config(timing)).split();
        let (io3, io2) =
            Pwm::new_output_ab(slices.slice5, self.io3, self.io2, slice_config(timing)).split();
        let (io5, io4) =
            Pwm::new_output_ab(slices.slice7, self.io5, self.io4, slice_config(timing)).split();

        Some([
            IoPin::switched(self.io0),
            IoPin::modulated(io1?),
            IoPin::modulated(io2?),
            IoPin::modulated(io3?),
            IoPin::modulated(io4?),
            IoPin::modulated(io5?),
            IoPin::switched(self.io6),
            IoPin::switched(self.io7),
        ])
    }
}

/// Front panel LEDs (active low)
pub struct StatusLeds {
    red: Output<'static>,
    green: Output<'static>,
    yellow: Output<'static>,
}

impl StatusLeds {
    /// Boot pattern: red and yellow on
    pub fn boot(
        red: Peri<'static, PIN_6>,
        green: Peri<'static, PIN_7>,
        yellow: Peri<'static, PIN_10>,
    ) -> Self {
        Self {
            red: Output::new(red, Level::Low),
            green: Output::new(green, Level::High),
            yellow: Output::new(yellow, Level::Low),
        }
    }

    /// Running pattern: green on, yellow marks the alternate address
    pub fn running(&mut self, address: AddressKind) {
        self.red.set_high();
        self.green.set_low();
        self.yellow
            .set_level(Level::from(address != AddressKind::Alternate));
    }
}

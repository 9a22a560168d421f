//! Binky car sensor firmware
//!
//! RP2040 board that watches up to eight hall-effect sensor channels on
//! ADS1115 converters and serves their state, together with local actuator
//! pins and PCF8574 expander outputs, to a host as an I2C register map.

#![no_std]
#![no_main]

use defmt::*;
use embassy_embedded_hal::shared_bus::asynch::i2c::I2cDevice;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::dma::InterruptHandler as DmaInterruptHandler;
use embassy_rp::i2c::{self, I2c, InterruptHandler as I2cInterruptHandler};
use embassy_rp::i2c_slave::I2cSlave;
use embassy_rp::peripherals::{DMA_CH0, I2C0, I2C1, PIO0};
use embassy_rp::pio::{InterruptHandler as PioInterruptHandler, Pio};
use embassy_rp::pio_programs::ws2812::{PioWs2812, PioWs2812Program};
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::Timer;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use carsensor_core::acquisition::Acquisition;
use carsensor_core::bridge::{BridgeContext, RegisterBridge};
use carsensor_core::config::{MAX_CONVERTERS, MAX_EXPANDERS};
use carsensor_core::discovery::{classify_converters, discover};
use carsensor_core::dispatch::OutputDispatcher;
use carsensor_core::status::StatusCategory;
use carsensor_drivers::{Ads1115, Pcf8574};
use carsensor_hal::pwm::ACTUATION_HZ;
use carsensor_hal::I2cConfig;
use carsensor_hal_rp2040::pwm::actuation_timing;
use carsensor_hal_rp2040::{target_config, HostTarget};
use carsensor_protocol::FIRMWARE_VERSION;

use crate::board::{IoPins, PwmSlices, StatusLeds};
use crate::channels::STATUS;
use crate::tasks::{Converter, DeviceBus, Expander};

mod board;
mod channels;
mod config;
mod indicator;
mod tasks;

bind_interrupts!(struct Irqs {
    I2C0_IRQ => I2cInterruptHandler<I2C0>;
    I2C1_IRQ => I2cInterruptHandler<I2C1>;
    PIO0_IRQ_0 => PioInterruptHandler<PIO0>;
    DMA_IRQ_0 => DmaInterruptHandler<DMA_CH0>;
});

// Device bus shared by the acquisition and dispatch tasks
static DEVICE_BUS: StaticCell<Mutex<NoopRawMutex, DeviceBus>> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Car sensor firmware {} starting...", FIRMWARE_VERSION);

    let p = embassy_rp::init(Default::default());
    let board = config::board();

    let mut leds = StatusLeds::boot(p.PIN_6, p.PIN_7, p.PIN_10);

    // Indicator first, so the boot colour shows during the boot delay
    let Pio {
        mut common, sm0, ..
    } = Pio::new(p.PIO0, Irqs);
    let program = PioWs2812Program::new(&mut common);
    let indicator = PioWs2812::new(&mut common, sm0, p.DMA_CH0, Irqs, p.PIN_16, &program);
    STATUS.signal(StatusCategory::Boot);
    spawner.spawn(unwrap!(tasks::indicator_task(indicator)));

    // Strap sensing: all IO pins float high until the boot delay is over
    let mut io = IoPins {
        io0: p.PIN_29,
        io1: p.PIN_28,
        io2: p.PIN_27,
        io3: p.PIN_26,
        io4: p.PIN_15,
        io5: p.PIN_14,
        io6: p.PIN_13,
        io7: p.PIN_12,
    };
    let address = {
        let inputs = io.boot_inputs();
        Timer::after(config::BOOT_DELAY).await;
        board.sample_strap(&inputs[usize::from(board.strap_pin)])
    };
    let host_address = board.address(address);
    info!("Host bus address {=u8:#04x} ({})", host_address, address);

    // Device bus (controller role)
    let mut bus_config = i2c::Config::default();
    bus_config.frequency = I2cConfig::STANDARD.frequency;
    let bus = I2c::new_async(p.I2C0, p.PIN_1, p.PIN_0, Irqs, bus_config);
    let bus: &'static Mutex<NoopRawMutex, DeviceBus> = DEVICE_BUS.init(Mutex::new(bus));

    // Converters are required; keep probing until a usable count answers
    let converters = loop {
        let found = discover::<Converter, _, MAX_CONVERTERS>(
            board
                .converter_candidates
                .iter()
                .map(|&addr| Ads1115::new(I2cDevice::new(bus), addr)),
        )
        .await;
        match classify_converters(found.found, MAX_CONVERTERS) {
            Ok(()) => break found.devices,
            Err(status) => {
                warn!("{} converters found, retrying", found.found);
                STATUS.signal(status);
                Timer::after(config::DEVICE_RETRY_DELAY).await;
            }
        }
    };
    info!("{} converters in use", converters.len());

    // Expanders are optional; one pass
    let expanders = discover::<Expander, _, MAX_EXPANDERS>(
        board
            .expander_candidates
            .iter()
            .map(|&addr| Pcf8574::new(I2cDevice::new(bus), addr)),
    )
    .await;
    info!("{} expanders found", expanders.devices.len());

    // Actuator pins
    let Some(timing) = actuation_timing() else {
        error!("No PWM divider reaches {} Hz", ACTUATION_HZ);
        STATUS.signal(StatusCategory::ConfigError);
        return;
    };
    let slices = PwmSlices {
        slice5: p.PWM_SLICE5,
        slice6: p.PWM_SLICE6,
        slice7: p.PWM_SLICE7,
    };
    let Some(actuators) = io.into_actuators(slices, timing) else {
        error!("PWM slice setup failed");
        STATUS.signal(StatusCategory::ConfigError);
        return;
    };
    debug!("PWM divider {}, top {}", timing.divider, timing.top);

    // Host bus (target role)
    let host_bus = I2cSlave::new(
        p.I2C1,
        p.PIN_3,
        p.PIN_2,
        Irqs,
        target_config(host_address),
    );
    let target = HostTarget::new(host_bus, host_address);

    let context = BridgeContext::new(
        &board,
        address,
        converters.len(),
        expanders.devices.len(),
        timing.top,
    );
    let bridge = RegisterBridge::new(context, actuators);
    let converter_count = converters.len() as u8;
    let acquisition = Acquisition::new(converters, config::DETECTOR, config::acquisition_timing());
    let dispatcher = OutputDispatcher::new(expanders.devices);

    leds.running(address);
    STATUS.signal(StatusCategory::Nominal {
        converters: converter_count,
        active: 0,
    });

    // Spawn tasks
    spawner.spawn(unwrap!(tasks::dispatch_task(dispatcher)));
    spawner.spawn(unwrap!(tasks::bridge_task(
        target,
        bridge,
        config::link_timing()
    )));
    spawner.spawn(unwrap!(tasks::acquisition_task(acquisition)));

    info!("All tasks spawned, firmware running");

    // Main task keeps the LEDs and the PIO block alive
    loop {
        Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}

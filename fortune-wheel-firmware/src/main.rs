use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::{PinDriver, Pull};
use esp_idf_hal::prelude::*;
use fortune_wheel_lib::{Clock, Level, SystemClock, WheelConfig, WheelController};
use log::{info, warn, LevelFilter};

mod leds;
mod rng;
mod watchdog;

use leds::LedChain;
use rng::HardwareRng;
use watchdog::WatchdogHandle;

// Pins: wheel data on GPIO 13, indicator data on GPIO 14,
// trigger button on GPIO 27 (switches to GND, internal pull-up).

const INDICATOR_LEDS: usize = 1;

/// RMT memory blocks for the 512-LED wheel chain
const WHEEL_RMT_MEM_BLOCKS: u8 = 4;
const INDICATOR_RMT_MEM_BLOCKS: u8 = 1;

/// Control loop period
const TICK_MS: u32 = 10;

const LOG_LEVEL: LevelFilter = LevelFilter::Info;

fn main() -> Result<()> {
    // It is necessary to call this function once. Otherwise some patches to the runtime
    // implemented by esp-idf-sys might not link properly. See https://github.com/esp-rs/esp-idf-template/issues/71
    esp_idf_svc::sys::link_patches();

    // Bind the log crate to the ESP Logging facilities
    esp_idf_svc::log::EspLogger::initialize_default();
    if let Err(e) = esp_idf_svc::log::set_target_level("*", LOG_LEVEL) {
        warn!("Failed to set log level: {e}");
    }

    info!("Starting fortune wheel firmware {}...", env!("GIT_VERSION"));

    let config = WheelConfig::default();
    config.validate()?;

    let peripherals = Peripherals::take()?;

    info!("Initializing wheel chain on GPIO 13 ({} LEDs)...", config.total_leds);
    let wheel = LedChain::new(
        "wheel",
        peripherals.pins.gpio13,
        peripherals.rmt.channel0,
        config.total_leds,
        config.brightness,
        WHEEL_RMT_MEM_BLOCKS,
    )?;

    info!("Initializing indicator chain on GPIO 14...");
    let indicator = LedChain::new(
        "indicator",
        peripherals.pins.gpio14,
        peripherals.rmt.channel1,
        INDICATOR_LEDS,
        config.brightness,
        INDICATOR_RMT_MEM_BLOCKS,
    )?;

    info!("Initializing trigger button on GPIO 27...");
    let mut button = PinDriver::input(peripherals.pins.gpio27)?;
    button.set_pull(Pull::Up)?;

    let clock = SystemClock::new();
    let mut controller = WheelController::new(config, wheel, indicator, HardwareRng);
    controller.setup();

    let watchdog = WatchdogHandle::register(c"wheel_loop")?;
    info!("Control loop running ({TICK_MS} ms tick)");

    loop {
        watchdog.feed();

        // One clock read per tick; every decision below uses it
        let now = clock.now_ms();
        let level = if button.is_low() { Level::Low } else { Level::High };
        controller.tick(now, level);

        service(controller.wheel_mut(), now);
        service(controller.indicator_mut(), now);

        // Yield so the idle task can run and feed its own watchdog
        FreeRtos::delay_ms(TICK_MS);
    }
}

/// Write a chain's pending frame, logging instead of stopping the loop
fn service(chain: &mut LedChain, now: u64) {
    if let Err(e) = chain.service(now) {
        warn!("Failed to write {} frame: {e:?}", chain.name());
    }
}

//! WS2812 output chains.
//!
//! A [`LedChain`] pairs a software [`EffectStrip`] with an RMT-driven WS2812
//! driver. The controller drives it through [`LightDriver`]; the main loop
//! calls [`LedChain::service`] every tick to write animated frames.

use anyhow::Result;
use esp_idf_hal::gpio::OutputPin;
use esp_idf_hal::peripheral::Peripheral;
use esp_idf_hal::rmt::config::TransmitConfig;
use esp_idf_hal::rmt::{RmtChannel, TxRmtDriver};
use fortune_wheel_lib::{Effect, EffectStrip, LightDriver, SegmentEffect, RGB8};
use log::debug;
use smart_leds::{brightness, gamma, SmartLedsWrite};
use ws2812_esp32_rmt_driver::Ws2812Esp32Rmt;

pub struct LedChain {
    name: &'static str,
    strip: EffectStrip,
    driver: Ws2812Esp32Rmt<'static>,
    brightness: u8,
}

impl LedChain {
    /// Create a chain of `total_leds` LEDs on `pin`.
    ///
    /// Long chains need more RMT memory blocks so WiFi or flash interrupts
    /// do not starve the transmitter mid-frame.
    pub fn new<C: RmtChannel, P: OutputPin>(
        name: &'static str,
        pin: impl Peripheral<P = P> + 'static,
        channel: impl Peripheral<P = C> + 'static,
        total_leds: usize,
        initial_brightness: u8,
        mem_blocks: u8,
    ) -> Result<Self> {
        debug!("Creating {name} chain: {total_leds} LEDs, brightness {initial_brightness}, {mem_blocks} RMT blocks");
        let config = TransmitConfig::new().clock_divider(1).mem_block_num(mem_blocks);
        let tx_driver = TxRmtDriver::new(channel, pin, &config)?;
        let driver = Ws2812Esp32Rmt::new_with_rmt_driver(tx_driver)?;

        Ok(Self {
            name,
            strip: EffectStrip::new(total_leds),
            driver,
            brightness: initial_brightness,
        })
    }

    /// Render animations due at `timestamp_ms` and write the frame if it changed
    pub fn service(&mut self, timestamp_ms: u64) -> Result<()> {
        if let Some(frame) = self.strip.render(timestamp_ms) {
            // Apply gamma correction first, then brightness reduction
            // as recommended by smart-leds docs
            self.driver
                .write(brightness(gamma(frame.iter().copied()), self.brightness))?;
        }
        Ok(())
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl LightDriver for LedChain {
    type Error = <EffectStrip as LightDriver>::Error;

    fn led_count(&self) -> usize {
        self.strip.led_count()
    }

    fn fill(&mut self, color: RGB8) {
        self.strip.fill(color);
    }

    fn set_pixel(&mut self, index: usize, color: RGB8) {
        self.strip.set_pixel(index, color);
    }

    fn set_color(&mut self, color: RGB8) {
        self.strip.set_color(color);
    }

    fn set_mode(&mut self, effect: Effect) {
        self.strip.set_mode(effect);
    }

    fn set_speed(&mut self, speed_ms: u32) {
        self.strip.set_speed(speed_ms);
    }

    fn set_segment(&mut self, slot: usize, segment: SegmentEffect) {
        self.strip.set_segment(slot, segment);
    }

    fn reset_segments(&mut self) {
        self.strip.reset_segments();
    }

    /// Queues the frame; it goes out on the next [`LedChain::service`] call,
    /// which the main loop makes in the same tick.
    fn show(&mut self) -> Result<(), Self::Error> {
        self.strip.show()
    }
}

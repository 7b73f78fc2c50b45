//! Capability set of an addressable LED chain.
//!
//! The controller only talks to output devices through [`LightDriver`], so it
//! never knows how colors reach the hardware. [`crate::EffectStrip`] implements
//! the trait in software; the firmware wraps it around a WS2812 driver.

use core::fmt::Debug;

use rgb::RGB8;
use serde::{Deserialize, Serialize};

use crate::segment::SegmentRange;

/// Default animation speed of a fresh segment (ms)
pub const DEFAULT_SPEED_MS: u32 = 1_000;

/// Animation preset a segment runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    /// No animation; the frame buffer is shown as written
    #[default]
    Static,
    /// Hue wheel across the segment, one full rotation per speed period
    RainbowCycle,
    /// Segment color fading in and out
    Breath,
    /// Segment color on for one speed period, off for the next
    Blink,
}

impl Effect {
    /// Whether the effect repaints the frame on its own
    #[must_use]
    pub const fn is_animated(self) -> bool {
        !matches!(self, Self::Static)
    }
}

/// Animation assigned to a range of LEDs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentEffect {
    pub range: SegmentRange,
    pub effect: Effect,
    pub color: RGB8,
    pub speed_ms: u32,
}

impl SegmentEffect {
    /// Unanimated segment covering the whole chain
    #[must_use]
    pub const fn full(total_leds: usize) -> Self {
        Self {
            range: SegmentRange::full(total_leds),
            effect: Effect::Static,
            color: RGB8::new(0, 0, 0),
            speed_ms: DEFAULT_SPEED_MS,
        }
    }
}

/// Output device the wheel controller drives.
///
/// Segment slot 0 is the primary segment: [`set_color`](Self::set_color),
/// [`set_mode`](Self::set_mode) and [`set_speed`](Self::set_speed) apply to it.
pub trait LightDriver {
    type Error: Debug;

    /// Number of LEDs on the chain
    fn led_count(&self) -> usize;

    /// Write `color` to every LED of the frame buffer
    fn fill(&mut self, color: RGB8);

    /// Write `color` to one LED. Out-of-range indices are ignored.
    fn set_pixel(&mut self, index: usize, color: RGB8);

    /// Set the primary segment's color parameter
    fn set_color(&mut self, color: RGB8);

    /// Set the primary segment's animation
    fn set_mode(&mut self, effect: Effect);

    /// Set the primary segment's animation speed
    fn set_speed(&mut self, speed_ms: u32);

    /// Run `segment` in `slot`, replacing whatever ran there
    fn set_segment(&mut self, slot: usize, segment: SegmentEffect);

    /// Drop every segment override, leaving one unanimated full-chain segment
    fn reset_segments(&mut self);

    /// Push the current frame to the hardware
    ///
    /// # Errors
    /// Returns the transport error if the frame could not be written.
    fn show(&mut self) -> Result<(), Self::Error>;

    /// Write `color` to every LED in `range`
    fn fill_range(&mut self, range: SegmentRange, color: RGB8) {
        for led in range.positions() {
            self.set_pixel(led, color);
        }
    }
}

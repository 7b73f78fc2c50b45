//! Fixture configuration.
//!
//! The fixture is not reconfigurable at runtime: [`WheelConfig::default`] is the
//! compile-time constant set the firmware boots with. The struct is still
//! serializable so host tools can load partial overrides from JSON.

use derive_more::{Display, Error};
use log::warn;
use rgb::RGB8;
use serde::{Deserialize, Serialize};

use crate::segment::{self, SegmentRange};

/// Total number of LEDs on the wheel ring
pub const TOTAL_LEDS: usize = 512;

/// Number of wheel segments
pub const SEGMENT_COUNT: usize = 8;

/// LEDs per wheel segment
pub const LEDS_PER_SEGMENT: usize = TOTAL_LEDS / SEGMENT_COUNT;

/// Documented spin duration bounds (ms)
pub const MIN_SPIN_MS: u32 = 5_000;
pub const MAX_SPIN_MS: u32 = 15_000;

/// Range the spin duration is actually drawn from (ms, upper bound exclusive).
///
/// The lower bound is deliberately 7 s, not [`MIN_SPIN_MS`].
pub const SPIN_DRAW_MIN_MS: u32 = 7_000;
pub const SPIN_DRAW_MAX_MS: u32 = 15_000;

/// Time the winning segment stays highlighted after the wheel stops
pub const COOLDOWN_MS: u32 = 10_000;

/// Minimum time between two accepted button reads
pub const DEBOUNCE_MS: u32 = 500;

/// Delay between the first two segment steps of a spin
pub const BASE_STEP_DELAY_MS: u32 = 100;

/// Added to the step delay after every step
pub const STEP_INCREMENT_MS: u32 = 10;

/// Global output brightness (0-255)
pub const BRIGHTNESS: u8 = 80;

/// Blink interval of the winning segment during cooldown
pub const WINNER_BLINK_MS: u32 = 100;

/// Duration of one full idle color cycle
pub const IDLE_CYCLE_MS: u32 = 5_000;

/// Wheel animation speed applied when entering cooldown
pub const COOLDOWN_SPEED_MS: u32 = 1_000;

pub const OFF: RGB8 = RGB8::new(0, 0, 0);
pub const GREEN: RGB8 = RGB8::new(0, 255, 0);
pub const RED: RGB8 = RGB8::new(255, 0, 0);

/// Reasons a [`WheelConfig`] cannot drive the fixture
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum ConfigError {
    #[display("segment count must be non-zero")]
    NoSegments,
    #[display("{total_leds} LEDs cannot give each of {segment_count} segments at least one LED")]
    TooFewLeds { total_leds: usize, segment_count: usize },
    #[display("{total_leds} LEDs cannot be split evenly into {segment_count} segments")]
    UnevenSegments { total_leds: usize, segment_count: usize },
    #[display("spin draw range {min_ms}..{max_ms} ms is empty")]
    EmptySpinRange { min_ms: u32, max_ms: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelConfig {
    pub total_leds: usize,
    pub segment_count: usize,
    /// Documented lower spin bound. Not used by the draw, see `spin_draw_min_ms`.
    pub min_spin_ms: u32,
    pub max_spin_ms: u32,
    pub spin_draw_min_ms: u32,
    /// Exclusive upper bound of the spin draw
    pub spin_draw_max_ms: u32,
    pub cooldown_ms: u32,
    pub debounce_ms: u32,
    pub base_step_delay_ms: u32,
    pub step_increment_ms: u32,
    pub brightness: u8,
    pub winner_blink_ms: u32,
    pub idle_cycle_ms: u32,
    pub cooldown_speed_ms: u32,
    /// Color of the lit segment while spinning and of the winner blink
    pub active_color: RGB8,
    /// Indicator color while idle (breathing)
    pub ready_color: RGB8,
    /// Indicator color while a spin is running
    pub busy_color: RGB8,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            total_leds: TOTAL_LEDS,
            segment_count: SEGMENT_COUNT,
            min_spin_ms: MIN_SPIN_MS,
            max_spin_ms: MAX_SPIN_MS,
            spin_draw_min_ms: SPIN_DRAW_MIN_MS,
            spin_draw_max_ms: SPIN_DRAW_MAX_MS,
            cooldown_ms: COOLDOWN_MS,
            debounce_ms: DEBOUNCE_MS,
            base_step_delay_ms: BASE_STEP_DELAY_MS,
            step_increment_ms: STEP_INCREMENT_MS,
            brightness: BRIGHTNESS,
            winner_blink_ms: WINNER_BLINK_MS,
            idle_cycle_ms: IDLE_CYCLE_MS,
            cooldown_speed_ms: COOLDOWN_SPEED_MS,
            active_color: GREEN,
            ready_color: GREEN,
            busy_color: RED,
        }
    }
}

impl WheelConfig {
    /// Check that the light layout and spin range are usable.
    ///
    /// A draw range that reaches outside the documented `min_spin_ms..=max_spin_ms`
    /// bounds is accepted but logged, since the shipped defaults already draw
    /// from a narrower range than documented.
    ///
    /// # Errors
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.segment_count == 0 {
            return Err(ConfigError::NoSegments);
        }
        if self.total_leds < self.segment_count {
            return Err(ConfigError::TooFewLeds {
                total_leds: self.total_leds,
                segment_count: self.segment_count,
            });
        }
        if self.total_leds % self.segment_count != 0 {
            return Err(ConfigError::UnevenSegments {
                total_leds: self.total_leds,
                segment_count: self.segment_count,
            });
        }
        if self.spin_draw_max_ms <= self.spin_draw_min_ms {
            return Err(ConfigError::EmptySpinRange {
                min_ms: self.spin_draw_min_ms,
                max_ms: self.spin_draw_max_ms,
            });
        }
        if self.spin_draw_min_ms < self.min_spin_ms || self.spin_draw_max_ms > self.max_spin_ms {
            warn!(
                "Spin draw range {}..{} ms lies outside documented bounds {}..={} ms",
                self.spin_draw_min_ms, self.spin_draw_max_ms, self.min_spin_ms, self.max_spin_ms
            );
        }
        Ok(())
    }

    /// Number of LEDs in each segment
    #[must_use]
    pub const fn segment_len(&self) -> usize {
        if self.segment_count == 0 {
            return 0;
        }
        self.total_leds / self.segment_count
    }

    /// LED range covered by `segment`
    #[must_use]
    pub const fn segment_range(&self, segment: usize) -> SegmentRange {
        segment::segment_range(segment, self.segment_len())
    }

    /// Range covering every LED on the ring
    #[must_use]
    pub const fn full_range(&self) -> SegmentRange {
        SegmentRange::full(self.total_leds)
    }
}

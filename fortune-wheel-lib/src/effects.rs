//! Software effect renderer over an RGB frame buffer.
//!
//! [`EffectStrip`] keeps the pixel buffer and the per-segment animations. Manual
//! writes ([`LightDriver::fill`], [`LightDriver::set_pixel`]) go straight into
//! the buffer; animated segments paint over their range whenever
//! [`EffectStrip::render`] is called. Animation phase is derived from the
//! render timestamp alone, so rendering is deterministic for a given time.

use core::convert::Infallible;

use rgb::RGB8;

use crate::driver::{Effect, LightDriver, SegmentEffect};

/// Minimum time between two animated frames
pub const DEFAULT_FRAME_INTERVAL_MS: u64 = 20;

/// Lowest brightness level a breathing segment fades to (0-255)
const BREATH_FLOOR: u8 = 16;

#[derive(Debug, Clone)]
pub struct EffectStrip {
    pixels: Vec<RGB8>,
    /// Slot 0 is the primary segment and always exists
    segments: Vec<SegmentEffect>,
    frame_interval_ms: u64,
    last_frame_at: Option<u64>,
    /// A frame was pushed with `show` and has not been rendered yet
    pending: bool,
}

impl EffectStrip {
    #[must_use]
    pub fn new(total_leds: usize) -> Self {
        Self::with_frame_interval(total_leds, DEFAULT_FRAME_INTERVAL_MS)
    }

    #[must_use]
    pub fn with_frame_interval(total_leds: usize, frame_interval_ms: u64) -> Self {
        Self {
            pixels: vec![RGB8::default(); total_leds],
            segments: vec![SegmentEffect::full(total_leds)],
            frame_interval_ms,
            last_frame_at: None,
            pending: false,
        }
    }

    /// Current frame buffer
    #[must_use]
    pub fn pixels(&self) -> &[RGB8] {
        &self.pixels
    }

    /// Active segment animations, primary first
    #[must_use]
    pub fn segments(&self) -> &[SegmentEffect] {
        &self.segments
    }

    /// Whether any segment animates on its own
    #[must_use]
    pub fn is_animated(&self) -> bool {
        self.segments.iter().any(|s| s.effect.is_animated())
    }

    /// Paint animated segments for `timestamp_ms` and return the frame if it
    /// needs to go out.
    ///
    /// Returns `Some` when a frame was pushed with `show` since the last render,
    /// or when animated segments are due for a new frame (at most one per frame
    /// interval). Returns `None` when nothing changed.
    pub fn render(&mut self, timestamp_ms: u64) -> Option<&[RGB8]> {
        let mut changed = core::mem::take(&mut self.pending);

        let frame_due = self
            .last_frame_at
            .map_or(true, |last| timestamp_ms.saturating_sub(last) >= self.frame_interval_ms);

        if frame_due && self.is_animated() {
            for segment in &self.segments {
                paint_segment(&mut self.pixels, segment, timestamp_ms);
            }
            changed = true;
        }

        if changed {
            self.last_frame_at = Some(timestamp_ms);
            Some(self.pixels.as_slice())
        } else {
            None
        }
    }

    fn primary(&mut self) -> &mut SegmentEffect {
        // reset_segments and the constructors never leave the list empty
        if self.segments.is_empty() {
            self.segments.push(SegmentEffect::full(self.pixels.len()));
        }
        &mut self.segments[0]
    }
}

impl LightDriver for EffectStrip {
    type Error = Infallible;

    fn led_count(&self) -> usize {
        self.pixels.len()
    }

    fn fill(&mut self, color: RGB8) {
        self.pixels.fill(color);
    }

    fn set_pixel(&mut self, index: usize, color: RGB8) {
        if let Some(pixel) = self.pixels.get_mut(index) {
            *pixel = color;
        }
    }

    fn set_color(&mut self, color: RGB8) {
        self.primary().color = color;
    }

    fn set_mode(&mut self, effect: Effect) {
        self.primary().effect = effect;
    }

    fn set_speed(&mut self, speed_ms: u32) {
        self.primary().speed_ms = speed_ms;
    }

    /// Slots past the end are appended as the next free slot.
    fn set_segment(&mut self, slot: usize, segment: SegmentEffect) {
        match self.segments.get_mut(slot) {
            Some(existing) => *existing = segment,
            None => self.segments.push(segment),
        }
    }

    fn reset_segments(&mut self) {
        self.segments.clear();
        self.segments.push(SegmentEffect::full(self.pixels.len()));
    }

    fn show(&mut self) -> Result<(), Self::Error> {
        self.pending = true;
        Ok(())
    }
}

/// Paint one animated segment into `pixels`. Static segments are left alone.
fn paint_segment(pixels: &mut [RGB8], segment: &SegmentEffect, timestamp_ms: u64) {
    if pixels.is_empty() {
        return;
    }
    let max_led = pixels.len() - 1;
    let start = segment.range.start.min(max_led);
    let end = segment.range.end.min(max_led);
    if start > end {
        return;
    }
    let leds = &mut pixels[start..=end];

    match segment.effect {
        Effect::Static => {}
        Effect::RainbowCycle => {
            let offset = cycle_position(timestamp_ms, segment.speed_ms);
            let count = leds.len();
            for (i, led) in leds.iter_mut().enumerate() {
                // i < count, so i * 256 / count < 256
                #[allow(clippy::cast_possible_truncation)]
                let hue = ((i * 256 / count) as u8).wrapping_add(offset);
                *led = color_wheel(hue);
            }
        }
        Effect::Breath => {
            let color = scale(segment.color, breath_level(timestamp_ms, segment.speed_ms));
            leds.fill(color);
        }
        Effect::Blink => {
            let color = if is_blink_on(timestamp_ms, segment.speed_ms) {
                segment.color
            } else {
                RGB8::default()
            };
            leds.fill(color);
        }
    }
}

/// Compute whether a blinking segment is in its "on" phase
#[inline]
fn is_blink_on(timestamp_ms: u64, blink_ms: u32) -> bool {
    // Avoid division by zero
    if blink_ms == 0 {
        return true;
    }
    (timestamp_ms / u64::from(blink_ms)) % 2 == 0
}

/// Position within a `period_ms` cycle, scaled to `0..=255`
fn cycle_position(timestamp_ms: u64, period_ms: u32) -> u8 {
    if period_ms == 0 {
        return 0;
    }
    let period = u64::from(period_ms);
    // (t % period) < period, so the quotient is below 256
    #[allow(clippy::cast_possible_truncation)]
    let position = ((timestamp_ms % period) * 256 / period) as u8;
    position
}

/// Triangle envelope: ramps up over `speed_ms`, down over the next `speed_ms`
fn breath_level(timestamp_ms: u64, speed_ms: u32) -> u8 {
    if speed_ms == 0 {
        return u8::MAX;
    }
    let speed = u64::from(speed_ms);
    let phase = timestamp_ms % (speed * 2);
    let ramp = if phase < speed { phase } else { speed * 2 - phase };
    // ramp <= speed, so the level fits in a u8
    #[allow(clippy::cast_possible_truncation)]
    let level = (ramp * 255 / speed) as u8;
    level.max(BREATH_FLOOR)
}

/// Scale a color by `level / 255`
fn scale(color: RGB8, level: u8) -> RGB8 {
    // Product of two u8 divided by 255 fits in u8
    #[allow(clippy::cast_possible_truncation)]
    let channel = |c: u8| (u16::from(c) * u16::from(level) / 255) as u8;
    RGB8::new(channel(color.r), channel(color.g), channel(color.b))
}

/// Classic 0-255 color wheel: red → green → blue → red
fn color_wheel(position: u8) -> RGB8 {
    let pos = 255 - position;
    match pos {
        0..=84 => RGB8::new(255 - pos * 3, 0, pos * 3),
        85..=169 => {
            let p = pos - 85;
            RGB8::new(0, p * 3, 255 - p * 3)
        }
        _ => {
            let p = pos - 170;
            RGB8::new(p * 3, 255 - p * 3, 0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::SegmentRange;

    const GREEN: RGB8 = RGB8::new(0, 255, 0);

    fn blink_segment(start: usize, end: usize, speed_ms: u32) -> SegmentEffect {
        SegmentEffect {
            range: SegmentRange::new(start, end),
            effect: Effect::Blink,
            color: GREEN,
            speed_ms,
        }
    }

    #[test]
    fn test_static_strip_renders_only_after_show() {
        let mut strip = EffectStrip::new(4);
        assert!(strip.render(0).is_none());

        strip.set_pixel(2, GREEN);
        assert!(strip.render(10).is_none(), "writes alone do not push");

        strip.show().unwrap();
        let frame = strip.render(20).unwrap();
        assert_eq!(frame[2], GREEN);
        assert_eq!(frame[0], RGB8::default());

        assert!(strip.render(30).is_none(), "push is consumed by one render");
    }

    #[test]
    fn test_set_pixel_out_of_range_is_ignored() {
        let mut strip = EffectStrip::new(4);
        strip.set_pixel(4, GREEN);
        assert!(strip.pixels().iter().all(|&p| p == RGB8::default()));
    }

    #[test]
    fn test_blink_timing() {
        let mut strip = EffectStrip::with_frame_interval(8, 0);
        strip.set_segment(0, blink_segment(2, 3, 100));

        // t=0: ON (0/100 % 2 == 0)
        let frame = strip.render(0).unwrap();
        assert_eq!(frame[2], GREEN);
        assert_eq!(frame[3], GREEN);
        assert_eq!(frame[4], RGB8::default(), "outside the segment");

        // t=50: still ON
        assert_eq!(strip.render(50).unwrap()[2], GREEN);

        // t=100: OFF (100/100 % 2 == 1)
        assert_eq!(strip.render(100).unwrap()[2], RGB8::default());

        // t=200: ON again
        assert_eq!(strip.render(200).unwrap()[3], GREEN);
    }

    #[test]
    fn test_blink_leaves_other_pixels_untouched() {
        let mut strip = EffectStrip::with_frame_interval(8, 0);
        strip.fill(RGB8::new(1, 2, 3));
        strip.set_segment(0, blink_segment(0, 1, 100));

        let frame = strip.render(100).unwrap();
        assert_eq!(frame[0], RGB8::default());
        assert_eq!(frame[7], RGB8::new(1, 2, 3));
    }

    #[test]
    fn test_frame_interval_limits_animated_frames() {
        let mut strip = EffectStrip::with_frame_interval(4, 20);
        strip.set_mode(Effect::RainbowCycle);

        assert!(strip.render(0).is_some());
        assert!(strip.render(10).is_none());
        assert!(strip.render(20).is_some());
    }

    #[test]
    fn test_push_bypasses_frame_interval() {
        let mut strip = EffectStrip::with_frame_interval(4, 20);
        strip.set_mode(Effect::RainbowCycle);
        assert!(strip.render(0).is_some());

        strip.show().unwrap();
        assert!(strip.render(5).is_some());
    }

    #[test]
    fn test_rainbow_cycle_rotates() {
        let mut strip = EffectStrip::with_frame_interval(8, 0);
        strip.set_segment(
            0,
            SegmentEffect {
                range: SegmentRange::full(8),
                effect: Effect::RainbowCycle,
                color: RGB8::default(),
                speed_ms: 5_000,
            },
        );

        let first: Vec<RGB8> = strip.render(0).unwrap().to_vec();
        // Adjacent LEDs get different hues
        assert_ne!(first[0], first[1]);
        // A quarter period later the pattern has moved on
        let later: Vec<RGB8> = strip.render(1_250).unwrap().to_vec();
        assert_ne!(first, later);
        // One full period brings it back
        let wrapped: Vec<RGB8> = strip.render(5_000).unwrap().to_vec();
        assert_eq!(first, wrapped);
    }

    #[test]
    fn test_breath_envelope() {
        let mut strip = EffectStrip::with_frame_interval(1, 0);
        strip.set_color(GREEN);
        strip.set_speed(1_000);
        strip.set_mode(Effect::Breath);

        // Bottom of the envelope never goes fully dark
        let dim = strip.render(0).unwrap()[0];
        assert_eq!(dim, RGB8::new(0, BREATH_FLOOR, 0));
        // Peak at one speed period
        assert_eq!(strip.render(1_000).unwrap()[0], GREEN);
        // Halfway down again
        let half = strip.render(1_500).unwrap()[0];
        assert_eq!(half, RGB8::new(0, 127, 0));
    }

    #[test]
    fn test_reset_segments_keeps_pixels() {
        let mut strip = EffectStrip::new(4);
        strip.fill(GREEN);
        strip.set_segment(0, blink_segment(0, 1, 100));
        strip.set_segment(5, blink_segment(2, 3, 200));
        assert_eq!(strip.segments().len(), 2, "out-of-range slot is appended");

        strip.reset_segments();
        assert_eq!(strip.segments(), &[SegmentEffect::full(4)]);
        assert!(!strip.is_animated());
        assert!(strip.pixels().iter().all(|&p| p == GREEN));
    }

    #[test]
    fn test_segment_range_clamped_to_strip() {
        let mut strip = EffectStrip::with_frame_interval(4, 0);
        strip.set_segment(0, blink_segment(2, 100, 100));
        let frame = strip.render(0).unwrap();
        assert_eq!(frame.len(), 4);
        assert_eq!(frame[3], GREEN);
    }

    #[test]
    fn test_color_wheel_primaries() {
        assert_eq!(color_wheel(0), RGB8::new(255, 0, 0));
        assert_eq!(color_wheel(85), RGB8::new(0, 255, 0));
        assert_eq!(color_wheel(170), RGB8::new(0, 0, 255));
    }

    #[test]
    fn test_zero_speed_does_not_divide_by_zero() {
        assert!(is_blink_on(12_345, 0));
        assert_eq!(cycle_position(12_345, 0), 0);
        assert_eq!(breath_level(12_345, 0), u8::MAX);
    }
}

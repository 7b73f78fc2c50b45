//! Mapping between wheel segments and LED positions.
//!
//! Segment `i` of length `len` covers LEDs `i * len ..= (i + 1) * len - 1`, so
//! equal-length segments partition the ring without gaps or overlap. Segment
//! indices move around the ring with wrapping arithmetic only, which keeps
//! every computed index in `0..segment_count`.

use core::ops::RangeInclusive;

/// Inclusive range of LED positions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentRange {
    /// First LED index
    pub start: usize,
    /// Last LED index (inclusive)
    pub end: usize,
}

impl SegmentRange {
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Range covering `total_leds` LEDs starting at 0.
    ///
    /// A zero-length strip yields the degenerate range `0..=0`, which still
    /// reports one LED. Callers clamp against the frame.
    #[must_use]
    pub const fn full(total_leds: usize) -> Self {
        Self {
            start: 0,
            end: total_leds.saturating_sub(1),
        }
    }

    /// Number of LEDs in the range; zero when `end` is before `start`
    #[must_use]
    pub const fn led_count(&self) -> usize {
        if self.end < self.start {
            return 0;
        }
        self.end - self.start + 1
    }

    #[must_use]
    pub const fn contains(&self, led: usize) -> bool {
        led >= self.start && led <= self.end
    }

    #[must_use]
    pub fn positions(&self) -> RangeInclusive<usize> {
        self.start..=self.end
    }
}

/// LED range covered by `segment` when every segment is `segment_len` LEDs long
#[must_use]
pub const fn segment_range(segment: usize, segment_len: usize) -> SegmentRange {
    let start = segment * segment_len;
    SegmentRange {
        start,
        end: (start + segment_len).saturating_sub(1),
    }
}

/// Segment after `current`, wrapping from the last segment to 0
#[must_use]
pub const fn next_segment(current: usize, segment_count: usize) -> usize {
    (current + 1) % segment_count
}

/// Segment before `current`, wrapping from 0 to the last segment
#[must_use]
pub const fn previous_segment(current: usize, segment_count: usize) -> usize {
    (current + segment_count - 1) % segment_count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_segment_has_64_leds() {
        for i in 0..8 {
            let range = segment_range(i, 64);
            assert_eq!(range.led_count(), 64, "segment {i}");
            assert_eq!(range.start, i * 64);
            assert_eq!(range.end, i * 64 + 63);
        }
    }

    #[test]
    fn test_segments_partition_the_ring() {
        let mut owner = [None; 512];
        for i in 0..8 {
            for led in segment_range(i, 64).positions() {
                assert!(owner[led].is_none(), "LED {led} claimed twice");
                owner[led] = Some(i);
            }
        }
        assert!(owner.iter().all(Option::is_some), "every LED belongs to a segment");
    }

    #[test]
    fn test_next_segment_wraps() {
        assert_eq!(next_segment(0, 8), 1);
        assert_eq!(next_segment(6, 8), 7);
        assert_eq!(next_segment(7, 8), 0);
    }

    #[test]
    fn test_previous_segment_wraps() {
        assert_eq!(previous_segment(0, 8), 7);
        assert_eq!(previous_segment(1, 8), 0);
        assert_eq!(previous_segment(7, 8), 6);
    }

    #[test]
    fn test_next_then_previous_is_identity() {
        for i in 0..8 {
            assert_eq!(previous_segment(next_segment(i, 8), 8), i);
        }
    }

    #[test]
    fn test_full_range() {
        let range = SegmentRange::full(512);
        assert_eq!(range.positions(), 0..=511);
        assert_eq!(range.led_count(), 512);
        assert!(range.contains(511));
        assert!(!range.contains(512));
    }

    #[test]
    fn test_reversed_range_is_empty() {
        let range = SegmentRange::new(5, 2);
        assert_eq!(range.led_count(), 0);
        assert_eq!(range.positions().count(), 0);
        assert!(!range.contains(3));
    }

    #[test]
    fn test_full_range_of_empty_strip_is_degenerate() {
        let range = SegmentRange::full(0);
        assert_eq!(range, SegmentRange::new(0, 0));
        assert_eq!(range.led_count(), 1);
    }
}

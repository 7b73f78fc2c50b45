//! End-to-end scenarios driving the controller through its public API with
//! software strips as output devices.

use fortune_wheel_lib::{
    Clock, Effect, EffectStrip, Level, LightDriver, ManualClock, Mode, WheelConfig, WheelController, RGB8,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

const TICK_MS: u64 = 10;
const GREEN: RGB8 = RGB8::new(0, 255, 0);
const RED: RGB8 = RGB8::new(255, 0, 0);

type Fixture = WheelController<EffectStrip, EffectStrip, StdRng>;

/// Controller whose spins all last `spin_ms`, already set up
fn fixture(spin_ms: u32) -> Fixture {
    let config = WheelConfig {
        spin_draw_min_ms: spin_ms,
        spin_draw_max_ms: spin_ms + 1,
        ..WheelConfig::default()
    };
    config.validate().unwrap();
    let wheel = EffectStrip::with_frame_interval(config.total_leds, 0);
    let indicator = EffectStrip::with_frame_interval(1, 0);
    let mut controller = WheelController::new(config, wheel, indicator, StdRng::seed_from_u64(7));
    controller.setup();
    controller
}

/// Segments with at least one LED not off
fn lit_segments(controller: &Fixture) -> Vec<usize> {
    let config = controller.config();
    let pixels = controller.wheel().pixels();
    (0..config.segment_count)
        .filter(|&s| {
            config
                .segment_range(s)
                .positions()
                .any(|led| pixels[led] != RGB8::default())
        })
        .collect()
}

#[test]
fn test_spin_stop_and_return_to_idle() {
    let mut c = fixture(7_000);
    let clock = ManualClock::new(0);

    assert_eq!(c.tick(clock.now_ms(), Level::Low), Mode::Spinning);
    assert_eq!(c.spin().stop_at, 7_000);
    assert_eq!(c.spin().cooldown_until, 17_000);

    let mut winner = None;
    while clock.now_ms() < 17_100 {
        clock.advance(TICK_MS);
        let now = clock.now_ms();
        let before = c.spin().active_segment;
        let mode = c.tick(now, Level::High);

        match now {
            0..=6_999 => assert_eq!(mode, Mode::Spinning, "t={now}"),
            7_000 => {
                assert_eq!(mode, Mode::Cooldown);
                assert_eq!(c.spin().active_segment, before, "winner is the segment lit when stopping");
                winner = Some(before);
            }
            7_001..=17_000 => assert_eq!(mode, Mode::Cooldown, "t={now}"),
            _ => assert_eq!(mode, Mode::Idle, "t={now}"),
        }
    }

    let winner = winner.unwrap();
    let range = c.config().segment_range(winner);
    assert!(c.wheel().is_animated(), "idle cycle is running again");
    assert_eq!(c.wheel().segments().len(), 1);
    assert_eq!(c.wheel().segments()[0].effect, Effect::RainbowCycle);
    assert_ne!(range, c.wheel().segments()[0].range, "winner highlight is gone");
}

#[test]
fn test_idle_exit_happens_just_after_cooldown() {
    let mut c = fixture(7_000);
    c.tick(0, Level::Low);
    c.tick(7_000, Level::High);
    assert_eq!(c.mode(), Mode::Cooldown);
    c.tick(17_000, Level::High);
    assert_eq!(c.mode(), Mode::Cooldown);
    c.tick(17_001, Level::High);
    assert_eq!(c.mode(), Mode::Idle);
}

#[test]
fn test_held_button_starts_four_spins_in_two_seconds() {
    let mut c = fixture(7_000);
    let mut starts = Vec::new();
    let mut last_stop = None;

    for now in (0..2_000).step_by(10) {
        c.tick(now, Level::Low);
        let stop_at = c.spin().stop_at;
        if last_stop != Some(stop_at) {
            starts.push(stop_at - 7_000);
            last_stop = Some(stop_at);
        }
    }

    assert_eq!(starts, vec![0, 500, 1_000, 1_500]);
}

#[test]
fn test_step_delay_grows_by_increment_every_step() {
    let mut c = fixture(15_000 - 1);
    c.tick(0, Level::Low);

    let mut delays = vec![c.spin().step_delay_ms];
    let mut step_times = Vec::new();
    let mut segment = c.spin().active_segment;
    for now in 1..c.spin().stop_at {
        c.tick(now, Level::High);
        if c.spin().active_segment != segment {
            segment = c.spin().active_segment;
            delays.push(c.spin().step_delay_ms);
            step_times.push(now);
        }
    }

    assert!(delays.len() > 10, "a long spin takes many steps");
    for pair in delays.windows(2) {
        assert_eq!(pair[1] - pair[0], 10, "delays {pair:?}");
    }
    // With 1 ms ticks each gap is one more than the delay in force
    for (i, gap) in step_times.windows(2).map(|w| w[1] - w[0]).enumerate() {
        assert_eq!(gap, u64::from(delays[i + 1]) + 1);
    }
}

#[test]
fn test_only_one_segment_lit_while_spinning() {
    let mut c = fixture(9_000);
    // Let the idle animation paint the whole ring first
    c.wheel_mut().render(0);
    assert_eq!(lit_segments(&c).len(), 8);

    c.tick(100, Level::Low);
    assert!(lit_segments(&c).is_empty(), "spinning starts from a dark ring");

    for now in (110..9_100).step_by(10) {
        c.tick(now, Level::High);
        if c.mode() != Mode::Spinning {
            break;
        }
        let lit = lit_segments(&c);
        if c.spin().last_step_at > 0 {
            assert_eq!(lit, vec![c.spin().active_segment], "t={now}");
        }
    }
}

#[test]
fn test_winner_blinks_and_rest_stays_dark() {
    let mut c = fixture(8_000);
    c.tick(0, Level::Low);
    for now in (10..=8_000).step_by(10) {
        c.tick(now, Level::High);
    }
    assert_eq!(c.mode(), Mode::Cooldown);
    let winner = c.spin().active_segment;
    let range = c.config().segment_range(winner);

    // Blink phase: on for 100 ms, off for 100 ms
    let frame = c.wheel_mut().render(8_000).unwrap().to_vec();
    assert!(range.positions().all(|led| frame[led] == GREEN));
    let frame = c.wheel_mut().render(8_100).unwrap().to_vec();
    assert!(range.positions().all(|led| frame[led] == RGB8::default()));

    let others_dark = frame
        .iter()
        .enumerate()
        .filter(|(led, _)| !range.contains(*led))
        .all(|(_, &p)| p == RGB8::default());
    assert!(others_dark);
}

#[test]
fn test_indicator_follows_mode() {
    let mut c = fixture(7_000);

    assert_eq!(c.indicator().segments()[0].effect, Effect::Breath);
    assert_eq!(c.indicator().segments()[0].color, GREEN);
    assert!(c.indicator_mut().render(0).is_some());

    c.tick(0, Level::Low);
    assert_eq!(c.indicator().segments()[0].effect, Effect::Static);
    assert_eq!(c.indicator_mut().render(10).unwrap(), &[RED]);
    assert!(c.indicator_mut().render(20).is_none(), "solid red needs no further frames");

    c.tick(7_000, Level::High);
    assert_eq!(c.mode(), Mode::Cooldown);
    assert_eq!(c.indicator().pixels(), &[RED], "indicator stays busy during cooldown");

    c.tick(17_001, Level::High);
    assert_eq!(c.indicator().segments()[0].effect, Effect::Breath);
}

#[test]
fn test_second_spin_continues_from_last_winner() {
    let mut c = fixture(7_000);
    c.tick(0, Level::Low);
    for now in (10..=17_010).step_by(10) {
        c.tick(now, Level::High);
    }
    assert_eq!(c.mode(), Mode::Idle);
    let first_winner = c.spin().active_segment;

    // The last step was long ago, so the first tick of the new spin steps at once
    c.tick(20_000, Level::Low);
    assert_eq!(c.mode(), Mode::Spinning);
    assert_eq!(c.spin().stop_at, 27_000);
    assert_eq!(c.spin().active_segment, (first_winner + 1) % 8);
    assert_eq!(c.spin().last_step_at, 20_000);

    c.tick(20_110, Level::High);
    assert_eq!(c.spin().active_segment, (first_winner + 1) % 8);
    c.tick(20_111, Level::High);
    assert_eq!(c.spin().active_segment, (first_winner + 2) % 8);
}

#[test]
fn test_wheel_led_count() {
    let c = fixture(7_000);
    assert_eq!(c.wheel().led_count(), 512);
    assert_eq!(c.indicator().led_count(), 1);
}

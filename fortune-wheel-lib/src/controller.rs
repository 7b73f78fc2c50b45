//! Wheel state machine.
//!
//! ```text
//! Initial --setup--> Idle --trigger--> Spinning --stop_at--> Cooldown --cooldown_until--> Idle
//! ```
//!
//! While spinning, one segment is lit at a time and the lit segment advances
//! around the ring. Every step waits a little longer than the previous one, so
//! the wheel visibly decelerates until `stop_at`. The segment lit at that
//! moment is the winner; it blinks until `cooldown_until`, then the wheel
//! returns to its idle animation.
//!
//! A trigger always starts a fresh spin, even while a spin or cooldown is
//! running. Only the button debounce limits how often that can happen.

use log::{debug, info, warn};
use rand::Rng;

use crate::config::{WheelConfig, OFF};
use crate::driver::{Effect, LightDriver, SegmentEffect};
use crate::input::{InputWatcher, Level};
use crate::segment::{next_segment, previous_segment};

/// Controller mode. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Before `setup` has run
    #[default]
    Initial,
    /// Idle animation, waiting for the button
    Idle,
    /// Wheel is turning
    Spinning,
    /// Wheel stopped, winner highlighted
    Cooldown,
}

/// Timing of the current spin. Only meaningful while spinning or cooling down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpinState {
    /// When the wheel stops turning
    pub stop_at: u64,
    /// When the winner highlight ends; never before `stop_at`
    pub cooldown_until: u64,
    /// Segment currently lit
    pub active_segment: usize,
    /// Minimum time between two steps
    pub step_delay_ms: u32,
    /// When the lit segment last moved
    pub last_step_at: u64,
}

pub struct WheelController<W, I, R> {
    config: WheelConfig,
    mode: Mode,
    spin: SpinState,
    input: InputWatcher,
    wheel: W,
    indicator: I,
    rng: R,
}

impl<W, I, R> WheelController<W, I, R>
where
    W: LightDriver,
    I: LightDriver,
    R: Rng,
{
    /// Create a controller in [`Mode::Initial`].
    ///
    /// `config` is expected to have passed [`WheelConfig::validate`].
    pub fn new(config: WheelConfig, wheel: W, indicator: I, rng: R) -> Self {
        let input = InputWatcher::new(config.debounce_ms);
        let spin = SpinState {
            step_delay_ms: config.base_step_delay_ms,
            ..SpinState::default()
        };
        Self {
            config,
            mode: Mode::Initial,
            spin,
            input,
            wheel,
            indicator,
            rng,
        }
    }

    /// Clear the wheel and start the idle animation
    pub fn setup(&mut self) {
        info!(
            "Wheel: {} LEDs in {} segments of {}",
            self.config.total_leds,
            self.config.segment_count,
            self.config.segment_len()
        );
        self.wheel.fill(OFF);
        self.enter_idle();
    }

    /// Run one control loop iteration: poll the button, then advance the wheel.
    ///
    /// `now_ms` is read once by the caller and used for every decision in the tick.
    pub fn tick(&mut self, now_ms: u64, button: Level) -> Mode {
        if self.input.poll(now_ms, button) {
            self.start_spinning(now_ms);
        }
        self.handle_wheel(now_ms);
        self.mode
    }

    /// Start a new spin at `now_ms`, whatever the current mode is.
    pub fn start_spinning(&mut self, now_ms: u64) {
        let duration_ms = self.draw_spin_duration();
        self.spin.stop_at = now_ms + u64::from(duration_ms);
        self.spin.cooldown_until = self.spin.stop_at + u64::from(self.config.cooldown_ms);
        self.spin.step_delay_ms = self.config.base_step_delay_ms;
        info!(
            "Spin: {duration_ms} ms, stops at {} ms, cooldown until {} ms",
            self.spin.stop_at, self.spin.cooldown_until
        );
        self.enter_spinning();
    }

    /// Advance the spin for `now_ms`. Does nothing unless spinning or cooling down.
    pub fn handle_wheel(&mut self, now_ms: u64) {
        if !matches!(self.mode, Mode::Spinning | Mode::Cooldown) {
            return;
        }

        if now_ms >= self.spin.stop_at {
            if now_ms <= self.spin.cooldown_until {
                self.enter_cooldown();
            } else {
                self.enter_idle();
            }
            return;
        }

        let elapsed = now_ms.saturating_sub(self.spin.last_step_at);
        if elapsed <= u64::from(self.spin.step_delay_ms) {
            return;
        }

        self.step(now_ms);
    }

    /// Move the lit segment one position and slow the wheel down
    fn step(&mut self, now_ms: u64) {
        let count = self.config.segment_count;
        self.spin.last_step_at = now_ms;
        self.spin.step_delay_ms += self.config.step_increment_ms;
        self.spin.active_segment = next_segment(self.spin.active_segment, count);
        let previous = previous_segment(self.spin.active_segment, count);

        debug!(
            "Spin step at {now_ms} ms: segment {previous} -> {}, next delay {} ms",
            self.spin.active_segment, self.spin.step_delay_ms
        );

        self.wheel.fill_range(self.config.segment_range(previous), OFF);
        self.wheel
            .fill_range(self.config.segment_range(self.spin.active_segment), self.config.active_color);
        push(&mut self.wheel, "wheel");
    }

    /// Enter [`Mode::Idle`]: idle color cycle on the wheel, breathing indicator.
    /// Does nothing when already idle.
    pub fn enter_idle(&mut self) {
        if self.mode == Mode::Idle {
            return;
        }
        self.set_mode(Mode::Idle);

        self.wheel.reset_segments();
        self.wheel.set_segment(
            0,
            SegmentEffect {
                range: self.config.full_range(),
                effect: Effect::RainbowCycle,
                color: OFF,
                speed_ms: self.config.idle_cycle_ms,
            },
        );
        self.indicator.set_color(self.config.ready_color);
        self.indicator.set_mode(Effect::Breath);
    }

    /// Enter [`Mode::Spinning`]: manual control of a cleared wheel, solid indicator.
    /// Does nothing when already spinning.
    pub fn enter_spinning(&mut self) {
        if self.mode == Mode::Spinning {
            return;
        }
        self.set_mode(Mode::Spinning);

        self.wheel.reset_segments();
        self.wheel.set_mode(Effect::Static);
        self.wheel.fill(OFF);
        push(&mut self.wheel, "wheel");

        self.indicator.set_mode(Effect::Static);
        self.indicator.set_color(self.config.busy_color);
        self.indicator.fill(self.config.busy_color);
        push(&mut self.indicator, "indicator");
    }

    /// Enter [`Mode::Cooldown`]: blink the winning segment.
    /// Does nothing when already cooling down.
    pub fn enter_cooldown(&mut self) {
        if self.mode == Mode::Cooldown {
            return;
        }
        self.set_mode(Mode::Cooldown);

        let winner = self.spin.active_segment;
        info!("Winner: segment {winner}");

        self.wheel.set_speed(self.config.cooldown_speed_ms);
        self.wheel.set_color(self.config.active_color);
        self.wheel.set_segment(
            0,
            SegmentEffect {
                range: self.config.segment_range(winner),
                effect: Effect::Blink,
                color: self.config.active_color,
                speed_ms: self.config.winner_blink_ms,
            },
        );
    }

    fn set_mode(&mut self, mode: Mode) {
        info!("Mode: {:?} -> {mode:?}", self.mode);
        self.mode = mode;
    }

    /// Uniform draw from the configured spin range (upper bound exclusive).
    ///
    /// An empty range, which `validate` rejects, yields its start.
    fn draw_spin_duration(&mut self) -> u32 {
        let range = self.config.spin_draw_min_ms..self.config.spin_draw_max_ms;
        if range.is_empty() {
            return range.start;
        }
        self.rng.random_range(range)
    }

    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub const fn spin(&self) -> &SpinState {
        &self.spin
    }

    #[must_use]
    pub const fn config(&self) -> &WheelConfig {
        &self.config
    }

    #[must_use]
    pub const fn wheel(&self) -> &W {
        &self.wheel
    }

    #[must_use]
    pub const fn indicator(&self) -> &I {
        &self.indicator
    }

    /// Mutable access for rendering and writing frames outside the state machine
    pub fn wheel_mut(&mut self) -> &mut W {
        &mut self.wheel
    }

    pub fn indicator_mut(&mut self) -> &mut I {
        &mut self.indicator
    }
}

/// Push a frame, logging instead of failing: one dropped frame is not fatal
fn push<D: LightDriver>(driver: &mut D, name: &str) {
    if let Err(e) = driver.show() {
        warn!("Failed to push {name} frame: {e:?}");
    }
}

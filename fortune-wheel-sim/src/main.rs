//! Fortune wheel simulator
//!
//! Runs the real wheel controller against a simulated clock and scripted
//! button presses, printing every mode change and the ring whenever the lit
//! segments change. Useful for checking timing changes without hardware.
//!
//! Usage: cargo run -p fortune-wheel-sim -- --press 0 --press 20000 --seed 7

use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use fortune_wheel_lib::{
    Clock, EffectStrip, Level, ManualClock, Mode, WheelConfig, WheelController, RGB8,
};
use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// How long a scripted `--press` holds the button down
const PRESS_MS: u64 = 100;

#[derive(Parser, Debug)]
#[command(name = "fortune-wheel-sim")]
#[command(about = "Simulate the fortune wheel controller on the host")]
struct Args {
    /// Press the button at this time in ms (repeatable)
    #[arg(short, long)]
    press: Vec<u64>,

    /// Hold the button down from START to END ms, e.g. 1000:3000 (repeatable)
    #[arg(long, value_parser = parse_hold)]
    hold: Vec<HoldWindow>,

    /// Simulated run time in ms
    #[arg(short, long, default_value = "30000")]
    duration: u64,

    /// Control loop tick in ms
    #[arg(short, long, default_value = "10")]
    tick: u64,

    /// Seed for spin durations (random if omitted)
    #[arg(short, long)]
    seed: Option<u64>,

    /// JSON file with config overrides
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log every spin step and debounce decision
    #[arg(short, long)]
    verbose: bool,
}

/// Time window during which the button reads low
#[derive(Debug, Clone, Copy)]
struct HoldWindow {
    start: u64,
    end: u64,
}

impl HoldWindow {
    const fn contains(self, t: u64) -> bool {
        t >= self.start && t < self.end
    }
}

fn parse_hold(s: &str) -> Result<HoldWindow, String> {
    let (start, end) = s
        .split_once(':')
        .ok_or_else(|| format!("expected START:END, got '{s}'"))?;
    let start = start.trim().parse().map_err(|e| format!("invalid start in '{s}': {e}"))?;
    let end = end.trim().parse().map_err(|e| format!("invalid end in '{s}': {e}"))?;
    if end <= start {
        return Err(format!("hold window '{s}' ends before it starts"));
    }
    Ok(HoldWindow { start, end })
}

fn load_config(path: Option<&PathBuf>) -> Result<WheelConfig> {
    let config = match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => WheelConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

/// Button level at `t` for the scripted presses and holds
fn button_level(args: &Args, t: u64) -> Level {
    let pressed = args.press.iter().any(|&p| t >= p && t < p.saturating_add(PRESS_MS))
        || args.hold.iter().any(|w| w.contains(t));
    if pressed {
        Level::Low
    } else {
        Level::High
    }
}

/// One character per segment: `#` lit, `.` dark
fn ring_view(config: &WheelConfig, pixels: &[RGB8]) -> String {
    (0..config.segment_count)
        .map(|s| {
            let lit = config
                .segment_range(s)
                .positions()
                .any(|led| pixels.get(led).is_some_and(|&p| p != RGB8::default()));
            if lit {
                '#'
            } else {
                '.'
            }
        })
        .collect()
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    if args.tick == 0 {
        return Err(anyhow!("tick must be at least 1 ms"));
    }

    let config = load_config(args.config.as_ref())?;
    let seed = args.seed.unwrap_or_else(rand::random);
    println!("Seed: {seed}");

    let wheel = EffectStrip::new(config.total_leds);
    let indicator = EffectStrip::new(1);
    let mut controller = WheelController::new(config, wheel, indicator, StdRng::seed_from_u64(seed));
    controller.setup();

    let clock = ManualClock::new(0);
    let mut last_mode = controller.mode();
    let mut last_view = String::new();
    let mut spins = 0u32;

    println!("[{:>7} ms] {last_mode:?}", clock.now_ms());

    while clock.now_ms() <= args.duration {
        let now = clock.now_ms();
        let level = button_level(&args, now);
        let mode = controller.tick(now, level);

        if mode != last_mode {
            match mode {
                Mode::Spinning => {
                    spins += 1;
                    let spin = controller.spin();
                    println!(
                        "[{now:>7} ms] {mode:?} (stops at {} ms, cooldown until {} ms)",
                        spin.stop_at, spin.cooldown_until
                    );
                }
                Mode::Cooldown => {
                    println!("[{now:>7} ms] {mode:?} (winner: segment {})", controller.spin().active_segment);
                }
                _ => println!("[{now:>7} ms] {mode:?}"),
            }
            last_mode = mode;
        }

        // The idle cycle lights the whole ring, so only show it while a spin runs
        if mode == Mode::Spinning {
            let view = ring_view(controller.config(), controller.wheel().pixels());
            if view != last_view {
                println!("[{now:>7} ms]   {view}  delay {} ms", controller.spin().step_delay_ms);
                last_view = view;
            }
        } else {
            last_view.clear();
        }

        if let Some(frame) = controller.wheel_mut().render(now) {
            debug!("Wheel frame at {now} ms ({} LEDs)", frame.len());
        }
        controller.indicator_mut().render(now);

        clock.advance(args.tick);
    }

    println!("Done: {spins} spin(s) in {} ms", args.duration);
    Ok(())
}

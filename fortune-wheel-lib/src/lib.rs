//! Wheel of fortune control logic
//!
//! This library holds everything the fortune wheel fixture decides: which
//! segment is lit, how fast the wheel decelerates, when the winner blinks and
//! when the idle animation resumes. It is hardware-agnostic and can be tested
//! without embedded hardware: output devices are reached through
//! [`LightDriver`], time is passed in as milliseconds, and randomness comes
//! from any [`rand::Rng`].
//!
//! A control loop calls [`WheelController::tick`] with the current time and
//! button level, then renders and writes both output devices.

pub use rgb::RGB8;

pub mod clock;
pub mod config;
pub mod controller;
pub mod driver;
pub mod effects;
pub mod input;
pub mod segment;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, WheelConfig};
pub use controller::{Mode, SpinState, WheelController};
pub use driver::{Effect, LightDriver, SegmentEffect};
pub use effects::EffectStrip;
pub use input::{InputWatcher, Level};
pub use segment::SegmentRange;

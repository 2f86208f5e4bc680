//! Core logic for a six-tube nixie clock.
//!
//! Everything in here is driven from a single periodic timer interrupt:
//! the tick accumulator that turns a 78.125 Hz interrupt into seconds, the
//! pushbutton debouncer and the feedback loop that keeps the boost converter
//! at tube voltage. Hardware is reached only through [`hw::ClockHardware`]
//! and the `embedded-hal` traits, so the whole crate runs on the host under
//! `cargo test`.

#![cfg_attr(not(test), no_std)]

pub mod buttons;
pub mod clock;
pub mod config;
pub mod context;
pub mod digits;
pub mod display;
pub mod hw;
pub mod regulator;
pub mod schedule;

pub use clock::{ClockTime, TickAccumulator, TimeKeeper};
pub use config::{Config, ConfigError};
pub use context::ClockContext;
pub use hw::ClockHardware;

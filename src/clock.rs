use core::fmt;

use crate::config::ConfigError;

/// Wall-clock time of day, always in range.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockTime {
    hours: u8,
    minutes: u8,
    seconds: u8,
}

impl ClockTime {
    pub const MIDNIGHT: ClockTime = ClockTime {
        hours: 0,
        minutes: 0,
        seconds: 0,
    };

    /// Returns `None` unless hours < 24, minutes < 60 and seconds < 60.
    pub const fn new(hours: u8, minutes: u8, seconds: u8) -> Option<Self> {
        if hours < 24 && minutes < 60 && seconds < 60 {
            Some(Self {
                hours,
                minutes,
                seconds,
            })
        } else {
            None
        }
    }

    pub const fn hours(&self) -> u8 {
        self.hours
    }

    pub const fn minutes(&self) -> u8 {
        self.minutes
    }

    pub const fn seconds(&self) -> u8 {
        self.seconds
    }

    pub fn add_second(&mut self) {
        self.seconds += 1;
        if self.seconds >= 60 {
            self.seconds = 0;
            self.add_minute();
        }
    }

    pub fn add_minute(&mut self) {
        self.minutes += 1;
        if self.minutes >= 60 {
            self.minutes = 0;
            self.increment_hours();
        }
    }

    pub fn increment_hours(&mut self) {
        self.hours = (self.hours + 1) % 24;
    }

    /// Bumps the minute field alone, 59 wraps to 0 without touching hours.
    pub fn increment_minutes(&mut self) {
        self.minutes = (self.minutes + 1) % 60;
    }

    pub fn clear_seconds(&mut self) {
        self.seconds = 0;
    }

    pub fn to_hms(&self) -> heapless::String<8> {
        let mut line = heapless::String::new();
        // Fields are range-checked to two digits, so eight bytes always fit.
        let written = fmt::write(&mut line, format_args!("{}", self));
        debug_assert!(written.is_ok(), "time line overflowed");
        line
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hours, self.minutes, self.seconds)
    }
}

/// How the interrupt rate maps onto seconds.
///
/// The hardware tick rate is rarely an integer. It is split into a whole
/// number of ticks per second plus a fraction of the form `1 / correction_interval`,
/// which is paid back by stretching one second in every `correction_interval`
/// by a single tick.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickConfig {
    pub ticks_per_second: u8,
    /// Seconds between extra ticks. Zero for integer tick rates.
    pub correction_interval: u8,
}

impl TickConfig {
    /// 20 MHz / 1024 / 250 = 78.125 Hz, i.e. 78 ticks plus 1/8.
    pub const REFERENCE: TickConfig = TickConfig {
        ticks_per_second: 78,
        correction_interval: 8,
    };

    /// `from_period_us(12_800)` is the reference 78.125 Hz rate.
    pub const fn from_period_us(period_us: u32) -> Result<Self, ConfigError> {
        if period_us == 0 {
            return Err(ConfigError::TickRateOutOfRange);
        }
        let whole = 1_000_000 / period_us;
        if whole == 0 || whole > u8::MAX as u32 {
            return Err(ConfigError::TickRateOutOfRange);
        }
        let remainder = 1_000_000 % period_us;
        if remainder == 0 {
            return Ok(Self {
                ticks_per_second: whole as u8,
                correction_interval: 0,
            });
        }
        if period_us % remainder != 0 || period_us / remainder > u8::MAX as u32 {
            return Err(ConfigError::UnsupportedTickPeriod(period_us));
        }
        Ok(Self {
            ticks_per_second: whole as u8,
            correction_interval: (period_us / remainder) as u8,
        })
    }
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickAccumulator {
    config: TickConfig,
    ticks: u8,
    correction_counter: u8,
    stretch: bool,
}

impl TickAccumulator {
    pub const fn new(config: TickConfig) -> Self {
        Self {
            config,
            ticks: 0,
            correction_counter: 0,
            stretch: false,
        }
    }

    pub const fn config(&self) -> TickConfig {
        self.config
    }

    pub const fn ticks(&self) -> u8 {
        self.ticks
    }

    pub const fn correction_counter(&self) -> u8 {
        self.correction_counter
    }

    /// Registers one interrupt. Returns `true` when a second has elapsed.
    pub fn tick(&mut self) -> bool {
        if self.stretch {
            // The extra tick owed by the fractional rate.
            self.stretch = false;
            return false;
        }

        self.ticks += 1;
        if self.ticks < self.config.ticks_per_second {
            return false;
        }

        self.ticks = 0;
        if self.config.correction_interval != 0 {
            self.correction_counter += 1;
            if self.correction_counter == self.config.correction_interval {
                self.correction_counter = 0;
                self.stretch = true;
            }
        }
        true
    }
}

/// Owns the time of day and advances it from interrupt ticks.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimeKeeper {
    time: ClockTime,
    accumulator: TickAccumulator,
}

impl TimeKeeper {
    pub const fn new(config: TickConfig) -> Self {
        Self {
            time: ClockTime::MIDNIGHT,
            accumulator: TickAccumulator::new(config),
        }
    }

    pub const fn time(&self) -> ClockTime {
        self.time
    }

    pub const fn accumulator(&self) -> &TickAccumulator {
        &self.accumulator
    }

    /// Called once per interrupt. Returns `true` when the seconds changed
    /// and the display needs a redraw.
    pub fn advance_tick(&mut self) -> bool {
        if self.accumulator.tick() {
            self.advance_second();
            true
        } else {
            false
        }
    }

    pub fn advance_second(&mut self) {
        self.time.add_second();
    }

    // Manual adjustments leave the tick phase alone.

    pub fn increment_hours(&mut self) {
        self.time.increment_hours();
    }

    pub fn increment_minutes(&mut self) {
        self.time.increment_minutes();
    }

    pub fn clear_seconds(&mut self) {
        self.time.clear_seconds();
    }

    pub fn set_time(&mut self, time: ClockTime) {
        self.time = time;
    }
}

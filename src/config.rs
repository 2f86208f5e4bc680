use core::fmt;

use crate::buttons::ButtonConfig;
use crate::clock::TickConfig;
use crate::display::DisplayConfig;
use crate::regulator::RegulatorConfig;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// The tick period does not divide into a whole number of ticks plus a
    /// 1/k fraction, so it cannot be corrected by inserting single ticks.
    UnsupportedTickPeriod(u32),
    TickRateOutOfRange,
    DutyBoundsInverted,
    TargetAboveCeiling,
    /// Proportional step shift past the width of the feedback error.
    StepShiftTooLarge(u8),
    FeedbackScaleOutOfRange,
    ZeroDebounceSamples,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnsupportedTickPeriod(us) => {
                write!(f, "tick period of {}us has no 1/k fractional part", us)
            }
            ConfigError::TickRateOutOfRange => f.write_str("tick rate out of range"),
            ConfigError::DutyBoundsInverted => f.write_str("min_duty is above max_duty"),
            ConfigError::TargetAboveCeiling => {
                f.write_str("regulation target must be below the safety ceiling")
            }
            ConfigError::StepShiftTooLarge(shift) => {
                write!(f, "step shift of {} leaves nothing of an 8-bit error", shift)
            }
            ConfigError::FeedbackScaleOutOfRange => f.write_str("feedback ADC scale out of range"),
            ConfigError::ZeroDebounceSamples => f.write_str("debounce needs at least one sample"),
        }
    }
}

/// All tunables of the clock core, built in a `const` by the firmware.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Config {
    pub tick: TickConfig,
    pub buttons: ButtonConfig,
    pub regulator: RegulatorConfig,
    pub display: DisplayConfig,
}

impl Config {
    /// The reference board: 78.125 Hz tick, 170 V target, 190 V cutoff.
    pub const DEFAULT: Config = Config {
        tick: TickConfig::REFERENCE,
        buttons: ButtonConfig::DEFAULT,
        regulator: RegulatorConfig::DEFAULT,
        display: DisplayConfig::DEFAULT,
    };

    /// Checks the cross-field constraints of every section.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.tick.ticks_per_second == 0 {
            return Err(ConfigError::TickRateOutOfRange);
        }
        if self.buttons.debounce_samples == 0 {
            return Err(ConfigError::ZeroDebounceSamples);
        }
        self.regulator.validate()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::DEFAULT
    }
}

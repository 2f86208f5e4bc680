use core::cmp::Ordering;

use crate::config::ConfigError;

/// Largest useful `Proportional` shift: the error never exceeds 8 bits.
pub const MAX_STEP_SHIFT: u8 = 7;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StepMode {
    Fixed,
    /// Step by `error >> shift`, at least one. Rings if the shift is too small.
    Proportional { shift: u8 },
}

/// ADC range, used to bring raw conversions into 10 mV feedback units.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FeedbackScale {
    pub bits: u8,
    pub full_scale_mv: u32,
}

impl FeedbackScale {
    /// 12-bit converter against the 3.3 V supply.
    pub const RP2040: FeedbackScale = FeedbackScale {
        bits: 12,
        full_scale_mv: 3300,
    };

    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.bits == 0 || self.bits > 16 || self.full_scale_mv == 0 || self.full_scale_mv > 10_000 {
            return Err(ConfigError::FeedbackScaleOutOfRange);
        }
        Ok(())
    }

    /// Rounds a raw conversion to 10 mV units at the ADC pin, saturating at 255.
    /// Behind the 100:1 divider one unit is one volt on the rail.
    pub const fn to_units(&self, raw: u16) -> u8 {
        let counts = 1u32 << self.bits;
        let units = (raw as u32 * self.full_scale_mv + counts * 5) / (counts * 10);
        if units > u8::MAX as u32 {
            u8::MAX
        } else {
            units as u8
        }
    }
}

/// Thresholds are in 10 mV feedback units (see [`FeedbackScale`]).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegulatorConfig {
    pub target: u8,
    pub ceiling: u8,
    pub min_duty: u16,
    pub max_duty: u16,
    pub step: StepMode,
    pub scale: FeedbackScale,
}

impl RegulatorConfig {
    pub const DEFAULT: RegulatorConfig = RegulatorConfig {
        target: 170,
        ceiling: 190,
        min_duty: 0,
        max_duty: 0xa0,
        step: StepMode::Fixed,
        scale: FeedbackScale::RP2040,
    };

    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.min_duty > self.max_duty {
            return Err(ConfigError::DutyBoundsInverted);
        }
        if self.target >= self.ceiling {
            return Err(ConfigError::TargetAboveCeiling);
        }
        if let StepMode::Proportional { shift } = self.step {
            if shift > MAX_STEP_SHIFT {
                return Err(ConfigError::StepShiftTooLarge(shift));
            }
        }
        self.scale.validate()
    }

    fn step_size(&self, error: u8) -> u16 {
        match self.step {
            StepMode::Fixed => 1,
            StepMode::Proportional { shift } => u16::from(error)
                .checked_shr(u32::from(shift))
                .unwrap_or(0)
                .max(1),
        }
    }
}

impl Default for RegulatorConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VoltageRegulator {
    config: RegulatorConfig,
    duty: u16,
    last_sample: Option<u8>,
    tripped: bool,
}

impl VoltageRegulator {
    pub const fn new(config: RegulatorConfig) -> Self {
        Self {
            config,
            duty: config.min_duty,
            last_sample: None,
            tripped: false,
        }
    }

    pub const fn config(&self) -> &RegulatorConfig {
        &self.config
    }

    pub const fn duty(&self) -> u16 {
        self.duty
    }

    pub const fn last_sample(&self) -> Option<u8> {
        self.last_sample
    }

    /// Whether the last sample was over the safety ceiling.
    pub const fn is_tripped(&self) -> bool {
        self.tripped
    }

    pub fn step(&mut self, sample: u8) -> u16 {
        let cfg = self.config;
        self.last_sample = Some(sample);

        if sample > cfg.ceiling {
            if !self.tripped {
                #[cfg(feature = "defmt")]
                defmt::warn!("hv feedback {} over ceiling {}, gate off", sample, cfg.ceiling);
                self.tripped = true;
            }
            self.duty = cfg.min_duty;
            return self.duty;
        }
        if self.tripped {
            #[cfg(feature = "defmt")]
            defmt::info!("hv feedback back to {}, regulating", sample);
            self.tripped = false;
        }

        match sample.cmp(&cfg.target) {
            Ordering::Less => {
                let step = cfg.step_size(cfg.target - sample);
                self.duty = self.duty.saturating_add(step).min(cfg.max_duty);
            }
            Ordering::Greater => {
                let step = cfg.step_size(sample - cfg.target);
                self.duty = self.duty.saturating_sub(step).max(cfg.min_duty);
            }
            Ordering::Equal => {}
        }
        self.duty
    }
}

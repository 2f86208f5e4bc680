/// Auto-repeat while held: first after `initial_delay` ticks, then 20% sooner
/// each time down to `min_interval`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HoldRepeat {
    pub initial_delay: u16,
    pub min_interval: u16,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonConfig {
    pub debounce_samples: u8,
    pub repeat: Option<HoldRepeat>,
}

impl ButtonConfig {
    pub const DEFAULT: ButtonConfig = ButtonConfig {
        debounce_samples: 3,
        repeat: None,
    };
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    Hours,
    Minutes,
    ClearSeconds,
}

impl Button {
    pub const ALL: [Button; 3] = [Button::Hours, Button::Minutes, Button::ClearSeconds];

    pub const fn index(self) -> usize {
        self as usize
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelState {
    Idle,
    Debouncing(u8),
    Registered,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonChannel {
    debounce_count: u8,
    registered: bool,
    held_ticks: u16,
    repeat_interval: u16,
}

impl ButtonChannel {
    pub const fn new() -> Self {
        Self {
            debounce_count: 0,
            registered: false,
            held_ticks: 0,
            repeat_interval: 0,
        }
    }

    pub const fn debounce_count(&self) -> u8 {
        self.debounce_count
    }

    pub const fn is_registered(&self) -> bool {
        self.registered
    }

    pub const fn state(&self) -> ChannelState {
        if self.registered {
            ChannelState::Registered
        } else if self.debounce_count == 0 {
            ChannelState::Idle
        } else {
            ChannelState::Debouncing(self.debounce_count)
        }
    }

    /// Feeds one sample. Returns `true` when the press should act.
    pub fn sample(&mut self, high: bool, config: &ButtonConfig) -> bool {
        if !high {
            *self = Self::new();
            return false;
        }

        if self.debounce_count < config.debounce_samples {
            self.debounce_count += 1;
        }
        if self.debounce_count < config.debounce_samples {
            return false;
        }

        if !self.registered {
            self.registered = true;
            self.held_ticks = 0;
            self.repeat_interval = config.repeat.map_or(0, |r| r.initial_delay.max(1));
            return true;
        }

        let Some(repeat) = config.repeat else {
            return false;
        };
        self.held_ticks = self.held_ticks.saturating_add(1);
        if self.held_ticks < self.repeat_interval {
            return false;
        }
        self.held_ticks = 0;
        let shorter = (self.repeat_interval as u32 * 8 / 10) as u16;
        self.repeat_interval = shorter.max(repeat.min_interval).max(1);
        true
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Presses(u8);

impl Presses {
    pub const NONE: Presses = Presses(0);

    pub fn insert(&mut self, button: Button) {
        self.0 |= 1 << button.index();
    }

    pub const fn contains(&self, button: Button) -> bool {
        self.0 & (1 << button.index()) != 0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Button> {
        Button::ALL.into_iter().filter(move |&b| self.contains(b))
    }
}

pub struct ButtonDebouncer {
    channels: [ButtonChannel; 3],
    config: ButtonConfig,
}

impl ButtonDebouncer {
    pub const fn new(config: ButtonConfig) -> Self {
        Self {
            channels: [ButtonChannel::new(); 3],
            config,
        }
    }

    pub fn channel(&self, button: Button) -> &ButtonChannel {
        &self.channels[button.index()]
    }

    /// Samples all three inputs, indexed like [`Button::ALL`].
    pub fn scan(&mut self, levels: [bool; 3]) -> Presses {
        let mut presses = Presses::NONE;
        for button in Button::ALL {
            if self.channels[button.index()].sample(levels[button.index()], &self.config) {
                #[cfg(feature = "defmt")]
                defmt::debug!("button {} registered", button);
                presses.insert(button);
            }
        }
        presses
    }
}

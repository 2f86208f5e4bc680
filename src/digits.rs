use crate::clock::ClockTime;

pub const fn split(value: u8) -> (u8, u8) {
    (value / 10, value % 10)
}

/// The six tube digits in the order they are shifted out:
/// seconds ones, seconds tens, minutes ones, minutes tens, hours ones, hours tens.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DigitFrame([u8; 6]);

impl DigitFrame {
    pub fn from_time(time: &ClockTime) -> Self {
        let (h_tens, h_ones) = split(time.hours());
        let (m_tens, m_ones) = split(time.minutes());
        let (s_tens, s_ones) = split(time.seconds());
        Self([s_ones, s_tens, m_ones, m_tens, h_ones, h_tens])
    }

    pub const fn digits(&self) -> &[u8; 6] {
        &self.0
    }
}

impl From<ClockTime> for DigitFrame {
    fn from(time: ClockTime) -> Self {
        Self::from_time(&time)
    }
}

/// How one digit is presented to the tube driver chain.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Encoding {
    /// Four BCD bits for a decoder/driver such as the 74141.
    Bcd,
    /// One output per cathode; the selected cathode is driven low, all others high.
    OneOfTen,
}

impl Encoding {
    pub const fn bits_per_digit(self) -> u8 {
        match self {
            Encoding::Bcd => 4,
            Encoding::OneOfTen => 10,
        }
    }

    /// MSB first.
    pub const fn pattern(self, digit: u8) -> u16 {
        match self {
            Encoding::Bcd => (digit & 0x0f) as u16,
            Encoding::OneOfTen => !(1u16 << (digit % 10)) & 0x03ff,
        }
    }
}

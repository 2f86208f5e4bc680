//! Data, shift clock and latch driver for the tube cathode shift registers.

use core::convert::Infallible;

use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::digital::v2::OutputPin;

use crate::clock::ClockTime;
use crate::digits::{DigitFrame, Encoding};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LatchPolarity {
    /// Idle low, pulsed high.
    ActiveHigh,
    /// Idle high, pulsed low.
    ActiveLow,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayConfig {
    pub encoding: Encoding,
    pub latch: LatchPolarity,
    /// Minimum time each clock and latch level is held, in microseconds.
    pub min_dwell_us: u32,
}

impl DisplayConfig {
    pub const DEFAULT: DisplayConfig = DisplayConfig {
        encoding: Encoding::OneOfTen,
        latch: LatchPolarity::ActiveLow,
        min_dwell_us: 1,
    };
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

pub struct ShiftRegisterDisplay<DATA, CLK, LATCH, D> {
    data: DATA,
    clock: CLK,
    latch: LATCH,
    delay: D,
    config: DisplayConfig,
}

impl<DATA, CLK, LATCH, D> ShiftRegisterDisplay<DATA, CLK, LATCH, D>
where
    DATA: OutputPin<Error = Infallible>,
    CLK: OutputPin<Error = Infallible>,
    LATCH: OutputPin<Error = Infallible>,
    D: DelayUs<u32>,
{
    /// Takes the pins and parks them at their idle levels.
    pub fn new(data: DATA, clock: CLK, latch: LATCH, delay: D, config: DisplayConfig) -> Self {
        let mut display = Self {
            data,
            clock,
            latch,
            delay,
            config,
        };
        set_level(&mut display.data, false);
        set_level(&mut display.clock, false);
        let idle = display.latch_idle_level();
        set_level(&mut display.latch, idle);
        display
    }

    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    pub fn render(&mut self, time: &ClockTime) {
        self.write_frame(&DigitFrame::from_time(time));
    }

    pub fn write_frame(&mut self, frame: &DigitFrame) {
        let encoding = self.config.encoding;
        let width = encoding.bits_per_digit();
        for &digit in frame.digits() {
            let pattern = encoding.pattern(digit);
            for bit in (0..width).rev() {
                self.shift_bit(pattern & (1 << bit) != 0);
            }
        }
        self.strobe_latch();
    }

    fn shift_bit(&mut self, high: bool) {
        set_level(&mut self.data, high);
        set_level(&mut self.clock, true);
        self.dwell();
        set_level(&mut self.clock, false);
        self.dwell();
    }

    fn strobe_latch(&mut self) {
        let idle = self.latch_idle_level();
        set_level(&mut self.latch, !idle);
        self.dwell();
        set_level(&mut self.latch, idle);
    }

    fn latch_idle_level(&self) -> bool {
        self.config.latch == LatchPolarity::ActiveLow
    }

    fn dwell(&mut self) {
        if self.config.min_dwell_us > 0 {
            self.delay.delay_us(self.config.min_dwell_us);
        }
    }
}

fn set_level<P: OutputPin<Error = Infallible>>(pin: &mut P, high: bool) {
    let result = if high { pin.set_high() } else { pin.set_low() };
    match result {
        Ok(()) => {}
        Err(never) => match never {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Copy, Clone, Debug, Eq, PartialEq)]
    enum Line {
        Data,
        Clock,
        Latch,
    }

    #[derive(Copy, Clone, Debug, Eq, PartialEq)]
    enum Event {
        Set(Line, bool),
        Delay(u32),
    }

    type Log = Rc<RefCell<Vec<Event>>>;

    struct MockPin {
        line: Line,
        log: Log,
    }

    impl OutputPin for MockPin {
        type Error = Infallible;

        fn set_low(&mut self) -> Result<(), Infallible> {
            self.log.borrow_mut().push(Event::Set(self.line, false));
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.log.borrow_mut().push(Event::Set(self.line, true));
            Ok(())
        }
    }

    struct MockDelay(Log);

    impl DelayUs<u32> for MockDelay {
        fn delay_us(&mut self, us: u32) {
            self.0.borrow_mut().push(Event::Delay(us));
        }
    }

    fn display(config: DisplayConfig) -> (ShiftRegisterDisplay<MockPin, MockPin, MockPin, MockDelay>, Log) {
        let log: Log = Rc::default();
        let pin = |line| MockPin {
            line,
            log: log.clone(),
        };
        let display = ShiftRegisterDisplay::new(
            pin(Line::Data),
            pin(Line::Clock),
            pin(Line::Latch),
            MockDelay(log.clone()),
            config,
        );
        log.borrow_mut().clear();
        (display, log)
    }

    /// Data levels sampled on each rising clock edge.
    fn shifted_bits(log: &[Event]) -> Vec<bool> {
        let mut data = false;
        let mut bits = Vec::new();
        for event in log {
            match *event {
                Event::Set(Line::Data, level) => data = level,
                Event::Set(Line::Clock, true) => bits.push(data),
                _ => {}
            }
        }
        bits
    }

    fn latch_events(log: &[Event]) -> Vec<bool> {
        log.iter()
            .filter_map(|event| match *event {
                Event::Set(Line::Latch, level) => Some(level),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn parks_latch_at_idle_level() {
        let log: Log = Rc::default();
        let pin = |line| MockPin {
            line,
            log: log.clone(),
        };
        let _display = ShiftRegisterDisplay::new(
            pin(Line::Data),
            pin(Line::Clock),
            pin(Line::Latch),
            MockDelay(log.clone()),
            DisplayConfig::DEFAULT,
        );
        assert_eq!(latch_events(&log.borrow()), vec![true]);
    }

    #[test]
    fn bcd_frame_shifts_seconds_ones_first() {
        let config = DisplayConfig {
            encoding: Encoding::Bcd,
            min_dwell_us: 0,
            ..DisplayConfig::DEFAULT
        };
        let (mut display, log) = display(config);
        display.render(&ClockTime::new(12, 34, 56).unwrap());

        let bits = shifted_bits(&log.borrow());
        assert_eq!(bits.len(), 24);
        let digits: Vec<u8> = bits
            .chunks(4)
            .map(|nibble| nibble.iter().fold(0, |acc, &b| (acc << 1) | b as u8))
            .collect();
        assert_eq!(digits, vec![6, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn one_of_ten_frame_selects_one_cathode_per_tube() {
        let (mut display, log) = display(DisplayConfig {
            min_dwell_us: 0,
            ..DisplayConfig::DEFAULT
        });
        display.render(&ClockTime::new(0, 0, 7).unwrap());

        let bits = shifted_bits(&log.borrow());
        assert_eq!(bits.len(), 60);
        // Cathode 9 goes out first, so the low bit sits at index 9 - digit.
        let first = &bits[..10];
        assert_eq!(first.iter().filter(|&&b| !b).count(), 1);
        assert!(!first[9 - 7]);
        for tube in bits.chunks(10).skip(1) {
            assert!(!tube[9]);
        }
    }

    #[test]
    fn latch_pulses_once_after_all_bits() {
        let (mut display, log) = display(DisplayConfig::DEFAULT);
        display.render(&ClockTime::MIDNIGHT);

        let log = log.borrow();
        assert_eq!(latch_events(&log), vec![false, true]);
        let first_latch = log
            .iter()
            .position(|e| matches!(e, Event::Set(Line::Latch, _)))
            .unwrap();
        assert!(log[first_latch..]
            .iter()
            .all(|e| !matches!(e, Event::Set(Line::Clock, _))));
    }

    #[test]
    fn active_high_latch_pulses_high() {
        let (mut display, log) = display(DisplayConfig {
            latch: LatchPolarity::ActiveHigh,
            ..DisplayConfig::DEFAULT
        });
        display.render(&ClockTime::MIDNIGHT);
        assert_eq!(latch_events(&log.borrow()), vec![true, false]);
    }

    #[test]
    fn every_edge_dwells() {
        let (mut display, log) = display(DisplayConfig {
            encoding: Encoding::Bcd,
            min_dwell_us: 3,
            ..DisplayConfig::DEFAULT
        });
        display.render(&ClockTime::MIDNIGHT);
        let delays: Vec<u32> = log
            .borrow()
            .iter()
            .filter_map(|e| match *e {
                Event::Delay(us) => Some(us),
                _ => None,
            })
            .collect();
        // Two per shifted bit plus one for the latch pulse.
        assert_eq!(delays.len(), 24 * 2 + 1);
        assert!(delays.iter().all(|&us| us == 3));
    }

    #[test]
    fn zero_dwell_skips_the_delay() {
        let (mut display, log) = display(DisplayConfig {
            min_dwell_us: 0,
            ..DisplayConfig::DEFAULT
        });
        display.render(&ClockTime::MIDNIGHT);
        assert!(!log.borrow().iter().any(|e| matches!(e, Event::Delay(_))));
    }
}

use crate::buttons::{Button, ButtonDebouncer, Presses};
use crate::clock::{ClockTime, TimeKeeper};
use crate::config::Config;
use crate::digits::DigitFrame;
use crate::hw::ClockHardware;
use crate::regulator::VoltageRegulator;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickOutcome {
    pub second_elapsed: bool,
    pub presses: Presses,
    pub duty: u16,
}

/// State owned by the tick interrupt. Other contexts read it under a lock.
pub struct ClockContext {
    keeper: TimeKeeper,
    buttons: ButtonDebouncer,
    regulator: VoltageRegulator,
}

impl ClockContext {
    pub const fn new(config: &Config) -> Self {
        Self {
            keeper: TimeKeeper::new(config.tick),
            buttons: ButtonDebouncer::new(config.buttons),
            regulator: VoltageRegulator::new(config.regulator),
        }
    }

    pub const fn time(&self) -> ClockTime {
        self.keeper.time()
    }

    pub fn set_time(&mut self, time: ClockTime) {
        self.keeper.set_time(time);
    }

    pub fn keeper(&self) -> &TimeKeeper {
        &self.keeper
    }

    pub fn buttons(&self) -> &ButtonDebouncer {
        &self.buttons
    }

    pub fn regulator(&self) -> &VoltageRegulator {
        &self.regulator
    }

    pub fn render<H: ClockHardware>(&self, hw: &mut H) {
        hw.show(&DigitFrame::from_time(&self.keeper.time()));
    }

    /// The whole interrupt: regulate, count the tick, then read the buttons.
    pub fn on_tick<H: ClockHardware>(&mut self, hw: &mut H) -> TickOutcome {
        if let Some(sample) = hw.sample_feedback() {
            hw.set_gate_duty(self.regulator.step(sample));
        }

        let second_elapsed = self.keeper.advance_tick();
        if second_elapsed {
            self.render(hw);
        }

        let presses = self.buttons.scan(hw.sample_buttons());
        if !presses.is_empty() {
            for button in presses.iter() {
                match button {
                    Button::Hours => self.keeper.increment_hours(),
                    Button::Minutes => self.keeper.increment_minutes(),
                    Button::ClearSeconds => self.keeper.clear_seconds(),
                }
            }
            self.render(hw);
        }

        TickOutcome {
            second_elapsed,
            presses,
            duty: self.regulator.duty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Board {
        feedback: Option<u8>,
        buttons: [bool; 3],
        duty_writes: Vec<u16>,
        frames: Vec<DigitFrame>,
    }

    impl ClockHardware for Board {
        fn sample_feedback(&mut self) -> Option<u8> {
            self.feedback
        }

        fn sample_buttons(&mut self) -> [bool; 3] {
            self.buttons
        }

        fn set_gate_duty(&mut self, duty: u16) {
            self.duty_writes.push(duty);
        }

        fn show(&mut self, frame: &DigitFrame) {
            self.frames.push(*frame);
        }
    }

    fn time(h: u8, m: u8, s: u8) -> ClockTime {
        ClockTime::new(h, m, s).unwrap()
    }

    #[test]
    fn renders_once_per_second() {
        let mut ctx = ClockContext::new(&Config::DEFAULT);
        let mut board = Board::default();
        for _ in 0..77 {
            assert!(!ctx.on_tick(&mut board).second_elapsed);
        }
        assert!(board.frames.is_empty());
        assert!(ctx.on_tick(&mut board).second_elapsed);
        assert_eq!(board.frames, vec![DigitFrame::from_time(&time(0, 0, 1))]);
    }

    #[test]
    fn regulates_every_tick_with_a_sample() {
        let mut ctx = ClockContext::new(&Config::DEFAULT);
        let mut board = Board {
            feedback: Some(100),
            ..Board::default()
        };
        for _ in 0..5 {
            ctx.on_tick(&mut board);
        }
        assert_eq!(board.duty_writes, vec![1, 2, 3, 4, 5]);
        board.feedback = Some(200);
        assert_eq!(ctx.on_tick(&mut board).duty, 0);
        assert!(ctx.regulator().is_tripped());
    }

    #[test]
    fn missing_sample_leaves_gate_alone() {
        let mut ctx = ClockContext::new(&Config::DEFAULT);
        let mut board = Board::default();
        ctx.on_tick(&mut board);
        assert!(board.duty_writes.is_empty());
    }

    #[test]
    fn button_edges_edit_time_and_redraw() {
        let mut ctx = ClockContext::new(&Config::DEFAULT);
        ctx.set_time(time(5, 30, 10));
        let mut board = Board {
            buttons: [true, false, false],
            ..Board::default()
        };
        ctx.on_tick(&mut board);
        ctx.on_tick(&mut board);
        let outcome = ctx.on_tick(&mut board);
        assert!(outcome.presses.contains(Button::Hours));
        assert_eq!(ctx.time(), time(6, 30, 10));
        assert_eq!(board.frames, vec![DigitFrame::from_time(&time(6, 30, 10))]);

        // Held: nothing more happens.
        for _ in 0..10 {
            ctx.on_tick(&mut board);
        }
        assert_eq!(ctx.time(), time(6, 30, 10));
    }

    #[test]
    fn all_buttons_together() {
        let mut ctx = ClockContext::new(&Config::DEFAULT);
        ctx.set_time(time(23, 59, 45));
        let mut board = Board {
            buttons: [true; 3],
            ..Board::default()
        };
        for _ in 0..3 {
            ctx.on_tick(&mut board);
        }
        assert_eq!(ctx.time(), time(0, 0, 0));
    }

    #[test]
    fn explicit_render_shows_current_time() {
        let mut ctx = ClockContext::new(&Config::DEFAULT);
        ctx.set_time(time(7, 8, 9));
        let mut board = Board::default();
        ctx.render(&mut board);
        assert_eq!(board.frames[0].digits(), &[9, 0, 8, 0, 7, 0]);
    }
}

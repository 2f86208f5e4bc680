//! Pico wiring of the clock.
//!
//! GP2, GP3, GP4   buttons H, M, S-clear (active high, pulled down)
//! GP10            cathode shift register data
//! GP11            cathode shift register clock
//! GP12            cathode shift register latch (active low)
//! GP14 (PWM7 A)   boost converter MOSFET gate
//! GP26 (ADC0)     high-voltage feedback through a 100:1 divider

use embedded_hal::adc::OneShot;
use embedded_hal::digital::v2::InputPin;
use embedded_hal::PwmPin;
use nixie_clock::digits::DigitFrame;
use nixie_clock::display::ShiftRegisterDisplay;
use nixie_clock::regulator::FeedbackScale;
use nixie_clock::ClockHardware;
use rp_pico::hal::{
    adc::{Adc, AdcPin},
    gpio::{
        bank0::{Gpio10, Gpio11, Gpio12, Gpio2, Gpio26, Gpio3, Gpio4},
        FunctionSio, Pin, PullDown, PullNone, SioInput, SioOutput,
    },
    pwm::{Channel, FreeRunning, Pwm7, Slice, A},
    Timer,
};

pub type DataPin = Pin<Gpio10, FunctionSio<SioOutput>, PullDown>;
pub type ShiftClockPin = Pin<Gpio11, FunctionSio<SioOutput>, PullDown>;
pub type LatchPin = Pin<Gpio12, FunctionSio<SioOutput>, PullDown>;
pub type Tubes = ShiftRegisterDisplay<DataPin, ShiftClockPin, LatchPin, Timer>;

pub type ButtonPin<I> = Pin<I, FunctionSio<SioInput>, PullDown>;
pub type Buttons = (ButtonPin<Gpio2>, ButtonPin<Gpio3>, ButtonPin<Gpio4>);

pub type Gate = Channel<Slice<Pwm7, FreeRunning>, A>;
pub type FeedbackPin = AdcPin<Pin<Gpio26, FunctionSio<SioInput>, PullNone>>;

/// PWM7 wraps at this count; duty values are in the same units.
pub const GATE_PWM_TOP: u16 = 0xff;
/// 125 MHz / 5 / 256 gives the ~100 kHz switching frequency of the reference supply.
pub const GATE_PWM_DIV: u8 = 5;

pub struct Board {
    tubes: Tubes,
    buttons: Buttons,
    gate: Gate,
    adc: Adc,
    feedback: FeedbackPin,
    scale: FeedbackScale,
}

impl Board {
    pub fn new(
        tubes: Tubes,
        buttons: Buttons,
        gate: Gate,
        adc: Adc,
        feedback: FeedbackPin,
        scale: FeedbackScale,
    ) -> Self {
        Self {
            tubes,
            buttons,
            gate,
            adc,
            feedback,
            scale,
        }
    }
}

impl ClockHardware for Board {
    fn sample_feedback(&mut self) -> Option<u8> {
        let raw: u16 = self.adc.read(&mut self.feedback).ok()?;
        Some(self.scale.to_units(raw))
    }

    fn sample_buttons(&mut self) -> [bool; 3] {
        let (hours, minutes, seconds) = &self.buttons;
        [
            hours.is_high().unwrap_or(false),
            minutes.is_high().unwrap_or(false),
            seconds.is_high().unwrap_or(false),
        ]
    }

    fn set_gate_duty(&mut self, duty: u16) {
        self.gate.set_duty(duty.min(GATE_PWM_TOP));
    }

    fn show(&mut self, frame: &DigitFrame) {
        self.tubes.write_frame(frame);
    }
}

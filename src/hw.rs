use crate::digits::DigitFrame;

/// Everything the tick handler touches on the board.
pub trait ClockHardware {
    /// Feedback in 10 mV units at the ADC pin, `None` while no conversion is ready.
    fn sample_feedback(&mut self) -> Option<u8>;

    /// Button input levels in [`Button::ALL`](crate::buttons::Button::ALL)
    /// order, `true` when pressed.
    fn sample_buttons(&mut self) -> [bool; 3];

    fn set_gate_duty(&mut self, duty: u16);

    fn show(&mut self, frame: &DigitFrame);
}

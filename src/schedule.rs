/// Keeps the one-shot tick alarm on a fixed grid of a free-running 32-bit
/// microsecond counter. Delays are measured from the ideal deadline so
/// handler latency does not add up.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickScheduler {
    period_us: u32,
    deadline: u32,
    overruns: u32,
}

impl TickScheduler {
    pub const fn new(period_us: u32) -> Self {
        Self {
            period_us,
            deadline: 0,
            overruns: 0,
        }
    }

    pub const fn period_us(&self) -> u32 {
        self.period_us
    }

    /// Ticks that were lost because the handler ran more than a period late.
    pub const fn overruns(&self) -> u32 {
        self.overruns
    }

    /// Sets the first deadline one period out and returns the delay to arm.
    pub fn start(&mut self, now: u32) -> u32 {
        self.deadline = now.wrapping_add(self.period_us);
        self.period_us
    }

    /// Call when the alarm fires. Returns the delay to the next deadline.
    pub fn on_alarm(&mut self, now: u32) -> u32 {
        if self.period_us == 0 {
            self.deadline = now;
            return 0;
        }
        let late = now.wrapping_sub(self.deadline) as i32;
        let missed = if late > 0 {
            late as u32 / self.period_us
        } else {
            0
        };
        if missed > 0 {
            #[cfg(feature = "defmt")]
            defmt::warn!("tick handler {}us late, {} ticks lost", late, missed);
            self.overruns = self.overruns.saturating_add(missed);
        }
        self.deadline = self
            .deadline
            .wrapping_add(self.period_us.wrapping_mul(missed + 1));
        self.deadline.wrapping_sub(now)
    }
}

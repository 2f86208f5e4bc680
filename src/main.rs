#![no_std]
#![no_main]

use defmt_rtt as _;
#[cfg(not(feature = "panic-rtt"))]
use panic_halt as _;
#[cfg(feature = "panic-rtt")]
use panic_probe as _;
use rtic::app;

mod board;

use nixie_clock::clock::TickConfig;
use nixie_clock::{ClockContext, ClockTime, Config};

/// Alarm period of the tick interrupt: 78.125 Hz.
const TICK_PERIOD_US: u32 = 12_800;

const CONFIG: Config = Config {
    tick: match TickConfig::from_period_us(TICK_PERIOD_US) {
        Ok(tick) => tick,
        Err(_) => panic!("tick period cannot be drift-corrected"),
    },
    ..Config::DEFAULT
};

#[app(device = rp_pico::hal::pac, peripherals = true)]
mod app {
    use super::*;
    use crate::board::{Board, GATE_PWM_DIV, GATE_PWM_TOP};
    use embedded_hal::PwmPin;
    use nixie_clock::display::ShiftRegisterDisplay;
    use nixie_clock::schedule::TickScheduler;
    use rp_pico::hal::{
        adc::{Adc, AdcPin},
        clocks::init_clocks_and_plls,
        fugit::ExtU32,
        pwm::Slices,
        sio::Sio,
        timer::{Alarm, Alarm0, Timer},
        watchdog::Watchdog,
    };

    // Shared resources (accessed by multiple tasks)
    #[shared]
    struct Shared {
        clock: ClockContext,
    }

    // Local resources (accessed by single tasks)
    #[local]
    struct Local {
        board: Board,
        alarm: Alarm0,
        timer: Timer,
        scheduler: TickScheduler,
    }

    #[init]
    fn init(ctx: init::Context) -> (Shared, Local, init::Monotonics) {
        let mut pac = ctx.device;
        let mut watchdog = Watchdog::new(pac.WATCHDOG);
        let sio = Sio::new(pac.SIO);

        let external_xtal_freq_hz = 12_000_000u32;
        let clocks = init_clocks_and_plls(
            external_xtal_freq_hz,
            pac.XOSC,
            pac.CLOCKS,
            pac.PLL_SYS,
            pac.PLL_USB,
            &mut pac.RESETS,
            &mut watchdog,
        )
        .ok()
        .unwrap();

        CONFIG.validate().unwrap();

        let mut timer = Timer::new(pac.TIMER, &mut pac.RESETS, &clocks);

        let pins = rp_pico::Pins::new(
            pac.IO_BANK0,
            pac.PADS_BANK0,
            sio.gpio_bank0,
            &mut pac.RESETS,
        );

        // Gate first, and off, before anything can switch the boost converter.
        let mut pwm_slices = Slices::new(pac.PWM, &mut pac.RESETS);
        let mut pwm = pwm_slices.pwm7;
        pwm.set_top(GATE_PWM_TOP);
        pwm.set_div_int(GATE_PWM_DIV);
        pwm.enable();
        let mut gate = pwm.channel_a;
        gate.output_to(pins.gpio14);
        gate.set_duty(0);

        let adc = Adc::new(pac.ADC, &mut pac.RESETS);
        let feedback = AdcPin::new(pins.gpio26.into_floating_input()).ok().unwrap();

        let buttons = (
            pins.gpio2.into_pull_down_input(),
            pins.gpio3.into_pull_down_input(),
            pins.gpio4.into_pull_down_input(),
        );

        let tubes = ShiftRegisterDisplay::new(
            pins.gpio10.into_push_pull_output(),
            pins.gpio11.into_push_pull_output(),
            pins.gpio12.into_push_pull_output(),
            timer,
            CONFIG.display,
        );

        let mut board = Board::new(tubes, buttons, gate, adc, feedback, CONFIG.regulator.scale);

        let clock = ClockContext::new(&CONFIG);
        clock.render(&mut board);

        let mut scheduler = TickScheduler::new(TICK_PERIOD_US);
        let mut alarm = timer.alarm_0().unwrap();
        let first = scheduler.start(timer.get_counter_low());
        alarm.schedule(first.micros()).unwrap();
        alarm.enable_interrupt();

        defmt::info!(
            "nixie clock up: {} ticks/s, +1 tick every {} s",
            CONFIG.tick.ticks_per_second,
            CONFIG.tick.correction_interval
        );

        (
            Shared { clock },
            Local {
                board,
                alarm,
                timer,
                scheduler,
            },
            init::Monotonics(),
        )
    }

    // Hardware Task: the only interrupt, 78.125 Hz
    #[task(binds = TIMER_IRQ_0, priority = 1, shared = [clock], local = [alarm, timer, scheduler, board])]
    fn tick(mut ctx: tick::Context) {
        // Clear interrupt and schedule next
        let now = ctx.local.timer.get_counter_low();
        let delay = ctx.local.scheduler.on_alarm(now);
        ctx.local.alarm.clear_interrupt();
        ctx.local.alarm.schedule(delay.micros()).unwrap();

        let board = ctx.local.board;
        ctx.shared.clock.lock(|clock| {
            clock.on_tick(board);
        });
    }

    // Idle loop: reads the time under the lock so it never sees a torn value
    #[idle(shared = [clock])]
    fn idle(mut ctx: idle::Context) -> ! {
        let mut shown = ClockTime::MIDNIGHT;
        loop {
            let (now, tripped) = ctx
                .shared
                .clock
                .lock(|clock| (clock.time(), clock.regulator().is_tripped()));
            if now != shown {
                defmt::debug!("{=str} hv_cutoff={=bool}", now.to_hms().as_str(), tripped);
                shown = now;
            }
            cortex_m::asm::wfi();
        }
    }
}

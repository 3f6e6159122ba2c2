#![cfg_attr(target_arch = "avr", no_std)]
#![cfg_attr(target_arch = "avr", no_main)]
#![cfg_attr(target_arch = "avr", feature(abi_avr_interrupt))]

#[cfg(target_arch = "avr")]
mod firmware {
    use panic_halt as _;

    use avr_device::atmega2560::Peripherals;
    use avr_tick_scheduler::application::{Blink, Echo, Heartbeat, MotorSweep};
    use avr_tick_scheduler::config::{self, MAX_TASKS, TICK};
    use avr_tick_scheduler::drivers::{Led, Motor, SerialConsole};
    use avr_tick_scheduler::hal::{board::Pins, timer, Timebase, Timer3C, Uart};
    use avr_tick_scheduler::logger::Logger;
    use avr_tick_scheduler::rtos::{Callback, Scheduler, SchedulerError, TickSource, Ticks};
    use avr_tick_scheduler::{error, info};

    // Shared between the Timer0 vector and the dispatcher
    static TICKS: TickSource<MAX_TASKS> = TickSource::new(TICK);

    #[avr_device::interrupt(atmega2560)]
    fn TIMER0_COMPA() {
        TICKS.tick();
    }

    #[avr_device::interrupt(atmega2560)]
    fn TIMER0_OVF() {
        timer::reload(&TICK);
        TICKS.tick();
    }

    #[avr_device::entry]
    fn main() -> ! {
        let dp = Peripherals::take().unwrap();

        let uart = Uart::init(dp.USART0, config::UART_BAUD);
        let mut log = Logger::new(uart, config::LOG_LEVEL);

        // Timer runs from here on, but nothing fires until interrupts are enabled
        let _timebase = Timebase::init(dp.TC0, &TICK);

        let pins = Pins::take(dp.PORTB, dp.PORTE, dp.PORTH);
        let led = Led::new(pins.led).unwrap_or_else(|never| match never {});
        let motor = Motor::new(Timer3C::init(dp.TC3), pins.dir_a, pins.brake_a)
            .unwrap_or_else(|never| match never {});

        let mut blink = Blink::new(led);
        let mut sweep = MotorSweep::new(motor, config::MOTOR_RAMP_STEP);
        let mut echo = Echo::new(SerialConsole::new(uart));
        let mut heartbeat = Heartbeat::new(Logger::new(uart, config::LOG_LEVEL), &TICKS);

        let tasks: [(Callback, Ticks); 4] = [
            (Callback::bound(&mut blink), config::LED_PERIOD_MS),
            (Callback::bound(&mut sweep), config::MOTOR_PERIOD_MS),
            (Callback::bound(&mut echo), config::ECHO_PERIOD_MS),
            (Callback::bound(&mut heartbeat), config::HEARTBEAT_PERIOD_MS),
        ];

        let mut scheduler = Scheduler::new(&TICKS);
        for (callback, period) in tasks {
            if let Err(err) = scheduler.register(callback, period) {
                halt(&mut log, err);
            }
        }

        info!(
            log,
            0,
            "scheduler ready: {} tasks, tick {}us",
            scheduler.len(),
            TICK.interval_us(config::CPU_FREQ_HZ)
        );

        // SAFETY: registration is complete, the tick vector may now run
        unsafe { avr_device::interrupt::enable() };

        scheduler.run()
    }

    /// Misconfigured task table: report and refuse to start
    fn halt(log: &mut Logger<Uart>, err: SchedulerError) -> ! {
        error!(log, TICKS.now(), "task registration failed: {}", err);
        loop {
            avr_device::asm::sleep();
        }
    }
}

#[cfg(not(target_arch = "avr"))]
fn main() {}

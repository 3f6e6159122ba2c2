//! Application tasks registered with the scheduler
//!
//! Each task is a small state machine advanced once per activation. None of them blocks:
//! they touch their peripheral and return.

use embedded_hal::digital::v2::OutputPin;
use embedded_hal::serial::{Read, Write};
use embedded_hal::PwmPin;
use ufmt::uWrite;

use crate::drivers::{Direction, Led, Motor, SerialConsole};
use crate::logger::Logger;
use crate::rtos::{Runnable, TickSource};

/// Toggles the LED on every activation
pub struct Blink<P> {
    led: Led<P>,
    faults: u16,
}

impl<P: OutputPin> Blink<P> {
    pub fn new(led: Led<P>) -> Self {
        Self { led, faults: 0 }
    }

    pub fn led(&self) -> &Led<P> {
        &self.led
    }

    pub fn faults(&self) -> u16 {
        self.faults
    }
}

impl<P: OutputPin> Runnable for Blink<P> {
    fn run(&mut self) {
        if self.led.toggle().is_err() {
            self.faults = self.faults.saturating_add(1);
        }
    }
}

/// Triangle speed ramp: accelerate to full duty, slow down to zero, reverse, repeat
pub struct MotorSweep<PWM, DIR, BRAKE> {
    motor: Motor<PWM, DIR, BRAKE>,
    step: u8,
    speed: u8,
    rising: bool,
    faults: u16,
}

impl<PWM, DIR, BRAKE, E> MotorSweep<PWM, DIR, BRAKE>
where
    PWM: PwmPin<Duty = u8>,
    DIR: OutputPin<Error = E>,
    BRAKE: OutputPin<Error = E>,
{
    pub fn new(motor: Motor<PWM, DIR, BRAKE>, step: u8) -> Self {
        Self {
            motor,
            step: step.max(1),
            speed: 0,
            rising: true,
            faults: 0,
        }
    }

    pub fn motor(&self) -> &Motor<PWM, DIR, BRAKE> {
        &self.motor
    }

    pub fn faults(&self) -> u16 {
        self.faults
    }

    fn advance(&mut self) -> Result<(), E> {
        let max = self.motor.max_duty();
        if self.rising {
            self.speed = self.speed.saturating_add(self.step).min(max);
            if self.speed == max {
                self.rising = false;
            }
            self.motor.drive(self.motor.direction(), self.speed)
        } else {
            self.speed = self.speed.saturating_sub(self.step);
            if self.speed > 0 {
                self.motor.set_duty(self.speed);
                return Ok(());
            }
            // Zero crossing: brake, then ramp up the other way
            self.rising = true;
            let next = self.motor.direction().reversed();
            self.motor.stop()?;
            self.motor.drive(next, 0)
        }
    }
}

impl<PWM, DIR, BRAKE, E> Runnable for MotorSweep<PWM, DIR, BRAKE>
where
    PWM: PwmPin<Duty = u8>,
    DIR: OutputPin<Error = E>,
    BRAKE: OutputPin<Error = E>,
{
    fn run(&mut self) {
        if self.advance().is_err() {
            self.faults = self.faults.saturating_add(1);
        }
    }
}

/// Echoes serial input back, one byte per activation
pub struct Echo<S> {
    console: SerialConsole<S>,
    echoed: u32,
}

impl<S, E> Echo<S>
where
    S: Read<u8, Error = E> + Write<u8, Error = E>,
{
    pub fn new(console: SerialConsole<S>) -> Self {
        Self { console, echoed: 0 }
    }

    pub fn echoed(&self) -> u32 {
        self.echoed
    }

    pub fn into_console(self) -> SerialConsole<S> {
        self.console
    }
}

impl<S, E> Runnable for Echo<S>
where
    S: Read<u8, Error = E> + Write<u8, Error = E>,
{
    fn run(&mut self) {
        if self.console.echo().is_some() {
            self.echoed = self.echoed.wrapping_add(1);
        }
    }
}

/// Periodic status line with uptime and dropped activations
pub struct Heartbeat<'a, W, const N: usize> {
    logger: Logger<W>,
    ticks: &'a TickSource<N>,
    beats: u32,
}

impl<'a, W: uWrite, const N: usize> Heartbeat<'a, W, N> {
    pub fn new(logger: Logger<W>, ticks: &'a TickSource<N>) -> Self {
        Self {
            logger,
            ticks,
            beats: 0,
        }
    }

    pub fn beats(&self) -> u32 {
        self.beats
    }

    pub fn logger(&mut self) -> &mut Logger<W> {
        &mut self.logger
    }
}

impl<W: uWrite, const N: usize> Runnable for Heartbeat<'_, W, N> {
    fn run(&mut self) {
        self.beats = self.beats.wrapping_add(1);
        let now = self.ticks.now();
        let missed = self.ticks.total_missed();
        crate::info!(
            self.logger,
            now,
            "heartbeat {} tasks={} missed={}",
            self.beats,
            self.ticks.len(),
            missed
        );
        if missed > 0 {
            crate::debug!(self.logger, now, "task overrun detected");
        }
    }
}

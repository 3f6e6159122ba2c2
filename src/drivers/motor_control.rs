//! DC motor channel of the Arduino Motor Shield R3
//!
//! Each channel has a PWM speed input, a direction pin and a brake pin. Releasing the brake
//! and setting direction happen before the duty cycle changes, so the bridge never drives
//! against an engaged brake.

use embedded_hal::digital::v2::OutputPin;
use embedded_hal::PwmPin;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub fn reversed(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }
}

pub struct Motor<PWM, DIR, BRAKE> {
    pwm: PWM,
    dir: DIR,
    brake: BRAKE,
    direction: Direction,
    braking: bool,
}

impl<PWM, DIR, BRAKE, E> Motor<PWM, DIR, BRAKE>
where
    PWM: PwmPin<Duty = u8>,
    DIR: OutputPin<Error = E>,
    BRAKE: OutputPin<Error = E>,
{
    /// Starts stopped: brake engaged, duty 0, PWM output enabled
    pub fn new(mut pwm: PWM, dir: DIR, mut brake: BRAKE) -> Result<Self, E> {
        pwm.set_duty(0);
        pwm.enable();
        brake.set_high()?;
        Ok(Self {
            pwm,
            dir,
            brake,
            direction: Direction::Forward,
            braking: true,
        })
    }

    pub fn forward(&mut self, speed: u8) -> Result<(), E> {
        self.drive(Direction::Forward, speed)
    }

    pub fn backward(&mut self, speed: u8) -> Result<(), E> {
        self.drive(Direction::Backward, speed)
    }

    pub fn drive(&mut self, direction: Direction, speed: u8) -> Result<(), E> {
        self.brake.set_low()?;
        self.braking = false;
        match direction {
            Direction::Forward => self.dir.set_high()?,
            Direction::Backward => self.dir.set_low()?,
        }
        self.direction = direction;
        self.set_duty(speed);
        Ok(())
    }

    /// Engage the brake and drop the duty to 0
    pub fn stop(&mut self) -> Result<(), E> {
        self.brake.set_high()?;
        self.braking = true;
        self.set_duty(0);
        Ok(())
    }

    /// Set speed without touching direction or brake, clamped to the PWM maximum
    pub fn set_duty(&mut self, duty: u8) {
        let duty = duty.min(self.pwm.get_max_duty());
        self.pwm.set_duty(duty);
    }

    pub fn duty(&self) -> u8 {
        self.pwm.get_duty()
    }

    pub fn max_duty(&self) -> u8 {
        self.pwm.get_max_duty()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_braking(&self) -> bool {
        self.braking
    }

    pub fn release(self) -> (PWM, DIR, BRAKE) {
        (self.pwm, self.dir, self.brake)
    }
}

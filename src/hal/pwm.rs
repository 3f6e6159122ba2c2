//! Motor shield PWM outputs
//!
//! Timer3 drives OC3C (motor A, D3) in fast PWM mode 14 (TOP = ICR3) with TOP = 255 and a /8
//! prescaler: 16MHz / 8 / 256 ≈ 7.8kHz.

use avr_device::atmega2560::TC3;
use embedded_hal::PwmPin;

/// Duty cycle resolution
pub const PWM_MAX: u8 = 255;

// TCCRnA: WGMn1
const WGM_A: u8 = 1 << 1;
// TCCRnB: WGMn3 | WGMn2 | CSn1
const WGM_B_DIV8: u8 = (1 << 4) | (1 << 3) | (1 << 1);
// COM3C1: clear on compare match, non-inverting
const COM3C1: u8 = 1 << 3;

/// OC3C output, motor A
pub struct Timer3C {
    tc3: TC3,
    duty: u8,
}

impl Timer3C {
    pub fn init(tc3: TC3) -> Self {
        // SAFETY: raw mode bits for fast PWM with ICR3 as TOP, output left disconnected
        unsafe {
            tc3.tccr3a.write(|w| w.bits(WGM_A));
            tc3.tccr3b.write(|w| w.bits(WGM_B_DIV8));
            tc3.icr3.write(|w| w.bits(PWM_MAX as u16));
            tc3.ocr3c.write(|w| w.bits(0));
        }
        Self { tc3, duty: 0 }
    }
}

impl PwmPin for Timer3C {
    type Duty = u8;

    fn disable(&mut self) {
        self.tc3
            .tccr3a
            .modify(|r, w| unsafe { w.bits(r.bits() & !COM3C1) });
    }

    fn enable(&mut self) {
        self.tc3
            .tccr3a
            .modify(|r, w| unsafe { w.bits(r.bits() | COM3C1) });
    }

    fn get_duty(&self) -> u8 {
        self.duty
    }

    fn get_max_duty(&self) -> u8 {
        PWM_MAX
    }

    fn set_duty(&mut self, duty: u8) {
        self.duty = duty;
        self.tc3.ocr3c.write(|w| unsafe { w.bits(duty as u16) });
    }
}

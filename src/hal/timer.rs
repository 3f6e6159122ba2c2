//! Timer0 as the system tick source

use avr_device::atmega2560::TC0;

use crate::rtos::{TickConfig, TimerMode};

/// Timer0 programmed for the system tick. Owning it keeps anyone else from reconfiguring TC0.
pub struct Timebase {
    _tc0: TC0,
}

impl Timebase {
    /// Program TC0 and unmask its tick interrupt. Global interrupts stay disabled until the
    /// caller enables them after task registration.
    pub fn init(tc0: TC0, config: &TickConfig) -> Self {
        tc0.timsk0.reset();
        match config.mode {
            TimerMode::CompareMatch { prescaler, compare } => {
                // CTC: counter clears on OCR0A
                tc0.tccr0a.write(|w| w.wgm0().bits(0b10));
                tc0.ocr0a.write(|w| unsafe { w.bits(compare) });
                tc0.tcnt0.write(|w| unsafe { w.bits(0) });
                tc0.tccr0b.write(|w| w.cs0().bits(prescaler.clock_select()));
                tc0.timsk0.write(|w| w.ocie0a().set_bit());
            }
            TimerMode::OverflowReload { prescaler, reload } => {
                tc0.tccr0a.write(|w| w.wgm0().bits(0b00));
                tc0.tcnt0.write(|w| unsafe { w.bits(reload) });
                tc0.tccr0b.write(|w| w.cs0().bits(prescaler.clock_select()));
                tc0.timsk0.write(|w| w.toie0().set_bit());
            }
        }

        Self { _tc0: tc0 }
    }
}

/// Restart the count from the reload value. Called first thing in the TIMER0_OVF vector.
#[inline(always)]
pub fn reload(config: &TickConfig) {
    if let TimerMode::OverflowReload { reload, .. } = config.mode {
        // SAFETY: single byte write to TCNT0, only done from the overflow vector
        unsafe {
            (*TC0::ptr()).tcnt0.write(|w| w.bits(reload));
        }
    }
}

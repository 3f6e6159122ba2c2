//! Hardware tick interval configuration for the 8-bit Timer0.
//!
//! Two timer modes produce the system tick:
//! - compare-match (CTC): the counter clears itself on OCR0A, no reload needed
//! - overflow-reload: normal mode, the overflow vector writes the reload value back to TCNT0
//!
//! Both are described by a [`TickConfig`] computed at compile time from the CPU frequency.

use super::Ticks;

/// Timer0 clock prescaler
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Prescaler {
    Div1,
    Div8,
    Div64,
    Div256,
    Div1024,
}

const PRESCALERS: [Prescaler; 5] = [
    Prescaler::Div1,
    Prescaler::Div8,
    Prescaler::Div64,
    Prescaler::Div256,
    Prescaler::Div1024,
];

impl Prescaler {
    pub const fn divisor(self) -> u32 {
        match self {
            Prescaler::Div1 => 1,
            Prescaler::Div8 => 8,
            Prescaler::Div64 => 64,
            Prescaler::Div256 => 256,
            Prescaler::Div1024 => 1024,
        }
    }

    /// CS02:0 bits of TCCR0B
    pub const fn clock_select(self) -> u8 {
        match self {
            Prescaler::Div1 => 0b001,
            Prescaler::Div8 => 0b010,
            Prescaler::Div64 => 0b011,
            Prescaler::Div256 => 0b100,
            Prescaler::Div1024 => 0b101,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerMode {
    /// CTC mode, interrupt on OCR0A match
    CompareMatch { prescaler: Prescaler, compare: u8 },
    /// Normal mode, interrupt on overflow, TCNT0 reloaded by the handler
    OverflowReload { prescaler: Prescaler, reload: u8 },
}

impl TimerMode {
    pub const fn prescaler(&self) -> Prescaler {
        match *self {
            TimerMode::CompareMatch { prescaler, .. } => prescaler,
            TimerMode::OverflowReload { prescaler, .. } => prescaler,
        }
    }

    /// Timer counts between two interrupts
    pub const fn counts(&self) -> u32 {
        match *self {
            TimerMode::CompareMatch { compare, .. } => compare as u32 + 1,
            TimerMode::OverflowReload { reload, .. } => 256 - reload as u32,
        }
    }
}

/// System-wide tick configuration, fixed at startup
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickConfig {
    /// Clock increment per interrupt, in milliseconds
    pub step: Ticks,
    pub mode: TimerMode,
    /// Whether period 0 (run every dispatcher pass) is accepted
    pub continuous: bool,
}

impl TickConfig {
    /// CTC timebase. 1ms at 16MHz gives prescaler 64 and OCR0A = 249.
    pub const fn compare_match(cpu_hz: u32, tick_ms: u32) -> Self {
        let (prescaler, counts) = select_prescaler(cpu_hz, tick_ms);
        Self {
            step: tick_ms,
            mode: TimerMode::CompareMatch {
                prescaler,
                compare: (counts - 1) as u8,
            },
            continuous: true,
        }
    }

    /// Overflow timebase with a precomputed TCNT0 reload value
    pub const fn overflow_reload(cpu_hz: u32, tick_ms: u32) -> Self {
        let (prescaler, counts) = select_prescaler(cpu_hz, tick_ms);
        Self {
            step: tick_ms,
            mode: TimerMode::OverflowReload {
                prescaler,
                reload: (256 - counts) as u8,
            },
            continuous: true,
        }
    }

    pub const fn without_continuous(mut self) -> Self {
        self.continuous = false;
        self
    }

    /// Tick interval the timer actually produces, in microseconds
    pub const fn interval_us(&self, cpu_hz: u32) -> u32 {
        let cycles = self.mode.counts() as u64 * self.mode.prescaler().divisor() as u64;
        (cycles * 1_000_000 / cpu_hz as u64) as u32
    }
}

/// Smallest prescaler whose tick count fits the 8-bit counter
const fn select_prescaler(cpu_hz: u32, tick_ms: u32) -> (Prescaler, u32) {
    assert!(tick_ms > 0, "tick interval must be at least 1ms");
    let mut i = 0;
    while i < PRESCALERS.len() {
        let prescaler = PRESCALERS[i];
        let counts = (cpu_hz / prescaler.divisor()) as u64 * tick_ms as u64 / 1000;
        if counts >= 1 && counts <= 256 {
            return (prescaler, counts as u32);
        }
        i += 1;
    }
    panic!("tick interval not reachable with Timer0");
}

//! Configuration constants for the ATmega2560 firmware

use crate::logger::Level;
use crate::rtos::{Ticks, TickConfig};

/// CPU frequency in Hz, set by build.rs (override with `MCU_FREQ_HZ`)
pub const CPU_FREQ_HZ: u32 = parse_hz(env!("MCU_FREQ_HZ"));

/// UART baud rate
pub const UART_BAUD: u32 = 115_200;

/// Size of the task table
pub const MAX_TASKS: usize = 10;

/// System tick: 1ms compare-match with continuous tasks
#[cfg(not(feature = "coarse-tick"))]
pub const TICK: TickConfig = TickConfig::compare_match(CPU_FREQ_HZ, 1);

/// System tick: 10ms overflow-reload, no continuous tasks
#[cfg(feature = "coarse-tick")]
pub const TICK: TickConfig = TickConfig::overflow_reload(CPU_FREQ_HZ, 10).without_continuous();

#[cfg(not(feature = "debug"))]
pub const LOG_LEVEL: Level = Level::Info;

#[cfg(feature = "debug")]
pub const LOG_LEVEL: Level = Level::Debug;

/// Onboard LED toggle period in milliseconds
pub const LED_PERIOD_MS: Ticks = 1000;

/// Motor ramp update period in milliseconds
pub const MOTOR_PERIOD_MS: Ticks = 10;

/// Duty change per motor ramp update
pub const MOTOR_RAMP_STEP: u8 = 1;

/// Heartbeat log period in milliseconds
pub const HEARTBEAT_PERIOD_MS: Ticks = 5000;

/// Serial echo runs on every dispatcher pass when continuous tasks are available
#[cfg(not(feature = "coarse-tick"))]
pub const ECHO_PERIOD_MS: Ticks = 0;

#[cfg(feature = "coarse-tick")]
pub const ECHO_PERIOD_MS: Ticks = 10;

const fn parse_hz(s: &str) -> u32 {
    let bytes = s.as_bytes();
    let mut value: u32 = 0;
    let mut i = 0;
    while i < bytes.len() {
        let digit = bytes[i];
        assert!(digit.is_ascii_digit(), "MCU_FREQ_HZ is not a number");
        value = value * 10 + (digit - b'0') as u32;
        i += 1;
    }
    value
}

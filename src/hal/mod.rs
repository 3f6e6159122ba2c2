pub mod buffer;

#[cfg(target_arch = "avr")]
pub mod gpio;
#[cfg(target_arch = "avr")]
pub mod pwm;
#[cfg(target_arch = "avr")]
pub mod timer;
#[cfg(target_arch = "avr")]
pub mod uart;

// Re-export commonly used types
pub use buffer::Buffer;
#[cfg(target_arch = "avr")]
pub use gpio::{board, Output, Pin};
#[cfg(target_arch = "avr")]
pub use pwm::{Timer3C, PWM_MAX};
#[cfg(target_arch = "avr")]
pub use timer::Timebase;
#[cfg(target_arch = "avr")]
pub use uart::Uart;

pub mod led;
pub mod motor_control;
pub mod serial_console;

pub use led::Led;
pub use motor_control::{Direction, Motor};
pub use serial_console::SerialConsole;

//! Tick-stamped serial logging
//!
//! Lines look like `[1500] INFO motor ramp up`. Formatting goes through `ufmt`, which keeps
//! `core::fmt` (and its flash footprint) out of the firmware.

use ufmt::{uWrite, uwrite};

use crate::rtos::Ticks;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
}

impl Level {
    pub const fn label(self) -> &'static str {
        match self {
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
        }
    }
}

pub struct Logger<W> {
    sink: W,
    max_level: Level,
}

impl<W: uWrite> Logger<W> {
    pub const fn new(sink: W, max_level: Level) -> Self {
        Self { sink, max_level }
    }

    #[inline]
    pub fn enabled(&self, level: Level) -> bool {
        level <= self.max_level
    }

    pub fn set_level(&mut self, max_level: Level) {
        self.max_level = max_level;
    }

    /// Write the line prefix and hand out the sink for the message,
    /// or `None` if `level` is filtered out or the sink failed.
    pub fn begin(&mut self, level: Level, now: Ticks) -> Option<&mut W> {
        if !self.enabled(level) {
            return None;
        }
        uwrite!(self.sink, "[{}] {} ", now, level.label()).ok()?;
        Some(&mut self.sink)
    }

    pub fn sink(&mut self) -> &mut W {
        &mut self.sink
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}

/// `log!(logger, level, now, "format {}", args...)`
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $now:expr, $($arg:tt)+) => {
        if let Some(sink) = $logger.begin($level, $now) {
            let _ = ufmt::uwriteln!(sink, $($arg)+);
        }
    };
}

#[macro_export]
macro_rules! error {
    ($logger:expr, $now:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::logger::Level::Error, $now, $($arg)+)
    };
}

#[macro_export]
macro_rules! warn {
    ($logger:expr, $now:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::logger::Level::Warn, $now, $($arg)+)
    };
}

#[macro_export]
macro_rules! info {
    ($logger:expr, $now:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::logger::Level::Info, $now, $($arg)+)
    };
}

#[macro_export]
macro_rules! debug {
    ($logger:expr, $now:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::logger::Level::Debug, $now, $($arg)+)
    };
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use core::convert::Infallible;

    /// Collects everything written to it
    #[derive(Default)]
    pub(crate) struct Capture(pub(crate) String);

    impl uWrite for Capture {
        type Error = Infallible;

        fn write_str(&mut self, s: &str) -> Result<(), Infallible> {
            self.0.push_str(s);
            Ok(())
        }
    }

    #[test]
    fn lines_carry_tick_and_level() {
        let mut logger = Logger::new(Capture::default(), Level::Info);
        crate::info!(logger, 1500, "motor duty {}", 42u8);
        crate::error!(logger, 1501, "halt");
        assert_eq!(
            logger.into_inner().0,
            "[1500] INFO motor duty 42\n[1501] ERROR halt\n"
        );
    }

    #[test]
    fn levels_above_maximum_are_dropped() {
        let mut logger = Logger::new(Capture::default(), Level::Warn);
        crate::debug!(logger, 1, "noise");
        crate::info!(logger, 2, "noise");
        crate::warn!(logger, 3, "kept");
        assert_eq!(logger.sink().0, "[3] WARN kept\n");

        logger.set_level(Level::Debug);
        crate::debug!(logger, 4, "now visible");
        assert!(logger.sink().0.ends_with("[4] DEBUG now visible\n"));
    }

    #[test]
    fn scheduler_errors_are_displayable() {
        let mut logger = Logger::new(Capture::default(), Level::Error);
        let err = crate::rtos::SchedulerError::CapacityExceeded;
        crate::error!(logger, 0, "register failed: {}", err);
        assert_eq!(logger.sink().0, "[0] ERROR register failed: task table full\n");
    }
}

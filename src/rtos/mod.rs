//! Cooperative time-sliced task scheduler.
//!
//! A timer interrupt advances the system clock and marks periodic tasks as due
//! ([`TickSource::tick`]); the main loop runs whatever is marked ([`Scheduler::run`]).
//! Nothing here preempts a task: a task body runs to completion before the next one starts.

pub mod scheduler;
pub mod task;
pub mod tick;
pub mod timebase;

pub use scheduler::Scheduler;
pub use task::{Callback, Runnable, TaskId, TaskStats};
pub use tick::TickSource;
pub use timebase::{Prescaler, TickConfig, TimerMode};

use ufmt::derive::uDebug;

/// System clock unit (milliseconds), wraps around at `u32::MAX`
pub type Ticks = u32;

/// Longest accepted period. Deadlines are compared in the signed half range of the clock.
pub const MAX_PERIOD: Ticks = Ticks::MAX / 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, uDebug)]
pub enum SchedulerError {
    /// The task table is full
    CapacityExceeded,
    /// Period larger than [`MAX_PERIOD`]
    PeriodTooLong,
    /// Period 0 on a timebase configured without continuous tasks
    ContinuousUnsupported,
}

impl SchedulerError {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SchedulerError::CapacityExceeded => "task table full",
            SchedulerError::PeriodTooLong => "period too long",
            SchedulerError::ContinuousUnsupported => "continuous tasks disabled",
        }
    }
}

impl ufmt::uDisplay for SchedulerError {
    fn fmt<W>(&self, f: &mut ufmt::Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: ufmt::uWrite + ?Sized,
    {
        f.write_str(self.as_str())
    }
}

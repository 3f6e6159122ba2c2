use super::Ticks;

/// A unit of work the dispatcher can invoke.
///
/// Implemented for every `FnMut()` closure, so tasks can close over their own context:
///
/// ```
/// use avr_tick_scheduler::rtos::Runnable;
///
/// let mut count = 0u32;
/// let mut task = || count += 1;
/// task.run();
/// ```
pub trait Runnable {
    fn run(&mut self);
}

impl<F: FnMut()> Runnable for F {
    fn run(&mut self) {
        self()
    }
}

/// Callback held by a task table entry
pub enum Callback<'a> {
    /// Stateless procedure
    Fn(fn()),
    /// Task with bound context
    Bound(&'a mut dyn Runnable),
}

impl<'a> Callback<'a> {
    pub fn from_fn(function: fn()) -> Self {
        Callback::Fn(function)
    }

    pub fn bound(task: &'a mut dyn Runnable) -> Self {
        Callback::Bound(task)
    }

    #[inline]
    pub fn invoke(&mut self) {
        match self {
            Callback::Fn(function) => function(),
            Callback::Bound(task) => task.run(),
        }
    }
}

/// Position of a task in the table, which is also its dispatch order
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct TaskId(pub(crate) u8);

impl TaskId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TaskStats {
    pub period: Ticks,
    /// Completed dispatches
    pub runs: u32,
    /// Activations lost to overruns or stalls
    pub missed: u16,
}

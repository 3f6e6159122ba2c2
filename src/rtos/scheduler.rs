//! Task table registration and the main-loop dispatcher

use super::task::{Callback, TaskId, TaskStats};
use super::tick::TickSource;
use super::{SchedulerError, Ticks};

struct Entry<'a> {
    callback: Callback<'a>,
    runs: u32,
}

/// Fixed-capacity table of periodic tasks, dispatched in registration order.
///
/// The scheduler owns the callbacks; deadlines and ready flags live in the [`TickSource`]
/// it borrows, which is the only part the timer interrupt touches.
pub struct Scheduler<'a, const N: usize> {
    ticks: &'a TickSource<N>,
    tasks: [Option<Entry<'a>>; N],
    passes: u32,
}

impl<'a, const N: usize> Scheduler<'a, N> {
    pub fn new(ticks: &'a TickSource<N>) -> Self {
        Self {
            ticks,
            tasks: core::array::from_fn(|_| None),
            passes: 0,
        }
    }

    /// Add a task running every `period` ticks, or on every pass if `period` is 0.
    ///
    /// Call before the tick interrupt is enabled. A full table is reported as
    /// [`SchedulerError::CapacityExceeded`] and leaves existing tasks untouched.
    pub fn register(
        &mut self,
        callback: Callback<'a>,
        period: Ticks,
    ) -> Result<TaskId, SchedulerError> {
        let id = self.ticks.admit(period)?;
        self.tasks[id.index()] = Some(Entry { callback, runs: 0 });
        Ok(id)
    }

    /// One dispatcher pass: run every ready task once, in registration order.
    /// Returns the number of tasks that ran.
    pub fn dispatch(&mut self) -> usize {
        let mut executed = 0;
        for (index, entry) in self.tasks.iter_mut().enumerate() {
            let Some(entry) = entry else {
                continue;
            };
            // The flag is taken before the body runs so a tick during the call is kept
            if self.ticks.claim(TaskId(index as u8)) {
                entry.callback.invoke();
                entry.runs = entry.runs.wrapping_add(1);
                executed += 1;
            }
        }
        self.passes = self.passes.wrapping_add(1);
        executed
    }

    /// Dispatch forever. Tasks must return quickly; a slow task delays every task after it.
    pub fn run(&mut self) -> ! {
        loop {
            self.dispatch();
        }
    }

    pub fn stats(&self, id: TaskId) -> Option<TaskStats> {
        let entry = self.tasks.get(id.index())?.as_ref()?;
        Some(TaskStats {
            period: self.ticks.period(id)?,
            runs: entry.runs,
            missed: self.ticks.missed(id),
        })
    }

    pub fn len(&self) -> usize {
        self.tasks.iter().filter(|entry| entry.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Completed dispatcher passes
    pub fn passes(&self) -> u32 {
        self.passes
    }
}

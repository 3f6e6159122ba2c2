//! System clock and the interrupt-shared half of the task table.

use core::cell::RefCell;

use critical_section::Mutex;

use super::task::TaskId;
use super::{SchedulerError, TickConfig, Ticks, MAX_PERIOD};

/// Timing state of one task. `ready` and `next_deadline` are written by the tick interrupt,
/// `ready` is cleared by the dispatcher.
#[derive(Clone, Copy)]
struct Slot {
    period: Ticks,
    next_deadline: Ticks,
    ready: bool,
    missed: u16,
}

impl Slot {
    const EMPTY: Slot = Slot {
        period: 0,
        next_deadline: 0,
        ready: false,
        missed: 0,
    };

    #[inline]
    fn is_continuous(&self) -> bool {
        self.period == 0
    }

    fn poll(&mut self, now: Ticks) {
        if self.is_continuous() {
            return;
        }

        // Wrap-safe `now >= next_deadline`
        let late = now.wrapping_sub(self.next_deadline);
        if late > MAX_PERIOD {
            return;
        }

        let mut lost = late / self.period;
        if self.ready {
            // Previous activation never got dispatched
            lost += 1;
        }
        self.missed = self.missed.saturating_add(lost.min(u16::MAX as Ticks) as u16);

        // Re-base from the current clock: one run, no backlog
        self.ready = true;
        self.next_deadline = now.wrapping_add(self.period);
    }
}

struct Timeline<const N: usize> {
    clock: Ticks,
    slots: [Slot; N],
    len: usize,
}

/// Monotonic tick counter plus per-task deadlines and ready flags.
///
/// Lives in a `static` shared by the timer interrupt and the main loop; all access goes
/// through a critical section, so multi-byte fields are never observed half-written.
pub struct TickSource<const N: usize> {
    config: TickConfig,
    timeline: Mutex<RefCell<Timeline<N>>>,
}

impl<const N: usize> TickSource<N> {
    pub const fn new(config: TickConfig) -> Self {
        Self {
            config,
            timeline: Mutex::new(RefCell::new(Timeline {
                clock: 0,
                slots: [Slot::EMPTY; N],
                len: 0,
            })),
        }
    }

    #[inline]
    pub fn config(&self) -> &TickConfig {
        &self.config
    }

    /// Interrupt body: advance the clock by one tick and mark due tasks
    #[inline]
    pub fn tick(&self) {
        self.advance(self.config.step);
    }

    /// Advance the clock by `elapsed` and mark every task whose deadline has passed.
    ///
    /// All tasks are checked against the same clock value. A task that is several periods
    /// late becomes ready once and its next deadline is taken from the current clock.
    /// Jumps longer than [`MAX_PERIOD`] are applied in `MAX_PERIOD` steps so no deadline is
    /// skipped by the wrap-safe comparison.
    pub fn advance(&self, elapsed: Ticks) {
        critical_section::with(|cs| {
            let mut timeline = self.timeline.borrow_ref_mut(cs);
            let timeline = &mut *timeline;
            let mut remaining = elapsed;
            loop {
                let step = remaining.min(MAX_PERIOD);
                timeline.clock = timeline.clock.wrapping_add(step);
                let now = timeline.clock;
                for slot in timeline.slots[..timeline.len].iter_mut() {
                    slot.poll(now);
                }
                remaining -= step;
                if remaining == 0 {
                    break;
                }
            }
        })
    }

    pub fn now(&self) -> Ticks {
        critical_section::with(|cs| self.timeline.borrow_ref(cs).clock)
    }

    /// Number of registered tasks
    pub fn len(&self) -> usize {
        critical_section::with(|cs| self.timeline.borrow_ref(cs).len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_ready(&self, id: TaskId) -> bool {
        self.read_slot(id, |slot| slot.ready).unwrap_or(false)
    }

    pub fn next_deadline(&self, id: TaskId) -> Option<Ticks> {
        self.read_slot(id, |slot| slot.next_deadline)
    }

    pub fn period(&self, id: TaskId) -> Option<Ticks> {
        self.read_slot(id, |slot| slot.period)
    }

    /// Activations of `id` dropped because it was still pending or the clock skipped periods
    pub fn missed(&self, id: TaskId) -> u16 {
        self.read_slot(id, |slot| slot.missed).unwrap_or(0)
    }

    pub fn total_missed(&self) -> u32 {
        critical_section::with(|cs| {
            let timeline = self.timeline.borrow_ref(cs);
            timeline.slots[..timeline.len]
                .iter()
                .map(|slot| slot.missed as u32)
                .sum()
        })
    }

    /// Append a task. The first activation of a periodic task is one full period from now;
    /// a continuous task (period 0) starts ready and stays ready.
    pub(crate) fn admit(&self, period: Ticks) -> Result<TaskId, SchedulerError> {
        if period > MAX_PERIOD {
            return Err(SchedulerError::PeriodTooLong);
        }
        if period == 0 && !self.config.continuous {
            return Err(SchedulerError::ContinuousUnsupported);
        }

        critical_section::with(|cs| {
            let mut timeline = self.timeline.borrow_ref_mut(cs);
            if timeline.len >= N || timeline.len > u8::MAX as usize {
                return Err(SchedulerError::CapacityExceeded);
            }

            let index = timeline.len;
            let next_deadline = timeline.clock.wrapping_add(period);
            timeline.slots[index] = Slot {
                period,
                next_deadline,
                ready: period == 0,
                missed: 0,
            };
            timeline.len += 1;
            Ok(TaskId(index as u8))
        })
    }

    /// Take a pending activation. Periodic tasks go back to idle, continuous tasks stay ready.
    pub(crate) fn claim(&self, id: TaskId) -> bool {
        critical_section::with(|cs| {
            let mut timeline = self.timeline.borrow_ref_mut(cs);
            if id.index() >= timeline.len {
                return false;
            }
            let slot = &mut timeline.slots[id.index()];
            if !slot.ready {
                return false;
            }
            if !slot.is_continuous() {
                slot.ready = false;
            }
            true
        })
    }

    fn read_slot<T>(&self, id: TaskId, read: impl FnOnce(&Slot) -> T) -> Option<T> {
        critical_section::with(|cs| {
            let timeline = self.timeline.borrow_ref(cs);
            timeline.slots[..timeline.len].get(id.index()).map(read)
        })
    }

    #[cfg(test)]
    pub(crate) fn set_clock(&self, ticks: Ticks) {
        critical_section::with(|cs| self.timeline.borrow_ref_mut(cs).clock = ticks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS_1: TickConfig = TickConfig::compare_match(16_000_000, 1);

    #[test]
    fn first_activation_after_one_period() {
        let ticks: TickSource<4> = TickSource::new(MS_1);
        let id = ticks.admit(5).unwrap();
        assert_eq!(ticks.next_deadline(id), Some(5));

        for _ in 0..4 {
            ticks.tick();
            assert!(!ticks.is_ready(id));
        }
        ticks.tick();
        assert!(ticks.is_ready(id));
        assert_eq!(ticks.next_deadline(id), Some(10));
    }

    #[test]
    fn continuous_task_starts_ready_and_is_never_polled() {
        let ticks: TickSource<4> = TickSource::new(MS_1);
        let id = ticks.admit(0).unwrap();
        assert!(ticks.is_ready(id));
        for _ in 0..100 {
            ticks.tick();
        }
        assert!(ticks.claim(id));
        assert!(ticks.claim(id));
        assert_eq!(ticks.next_deadline(id), Some(0));
        assert_eq!(ticks.missed(id), 0);
    }

    #[test]
    fn claim_clears_periodic_ready_flag() {
        let ticks: TickSource<4> = TickSource::new(MS_1);
        let id = ticks.admit(1).unwrap();
        assert!(!ticks.claim(id));
        ticks.tick();
        assert!(ticks.claim(id));
        assert!(!ticks.claim(id));
    }

    #[test]
    fn clock_advances_by_configured_step() {
        let config = TickConfig::overflow_reload(16_000_000, 10);
        let ticks: TickSource<2> = TickSource::new(config);
        ticks.tick();
        ticks.tick();
        assert_eq!(ticks.now(), 20);
    }

    #[test]
    fn stall_fires_once_and_rebases_from_current_clock() {
        let ticks: TickSource<2> = TickSource::new(MS_1);
        let id = ticks.admit(10).unwrap();

        // Interrupt delayed: 35ms pass in one go
        ticks.advance(35);
        assert!(ticks.claim(id));
        assert!(!ticks.claim(id));
        assert_eq!(ticks.next_deadline(id), Some(45));
        // deadlines 20 and 30 were skipped
        assert_eq!(ticks.missed(id), 2);
    }

    #[test]
    fn jump_longer_than_half_range_still_marks_due() {
        let ticks: TickSource<2> = TickSource::new(MS_1);
        let id = ticks.admit(10).unwrap();

        ticks.advance(MAX_PERIOD + 20);
        assert_eq!(ticks.now(), MAX_PERIOD + 20);
        assert!(ticks.is_ready(id));
        assert_eq!(ticks.next_deadline(id), Some(MAX_PERIOD + 30));
        assert_eq!(ticks.missed(id), u16::MAX);
    }

    #[test]
    fn repeated_due_without_dispatch_counts_as_missed() {
        let ticks: TickSource<2> = TickSource::new(MS_1);
        let id = ticks.admit(2).unwrap();
        for _ in 0..6 {
            ticks.tick();
        }
        assert!(ticks.is_ready(id));
        // Due at 2, 4 and 6, only one activation pending
        assert_eq!(ticks.missed(id), 2);
        assert_eq!(ticks.total_missed(), 2);
    }

    #[test]
    fn deadline_set_before_wrap_fires_after_wrap() {
        let ticks: TickSource<2> = TickSource::new(MS_1);
        ticks.set_clock(Ticks::MAX - 1);
        let id = ticks.admit(4).unwrap();
        assert_eq!(ticks.next_deadline(id), Some(2));

        // MAX, 0, 1: naive `now >= deadline` would already fire at MAX
        for _ in 0..3 {
            ticks.tick();
            assert!(!ticks.is_ready(id), "fired early at {}", ticks.now());
        }
        ticks.tick();
        assert_eq!(ticks.now(), 2);
        assert!(ticks.is_ready(id));
        assert_eq!(ticks.missed(id), 0);
    }

    #[test]
    fn period_keeps_exact_spacing_across_wrap() {
        let ticks: TickSource<2> = TickSource::new(MS_1);
        ticks.set_clock(Ticks::MAX - 5);
        let id = ticks.admit(3).unwrap();

        let mut fired_at = [0; 3];
        let mut fired = 0;
        for _ in 0..9 {
            ticks.tick();
            if ticks.claim(id) {
                fired_at[fired] = ticks.now();
                fired += 1;
            }
        }
        assert_eq!(fired, 3);
        assert_eq!(fired_at, [Ticks::MAX - 2, 0, 3]);
    }

    #[test]
    fn registration_errors() {
        let ticks: TickSource<1> = TickSource::new(MS_1.without_continuous());
        assert_eq!(ticks.admit(0), Err(SchedulerError::ContinuousUnsupported));
        assert_eq!(
            ticks.admit(MAX_PERIOD + 1),
            Err(SchedulerError::PeriodTooLong)
        );
        assert!(ticks.admit(MAX_PERIOD).is_ok());
        assert_eq!(ticks.admit(1), Err(SchedulerError::CapacityExceeded));
        assert_eq!(ticks.len(), 1);
    }

    #[test]
    fn unknown_task_reads_as_idle() {
        let ticks: TickSource<2> = TickSource::new(MS_1);
        let id = TaskId(1);
        assert!(!ticks.is_ready(id));
        assert!(!ticks.claim(id));
        assert_eq!(ticks.next_deadline(id), None);
    }
}

//! Dispatcher behaviour driven by a simulated timer interrupt

use core::cell::{Cell, RefCell};
use core::sync::atomic::{AtomicU32, Ordering};

use avr_tick_scheduler::rtos::{
    Callback, Scheduler, SchedulerError, TickConfig, TickSource, MAX_PERIOD,
};

const F_CPU: u32 = 16_000_000;
const MS_1: TickConfig = TickConfig::compare_match(F_CPU, 1);
const MS_10: TickConfig = TickConfig::overflow_reload(F_CPU, 10).without_continuous();

fn idle() {}

#[test]
fn periodic_and_continuous_tasks() {
    let ticks: TickSource<10> = TickSource::new(MS_1);
    let fired = RefCell::new(Vec::new());
    let spins = Cell::new(0u32);
    let mut periodic = || fired.borrow_mut().push(ticks.now());
    let mut continuous = || spins.set(spins.get() + 1);

    let mut scheduler = Scheduler::new(&ticks);
    scheduler.register(Callback::bound(&mut periodic), 10).unwrap();
    scheduler.register(Callback::bound(&mut continuous), 0).unwrap();

    for _ in 0..30 {
        ticks.tick();
        scheduler.dispatch();
    }
    drop(scheduler);

    assert_eq!(*fired.borrow(), [10, 20, 30]);
    assert_eq!(spins.get(), 30);
}

#[test]
fn full_table_rejects_registration_and_keeps_existing_tasks() {
    let ticks: TickSource<10> = TickSource::new(MS_1);
    let periodic_runs = Cell::new(0u32);
    let continuous_runs = Cell::new(0u32);
    let mut periodic = || periodic_runs.set(periodic_runs.get() + 1);
    let mut continuous = || continuous_runs.set(continuous_runs.get() + 1);

    let mut scheduler = Scheduler::new(&ticks);
    scheduler.register(Callback::bound(&mut periodic), 10).unwrap();
    scheduler.register(Callback::bound(&mut continuous), 0).unwrap();
    for _ in 0..8 {
        scheduler.register(Callback::from_fn(idle), 1000).unwrap();
    }
    assert_eq!(scheduler.len(), 10);

    assert_eq!(
        scheduler.register(Callback::from_fn(idle), 5),
        Err(SchedulerError::CapacityExceeded)
    );
    assert_eq!(scheduler.len(), 10);
    assert_eq!(ticks.len(), 10);

    for _ in 0..20 {
        ticks.tick();
        scheduler.dispatch();
    }
    drop(scheduler);

    assert_eq!(periodic_runs.get(), 2);
    assert_eq!(continuous_runs.get(), 20);
}

#[test]
fn activations_are_spaced_by_exactly_one_period() {
    let ticks: TickSource<2> = TickSource::new(MS_1);
    let fast = RefCell::new(Vec::new());
    let slow = RefCell::new(Vec::new());
    let mut every_3 = || fast.borrow_mut().push(ticks.now());
    let mut every_7 = || slow.borrow_mut().push(ticks.now());

    let mut scheduler = Scheduler::new(&ticks);
    scheduler.register(Callback::bound(&mut every_3), 3).unwrap();
    scheduler.register(Callback::bound(&mut every_7), 7).unwrap();

    for _ in 0..21 {
        ticks.tick();
        scheduler.dispatch();
    }
    drop(scheduler);

    assert_eq!(*fast.borrow(), [3, 6, 9, 12, 15, 18, 21]);
    assert_eq!(*slow.borrow(), [7, 14, 21]);
}

#[test]
fn pending_activation_runs_once() {
    let ticks: TickSource<1> = TickSource::new(MS_1);
    let runs = Cell::new(0u32);
    let mut body = || runs.set(runs.get() + 1);

    let mut scheduler = Scheduler::new(&ticks);
    let id = scheduler.register(Callback::bound(&mut body), 1).unwrap();

    // The main loop is busy for five ticks
    for _ in 0..5 {
        ticks.tick();
    }
    assert!(ticks.is_ready(id));
    assert_eq!(scheduler.dispatch(), 1);
    assert_eq!(scheduler.dispatch(), 0);
    assert!(!ticks.is_ready(id));

    let stats = scheduler.stats(id).unwrap();
    assert_eq!(stats.runs, 1);
    assert_eq!(stats.missed, 4);
    drop(scheduler);
    assert_eq!(runs.get(), 1);
}

#[test]
fn stalled_clock_resynchronises_instead_of_bursting() {
    let ticks: TickSource<1> = TickSource::new(MS_1);
    let fired = RefCell::new(Vec::new());
    let mut body = || fired.borrow_mut().push(ticks.now());

    let mut scheduler = Scheduler::new(&ticks);
    let id = scheduler.register(Callback::bound(&mut body), 10).unwrap();

    // Interrupts were held off for 35ms
    ticks.advance(35);
    assert_eq!(ticks.next_deadline(id), Some(45));
    assert_eq!(ticks.missed(id), 2);

    assert_eq!(scheduler.dispatch(), 1);
    assert_eq!(scheduler.dispatch(), 0);

    for _ in 0..10 {
        ticks.tick();
        scheduler.dispatch();
    }
    drop(scheduler);

    assert_eq!(*fired.borrow(), [35, 45]);
}

#[test]
fn deadlines_survive_clock_wrap() {
    let ticks: TickSource<1> = TickSource::new(MS_1);
    ticks.advance(u32::MAX - 5);

    let fired = RefCell::new(Vec::new());
    let mut body = || fired.borrow_mut().push(ticks.now());
    let mut scheduler = Scheduler::new(&ticks);
    scheduler.register(Callback::bound(&mut body), 4).unwrap();

    for _ in 0..8 {
        ticks.tick();
        scheduler.dispatch();
    }
    drop(scheduler);

    assert_eq!(*fired.borrow(), [u32::MAX - 1, 2]);
}

#[test]
fn coarse_tick_advances_in_steps() {
    static RUNS: AtomicU32 = AtomicU32::new(0);
    fn count() {
        RUNS.fetch_add(1, Ordering::Relaxed);
    }

    let ticks: TickSource<2> = TickSource::new(MS_10);
    let mut scheduler = Scheduler::new(&ticks);
    let id = scheduler.register(Callback::from_fn(count), 50).unwrap();
    assert_eq!(
        scheduler.register(Callback::from_fn(idle), 0),
        Err(SchedulerError::ContinuousUnsupported)
    );

    for _ in 0..10 {
        ticks.tick();
        scheduler.dispatch();
    }

    assert_eq!(ticks.now(), 100);
    assert_eq!(RUNS.load(Ordering::Relaxed), 2);
    assert_eq!(scheduler.stats(id).unwrap().runs, 2);
}

#[test]
fn overlong_period_is_rejected() {
    let ticks: TickSource<1> = TickSource::new(MS_1);
    let mut scheduler = Scheduler::new(&ticks);
    assert_eq!(
        scheduler.register(Callback::from_fn(idle), MAX_PERIOD + 1),
        Err(SchedulerError::PeriodTooLong)
    );
    assert!(scheduler.register(Callback::from_fn(idle), MAX_PERIOD).is_ok());
    assert_eq!(scheduler.len(), 1);
}

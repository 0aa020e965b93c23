use std::{
    cell::{Ref, RefCell},
    rc::{Rc, Weak},
};

use fitcheck_domain as domain;
use gloo_timers::callback::Interval;

use crate::{Settings, engine};

const TICK_MS: u32 = 1000;

/// Drives a timer engine with a one-second interval while it is ticking.
///
/// `on_update` is called after every change of the engine state. The
/// interval is dropped as soon as the engine stops ticking, also when the
/// last tick completes the workout.
pub struct WorkoutTimer {
    engine: Rc<RefCell<domain::TimerEngine>>,
    on_update: Rc<dyn Fn(&domain::TimerEngine)>,
    interval: Rc<RefCell<Option<Interval>>>,
}

impl WorkoutTimer {
    pub fn new(
        protocol: domain::TimerProtocol,
        settings: &Settings,
        on_update: impl Fn(&domain::TimerEngine) + 'static,
    ) -> Self {
        Self::with_engine(engine(protocol, settings), on_update)
    }

    pub fn with_engine(
        engine: domain::TimerEngine,
        on_update: impl Fn(&domain::TimerEngine) + 'static,
    ) -> Self {
        Self {
            engine: Rc::new(RefCell::new(engine)),
            on_update: Rc::new(on_update),
            interval: Rc::new(RefCell::new(None)),
        }
    }

    #[must_use]
    pub fn engine(&self) -> Ref<'_, domain::TimerEngine> {
        self.engine.borrow()
    }

    pub fn start(&mut self) {
        self.engine.borrow_mut().start();
        self.update();
    }

    pub fn pause(&mut self) {
        self.engine.borrow_mut().pause();
        self.update();
    }

    pub fn resume(&mut self) {
        self.engine.borrow_mut().resume();
        self.update();
    }

    pub fn toggle_pause(&mut self) {
        self.engine.borrow_mut().toggle_pause();
        self.update();
    }

    pub fn reset(&mut self) {
        self.engine.borrow_mut().reset();
        self.update();
    }

    /// Whether the countdown is currently scheduled.
    #[must_use]
    pub fn is_scheduled(&self) -> bool {
        self.interval.borrow().is_some()
    }

    fn update(&mut self) {
        let engine = self.engine.borrow();
        let mut interval = self.interval.borrow_mut();
        if engine.is_ticking() {
            if interval.is_none() {
                *interval = Some(Interval::new(
                    TICK_MS,
                    ticker(
                        self.engine.clone(),
                        self.on_update.clone(),
                        Rc::downgrade(&self.interval),
                    ),
                ));
            }
        } else {
            *interval = None;
        }
        drop(interval);
        (self.on_update)(&engine);
    }
}

fn ticker(
    engine: Rc<RefCell<domain::TimerEngine>>,
    on_update: Rc<dyn Fn(&domain::TimerEngine)>,
    interval: Weak<RefCell<Option<Interval>>>,
) -> impl FnMut() + 'static {
    move || {
        // Skipped while a control call holds the engine.
        let Ok(mut engine) = engine.try_borrow_mut() else {
            return;
        };
        engine.tick();
        on_update(&engine);
        if engine.is_ticking() {
            return;
        }
        let Some(interval) = interval.upgrade() else {
            return;
        };
        let Ok(mut interval) = interval.try_borrow_mut() else {
            return;
        };
        // The running callback belongs to the interval, so it is dropped
        // after the callback has returned.
        if let Some(finished) = interval.take() {
            wasm_bindgen_futures::spawn_local(async move { drop(finished) });
        }
    }
}

#[cfg(test)]
mod tests {
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    mod wasm {
        use std::{cell::Cell, rc::Rc};

        use fitcheck_domain as domain;
        use pretty_assertions::assert_eq;
        use wasm_bindgen_test::wasm_bindgen_test;

        use super::super::*;

        fn timer(updates: Rc<Cell<u32>>) -> WorkoutTimer {
            WorkoutTimer::with_engine(
                domain::TimerEngine::new(
                    domain::TimerProtocol::new(2, 3, 5, vec![domain::IntervalSpec::new("Run", 10)])
                        .unwrap(),
                ),
                move |_| updates.set(updates.get() + 1),
            )
        }

        #[wasm_bindgen_test]
        fn test_schedule_follows_engine() {
            let updates = Rc::new(Cell::new(0));
            let mut timer = timer(updates.clone());
            assert!(!timer.is_scheduled());

            timer.start();
            assert!(timer.is_scheduled());
            assert_eq!(timer.engine().state(), domain::TimerState::Prep);

            timer.pause();
            assert!(!timer.is_scheduled());

            timer.toggle_pause();
            assert!(timer.is_scheduled());

            timer.reset();
            assert!(!timer.is_scheduled());
            assert_eq!(timer.engine().state(), domain::TimerState::Idle);

            assert_eq!(updates.get(), 4);
        }

        #[wasm_bindgen_test]
        async fn test_ticks() {
            let mut timer = timer(Rc::new(Cell::new(0)));
            timer.start();
            gloo_timers::future::TimeoutFuture::new(2_100).await;
            assert_eq!(timer.engine().time_remaining(), 1);
        }

        #[wasm_bindgen_test]
        async fn test_completion_stops_schedule() {
            let updates = Rc::new(Cell::new(0));
            let counter = updates.clone();
            let mut timer = WorkoutTimer::with_engine(
                domain::TimerEngine::new(
                    domain::TimerProtocol::new(1, 0, 0, vec![domain::IntervalSpec::new("Run", 1)])
                        .unwrap(),
                ),
                move |_| counter.set(counter.get() + 1),
            );

            timer.start();
            assert!(timer.is_scheduled());

            gloo_timers::future::TimeoutFuture::new(1_500).await;
            assert_eq!(timer.engine().state(), domain::TimerState::Completed);
            assert!(!timer.is_scheduled());
            assert_eq!(updates.get(), 2);

            gloo_timers::future::TimeoutFuture::new(2_100).await;
            assert_eq!(updates.get(), 2);
        }
    }
}

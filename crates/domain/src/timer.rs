//! Interval timer for guided workouts.
//!
//! The engine runs a [`TimerProtocol`]: a preparation phase, then every
//! interval of every set with a rest after each interval except the very
//! last one. The host calls [`TimerEngine::tick`] once per second while
//! [`TimerEngine::is_ticking`] holds and renders the engine state after each
//! call.
//!
//! Audio cues, vibration and keeping the display awake are delegated to
//! capabilities supplied by the host. A host without such a capability uses
//! [`Unsupported`], which ignores every request.

use log::{debug, warn};

use crate::{IntervalSpec, TimerProtocol};

pub const PREP_LABEL: &str = "Get ready!";
pub const REST_LABEL: &str = "Rest";
pub const COMPLETED_LABEL: &str = "Completed!";

pub trait Tone {
    fn play_tone(&mut self, frequency: f32, duration_ms: u32) -> Result<(), String>;
}

pub trait Haptics {
    /// Alternating vibration and pause durations in milliseconds.
    fn vibrate(&mut self, pattern: &[u32]) -> Result<(), String>;
}

pub trait WakeLock {
    fn acquire(&mut self) -> Result<(), String>;
    fn release(&mut self) -> Result<(), String>;
}

pub struct Unsupported;

impl Tone for Unsupported {
    fn play_tone(&mut self, _: f32, _: u32) -> Result<(), String> {
        Ok(())
    }
}

impl Haptics for Unsupported {
    fn vibrate(&mut self, _: &[u32]) -> Result<(), String> {
        Ok(())
    }
}

impl WakeLock for Unsupported {
    fn acquire(&mut self) -> Result<(), String> {
        Ok(())
    }

    fn release(&mut self) -> Result<(), String> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cue {
    pub frequency: f32,
    pub duration_ms: u32,
    pub vibration: &'static [u32],
}

pub const PHASE_CUE: Cue = Cue {
    frequency: 1000.,
    duration_ms: 300,
    vibration: &[200, 100, 200],
};

pub const COMPLETION_CUE: Cue = Cue {
    frequency: 1200.,
    duration_ms: 500,
    vibration: &[300, 100, 300, 100, 300],
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Idle,
    Prep,
    Interval,
    Rest,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerSession {
    pub state: TimerState,
    /// Starts at 1.
    pub current_set: u32,
    /// Index into the intervals of the protocol. During a rest it already
    /// refers to the interval following the rest.
    pub current_interval_index: usize,
    /// Seconds left in the current phase.
    pub time_remaining: u32,
    pub is_paused: bool,
    pub is_running: bool,
}

impl Default for TimerSession {
    fn default() -> Self {
        Self {
            state: TimerState::Idle,
            current_set: 1,
            current_interval_index: 0,
            time_remaining: 0,
            is_paused: false,
            is_running: false,
        }
    }
}

pub struct TimerEngine {
    protocol: TimerProtocol,
    session: TimerSession,
    tone: Box<dyn Tone>,
    haptics: Box<dyn Haptics>,
    wake_lock: Box<dyn WakeLock>,
    wake_lock_held: bool,
}

impl TimerEngine {
    #[must_use]
    pub fn new(protocol: TimerProtocol) -> Self {
        Self {
            protocol,
            session: TimerSession::default(),
            tone: Box::new(Unsupported),
            haptics: Box::new(Unsupported),
            wake_lock: Box::new(Unsupported),
            wake_lock_held: false,
        }
    }

    #[must_use]
    pub fn with_tone(mut self, tone: impl Tone + 'static) -> Self {
        self.tone = Box::new(tone);
        self
    }

    #[must_use]
    pub fn with_haptics(mut self, haptics: impl Haptics + 'static) -> Self {
        self.haptics = Box::new(haptics);
        self
    }

    #[must_use]
    pub fn with_wake_lock(mut self, wake_lock: impl WakeLock + 'static) -> Self {
        self.wake_lock = Box::new(wake_lock);
        self
    }

    #[must_use]
    pub fn protocol(&self) -> &TimerProtocol {
        &self.protocol
    }

    #[must_use]
    pub fn session(&self) -> &TimerSession {
        &self.session
    }

    #[must_use]
    pub fn state(&self) -> TimerState {
        self.session.state
    }

    #[must_use]
    pub fn current_set(&self) -> u32 {
        self.session.current_set
    }

    #[must_use]
    pub fn total_sets(&self) -> u32 {
        self.protocol.sets()
    }

    #[must_use]
    pub fn current_interval_index(&self) -> usize {
        self.session.current_interval_index
    }

    #[must_use]
    pub fn time_remaining(&self) -> u32 {
        self.session.time_remaining
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.session.is_paused
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.session.is_running
    }

    /// Whether the host should deliver ticks.
    #[must_use]
    pub fn is_ticking(&self) -> bool {
        self.session.is_running && !self.session.is_paused
    }

    /// Start the workout, or continue it if it was paused.
    ///
    /// A completed workout has to be reset before it can be started again.
    pub fn start(&mut self) {
        match self.session.state {
            TimerState::Completed => return,
            TimerState::Idle => {
                self.session.state = TimerState::Prep;
                self.session.time_remaining = self.protocol.prep_time();
                self.session.current_set = 1;
                self.session.current_interval_index = 0;
            }
            TimerState::Prep | TimerState::Interval | TimerState::Rest => {}
        }

        self.session.is_running = true;
        self.session.is_paused = false;
        self.acquire_wake_lock();

        if self.session.time_remaining == 0 {
            self.advance();
        }
    }

    pub fn tick(&mut self) {
        if !self.is_ticking() {
            return;
        }

        self.session.time_remaining = self.session.time_remaining.saturating_sub(1);

        if self.session.time_remaining == 0 {
            self.complete_phase();
        }
    }

    pub fn pause(&mut self) {
        self.session.is_paused = true;
    }

    pub fn resume(&mut self) {
        self.session.is_paused = false;
    }

    pub fn toggle_pause(&mut self) {
        if self.session.is_paused {
            self.resume();
        } else {
            self.pause();
        }
    }

    pub fn reset(&mut self) {
        self.session = TimerSession::default();
        self.release_wake_lock();
    }

    /// Label and duration of the current phase.
    #[must_use]
    pub fn current_interval(&self) -> IntervalSpec {
        match self.session.state {
            TimerState::Idle => IntervalSpec::new("", 0),
            TimerState::Prep => IntervalSpec::new(PREP_LABEL, self.protocol.prep_time()),
            TimerState::Rest => IntervalSpec::new(REST_LABEL, self.protocol.rest_between_sets()),
            TimerState::Completed => IntervalSpec::new(COMPLETED_LABEL, 0),
            TimerState::Interval => self.protocol.intervals()
                [self.session.current_interval_index]
                .clone(),
        }
    }

    /// Seconds until the workout is completed.
    ///
    /// Before the start this is the length of the whole workout.
    #[must_use]
    pub fn total_time_remaining(&self) -> u32 {
        let TimerSession {
            state,
            current_set,
            current_interval_index,
            time_remaining,
            ..
        } = self.session;

        match state {
            TimerState::Idle => self.protocol.total_duration(),
            TimerState::Prep => time_remaining + self.protocol.duration_from(1, 0),
            TimerState::Interval => {
                time_remaining
                    + self
                        .protocol
                        .duration_from(current_set, current_interval_index)
                        .saturating_sub(self.protocol.intervals()[current_interval_index].duration)
            }
            TimerState::Rest => {
                time_remaining
                    + self
                        .protocol
                        .duration_from(current_set, current_interval_index)
            }
            TimerState::Completed => 0,
        }
    }

    /// Share of the current phase still remaining, from 1 down to 0.
    #[must_use]
    pub fn progress(&self) -> f32 {
        let duration = self.current_interval().duration;
        if duration == 0 {
            return 0.;
        }
        #[allow(clippy::cast_precision_loss)]
        let progress = self.session.time_remaining as f32 / duration as f32;
        progress
    }

    fn complete_phase(&mut self) {
        self.signal(PHASE_CUE);
        self.advance();
    }

    /// Move to the next phase. Phases without duration are passed through.
    fn advance(&mut self) {
        loop {
            self.next_phase();
            if self.session.state == TimerState::Completed || self.session.time_remaining > 0 {
                break;
            }
        }
        debug!(
            "timer entered {:?} (set {}, interval {})",
            self.session.state, self.session.current_set, self.session.current_interval_index
        );
    }

    fn next_phase(&mut self) {
        let intervals = self.protocol.intervals();

        match self.session.state {
            TimerState::Prep => {
                self.session.state = TimerState::Interval;
                self.session.current_interval_index = 0;
                self.session.time_remaining = intervals[0].duration;
            }
            TimerState::Interval => {
                self.session.current_interval_index += 1;

                if self.session.current_interval_index >= intervals.len() {
                    if self.session.current_set >= self.protocol.sets() {
                        self.complete();
                        return;
                    }
                    self.session.current_set += 1;
                    self.session.current_interval_index = 0;
                }

                self.session.state = TimerState::Rest;
                self.session.time_remaining = self.protocol.rest_between_sets();
            }
            TimerState::Rest => {
                self.session.state = TimerState::Interval;
                self.session.time_remaining =
                    intervals[self.session.current_interval_index].duration;
            }
            TimerState::Idle | TimerState::Completed => {}
        }
    }

    fn complete(&mut self) {
        self.session.state = TimerState::Completed;
        self.session.time_remaining = 0;
        self.session.is_running = false;
        self.signal(COMPLETION_CUE);
        self.release_wake_lock();
    }

    fn signal(&mut self, cue: Cue) {
        if let Err(err) = self.tone.play_tone(cue.frequency, cue.duration_ms) {
            warn!("failed to play tone: {err}");
        }
        if let Err(err) = self.haptics.vibrate(cue.vibration) {
            warn!("failed to vibrate: {err}");
        }
    }

    fn acquire_wake_lock(&mut self) {
        if self.wake_lock_held {
            return;
        }
        match self.wake_lock.acquire() {
            Ok(()) => self.wake_lock_held = true,
            Err(err) => warn!("failed to keep display awake: {err}"),
        }
    }

    fn release_wake_lock(&mut self) {
        if !self.wake_lock_held {
            return;
        }
        self.wake_lock_held = false;
        if let Err(err) = self.wake_lock.release() {
            warn!("failed to release display wake lock: {err}");
        }
    }
}

impl Drop for TimerEngine {
    fn drop(&mut self) {
        self.release_wake_lock();
    }
}

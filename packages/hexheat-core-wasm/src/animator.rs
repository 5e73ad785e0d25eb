//! Elevation scale ramp: after a start delay the scale climbs from `min` to
//! `max` by one step per tick, then all timers are released.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use thiserror::Error;

use crate::cancellation::{CancellationManager, CancellationToken};
use crate::config::{AnimationTiming, ElevationRange};
use crate::console_log;

pub type TimerId = i32;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimerError {
    #[error("timer host unavailable: {0}")]
    Unavailable(String),
    #[error("failed to schedule timer: {0}")]
    Schedule(String),
}

/// One-shot and recurring callbacks on a single-threaded event loop.
///
/// Callbacks are never invoked synchronously from `set_timeout`,
/// `set_interval` or `clear`.
pub trait TimerHost {
    fn set_timeout(&self, delay_ms: u32, callback: Box<dyn FnMut()>) -> Result<TimerId, TimerError>;
    fn set_interval(&self, period_ms: u32, callback: Box<dyn FnMut()>) -> Result<TimerId, TimerError>;
    /// Clearing an unknown or already fired id is a no-op.
    fn clear(&self, id: TimerId);
}

impl<T: TimerHost + ?Sized> TimerHost for Rc<T> {
    fn set_timeout(&self, delay_ms: u32, callback: Box<dyn FnMut()>) -> Result<TimerId, TimerError> {
        (**self).set_timeout(delay_ms, callback)
    }

    fn set_interval(&self, period_ms: u32, callback: Box<dyn FnMut()>) -> Result<TimerId, TimerError> {
        (**self).set_interval(period_ms, callback)
    }

    fn clear(&self, id: TimerId) {
        (**self).clear(id)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimationPhase {
    Idle,
    Pending,
    Running,
}

impl AnimationPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnimationPhase::Idle => "idle",
            AnimationPhase::Pending => "pending",
            AnimationPhase::Running => "running",
        }
    }
}

struct AnimatorState {
    range: ElevationRange,
    timing: AnimationTiming,
    value: u32,
    phase: AnimationPhase,
    delay_timer: Option<TimerId>,
    tick_timer: Option<TimerId>,
    tokens: CancellationManager,
    listener: Option<Box<dyn FnMut(u32)>>,
}

struct Inner<H: TimerHost> {
    state: RefCell<AnimatorState>,
    host: H,
}

/// Owns the elevation scale and the timers that drive it.
///
/// Dropping the animator stops it.
pub struct ElevationAnimator<H: TimerHost + 'static> {
    inner: Rc<Inner<H>>,
}

impl<H: TimerHost + 'static> ElevationAnimator<H> {
    pub fn new(host: H, range: ElevationRange, timing: AnimationTiming) -> Self {
        let state = AnimatorState {
            range,
            timing,
            value: range.min,
            phase: AnimationPhase::Idle,
            delay_timer: None,
            tick_timer: None,
            tokens: CancellationManager::new("elevation"),
            listener: None,
        };
        Self {
            inner: Rc::new(Inner {
                state: RefCell::new(state),
                host,
            }),
        }
    }

    /// Called with the new scale after every reset and step.
    pub fn set_listener(&self, listener: impl FnMut(u32) + 'static) {
        self.inner.state.borrow_mut().listener = Some(Box::new(listener));
    }

    pub fn value(&self) -> u32 {
        self.inner.state.borrow().value
    }

    pub fn phase(&self) -> AnimationPhase {
        self.inner.state.borrow().phase
    }

    pub fn range(&self) -> ElevationRange {
        self.inner.state.borrow().range
    }

    pub fn host(&self) -> &H {
        &self.inner.host
    }

    pub fn start(&self) -> Result<(), TimerError> {
        Inner::start(&self.inner)
    }

    pub fn restart(&self) -> Result<(), TimerError> {
        Inner::start(&self.inner)
    }

    pub fn stop(&self) {
        self.inner.stop();
    }
}

impl<H: TimerHost + 'static> Drop for ElevationAnimator<H> {
    fn drop(&mut self) {
        self.inner.stop();
    }
}

impl<H: TimerHost + 'static> Inner<H> {
    fn start(this: &Rc<Self>) -> Result<(), TimerError> {
        this.stop();

        let (token, delay, value) = {
            let mut state = this.state.borrow_mut();
            state.value = state.range.min;
            state.phase = AnimationPhase::Pending;
            (state.tokens.create_token(), state.timing.start_delay_ms, state.value)
        };
        this.notify(value);

        let weak = Rc::downgrade(this);
        let callback_token = token.clone();
        let scheduled = this.host.set_timeout(
            delay,
            Box::new(move || {
                if let Some(inner) = live(&weak, &callback_token) {
                    Inner::begin_ticking(&inner, &callback_token);
                }
            }),
        );

        match scheduled {
            Ok(id) => {
                this.state.borrow_mut().delay_timer = Some(id);
                console_log!("Elevation animation {} starts in {} ms", token.id, delay);
                Ok(())
            }
            Err(err) => {
                this.stop();
                Err(err)
            }
        }
    }

    fn begin_ticking(this: &Rc<Self>, token: &CancellationToken) {
        let (fired, stale_tick, period) = {
            let mut state = this.state.borrow_mut();
            state.phase = AnimationPhase::Running;
            (
                state.delay_timer.take(),
                state.tick_timer.take(),
                state.timing.tick_interval_ms,
            )
        };
        // Releases the fired one-shot; a leftover tick source would double the speed
        for id in fired.into_iter().chain(stale_tick) {
            this.host.clear(id);
        }

        let weak = Rc::downgrade(this);
        let callback_token = token.clone();
        let scheduled = this.host.set_interval(
            period,
            Box::new(move || {
                if let Some(inner) = live(&weak, &callback_token) {
                    inner.tick();
                }
            }),
        );

        match scheduled {
            Ok(id) => {
                this.state.borrow_mut().tick_timer = Some(id);
                console_log!("Elevation animation {} running every {} ms", token.id, period);
            }
            Err(err) => {
                console_log!("Elevation animation {} could not start: {}", token.id, err);
                this.stop();
            }
        }
    }

    fn tick(&self) {
        let stepped = {
            let mut state = self.state.borrow_mut();
            if state.value >= state.range.max {
                None
            } else {
                state.value += 1;
                Some(state.value)
            }
        };

        match stepped {
            Some(value) => self.notify(value),
            None => {
                self.stop();
                console_log!("Elevation animation finished at {}", self.state.borrow().value);
            }
        }
    }

    fn stop(&self) {
        let (delay, tick) = {
            let mut state = self.state.borrow_mut();
            state.tokens.cancel_current();
            state.phase = AnimationPhase::Idle;
            (state.delay_timer.take(), state.tick_timer.take())
        };
        for id in delay.into_iter().chain(tick) {
            self.host.clear(id);
        }
    }

    // The listener runs without any borrow held so it may call back into the animator
    fn notify(&self, value: u32) {
        let listener = self.state.borrow_mut().listener.take();
        if let Some(mut listener) = listener {
            listener(value);
            let mut state = self.state.borrow_mut();
            if state.listener.is_none() {
                state.listener = Some(listener);
            }
        }
    }
}

fn live<H: TimerHost>(weak: &Weak<Inner<H>>, token: &CancellationToken) -> Option<Rc<Inner<H>>> {
    if let Err(reason) = token.throw_if_cancelled() {
        console_log!("Ignoring stale timer callback: {}", reason);
        return None;
    }
    weak.upgrade()
}

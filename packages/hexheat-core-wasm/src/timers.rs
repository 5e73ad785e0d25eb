use std::cell::RefCell;
use std::collections::HashMap;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::animator::{TimerError, TimerHost, TimerId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TimerKind {
    Timeout,
    Interval,
}

/// `window.setTimeout` / `window.setInterval` backed timer host.
///
/// A cleared closure may still be on the stack (a tick that stops its own
/// interval), so it is retired instead of dropped and released by `sweep`,
/// which callers run outside timer callbacks.
pub struct BrowserTimers {
    window: web_sys::Window,
    live: RefCell<HashMap<TimerId, (TimerKind, Closure<dyn FnMut()>)>>,
    retired: RefCell<Vec<Closure<dyn FnMut()>>>,
}

impl BrowserTimers {
    pub fn new() -> Result<Self, TimerError> {
        let window = web_sys::window()
            .ok_or_else(|| TimerError::Unavailable("no global window".to_string()))?;
        Ok(Self {
            window,
            live: RefCell::new(HashMap::new()),
            retired: RefCell::new(Vec::new()),
        })
    }

    pub fn sweep(&self) {
        self.retired.borrow_mut().clear();
    }

    fn schedule(
        &self,
        kind: TimerKind,
        ms: u32,
        callback: Box<dyn FnMut()>,
    ) -> Result<TimerId, TimerError> {
        let closure = Closure::wrap(callback);
        let function: &js_sys::Function = closure.as_ref().unchecked_ref();
        let ms = i32::try_from(ms).unwrap_or(i32::MAX);
        let id = match kind {
            TimerKind::Timeout => self
                .window
                .set_timeout_with_callback_and_timeout_and_arguments_0(function, ms),
            TimerKind::Interval => self
                .window
                .set_interval_with_callback_and_timeout_and_arguments_0(function, ms),
        }
        .map_err(|e| TimerError::Schedule(format!("{:?}", e)))?;

        self.live.borrow_mut().insert(id, (kind, closure));
        Ok(id)
    }
}

impl TimerHost for BrowserTimers {
    fn set_timeout(&self, delay_ms: u32, callback: Box<dyn FnMut()>) -> Result<TimerId, TimerError> {
        self.schedule(TimerKind::Timeout, delay_ms, callback)
    }

    fn set_interval(&self, period_ms: u32, callback: Box<dyn FnMut()>) -> Result<TimerId, TimerError> {
        self.schedule(TimerKind::Interval, period_ms, callback)
    }

    fn clear(&self, id: TimerId) {
        let entry = self.live.borrow_mut().remove(&id);
        if let Some((kind, closure)) = entry {
            match kind {
                TimerKind::Timeout => self.window.clear_timeout_with_handle(id),
                TimerKind::Interval => self.window.clear_interval_with_handle(id),
            }
            self.retired.borrow_mut().push(closure);
        }
    }
}

impl Drop for BrowserTimers {
    fn drop(&mut self) {
        for (id, (kind, _)) in self.live.get_mut().drain() {
            match kind {
                TimerKind::Timeout => self.window.clear_timeout_with_handle(id),
                TimerKind::Interval => self.window.clear_interval_with_handle(id),
            }
        }
    }
}

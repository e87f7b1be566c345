use crate::constants::MAX_TIMER_DELAY_MS;
use crate::{convert, dom};
use fx_core::elapsed_between;
use instant::Instant;
use std::cell::{Cell, RefCell};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

/// One persistent `setTimeout` callback re-armed for the engine's next
/// deadline. At most one timeout is pending at a time.
#[derive(Default)]
pub struct TimerPump {
    callback: RefCell<Option<Closure<dyn FnMut()>>>,
    handle: Cell<Option<i32>>,
    armed_for: Cell<Option<Instant>>,
}

impl TimerPump {
    pub fn is_bound(&self) -> bool {
        self.callback.borrow().is_some()
    }

    pub fn bind(&self, f: impl FnMut() + 'static) {
        *self.callback.borrow_mut() = Some(Closure::wrap(Box::new(f) as Box<dyn FnMut()>));
    }

    /// Called first thing in the callback: the pending timeout has fired.
    pub fn fired(&self) {
        self.handle.set(None);
        self.armed_for.set(None);
    }

    /// Wake at `due`, or never when `None`. An earlier pending wake is kept.
    pub fn arm(&self, due: Option<Instant>, now: Instant) {
        let Some(due) = due else {
            self.cancel();
            return;
        };
        if self.handle.get().is_some() && self.armed_for.get().is_some_and(|t| t <= due) {
            return;
        }
        self.cancel();
        let cb = self.callback.borrow();
        let Some(cb) = cb.as_ref() else {
            return;
        };
        let delay = convert::delay_ms(elapsed_between(now, due), MAX_TIMER_DELAY_MS);
        match dom::set_timeout(cb.as_ref().unchecked_ref(), delay) {
            Ok(id) => {
                self.handle.set(Some(id));
                self.armed_for.set(Some(due));
            }
            Err(e) => log::warn!("[fx] timer not armed: {:?}", e),
        }
    }

    pub fn cancel(&self) {
        if let Some(id) = self.handle.take() {
            dom::clear_timeout(id);
        }
        self.armed_for.set(None);
    }

    /// Cancel and hand back the callback so the caller decides when it drops.
    pub fn release(&self) -> Option<Closure<dyn FnMut()>> {
        self.cancel();
        self.callback.borrow_mut().take()
    }
}

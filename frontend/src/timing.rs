//! Rate limiting for noisy browser events.
//!
//! [`Throttle`] runs the first call and then drops calls until its interval has
//! passed. [`Debounce`] runs only the latest call, once no new call has arrived
//! for its wait period.

use std::cell::RefCell;

use gloo_timers::callback::Timeout;

/// Milliseconds on the page clock.
pub fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_else(web_sys::js_sys::Date::now)
}

/// Admission decision behind [`Throttle`], kept free of the browser clock.
#[derive(Debug, Clone)]
pub struct ThrottleGate {
    limit_ms: f64,
    blocked_until: Option<f64>,
}

impl ThrottleGate {
    pub fn new(limit_ms: f64) -> Self {
        Self {
            limit_ms,
            blocked_until: None,
        }
    }

    pub fn admit(&mut self, now: f64) -> bool {
        match self.blocked_until {
            Some(until) if now < until => false,
            _ => {
                self.blocked_until = Some(now + self.limit_ms);
                true
            }
        }
    }
}

pub struct Throttle {
    gate: RefCell<ThrottleGate>,
}

impl Throttle {
    pub fn new(limit_ms: u32) -> Self {
        Self {
            gate: RefCell::new(ThrottleGate::new(f64::from(limit_ms))),
        }
    }

    pub fn call(&self, f: impl FnOnce()) {
        let admitted = self.gate.borrow_mut().admit(now_ms());
        if admitted {
            f();
        }
    }
}

pub struct Debounce {
    wait_ms: u32,
    pending: RefCell<Option<Timeout>>,
}

impl Debounce {
    pub fn new(wait_ms: u32) -> Self {
        Self {
            wait_ms,
            pending: RefCell::new(None),
        }
    }

    /// Schedules `f`, cancelling whatever was scheduled before.
    pub fn call(&self, f: impl FnOnce() + 'static) {
        let timeout = Timeout::new(self.wait_ms, f);
        // Dropping the previous handle clears its timer.
        drop(self.pending.replace(Some(timeout)));
    }

    /// Drops the scheduled call, if any.
    pub fn cancel(&self) {
        drop(self.pending.borrow_mut().take());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_call_is_admitted() {
        let mut gate = ThrottleGate::new(10.0);
        assert!(gate.admit(1000.0));
    }

    #[test]
    fn calls_inside_the_interval_are_dropped() {
        let mut gate = ThrottleGate::new(10.0);
        assert!(gate.admit(0.0));
        assert!(!gate.admit(3.0));
        assert!(!gate.admit(9.9));
        assert!(gate.admit(10.0));
        assert!(!gate.admit(15.0));
        assert!(gate.admit(20.5));
    }

    #[test]
    fn dropped_calls_do_not_extend_the_block() {
        let mut gate = ThrottleGate::new(10.0);
        assert!(gate.admit(0.0));
        for t in 1..10 {
            assert!(!gate.admit(f64::from(t)));
        }
        assert!(gate.admit(10.0));
    }
}

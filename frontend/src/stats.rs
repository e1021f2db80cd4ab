//! Count-up animation for the statistics row.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Element, Window};

use crate::dom;
use crate::error::SiteResult;
use crate::site::Page;
use crate::validation::parse_leading_int;

pub const STATS_SELECTOR: &str = ".stats-row";
pub const STAT_SELECTOR: &str = ".stat-number";
pub const TARGET_ATTRIBUTE: &str = "data-target";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterFrame {
    Running(i64),
    Done(i64),
}

impl CounterFrame {
    pub fn value(self) -> i64 {
        match self {
            CounterFrame::Running(v) | CounterFrame::Done(v) => v,
        }
    }

    pub fn is_done(self) -> bool {
        matches!(self, CounterFrame::Done(_))
    }
}

/// Per-frame counter. Each step adds `target / (duration / frame)`; frames
/// below the target show the floor of the running value and the last frame
/// shows the target exactly. Timings that leave less than one frame finish
/// on the first step.
#[derive(Debug, Clone)]
pub struct CounterAnimation {
    target: i64,
    increment: f64,
    current: f64,
}

impl CounterAnimation {
    pub fn new(target: i64, duration_ms: f64, frame_ms: f64) -> Self {
        let frames = duration_ms / frame_ms;
        let increment = if frames.is_finite() && frames >= 1.0 {
            target as f64 / frames
        } else {
            target as f64
        };
        Self {
            target,
            increment,
            current: 0.0,
        }
    }

    pub fn step(&mut self) -> CounterFrame {
        self.current += self.increment;
        if self.current < self.target as f64 {
            CounterFrame::Running(self.current.floor() as i64)
        } else {
            CounterFrame::Done(self.target)
        }
    }
}

type FrameSlot = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

fn request_frame(window: &Window, slot: &FrameSlot) {
    if let Some(callback) = slot.borrow().as_ref() {
        let _ = window.request_animation_frame(callback.as_ref().unchecked_ref());
    }
}

fn run_counter(window: &Window, element: Element, mut animation: CounterAnimation) {
    let first = animation.step();
    element.set_text_content(Some(&first.value().to_string()));
    if first.is_done() {
        return;
    }

    let slot: FrameSlot = Rc::new(RefCell::new(None));
    let scheduled = slot.clone();
    let frame_window = window.clone();
    *slot.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        let frame = animation.step();
        element.set_text_content(Some(&frame.value().to_string()));
        if frame.is_done() {
            // Breaks the slot <-> closure cycle so both are freed.
            let _ = scheduled.borrow_mut().take();
        } else {
            request_frame(&frame_window, &scheduled);
        }
    }) as Box<dyn FnMut()>));
    request_frame(window, &slot);
}

fn animate_all(page: &Page, stats: &[Element]) {
    for stat in stats {
        let raw = stat.get_attribute(TARGET_ATTRIBUTE).unwrap_or_default();
        let Some(target) = parse_leading_int(&raw) else {
            log::warn!("Skipping statistic with unreadable {}: {:?}", TARGET_ATTRIBUTE, raw);
            continue;
        };
        let animation = CounterAnimation::new(
            target,
            page.config.stats_duration_ms,
            page.config.stats_frame_ms,
        );
        run_counter(&page.window, stat.clone(), animation);
    }
}

pub fn setup(page: &Page) -> SiteResult<()> {
    let Some(section) = dom::query(&page.document, STATS_SELECTOR) else {
        return Ok(());
    };
    let stats = dom::query_all(&page.document, STAT_SELECTOR);
    let mut fired = false;

    let observed_page = page.clone();
    let observer =
        dom::intersection_observer(page.config.stats_threshold, None, move |entries, observer| {
            for entry in entries.iter().filter(|e| e.is_intersecting()) {
                if !fired {
                    fired = true;
                    log::debug!("Stats in view, animating {} counters", stats.len());
                    animate_all(&observed_page, &stats);
                }
                observer.unobserve(&entry.target());
            }
        })?;
    observer.observe(&section);
    Ok(())
}

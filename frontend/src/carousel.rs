//! Hero image carousel.
//!
//! [`CarouselState`] holds the slide index and hover flag and knows nothing
//! about the page. [`Carousel`] binds it to `.carousel-slide` / `.indicator`
//! elements, the prev/next buttons, the keyboard, and the autoplay timer.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Interval;
use thiserror::Error;
use wasm_bindgen::JsCast;
use web_sys::{Element, KeyboardEvent};

use crate::dom::{self, ClassTarget};
use crate::error::SiteResult;
use crate::site::Page;

pub const SLIDE_SELECTOR: &str = ".carousel-slide";
pub const INDICATOR_SELECTOR: &str = ".indicator";
pub const PREV_SELECTOR: &str = ".carousel-btn.prev";
pub const NEXT_SELECTOR: &str = ".carousel-btn.next";
pub const REGION_SELECTOR: &str = ".hero-carousel";
const ACTIVE: &str = "active";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("slide {index} is out of range for {len} slides")]
pub struct SlideOutOfRange {
    pub index: usize,
    pub len: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarouselState {
    current: usize,
    len: usize,
    hovered: bool,
}

impl CarouselState {
    /// `None` for an empty carousel.
    pub fn new(len: usize) -> Option<Self> {
        (len > 0).then_some(Self {
            current: 0,
            len,
            hovered: false,
        })
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn next(&mut self) -> usize {
        self.current = (self.current + 1) % self.len;
        self.current
    }

    pub fn prev(&mut self) -> usize {
        self.current = (self.current + self.len - 1) % self.len;
        self.current
    }

    pub fn goto(&mut self, index: usize) -> Result<usize, SlideOutOfRange> {
        if index >= self.len {
            return Err(SlideOutOfRange {
                index,
                len: self.len,
            });
        }
        self.current = index;
        Ok(index)
    }

    pub fn hovered(&self) -> bool {
        self.hovered
    }

    pub fn set_hovered(&mut self, hovered: bool) {
        self.hovered = hovered;
    }
}

/// Marks the slide and indicator at `index` active and clears the rest.
/// Missing indicators are skipped.
pub fn show_slide<T: ClassTarget>(slides: &[T], indicators: &[T], index: usize) {
    dom::mark_only(slides, index, ACTIVE);
    dom::mark_only(indicators, index, ACTIVE);
}

pub struct Carousel {
    slides: Vec<Element>,
    indicators: Vec<Element>,
    state: RefCell<CarouselState>,
    autoplay: RefCell<Option<Interval>>,
    interval_ms: u32,
}

impl Carousel {
    pub fn find(page: &Page) -> Option<Rc<Self>> {
        let slides = dom::query_all(&page.document, SLIDE_SELECTOR);
        let state = CarouselState::new(slides.len())?;
        let indicators = dom::query_all(&page.document, INDICATOR_SELECTOR);
        if indicators.len() != slides.len() {
            log::warn!(
                "Carousel has {} slides but {} indicators",
                slides.len(),
                indicators.len()
            );
        }
        Some(Rc::new(Self {
            slides,
            indicators,
            state: RefCell::new(state),
            autoplay: RefCell::new(None),
            interval_ms: page.config.autoplay_interval_ms,
        }))
    }

    pub fn current(&self) -> usize {
        self.state.borrow().current()
    }

    fn render(&self, index: usize) {
        show_slide(&self.slides, &self.indicators, index);
    }

    pub fn next(&self) {
        let index = self.state.borrow_mut().next();
        self.render(index);
    }

    pub fn prev(&self) {
        let index = self.state.borrow_mut().prev();
        self.render(index);
    }

    pub fn goto(&self, index: usize) {
        let result = self.state.borrow_mut().goto(index);
        match result {
            Ok(index) => self.render(index),
            Err(e) => log::error!("Ignoring carousel jump: {}", e),
        }
    }

    /// Starts a fresh autoplay timer, replacing any running one.
    pub fn start_autoplay(self: &Rc<Self>) {
        let carousel = Rc::downgrade(self);
        let interval = Interval::new(self.interval_ms, move || {
            if let Some(carousel) = carousel.upgrade() {
                carousel.next();
            }
        });
        drop(self.autoplay.replace(Some(interval)));
    }

    pub fn stop_autoplay(&self) {
        drop(self.autoplay.borrow_mut().take());
    }

    /// Gives a manual transition a full interval before autoplay advances
    /// again. While hovered the timer stays off until the pointer leaves.
    fn restart_autoplay(self: &Rc<Self>) {
        self.stop_autoplay();
        if !self.state.borrow().hovered() {
            self.start_autoplay();
        }
    }

    fn manual(self: &Rc<Self>, transition: impl FnOnce(&Self)) {
        transition(self);
        self.restart_autoplay();
    }

    fn set_hovered(self: &Rc<Self>, hovered: bool) {
        self.state.borrow_mut().set_hovered(hovered);
        if hovered {
            self.stop_autoplay();
        } else {
            self.start_autoplay();
        }
    }

    pub fn setup(self: &Rc<Self>, page: &Page) -> SiteResult<()> {
        self.render(self.current());

        if let Some(next) = dom::query(&page.document, NEXT_SELECTOR) {
            let carousel = self.clone();
            dom::listen(&next, "click", move |_| carousel.manual(Carousel::next))?;
        }
        if let Some(prev) = dom::query(&page.document, PREV_SELECTOR) {
            let carousel = self.clone();
            dom::listen(&prev, "click", move |_| carousel.manual(Carousel::prev))?;
        }
        for (index, indicator) in self.indicators.iter().enumerate() {
            let carousel = self.clone();
            dom::listen(indicator, "click", move |_| {
                carousel.manual(|c| c.goto(index))
            })?;
        }

        if let Some(region) = dom::query(&page.document, REGION_SELECTOR) {
            let carousel = self.clone();
            dom::listen(&region, "mouseenter", move |_| carousel.set_hovered(true))?;
            let carousel = self.clone();
            dom::listen(&region, "mouseleave", move |_| carousel.set_hovered(false))?;
        }

        let carousel = self.clone();
        dom::listen(&page.document, "keydown", move |e| {
            if !dom::event_within(&e, REGION_SELECTOR) {
                return;
            }
            let Some(key) = e.dyn_ref::<KeyboardEvent>().map(|k| k.key()) else {
                return;
            };
            match key.as_str() {
                "ArrowLeft" => carousel.manual(Carousel::prev),
                "ArrowRight" => carousel.manual(Carousel::next),
                _ => {}
            }
        })?;

        self.start_autoplay();
        log::debug!("Carousel ready with {} slides", self.slides.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::fake::FakeElement;
    use proptest::prelude::*;

    fn strip(len: usize) -> Vec<FakeElement> {
        (0..len).map(|_| FakeElement::default()).collect()
    }

    fn active(items: &[FakeElement]) -> Vec<usize> {
        (0..items.len())
            .filter(|&i| items[i].has_class(ACTIVE))
            .collect()
    }

    #[derive(Debug, Clone)]
    enum Step {
        Next,
        Prev,
        Goto(usize),
    }

    fn step() -> impl Strategy<Value = Step> {
        prop_oneof![
            Just(Step::Next),
            Just(Step::Prev),
            (0usize..12).prop_map(Step::Goto),
        ]
    }

    #[test]
    fn empty_carousel_has_no_state() {
        assert!(CarouselState::new(0).is_none());
    }

    #[test]
    fn starts_on_the_first_slide() {
        let state = CarouselState::new(3).unwrap();
        assert_eq!(state.current(), 0);
        assert!(!state.hovered());
    }

    #[test]
    fn next_wraps_to_the_first_slide() {
        let mut state = CarouselState::new(3).unwrap();
        assert_eq!(state.next(), 1);
        assert_eq!(state.next(), 2);
        assert_eq!(state.next(), 0);
    }

    #[test]
    fn prev_wraps_to_the_last_slide() {
        let mut state = CarouselState::new(4).unwrap();
        assert_eq!(state.prev(), 3);
        assert_eq!(state.prev(), 2);
    }

    #[test]
    fn single_slide_stays_put() {
        let mut state = CarouselState::new(1).unwrap();
        assert_eq!(state.next(), 0);
        assert_eq!(state.prev(), 0);
    }

    #[test]
    fn goto_rejects_out_of_range_and_keeps_position() {
        let mut state = CarouselState::new(3).unwrap();
        state.goto(2).unwrap();
        let err = state.goto(3).unwrap_err();
        assert_eq!(err, SlideOutOfRange { index: 3, len: 3 });
        assert_eq!(err.to_string(), "slide 3 is out of range for 3 slides");
        assert_eq!(state.current(), 2);
    }

    #[test]
    fn showing_a_slide_clears_the_markup_default() {
        let slides = vec![
            FakeElement::with_class(ACTIVE),
            FakeElement::default(),
            FakeElement::with_class(ACTIVE),
        ];
        let indicators = vec![
            FakeElement::with_class(ACTIVE),
            FakeElement::default(),
            FakeElement::default(),
        ];
        show_slide(&slides, &indicators, 1);
        assert_eq!(active(&slides), vec![1]);
        assert_eq!(active(&indicators), vec![1]);
    }

    #[test]
    fn missing_indicators_leave_slides_consistent() {
        let slides = strip(3);
        let indicators = strip(2);
        show_slide(&slides, &indicators, 1);
        show_slide(&slides, &indicators, 2);
        assert_eq!(active(&slides), vec![2]);
        assert!(active(&indicators).is_empty());
    }

    proptest! {
        #[test]
        fn exactly_one_slide_and_indicator_are_active(
            len in 1usize..8,
            steps in prop::collection::vec(step(), 0..40),
        ) {
            let slides = strip(len);
            let indicators = strip(len);
            let mut state = CarouselState::new(len).unwrap();
            show_slide(&slides, &indicators, state.current());
            for step in steps {
                let index = match step {
                    Step::Next => state.next(),
                    Step::Prev => state.prev(),
                    Step::Goto(i) => state.goto(i).unwrap_or(state.current()),
                };
                show_slide(&slides, &indicators, index);
                prop_assert_eq!(active(&slides), vec![state.current()]);
                prop_assert_eq!(active(&indicators), vec![state.current()]);
            }
        }

        #[test]
        fn n_nexts_return_to_start(len in 1usize..50, start in 0usize..50) {
            let mut state = CarouselState::new(len).unwrap();
            state.goto(start % len).unwrap();
            let origin = state.current();
            let visited: Vec<usize> = (0..len).map(|_| state.next()).collect();
            prop_assert_eq!(state.current(), origin);
            let mut sorted = visited.clone();
            sorted.sort_unstable();
            prop_assert_eq!(sorted, (0..len).collect::<Vec<_>>());
        }

        #[test]
        fn prev_undoes_next(len in 1usize..50, steps in 0usize..200) {
            let mut state = CarouselState::new(len).unwrap();
            for _ in 0..steps {
                state.next();
            }
            let here = state.current();
            state.next();
            prop_assert_eq!(state.prev(), here);
            prop_assert!(state.current() < len);
        }
    }
}

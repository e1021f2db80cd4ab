use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::js_sys::Array;
use web_sys::{
    Document, Element, Event, EventTarget, IntersectionObserver,
    IntersectionObserverEntry, IntersectionObserverInit, NodeList, Window,
};

use crate::error::{SiteError, SiteResult};

pub fn window() -> SiteResult<Window> {
    web_sys::window().ok_or(SiteError::NoWindow)
}

pub fn document() -> SiteResult<Document> {
    window()?.document().ok_or(SiteError::NoDocument)
}

/// Attaches a listener for the lifetime of the page.
pub fn listen<F>(target: &EventTarget, event: &str, handler: F) -> SiteResult<()>
where
    F: FnMut(Event) + 'static,
{
    let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
    target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
    callback.forget();
    Ok(())
}

/// Builds an observer whose callback only sees entries, already cast. The
/// callback lives as long as the page.
pub fn intersection_observer<F>(
    threshold: f64,
    root_margin: Option<&str>,
    mut callback: F,
) -> SiteResult<IntersectionObserver>
where
    F: FnMut(Vec<IntersectionObserverEntry>, &IntersectionObserver) + 'static,
{
    let closure = Closure::wrap(Box::new(move |entries: Array, observer: IntersectionObserver| {
        let entries = entries
            .iter()
            .filter_map(|entry| entry.dyn_into::<IntersectionObserverEntry>().ok())
            .collect();
        callback(entries, &observer);
    }) as Box<dyn FnMut(Array, IntersectionObserver)>);

    let options = IntersectionObserverInit::new();
    options.set_threshold(&JsValue::from_f64(threshold));
    if let Some(margin) = root_margin {
        options.set_root_margin(margin);
    }
    let observer =
        IntersectionObserver::new_with_options(closure.as_ref().unchecked_ref(), &options)?;
    closure.forget();
    Ok(observer)
}

/// `querySelector` that treats an invalid selector the same as no match.
pub fn query(root: &Document, selector: &str) -> Option<Element> {
    root.query_selector(selector).ok().flatten()
}

pub fn query_in(root: &Element, selector: &str) -> Option<Element> {
    root.query_selector(selector).ok().flatten()
}

pub fn elements(list: NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

pub fn query_all(root: &Document, selector: &str) -> Vec<Element> {
    root.query_selector_all(selector)
        .map(elements)
        .unwrap_or_default()
}

pub fn query_all_in(root: &Element, selector: &str) -> Vec<Element> {
    root.query_selector_all(selector)
        .map(elements)
        .unwrap_or_default()
}

/// Element the event was dispatched to, if it is one.
pub fn event_element(event: &Event) -> Option<Element> {
    event.target().and_then(|t| t.dyn_into::<Element>().ok())
}

/// Whether the event target sits inside an element matching `selector`.
pub fn event_within(event: &Event, selector: &str) -> bool {
    event_element(event)
        .and_then(|el| el.closest(selector).ok().flatten())
        .is_some()
}

pub fn has_class(element: &Element, class: &str) -> bool {
    element.class_list().contains(class)
}

pub fn add_class(element: &Element, class: &str) {
    let _ = element.class_list().add_1(class);
}

pub fn remove_class(element: &Element, class: &str) {
    let _ = element.class_list().remove_1(class);
}

pub fn set_class(element: &Element, class: &str, on: bool) {
    let _ = element.class_list().toggle_with_force(class, on);
}

/// Class state on a page element, or on a stand-in for one in tests.
pub trait ClassTarget {
    fn has_class(&self, class: &str) -> bool;
    fn set_class(&self, class: &str, on: bool);
}

impl ClassTarget for Element {
    fn has_class(&self, class: &str) -> bool {
        has_class(self, class)
    }

    fn set_class(&self, class: &str, on: bool) {
        set_class(self, class, on)
    }
}

/// Puts `class` on the item at `index` and takes it off every other one.
pub fn mark_only<T: ClassTarget>(items: &[T], index: usize, class: &str) {
    for (i, item) in items.iter().enumerate() {
        item.set_class(class, i == index);
    }
}

pub fn viewport_width(window: &Window) -> f64 {
    window
        .inner_width()
        .ok()
        .and_then(|w| w.as_f64())
        .unwrap_or_default()
}

#[cfg(test)]
pub mod fake {
    use std::cell::RefCell;
    use std::collections::BTreeSet;

    use super::ClassTarget;

    /// Class list without a document behind it.
    #[derive(Debug, Default)]
    pub struct FakeElement {
        classes: RefCell<BTreeSet<String>>,
    }

    impl FakeElement {
        pub fn with_class(class: &str) -> Self {
            let element = Self::default();
            element.set_class(class, true);
            element
        }
    }

    impl ClassTarget for FakeElement {
        fn has_class(&self, class: &str) -> bool {
            self.classes.borrow().contains(class)
        }

        fn set_class(&self, class: &str, on: bool) {
            let mut classes = self.classes.borrow_mut();
            if on {
                classes.insert(class.to_string());
            } else {
                classes.remove(class);
            }
        }
    }
}

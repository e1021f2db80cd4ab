use crate::dom::{self, ClassTarget};
use crate::error::SiteResult;
use crate::site::Page;
use crate::timing::Debounce;

pub const TRIGGER_SELECTOR: &str = ".dropdown-trigger";
pub const DROPDOWN_SELECTOR: &str = ".nav-dropdown";
pub const OPEN: &str = "open";

/// The dropdown behaves as a tap-to-open accordion only on narrow viewports.
pub fn accordion_enabled(viewport_width: f64, breakpoint: f64) -> bool {
    viewport_width <= breakpoint
}

/// Trigger click. Returns whether the dropdown handled it, in which case
/// the link's navigation should be cancelled.
pub fn trigger_clicked<T: ClassTarget>(
    dropdown: &T,
    viewport_width: f64,
    breakpoint: f64,
) -> bool {
    if !accordion_enabled(viewport_width, breakpoint) {
        return false;
    }
    dropdown.set_class(OPEN, !dropdown.has_class(OPEN));
    true
}

/// Settled resize. An accordion left open is closed once the viewport is wide.
pub fn resize_settled<T: ClassTarget>(dropdown: &T, viewport_width: f64, breakpoint: f64) {
    if !accordion_enabled(viewport_width, breakpoint) {
        dropdown.set_class(OPEN, false);
    }
}

pub fn setup(page: &Page) -> SiteResult<()> {
    let (Some(trigger), Some(dropdown)) = (
        dom::query(&page.document, TRIGGER_SELECTOR),
        dom::query(&page.document, DROPDOWN_SELECTOR),
    ) else {
        return Ok(());
    };
    let breakpoint = page.config.mobile_breakpoint;

    {
        let window = page.window.clone();
        let dropdown = dropdown.clone();
        dom::listen(&trigger, "click", move |e| {
            if trigger_clicked(&dropdown, dom::viewport_width(&window), breakpoint) {
                e.prevent_default();
            }
        })?;
    }

    let window = page.window.clone();
    let debounce = Debounce::new(page.config.resize_debounce_ms);
    dom::listen(&page.window, "resize", move |_| {
        let window = window.clone();
        let dropdown = dropdown.clone();
        debounce.call(move || {
            resize_settled(&dropdown, dom::viewport_width(&window), breakpoint)
        });
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::fake::FakeElement;

    #[test]
    fn accordion_applies_up_to_and_including_the_breakpoint() {
        assert!(accordion_enabled(320.0, 768.0));
        assert!(accordion_enabled(768.0, 768.0));
        assert!(!accordion_enabled(769.0, 768.0));
        assert!(!accordion_enabled(1440.0, 768.0));
    }

    #[test]
    fn narrow_trigger_toggles_the_accordion() {
        let dropdown = FakeElement::default();
        assert!(trigger_clicked(&dropdown, 375.0, 768.0));
        assert!(dropdown.has_class(OPEN));
        assert!(trigger_clicked(&dropdown, 375.0, 768.0));
        assert!(!dropdown.has_class(OPEN));
    }

    #[test]
    fn wide_trigger_is_left_to_the_link() {
        let dropdown = FakeElement::default();
        assert!(!trigger_clicked(&dropdown, 1024.0, 768.0));
        assert!(!dropdown.has_class(OPEN));
    }

    #[test]
    fn widening_past_the_breakpoint_closes_an_open_accordion() {
        let dropdown = FakeElement::default();
        trigger_clicked(&dropdown, 768.0, 768.0);
        resize_settled(&dropdown, 500.0, 768.0);
        assert!(dropdown.has_class(OPEN));
        resize_settled(&dropdown, 769.0, 768.0);
        assert!(!dropdown.has_class(OPEN));
    }
}

use wasm_bindgen::JsCast;
use web_sys::{HtmlElement, ScrollBehavior, ScrollToOptions};

use crate::dom;
use crate::error::SiteResult;
use crate::header::HEADER_ID;
use crate::menu::MobileMenu;
use crate::site::Page;

pub const ANCHOR_SELECTOR: &str = r##"a[href^="#"]"##;

/// Document offset to scroll to so the target clears the fixed header.
pub fn scroll_offset(element_top: f64, page_y: f64, header_height: f64, margin: f64) -> f64 {
    element_top + page_y - (header_height + margin)
}

pub fn setup(page: &Page, menu: Option<MobileMenu>) -> SiteResult<()> {
    let document = page.document.clone();
    let window = page.window.clone();
    let margin = page.config.scroll_margin;

    dom::listen(&page.document, "click", move |e| {
        let Some(anchor) = dom::event_element(&e)
            .and_then(|el| el.closest(ANCHOR_SELECTOR).ok().flatten())
        else {
            return;
        };
        e.prevent_default();

        let href = anchor.get_attribute("href").unwrap_or_default();
        let Some(target) = dom::query(&document, &href) else {
            return;
        };

        // Collapse the menu first so the header height is the resting one.
        if let Some(menu) = &menu {
            menu.close();
        }

        let header_height = document
            .get_element_by_id(HEADER_ID)
            .and_then(|h| h.dyn_into::<HtmlElement>().ok())
            .map(|h| f64::from(h.offset_height()))
            .unwrap_or_default();
        let top = scroll_offset(
            target.get_bounding_client_rect().top(),
            window.page_y_offset().unwrap_or_default(),
            header_height,
            margin,
        );

        let options = ScrollToOptions::new();
        options.set_top(top);
        options.set_behavior(ScrollBehavior::Smooth);
        window.scroll_to_with_scroll_to_options(&options);
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_by_header_and_margin() {
        assert_eq!(scroll_offset(400.0, 0.0, 80.0, 20.0), 300.0);
        assert_eq!(scroll_offset(-150.0, 1000.0, 60.0, 20.0), 770.0);
    }

    #[test]
    fn can_go_negative_near_the_top() {
        assert_eq!(scroll_offset(30.0, 0.0, 80.0, 20.0), -70.0);
    }
}

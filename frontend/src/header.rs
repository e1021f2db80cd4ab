use crate::dom;
use crate::error::SiteResult;
use crate::site::Page;
use crate::timing::Throttle;

pub const HEADER_ID: &str = "header";
const SHRUNK: &str = "shrunk";

pub fn is_shrunk(scroll_y: f64, threshold: f64) -> bool {
    scroll_y > threshold
}

pub fn setup(page: &Page) -> SiteResult<()> {
    let Some(header) = page.document.get_element_by_id(HEADER_ID) else {
        log::debug!("No #{} element, header shrink disabled", HEADER_ID);
        return Ok(());
    };

    let window = page.window.clone();
    let threshold = page.config.header_shrink_offset;
    let update = move || {
        let scroll_y = window.scroll_y().unwrap_or_default();
        dom::set_class(&header, SHRUNK, is_shrunk(scroll_y, threshold));
    };
    update();

    let throttle = Throttle::new(page.config.scroll_throttle_ms);
    dom::listen(&page.window, "scroll", move |_| throttle.call(&update))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shrinks_only_past_the_threshold() {
        assert!(!is_shrunk(0.0, 50.0));
        assert!(!is_shrunk(50.0, 50.0));
        assert!(is_shrunk(50.5, 50.0));
        assert!(is_shrunk(1200.0, 50.0));
    }
}

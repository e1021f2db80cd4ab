use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement, KeyboardEvent};

use crate::dom;
use crate::error::SiteResult;
use crate::site::Page;

pub const TOGGLE_SELECTOR: &str = ".mobile-menu-toggle";
pub const LINKS_SELECTOR: &str = ".nav-links";
pub const NAV_SELECTOR: &str = ".main-nav";
const ACTIVE: &str = "active";

/// Handles to the mobile navigation. The open state lives on the DOM
/// (`.nav-links.active`), so clones all see the same menu.
#[derive(Clone)]
pub struct MobileMenu {
    toggle: Element,
    links: Element,
    body: Option<HtmlElement>,
}

impl MobileMenu {
    pub fn find(page: &Page) -> Option<Self> {
        let toggle = dom::query(&page.document, TOGGLE_SELECTOR)?;
        let links = dom::query(&page.document, LINKS_SELECTOR)?;
        Some(Self {
            toggle,
            links,
            body: page.document.body(),
        })
    }

    pub fn is_open(&self) -> bool {
        dom::has_class(&self.links, ACTIVE)
    }

    pub fn toggle(&self) {
        self.set_open(!self.is_open());
    }

    pub fn close(&self) {
        if self.is_open() {
            self.set_open(false);
        }
    }

    fn set_open(&self, open: bool) {
        dom::set_class(&self.links, ACTIVE, open);
        dom::set_class(&self.toggle, ACTIVE, open);
        let _ = self
            .toggle
            .set_attribute("aria-expanded", if open { "true" } else { "false" });
        // Lock page scrolling behind the open menu.
        if let Some(body) = &self.body {
            let _ = body
                .style()
                .set_property("overflow", if open { "hidden" } else { "" });
        }
    }

    pub fn setup(&self, page: &Page) -> SiteResult<()> {
        let menu = self.clone();
        dom::listen(&self.toggle, "click", move |_| menu.toggle())?;

        let menu = self.clone();
        dom::listen(&page.document, "click", move |e| {
            if menu.is_open() && !dom::event_within(&e, NAV_SELECTOR) {
                menu.close();
            }
        })?;

        let menu = self.clone();
        dom::listen(&page.document, "keydown", move |e| {
            let escape = e
                .dyn_ref::<KeyboardEvent>()
                .map_or(false, |k| k.key() == "Escape");
            if escape {
                menu.close();
            }
        })
    }
}

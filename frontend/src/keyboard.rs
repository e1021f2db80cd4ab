use wasm_bindgen::JsCast;
use web_sys::KeyboardEvent;

use crate::dom;
use crate::dropdown::{DROPDOWN_SELECTOR, OPEN};
use crate::error::SiteResult;
use crate::site::Page;

const KEYBOARD_NAVIGATION: &str = "keyboard-navigation";

pub fn setup(page: &Page) -> SiteResult<()> {
    let document = page.document.clone();
    dom::listen(&page.document, "keydown", move |e| {
        let Some(key) = e.dyn_ref::<KeyboardEvent>().map(|k| k.key()) else {
            return;
        };
        match key.as_str() {
            "Escape" => {
                for dropdown in dom::query_all(&document, DROPDOWN_SELECTOR) {
                    dom::remove_class(&dropdown, OPEN);
                }
            }
            // Focus rings only show once the visitor is using the keyboard.
            "Tab" => {
                if let Some(body) = document.body() {
                    dom::add_class(&body, KEYBOARD_NAVIGATION);
                }
            }
            _ => {}
        }
    })?;

    let document = page.document.clone();
    dom::listen(&page.document, "mousedown", move |_| {
        if let Some(body) = document.body() {
            dom::remove_class(&body, KEYBOARD_NAVIGATION);
        }
    })
}

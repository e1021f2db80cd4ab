//! Page-wide controller.
//!
//! [`Site`] is built once per page view. It owns the configuration and the
//! stateful behaviors (carousel, enquiry form, notifier) and wires every
//! behavior to the document. A behavior whose markup is missing stays off; one
//! that fails to set up is logged and the rest carry on.

use std::rc::Rc;

use web_sys::{Document, Window};

use crate::carousel::Carousel;
use crate::config::SiteConfig;
use crate::dom;
use crate::error::SiteResult;
use crate::form::{ConsoleSink, EnquiryForm, EnquirySink};
use crate::menu::MobileMenu;
use crate::toast::Notifier;
use crate::{diagnostics, dropdown, header, keyboard, reveal, smooth_scroll, stats};

/// What every behavior needs to reach the page.
#[derive(Clone)]
pub struct Page {
    pub window: Window,
    pub document: Document,
    pub config: Rc<SiteConfig>,
}

impl Page {
    pub fn current() -> SiteResult<Self> {
        let window = dom::window()?;
        let document = dom::document()?;
        let config = Rc::new(SiteConfig::load(&document));
        Ok(Self {
            window,
            document,
            config,
        })
    }
}

pub struct Site {
    page: Page,
    menu: Option<MobileMenu>,
    carousel: Option<Rc<Carousel>>,
    form: Option<Rc<EnquiryForm>>,
}

fn report(behavior: &str, result: SiteResult<()>) {
    match result {
        Ok(()) => log::debug!("{} ready", behavior),
        Err(e) => log::error!("Failed to set up {}: {}", behavior, e),
    }
}

impl Site {
    pub fn new(page: Page, sink: Box<dyn EnquirySink>) -> Self {
        let notifier = Notifier::mount(&page);
        let menu = MobileMenu::find(&page);
        let carousel = Carousel::find(&page);
        let form = EnquiryForm::find(&page, notifier.clone(), sink);
        Self {
            page,
            menu,
            carousel,
            form,
        }
    }

    pub fn init(&self) {
        let page = &self.page;
        report("header", header::setup(page));
        if let Some(menu) = &self.menu {
            report("mobile menu", menu.setup(page));
        }
        report("dropdown", dropdown::setup(page));
        if let Some(carousel) = &self.carousel {
            report("carousel", carousel.setup(page));
        }
        report("scroll reveal", reveal::setup(page));
        report("smooth scroll", smooth_scroll::setup(page, self.menu.clone()));
        report("stats", stats::setup(page));
        if let Some(form) = &self.form {
            report("enquiry form", form.setup());
        }
        report("keyboard navigation", keyboard::setup(page));
    }
}

fn start() {
    let page = match Page::current() {
        Ok(page) => page,
        Err(e) => {
            log::error!("Site enhancements disabled: {}", e);
            return;
        }
    };
    report("error logging", diagnostics::install_error_logger(&page));
    diagnostics::observe_paint_timing(&page);

    let site = Site::new(page, Box::new(ConsoleSink));
    site.init();
    log::info!("Site enhancements active");
}

/// Starts the controller once the document has been parsed, so the
/// configuration block and every hook element are present.
pub fn boot() -> SiteResult<()> {
    let document = dom::document()?;
    if document.ready_state() == "loading" {
        let mut started = false;
        dom::listen(&document, "DOMContentLoaded", move |_| {
            if !started {
                started = true;
                start();
            }
        })
    } else {
        start();
        Ok(())
    }
}

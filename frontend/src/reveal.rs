use crate::dom;
use crate::error::SiteResult;
use crate::site::Page;

pub const REVEAL_SELECTOR: &str = ".section-reveal";
const VISIBLE: &str = "visible";

pub fn setup(page: &Page) -> SiteResult<()> {
    let targets = dom::query_all(&page.document, REVEAL_SELECTOR);
    if targets.is_empty() {
        return Ok(());
    }

    let observer = dom::intersection_observer(
        page.config.reveal_threshold,
        Some(page.config.reveal_root_margin.as_str()),
        |entries, _| {
            for entry in entries.iter().filter(|e| e.is_intersecting()) {
                dom::add_class(&entry.target(), VISIBLE);
            }
        },
    )?;
    for target in &targets {
        observer.observe(target);
    }
    log::debug!("Observing {} reveal sections", targets.len());
    Ok(())
}

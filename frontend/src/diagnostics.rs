use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::js_sys::{Array, Function, Object, Reflect};
use web_sys::{ErrorEvent, PerformanceEntry, PerformanceObserver, PerformanceObserverEntryList};

use crate::dom;
use crate::error::SiteResult;
use crate::site::Page;

const LCP_ENTRY_TYPE: &str = "largest-contentful-paint";

/// Logs uncaught script errors. Visitors never see them.
pub fn install_error_logger(page: &Page) -> SiteResult<()> {
    dom::listen(&page.window, "error", |e| {
        match e.dyn_ref::<ErrorEvent>() {
            Some(error) => log::error!(
                "Uncaught error: {} ({}:{}:{})",
                error.message(),
                error.filename(),
                error.lineno(),
                error.colno()
            ),
            None => log::error!("Uncaught error event: {}", e.type_()),
        }
    })
}

/// Logs largest-contentful-paint timings where the browser reports them.
/// Browsers without support are skipped without complaint.
pub fn observe_paint_timing(page: &Page) {
    let supported = Reflect::has(&page.window, &JsValue::from_str("PerformanceObserver"))
        .unwrap_or(false);
    if !supported {
        return;
    }
    if let Err(e) = start_paint_observer() {
        log::debug!("Paint timing unavailable: {:?}", e);
    }
}

fn start_paint_observer() -> Result<(), JsValue> {
    let callback = Closure::wrap(Box::new(
        |list: PerformanceObserverEntryList, _observer: PerformanceObserver| {
            for entry in list.get_entries().iter() {
                let entry: PerformanceEntry = entry.unchecked_into();
                if entry.entry_type() == LCP_ENTRY_TYPE {
                    log::info!("LCP: {:.1}ms", entry.start_time());
                }
            }
        },
    ) as Box<dyn FnMut(PerformanceObserverEntryList, PerformanceObserver)>);

    let observer = PerformanceObserver::new(callback.as_ref().unchecked_ref())?;
    let options = Object::new();
    Reflect::set(
        &options,
        &JsValue::from_str("entryTypes"),
        &Array::of1(&JsValue::from_str(LCP_ENTRY_TYPE)),
    )?;
    // `observe` throws for entry types the browser does not know.
    let observe: Function = Reflect::get(&observer, &JsValue::from_str("observe"))?.dyn_into()?;
    observe.call1(&observer, &options)?;
    callback.forget();
    Ok(())
}

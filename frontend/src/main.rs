use log::info;

mod captcha;
mod carousel;
mod config;
mod diagnostics;
mod dom;
mod dropdown;
mod error;
mod form;
mod header;
mod keyboard;
mod menu;
mod reveal;
mod site;
mod smooth_scroll;
mod stats;
mod timing;
mod toast;
mod validation;

fn main() {
    // Initialize console error panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging
    console_log::init_with_level(config::log_level()).expect("error initializing log");

    info!("Starting site enhancements");
    if let Err(e) = site::boot() {
        log::error!("Could not start site enhancements: {}", e);
    }
}

use log::Level;
use serde::Deserialize;
use web_sys::Document;

use crate::error::{SiteError, SiteResult};

/// Id of the optional `<script type="application/json">` block that overrides defaults.
pub const CONFIG_ELEMENT_ID: &str = "site-config";

#[cfg(debug_assertions)]
pub fn log_level() -> Level {
    Level::Debug // Verbose while running under `trunk serve`
}

#[cfg(not(debug_assertions))]
pub fn log_level() -> Level {
    Level::Info
}

/// Every tunable threshold, delay and message used by the page behaviors.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub header_shrink_offset: f64,
    pub scroll_throttle_ms: u32,
    pub mobile_breakpoint: f64,
    pub resize_debounce_ms: u32,
    pub autoplay_interval_ms: u32,
    pub reveal_threshold: f64,
    pub reveal_root_margin: String,
    pub stats_threshold: f64,
    pub stats_duration_ms: f64,
    pub stats_frame_ms: f64,
    pub scroll_margin: f64,
    pub validation_debounce_ms: u32,
    pub toast_visible_ms: u32,
    pub toast_exit_ms: u32,
    pub submit_message: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            header_shrink_offset: 50.0,
            scroll_throttle_ms: 10,
            mobile_breakpoint: 768.0,
            resize_debounce_ms: 250,
            autoplay_interval_ms: 5000,
            reveal_threshold: 0.1,
            reveal_root_margin: "0px 0px -50px 0px".to_string(),
            stats_threshold: 0.5,
            stats_duration_ms: 2000.0,
            stats_frame_ms: 16.0,
            scroll_margin: 20.0,
            validation_debounce_ms: 300,
            toast_visible_ms: 5000,
            toast_exit_ms: 300,
            submit_message: "Enquiry submitted successfully! We will get back to you soon."
                .to_string(),
        }
    }
}

impl SiteConfig {
    pub fn from_json(raw: &str) -> SiteResult<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that would stall a timer or an animation, or that the
    /// browser refuses as an observer threshold.
    pub fn validate(&self) -> SiteResult<()> {
        let positive = [
            ("autoplay_interval_ms", f64::from(self.autoplay_interval_ms)),
            ("stats_duration_ms", self.stats_duration_ms),
            ("stats_frame_ms", self.stats_frame_ms),
            ("toast_visible_ms", f64::from(self.toast_visible_ms)),
            ("toast_exit_ms", f64::from(self.toast_exit_ms)),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(SiteError::OutOfRange {
                    field,
                    reason: "must be a positive number of milliseconds",
                });
            }
        }
        for (field, value) in [
            ("reveal_threshold", self.reveal_threshold),
            ("stats_threshold", self.stats_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(SiteError::OutOfRange {
                    field,
                    reason: "must be between 0 and 1",
                });
            }
        }
        Ok(())
    }

    /// Reads the embedded override block, falling back to defaults when it is
    /// absent, malformed or out of range.
    pub fn load(document: &Document) -> Self {
        let Some(element) = document.get_element_by_id(CONFIG_ELEMENT_ID) else {
            return Self::default();
        };
        let raw = element.text_content().unwrap_or_default();
        match Self::from_json(&raw) {
            Ok(config) => {
                log::debug!("Loaded site configuration overrides: {:?}", config);
                config
            }
            Err(e) => {
                log::warn!("Ignoring site configuration: {}", e);
                Self::default()
            }
        }
    }
}

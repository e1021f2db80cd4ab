use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error)]
pub enum SiteError {
    #[error("browser window is not available")]
    NoWindow,
    #[error("document is not available")]
    NoDocument,
    #[error("DOM call failed: {0}")]
    Dom(String),
    #[error("invalid site configuration: {0}")]
    Config(#[from] serde_json::Error),
    #[error("invalid site configuration: {field} {reason}")]
    OutOfRange {
        field: &'static str,
        reason: &'static str,
    },
}

impl From<JsValue> for SiteError {
    fn from(value: JsValue) -> Self {
        let text = value
            .as_string()
            .unwrap_or_else(|| format!("{:?}", value));
        SiteError::Dom(text)
    }
}

pub type SiteResult<T> = Result<T, SiteError>;

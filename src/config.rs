use std::path::PathBuf;

/// Process configuration, read once from `POSTLINE_*` env vars at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the blog API server.
    pub api_base: String,
    /// Directory holding the persisted token file.
    pub state_dir: PathBuf,
    /// Page size used for post listings.
    pub page_size: u32,
}

impl Config {
    pub fn from_env() -> Self {
        let api_base = std::env::var("POSTLINE_API_BASE")
            .unwrap_or_else(|_| "http://localhost:5000".to_string());
        let state_dir = std::env::var("POSTLINE_STATE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(".postline"));
        let page_size = std::env::var("POSTLINE_PAGE_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(6);
        Self { api_base, state_dir, page_size }
    }
}

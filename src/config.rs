use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::Result;

pub const DEFAULT_API_URL: &str = "https://auditcom.onrender.com/api";
pub const DEFAULT_SITE_ORIGIN: &str = "https://auditcom.onrender.com";
pub const DEFAULT_DOWNLOAD_NAME: &str = "rapport-auditcom.pdf";

/// Progress maximum used while the real size of a download is unknown.
pub const ESTIMATED_DOWNLOAD_BYTES: u64 = 250 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Settings {
    pub api_url: String,
    /// Origin that relative logo paths are resolved against.
    pub site_origin: String,
    pub template_dir: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub download_name: String,
    pub estimated_bytes: u64,
    pub progress_interval: Duration,
    pub success_clear_after: Duration,
    pub request_timeout: Duration,
    pub proxy: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            site_origin: DEFAULT_SITE_ORIGIN.to_string(),
            template_dir: None,
            output_dir: PathBuf::from("."),
            download_name: DEFAULT_DOWNLOAD_NAME.to_string(),
            estimated_bytes: ESTIMATED_DOWNLOAD_BYTES,
            progress_interval: Duration::from_millis(50),
            success_clear_after: Duration::from_millis(5000),
            request_timeout: Duration::from_secs(300),
            proxy: None,
        }
    }
}

impl Settings {
    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_site_origin(mut self, origin: &str) -> Result<Self> {
        self.site_origin = Url::parse(origin)?.to_string();
        Ok(self)
    }

    pub fn pdfs_url(&self) -> String {
        format!("{}/pdfs", self.api_url)
    }

    pub fn submit_url(&self) -> String {
        format!("{}/submit", self.api_url)
    }

    pub fn download_path(&self) -> PathBuf {
        self.output_dir.join(&self.download_name)
    }
}

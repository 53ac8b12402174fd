//! Client for the auditcom report portal: lists the published PDF reports,
//! submits the report form and streams the generated PDF to disk with
//! progress feedback.

pub mod api;
pub mod config;
pub mod downloader;
pub mod error;
pub mod fade;
pub mod form;
pub mod format;
pub mod message;
pub mod models;
pub mod page;
pub mod progress;
pub mod template;

pub use config::Settings;
pub use error::{PortalError, Result};
pub use page::Page;

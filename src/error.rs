use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server answered {0}")]
    Status(StatusCode),

    #[error("Invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Template '{0}' could not be loaded")]
    Template(String),

    #[error("Invalid template: {0}")]
    TemplateSyntax(#[from] handlebars::TemplateError),

    #[error("Template rendering failed: {0}")]
    Render(#[from] handlebars::RenderError),

    #[error("A submission is already in flight")]
    SubmitInFlight,

    #[error("Download stream failed: {0}")]
    Stream(String),
}

pub type Result<T> = std::result::Result<T, PortalError>;

use std::time::Duration;

use reqwest::{Client, Response};
use tracing::debug;

use crate::config::Settings;
use crate::error::{PortalError, Result};
use crate::models::{FormSubmission, ListPayload};

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    pdfs_url: String,
    submit_url: String,
}

impl ApiClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        let mut client_builder = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(settings.request_timeout);

        if let Some(proxy_url) = settings.proxy.as_deref() {
            client_builder = client_builder.proxy(reqwest::Proxy::http(proxy_url)?);
        }

        Ok(Self {
            client: client_builder.build()?,
            pdfs_url: settings.pdfs_url(),
            submit_url: settings.submit_url(),
        })
    }

    pub async fn fetch_list(&self) -> Result<ListPayload> {
        debug!(url = %self.pdfs_url, "fetching report list");
        let response = self.client.get(&self.pdfs_url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PortalError::Status(status));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Posts the form. The status is left for the caller to judge so that a
    /// refusal can be told apart from a transport failure.
    pub async fn submit(&self, form: &FormSubmission) -> Result<Response> {
        debug!(url = %self.submit_url, fields = form.len(), "submitting form");
        Ok(self.client.post(&self.submit_url).json(form).send().await?)
    }
}

//! The page controller: owns the templates, the report list, the page-wide
//! globals and the message container, and runs the two user-facing flows.

use std::sync::Arc;

use tracing::{error, info, warn};
use url::Url;

use crate::api::ApiClient;
use crate::config::Settings;
use crate::downloader::{save_download, stream_body};
use crate::error::Result;
use crate::form::{ERROR_TEXT, FormController, LOADING_TEXT, SUCCESS_TEXT, SubmitState};
use crate::format::format_date;
use crate::message::{MessageBoard, StatusMessage, StatusView};
use crate::models::{FormSubmission, PdfEntry};
use crate::progress::{Clock, ProgressUpdate};
use crate::template::{Templates, Values};

pub const MISSING_TEAM: &str = "—";
pub const LIST_ERROR_TEXT: &str = "Impossible de charger la liste des rapports.";

pub struct Page {
    settings: Settings,
    api: ApiClient,
    templates: Arc<Templates>,
    clock: Arc<dyn Clock>,
    view: Box<dyn StatusView>,
    globals: Values,
    items: Vec<String>,
    messages: MessageBoard,
    form: FormController,
}

impl Page {
    pub async fn bootstrap(
        settings: Settings,
        clock: Arc<dyn Clock>,
        view: Box<dyn StatusView>,
    ) -> Result<Self> {
        let templates = Arc::new(Templates::load(settings.template_dir.as_deref()).await?);
        let api = ApiClient::new(&settings)?;
        let messages = MessageBoard::new(templates.clone(), settings.success_clear_after);

        Ok(Self {
            settings,
            api,
            templates,
            clock,
            view,
            globals: Values::new(),
            items: Vec::new(),
            messages,
            form: FormController::default(),
        })
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn globals(&self) -> &Values {
        &self.globals
    }

    pub fn submit_state(&self) -> &SubmitState {
        self.form.state()
    }

    /// Fetches the report list and renders one item per entry. Failures end
    /// up in the message container and leave the list untouched.
    pub async fn load_list(&mut self) -> usize {
        let (count, rendered) = match self.fetch_and_render().await {
            Ok(loaded) => loaded,
            Err(e) => {
                error!(error = %e, "failed to load report list");
                self.show_message(StatusMessage::error(LIST_ERROR_TEXT));
                return 0;
            }
        };

        self.globals.insert("count".to_string(), count.to_string());
        let added = rendered.len();
        self.items.extend(rendered);

        info!(count, rendered = added, "report list loaded");
        added
    }

    async fn fetch_and_render(&self) -> Result<(u64, Vec<String>)> {
        let payload = self.api.fetch_list().await?;
        let rendered = payload
            .pdfs
            .iter()
            .map(|entry| {
                self.templates
                    .render_team_item(&entry_values(entry, &self.settings.site_origin))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok((payload.count(), rendered))
    }

    pub fn show_message(&mut self, message: StatusMessage) {
        self.view.show(&message);
        self.messages.show(message, self.clock.now());
    }

    pub fn clear_message(&mut self) {
        self.view.clear();
        self.messages.clear();
    }

    pub fn message(&mut self) -> Option<&StatusMessage> {
        self.messages.current(self.clock.now())
    }

    /// Runs one form submission to completion. Only an overlapping
    /// submission is reported as an error; every other outcome is a state.
    pub async fn submit<I, K, V>(&mut self, fields: I) -> Result<&SubmitState>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.form.begin()?;
        self.clear_message();

        let initial = ProgressUpdate {
            loaded: 0,
            max: self.settings.estimated_bytes,
            percent: 0,
            text: "0%".to_string(),
        };
        self.show_message(StatusMessage::loading(LOADING_TEXT, Some(initial)));

        let form = FormSubmission::from_fields(fields);
        let outcome = self.run_submission(&form).await;

        match &outcome {
            SubmitState::Success { .. } => self.show_message(StatusMessage::success(SUCCESS_TEXT)),
            _ => self.show_message(StatusMessage::error(ERROR_TEXT)),
        }
        Ok(self.form.finish(outcome))
    }

    async fn run_submission(&mut self, form: &FormSubmission) -> SubmitState {
        let mut response = match self.api.submit(form).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "submit request failed");
                return SubmitState::NetworkError {
                    reason: e.to_string(),
                };
            }
        };

        let status = response.status();
        if !status.is_success() {
            error!(status = status.as_u16(), "submission refused by the API");
            return SubmitState::ValidationError {
                status: status.as_u16(),
            };
        }

        let messages = &mut self.messages;
        let view = &mut self.view;
        let clock = self.clock.as_ref();
        let streamed = stream_body(&mut response, &self.settings, clock, |update| {
            let message = StatusMessage::loading(LOADING_TEXT, Some(update.clone()));
            view.show(&message);
            messages.show(message, clock.now());
        })
        .await;

        let body = match streamed {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "download stream failed");
                return SubmitState::NetworkError {
                    reason: e.to_string(),
                };
            }
        };

        match save_download(
            &self.settings.output_dir,
            &self.settings.download_name,
            &body,
        )
        .await
        {
            Ok(path) => SubmitState::Success {
                path,
                bytes: body.len() as u64,
            },
            Err(e) => {
                warn!(error = %e, "could not save the report");
                SubmitState::NetworkError {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// The whole page as HTML: header, list container and message container.
    pub fn render_html(&mut self) -> Result<String> {
        let header = self.templates.render_header(&self.globals)?;
        let message = self
            .messages
            .html(self.clock.now())
            .unwrap_or_default()
            .to_string();

        let mut html = String::new();
        html.push_str(&header);
        html.push_str("<ul id=\"teamList\">\n");
        for item in &self.items {
            html.push_str(item);
        }
        html.push_str("</ul>\n<div id=\"message\">");
        html.push_str(&message);
        html.push_str("</div>\n");
        Ok(html)
    }
}

/// Template values for one list entry.
pub fn entry_values(entry: &PdfEntry, site_origin: &str) -> Values {
    let mut values = Values::new();
    values.insert(
        "teamName".into(),
        entry
            .team_name
            .clone()
            .unwrap_or_else(|| MISSING_TEAM.to_string()),
    );
    values.insert("title".into(), entry.title.clone().unwrap_or_default());
    values.insert("author".into(), entry.author.clone().unwrap_or_default());
    values.insert(
        "uploadedAt".into(),
        entry
            .uploaded_at
            .as_deref()
            .map(format_date)
            .unwrap_or_default(),
    );
    values.insert(
        "logoUrl".into(),
        entry
            .logo_url
            .as_deref()
            .map(|path| logo_url(site_origin, path))
            .unwrap_or_default(),
    );
    values
}

fn logo_url(site_origin: &str, path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }
    match Url::parse(site_origin).and_then(|base| base.join(path)) {
        Ok(url) => url.to_string(),
        Err(e) => {
            warn!(path, error = %e, "could not resolve logo URL");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ORIGIN: &str = "https://auditcom.onrender.com";

    #[test]
    fn missing_team_name_uses_placeholder() {
        let values = entry_values(&PdfEntry::default(), ORIGIN);
        assert_eq!(values["teamName"], MISSING_TEAM);
        assert_eq!(values["title"], "");
        assert_eq!(values["uploadedAt"], "");
        assert_eq!(values["logoUrl"], "");
    }

    #[test]
    fn logo_is_resolved_against_origin() {
        let entry = PdfEntry {
            logo_url: Some("/uploads/logo.png".into()),
            ..PdfEntry::default()
        };
        assert_eq!(
            entry_values(&entry, ORIGIN)["logoUrl"],
            "https://auditcom.onrender.com/uploads/logo.png"
        );

        let relative = PdfEntry {
            logo_url: Some("uploads/logo.png".into()),
            ..PdfEntry::default()
        };
        assert_eq!(
            entry_values(&relative, ORIGIN)["logoUrl"],
            "https://auditcom.onrender.com/uploads/logo.png"
        );
    }

    #[test]
    fn malformed_date_is_shown_as_is() {
        let entry = PdfEntry {
            uploaded_at: Some("not a date".into()),
            ..PdfEntry::default()
        };
        assert_eq!(entry_values(&entry, ORIGIN)["uploadedAt"], "not a date");
    }
}

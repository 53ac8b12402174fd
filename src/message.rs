//! The status banner: one message at a time, success messages expire.

use std::sync::Arc;
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

use crate::progress::ProgressUpdate;
use crate::template::{Templates, Values};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Loading,
    Success,
    Error,
}

impl StatusKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StatusKind::Loading => "loading",
            StatusKind::Success => "success",
            StatusKind::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
    pub progress: Option<ProgressUpdate>,
}

impl StatusMessage {
    pub fn loading(text: impl Into<String>, progress: Option<ProgressUpdate>) -> Self {
        Self {
            text: text.into(),
            kind: StatusKind::Loading,
            progress,
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: StatusKind::Success,
            progress: None,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: StatusKind::Error,
            progress: None,
        }
    }

    /// Placeholder values for the message template. The progress block is
    /// only shown for a loading message that carries progress.
    pub fn template_values(&self) -> Values {
        let mut values = Values::new();
        values.insert("text".into(), self.text.clone());
        values.insert("kind".into(), self.kind.as_str().into());

        match (&self.progress, self.kind) {
            (Some(progress), StatusKind::Loading) => {
                values.insert("progressValue".into(), progress.loaded.to_string());
                values.insert("progressMax".into(), progress.max.to_string());
                values.insert("progressText".into(), progress.text.clone());
                values.insert("progressHidden".into(), String::new());
            }
            _ => {
                values.insert("progressValue".into(), "0".into());
                values.insert("progressMax".into(), "0".into());
                values.insert("progressHidden".into(), "hidden".into());
            }
        }
        values
    }
}

/// Anything that mirrors the banner to the user.
pub trait StatusView: Send {
    fn show(&mut self, message: &StatusMessage);
    fn clear(&mut self);
}

#[derive(Debug)]
struct Displayed {
    message: StatusMessage,
    html: String,
    expires_at: Option<Instant>,
}

/// The single message container of a page.
pub struct MessageBoard {
    templates: Arc<Templates>,
    success_clear_after: Duration,
    displayed: Option<Displayed>,
}

impl MessageBoard {
    pub fn new(templates: Arc<Templates>, success_clear_after: Duration) -> Self {
        Self {
            templates,
            success_clear_after,
            displayed: None,
        }
    }

    /// Replaces whatever is shown and returns the rendered banner.
    pub fn show(&mut self, message: StatusMessage, now: Instant) -> &str {
        let expires_at =
            (message.kind == StatusKind::Success).then(|| now + self.success_clear_after);
        let html = self
            .templates
            .render_message(&message.template_values())
            .unwrap_or_else(|e| {
                warn!(error = %e, "could not render status message");
                String::new()
            });
        let displayed = self.displayed.insert(Displayed {
            message,
            html,
            expires_at,
        });
        &displayed.html
    }

    pub fn clear(&mut self) {
        self.displayed = None;
    }

    /// The visible message at `now`, dropping an expired success message.
    pub fn current(&mut self, now: Instant) -> Option<&StatusMessage> {
        self.expire(now);
        self.displayed.as_ref().map(|d| &d.message)
    }

    pub fn html(&mut self, now: Instant) -> Option<&str> {
        self.expire(now);
        self.displayed.as_ref().map(|d| d.html.as_str())
    }

    /// Clears an expired message; returns whether one was cleared.
    pub fn expire(&mut self, now: Instant) -> bool {
        let expired = self
            .displayed
            .as_ref()
            .and_then(|d| d.expires_at)
            .is_some_and(|at| now >= at);
        if expired {
            self.displayed = None;
        }
        expired
    }
}

/// Terminal rendition of the banner on an `indicatif` bar.
pub struct TerminalStatus {
    pb: ProgressBar,
}

impl TerminalStatus {
    pub fn new() -> Self {
        Self {
            pb: ProgressBar::hidden(),
        }
    }

    fn style(template: &str) -> ProgressStyle {
        ProgressStyle::default_bar()
            .template(template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }
}

impl Default for TerminalStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusView for TerminalStatus {
    fn show(&mut self, message: &StatusMessage) {
        match (message.kind, &message.progress) {
            (StatusKind::Loading, Some(progress)) => {
                if self.pb.is_hidden() || self.pb.is_finished() {
                    self.pb = ProgressBar::new(progress.max);
                }
                self.pb
                    .set_style(Self::style("{msg} {bar:40} {prefix} ({bytes_per_sec})"));
                self.pb.set_length(progress.max);
                self.pb.set_position(progress.loaded);
                self.pb.set_prefix(progress.text.clone());
                self.pb.set_message(message.text.clone());
            }
            (StatusKind::Loading, None) => {
                self.pb = ProgressBar::new_spinner();
                self.pb.set_message(message.text.clone());
            }
            (StatusKind::Success, _) => {
                self.pb.finish_and_clear();
                println!("✔ {}", message.text);
            }
            (StatusKind::Error, _) => {
                self.pb.abandon();
                eprintln!("✘ {}", message.text);
            }
        }
    }

    fn clear(&mut self) {
        self.pb.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::{Clock, ManualClock};

    fn board() -> MessageBoard {
        MessageBoard::new(
            Arc::new(Templates::builtin().unwrap()),
            Duration::from_millis(5000),
        )
    }

    #[test]
    fn success_expires_after_delay() {
        let clock = ManualClock::new();
        let mut board = board();
        board.show(StatusMessage::success("Done"), clock.now());

        clock.advance(Duration::from_millis(4999));
        assert!(board.current(clock.now()).is_some());
        clock.advance(Duration::from_millis(1));
        assert!(board.current(clock.now()).is_none());
    }

    #[test]
    fn superseded_success_does_not_clear_newer_message() {
        let clock = ManualClock::new();
        let mut board = board();
        board.show(StatusMessage::success("Done"), clock.now());
        clock.advance(Duration::from_millis(1000));
        board.show(StatusMessage::error("Failed"), clock.now());
        clock.advance(Duration::from_secs(60));

        let current = board.current(clock.now()).unwrap();
        assert_eq!(current.kind, StatusKind::Error);
    }

    #[test]
    fn loading_with_progress_shows_progress_element() {
        let clock = ManualClock::new();
        let mut board = board();
        let progress = ProgressUpdate {
            loaded: 512,
            max: 1024,
            percent: 50,
            text: "50%".into(),
        };
        let html = board
            .show(StatusMessage::loading("Génération…", Some(progress)), clock.now())
            .to_string();

        assert!(html.contains("message--loading"));
        assert!(html.contains(r#"value="512" max="1024""#));
        assert!(html.contains("50%"));
        assert!(!html.contains("hidden"));
    }

    #[test]
    fn error_hides_progress_and_persists() {
        let clock = ManualClock::new();
        let mut board = board();
        let html = board
            .show(StatusMessage::error("Oops"), clock.now())
            .to_string();
        assert!(html.contains("hidden"));

        clock.advance(Duration::from_secs(3600));
        assert!(board.html(clock.now()).is_some());
    }
}

use std::path::PathBuf;

use crate::error::{PortalError, Result};

pub const LOADING_TEXT: &str = "Génération de votre rapport en cours…";
pub const SUCCESS_TEXT: &str = "Votre rapport a bien été téléchargé.";
pub const ERROR_TEXT: &str = "Une erreur est survenue. Veuillez réessayer.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitState {
    Idle,
    Submitting,
    Success { path: PathBuf, bytes: u64 },
    /// The API refused the form (non-2xx).
    ValidationError { status: u16 },
    /// Transport, stream or save failure.
    NetworkError { reason: String },
}

impl SubmitState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SubmitState::Idle | SubmitState::Submitting)
    }

    /// What the banner says for this state. Both failure kinds read the same.
    pub fn user_text(&self) -> Option<&'static str> {
        match self {
            SubmitState::Idle => None,
            SubmitState::Submitting => Some(LOADING_TEXT),
            SubmitState::Success { .. } => Some(SUCCESS_TEXT),
            SubmitState::ValidationError { .. } | SubmitState::NetworkError { .. } => {
                Some(ERROR_TEXT)
            }
        }
    }
}

/// Tracks the submission lifecycle and refuses overlapping submissions.
#[derive(Debug)]
pub struct FormController {
    state: SubmitState,
}

impl Default for FormController {
    fn default() -> Self {
        Self {
            state: SubmitState::Idle,
        }
    }
}

impl FormController {
    pub fn state(&self) -> &SubmitState {
        &self.state
    }

    pub fn in_flight(&self) -> bool {
        self.state == SubmitState::Submitting
    }

    pub fn begin(&mut self) -> Result<()> {
        if self.in_flight() {
            return Err(PortalError::SubmitInFlight);
        }
        self.state = SubmitState::Submitting;
        Ok(())
    }

    pub fn finish(&mut self, outcome: SubmitState) -> &SubmitState {
        debug_assert!(outcome.is_terminal());
        self.state = outcome;
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_begin_is_refused_while_in_flight() {
        let mut form = FormController::default();
        form.begin().unwrap();
        assert!(matches!(form.begin(), Err(PortalError::SubmitInFlight)));

        form.finish(SubmitState::ValidationError { status: 422 });
        assert!(form.begin().is_ok());
    }

    #[test]
    fn failures_share_user_text() {
        let validation = SubmitState::ValidationError { status: 400 };
        let network = SubmitState::NetworkError {
            reason: "reset".into(),
        };
        assert_eq!(validation.user_text(), network.user_text());
        assert_eq!(validation.user_text(), Some(ERROR_TEXT));
    }
}

use crate::submission::SubmissionState;

pub const PROGRESS_TEXT: &str = "Predicting...";
pub const SUBMIT_TEXT: &str = "Predict";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presentation {
    Nothing,
    Progress(&'static str),
    Result(String),
    Error(String),
}

impl Presentation {
    pub fn text(&self) -> Option<&str> {
        match self {
            Presentation::Nothing => None,
            Presentation::Progress(text) => Some(*text),
            Presentation::Result(text) | Presentation::Error(text) => Some(text.as_str()),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Presentation::Error(_))
    }
}

pub fn present(state: &SubmissionState) -> Presentation {
    match state {
        SubmissionState::Idle => Presentation::Nothing,
        SubmissionState::Busy => Presentation::Progress(PROGRESS_TEXT),
        SubmissionState::Succeeded(text) => Presentation::Result(text.clone()),
        SubmissionState::Failed(text) => Presentation::Error(text.clone()),
    }
}

/// The submit control. It is disabled while a request is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trigger {
    pub label: &'static str,
    pub enabled: bool,
}

pub fn trigger(state: &SubmissionState) -> Trigger {
    if state.is_busy() {
        Trigger {
            label: PROGRESS_TEXT,
            enabled: false,
        }
    } else {
        Trigger {
            label: SUBMIT_TEXT,
            enabled: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_renders_nothing() {
        assert_eq!(present(&SubmissionState::Idle), Presentation::Nothing);
        assert_eq!(present(&SubmissionState::Idle).text(), None);
    }

    #[test]
    fn busy_shows_progress_and_disables_trigger() {
        let state = SubmissionState::Busy;
        assert_eq!(present(&state).text(), Some(PROGRESS_TEXT));
        assert!(!trigger(&state).enabled);
    }

    #[test]
    fn terminal_states_render_their_text() {
        let ok = present(&SubmissionState::Succeeded("Moderate".to_string()));
        assert_eq!(ok.text(), Some("Moderate"));
        assert!(!ok.is_error());

        let failed = present(&SubmissionState::Failed("bad input".to_string()));
        assert_eq!(failed.text(), Some("bad input"));
        assert!(failed.is_error());

        assert_eq!(
            trigger(&SubmissionState::Failed(String::new())),
            Trigger {
                label: SUBMIT_TEXT,
                enabled: true
            }
        );
    }
}

//! Screen state machine for a single user session.
//!
//! ```text
//! Idle -> ImageSelected -> Analyzing -> Result
//!            ^    |                  \-> Error --(dismiss)--> ImageSelected
//!            |    v
//!           Idle (discard)
//! any state --(reset)--> Idle
//! ```
//!
//! A reset during `Analyzing` leaves the running call in flight: no new
//! analysis can start until its (now stale) completion comes back.

use thiserror::Error;

use crate::i18n::Language;
use crate::model::{AnalysisResult, UploadedImage};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Screen {
    #[default]
    Idle,
    ImageSelected {
        image: UploadedImage,
    },
    Analyzing {
        image: UploadedImage,
    },
    Result {
        image: UploadedImage,
        result: AnalysisResult,
    },
    Error {
        image: UploadedImage,
        kind: &'static str,
    },
}

impl Screen {
    pub fn name(&self) -> &'static str {
        match self {
            Screen::Idle => "idle",
            Screen::ImageSelected { .. } => "imageSelected",
            Screen::Analyzing { .. } => "analyzing",
            Screen::Result { .. } => "result",
            Screen::Error { .. } => "error",
        }
    }

    pub fn image(&self) -> Option<&UploadedImage> {
        match self {
            Screen::Idle => None,
            Screen::ImageSelected { image }
            | Screen::Analyzing { image }
            | Screen::Result { image, .. }
            | Screen::Error { image, .. } => Some(image),
        }
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            Screen::Result { result, .. } => Some(result),
            _ => None,
        }
    }

    /// Failure kind of the last analysis, when on the error screen.
    ///
    /// The user-facing text is picked at render time so it follows the
    /// current language.
    pub fn failure(&self) -> Option<&'static str> {
        match self {
            Screen::Error { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot {action} while {state}")]
pub struct TransitionError {
    pub action: &'static str,
    pub state: &'static str,
}

/// Everything an in-flight analysis needs, captured when it starts.
#[derive(Debug, Clone)]
pub struct Ticket {
    pub generation: u64,
    pub image: UploadedImage,
    pub language: Language,
}

/// What happened to a completion handed back to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Stored,
    Stale,
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    screen: Screen,
    language: Language,
    generation: u64,
    in_flight: bool,
}

impl Session {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            ..Self::default()
        }
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Language only affects text rendered and requests issued from now on.
    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    pub fn select_image(&mut self, image: UploadedImage) -> Result<(), TransitionError> {
        match self.screen {
            Screen::Idle | Screen::ImageSelected { .. } => {
                self.screen = Screen::ImageSelected { image };
                Ok(())
            }
            _ => Err(self.refuse("select an image")),
        }
    }

    pub fn discard_image(&mut self) -> Result<(), TransitionError> {
        match self.screen {
            Screen::ImageSelected { .. } => {
                self.screen = Screen::Idle;
                Ok(())
            }
            _ => Err(self.refuse("discard the image")),
        }
    }

    /// True from `begin_analysis` until that analysis completes, even if
    /// the session was reset meanwhile.
    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn begin_analysis(&mut self) -> Result<Ticket, TransitionError> {
        if self.in_flight {
            return Err(TransitionError {
                action: "start an analysis",
                state: "analyzing",
            });
        }
        let image = match &self.screen {
            Screen::ImageSelected { image } => image.clone(),
            _ => return Err(self.refuse("start an analysis")),
        };
        self.screen = Screen::Analyzing {
            image: image.clone(),
        };
        self.in_flight = true;
        Ok(Ticket {
            generation: self.generation,
            image,
            language: self.language,
        })
    }

    /// Stores the outcome of the analysis started with `ticket`.
    ///
    /// Completions for a ticket issued before the last reset are dropped,
    /// but still free the session for the next analysis.
    pub fn complete(
        &mut self,
        ticket: Ticket,
        outcome: Result<AnalysisResult, &'static str>,
    ) -> Applied {
        self.in_flight = false;
        if ticket.generation != self.generation
            || !matches!(self.screen, Screen::Analyzing { .. })
        {
            return Applied::Stale;
        }
        self.screen = match outcome {
            Ok(result) => Screen::Result {
                image: ticket.image,
                result,
            },
            Err(kind) => Screen::Error {
                image: ticket.image,
                kind,
            },
        };
        Applied::Stored
    }

    /// "Try again": back to the confirm screen with the same image.
    pub fn dismiss_error(&mut self) -> Result<(), TransitionError> {
        match std::mem::take(&mut self.screen) {
            Screen::Error { image, .. } => {
                self.screen = Screen::ImageSelected { image };
                Ok(())
            }
            other => {
                self.screen = other;
                Err(self.refuse("dismiss an error"))
            }
        }
    }

    /// Clears image, result and error together.
    pub fn reset(&mut self) {
        self.screen = Screen::Idle;
        self.generation += 1;
    }

    fn refuse(&self, action: &'static str) -> TransitionError {
        TransitionError {
            action,
            state: self.screen.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FeatureAnalysis;

    fn image(name: &str) -> UploadedImage {
        UploadedImage {
            base64: name.to_string(),
            mime_type: "image/jpeg".into(),
            preview_url: format!("data:image/jpeg;base64,{name}"),
        }
    }

    fn result() -> AnalysisResult {
        AnalysisResult {
            overall_score: 7.0,
            potential_score: 8.5,
            summary: "Well groomed".into(),
            face_shape: "Oval".into(),
            skin_quality: "Clear".into(),
            best_feature: "Jawline".into(),
            features: vec![FeatureAnalysis {
                feature: "Jawline".into(),
                score: 8.0,
                comment: "Well-defined".into(),
            }],
            improvements: vec!["Try a shorter beard".into()],
        }
    }

    #[test]
    fn happy_path_reaches_result() {
        let mut session = Session::default();
        session.select_image(image("a")).unwrap();
        let ticket = session.begin_analysis().unwrap();
        assert_eq!(session.screen().name(), "analyzing");

        assert_eq!(session.complete(ticket, Ok(result())), Applied::Stored);
        assert_eq!(session.screen().result(), Some(&result()));
        assert_eq!(session.screen().image(), Some(&image("a")));
    }

    #[test]
    fn failure_reaches_error_and_dismiss_returns_to_confirm() {
        let mut session = Session::default();
        session.select_image(image("a")).unwrap();
        let ticket = session.begin_analysis().unwrap();
        session.complete(ticket, Err("transport"));
        assert_eq!(session.screen().failure(), Some("transport"));
        assert!(session.screen().result().is_none());

        session.dismiss_error().unwrap();
        assert_eq!(
            session.screen(),
            &Screen::ImageSelected { image: image("a") }
        );
        assert!(session.begin_analysis().is_ok());
    }

    #[test]
    fn second_analyze_while_analyzing_changes_nothing() {
        let mut session = Session::default();
        session.select_image(image("a")).unwrap();
        session.begin_analysis().unwrap();
        let before = session.screen().clone();

        let err = session.begin_analysis().unwrap_err();
        assert_eq!(err.state, "analyzing");
        assert_eq!(session.screen(), &before);
    }

    #[test]
    fn analyze_requires_an_image() {
        let mut session = Session::default();
        assert!(session.begin_analysis().is_err());
        assert_eq!(session.screen(), &Screen::Idle);
    }

    #[test]
    fn discard_only_from_image_selected() {
        let mut session = Session::default();
        assert!(session.discard_image().is_err());
        session.select_image(image("a")).unwrap();
        session.discard_image().unwrap();
        assert_eq!(session.screen(), &Screen::Idle);
    }

    #[test]
    fn picking_a_new_file_replaces_the_old_one() {
        let mut session = Session::default();
        session.select_image(image("a")).unwrap();
        session.select_image(image("b")).unwrap();
        assert_eq!(session.screen().image(), Some(&image("b")));
    }

    #[test]
    fn reset_clears_everything_from_result_and_error() {
        for outcome in [Ok(result()), Err("boom")] {
            let mut session = Session::default();
            session.select_image(image("a")).unwrap();
            let ticket = session.begin_analysis().unwrap();
            session.complete(ticket, outcome);

            session.reset();
            assert_eq!(session.screen(), &Screen::Idle);
            assert!(session.screen().image().is_none());
            assert!(session.screen().result().is_none());
            assert!(session.screen().failure().is_none());
        }
    }

    #[test]
    fn completion_after_reset_is_dropped() {
        let mut session = Session::default();
        session.select_image(image("a")).unwrap();
        let stale = session.begin_analysis().unwrap();
        session.reset();
        session.select_image(image("b")).unwrap();

        assert_eq!(session.complete(stale, Ok(result())), Applied::Stale);
        assert_eq!(
            session.screen(),
            &Screen::ImageSelected { image: image("b") }
        );
        assert!(!session.in_flight());

        let fresh = session.begin_analysis().unwrap();
        assert_eq!(session.complete(fresh, Err("x")), Applied::Stored);
        assert_eq!(session.screen().image(), Some(&image("b")));
    }

    #[test]
    fn reset_does_not_allow_a_second_call_in_flight() {
        let mut session = Session::default();
        session.select_image(image("a")).unwrap();
        let first = session.begin_analysis().unwrap();

        session.reset();
        assert_eq!(session.screen(), &Screen::Idle);
        assert!(session.in_flight());

        session.select_image(image("b")).unwrap();
        let err = session.begin_analysis().unwrap_err();
        assert_eq!(err.state, "analyzing");
        assert_eq!(
            session.screen(),
            &Screen::ImageSelected { image: image("b") }
        );

        session.complete(first, Ok(result()));
        assert!(session.begin_analysis().is_ok());
    }

    #[test]
    fn language_change_keeps_stored_result_and_ticket() {
        let mut session = Session::new(Language::Es);
        session.select_image(image("a")).unwrap();
        let ticket = session.begin_analysis().unwrap();
        session.set_language(Language::Ja);
        assert_eq!(ticket.language, Language::Es);

        session.complete(ticket, Ok(result()));
        session.set_language(Language::Fr);
        assert_eq!(session.screen().result(), Some(&result()));
        assert_eq!(session.language(), Language::Fr);
    }
}

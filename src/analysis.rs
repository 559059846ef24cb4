use async_trait::async_trait;
use thiserror::Error;

use crate::i18n::Language;
use crate::model::{AnalysisResult, UploadedImage};
use crate::schema::SchemaError;

/// Why an analysis did not produce a result.
///
/// Users only ever see one localized message for all of these; the variants
/// exist for logs.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("request to the model failed: {0}")]
    Transport(String),

    #[error("model API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("prompt was blocked: {0}")]
    Blocked(String),

    #[error("model returned no text")]
    EmptyResponse,

    #[error("could not decode model API response: {0}")]
    Malformed(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl AnalysisError {
    /// Short label for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::InvalidInput(_) => "invalid_input",
            AnalysisError::Transport(_) => "transport",
            AnalysisError::Status { .. } => "status",
            AnalysisError::Blocked(_) => "blocked",
            AnalysisError::EmptyResponse => "empty_response",
            AnalysisError::Malformed(_) => "malformed",
            AnalysisError::Schema(_) => "schema",
        }
    }
}

#[async_trait]
pub trait Analyzer: Send + Sync {
    fn name(&self) -> &str;

    async fn analyze(
        &self,
        image: &UploadedImage,
        language: Language,
    ) -> Result<AnalysisResult, AnalysisError>;
}

/// Rejects payloads no remote call should be spent on.
pub fn check_input(image: &UploadedImage) -> Result<(), AnalysisError> {
    if image.base64.is_empty() {
        return Err(AnalysisError::InvalidInput("image payload is empty".into()));
    }
    if !image.mime_type.starts_with("image/") {
        return Err(AnalysisError::InvalidInput(format!(
            "`{}` is not an image media type",
            image.mime_type
        )));
    }
    Ok(())
}

pub fn system_instruction(language: Language) -> String {
    let name = language.english_name();
    format!(
        "You are Aesthetica, a high-end beauty and style AI consultant. \
         Your tone is professional, clinical, yet encouraging. \
         You must communicate in {name}."
    )
}

pub fn instruction(language: Language) -> String {
    let name = language.english_name();
    format!(
        "Act as a world-class aesthetic consultant, dermatologist, and stylist.
Analyze the person in this image.
Provide a realistic, objective rating of their facial aesthetics, grooming, and style.
Focus on constructive, actionable advice.
Do not be overly flattering; be honest but polite.

IMPORTANT: Return the response in {name} language.
Translate the summary, faceShape, skinQuality, bestFeature, feature comments, and improvements into {name}.

Identify their face shape, skin quality, and best features.
Suggest specific improvements (e.g., hairstyle changes, skincare ingredients, beard shaping, makeup tips, fashion advice)."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instructions_name_the_target_language() {
        for lang in Language::ALL {
            let name = lang.english_name();
            assert!(instruction(lang).contains(&format!("Return the response in {name} language")));
            assert!(instruction(lang).contains(&format!("improvements into {name}")));
            assert!(system_instruction(lang).ends_with(&format!("communicate in {name}.")));
        }
    }

    #[test]
    fn input_check_rejects_empty_and_non_images() {
        let mut image = UploadedImage {
            base64: String::new(),
            mime_type: "image/png".into(),
            preview_url: String::new(),
        };
        assert!(matches!(
            check_input(&image),
            Err(AnalysisError::InvalidInput(_))
        ));

        image.base64 = "aGVsbG8=".into();
        image.mime_type = "text/plain".into();
        assert!(matches!(
            check_input(&image),
            Err(AnalysisError::InvalidInput(_))
        ));

        image.mime_type = "image/jpeg".into();
        assert!(check_input(&image).is_ok());
    }
}

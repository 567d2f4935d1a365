use serde::{Deserialize, Serialize};

use crate::NameFilter;

/// Core trait that all extractors must implement
pub trait Extractor {
    /// What a successful extraction hands back to the caller
    type Output;

    /// Extract entities from input
    fn extract(&self, input: &ExtractionInput) -> Result<Self::Output, ExtractionError>;

    /// Get extractor version for tracking
    fn version(&self) -> String {
        "1.0.0".to_string()
    }
}

/// Failures that make a whole schedule email unusable, plus the soft "nothing matched" signal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    /// No "<Month> <day> - <day>" phrase anywhere in subject or body. The email is not a schedule.
    #[error("No date window found in subject or body")]
    NoDateWindowFound,

    /// A schedule was found but zero records survived parsing and filtering.
    #[error("Schedule parsed but no rows matched")]
    NoRowsParsed,
}

/// Extraction error types
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}

/// Input provided to extractors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionInput {
    // Email identification
    pub email_id: String,

    // Email content
    pub subject: String,
    pub body_text: String,
    pub body_html: Option<String>,

    // Email metadata
    pub received_at: Option<i64>, // Unix timestamp

    // User context
    pub user_timezone: String,
    pub name_filter: NameFilter,

    // Pins the year instead of inferring it from `received_at`
    pub reference_year: Option<i32>,
}

impl ExtractionInput {
    /// Input with only subject and plain-text body, no filter, no received date
    pub fn from_text(subject: &str, body_text: &str) -> Self {
        Self {
            email_id: String::new(),
            subject: subject.to_string(),
            body_text: body_text.to_string(),
            body_html: None,
            received_at: None,
            user_timezone: "UTC".to_string(),
            name_filter: NameFilter::disabled(),
            reference_year: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_error_converts_into_extraction_error() {
        let err: ExtractionError = ScheduleError::NoDateWindowFound.into();
        assert!(matches!(
            err,
            ExtractionError::Schedule(ScheduleError::NoDateWindowFound)
        ));
        assert_eq!(err.to_string(), "No date window found in subject or body");
    }

    #[test]
    fn test_extraction_input_serialization() {
        let mut input = ExtractionInput::from_text("Schedule", "9 Tuesday");
        input.reference_year = Some(2025);

        let json = serde_json::to_string(&input).unwrap();
        let deserialized: ExtractionInput = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.subject, "Schedule");
        assert_eq!(deserialized.reference_year, Some(2025));
        assert!(!deserialized.name_filter.enabled);
    }
}

//! Error types for catalog handling and session data entry.
//!
//! Only conditions the caller must react to are errors. Lenient cases such as
//! an unrecognized grade or a semester without subjects are handled in place.

use thiserror::Error;

/// Reasons a subject catalog is rejected.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The input is not valid JSON or does not have the catalog shape.
    #[error("invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A top-level key is not one of `sem1`..`semN`.
    #[error("unknown semester key '{0}' (expected sem1..sem{max})", max = crate::model::NUM_SEMESTERS)]
    UnknownSemesterKey(String),

    /// A subject has an empty code.
    #[error("{semester}: subject '{name}' has an empty code")]
    EmptyCode { semester: String, name: String },

    /// The same code appears twice inside one semester.
    #[error("{semester}: duplicate subject code '{code}'")]
    DuplicateCode { semester: String, code: String },

    /// Credits are negative, NaN or infinite.
    #[error("{semester}: subject '{code}' has invalid credits {credits}")]
    InvalidCredits {
        semester: String,
        code: String,
        credits: f64,
    },
}

/// Errors raised while turning user entries into store updates.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Semester number outside `1..=NUM_SEMESTERS`.
    #[error("semester {0} is out of range (1..={max})", max = crate::model::NUM_SEMESTERS)]
    SemesterOutOfRange(u32),

    /// The subject code is not listed under the given semester.
    #[error("subject '{code}' is not part of {semester}")]
    UnknownSubject { semester: String, code: String },
}

impl SessionError {
    /// Returns `true` if the entry referenced something missing from the catalog.
    pub fn is_catalog_miss(&self) -> bool {
        matches!(self, SessionError::UnknownSubject { .. })
    }
}

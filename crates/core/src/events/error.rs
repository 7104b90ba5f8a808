use thiserror::Error;

/// Errors raised while validating a submission before anything is
/// persisted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("either provide a title or mark it as not announced")]
    TitleMissing,
    #[error("unknown person reference: {0}")]
    UnknownPerson(String),
    #[error("invalid {field}: {message}")]
    Field {
        field: &'static str,
        message: String,
    },
}

use std::fmt::{self, Display};

/// Errors produced by model constructors and payload mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// The payload carried none of the recognised id fields.
    MissingId,
    /// An id was present but blank.
    EmptyId,
    /// The payload was not a JSON object.
    InvalidPayload(String),
    /// A sort mode string did not name any known mode.
    UnknownSortMode(String),
}

impl Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::MissingId => write!(f, "listing payload has no id"),
            ModelError::EmptyId => write!(f, "listing id cannot be empty"),
            ModelError::InvalidPayload(msg) => {
                write!(f, "invalid listing payload: {msg}")
            }
            ModelError::UnknownSortMode(raw) => {
                write!(f, "unknown sort mode: {raw}")
            }
        }
    }
}

impl std::error::Error for ModelError {}

pub type Result<T> = std::result::Result<T, ModelError>;

//! Error types for ifcheck.
//!
//! Only document-level and programming errors live here. Per-interface data
//! problems never become errors; they degrade to `Verdict::NotApplicable`.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IfcheckError {
    #[error("Unrecognised RESTCONF document: {0}")]
    Schema(String),

    #[error("Invalid check '{id}': {reason}")]
    InvalidCheck { id: String, reason: String },

    #[error("Invalid field path '{0}'")]
    InvalidPath(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl IfcheckError {
    pub fn invalid_check(id: impl Into<String>, reason: impl Into<String>) -> Self {
        IfcheckError::InvalidCheck {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Process exit code the CLI uses for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            IfcheckError::Schema(_) | IfcheckError::Json(_) => 3,
            IfcheckError::InvalidCheck { .. }
            | IfcheckError::InvalidPath(_)
            | IfcheckError::Config(_) => 2,
            IfcheckError::Io(_) => 4,
        }
    }
}

pub type Result<T> = std::result::Result<T, IfcheckError>;

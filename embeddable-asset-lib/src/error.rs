use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced by extraction, rewriting and verification.
///
/// A selector or property that cannot be found is not represented here:
/// lookups return `Ok(None)` for plain absence.
#[derive(Debug, Error)]
pub enum EmbedError {
    /// A declaration was located but did not yield a usable value.
    #[error("malformed declaration `{declaration}`: no value after the property name")]
    MalformedValue { declaration: String },

    /// An asset resolver or build collaborator failed.
    #[error("{collaborator} failed: {message}")]
    CollaboratorFailure {
        collaborator: &'static str,
        message: String,
    },

    #[error("invalid pattern `{pattern}`: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl EmbedError {
    pub fn collaborator(collaborator: &'static str, message: impl Into<String>) -> Self {
        EmbedError::CollaboratorFailure {
            collaborator,
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EmbedError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, EmbedError>;

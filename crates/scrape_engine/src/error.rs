use std::io;
use std::path::{Path, PathBuf};

use scrape_core::EnvelopeError;
use thiserror::Error;

use crate::persist::PersistError;

/// Failures raised by handlers, the mime registry and conversions.
///
/// Every variant names the file or operation it concerns.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("unable to find a suitable mime type for file: {filename}")]
    UnsupportedFormat { filename: String },
    #[error("validation error in {context}: {message}")]
    Validation { context: String, message: String },
    #[error("io error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl HandlerError {
    pub(crate) fn io(path: &Path) -> impl FnOnce(io::Error) -> HandlerError + '_ {
        move |source| HandlerError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn validation(context: impl Into<String>, message: impl ToString) -> Self {
        HandlerError::Validation {
            context: context.into(),
            message: message.to_string(),
        }
    }
}

impl From<EnvelopeError> for HandlerError {
    fn from(err: EnvelopeError) -> Self {
        match err {
            EnvelopeError::Validation { context, source }
            | EnvelopeError::Serialize { context, source } => HandlerError::Validation {
                context,
                message: source.to_string(),
            },
        }
    }
}

impl From<PersistError> for HandlerError {
    fn from(err: PersistError) -> Self {
        let path = err.path().to_path_buf();
        HandlerError::Io {
            path,
            source: err.into_source(),
        }
    }
}

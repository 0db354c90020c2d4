//! Error types for compiling, saving and serving stylesheets.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use camino::Utf8PathBuf;

/// Errors that can occur while compiling, saving or serving stylesheets.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The compiler rejected the source.
    #[error("failed to compile {path}: {message}")]
    Compile { path: Utf8PathBuf, message: String },

    /// The entry stylesheet does not exist.
    #[error("stylesheet source not found: {0}")]
    SourceNotFound(Utf8PathBuf),

    /// The source path has no `name.ext` final segment.
    #[error("cannot derive an output file name from {0}")]
    MalformedPath(String),

    /// A requested stylesheet name is not a plain file name.
    #[error("invalid stylesheet name: {0:?}")]
    InvalidName(String),

    /// I/O error while creating, writing or deleting output files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The cleanup target exists but is not a directory.
    #[error("could not delete CSS files because the given path is not a directory: {0}")]
    CleanupTargetNotDirectory(Utf8PathBuf),

    /// A file in a batch failed; files before it were written.
    #[error("batch compilation stopped at {file}: {source}")]
    Batch {
        file: String,
        #[source]
        source: Box<Error>,
    },

    /// The blocking compile task panicked or was cancelled.
    #[error("compile task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// HTTP status for this error when it escapes a request handler.
    pub fn status(&self) -> StatusCode {
        match self {
            Error::SourceNotFound(_) | Error::InvalidName(_) | Error::MalformedPath(_) => {
                StatusCode::NOT_FOUND
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "stylesheet request failed");
        } else {
            tracing::debug!(error = %self, "stylesheet not served");
        }
        (status, self.to_string()).into_response()
    }
}

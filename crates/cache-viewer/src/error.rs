//! Error types for the cache viewer

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cache_dir::CacheDirError;
use std::fmt;

/// Startup and runtime errors for the service process
#[derive(Debug)]
pub enum ViewerError {
    Io(Box<std::io::Error>),
    Config(String),
}

impl fmt::Display for ViewerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewerError::Io(err) => write!(f, "IO error: {}", err),
            ViewerError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for ViewerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ViewerError::Io(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ViewerError {
    fn from(err: std::io::Error) -> Self {
        ViewerError::Io(Box::new(err))
    }
}

impl From<tracing_subscriber::filter::ParseError> for ViewerError {
    fn from(err: tracing_subscriber::filter::ParseError) -> Self {
        ViewerError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ViewerError>;

/// Request error rendered as a status code and a plain-text body
#[derive(Debug)]
pub enum ApiError {
    MissingParam(&'static str),
    Cache(CacheDirError),
}

impl From<CacheDirError> for ApiError {
    fn from(err: CacheDirError) -> Self {
        ApiError::Cache(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::MissingParam(name) => {
                (StatusCode::BAD_REQUEST, format!("Missing {} parameter", name))
            }
            ApiError::Cache(err) => {
                let status = match &err {
                    CacheDirError::InvalidPath(_) => StatusCode::BAD_REQUEST,
                    CacheDirError::NotFound(_) => StatusCode::NOT_FOUND,
                    CacheDirError::DirectoryUnreadable { .. }
                    | CacheDirError::DeleteFailed { .. }
                    | CacheDirError::UnsupportedPlatform(_)
                    | CacheDirError::LaunchFailed(_)
                    | CacheDirError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                if status.is_server_error() {
                    tracing::error!(error = %err, "Request failed");
                }
                (status, describe(&err))
            }
        };

        (status, message).into_response()
    }
}

fn describe(err: &CacheDirError) -> String {
    match err {
        CacheDirError::DeleteFailed {
            summary: Some(summary),
            ..
        } => {
            let mut message = format!(
                "Unable to delete {} of {} files",
                summary.failures.len(),
                summary.deleted + summary.failures.len()
            );
            for failure in &summary.failures {
                message.push_str(&format!("\n{}: {}", failure.name, failure.error));
            }
            message
        }
        other => other.to_string(),
    }
}

use axum::{http::StatusCode, Json};
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

/// Closed taxonomy of validation and scenario failures. Every fallible
/// operation in the core returns one of these; nothing panics across a
/// module boundary.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("invalid input: {reason}")]
    InvalidInput { path: String, reason: String },
    /// Carries only the caller-supplied string, never a resolved absolute
    /// path outside the allowed root.
    #[error("path traversal detected in {path:?}")]
    PathTraversal { path: String },
    #[error("path does not exist: {path}")]
    NotFound { path: String },
    #[error("path is not a directory: {path}")]
    NotADirectory { path: String },
    #[error("path is not a file: {path}")]
    NotAFile { path: String },
    #[error("not readable: {path}")]
    PermissionDenied { path: String },
    #[error("file too large: {path} is {size} bytes (max: {limit})")]
    TooLarge { path: String, size: u64, limit: u64 },
    #[error("directory depth {depth} exceeds maximum {limit}: {path}")]
    TooDeep {
        path: String,
        depth: usize,
        limit: usize,
    },
    #[error("not a valid scenario directory: {path}")]
    InvalidScenario { path: String },
    #[error("failed to load {file} in scenario {path}: {reason}")]
    ScenarioLoad {
        path: String,
        file: String,
        reason: String,
    },
    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub kind: &'static str,
    pub path: String,
    pub reason: &'static str,
    pub message: String,
}

impl ValidationError {
    /// Variant tag, matching the names in the interchange contract.
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationError::InvalidInput { .. } => "InvalidInput",
            ValidationError::PathTraversal { .. } => "PathTraversal",
            ValidationError::NotFound { .. } => "NotFound",
            ValidationError::NotADirectory { .. } => "NotADirectory",
            ValidationError::NotAFile { .. } => "NotAFile",
            ValidationError::PermissionDenied { .. } => "PermissionDenied",
            ValidationError::TooLarge { .. } => "TooLarge",
            ValidationError::TooDeep { .. } => "TooDeep",
            ValidationError::InvalidScenario { .. } => "InvalidScenario",
            ValidationError::ScenarioLoad { .. } => "ScenarioLoadFailure",
            ValidationError::Internal(_) => "Internal",
        }
    }

    /// Machine-stable reason code, distinct from the display message so
    /// callers never have to string-match.
    pub fn reason(&self) -> &'static str {
        match self {
            ValidationError::InvalidInput { .. } => "invalid_input",
            ValidationError::PathTraversal { .. } => "path_traversal",
            ValidationError::NotFound { .. } => "not_found",
            ValidationError::NotADirectory { .. } => "not_a_directory",
            ValidationError::NotAFile { .. } => "not_a_file",
            ValidationError::PermissionDenied { .. } => "permission_denied",
            ValidationError::TooLarge { .. } => "too_large",
            ValidationError::TooDeep { .. } => "too_deep",
            ValidationError::InvalidScenario { .. } => "invalid_scenario",
            ValidationError::ScenarioLoad { .. } => "scenario_load_failure",
            ValidationError::Internal(_) => "internal",
        }
    }

    /// The offending path, echoed back to the caller.
    pub fn path(&self) -> &str {
        match self {
            ValidationError::InvalidInput { path, .. }
            | ValidationError::PathTraversal { path }
            | ValidationError::NotFound { path }
            | ValidationError::NotADirectory { path }
            | ValidationError::NotAFile { path }
            | ValidationError::PermissionDenied { path }
            | ValidationError::TooLarge { path, .. }
            | ValidationError::TooDeep { path, .. }
            | ValidationError::InvalidScenario { path }
            | ValidationError::ScenarioLoad { path, .. } => path,
            ValidationError::Internal(_) => "",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ValidationError::InvalidInput { .. }
            | ValidationError::NotADirectory { .. }
            | ValidationError::NotAFile { .. }
            | ValidationError::TooDeep { .. } => StatusCode::BAD_REQUEST,
            ValidationError::PathTraversal { .. } | ValidationError::PermissionDenied { .. } => {
                StatusCode::FORBIDDEN
            }
            ValidationError::NotFound { .. } => StatusCode::NOT_FOUND,
            ValidationError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ValidationError::InvalidScenario { .. } | ValidationError::ScenarioLoad { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ValidationError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Maps an I/O failure on `path` into the taxonomy. Used for the
    /// check-to-use gap: a path that validated a moment ago may be gone by
    /// the time it is read.
    pub fn from_io(err: std::io::Error, path: &Path) -> Self {
        let path = path.display().to_string();
        match err.kind() {
            std::io::ErrorKind::NotFound => ValidationError::NotFound { path },
            std::io::ErrorKind::PermissionDenied => ValidationError::PermissionDenied { path },
            _ => ValidationError::Internal(format!("{path}: {err}")),
        }
    }
}

pub type ValidationResult<T> = Result<T, ValidationError>;

pub fn into_response(err: ValidationError) -> (StatusCode, Json<ErrorBody>) {
    let body = ErrorBody {
        kind: err.kind(),
        path: err.path().to_string(),
        reason: err.reason(),
        message: err.to_string(),
    };
    (err.status(), Json(body))
}

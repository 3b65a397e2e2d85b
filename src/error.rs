//! Error types for condition expansion

use pyo3::exceptions::{PyAssertionError, PyOSError, PyRuntimeError, PyValueError};
use pyo3::PyErr;
use thiserror::Error;

/// Main error type for condition and CASE statement expansion
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaseError {
    /// A required token was missing or an unexpected one was found
    #[error("Syntax error: {0}")]
    Syntax(String),

    /// A CASE block did not start with CASE or had no END
    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Invalid rule: {0}")]
    InvalidRule(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for CaseError {
    fn from(err: std::io::Error) -> Self {
        CaseError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for CaseError {
    fn from(err: serde_json::Error) -> Self {
        CaseError::Serialization(err.to_string())
    }
}

impl From<CaseError> for PyErr {
    fn from(err: CaseError) -> PyErr {
        match err {
            CaseError::Syntax(msg) => PyValueError::new_err(format!("Syntax error: {}", msg)),
            CaseError::Precondition(msg) => PyAssertionError::new_err(msg),
            CaseError::InvalidRule(msg) => PyValueError::new_err(format!("Invalid rule: {}", msg)),
            CaseError::Io(msg) => PyOSError::new_err(msg),
            CaseError::Serialization(msg) => {
                PyRuntimeError::new_err(format!("Serialization error: {}", msg))
            }
        }
    }
}

/// Result type alias for condition expansion
pub type Result<T> = std::result::Result<T, CaseError>;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Infrastructure failures: the only errors that escape a repository pass.
#[derive(Debug, Error)]
pub enum Error {
    #[error("sandbox error: {0}")]
    Sandbox(#[from] duckdb::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
    #[error("sink error: {0}")]
    Sink(#[from] SinkError),
}

/// Failure writing to the persistence sink.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to write record: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Engine error classes, read off the message prefix the engine emits
/// (`Catalog Error: ...`, `Binder Error: ...`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineErrorKind {
    /// Unknown table, schema or function
    Catalog,
    /// Unresolved column, ambiguous reference, type mismatch while binding
    Binder,
    Parser,
    Conversion,
    NotImplemented,
    Other,
}

impl EngineErrorKind {
    pub fn classify(message: &str) -> Self {
        let head = message.trim_start();
        if head.starts_with("Catalog Error") {
            EngineErrorKind::Catalog
        } else if head.starts_with("Binder Error") {
            EngineErrorKind::Binder
        } else if head.starts_with("Parser Error") {
            EngineErrorKind::Parser
        } else if head.starts_with("Conversion Error") {
            EngineErrorKind::Conversion
        } else if head.starts_with("Not implemented Error") {
            EngineErrorKind::NotImplemented
        } else {
            EngineErrorKind::Other
        }
    }
}

impl fmt::Display for EngineErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineErrorKind::Catalog => write!(f, "Catalog Error"),
            EngineErrorKind::Binder => write!(f, "Binder Error"),
            EngineErrorKind::Parser => write!(f, "Parser Error"),
            EngineErrorKind::Conversion => write!(f, "Conversion Error"),
            EngineErrorKind::NotImplemented => write!(f, "Not Implemented"),
            EngineErrorKind::Other => write!(f, "Error"),
        }
    }
}

/// Why a single statement failed validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatementError {
    #[error("parse error: {0}")]
    Parse(String),
    #[error("{message}")]
    Execution {
        kind: EngineErrorKind,
        message: String,
    },
    #[error("plan capture failed: {0}")]
    PlanCapture(String),
}

impl StatementError {
    pub fn execution(err: &duckdb::Error) -> Self {
        let message = err.to_string();
        StatementError::Execution {
            kind: EngineErrorKind::classify(&message),
            message,
        }
    }

    /// Short class label persisted next to the message.
    pub fn kind_label(&self) -> String {
        match self {
            StatementError::Parse(_) => "Parse Error".to_string(),
            StatementError::Execution { kind, .. } => kind.to_string(),
            StatementError::PlanCapture(_) => "Plan Capture Error".to_string(),
        }
    }
}

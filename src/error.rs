//! Error types shared by the grammars, sources, readers and writers.

use std::path::PathBuf;
use thiserror::Error;

use crate::graph::GraphError;

/// Errors raised while reading or writing graph corpora.
///
/// `Format` is the per-record error: it carries the raw line or token that
/// could not be interpreted so callers can log it and decide whether to skip
/// or abort.
#[derive(Debug, Error)]
pub enum GraphFormatError {
    #[error("{message} : {line}")]
    Format { message: String, line: String },

    #[error("Input path is invalid: {0}")]
    InvalidInput(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("XML error in {path}: {message}")]
    Xml { path: PathBuf, message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("Reader stopped after a format error; call reset() to read again")]
    Poisoned,
}

impl GraphFormatError {
    /// Create a format error for an offending line or token.
    pub fn format(message: impl Into<String>, line: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
            line: line.into(),
        }
    }

    /// The raw line or token that caused the error, if any.
    pub fn line(&self) -> Option<&str> {
        match self {
            Self::Format { line, .. } => Some(line),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, GraphFormatError>;

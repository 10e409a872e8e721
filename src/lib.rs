pub mod backend;
pub mod circuit;
pub mod config;
pub mod core;
pub mod engine;
pub mod storage;

use thiserror::Error;

use crate::core::Phase;

#[derive(Debug, Error)]
pub enum BenchError {
    /// Invalid or missing run configuration; detected before any phase executes.
    #[error("{0}")]
    Config(String),
    /// The proving library failed inside a pipeline phase.
    #[error("{phase} failed: {message}")]
    Backend { phase: Phase, message: String },
    /// A driver operation was requested before its prerequisites ran.
    #[error("invalid driver state: {0}")]
    InvalidState(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("{0}")]
    Message(String),
}

impl BenchError {
    pub fn backend(phase: Phase, message: impl ToString) -> Self {
        BenchError::Backend { phase, message: message.to_string() }
    }

    /// Configuration errors are reported together with usage help.
    pub fn is_config(&self) -> bool {
        matches!(self, BenchError::Config(_))
    }
}

pub type BenchResult<T> = Result<T, BenchError>;

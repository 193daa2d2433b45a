//! CLI error types

use massdriver_compiler::{CompilerError, DereferenceError, ParseError, VariableError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Compiler(#[from] CompilerError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("{0}")]
    Message(String),
}

impl From<ParseError> for CliError {
    fn from(err: ParseError) -> Self {
        Self::Compiler(err.into())
    }
}

impl From<DereferenceError> for CliError {
    fn from(err: DereferenceError) -> Self {
        Self::Compiler(err.into())
    }
}

impl From<VariableError> for CliError {
    fn from(err: VariableError) -> Self {
        Self::Compiler(err.into())
    }
}

pub type CliResult<T> = Result<T, CliError>;

use std::io;
use thiserror::Error;

/// Custom error types for grammar loading and normalization
#[derive(Error, Debug)]
pub enum GrammarError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Invalid grammar: {0}")]
    InvalidGrammar(String),

    #[error("Unknown non-terminal: {0}")]
    UnknownNonTerminal(String),

    #[error("Production of {head} uses undeclared symbol: {symbol}")]
    UnknownSymbol { head: String, symbol: String },

    #[error("Symbol declared as both terminal and non-terminal: {0}")]
    OverlappingSymbol(String),

    #[error("Start symbol has no productions: {0}")]
    StartWithoutProductions(String),

    #[error("Grammar validation failed: {0}")]
    ValidationFailed(String),
}

/// Result type for grammar operations
pub type Result<T> = std::result::Result<T, GrammarError>;

/// Trait extension for Option<T> to convert to GrammarError
pub trait OptionExt<T> {
    fn ok_or_grammar_err<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_grammar_err<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.ok_or_else(|| GrammarError::InvalidGrammar(f()))
    }
}

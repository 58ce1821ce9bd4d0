//! Error types for the interface generation pipeline.
//!
//! Every stage returns a [`Result`] instead of aborting, so callers decide
//! how a failure terminates the run. None of these errors are recovered
//! from inside the pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while generating an interface.
#[derive(Error, Debug)]
pub enum IfaceError {
    /// A source file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file argument expanded to no source files.
    #[error("no Go source files match {0:?}")]
    NoMatch(String),

    /// A file argument is not a valid glob pattern.
    #[error("invalid pattern {pattern:?}: {message}")]
    Pattern { pattern: String, message: String },

    /// Source text is not syntactically valid Go.
    #[error("{path}:{line}:{column}: syntax error")]
    Parse {
        path: String,
        line: usize,
        column: usize,
    },

    /// The assembled interface does not parse as valid Go.
    #[error("generated code is not valid Go ({line}:{column}): {message}")]
    Synthesis {
        message: String,
        line: usize,
        column: usize,
    },

    /// A configuration file is missing or malformed.
    #[error("invalid config {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    /// The tree-sitter grammar or a query failed to load.
    #[error("grammar setup failed: {0}")]
    Grammar(String),
}

impl IfaceError {
    /// True for errors caused by the input sources rather than the tool.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            IfaceError::Input { .. }
                | IfaceError::NoMatch(_)
                | IfaceError::Pattern { .. }
                | IfaceError::Parse { .. }
        )
    }
}

impl From<tree_sitter::LanguageError> for IfaceError {
    fn from(err: tree_sitter::LanguageError) -> Self {
        IfaceError::Grammar(err.to_string())
    }
}

impl From<tree_sitter::QueryError> for IfaceError {
    fn from(err: tree_sitter::QueryError) -> Self {
        IfaceError::Grammar(err.to_string())
    }
}

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, IfaceError>;

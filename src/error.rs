//! Error types for every fallible boundary of the pipeline.
//!
//! Each stage of the pipeline (preprocessor, parser, query engine) owns a
//! distinct error type rather than sharing one catch-all, mirroring how a
//! multi-stage compiler keeps its failure domains separate.

use crate::lexer::position::Position;
use thiserror::Error;

/// Failures raised by the indentation preprocessor (`spec.md` §4.2).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndentError {
    #[error("tab character in indentation at line {line}")]
    TabInIndentation { line: usize },

    #[error("line 1 must not be indented (found {indent} leading columns)")]
    LeadingIndentOnFirstLine { indent: usize },

    #[error("invalid dedent at line {line}: column {column} is not in {valid_columns:?}")]
    InvalidDedent {
        line: usize,
        column: usize,
        valid_columns: Vec<usize>,
    },
}

impl IndentError {
    /// Original source line the error should be reported against.
    pub fn line(&self) -> usize {
        match self {
            IndentError::TabInIndentation { line } => *line,
            IndentError::LeadingIndentOnFirstLine { .. } => 1,
            IndentError::InvalidDedent { line, .. } => *line,
        }
    }
}

/// Failures raised by the grammar parser (`spec.md` §4.3).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("parse error at {position}: {message}")]
pub struct ParseError {
    pub position: Position,
    pub message: String,
}

impl ParseError {
    pub fn new(position: Position, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
        }
    }
}

/// Top-level failure of the `compile` pipeline (`spec.md` §2).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error(transparent)]
    Indent(#[from] IndentError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Failures raised by query-engine operations (`spec.md` §4.5, §7).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("node not found: {0}")]
    NodeNotFound(String),

    #[error("expected node {id} to have type {expected}, found {found}")]
    WrongNodeType {
        id: String,
        expected: String,
        found: String,
    },
}

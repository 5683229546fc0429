//! Error types for the merge engine.
//!
//! The engine has exactly one failure mode: one of its two inputs does not
//! parse. [`SyntaxError`] describes what went wrong inside the parser adapter;
//! [`ParseError`] adds which input (base or snippet) was at fault so callers
//! can decide between "the working file is broken" and "the model produced
//! invalid code" without inspecting messages.

use std::fmt;

use thiserror::Error;

/// Which of the two merge inputs failed to parse.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputSide {
    /// The existing source file.
    Base,
    /// The incoming snippet.
    Snippet,
}

impl fmt::Display for InputSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base => write!(f, "base"),
            Self::Snippet => write!(f, "snippet"),
        }
    }
}

/// Errors from the tree-sitter parser adapter.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SyntaxError {
    /// The grammar could not be loaded into the parser (ABI mismatch).
    #[error("parser setup failed: {0}")]
    Setup(String),

    /// tree-sitter returned no tree at all.
    #[error("tree-sitter failed to produce a syntax tree")]
    NoTree,

    /// The text contains an ERROR or MISSING node.
    #[error("invalid syntax at line {line}, column {column} near `{near}`")]
    Invalid {
        /// 1-based line of the first offending node.
        line: usize,
        /// 1-based column (in bytes) of the first offending node.
        column: usize,
        /// A short excerpt of the offending source.
        near: String,
    },
}

/// One of the merge inputs is not valid Python.
///
/// The engine performs no recovery: no partial merge is attempted and no
/// fallback text is synthesized. Returning the base text unmodified is the
/// caller's job.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{side} does not parse: {source}")]
pub struct ParseError {
    /// The input that failed.
    pub side: InputSide,
    /// The underlying parser failure.
    #[source]
    pub source: SyntaxError,
}

impl ParseError {
    /// Build a parse error for the given side.
    #[must_use]
    pub const fn new(side: InputSide, source: SyntaxError) -> Self {
        Self { side, source }
    }

    /// `true` when the working file itself is broken, rather than the snippet.
    #[must_use]
    pub const fn is_base(&self) -> bool {
        matches!(self.side, InputSide::Base)
    }
}

//! File-level error types for the `intellimerge` CLI.
//!
//! Engine errors say *what* failed to parse. [`CliError`] adds *which file*
//! and what the user should do next, so a message can be acted on without
//! reading the source.

use std::fmt;
use std::path::PathBuf;

use intellimerge_core::ParseError;

// ---------------------------------------------------------------------------
// CliError
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum CliError {
    /// The file being edited does not parse. Nothing was written.
    BrokenBase {
        path: PathBuf,
        source: ParseError,
    },

    /// A snippet did not parse and the policy is `abort`. Nothing was written.
    SnippetRejected {
        /// 0-based position of the fragment in the reply.
        index: usize,
        source: ParseError,
    },

    /// A single `merge` snippet does not parse.
    InvalidSnippet { source: ParseError },

    /// The file has no extension the merge engine has a grammar for.
    UnsupportedFile { path: PathBuf },

    /// The configuration file could not be loaded.
    Config(crate::config::ConfigError),
}

impl CliError {
    /// Classify an engine error raised while merging into `path`.
    #[must_use]
    pub fn from_merge(path: PathBuf, err: ParseError) -> Self {
        if err.is_base() {
            Self::BrokenBase { path, source: err }
        } else {
            Self::InvalidSnippet { source: err }
        }
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BrokenBase { path, source } => {
                write!(
                    f,
                    "{} does not parse: {}\n  The file was left untouched.\n  To fix: repair the syntax error in the file, then re-run.",
                    path.display(),
                    source.source
                )
            }
            Self::SnippetRejected { index, source } => {
                write!(
                    f,
                    "snippet #{index} does not parse: {}\n  Nothing was written (on_error = \"abort\").\n  To fix: regenerate the snippet, or set [snippets] on_error = \"skip\".",
                    source.source
                )
            }
            Self::InvalidSnippet { source } => {
                write!(
                    f,
                    "snippet does not parse: {}\n  To fix: check the snippet is complete Python code.",
                    source.source
                )
            }
            Self::UnsupportedFile { path } => {
                write!(
                    f,
                    "{} is not a Python source file.\n  Nothing was read or written.\n  To fix: pass a .py or .pyi file.",
                    path.display()
                )
            }
            Self::Config(err) => {
                write!(
                    f,
                    "{err}\n  To fix: edit the config file and correct the issue."
                )
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::BrokenBase { source, .. }
            | Self::SnippetRejected { source, .. }
            | Self::InvalidSnippet { source } => Some(source),
            Self::Config(err) => Some(err),
            Self::UnsupportedFile { .. } => None,
        }
    }
}

impl From<crate::config::ConfigError> for CliError {
    fn from(err: crate::config::ConfigError) -> Self {
        Self::Config(err)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

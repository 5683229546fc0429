//! intellimerge configuration (`.intellimerge.toml`).
//!
//! Defines the typed configuration for snippet application and output.
//! Missing fields use sensible defaults; a missing file means all defaults.

use std::fmt;
use std::path::Path;

use serde::Deserialize;

use intellimerge_core::{ApplyOptions, SnippetErrorPolicy};

/// Default config file name, looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = ".intellimerge.toml";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level configuration.
///
/// ```toml
/// [snippets]
/// languages = ["python", "py", "python3"]
/// accept_untagged = true
/// on_error = "skip"
///
/// [output]
/// format = "text"
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IntellimergeConfig {
    /// How fenced snippets from a model reply are filtered and applied.
    #[serde(default)]
    pub snippets: SnippetConfig,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

// ---------------------------------------------------------------------------
// SnippetConfig
// ---------------------------------------------------------------------------

/// Snippet filtering and error policy.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SnippetConfig {
    /// Fence language tags accepted as Python (case-insensitive).
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,

    /// Apply fences that carry no language tag.
    #[serde(default = "default_accept_untagged")]
    pub accept_untagged: bool,

    /// What to do with a snippet that does not parse.
    #[serde(default)]
    pub on_error: OnSnippetError,
}

impl Default for SnippetConfig {
    fn default() -> Self {
        Self {
            languages: default_languages(),
            accept_untagged: default_accept_untagged(),
            on_error: OnSnippetError::default(),
        }
    }
}

impl SnippetConfig {
    /// Engine options for this configuration.
    #[must_use]
    pub fn apply_options(&self) -> ApplyOptions {
        ApplyOptions {
            languages: self.languages.clone(),
            accept_untagged: self.accept_untagged,
            on_snippet_error: self.on_error.policy(),
        }
    }
}

fn default_languages() -> Vec<String> {
    intellimerge_core::extract::PYTHON_TAGS
        .iter()
        .map(|&tag| tag.to_owned())
        .collect()
}

const fn default_accept_untagged() -> bool {
    true
}

/// Policy for snippets that fail to parse.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OnSnippetError {
    /// Skip the snippet and continue with the next one.
    #[default]
    Skip,
    /// Stop at the first snippet that does not parse; nothing is written.
    Abort,
}

impl OnSnippetError {
    #[must_use]
    pub const fn policy(self) -> SnippetErrorPolicy {
        match self {
            Self::Skip => SnippetErrorPolicy::Skip,
            Self::Abort => SnippetErrorPolicy::Abort,
        }
    }
}

impl fmt::Display for OnSnippetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skip => write!(f, "skip"),
            Self::Abort => write!(f, "abort"),
        }
    }
}

// ---------------------------------------------------------------------------
// OutputConfig
// ---------------------------------------------------------------------------

/// Output settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Default format for reports and listings when `--format` is not given.
    #[serde(default)]
    pub format: crate::format::OutputFormat,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Error loading a configuration file.
#[derive(Debug)]
pub struct ConfigError {
    /// The path that was being loaded (if available).
    pub path: Option<std::path::PathBuf>,
    /// Human-readable message with line-level detail when possible.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(p) = &self.path {
            write!(f, "{}: {}", p.display(), self.message)
        } else {
            write!(f, "config error: {}", self.message)
        }
    }
}

impl std::error::Error for ConfigError {}

impl IntellimergeConfig {
    /// Load configuration from a TOML file.
    ///
    /// - If the file does not exist, returns all defaults (not an error).
    /// - If the file exists but contains invalid TOML or unknown fields,
    ///   returns a [`ConfigError`] with line-level detail.
    ///
    /// # Errors
    /// Returns `ConfigError` on I/O errors (other than not-found) or parse errors.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(ConfigError {
                    path: Some(path.to_owned()),
                    message: format!("could not read file: {e}"),
                });
            }
        };
        Self::parse(&contents).map_err(|mut e| {
            e.path = Some(path.to_owned());
            e
        })
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `ConfigError` on invalid TOML or unknown fields.
    pub fn parse(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| {
            let mut message = e.message().to_owned();
            if let Some(span) = e.span() {
                let line = toml_str[..span.start]
                    .chars()
                    .filter(|&c| c == '\n')
                    .count()
                    + 1;
                message = format!("line {line}: {message}");
            }
            ConfigError {
                path: None,
                message,
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

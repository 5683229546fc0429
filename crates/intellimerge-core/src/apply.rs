//! Sequential snippet application.
//!
//! A model reply usually carries several fragments. They are applied one at a
//! time, each against the output of the previous one, never in parallel
//! against the same original base: there is no conflict detection between
//! sibling snippets, so ordering is the only thing that makes the result
//! well defined.
//!
//! Choosing *which* fragments to apply (an accept/reject UI) is the caller's
//! business; this module receives only the accepted ones.

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::error::ParseError;
use crate::extract::{Fragment, PYTHON_TAGS};
use crate::merge::merge;

/// What to do when a snippet does not parse.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SnippetErrorPolicy {
    /// Leave the text as it was and continue with the next snippet.
    #[default]
    Skip,
    /// Stop and return the error.
    Abort,
}

/// Options for [`apply_snippets`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApplyOptions {
    /// Fence language tags accepted as Python (case-insensitive).
    pub languages: Vec<String>,
    /// Accept fences without a language tag.
    pub accept_untagged: bool,
    pub on_snippet_error: SnippetErrorPolicy,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            languages: PYTHON_TAGS.iter().map(|&tag| tag.to_owned()).collect(),
            accept_untagged: true,
            on_snippet_error: SnippetErrorPolicy::default(),
        }
    }
}

impl ApplyOptions {
    /// Does the language filter let this fragment through?
    #[must_use]
    pub fn accepts(&self, fragment: &Fragment) -> bool {
        fragment.language.as_deref().map_or(self.accept_untagged, |tag| {
            self.languages
                .iter()
                .any(|accepted| accepted.eq_ignore_ascii_case(tag))
        })
    }
}

/// Result of one fragment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SnippetOutcome {
    /// Merged into the text.
    Applied,
    /// Rejected by the language filter, never parsed.
    Ignored,
    /// Did not parse; the text was left as it was.
    Skipped { error: String },
}

/// Per-fragment entry of an [`ApplyReport`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SnippetReport {
    /// Position of the fragment in the input, 0-based.
    pub index: usize,
    pub language: Option<String>,
    #[serde(flatten)]
    pub outcome: SnippetOutcome,
}

/// Final text plus what happened to each fragment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    pub text: String,
    pub snippets: Vec<SnippetReport>,
}

impl ApplyReport {
    #[must_use]
    pub fn applied_count(&self) -> usize {
        self.count(|o| matches!(o, SnippetOutcome::Applied))
    }

    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.count(|o| matches!(o, SnippetOutcome::Skipped { .. }))
    }

    #[must_use]
    pub fn ignored_count(&self) -> usize {
        self.count(|o| matches!(o, SnippetOutcome::Ignored))
    }

    /// Did applying the snippets change `base`?
    #[must_use]
    pub fn changed(&self, base: &str) -> bool {
        self.text != base
    }

    fn count(&self, pred: impl Fn(&SnippetOutcome) -> bool) -> usize {
        self.snippets.iter().filter(|s| pred(&s.outcome)).count()
    }
}

/// Apply `fragments` to `base` one after another.
///
/// # Errors
/// A base-side [`ParseError`] is always returned: the working file itself is
/// broken and no snippet can be applied to it. A snippet-side error is
/// returned only under [`SnippetErrorPolicy::Abort`].
#[instrument(skip_all, fields(fragments = fragments.len()))]
pub fn apply_snippets(
    base: &str,
    fragments: &[Fragment],
    options: &ApplyOptions,
) -> Result<ApplyReport, ParseError> {
    let mut text = base.to_owned();
    let mut snippets = Vec::with_capacity(fragments.len());

    for (index, fragment) in fragments.iter().enumerate() {
        let outcome = if options.accepts(fragment) {
            match merge(&text, &fragment.code) {
                Ok(merged) => {
                    info!(index, "snippet applied");
                    text = merged;
                    SnippetOutcome::Applied
                }
                Err(err) if err.is_base() => return Err(err),
                Err(err) => match options.on_snippet_error {
                    SnippetErrorPolicy::Skip => {
                        warn!(index, error = %err, "skipping snippet that does not parse");
                        SnippetOutcome::Skipped {
                            error: err.source.to_string(),
                        }
                    }
                    SnippetErrorPolicy::Abort => return Err(err),
                },
            }
        } else {
            info!(index, language = ?fragment.language, "ignoring snippet");
            SnippetOutcome::Ignored
        };

        snippets.push(SnippetReport {
            index,
            language: fragment.language.clone(),
            outcome,
        });
    }

    Ok(ApplyReport { text, snippets })
}

//! Snippet extraction: slice fenced code blocks out of a model reply.
//!
//! A reply is free-form markdown. Every triple-backtick fenced block is a
//! candidate snippet; the word right after the opening fence, if any, is its
//! language tag.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```([\w+#.-]+)?[ \t]*\r?\n(.*?)```").expect("fenced block pattern is valid")
});

static ANY_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```[^\n]*\n.*?```").expect("fence pattern is valid"));

static BLANK_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("blank-run pattern is valid"));

/// Language tags treated as Python.
pub const PYTHON_TAGS: [&str; 3] = ["python", "py", "python3"];

/// One fenced block of a model reply.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Fragment {
    /// The fence's language tag, if it had one.
    pub language: Option<String>,
    /// Block content, dedented and stripped of surrounding blank lines.
    pub code: String,
}

impl Fragment {
    #[must_use]
    pub fn new(language: Option<&str>, code: &str) -> Self {
        Self {
            language: language.map(str::to_owned),
            code: code.to_owned(),
        }
    }

    /// Untagged, or tagged with one of [`PYTHON_TAGS`].
    #[must_use]
    pub fn is_python(&self) -> bool {
        self.language.as_deref().is_none_or(|tag| {
            PYTHON_TAGS
                .iter()
                .any(|python| python.eq_ignore_ascii_case(tag))
        })
    }
}

/// Every fenced block of `reply`, in reply order. No blocks → empty vec.
#[must_use]
pub fn extract_fragments(reply: &str) -> Vec<Fragment> {
    FENCED_BLOCK
        .captures_iter(reply)
        .map(|caps| Fragment {
            language: caps.get(1).map(|m| m.as_str().to_owned()),
            code: tidy(caps.get(2).map_or("", |m| m.as_str())),
        })
        .collect()
}

/// The prose of `reply` with all fenced blocks removed and runs of blank
/// lines collapsed to one.
#[must_use]
pub fn strip_fragments(reply: &str) -> String {
    let without_code = ANY_FENCE.replace_all(reply, "");
    BLANK_RUN
        .replace_all(&without_code, "\n\n")
        .trim()
        .to_owned()
}

/// Drop leading/trailing blank lines and the indentation common to all
/// non-blank lines.
fn tidy(code: &str) -> String {
    let lines: Vec<&str> = code.lines().collect();
    let first = lines.iter().position(|l| !l.trim().is_empty());
    let last = lines.iter().rposition(|l| !l.trim().is_empty());
    let (Some(first), Some(last)) = (first, last) else {
        return String::new();
    };
    let body = &lines[first..=last];

    let common = body
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start_matches([' ', '\t']).len())
        .min()
        .unwrap_or(0);

    body.iter()
        .map(|l| l.get(common..).unwrap_or_default().trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

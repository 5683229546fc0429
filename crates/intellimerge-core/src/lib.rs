//! Structural merge of generated code snippets into Python source files.
//!
//! Given an existing file and a snippet, produce an updated file that takes
//! the snippet's declarations and keeps everything else:
//!
//! ```text
//! base_text ──parse──▶ SourceTree ─┐
//!                                  ├─ merge_trees ──▶ SourceTree ──render──▶ merged_text
//! snippet   ──parse──▶ SourceTree ─┘
//! ```
//!
//! Identity across the two trees is purely nominal: a function, class or
//! method is "the same" as another iff bucket and name match exactly. See
//! [`merge`](mod@merge) for the full policy.
//!
//! Everything here is a pure function of its inputs: no I/O, no state kept
//! between calls.

pub mod apply;
pub mod classify;
pub mod deletion;
pub mod error;
pub mod extract;
pub mod merge;
pub mod render;
pub mod syntax;

pub use apply::{ApplyOptions, ApplyReport, SnippetErrorPolicy, SnippetOutcome, apply_snippets};
pub use error::{InputSide, ParseError, SyntaxError};
pub use extract::{Fragment, extract_fragments, strip_fragments};
pub use merge::{merge, merge_trees};
pub use render::render;
pub use syntax::{DeclKind, Declaration, SourceLanguage, SourceTree, parse};

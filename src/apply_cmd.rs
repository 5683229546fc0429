//! `intellimerge apply`: apply every fenced snippet of a model reply.
//!
//! Fragments are extracted in reply order, filtered by the configured
//! language tags, and merged one after another into the growing file text.
//! What happens to each fragment is reported on stderr (text) or as a single
//! JSON document on stdout.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use intellimerge_core::{
    ApplyOptions, ApplyReport, Fragment, SnippetOutcome, apply_snippets, extract_fragments, parse,
};

use crate::config::IntellimergeConfig;
use crate::error::CliError;
use crate::files;
use crate::format::OutputFormat;

/// Arguments for `intellimerge apply`.
#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// The source file the snippets are merged into.
    pub file: PathBuf,

    /// Model reply holding fenced code blocks, or `-` for stdin.
    #[arg(long, short = 'r')]
    pub reply: PathBuf,

    /// Rewrite FILE instead of printing the result.
    #[arg(long, short = 'i')]
    pub in_place: bool,

    /// Report what would happen without writing anything.
    #[arg(long, conflicts_with = "in_place")]
    pub dry_run: bool,

    /// Report format: text or json (default from config).
    #[arg(long)]
    pub format: Option<OutputFormat>,
}

/// JSON shape of the `apply` report.
#[derive(Debug, Serialize)]
pub struct ApplySummary<'a> {
    pub file: &'a Path,
    pub changed: bool,
    pub written: bool,
    pub applied: usize,
    pub skipped: usize,
    pub ignored: usize,
    #[serde(flatten)]
    pub report: &'a ApplyReport,
}

pub fn run(args: &ApplyArgs, config: &IntellimergeConfig) -> Result<()> {
    let format = OutputFormat::resolve(args.format, config.output.format);
    let options = config.snippets.apply_options();

    files::require_source(&args.file)?;
    let base = files::read_input(&args.file)?;
    let reply = files::read_input(&args.reply)?;
    let fragments = extract_fragments(&reply);

    let report = apply_snippets(&base, &fragments, &options).map_err(|err| {
        if err.is_base() {
            CliError::BrokenBase {
                path: args.file.clone(),
                source: err,
            }
        } else {
            CliError::SnippetRejected {
                index: first_rejected(&fragments, &options),
                source: err,
            }
        }
    })?;

    let changed = report.changed(&base);
    let written = args.in_place && changed;
    if written {
        files::write_atomic(&args.file, &report.text)?;
    }

    match format {
        OutputFormat::Json => {
            let summary = ApplySummary {
                file: &args.file,
                changed,
                written,
                applied: report.applied_count(),
                skipped: report.skipped_count(),
                ignored: report.ignored_count(),
                report: &report,
            };
            println!("{}", format.serialize(&summary)?);
        }
        OutputFormat::Text => {
            eprint!("{}", describe(&args.file, &report, changed, written));
            if !args.in_place && !args.dry_run {
                files::emit(None, &report.text)?;
            }
        }
    }

    Ok(())
}

/// Position of the fragment an `abort` policy stopped at.
fn first_rejected(fragments: &[Fragment], options: &ApplyOptions) -> usize {
    fragments
        .iter()
        .position(|f| options.accepts(f) && parse(&f.code).is_err())
        .unwrap_or_default()
}

/// Human-readable report, one line per fragment plus a summary line.
fn describe(file: &Path, report: &ApplyReport, changed: bool, written: bool) -> String {
    use std::fmt::Write as _;

    let mut out = String::new();
    if report.snippets.is_empty() {
        let _ = writeln!(out, "No fenced code blocks found in reply.");
        return out;
    }

    for snippet in &report.snippets {
        let language = snippet.language.as_deref().unwrap_or("untagged");
        let _ = match &snippet.outcome {
            SnippetOutcome::Applied => {
                writeln!(out, "  snippet #{} ({language}): applied", snippet.index)
            }
            SnippetOutcome::Ignored => {
                writeln!(out, "  snippet #{} ({language}): ignored", snippet.index)
            }
            SnippetOutcome::Skipped { error } => writeln!(
                out,
                "  snippet #{} ({language}): skipped, {error}",
                snippet.index
            ),
        };
    }

    let total = report.snippets.len();
    let applied = report.applied_count();
    let _ = if !changed {
        writeln!(out, "{}: no changes ({applied} of {total} applied)", file.display())
    } else if written {
        writeln!(out, "{}: updated ({applied} of {total} applied)", file.display())
    } else {
        writeln!(out, "{}: would change ({applied} of {total} applied)", file.display())
    };
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report_for(base: &str, reply: &str) -> ApplyReport {
        apply_snippets(base, &extract_fragments(reply), &ApplyOptions::default()).unwrap()
    }

    #[test]
    fn describe_lists_every_outcome() {
        let reply = "```python\ndef f():\n    pass\n```\n```bash\nls\n```\n```py\ndef g(:\n```\n";
        let report = report_for("", reply);
        let text = describe(Path::new("a.py"), &report, true, true);
        assert!(text.contains("snippet #0 (python): applied"));
        assert!(text.contains("snippet #1 (bash): ignored"));
        assert!(text.contains("snippet #2 (py): skipped, invalid syntax"));
        assert!(text.contains("a.py: updated (1 of 3 applied)"));
    }

    #[test]
    fn describe_empty_reply() {
        let report = report_for("x = 1\n", "no code here");
        let text = describe(Path::new("a.py"), &report, false, false);
        assert_eq!(text, "No fenced code blocks found in reply.\n");
    }

    #[test]
    fn describe_dry_run_says_would_change() {
        let report = report_for("", "```\nx = 1\n```\n");
        let text = describe(Path::new("a.py"), &report, true, false);
        assert!(text.contains("snippet #0 (untagged): applied"));
        assert!(text.contains("would change"));
    }

    #[test]
    fn first_rejected_skips_ignored_fragments() {
        let fragments = vec![
            Fragment::new(Some("bash"), "def (:"),
            Fragment::new(Some("python"), "x = 1"),
            Fragment::new(Some("python"), "def g(:"),
        ];
        assert_eq!(first_rejected(&fragments, &ApplyOptions::default()), 2);
    }

    #[test]
    fn summary_serializes_flat() {
        let report = report_for("", "```python\ndef f():\n    pass\n```\n```rust\nfn f() {}\n```\n");
        let summary = ApplySummary {
            file: Path::new("a.py"),
            changed: true,
            written: false,
            applied: report.applied_count(),
            skipped: report.skipped_count(),
            ignored: report.ignored_count(),
            report: &report,
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["applied"], 1);
        assert_eq!(json["ignored"], 1);
        assert_eq!(json["text"], "def f():\n    pass\n");
        assert_eq!(json["snippets"][0]["status"], "applied");
        assert_eq!(json["snippets"][1]["status"], "ignored");
        assert_eq!(json["snippets"][1]["language"], "rust");
    }

    #[test]
    fn skipped_snippet_serializes_error() {
        let report = report_for("", "```python\ndef g(:\n```\n");
        let json = serde_json::to_value(&report.snippets[0]).unwrap();
        assert_eq!(json["status"], "skipped");
        assert_eq!(json["index"], 0);
        assert!(json["error"].as_str().unwrap().contains("invalid syntax"));
    }
}

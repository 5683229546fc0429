//! `intellimerge check`: parse a file and list what the merge engine sees.
//!
//! Useful before applying snippets: shows the declarations in the order the
//! engine classifies them, and which functions or methods carry a deletion
//! marker and will disappear on the next merge.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use intellimerge_core::deletion::{is_marked, prune};
use intellimerge_core::{DeclKind, Declaration, InputSide, ParseError, SourceTree, parse};

use crate::config::IntellimergeConfig;
use crate::error::CliError;
use crate::files;
use crate::format::OutputFormat;

/// Arguments for `intellimerge check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// The source file to inspect.
    pub file: PathBuf,

    /// Output format: text or json (default from config).
    #[arg(long)]
    pub format: Option<OutputFormat>,
}

#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub file: PathBuf,
    pub declarations: Vec<DeclarationEntry>,
    /// Functions and methods (`Class.method`) a merge would drop.
    pub pending_deletions: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct DeclarationEntry {
    pub kind: DeclKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// First line of the declaration.
    pub line: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<String>,
    pub marked: bool,
}

impl DeclarationEntry {
    fn new(decl: &Declaration) -> Self {
        let methods = decl
            .class
            .as_ref()
            .map(|body| body.methods().filter_map(|m| m.name.clone()).collect())
            .unwrap_or_default();
        Self {
            kind: decl.kind,
            name: decl.name.clone(),
            line: first_code_line(&decl.text).to_owned(),
            methods,
            marked: is_marked(decl),
        }
    }
}

pub fn run(args: &CheckArgs, config: &IntellimergeConfig) -> Result<()> {
    let format = OutputFormat::resolve(args.format, config.output.format);
    files::require_source(&args.file)?;
    let text = files::read_input(&args.file)?;
    let tree = parse(&text).map_err(|e| CliError::BrokenBase {
        path: args.file.clone(),
        source: ParseError::new(InputSide::Base, e),
    })?;

    let report = inspect(&args.file, tree);
    match format {
        OutputFormat::Json => println!("{}", format.serialize(&report)?),
        OutputFormat::Text => print!("{}", render_text(&report)),
    }
    Ok(())
}

/// Build the report for an already parsed file.
#[must_use]
pub fn inspect(file: &Path, tree: SourceTree) -> CheckReport {
    let declarations = tree.declarations.iter().map(DeclarationEntry::new).collect();
    let (_, pending_deletions) = prune(tree);
    CheckReport {
        file: file.to_owned(),
        declarations,
        pending_deletions,
    }
}

/// Skip decorator lines so the entry shows the `def`/`class` line.
fn first_code_line(text: &str) -> &str {
    text.lines()
        .map(str::trim)
        .find(|line| !line.starts_with('@'))
        .or_else(|| text.lines().next())
        .unwrap_or_default()
}

fn render_text(report: &CheckReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}: {} declaration(s)",
        report.file.display(),
        report.declarations.len()
    );
    for entry in &report.declarations {
        let marker = if entry.marked { "  [delete]" } else { "" };
        let kind = entry.kind.to_string();
        match entry.kind {
            DeclKind::Class => {
                let _ = writeln!(
                    out,
                    "  {kind:<9}{} ({} method(s)){marker}",
                    entry.name.as_deref().unwrap_or_default(),
                    entry.methods.len()
                );
            }
            DeclKind::Function => {
                let _ = writeln!(
                    out,
                    "  {kind:<9}{}{marker}",
                    entry.name.as_deref().unwrap_or_default()
                );
            }
            DeclKind::Import | DeclKind::Other => {
                let _ = writeln!(out, "  {kind:<9}{}", entry.line);
            }
        }
    }
    if report.pending_deletions.is_empty() {
        let _ = writeln!(out, "No pending deletions.");
    } else {
        let _ = writeln!(
            out,
            "Pending deletions: {}",
            report.pending_deletions.join(", ")
        );
    }
    out
}

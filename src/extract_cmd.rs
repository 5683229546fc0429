//! `intellimerge extract`: show the fenced blocks of a model reply.

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use intellimerge_core::{Fragment, extract_fragments, strip_fragments};

use crate::config::IntellimergeConfig;
use crate::files;
use crate::format::OutputFormat;

/// Arguments for `intellimerge extract`.
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Model reply, or `-` for stdin.
    pub reply: PathBuf,

    /// Print the prose with the code blocks removed instead.
    #[arg(long)]
    pub prose: bool,

    /// Output format: text or json (default from config).
    #[arg(long)]
    pub format: Option<OutputFormat>,
}

#[derive(Debug, Serialize)]
struct ExtractedFragment<'a> {
    index: usize,
    #[serde(flatten)]
    fragment: &'a Fragment,
    /// Would `apply` with the current config merge this fragment?
    accepted: bool,
}

#[derive(Debug, Serialize)]
struct Prose {
    prose: String,
}

pub fn run(args: &ExtractArgs, config: &IntellimergeConfig) -> Result<()> {
    let format = OutputFormat::resolve(args.format, config.output.format);
    let reply = files::read_input(&args.reply)?;

    if args.prose {
        let prose = strip_fragments(&reply);
        match format {
            OutputFormat::Json => println!("{}", format.serialize(&Prose { prose })?),
            OutputFormat::Text => println!("{prose}"),
        }
        return Ok(());
    }

    let fragments = extract_fragments(&reply);
    let options = config.snippets.apply_options();
    let listed: Vec<ExtractedFragment<'_>> = fragments
        .iter()
        .enumerate()
        .map(|(index, fragment)| ExtractedFragment {
            index,
            fragment,
            accepted: options.accepts(fragment),
        })
        .collect();

    match format {
        OutputFormat::Json => println!("{}", format.serialize(&listed)?),
        OutputFormat::Text => print!("{}", render_text(&listed)),
    }
    Ok(())
}

fn render_text(listed: &[ExtractedFragment<'_>]) -> String {
    let mut out = String::new();
    if listed.is_empty() {
        out.push_str("No fenced code blocks found.\n");
        return out;
    }
    for (i, entry) in listed.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let language = entry.fragment.language.as_deref().unwrap_or("untagged");
        let status = if entry.accepted { "" } else { ", ignored" };
        let _ = writeln!(out, "# fragment {} ({language}{status})", entry.index);
        out.push_str(&entry.fragment.code);
        if !entry.fragment.code.ends_with('\n') {
            out.push('\n');
        }
    }
    out
}

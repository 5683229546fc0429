//! `intellimerge merge`: merge one snippet into one file.

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Args;
use tracing::info;

use intellimerge_core::merge;

use crate::error::CliError;
use crate::files::{self, STDIN};

/// Arguments for `intellimerge merge`.
#[derive(Args, Debug)]
pub struct MergeArgs {
    /// The existing source file.
    pub base: PathBuf,

    /// File holding the snippet, or `-` for stdin.
    pub snippet: PathBuf,

    /// Rewrite BASE instead of printing the result.
    #[arg(long, short = 'i', conflicts_with = "output")]
    pub in_place: bool,

    /// Write the result to this path instead of stdout.
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn run(args: &MergeArgs) -> Result<()> {
    if args.base.as_os_str() == STDIN {
        bail!(
            "BASE cannot be stdin.\n  To fix: pass the file to edit as BASE and the snippet as `-`."
        );
    }
    files::require_source(&args.base)?;

    let base = files::read_input(&args.base)?;
    let snippet = files::read_input(&args.snippet)?;

    let merged = merge(&base, &snippet).map_err(|e| CliError::from_merge(args.base.clone(), e))?;

    if args.in_place {
        if merged == base {
            eprintln!("{}: already up to date", args.base.display());
            return Ok(());
        }
        files::write_atomic(&args.base, &merged)?;
        info!(path = %args.base.display(), "merged in place");
        eprintln!("Merged snippet into {}", args.base.display());
        return Ok(());
    }

    files::emit(args.output.as_deref(), &merged)
}

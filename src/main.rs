use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use intellimerge::config::{DEFAULT_CONFIG_FILE, IntellimergeConfig};
use intellimerge::error::CliError;
use intellimerge::{apply_cmd, check, extract_cmd, merge_cmd, telemetry};

/// Structural merge of generated Python snippets into source files
///
/// intellimerge takes code produced by a language model and folds it into
/// an existing file by declaration name: same-named functions, classes and
/// methods are replaced in place, new ones are appended, imports are
/// deduplicated. Everything else in the file is kept.
///
/// QUICK START:
///
///   # Merge one snippet and print the result
///   intellimerge merge app.py snippet.py
///
///   # Apply every python code block of a model reply, in order
///   intellimerge apply app.py --reply reply.md --in-place
///
///   # See what the engine sees (and what is marked for deletion)
///   intellimerge check app.py
///
/// DELETING CODE:
///
///   Put `# delete me` (or "remove me", "delete this", "delete func",
///   "delete function") inside a function or method in the file. It is
///   dropped on the next merge.
#[derive(Parser)]
#[command(name = "intellimerge")]
#[command(version, about)]
#[command(propagate_version = true)]
#[command(
    after_help = "See 'intellimerge <command> --help' for more information on a specific command."
)]
struct Cli {
    /// Configuration file.
    #[arg(long, global = true, env = "INTELLIMERGE_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge one snippet into a file
    ///
    /// Prints the merged file to stdout unless --in-place or --output is
    /// given. A file that does not parse is left untouched.
    ///
    /// Examples:
    ///   intellimerge merge app.py snippet.py
    ///   pbpaste | intellimerge merge app.py - --in-place
    #[command(verbatim_doc_comment)]
    Merge(merge_cmd::MergeArgs),

    /// Apply the fenced code blocks of a model reply
    ///
    /// Blocks are applied one after another. Blocks in other languages are
    /// ignored; blocks that do not parse are skipped or abort the run,
    /// depending on [snippets] on_error in the config.
    ///
    /// Examples:
    ///   intellimerge apply app.py --reply reply.md --dry-run
    ///   intellimerge apply app.py --reply - --in-place --format json
    #[command(verbatim_doc_comment)]
    Apply(apply_cmd::ApplyArgs),

    /// List the fenced code blocks of a model reply
    Extract(extract_cmd::ExtractArgs),

    /// Parse a file and list its declarations and pending deletions
    Check(check::CheckArgs),
}

fn main() -> Result<()> {
    let _telemetry = telemetry::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Merge(ref args) => merge_cmd::run(args),
        Commands::Apply(ref args) => apply_cmd::run(args, &load_config(&cli.config)?),
        Commands::Extract(ref args) => extract_cmd::run(args, &load_config(&cli.config)?),
        Commands::Check(ref args) => check::run(args, &load_config(&cli.config)?),
    }
}

fn load_config(path: &std::path::Path) -> Result<IntellimergeConfig> {
    IntellimergeConfig::load(path)
        .map_err(CliError::from)
        .map_err(Into::into)
}

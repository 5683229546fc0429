//! File I/O for the CLI: `-` as stdin and atomic in-place writes.

use std::io::{Read as _, Write as _};
use std::path::Path;

use anyhow::{Context, Result};
use tempfile::NamedTempFile;

use intellimerge_core::SourceLanguage;

use crate::error::CliError;

/// Path argument that means "read from stdin".
pub const STDIN: &str = "-";

/// Read a whole text input, where `-` is stdin.
pub fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == STDIN {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("read stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
}

/// Refuse a source path the engine cannot parse. Stdin is taken as Python.
pub fn require_source(path: &Path) -> Result<(), CliError> {
    if path.as_os_str() == STDIN || SourceLanguage::from_path(path).is_some() {
        Ok(())
    } else {
        Err(CliError::UnsupportedFile {
            path: path.to_owned(),
        })
    }
}

/// Replace `path` with `text` atomically.
///
/// 1. Write to a temporary file in the target's directory.
/// 2. fsync the temporary file.
/// 3. Rename over the target path.
///
/// A failure at any step leaves the original file as it was.
pub fn write_atomic(path: &Path, text: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir)
        .with_context(|| format!("create temp file in {}", dir.display()))?;
    file.write_all(text.as_bytes())
        .with_context(|| format!("write temp file {}", file.path().display()))?;
    file.as_file()
        .sync_all()
        .with_context(|| format!("fsync temp file {}", file.path().display()))?;

    // Keep the original permissions on the replacement.
    if let Ok(meta) = std::fs::metadata(path) {
        std::fs::set_permissions(file.path(), meta.permissions())
            .with_context(|| format!("copy permissions of {}", path.display()))?;
    }

    file.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("replace {}", path.display()))?;
    Ok(())
}

/// Write `text` to `output` if given, else to stdout.
pub fn emit(output: Option<&Path>, text: &str) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, text).with_context(|| format!("write {}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes()).context("write stdout")?;
            stdout.flush().context("flush stdout")
        }
    }
}

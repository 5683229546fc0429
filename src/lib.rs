//! intellimerge CLI crate: everything around the merge engine.
//!
//! The engine itself lives in `intellimerge-core`. This crate adds the
//! `intellimerge` binary's subcommands, configuration, file I/O and
//! telemetry, and exposes them so `main.rs` and the integration tests can
//! use them as `intellimerge::module`.

pub mod apply_cmd;
pub mod check;
pub mod config;
pub mod error;
pub mod extract_cmd;
pub mod files;
pub mod format;
pub mod merge_cmd;
pub mod telemetry;

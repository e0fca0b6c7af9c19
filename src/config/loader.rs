// src/config/loader.rs

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::config::model::{ProblemFile, RawProblemFile};
use crate::errors::Result;

/// Load a problem file from a given path and return the raw `RawProblemFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawProblemFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let problem: RawProblemFile = toml::from_str(&contents)?;
    debug!(path = %path.display(), tasks = problem.task.len(), "loaded problem file");

    Ok(problem)
}

/// Parse a problem file from an in-memory TOML string.
pub fn load_from_str(contents: &str) -> Result<RawProblemFile> {
    Ok(toml::from_str(contents)?)
}

/// Load a problem file from path and run validation.
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks for:
///   - at least one task,
///   - a known method and a valid method/multi-start combination,
///   - items with more than one producer,
///   - an `order` naming known tasks when the method is `manual`.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ProblemFile> {
    let raw = load_from_path(&path)?;
    ProblemFile::try_from(raw)
}

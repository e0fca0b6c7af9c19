// src/config/mod.rs

//! Problem file loading and validation for seqdag.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a problem file from disk (`loader.rs`).
//! - Validate methods, options and item ownership (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, load_from_str};
pub use model::{ProblemFile, RawProblemFile, SequencingSection, TaskSection};
pub use validate::validate_raw_problem;

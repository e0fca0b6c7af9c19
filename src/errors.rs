// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

use crate::types::Method;

#[derive(Error, Debug)]
pub enum SeqdagError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Task not found: {0}")]
    UnknownTask(String),

    #[error(
        "Unknown sequencing method: {0} (expected one of manual, single-swap, two-swap, hybrid-swap, brute-force, branch-and-bound)"
    )]
    UnknownMethod(String),

    #[error("Method '{method}' is single-shot and cannot be combined with multi-start ({starts} starts requested)")]
    InvalidMethodCombination { method: Method, starts: usize },

    #[error("Cycle detected in non-coupled partition: {0}")]
    CyclicNonCoupledPartition(String),

    #[error("Input graph contains no tasks")]
    EmptyInput,

    #[error("Invalid manual order: {0}")]
    InvalidManualOrder(String),

    #[error(
        "Brute-force over {tasks} tasks needs {permutations} permutations, above the limit of {limit}"
    )]
    PermutationLimitExceeded {
        tasks: usize,
        permutations: u128,
        limit: u64,
    },

    #[error("Sequencing was cancelled")]
    Cancelled,

    #[error("Worker pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, SeqdagError>;

// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `seqdag`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "seqdag",
    version,
    about = "Order tasks of a data-flow problem so that feedback couplings are minimal.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the problem file (TOML).
    ///
    /// Default: `Problem.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Problem.toml")]
    pub problem: String,

    /// Override `[config].method` (manual, single-swap, two-swap,
    /// hybrid-swap, brute-force, branch-and-bound).
    #[arg(long, value_name = "METHOD")]
    pub method: Option<String>,

    /// Override `[config].multi_start`.
    #[arg(long, value_name = "N")]
    pub multi_start: Option<usize>,

    /// Override `[config].seed`.
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Override `[config].workers`.
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SEQDAG_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print tasks and the partition, but don't order
    /// the coupled group.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_are_optional() {
        let args = CliArgs::parse_from(["seqdag"]);
        assert_eq!(args.problem, "Problem.toml");
        assert!(args.method.is_none());
        assert!(!args.dry_run);

        let args = CliArgs::parse_from([
            "seqdag",
            "--problem",
            "p.toml",
            "--method",
            "two-swap",
            "--multi-start",
            "3",
            "--log-level",
            "debug",
        ]);
        assert_eq!(args.problem, "p.toml");
        assert_eq!(args.method.as_deref(), Some("two-swap"));
        assert_eq!(args.multi_start, Some(3));
        assert!(matches!(args.log_level, Some(LogLevel::Debug)));
    }
}

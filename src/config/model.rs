// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::errors::Result;
use crate::graph::{DEFAULT_TASK_ROLE, ProblemGraph};
use crate::sequence::{DEFAULT_BRUTE_FORCE_LIMIT, SequencingOptions};
use crate::types::Method;

/// Problem file exactly as read from TOML, before validation.
///
/// ```toml
/// [config]
/// method = "hybrid-swap"
/// multi_start = 4
/// seed = 7
///
/// [task.A]
/// outputs = ["x"]
///
/// [task.B]
/// inputs = ["x"]
/// outputs = ["y"]
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct RawProblemFile {
    /// Sequencing settings from `[config]`.
    #[serde(default)]
    pub config: SequencingSection,

    /// All tasks from `[task.<name>]`, keyed by task name.
    #[serde(default)]
    pub task: BTreeMap<String, TaskSection>,
}

/// Validated problem file. Only constructed through
/// `ProblemFile::try_from(RawProblemFile)`.
#[derive(Debug, Clone)]
pub struct ProblemFile {
    pub config: SequencingSection,
    pub task: BTreeMap<String, TaskSection>,
    method: Method,
}

impl ProblemFile {
    pub(crate) fn new_unchecked(
        config: SequencingSection,
        task: BTreeMap<String, TaskSection>,
        method: Method,
    ) -> Self {
        Self {
            config,
            task,
            method,
        }
    }

    /// Parsed `[config].method`.
    pub fn method(&self) -> Method {
        self.method
    }

    /// Build the task/item graph. Tasks get ids in name order.
    pub fn to_graph(&self) -> Result<ProblemGraph> {
        let mut graph = ProblemGraph::new();
        for (name, task) in &self.task {
            graph.add_task(name, &task.role);
        }
        for (name, task) in &self.task {
            for item in &task.outputs {
                graph.produce(name, item)?;
            }
            for item in &task.inputs {
                graph.consume(name, item)?;
            }
        }
        Ok(graph)
    }

    pub fn to_options(&self) -> SequencingOptions {
        SequencingOptions {
            method: self.method,
            multi_start: self.config.multi_start,
            seed: self.config.seed,
            manual_order: self.config.order.clone(),
            brute_force_limit: self.config.brute_force_limit,
            abort_on_limit: self.config.abort_on_limit,
            workers: self.config.workers,
            ..SequencingOptions::default()
        }
    }
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SequencingSection {
    /// One of `manual`, `single-swap`, `two-swap`, `hybrid-swap`,
    /// `brute-force`, `branch-and-bound`. Kept as a string so an unknown
    /// name surfaces as a method error rather than a TOML error.
    #[serde(default = "default_method")]
    pub method: String,

    /// Random starting points for the swap heuristics.
    #[serde(default)]
    pub multi_start: Option<usize>,

    #[serde(default)]
    pub seed: u64,

    #[serde(default = "default_brute_force_limit")]
    pub brute_force_limit: u64,

    #[serde(default)]
    pub abort_on_limit: bool,

    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Full task order, required by `method = "manual"`.
    #[serde(default)]
    pub order: Option<Vec<String>>,
}

fn default_method() -> String {
    Method::default().as_str().to_string()
}

fn default_brute_force_limit() -> u64 {
    DEFAULT_BRUTE_FORCE_LIMIT
}

fn default_workers() -> usize {
    1
}

impl Default for SequencingSection {
    fn default() -> Self {
        Self {
            method: default_method(),
            multi_start: None,
            seed: 0,
            brute_force_limit: default_brute_force_limit(),
            abort_on_limit: false,
            workers: default_workers(),
            order: None,
        }
    }
}

/// `[task.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskSection {
    /// Role tag; carried through but never interpreted.
    #[serde(default = "default_role")]
    pub role: String,

    /// Items this task consumes.
    #[serde(default)]
    pub inputs: Vec<String>,

    /// Items this task produces. Each item has at most one producer.
    #[serde(default)]
    pub outputs: Vec<String>,
}

fn default_role() -> String {
    DEFAULT_TASK_ROLE.to_string()
}

impl Default for TaskSection {
    fn default() -> Self {
        Self {
            role: default_role(),
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }
}

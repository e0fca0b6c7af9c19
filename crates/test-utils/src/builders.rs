#![allow(dead_code)]

use std::fmt::Write as _;

use seqdag::graph::{DEFAULT_TASK_ROLE, ProblemGraph};

/// Builder for `ProblemGraph` to simplify test setup.
///
/// Every `edge(from, to)` introduces one fresh item produced by `from` and
/// consumed by `to`, so repeated edges add coupling strength. Tasks get ids
/// in the order they are first mentioned.
pub struct ProblemBuilder {
    tasks: Vec<String>,
    /// (item, producer, consumer)
    items: Vec<(String, String, String)>,
}

impl ProblemBuilder {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            items: Vec::new(),
        }
    }

    pub fn task(mut self, name: &str) -> Self {
        self.touch(name);
        self
    }

    pub fn tasks(mut self, names: &[&str]) -> Self {
        for name in names {
            self.touch(name);
        }
        self
    }

    pub fn edge(self, from: &str, to: &str) -> Self {
        self.weighted_edge(from, to, 1)
    }

    /// `weight` distinct items from `from` to `to`.
    pub fn weighted_edge(mut self, from: &str, to: &str, weight: usize) -> Self {
        self.touch(from);
        self.touch(to);
        for _ in 0..weight {
            let item = format!("{from}_to_{to}_{}", self.items.len());
            self.items
                .push((item, from.to_string(), to.to_string()));
        }
        self
    }

    /// `a -> b -> c -> ...`
    pub fn chain(mut self, names: &[&str]) -> Self {
        for pair in names.windows(2) {
            self = self.edge(pair[0], pair[1]);
        }
        self
    }

    /// `a -> b -> ... -> a`
    pub fn ring(self, names: &[&str]) -> Self {
        let this = self.chain(names);
        match (names.last(), names.first()) {
            (Some(last), Some(first)) if names.len() > 1 => this.edge(last, first),
            _ => this,
        }
    }

    pub fn build(self) -> ProblemGraph {
        let mut graph = ProblemGraph::new();
        for name in &self.tasks {
            graph.add_task(name, DEFAULT_TASK_ROLE);
        }
        for (item, producer, consumer) in &self.items {
            graph
                .produce(producer, item)
                .expect("builder items have a single producer");
            graph
                .consume(consumer, item)
                .expect("builder tasks are registered");
        }
        graph
    }

    /// Render the same problem as a problem file body, with `config` placed
    /// verbatim under `[config]`.
    pub fn to_toml(&self, config: &str) -> String {
        let mut out = String::new();
        writeln!(out, "[config]\n{config}\n").unwrap();
        for name in &self.tasks {
            let inputs: Vec<String> = self
                .items
                .iter()
                .filter(|(_, _, c)| c == name)
                .map(|(item, _, _)| format!("\"{item}\""))
                .collect();
            let outputs: Vec<String> = self
                .items
                .iter()
                .filter(|(_, p, _)| p == name)
                .map(|(item, _, _)| format!("\"{item}\""))
                .collect();
            writeln!(out, "[task.{name}]").unwrap();
            writeln!(out, "inputs = [{}]", inputs.join(", ")).unwrap();
            writeln!(out, "outputs = [{}]\n", outputs.join(", ")).unwrap();
        }
        out
    }

    fn touch(&mut self, name: &str) {
        if !self.tasks.iter().any(|t| t == name) {
            self.tasks.push(name.to_string());
        }
    }
}

impl Default for ProblemBuilder {
    fn default() -> Self {
        Self::new()
    }
}

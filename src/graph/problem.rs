// src/graph/problem.rs

//! Full task/item graph as handed over by callers.
//!
//! Items are explicit nodes here: `producer -> item -> consumer`. The
//! sequencing engine never works on this graph directly; it asks for the
//! task projection via [`ProblemGraph::project`].

use std::collections::HashMap;

use tracing::debug;

use crate::errors::{Result, SeqdagError};
use crate::graph::task_graph::{TaskGraph, TaskId, TaskName};

/// Role tag attached to every task. The engine never interprets it.
pub const DEFAULT_TASK_ROLE: &str = "function";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub name: TaskName,
    pub role: String,
}

/// A data element with at most one producer. An item without a producer is
/// an environment input; one without consumers is an environment output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub name: String,
    pub producer: Option<TaskId>,
    pub consumers: Vec<TaskId>,
}

#[derive(Debug, Clone, Default)]
pub struct ProblemGraph {
    tasks: Vec<Task>,
    task_index: HashMap<TaskName, TaskId>,
    items: Vec<Item>,
    item_index: HashMap<String, usize>,
}

impl ProblemGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task; re-adding a known name returns its existing id.
    pub fn add_task(&mut self, name: &str, role: &str) -> TaskId {
        if let Some(id) = self.task_index.get(name) {
            return *id;
        }
        let id = TaskId(self.tasks.len());
        self.tasks.push(Task {
            name: name.to_string(),
            role: role.to_string(),
        });
        self.task_index.insert(name.to_string(), id);
        id
    }

    /// Register an item, returning its index.
    pub fn add_item(&mut self, name: &str) -> usize {
        if let Some(idx) = self.item_index.get(name) {
            return *idx;
        }
        let idx = self.items.len();
        self.items.push(Item {
            name: name.to_string(),
            producer: None,
            consumers: Vec::new(),
        });
        self.item_index.insert(name.to_string(), idx);
        idx
    }

    /// Record that `task` produces `item` (creating the item if needed).
    pub fn produce(&mut self, task: &str, item: &str) -> Result<()> {
        let task_id = self.task_id(task)?;
        let idx = self.add_item(item);
        let entry = &mut self.items[idx];

        match entry.producer {
            Some(existing) if existing != task_id => Err(SeqdagError::ConfigError(format!(
                "item '{}' is produced by both '{}' and '{}'",
                item, self.tasks[existing.0].name, task
            ))),
            _ => {
                entry.producer = Some(task_id);
                Ok(())
            }
        }
    }

    /// Record that `task` consumes `item` (creating the item if needed).
    pub fn consume(&mut self, task: &str, item: &str) -> Result<()> {
        let task_id = self.task_id(task)?;
        let idx = self.add_item(item);
        let entry = &mut self.items[idx];
        if !entry.consumers.contains(&task_id) {
            entry.consumers.push(task_id);
        }
        Ok(())
    }

    pub fn task_id(&self, name: &str) -> Result<TaskId> {
        self.task_index
            .get(name)
            .copied()
            .ok_or_else(|| SeqdagError::UnknownTask(name.to_string()))
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Drop the item nodes: an edge `A -> B` carries the number of distinct
    /// items produced by `A` and consumed by `B`. Task ids are preserved.
    pub fn project(&self) -> TaskGraph {
        let mut graph = TaskGraph::new();
        for task in &self.tasks {
            graph.add_task(&task.name);
        }

        for item in &self.items {
            let Some(producer) = item.producer else {
                continue;
            };
            for consumer in &item.consumers {
                // Ids come from this graph, so the edge cannot be rejected.
                if let Err(e) = graph.add_edge(producer, *consumer, 1) {
                    debug!(item = %item.name, error = %e, "skipping item edge");
                }
            }
        }

        debug!(
            tasks = graph.task_count(),
            edges = graph.edge_count(),
            items = self.items.len(),
            "projected task/item graph onto tasks"
        );
        graph
    }
}

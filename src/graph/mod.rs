// src/graph/mod.rs

//! Graph data model.
//!
//! - [`problem`] holds the full task/item graph supplied by callers.
//! - [`task_graph`] holds the task projection the sequencing engine works on:
//!   an arena of tasks addressed by stable [`TaskId`]s with weighted edges.

pub mod problem;
pub mod task_graph;

pub use problem::{DEFAULT_TASK_ROLE, Item, ProblemGraph, Task};
pub use task_graph::{TaskGraph, TaskId, TaskName};

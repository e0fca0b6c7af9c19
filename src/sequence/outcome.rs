// src/sequence/outcome.rs

//! Result handed back to callers after a sequencing run.

use crate::errors::{Result, SeqdagError};
use crate::graph::{TaskId, TaskName};
use crate::sequence::coupling::CouplingMatrix;
use crate::sequence::exact::SequencingWarning;
use crate::sequence::feedback::Score;
use crate::sequence::partition::Partition;
use crate::types::Method;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequencingResult {
    pub method: Method,
    /// Final order over the full task set.
    pub order: Vec<TaskName>,
    /// Same order as ids into the task projection.
    pub task_ids: Vec<TaskId>,
    /// Coupling matrix of `order`.
    pub matrix: CouplingMatrix,
    pub score: Score,
    pub partition: Partition<TaskName>,
    pub warnings: Vec<SequencingWarning>,
}

impl SequencingResult {
    /// Whether the input graph had no tasks at all.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// For callers that treat an empty input as an error.
    pub fn require_non_empty(self) -> Result<Self> {
        if self.is_empty() {
            Err(SeqdagError::EmptyInput)
        } else {
            Ok(self)
        }
    }

    /// Position of `task` in the final order.
    pub fn position_of(&self, task: &str) -> Option<usize> {
        self.order.iter().position(|t| t == task)
    }
}

// src/sequence/coupling.rs

//! Coupling matrix for an ordered list of tasks.

use std::fmt;

use crate::errors::{Result, SeqdagError};
use crate::graph::{TaskGraph, TaskId};
use crate::sequence::feedback::{self, Score};

/// `N×N` item counts indexed by position in an order.
///
/// Entry `(i, j)` is the number of distinct items the task at position `i`
/// feeds to the task at position `j`. The diagonal is always zero. Entries
/// below the diagonal (`i > j`) are feedback.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CouplingMatrix {
    n: usize,
    cells: Vec<usize>,
}

impl CouplingMatrix {
    /// Build the matrix for `order` from scratch.
    ///
    /// Pure function of `(graph, order)`; callers rebuild it whenever the
    /// candidate order changes.
    pub fn build(graph: &TaskGraph, order: &[TaskId]) -> Result<Self> {
        if let Some(unknown) = order.iter().find(|id| !graph.contains(**id)) {
            return Err(SeqdagError::UnknownTask(unknown.to_string()));
        }

        let n = order.len();
        let mut cells = vec![0; n * n];
        for (i, &from) in order.iter().enumerate() {
            for (j, &to) in order.iter().enumerate() {
                if i != j {
                    cells[i * n + j] = graph.edge_weight(from, to);
                }
            }
        }

        Ok(Self { n, cells })
    }

    /// Matrix from explicit rows. Rows must be square; the diagonal is
    /// cleared.
    pub fn from_rows(rows: Vec<Vec<usize>>) -> Self {
        let n = rows.len();
        let mut cells = vec![0; n * n];
        for (i, row) in rows.into_iter().enumerate() {
            for (j, value) in row.into_iter().enumerate().take(n) {
                if i != j {
                    cells[i * n + j] = value;
                }
            }
        }
        Self { n, cells }
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn get(&self, i: usize, j: usize) -> usize {
        self.cells[i * self.n + j]
    }

    pub fn row(&self, i: usize) -> &[usize] {
        &self.cells[i * self.n..(i + 1) * self.n]
    }

    /// Whether column `column` is zero on every row listed in `rows`, i.e.
    /// none of those tasks feeds the task at `column`.
    pub fn column_is_zero_within(&self, column: usize, rows: &[usize]) -> bool {
        rows.iter().all(|&r| self.get(r, column) == 0)
    }

    pub fn score(&self) -> Score {
        feedback::score(self)
    }
}

impl fmt::Display for CouplingMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .cells
            .iter()
            .map(|c| c.to_string().len())
            .max()
            .unwrap_or(1);

        for i in 0..self.n {
            let row: Vec<String> = self
                .row(i)
                .iter()
                .map(|c| format!("{c:>width$}"))
                .collect();
            writeln!(f, "{}", row.join(" "))?;
        }
        Ok(())
    }
}

// src/sequence/local_search.rs

//! First-improvement hill-climbing over orders of the coupled group.
//!
//! - single-swap: relocate one task to another position.
//! - two-swap: exchange the tasks at two positions.
//! - hybrid: two-swap to convergence, then single-swap on the result.
//!
//! A move is accepted only if it strictly improves the [`Score`]. The
//! results are local optima; use [`crate::sequence::exact`] for optimality.

use tracing::{debug, trace};

use crate::errors::Result;
use crate::graph::{TaskGraph, TaskId};
use crate::sequence::cancel::CancellationToken;
use crate::sequence::coupling::CouplingMatrix;
use crate::sequence::feedback::Score;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heuristic {
    SingleSwap,
    TwoSwap,
    Hybrid,
}

/// Result of a local search run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    pub order: Vec<TaskId>,
    pub score: Score,
    /// Number of accepted moves.
    pub moves: usize,
    /// Score of the starting order followed by the score after every
    /// accepted move; strictly decreasing.
    pub history: Vec<Score>,
}

/// Local search over a fixed task graph.
///
/// Holds only shared references, so one instance can be used from several
/// worker threads.
#[derive(Debug, Clone, Copy)]
pub struct LocalSearch<'a> {
    graph: &'a TaskGraph,
    cancel: &'a CancellationToken,
}

impl<'a> LocalSearch<'a> {
    pub fn new(graph: &'a TaskGraph, cancel: &'a CancellationToken) -> Self {
        Self { graph, cancel }
    }

    pub fn run(&self, heuristic: Heuristic, start: Vec<TaskId>) -> Result<SearchOutcome> {
        let score = self.evaluate(&start)?;
        let initial = SearchOutcome {
            order: start,
            score,
            moves: 0,
            history: vec![score],
        };

        let outcome = match heuristic {
            Heuristic::SingleSwap => self.single_swap(initial)?,
            Heuristic::TwoSwap => self.two_swap(initial)?,
            Heuristic::Hybrid => {
                let swapped = self.two_swap(initial)?;
                self.single_swap(swapped)?
            }
        };

        debug!(
            ?heuristic,
            moves = outcome.moves,
            feedback = outcome.score.feedback,
            size = outcome.score.size,
            "local search converged"
        );
        Ok(outcome)
    }

    /// Relocate the task at each position `i` to every other position,
    /// scanning targets from the far end inward. Restart after each
    /// accepted move; stop when a full scan finds nothing better.
    pub fn single_swap(&self, mut state: SearchOutcome) -> Result<SearchOutcome> {
        let n = state.order.len();

        'scan: loop {
            self.cancel.check()?;

            for i in 0..n {
                for j in (0..n).rev() {
                    if i == j {
                        continue;
                    }
                    let mut candidate = state.order.clone();
                    let task = candidate.remove(i);
                    candidate.insert(j, task);

                    if self.try_accept(&mut state, candidate)? {
                        trace!(from = i, to = j, "single-swap: accepted relocation");
                        continue 'scan;
                    }
                }
            }

            return Ok(state);
        }
    }

    /// Exchange every pair of positions `(i, j)`, `i < j`. Restart after
    /// each accepted exchange; stop when a full scan finds nothing better.
    pub fn two_swap(&self, mut state: SearchOutcome) -> Result<SearchOutcome> {
        let n = state.order.len();

        'scan: loop {
            self.cancel.check()?;

            for i in 0..n {
                for j in (i + 1)..n {
                    let mut candidate = state.order.clone();
                    candidate.swap(i, j);

                    if self.try_accept(&mut state, candidate)? {
                        trace!(first = i, second = j, "two-swap: accepted exchange");
                        continue 'scan;
                    }
                }
            }

            return Ok(state);
        }
    }

    fn try_accept(&self, state: &mut SearchOutcome, candidate: Vec<TaskId>) -> Result<bool> {
        let score = self.evaluate(&candidate)?;
        if !score.improves_on(&state.score) {
            return Ok(false);
        }
        state.order = candidate;
        state.score = score;
        state.moves += 1;
        state.history.push(score);
        Ok(true)
    }

    fn evaluate(&self, order: &[TaskId]) -> Result<Score> {
        Ok(CouplingMatrix::build(self.graph, order)?.score())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SeqdagError;

    /// A -> B -> C -> D plus one feedback item D -> A.
    fn ring() -> (TaskGraph, Vec<TaskId>) {
        let mut g = TaskGraph::new();
        let ids: Vec<TaskId> = ["A", "B", "C", "D"].iter().map(|n| g.add_task(n)).collect();
        for w in ids.windows(2) {
            g.add_edge(w[0], w[1], 1).unwrap();
        }
        g.add_edge(ids[3], ids[0], 1).unwrap();
        (g, ids)
    }

    fn assert_strictly_decreasing(history: &[Score]) {
        for pair in history.windows(2) {
            assert!(pair[1] < pair[0], "history not decreasing: {history:?}");
        }
    }

    #[test]
    fn every_heuristic_reaches_a_single_feedback() {
        let (g, ids) = ring();
        let cancel = CancellationToken::new();
        let search = LocalSearch::new(&g, &cancel);
        // Worst start: fully reversed.
        let start: Vec<TaskId> = ids.iter().rev().copied().collect();

        for heuristic in [Heuristic::SingleSwap, Heuristic::TwoSwap, Heuristic::Hybrid] {
            let out = search.run(heuristic, start.clone()).unwrap();
            assert_eq!(out.score.feedback, 1, "{heuristic:?}");
            assert_eq!(out.history.first(), Some(&Score::new(3, 6)));
            assert_eq!(out.history.last(), Some(&out.score));
            assert_eq!(out.history.len(), out.moves + 1);
            assert_strictly_decreasing(&out.history);

            let mut sorted = out.order.clone();
            sorted.sort();
            assert_eq!(sorted, ids);
        }
    }

    #[test]
    fn optimal_start_is_left_alone() {
        let (g, ids) = ring();
        let cancel = CancellationToken::new();
        let search = LocalSearch::new(&g, &cancel);
        // Every rotation of the ring leaves one feedback item spanning all
        // four tasks, which is optimal.
        let out = search.run(Heuristic::TwoSwap, ids.clone()).unwrap();
        assert_eq!(out.score, Score::new(1, 4));
        assert_eq!(out.moves, 0);
        assert_eq!(out.order, ids);
    }

    #[test]
    fn empty_and_single_orders_converge_immediately() {
        let (g, ids) = ring();
        let cancel = CancellationToken::new();
        let search = LocalSearch::new(&g, &cancel);

        let out = search.run(Heuristic::Hybrid, Vec::new()).unwrap();
        assert!(out.order.is_empty());
        assert_eq!(out.moves, 0);

        let out = search.run(Heuristic::SingleSwap, vec![ids[2]]).unwrap();
        assert_eq!(out.order, vec![ids[2]]);
        assert_eq!(out.score, Score::default());
    }

    #[test]
    fn cancellation_is_observed() {
        let (g, ids) = ring();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let search = LocalSearch::new(&g, &cancel);
        assert!(matches!(
            search.run(Heuristic::SingleSwap, ids),
            Err(SeqdagError::Cancelled)
        ));
    }
}

// src/sequence/exact.rs

//! Exact optimizers for the coupled group: brute-force permutation search and
//! best-first branch-and-bound. Both minimise the same lexicographic
//! [`Score`] as the local search heuristics.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;
use std::sync::Mutex;

use rayon::ThreadPool;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::errors::{Result, SeqdagError};
use crate::graph::{TaskGraph, TaskId};
use crate::sequence::cancel::CancellationToken;
use crate::sequence::coupling::CouplingMatrix;
use crate::sequence::feedback::Score;

/// Default permutation count above which brute force warns.
pub const DEFAULT_BRUTE_FORCE_LIMIT: u64 = 300_000;

/// How often the brute-force loop polls for cancellation.
const CANCEL_POLL_INTERVAL: u128 = 1024;

/// Non-fatal diagnostics produced by a sequencing run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequencingWarning {
    /// Brute force was asked to enumerate more permutations than the
    /// configured limit.
    LargePermutationSpace {
        tasks: usize,
        permutations: u128,
        limit: u64,
    },
}

impl fmt::Display for SequencingWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequencingWarning::LargePermutationSpace {
                tasks,
                permutations,
                limit,
            } => write!(
                f,
                "brute force over {tasks} tasks enumerates {permutations} permutations (limit {limit})"
            ),
        }
    }
}

/// Result of an exact search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExactOutcome {
    pub order: Vec<TaskId>,
    pub score: Score,
    /// Permutations scored (brute force) or branches expanded
    /// (branch-and-bound).
    pub explored: u128,
}

/// `n!`, saturating at `u128::MAX`.
pub fn factorial(n: usize) -> u128 {
    (2..=n as u128).fold(1u128, |acc, k| acc.saturating_mul(k))
}

/// Pre-flight check callers run before committing to brute force.
pub fn brute_force_preflight(tasks: usize, limit: u64) -> Option<SequencingWarning> {
    let permutations = factorial(tasks);
    (permutations > u128::from(limit)).then_some(SequencingWarning::LargePermutationSpace {
        tasks,
        permutations,
        limit,
    })
}

/// Advance `perm` to its lexicographic successor; `false` once it was the
/// last permutation.
fn next_permutation(perm: &mut [usize]) -> bool {
    if perm.len() < 2 {
        return false;
    }
    let mut i = perm.len() - 1;
    while i > 0 && perm[i - 1] >= perm[i] {
        i -= 1;
    }
    if i == 0 {
        return false;
    }
    let mut j = perm.len() - 1;
    while perm[j] <= perm[i - 1] {
        j -= 1;
    }
    perm.swap(i - 1, j);
    perm[i..].reverse();
    true
}

/// Best permutation seen so far, ranked by `(score, rank)` where `rank` is
/// the lexicographic index of the permutation.
#[derive(Debug, Clone)]
struct Candidate {
    score: Score,
    rank: u128,
    order: Vec<TaskId>,
}

impl Candidate {
    fn beats(&self, other: &Candidate) -> bool {
        (self.score, self.rank) < (other.score, other.rank)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ExactSearch<'a> {
    graph: &'a TaskGraph,
    cancel: &'a CancellationToken,
}

impl<'a> ExactSearch<'a> {
    pub fn new(graph: &'a TaskGraph, cancel: &'a CancellationToken) -> Self {
        Self { graph, cancel }
    }

    /// Score every permutation of `tasks` and keep the first best one.
    ///
    /// With a pool, permutations are split by their first element; each
    /// worker merges its local best into one shared best under a lock.
    pub fn brute_force(&self, tasks: &[TaskId], pool: Option<&ThreadPool>) -> Result<ExactOutcome> {
        let n = tasks.len();
        info!(tasks = n, permutations = %factorial(n), "brute force: enumerating permutations");

        let best = match pool {
            Some(pool) if n >= 2 => {
                let shared: Mutex<Option<Candidate>> = Mutex::new(None);
                let block = factorial(n - 1);

                pool.install(|| {
                    (0..n).into_par_iter().try_for_each(|first| -> Result<()> {
                        let local =
                            self.scan_permutations(tasks, Some(first), block * first as u128)?;
                        let mut guard = shared.lock().map_err(|_| {
                            SeqdagError::Other(anyhow::anyhow!("brute-force best lock poisoned"))
                        })?;
                        let replace = match guard.as_ref() {
                            Some(current) => local.beats(current),
                            None => true,
                        };
                        if replace {
                            *guard = Some(local);
                        }
                        Ok(())
                    })
                })?;

                shared.into_inner().map_err(|_| {
                    SeqdagError::Other(anyhow::anyhow!("brute-force best lock poisoned"))
                })?
            }
            _ => Some(self.scan_permutations(tasks, None, 0)?),
        };

        let best = best.ok_or_else(|| {
            SeqdagError::Other(anyhow::anyhow!("brute force produced no permutation"))
        })?;

        Ok(ExactOutcome {
            order: best.order,
            score: best.score,
            explored: factorial(n),
        })
    }

    /// Enumerate permutations in lexicographic order of positions. With
    /// `first` set, only permutations starting with `tasks[first]` are
    /// scanned and ranks start at `rank_offset`.
    fn scan_permutations(
        &self,
        tasks: &[TaskId],
        first: Option<usize>,
        rank_offset: u128,
    ) -> Result<Candidate> {
        let (prefix, mut rest): (Vec<usize>, Vec<usize>) = match first {
            Some(f) => (vec![f], (0..tasks.len()).filter(|i| *i != f).collect()),
            None => (Vec::new(), (0..tasks.len()).collect()),
        };

        let mut order: Vec<TaskId> = Vec::with_capacity(tasks.len());
        let mut best: Option<Candidate> = None;
        let mut rank = rank_offset;

        loop {
            if (rank - rank_offset) % CANCEL_POLL_INTERVAL == 0 {
                self.cancel.check()?;
            }

            order.clear();
            order.extend(prefix.iter().chain(rest.iter()).map(|&i| tasks[i]));
            let score = CouplingMatrix::build(self.graph, &order)?.score();

            let improves = match &best {
                Some(current) => score.improves_on(&current.score),
                None => true,
            };
            if improves {
                best = Some(Candidate {
                    score,
                    rank,
                    order: order.clone(),
                });
            }

            rank += 1;
            if !next_permutation(&mut rest) {
                break;
            }
        }

        best.ok_or_else(|| SeqdagError::Other(anyhow::anyhow!("empty permutation scan")))
    }

    /// Best-first branch-and-bound over prefixes of `tasks`.
    ///
    /// The active branch with the smallest lower bound is expanded next;
    /// ties go to the longest prefix, then to the earliest created branch.
    /// The first complete branch selected is optimal.
    pub fn branch_and_bound(
        &self,
        tasks: &[TaskId],
        pool: Option<&ThreadPool>,
    ) -> Result<ExactOutcome> {
        let n = tasks.len();
        let mut active = BinaryHeap::new();
        let mut next_seq: u64 = 0;
        let mut explored: u128 = 0;

        active.push(Branch {
            bound: Score::default(),
            prefix: Vec::new(),
            seq: next_seq,
        });
        next_seq += 1;

        while let Some(branch) = active.pop() {
            self.cancel.check()?;

            if branch.prefix.len() == n {
                let order: Vec<TaskId> = branch.prefix.iter().map(|&i| tasks[i]).collect();
                info!(
                    tasks = n,
                    expanded = explored,
                    active = active.len(),
                    score = %branch.bound,
                    "branch-and-bound: optimal order found"
                );
                return Ok(ExactOutcome {
                    order,
                    score: branch.bound,
                    explored,
                });
            }

            explored += 1;
            let children: Vec<Vec<usize>> = (0..n)
                .filter(|i| !branch.prefix.contains(i))
                .map(|i| {
                    let mut prefix = branch.prefix.clone();
                    prefix.push(i);
                    prefix
                })
                .collect();

            let bounds: Vec<Result<Score>> = match pool {
                Some(pool) => pool.install(|| {
                    children
                        .par_iter()
                        .map(|prefix| self.lower_bound(tasks, prefix))
                        .collect()
                }),
                None => children
                    .iter()
                    .map(|prefix| self.lower_bound(tasks, prefix))
                    .collect(),
            };

            for (prefix, bound) in children.into_iter().zip(bounds) {
                active.push(Branch {
                    bound: bound?,
                    prefix,
                    seq: next_seq,
                });
                next_seq += 1;
            }

            if explored % 1000 == 0 {
                debug!(expanded = explored, active = active.len(), "branch-and-bound progress");
            }
        }

        warn!(tasks = n, "branch-and-bound ran out of branches");
        Err(SeqdagError::Other(anyhow::anyhow!(
            "branch-and-bound exhausted its branches without a complete order"
        )))
    }

    /// Lower bound on the score of any completion of `prefix`.
    ///
    /// The prefix is placed first and the remaining tasks after it in their
    /// given order. Every item flowing into a prefix task from a later
    /// position is feedback in any completion. A prefix source contributes
    /// its exact span; an unplaced source contributes the smallest span it
    /// can end up with, which is as if it sat right after the prefix.
    pub fn lower_bound(&self, tasks: &[TaskId], prefix: &[usize]) -> Result<Score> {
        let b = prefix.len();
        let order: Vec<TaskId> = prefix
            .iter()
            .copied()
            .chain((0..tasks.len()).filter(|i| !prefix.contains(i)))
            .map(|i| tasks[i])
            .collect();
        let matrix = CouplingMatrix::build(self.graph, &order)?;

        let mut bound = Score::default();
        for j in 0..b {
            for i in (j + 1)..order.len() {
                let count = matrix.get(i, j);
                if count == 0 {
                    continue;
                }
                let span = if i < b { i - j + 1 } else { b - j + 1 };
                bound.feedback += count;
                bound.size += span * count;
            }
        }
        Ok(bound)
    }
}

/// Partial order in the branch-and-bound search. Indices refer to positions
/// in the task slice being ordered.
#[derive(Debug, Clone)]
struct Branch {
    bound: Score,
    prefix: Vec<usize>,
    seq: u64,
}

// `BinaryHeap` pops the greatest element: the greatest branch has the
// smallest bound, then the longest prefix, then the smallest sequence number.
impl Ord for Branch {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .bound
            .cmp(&self.bound)
            .then_with(|| self.prefix.len().cmp(&other.prefix.len()))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Branch {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Branch {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Branch {}

// src/sequence/orchestrator.rs

//! Sequencing state machine.
//!
//! A [`Sequencer`] owns a private copy of the task projection and walks
//! through:
//!
//! `Start -> Contracted -> Partitioned -> PreSorted -> PostSorted ->
//! CoupledSorted -> Done`
//!
//! Each call to [`Sequencer::step`] performs exactly one transition, which
//! lets tests inspect intermediate state. [`Sequencer::run`] steps to the
//! end and assembles the [`SequencingResult`].

use std::collections::HashSet;

use rayon::ThreadPool;
use tracing::{debug, info, warn};

use crate::errors::{Result, SeqdagError};
use crate::graph::{ProblemGraph, TaskGraph, TaskId};
use crate::sequence::contract::{Contraction, contract_cycles};
use crate::sequence::coupling::CouplingMatrix;
use crate::sequence::exact::{ExactSearch, SequencingWarning, brute_force_preflight};
use crate::sequence::local_search::{Heuristic, LocalSearch};
use crate::sequence::multi_start::{run_multi_start, starting_points};
use crate::sequence::options::SequencingOptions;
use crate::sequence::outcome::SequencingResult;
use crate::sequence::partition::{Partition, peel_order};
use crate::types::Method;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencingState {
    Start,
    Contracted,
    Partitioned,
    PreSorted,
    PostSorted,
    CoupledSorted,
    Done,
}

pub struct Sequencer {
    graph: TaskGraph,
    options: SequencingOptions,
    /// Resolved manual order, validated up front.
    manual: Option<Vec<TaskId>>,
    pool: Option<ThreadPool>,
    state: SequencingState,
    contraction: Option<Contraction>,
    partition: Partition<TaskId>,
    warnings: Vec<SequencingWarning>,
}

impl std::fmt::Debug for Sequencer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sequencer")
            .field("method", &self.options.method)
            .field("state", &self.state)
            .field("tasks", &self.graph.task_count())
            .field("partition", &self.partition)
            .finish_non_exhaustive()
    }
}

impl Sequencer {
    /// Sequence the task projection of `problem`.
    pub fn new(problem: &ProblemGraph, options: SequencingOptions) -> Result<Self> {
        Self::from_task_graph(problem.project(), options)
    }

    /// Sequence an already projected task graph. Options (including the
    /// manual order) are validated here, before any stage runs.
    pub fn from_task_graph(graph: TaskGraph, options: SequencingOptions) -> Result<Self> {
        options.validate()?;

        let manual = match (&options.method, &options.manual_order) {
            (Method::Manual, Some(names)) => Some(resolve_manual_order(&graph, names)?),
            _ => None,
        };

        let pool = if options.workers > 1 {
            Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(options.workers)
                    .thread_name(|i| format!("seqdag-worker-{i}"))
                    .build()?,
            )
        } else {
            None
        };

        Ok(Self {
            graph,
            options,
            manual,
            pool,
            state: SequencingState::Start,
            contraction: None,
            partition: Partition::default(),
            warnings: Vec::new(),
        })
    }

    pub fn state(&self) -> SequencingState {
        self.state
    }

    /// Partition as it stands after the stages run so far.
    pub fn partition(&self) -> &Partition<TaskId> {
        &self.partition
    }

    pub fn graph(&self) -> &TaskGraph {
        &self.graph
    }

    /// Perform one transition and return the new state. Stepping a finished
    /// sequencer is a no-op.
    pub fn step(&mut self) -> Result<SequencingState> {
        self.options.cancel.check()?;

        self.state = match self.state {
            SequencingState::Start => {
                if self.graph.is_empty() {
                    info!("sequencing: input has no tasks; producing empty outputs");
                }
                self.contraction = Some(contract_cycles(&self.graph, &self.options.cancel)?);
                SequencingState::Contracted
            }
            SequencingState::Contracted => {
                let contraction = self.contraction.take().ok_or_else(|| {
                    SeqdagError::Other(anyhow::anyhow!("partitioning before contraction"))
                })?;
                self.partition = contraction.partition()?;
                info!(
                    pre = self.partition.pre_coupled.len(),
                    coupled = self.partition.coupled.len(),
                    post = self.partition.post_coupled.len(),
                    "sequencing: partition derived"
                );
                SequencingState::Partitioned
            }
            SequencingState::Partitioned => {
                self.partition.pre_coupled =
                    peel_order(&self.graph, &self.partition.pre_coupled, "pre-coupled")?;
                SequencingState::PreSorted
            }
            SequencingState::PreSorted => {
                self.partition.post_coupled =
                    peel_order(&self.graph, &self.partition.post_coupled, "post-coupled")?;
                SequencingState::PostSorted
            }
            SequencingState::PostSorted => {
                self.partition.coupled = self.order_coupled()?;
                SequencingState::CoupledSorted
            }
            SequencingState::CoupledSorted | SequencingState::Done => SequencingState::Done,
        };

        debug!(state = ?self.state, "sequencing: stepped");
        Ok(self.state)
    }

    /// Step to `Done` and assemble the result.
    pub fn run(mut self) -> Result<SequencingResult> {
        info!(
            method = %self.options.method,
            exact = self.options.method.is_exact(),
            tasks = self.graph.task_count(),
            "sequencing: starting"
        );

        while self.state != SequencingState::Done {
            self.step()?;
        }

        let task_ids: Vec<TaskId> = match self.manual.take() {
            Some(order) => order,
            None => self.partition.iter().copied().collect(),
        };

        let matrix = CouplingMatrix::build(&self.graph, &task_ids)?;
        let score = matrix.score();
        let order = task_ids
            .iter()
            .map(|id| self.graph.name_of(*id).map(str::to_string))
            .collect::<Result<Vec<_>>>()?;
        let partition = self
            .partition
            .try_map(|id| self.graph.name_of(*id).map(str::to_string))?;

        info!(
            method = %self.options.method,
            feedback = score.feedback,
            size = score.size,
            "sequencing: done"
        );

        Ok(SequencingResult {
            method: self.options.method,
            order,
            task_ids,
            matrix,
            score,
            partition,
            warnings: self.warnings,
        })
    }

    /// Order the coupled group with the selected method.
    fn order_coupled(&mut self) -> Result<Vec<TaskId>> {
        let coupled = self.partition.coupled.clone();
        let cancel = &self.options.cancel;
        let pool = self.pool.as_ref();

        let heuristic = match self.options.method {
            Method::Manual => {
                debug!("manual order requested; coupled group left as contracted");
                return Ok(coupled);
            }
            Method::BruteForce => {
                if let Some(warning) =
                    brute_force_preflight(coupled.len(), self.options.brute_force_limit)
                {
                    if self.options.abort_on_limit {
                        let SequencingWarning::LargePermutationSpace {
                            tasks,
                            permutations,
                            limit,
                        } = warning;
                        return Err(SeqdagError::PermutationLimitExceeded {
                            tasks,
                            permutations,
                            limit,
                        });
                    }
                    warn!(%warning, "brute force above the permutation limit; continuing");
                    self.warnings.push(warning);
                }
                let outcome = ExactSearch::new(&self.graph, cancel).brute_force(&coupled, pool)?;
                return Ok(outcome.order);
            }
            Method::BranchAndBound => {
                let outcome =
                    ExactSearch::new(&self.graph, cancel).branch_and_bound(&coupled, pool)?;
                return Ok(outcome.order);
            }
            Method::SingleSwap => Heuristic::SingleSwap,
            Method::TwoSwap => Heuristic::TwoSwap,
            Method::HybridSwap => Heuristic::Hybrid,
        };

        let search = LocalSearch::new(&self.graph, cancel);
        let outcome = match self.options.multi_start {
            Some(count) => {
                let starts = starting_points(&coupled, count, self.options.seed);
                run_multi_start(&search, heuristic, starts, pool)?
            }
            None => search.run(heuristic, coupled)?,
        };
        Ok(outcome.order)
    }
}

/// Map a caller's manual order onto task ids; it must name every task
/// exactly once.
fn resolve_manual_order(graph: &TaskGraph, names: &[String]) -> Result<Vec<TaskId>> {
    let mut seen = HashSet::new();
    let mut ids = Vec::with_capacity(names.len());

    for name in names {
        let id = graph.task_id(name)?;
        if !seen.insert(id) {
            return Err(SeqdagError::InvalidManualOrder(format!(
                "task '{name}' appears more than once"
            )));
        }
        ids.push(id);
    }

    let missing: Vec<&str> = graph
        .task_ids()
        .into_iter()
        .filter(|id| !seen.contains(id))
        .filter_map(|id| graph.name_of(id).ok())
        .collect();
    if !missing.is_empty() {
        return Err(SeqdagError::InvalidManualOrder(format!(
            "order is missing tasks [{}]",
            missing.join(", ")
        )));
    }

    Ok(ids)
}

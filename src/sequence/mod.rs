// src/sequence/mod.rs

//! Task sequencing engine.
//!
//! - [`contract`] merges cycles into a super-node and derives the
//!   pre-coupled / coupled / post-coupled [`partition`].
//! - [`coupling`] builds the coupling matrix of an order; [`feedback`]
//!   scores it.
//! - [`local_search`] and [`multi_start`] hold the swap heuristics;
//!   [`exact`] holds brute force and branch-and-bound.
//! - [`orchestrator`] drives all of the above as a state machine.
//!
//! Every run is synchronous and works on its own copy of the task graph.

pub mod cancel;
pub mod contract;
pub mod coupling;
pub mod exact;
pub mod feedback;
pub mod local_search;
pub mod multi_start;
pub mod options;
pub mod orchestrator;
pub mod outcome;
pub mod partition;

pub use cancel::CancellationToken;
pub use coupling::CouplingMatrix;
pub use exact::{DEFAULT_BRUTE_FORCE_LIMIT, SequencingWarning, brute_force_preflight};
pub use feedback::Score;
pub use options::SequencingOptions;
pub use orchestrator::{Sequencer, SequencingState};
pub use outcome::SequencingResult;
pub use partition::Partition;

use crate::errors::Result;
use crate::graph::{ProblemGraph, TaskName};

/// Run one full sequencing pass over `problem`.
pub fn sequence(problem: &ProblemGraph, options: SequencingOptions) -> Result<SequencingResult> {
    Sequencer::new(problem, options)?.run()
}

/// Partition only (contraction plus topological split), without ordering
/// the coupled group.
pub fn partition_of(problem: &ProblemGraph) -> Result<Partition<TaskName>> {
    let graph = problem.project();
    let contraction = contract::contract_cycles(&graph, &CancellationToken::new())?;
    contraction
        .partition()?
        .try_map(|id| graph.name_of(*id).map(str::to_string))
}

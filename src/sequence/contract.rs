// src/sequence/contract.rs

//! Cycle contraction.
//!
//! Every cycle of the task projection is merged into one synthetic
//! super-node until the graph is acyclic. The merged tasks form the coupled
//! group; a topological sort of the reduced graph places every other task
//! before (pre-coupled) or after (post-coupled) the super-node.

use petgraph::Direction;
use tracing::{debug, info};

use crate::errors::{Result, SeqdagError};
use crate::graph::{TaskGraph, TaskId};
use crate::sequence::cancel::CancellationToken;
use crate::sequence::partition::Partition;

const SUPER_NODE_LABEL: &str = "<coupled>";

/// Edge orientation used when searching for a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Follow edges producer -> consumer.
    Original,
    /// Follow edges consumer -> producer.
    Reverse,
}

impl Orientation {
    fn direction(self) -> Direction {
        match self {
            Orientation::Original => Direction::Outgoing,
            Orientation::Reverse => Direction::Incoming,
        }
    }
}

/// Find one cycle by depth-first search, starting from the smallest task id
/// and visiting neighbours in ascending id order.
///
/// Returns the tasks on the cycle in traversal order, or `None` if the graph
/// is acyclic in that orientation.
pub fn find_cycle(graph: &TaskGraph, orientation: Orientation) -> Option<Vec<TaskId>> {
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Mark {
        Unvisited,
        OnPath,
        Done,
    }

    let direction = orientation.direction();
    let ids = graph.task_ids();
    let slots = ids.iter().map(|id| id.0 + 1).max().unwrap_or(0);
    let mut marks = vec![Mark::Unvisited; slots];

    for &root in &ids {
        if marks[root.0] != Mark::Unvisited {
            continue;
        }

        // (node, sorted neighbours, next neighbour index)
        let mut path: Vec<(TaskId, Vec<TaskId>, usize)> =
            vec![(root, graph.neighbors_sorted(root, direction), 0)];
        marks[root.0] = Mark::OnPath;

        while let Some((node, neighbours, next)) = path.last_mut() {
            let Some(&candidate) = neighbours.get(*next) else {
                marks[node.0] = Mark::Done;
                path.pop();
                continue;
            };
            *next += 1;

            match marks[candidate.0] {
                Mark::Done => {}
                Mark::OnPath => {
                    let start = path
                        .iter()
                        .position(|(n, _, _)| *n == candidate)
                        .unwrap_or(0);
                    return Some(path[start..].iter().map(|(n, _, _)| *n).collect());
                }
                Mark::Unvisited => {
                    marks[candidate.0] = Mark::OnPath;
                    let next_neighbours = graph.neighbors_sorted(candidate, direction);
                    path.push((candidate, next_neighbours, 0));
                }
            }
        }
    }

    None
}

/// Outcome of contracting all cycles of a task projection.
#[derive(Debug, Clone)]
pub struct Contraction {
    /// Reduced, acyclic graph containing the super-node.
    pub graph: TaskGraph,
    pub super_node: TaskId,
    /// Tasks merged into the super-node, in contraction order.
    pub coupled: Vec<TaskId>,
}

/// Contract cycles of a private copy of `projection` until it is acyclic.
///
/// The reversed orientation is searched first; the original orientation is
/// only tried when that finds nothing. This fixes which tasks are merged
/// first and keeps the partition deterministic.
pub fn contract_cycles(
    projection: &TaskGraph,
    cancel: &CancellationToken,
) -> Result<Contraction> {
    let mut graph = projection.clone();
    graph.remove_edges(|from, to, _| from == to);
    let super_node = graph.add_synthetic_task(SUPER_NODE_LABEL);
    let mut coupled = Vec::new();

    while !graph.is_acyclic() {
        cancel.check()?;

        let cycle = find_cycle(&graph, Orientation::Reverse)
            .or_else(|| find_cycle(&graph, Orientation::Original))
            .ok_or_else(|| {
                SeqdagError::Other(anyhow::anyhow!(
                    "graph reported as cyclic but no cycle could be found"
                ))
            })?;

        debug!(cycle_len = cycle.len(), "contracting cycle into super-node");

        for task in cycle {
            if task == super_node {
                continue;
            }
            graph.contract(super_node, task)?;
            coupled.push(task);
        }
    }

    info!(
        coupled = coupled.len(),
        remaining = graph.task_count() - 1,
        "cycle contraction finished"
    );

    Ok(Contraction {
        graph,
        super_node,
        coupled,
    })
}

impl Contraction {
    /// Split tasks around the super-node using the canonical topological
    /// order of the reduced graph.
    ///
    /// With nothing contracted, the isolated super-node sorts last, so every
    /// task is pre-coupled.
    pub fn partition(&self) -> Result<Partition<TaskId>> {
        let order = self.graph.topological_order().ok_or_else(|| {
            SeqdagError::Other(anyhow::anyhow!("contracted graph is still cyclic"))
        })?;

        let split = order
            .iter()
            .position(|id| *id == self.super_node)
            .unwrap_or(order.len());

        Ok(Partition {
            pre_coupled: order[..split].to_vec(),
            coupled: self.coupled.clone(),
            post_coupled: order.get(split + 1..).unwrap_or(&[]).to_vec(),
        })
    }
}

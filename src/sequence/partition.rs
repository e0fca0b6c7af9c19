// src/sequence/partition.rs

//! Pre-coupled / coupled / post-coupled split and the zero-column peel used
//! to order the non-coupled groups.

use tracing::trace;

use crate::errors::{Result, SeqdagError};
use crate::graph::{TaskGraph, TaskId};
use crate::sequence::coupling::CouplingMatrix;

/// Three disjoint task groups whose union is the full task set.
///
/// - `pre_coupled`: feed-forward tasks that run before every cycle.
/// - `coupled`: tasks contracted into the cycle super-node.
/// - `post_coupled`: tasks that run after the coupled group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition<T> {
    pub pre_coupled: Vec<T>,
    pub coupled: Vec<T>,
    pub post_coupled: Vec<T>,
}

impl<T> Default for Partition<T> {
    fn default() -> Self {
        Self {
            pre_coupled: Vec::new(),
            coupled: Vec::new(),
            post_coupled: Vec::new(),
        }
    }
}

impl<T> Partition<T> {
    pub fn len(&self) -> usize {
        self.pre_coupled.len() + self.coupled.len() + self.post_coupled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All tasks, pre then coupled then post.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.pre_coupled
            .iter()
            .chain(self.coupled.iter())
            .chain(self.post_coupled.iter())
    }

    pub fn try_map<U, F>(&self, mut f: F) -> Result<Partition<U>>
    where
        F: FnMut(&T) -> Result<U>,
    {
        Ok(Partition {
            pre_coupled: self.pre_coupled.iter().map(&mut f).collect::<Result<_>>()?,
            coupled: self.coupled.iter().map(&mut f).collect::<Result<_>>()?,
            post_coupled: self.post_coupled.iter().map(&mut f).collect::<Result<_>>()?,
        })
    }
}

/// Order a non-coupled group by repeatedly taking the first task that no
/// still-unsorted task feeds.
///
/// `label` names the group in the error raised when no such task exists,
/// which means the group was not acyclic after all.
pub fn peel_order(graph: &TaskGraph, tasks: &[TaskId], label: &str) -> Result<Vec<TaskId>> {
    let matrix = CouplingMatrix::build(graph, tasks)?;
    let mut remaining: Vec<usize> = (0..tasks.len()).collect();
    let mut sorted = Vec::with_capacity(tasks.len());

    while !remaining.is_empty() {
        let pick = remaining
            .iter()
            .position(|&col| matrix.column_is_zero_within(col, &remaining))
            .ok_or_else(|| {
                let stuck: Vec<String> = remaining
                    .iter()
                    .map(|&i| {
                        graph
                            .name_of(tasks[i])
                            .map(str::to_string)
                            .unwrap_or_else(|_| tasks[i].to_string())
                    })
                    .collect();
                SeqdagError::CyclicNonCoupledPartition(format!(
                    "{label} partition has no task free of incoming coupling among [{}]",
                    stuck.join(", ")
                ))
            })?;

        let col = remaining.remove(pick);
        trace!(group = label, task = %tasks[col], "peeled task");
        sorted.push(tasks[col]);
    }

    Ok(sorted)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(names: &[&str], edges: &[(usize, usize)]) -> (TaskGraph, Vec<TaskId>) {
        let mut g = TaskGraph::new();
        let ids: Vec<TaskId> = names.iter().map(|n| g.add_task(n)).collect();
        for (a, b) in edges {
            g.add_edge(ids[*a], ids[*b], 1).unwrap();
        }
        (g, ids)
    }

    #[test]
    fn peel_sorts_topologically() {
        // C -> B -> A, given in the wrong order.
        let (g, ids) = graph(&["A", "B", "C"], &[(2, 1), (1, 0)]);
        let sorted = peel_order(&g, &ids, "pre-coupled").unwrap();
        assert_eq!(sorted, vec![ids[2], ids[1], ids[0]]);
    }

    #[test]
    fn peel_keeps_independent_tasks_in_place() {
        let (g, ids) = graph(&["A", "B", "C"], &[]);
        assert_eq!(peel_order(&g, &ids, "post-coupled").unwrap(), ids);
    }

    #[test]
    fn peel_rejects_a_cycle() {
        let (g, ids) = graph(&["A", "B", "C"], &[(0, 1), (1, 0)]);
        match peel_order(&g, &ids, "post-coupled") {
            Err(SeqdagError::CyclicNonCoupledPartition(msg)) => {
                assert!(msg.starts_with("post-coupled"));
                assert!(msg.contains("A") && msg.contains("B"));
            }
            other => panic!("expected CyclicNonCoupledPartition, got {other:?}"),
        }
    }

    #[test]
    fn partition_helpers() {
        let p = Partition {
            pre_coupled: vec![1],
            coupled: vec![2, 3],
            post_coupled: vec![4],
        };
        assert_eq!(p.len(), 4);
        assert_eq!(p.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3, 4]);
        let doubled = p.try_map(|v| Ok(v * 2)).unwrap();
        assert_eq!(doubled.coupled, vec![4, 6]);
        assert!(Partition::<u8>::default().is_empty());
    }
}

// src/graph/task_graph.rs

//! Task-projection graph: tasks as nodes, weighted edges `A -> B` counting
//! the distinct items produced by `A` and consumed by `B`.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use petgraph::Direction;
use petgraph::algo::is_cyclic_directed;
use petgraph::graphmap::DiGraphMap;

use crate::errors::{Result, SeqdagError};

/// Canonical task name type.
pub type TaskName = String;

/// Stable arena index of a task.
///
/// Ids are never reused, even after a task has been contracted away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(pub usize);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct TaskGraph {
    /// Name arena indexed by `TaskId`. Removed tasks keep their slot.
    names: Vec<TaskName>,
    index: HashMap<TaskName, TaskId>,
    graph: DiGraphMap<TaskId, usize>,
}

impl Default for TaskGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskGraph {
    pub fn new() -> Self {
        Self {
            names: Vec::new(),
            index: HashMap::new(),
            graph: DiGraphMap::new(),
        }
    }

    /// Add a task by name, returning the existing id if it is already known.
    pub fn add_task(&mut self, name: &str) -> TaskId {
        if let Some(id) = self.index.get(name) {
            return *id;
        }
        let id = self.push_node(name);
        self.index.insert(name.to_string(), id);
        id
    }

    /// Add a node that is not reachable by name (e.g. the contraction
    /// super-node), so it can never collide with a caller's task.
    pub fn add_synthetic_task(&mut self, label: &str) -> TaskId {
        self.push_node(label)
    }

    fn push_node(&mut self, name: &str) -> TaskId {
        let id = TaskId(self.names.len());
        self.names.push(name.to_string());
        self.graph.add_node(id);
        id
    }

    /// Add `weight` coupled items from `from` to `to`, summing with any
    /// existing edge. Self-coupling is dropped.
    pub fn add_edge(&mut self, from: TaskId, to: TaskId, weight: usize) -> Result<()> {
        self.ensure(from)?;
        self.ensure(to)?;
        if from == to || weight == 0 {
            return Ok(());
        }
        match self.graph.edge_weight_mut(from, to) {
            Some(w) => *w += weight,
            None => {
                self.graph.add_edge(from, to, weight);
            }
        }
        Ok(())
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.graph.contains_node(id)
    }

    pub fn task_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Live task ids in ascending order.
    pub fn task_ids(&self) -> Vec<TaskId> {
        let mut ids: Vec<TaskId> = self.graph.nodes().collect();
        ids.sort();
        ids
    }

    pub fn task_id(&self, name: &str) -> Result<TaskId> {
        self.index
            .get(name)
            .copied()
            .filter(|id| self.contains(*id))
            .ok_or_else(|| SeqdagError::UnknownTask(name.to_string()))
    }

    pub fn name_of(&self, id: TaskId) -> Result<&str> {
        self.ensure(id)?;
        Ok(self.names[id.0].as_str())
    }

    /// Number of items flowing from `from` to `to` (0 if none or unknown).
    pub fn edge_weight(&self, from: TaskId, to: TaskId) -> usize {
        self.graph.edge_weight(from, to).copied().unwrap_or(0)
    }

    /// Direct successors (consumers of this task's items).
    pub fn out_edges(&self, id: TaskId) -> Result<BTreeSet<TaskId>> {
        self.ensure(id)?;
        Ok(self
            .graph
            .neighbors_directed(id, Direction::Outgoing)
            .collect())
    }

    /// Direct predecessors (producers of this task's inputs).
    pub fn in_edges(&self, id: TaskId) -> Result<BTreeSet<TaskId>> {
        self.ensure(id)?;
        Ok(self
            .graph
            .neighbors_directed(id, Direction::Incoming)
            .collect())
    }

    /// Every task with a path to `id`. `id` itself is only included when it
    /// sits on a cycle.
    pub fn ancestors(&self, id: TaskId) -> Result<BTreeSet<TaskId>> {
        self.ensure(id)?;
        let mut seen = BTreeSet::new();
        let mut stack: Vec<TaskId> = self
            .graph
            .neighbors_directed(id, Direction::Incoming)
            .collect();

        while let Some(node) = stack.pop() {
            if !seen.insert(node) {
                continue;
            }
            stack.extend(self.graph.neighbors_directed(node, Direction::Incoming));
        }

        Ok(seen)
    }

    /// Remove every edge `(from, to, weight)` matching `pred`; returns how
    /// many edges were removed.
    pub fn remove_edges<F>(&mut self, mut pred: F) -> usize
    where
        F: FnMut(TaskId, TaskId, usize) -> bool,
    {
        let doomed: Vec<(TaskId, TaskId)> = self
            .graph
            .all_edges()
            .filter(|(from, to, w)| pred(*from, *to, **w))
            .map(|(from, to, _)| (from, to))
            .collect();

        for (from, to) in &doomed {
            self.graph.remove_edge(*from, *to);
        }
        doomed.len()
    }

    /// Merge `from` into `into`: every edge of `from` is re-attached to
    /// `into` (weights summed) and `from` is removed. Edges between the two
    /// would become self-loops, which `add_edge` drops.
    pub fn contract(&mut self, into: TaskId, from: TaskId) -> Result<()> {
        self.ensure(into)?;
        self.ensure(from)?;
        if into == from {
            return Ok(());
        }

        let outgoing: Vec<(TaskId, usize)> = self
            .graph
            .neighbors_directed(from, Direction::Outgoing)
            .map(|to| (to, self.edge_weight(from, to)))
            .collect();
        let incoming: Vec<(TaskId, usize)> = self
            .graph
            .neighbors_directed(from, Direction::Incoming)
            .map(|src| (src, self.edge_weight(src, from)))
            .collect();

        self.graph.remove_node(from);

        for (to, weight) in outgoing {
            self.add_edge(into, to, weight)?;
        }
        for (src, weight) in incoming {
            self.add_edge(src, into, weight)?;
        }

        Ok(())
    }

    pub fn is_acyclic(&self) -> bool {
        !is_cyclic_directed(&self.graph)
    }

    /// Kahn's algorithm, always emitting the smallest ready id first so the
    /// order is canonical. Returns `None` if the graph has a cycle.
    pub fn topological_order(&self) -> Option<Vec<TaskId>> {
        let mut indegree: HashMap<TaskId, usize> = self
            .graph
            .nodes()
            .map(|n| (n, self.graph.neighbors_directed(n, Direction::Incoming).count()))
            .collect();

        let mut ready: BTreeSet<TaskId> = indegree
            .iter()
            .filter(|(_, d)| **d == 0)
            .map(|(n, _)| *n)
            .collect();

        let mut order = Vec::with_capacity(indegree.len());
        while let Some(node) = ready.pop_first() {
            order.push(node);
            for next in self.graph.neighbors_directed(node, Direction::Outgoing) {
                if let Some(d) = indegree.get_mut(&next) {
                    *d -= 1;
                    if *d == 0 {
                        ready.insert(next);
                    }
                }
            }
        }

        if order.len() == self.graph.node_count() {
            Some(order)
        } else {
            None
        }
    }

    /// Sorted neighbours in the given direction; empty for unknown ids.
    pub(crate) fn neighbors_sorted(&self, id: TaskId, direction: Direction) -> Vec<TaskId> {
        if !self.contains(id) {
            return Vec::new();
        }
        let mut out: Vec<TaskId> = self.graph.neighbors_directed(id, direction).collect();
        out.sort();
        out
    }

    fn ensure(&self, id: TaskId) -> Result<()> {
        if self.contains(id) {
            Ok(())
        } else {
            Err(SeqdagError::UnknownTask(id.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_with(names: &[&str], edges: &[(&str, &str)]) -> TaskGraph {
        let mut g = TaskGraph::new();
        for n in names {
            g.add_task(n);
        }
        for (a, b) in edges {
            let (a, b) = (g.task_id(a).unwrap(), g.task_id(b).unwrap());
            g.add_edge(a, b, 1).unwrap();
        }
        g
    }

    fn ids(g: &TaskGraph, names: &[&str]) -> BTreeSet<TaskId> {
        names.iter().map(|n| g.task_id(n).unwrap()).collect()
    }

    #[test]
    fn in_and_out_edges() {
        let g = graph_with(&["A", "B", "C"], &[("A", "B"), ("A", "C"), ("B", "C")]);
        let a = g.task_id("A").unwrap();
        let c = g.task_id("C").unwrap();
        assert_eq!(g.out_edges(a).unwrap(), ids(&g, &["B", "C"]));
        assert_eq!(g.in_edges(c).unwrap(), ids(&g, &["A", "B"]));
        assert!(g.in_edges(a).unwrap().is_empty());
    }

    #[test]
    fn parallel_items_sum_into_one_weighted_edge() {
        let mut g = graph_with(&["A", "B"], &[("A", "B")]);
        let (a, b) = (g.task_id("A").unwrap(), g.task_id("B").unwrap());
        g.add_edge(a, b, 2).unwrap();
        g.add_edge(a, a, 5).unwrap();
        assert_eq!(g.edge_weight(a, b), 3);
        assert_eq!(g.edge_weight(a, a), 0);
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn ancestors_are_transitive() {
        let g = graph_with(
            &["A", "B", "C", "D"],
            &[("A", "B"), ("B", "C"), ("D", "C")],
        );
        let c = g.task_id("C").unwrap();
        let a = g.task_id("A").unwrap();
        assert_eq!(g.ancestors(c).unwrap(), ids(&g, &["A", "B", "D"]));
        assert!(g.ancestors(a).unwrap().is_empty());
    }

    #[test]
    fn unknown_task_is_an_error() {
        let g = graph_with(&["A"], &[]);
        match g.out_edges(TaskId(7)) {
            Err(SeqdagError::UnknownTask(id)) => assert_eq!(id, "#7"),
            other => panic!("expected UnknownTask, got {other:?}"),
        }
        assert!(matches!(g.task_id("nope"), Err(SeqdagError::UnknownTask(_))));
        assert!(g.ancestors(TaskId(3)).is_err());
    }

    #[test]
    fn contract_merges_edges_and_drops_self_loops() {
        let mut g = graph_with(
            &["A", "B", "C", "D"],
            &[("A", "B"), ("B", "C"), ("C", "B"), ("C", "D")],
        );
        let (a, b, c, d) = (
            g.task_id("A").unwrap(),
            g.task_id("B").unwrap(),
            g.task_id("C").unwrap(),
            g.task_id("D").unwrap(),
        );

        g.contract(b, c).unwrap();

        assert!(!g.contains(c));
        assert_eq!(g.task_count(), 3);
        assert_eq!(g.out_edges(b).unwrap(), BTreeSet::from([d]));
        assert_eq!(g.in_edges(b).unwrap(), BTreeSet::from([a]));
        assert_eq!(g.edge_weight(b, b), 0);
        assert_eq!(g.edge_count(), 2);
        assert!(g.is_acyclic());
        // The name of a contracted task is no longer resolvable.
        assert!(g.task_id("C").is_err());
    }

    #[test]
    fn remove_edges_by_predicate() {
        let mut g = graph_with(&["A", "B", "C"], &[("A", "B"), ("B", "C"), ("A", "C")]);
        let a = g.task_id("A").unwrap();
        let removed = g.remove_edges(|from, _, _| from == a);
        assert_eq!(removed, 2);
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn topological_order_is_canonical() {
        let g = graph_with(
            &["A", "B", "C", "D"],
            &[("C", "D"), ("A", "D"), ("B", "C")],
        );
        let order: Vec<&str> = g
            .topological_order()
            .unwrap()
            .into_iter()
            .map(|id| g.name_of(id).unwrap())
            .collect();
        assert_eq!(order, vec!["A", "B", "C", "D"]);

        let cyclic = graph_with(&["A", "B"], &[("A", "B"), ("B", "A")]);
        assert!(!cyclic.is_acyclic());
        assert!(cyclic.topological_order().is_none());
    }

    #[test]
    fn synthetic_tasks_do_not_shadow_names() {
        let mut g = graph_with(&["S"], &[]);
        let s = g.add_synthetic_task("S");
        assert_ne!(g.task_id("S").unwrap(), s);
        assert_eq!(g.name_of(s).unwrap(), "S");
        assert_eq!(g.task_count(), 2);
    }
}

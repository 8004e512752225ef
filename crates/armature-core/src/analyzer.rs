//! # Dependency Analyzer
//!
//! Topological ordering and cycle detection over the model's depends-on
//! edges.
//!
//! An edge `source -> target` reads "source depends on target": the target
//! must be ordered first. Edges naming ids absent from the node set (orphan
//! edges) place no constraint on the order.
//!
//! When cycles are present, [`DependencyAnalyzer::topological_order`]
//! refuses with [`ArmatureError::CyclicDependency`] carrying the same cycle
//! chains [`DependencyAnalyzer::find_cycles`] reports; it never returns a
//! partial order.

use crate::model::Model;
use crate::types::ArmatureError;
use std::collections::{BTreeMap, BTreeSet};

/// Visit state for the three-color depth-first traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    /// Not yet visited.
    White,
    /// On the current traversal path.
    Gray,
    /// Fully explored.
    Black,
}

/// Topological ordering and cycle reporting.
pub struct DependencyAnalyzer;

impl DependencyAnalyzer {
    /// Produce a topological order of the model's record ids.
    ///
    /// Kahn's algorithm; nodes whose dependencies are all satisfied are
    /// emitted in original insertion order, so the output is deterministic
    /// across runs with identical input. The order covers each distinct id
    /// once (direct append can introduce duplicates; the first occurrence
    /// wins). Complexity O(V+E).
    ///
    /// # Errors
    ///
    /// Returns [`ArmatureError::CyclicDependency`] with the full cycle
    /// report when the graph contains any cycle.
    pub fn topological_order(model: &Model) -> Result<Vec<String>, ArmatureError> {
        let (index, ids) = Self::node_index(model);
        let pairs = Self::dependency_pairs(model, &index);

        // outstanding[i]: dependencies of i not yet emitted.
        let mut outstanding = vec![0usize; ids.len()];
        // dependents[t]: nodes that depend on t.
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); ids.len()];
        for &(source, target) in &pairs {
            outstanding[source] += 1;
            dependents[target].push(source);
        }

        // Ready set keyed by insertion index; pop_first keeps the output in
        // insertion order among nodes whose dependencies are satisfied.
        let mut ready: BTreeSet<usize> = (0..ids.len()).filter(|&i| outstanding[i] == 0).collect();

        let mut order = Vec::with_capacity(ids.len());
        while let Some(next) = ready.pop_first() {
            order.push(ids[next].clone());
            for &dependent in &dependents[next] {
                outstanding[dependent] -= 1;
                if outstanding[dependent] == 0 {
                    ready.insert(dependent);
                }
            }
        }

        if order.len() < ids.len() {
            return Err(ArmatureError::CyclicDependency {
                cycles: Self::find_cycles(model),
            });
        }
        Ok(order)
    }

    /// Report every dependency cycle as the ordered chain of record ids
    /// forming it.
    ///
    /// Three-color depth-first traversal; a back edge to an in-progress
    /// node yields the chain from that node to the current one. Disjoint
    /// cycles are each reported. An acyclic graph yields an empty report.
    #[must_use]
    pub fn find_cycles(model: &Model) -> Vec<Vec<String>> {
        let (index, ids) = Self::node_index(model);
        let pairs = Self::dependency_pairs(model, &index);

        let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); ids.len()];
        for &(source, target) in &pairs {
            adjacency[source].push(target);
        }

        let mut colors = vec![Color::White; ids.len()];
        let mut cycles = Vec::new();

        for root in 0..ids.len() {
            if colors[root] != Color::White {
                continue;
            }
            // Explicit stack of (node, next adjacency position); `path`
            // mirrors the gray chain for cycle extraction.
            let mut stack = vec![(root, 0usize)];
            let mut path = vec![root];
            colors[root] = Color::Gray;

            while let Some(&mut (node, ref mut position)) = stack.last_mut() {
                if *position < adjacency[node].len() {
                    let neighbor = adjacency[node][*position];
                    *position += 1;
                    match colors[neighbor] {
                        Color::White => {
                            colors[neighbor] = Color::Gray;
                            stack.push((neighbor, 0));
                            path.push(neighbor);
                        }
                        Color::Gray => {
                            // Back edge: the chain from `neighbor` to the
                            // current node closes a cycle.
                            let start = path
                                .iter()
                                .position(|&n| n == neighbor)
                                .unwrap_or_default();
                            cycles.push(path[start..].iter().map(|&n| ids[n].clone()).collect());
                        }
                        Color::Black => {}
                    }
                } else {
                    colors[node] = Color::Black;
                    stack.pop();
                    path.pop();
                }
            }
        }
        cycles
    }

    /// First-occurrence id index and the distinct id list in insertion
    /// order.
    fn node_index(model: &Model) -> (BTreeMap<String, usize>, Vec<String>) {
        let mut index = BTreeMap::new();
        let mut ids = Vec::new();
        for node in model.nodes() {
            if !index.contains_key(node.id()) {
                index.insert(node.id().to_string(), ids.len());
                ids.push(node.id().to_string());
            }
        }
        (index, ids)
    }

    /// Distinct (source, target) dependency pairs whose endpoints are both
    /// present in the node set. Orphan edges are skipped; parallel edges
    /// between the same pair count once.
    fn dependency_pairs(model: &Model, index: &BTreeMap<String, usize>) -> BTreeSet<(usize, usize)> {
        model
            .edges()
            .iter()
            .filter_map(|edge| {
                let source = *index.get(edge.source.as_str())?;
                let target = *index.get(edge.target.as_str())?;
                Some((source, target))
            })
            .collect()
    }
}

// =============================================================================
// TESTS
// =============================================================================

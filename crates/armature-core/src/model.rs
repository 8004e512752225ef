//! # Model Container
//!
//! The owning container of the full record and connection lists.
//!
//! The model is the sole owner of both lists; nodes and edges do not track
//! membership themselves. Both lists preserve insertion order, which is the
//! deterministic basis for topological ordering and wire export.
//!
//! Two mutation surfaces exist:
//! - **direct append** (`add_node`/`add_edge`): no validation, no dedup,
//!   full caller control, duplicates and dangling references accepted;
//! - **the create factory** ([`MutationEngine`](crate::MutationEngine)):
//!   validated, deduplicated, relationship-aware, transactional.

use crate::edge::Edge;
use crate::node::Node;
use crate::types::Classification;
use serde::{Deserialize, Serialize};

// =============================================================================
// MODEL METRICS
// =============================================================================

/// Counts describing a model's current contents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelMetrics {
    /// Total records.
    pub node_count: usize,
    /// Total connections.
    pub edge_count: usize,
    /// Records classified Physical.
    pub physical: usize,
    /// Records classified StructuralAnalytical.
    pub structural_analytical: usize,
    /// Records classified Geometry.
    pub geometry: usize,
    /// Records classified Functional.
    pub functional: usize,
    /// Records classified Shared.
    pub shared: usize,
    /// Entries in the error log.
    pub error_count: usize,
}

// =============================================================================
// MODEL
// =============================================================================

/// The owning container of a structural model graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Model {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    error_log: Vec<String>,
}

impl Model {
    /// Create an empty model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All records in insertion order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All connections in insertion order.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Total record count.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Total connection count.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Append a record directly. No validation, no dedup, no synthesized
    /// edges; the caller accepts the risk of duplicate ids.
    pub fn add_node(&mut self, node: Node) {
        self.nodes.push(node);
    }

    /// Append a connection directly. Dangling endpoints are accepted;
    /// orphan edges are a legitimate state for partial graphs.
    pub fn add_edge(&mut self, edge: Edge) {
        self.edges.push(edge);
    }

    /// Look up a record by id. When direct append has produced duplicate
    /// ids, the first occurrence wins.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id() == id)
    }

    /// Whether a record with this id is present.
    #[must_use]
    pub fn contains_id(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n.id() == id)
    }

    /// Find the first record equal to `candidate` under the dedup rules.
    #[must_use]
    pub fn find_matching(&self, candidate: &Node) -> Option<&Node> {
        self.nodes.iter().find(|n| n.matches(candidate))
    }

    /// The append-only error log of failed create operations.
    #[must_use]
    pub fn error_log(&self) -> &[String] {
        &self.error_log
    }

    /// Append an entry to the error log.
    pub(crate) fn log_error(&mut self, entry: String) {
        self.error_log.push(entry);
    }

    /// Current counts, including per-classification record counts.
    #[must_use]
    pub fn metrics(&self) -> ModelMetrics {
        let mut metrics = ModelMetrics {
            node_count: self.nodes.len(),
            edge_count: self.edges.len(),
            error_count: self.error_log.len(),
            ..ModelMetrics::default()
        };
        for node in &self.nodes {
            match node.classification() {
                Classification::Physical => metrics.physical += 1,
                Classification::StructuralAnalytical => metrics.structural_analytical += 1,
                Classification::Geometry => metrics.geometry += 1,
                Classification::Functional => metrics.functional += 1,
                Classification::Shared => metrics.shared += 1,
            }
        }
        metrics
    }
}

// =============================================================================
// TESTS
// =============================================================================

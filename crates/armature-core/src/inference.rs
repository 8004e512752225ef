//! # Relationship Inference Engine
//!
//! Synthesizes typed edges from record reference fields.
//!
//! The rulebook is fixed and explicit: each record kind declares which of
//! its fields produce which edge kinds, encoded as a match over the node
//! enum. No runtime field probing takes place.
//!
//! Policy:
//! - a `None` reference field is silently skipped (no edge, no error);
//! - the engine never raises an error and never inspects edges, only nodes;
//! - existing edges and nodes are never removed or mutated.
//!
//! The raw rule pass ([`InferenceEngine::infer`]) is single-shot: running
//! it twice over the same nodes emits duplicate edges. The model entry
//! point ([`InferenceEngine::run`]) dedupes on (source, target, kind,
//! label), so re-running it over an unchanged model is a no-op.

use crate::edge::{Edge, EdgeKind};
use crate::model::Model;
use crate::node::Node;
use tracing::debug;

/// The convention-based edge synthesizer.
pub struct InferenceEngine;

impl InferenceEngine {
    /// Run the rulebook over `nodes` and return the synthesized edges.
    ///
    /// Single linear pass; O(n) over nodes plus O(m) per reference
    /// collection of size m.
    #[must_use]
    pub fn infer(nodes: &[Node]) -> Vec<Edge> {
        let mut edges = Vec::new();
        for node in nodes {
            Self::apply_rules(node, &mut edges);
        }
        edges
    }

    /// Run the rulebook over the model's nodes and append the synthesized
    /// edges to the model, skipping any relationship already present.
    /// Returns the number of edges added.
    pub fn run(model: &mut Model) -> usize {
        let inferred = Self::infer(model.nodes());
        let candidates = inferred.len();

        let mut added = 0;
        for edge in inferred {
            if !model.edges().iter().any(|e| e.same_relation(&edge)) {
                model.add_edge(edge);
                added += 1;
            }
        }
        debug!(candidates, added, "relationship inference pass complete");
        added
    }

    /// The rule table: (record kind, field) -> edge kind.
    fn apply_rules(node: &Node, out: &mut Vec<Edge>) {
        match node {
            // Leaf records expose no reference fields.
            Node::Material(_) | Node::Storey(_) | Node::Point(_) => {}

            Node::CrossSection(section) => {
                Self::link(out, node.id(), &section.material, EdgeKind::HasMaterial);
            }

            Node::CurveGeometry(geometry) => {
                Self::link_indexed(out, node.id(), &geometry.points, EdgeKind::HasPoint);
            }

            Node::Segment(segment) => {
                Self::link(out, node.id(), &segment.geometry, EdgeKind::HasGeometry);
                Self::link(out, node.id(), &segment.begin_connection, EdgeKind::BeginsAt);
                Self::link(out, node.id(), &segment.end_connection, EdgeKind::EndsAt);
            }

            Node::PointConnection(connection) => {
                Self::link(out, node.id(), &connection.point, EdgeKind::HasGeometry);
                Self::link(out, node.id(), &connection.storey, EdgeKind::OnStorey);
            }

            Node::CurveMember(member) => {
                Self::link(
                    out,
                    node.id(),
                    &member.cross_section,
                    EdgeKind::HasCrossSection,
                );
                Self::link(out, node.id(), &member.storey, EdgeKind::OnStorey);
                Self::link_indexed(out, node.id(), &member.segments, EdgeKind::HasSegment);
                Self::link(out, node.id(), &member.begin_connection, EdgeKind::BeginsAt);
                Self::link(out, node.id(), &member.end_connection, EdgeKind::EndsAt);
            }

            Node::SurfaceMember(member) => {
                Self::link(out, node.id(), &member.material, EdgeKind::HasMaterial);
                Self::link(out, node.id(), &member.storey, EdgeKind::OnStorey);
                Self::link_indexed(out, node.id(), &member.segments, EdgeKind::HasSegment);
            }
        }
    }

    /// Emit one edge for a populated reference field.
    fn link(out: &mut Vec<Edge>, source: &str, target: &Option<String>, kind: EdgeKind) {
        if let Some(target) = target {
            out.push(Edge::new(source, target, kind));
        }
    }

    /// Emit one edge per entry of a reference collection, labeled with the
    /// positional index.
    fn link_indexed(out: &mut Vec<Edge>, source: &str, targets: &[String], kind: EdgeKind) {
        for (index, target) in targets.iter().enumerate() {
            out.push(Edge::new(source, target, kind).labeled(index.to_string()));
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

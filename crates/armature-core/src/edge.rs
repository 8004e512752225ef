//! # Edge Model
//!
//! Directed, typed connections between records.
//!
//! An edge carries no enforced referential integrity: its source or target
//! may legitimately name a record that is not currently held by the model
//! (an orphan edge, used for partial or staged graphs).

use serde::{Deserialize, Serialize};

// =============================================================================
// EDGE KINDS
// =============================================================================

/// The closed set of relationship kinds the engine synthesizes.
///
/// The canonical token doubles as the edge's type tag in the wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    /// Section or surface member to its material.
    HasMaterial,
    /// Curve member to its cross-section.
    HasCrossSection,
    /// Member or connection to its storey.
    OnStorey,
    /// Member to one of its ordered segments.
    HasSegment,
    /// Segment or point connection to its geometry.
    HasGeometry,
    /// Curve geometry to one of its constituent points.
    HasPoint,
    /// Member or segment to its begin connection.
    BeginsAt,
    /// Member or segment to its end connection.
    EndsAt,
}

impl EdgeKind {
    /// All edge kinds in declaration order.
    pub const ALL: [EdgeKind; 8] = [
        EdgeKind::HasMaterial,
        EdgeKind::HasCrossSection,
        EdgeKind::OnStorey,
        EdgeKind::HasSegment,
        EdgeKind::HasGeometry,
        EdgeKind::HasPoint,
        EdgeKind::BeginsAt,
        EdgeKind::EndsAt,
    ];

    /// Canonical wire token; also the edge's type tag.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::HasMaterial => "HasMaterial",
            Self::HasCrossSection => "HasCrossSection",
            Self::OnStorey => "OnStorey",
            Self::HasSegment => "HasSegment",
            Self::HasGeometry => "HasGeometry",
            Self::HasPoint => "HasPoint",
            Self::BeginsAt => "BeginsAt",
            Self::EndsAt => "EndsAt",
        }
    }

    /// Parse a wire token, matching case-insensitively.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.token().eq_ignore_ascii_case(token))
    }
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

// =============================================================================
// EDGE
// =============================================================================

/// A directed, typed connection between two records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Opaque identifier. Generated when not supplied by the caller.
    pub id: String,
    /// Id of the owning record.
    pub source: String,
    /// Id of the referenced record.
    pub target: String,
    /// Relationship kind.
    pub kind: EdgeKind,
    /// Optional label (for collection-derived edges, the positional index).
    pub label: Option<String>,
    /// Optional free-text description.
    pub description: Option<String>,
}

impl Edge {
    /// Create an edge with a freshly generated identifier.
    #[must_use]
    pub fn new(source: impl Into<String>, target: impl Into<String>, kind: EdgeKind) -> Self {
        Self {
            id: Self::generate_id(),
            source: source.into(),
            target: target.into(),
            kind,
            label: None,
            description: None,
        }
    }

    /// Create an edge with a caller-supplied identifier.
    #[must_use]
    pub fn with_id(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
        kind: EdgeKind,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            kind,
            label: None,
            description: None,
        }
    }

    /// Attach a label.
    #[must_use]
    pub fn labeled(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Generate a collision-resistant opaque edge token.
    #[must_use]
    pub fn generate_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    /// Whether this edge expresses the same relationship as `other`,
    /// ignoring the identifiers. This is the re-run dedup key for the
    /// inference pass.
    #[must_use]
    pub fn same_relation(&self, other: &Edge) -> bool {
        self.kind == other.kind
            && self.source == other.source
            && self.target == other.target
            && self.label == other.label
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique() {
        let a = Edge::new("n1", "n2", EdgeKind::HasMaterial);
        let b = Edge::new("n1", "n2", EdgeKind::HasMaterial);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn same_relation_ignores_id() {
        let a = Edge::new("n1", "n2", EdgeKind::OnStorey);
        let b = Edge::new("n1", "n2", EdgeKind::OnStorey);
        assert!(a.same_relation(&b));
    }

    #[test]
    fn same_relation_distinguishes_labels() {
        let a = Edge::new("m", "s", EdgeKind::HasSegment).labeled("0");
        let b = Edge::new("m", "s", EdgeKind::HasSegment).labeled("1");
        assert!(!a.same_relation(&b));
    }

    #[test]
    fn edge_kind_tokens_roundtrip() {
        for kind in EdgeKind::ALL {
            assert_eq!(EdgeKind::parse(kind.token()), Some(kind));
        }
    }

    #[test]
    fn edge_kind_parse_is_case_insensitive() {
        assert_eq!(EdgeKind::parse("hasmaterial"), Some(EdgeKind::HasMaterial));
        assert_eq!(EdgeKind::parse("BEGINSAT"), Some(EdgeKind::BeginsAt));
        assert_eq!(EdgeKind::parse("Unknown"), None);
    }

    #[test]
    fn with_id_preserves_caller_token() {
        let edge = Edge::with_id("e-7", "a", "b", EdgeKind::EndsAt);
        assert_eq!(edge.id, "e-7");
    }
}

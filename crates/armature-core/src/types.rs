//! # Core Type Definitions
//!
//! Shared vocabulary for the Armature graph engine:
//! - Record classification (`Classification`)
//! - Cross-section shapes and their parameter sets (`SectionShape`,
//!   `ShapeParameters`)
//! - Curve geometry kinds (`CurveKind`)
//! - Error types (`ArmatureError`)
//!
//! ## Wire Tokens
//!
//! Every enum here declares an explicit canonical string token. The wire
//! format emits these tokens, never ordinal values, so the serialized form
//! is decoupled from internal enum ordering. Decoding matches tokens
//! case-insensitively.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// CLASSIFICATION
// =============================================================================

/// Classification of a record within the structural model.
///
/// This is a fixed, closed set; every record kind maps to exactly one
/// classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Classification {
    /// Physical building elements.
    Physical,
    /// Members and connections of the analytical model.
    StructuralAnalytical,
    /// Geometric primitives (points, curves, segments).
    Geometry,
    /// Organizational records (storeys).
    Functional,
    /// Records shared across models (materials, cross-sections).
    Shared,
}

impl Classification {
    /// Canonical wire token for this classification.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Physical => "Physical",
            Self::StructuralAnalytical => "StructuralAnalytical",
            Self::Geometry => "Geometry",
            Self::Functional => "Functional",
            Self::Shared => "Shared",
        }
    }

    /// Parse a wire token, matching case-insensitively.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        const ALL: [Classification; 5] = [
            Classification::Physical,
            Classification::StructuralAnalytical,
            Classification::Geometry,
            Classification::Functional,
            Classification::Shared,
        ];
        ALL.into_iter()
            .find(|c| c.token().eq_ignore_ascii_case(token))
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

// =============================================================================
// SECTION SHAPES
// =============================================================================

/// Shape family of a cross-section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SectionShape {
    /// Solid rectangular section.
    Rectangle,
    /// Solid circular section.
    Circle,
    /// Rolled or welded I-profile.
    IProfile,
    /// Rolled or welded T-profile.
    TProfile,
}

impl SectionShape {
    /// Canonical wire token for this shape.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Rectangle => "Rectangle",
            Self::Circle => "Circle",
            Self::IProfile => "IProfile",
            Self::TProfile => "TProfile",
        }
    }

    /// Parse a wire token, matching case-insensitively.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        const ALL: [SectionShape; 4] = [
            SectionShape::Rectangle,
            SectionShape::Circle,
            SectionShape::IProfile,
            SectionShape::TProfile,
        ];
        ALL.into_iter()
            .find(|s| s.token().eq_ignore_ascii_case(token))
    }
}

impl std::fmt::Display for SectionShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

/// A parameter set describing the dimensions of one section shape.
///
/// The set is declared for a specific shape; applying it to a section of a
/// different shape is a build failure in the mutation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeParameters {
    /// The shape these parameters are declared for.
    pub shape: SectionShape,
    /// Dimension values in the shape's declared parameter order.
    pub values: Vec<f64>,
}

impl ShapeParameters {
    /// Create a parameter set for the given shape.
    #[must_use]
    pub fn new(shape: SectionShape, values: Vec<f64>) -> Self {
        Self { shape, values }
    }
}

// =============================================================================
// CURVE KINDS
// =============================================================================

/// Kind of a curve geometry record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CurveKind {
    /// Straight line through its constituent points.
    Line,
    /// Circular arc through its constituent points.
    Arc,
}

impl CurveKind {
    /// Canonical wire token for this curve kind.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Line => "Line",
            Self::Arc => "Arc",
        }
    }

    /// Parse a wire token, matching case-insensitively.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        const ALL: [CurveKind; 2] = [CurveKind::Line, CurveKind::Arc];
        ALL.into_iter()
            .find(|k| k.token().eq_ignore_ascii_case(token))
    }
}

impl std::fmt::Display for CurveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors produced by the Armature engine.
///
/// - Input validation and decode errors surface directly to the caller.
/// - Transactional build failures surface wrapped in `CreateFailed` and are
///   additionally appended to the owning model's error log.
#[derive(Debug, Error)]
pub enum ArmatureError {
    /// A caller-supplied record violates the input contract (blank or
    /// oversized id/name). Raised before any transaction starts.
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// A record with this id already exists in the model.
    #[error("duplicate node id: {0}")]
    DuplicateId(String),

    /// A shape parameter set was declared for a different section shape.
    #[error("parameter set declared for {declared} cannot be applied to {expected} section '{id}'")]
    MismatchedParameters {
        /// Id of the cross-section being built.
        id: String,
        /// Shape of the section under construction.
        expected: SectionShape,
        /// Shape the parameter set was declared for.
        declared: SectionShape,
    },

    /// A create operation failed and was rolled back.
    #[error("{operation} failed: {source}")]
    CreateFailed {
        /// Name of the failed create operation.
        operation: String,
        /// The underlying build failure.
        #[source]
        source: Box<ArmatureError>,
    },

    /// The graph contains dependency cycles; no topological order exists.
    #[error("dependency graph contains {} cycle(s); topological order refused", cycles.len())]
    CyclicDependency {
        /// Each cycle as the ordered chain of node ids forming it.
        cycles: Vec<Vec<String>>,
    },

    /// A reference id could not be resolved during deserialization.
    #[error("unresolved reference: {0}")]
    UnresolvedReference(String),

    /// A serialization error occurred.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A deserialization error occurred.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(String),
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_tokens_roundtrip() {
        for c in [
            Classification::Physical,
            Classification::StructuralAnalytical,
            Classification::Geometry,
            Classification::Functional,
            Classification::Shared,
        ] {
            assert_eq!(Classification::parse(c.token()), Some(c));
        }
    }

    #[test]
    fn classification_parse_is_case_insensitive() {
        assert_eq!(
            Classification::parse("structuralanalytical"),
            Some(Classification::StructuralAnalytical)
        );
        assert_eq!(Classification::parse("SHARED"), Some(Classification::Shared));
    }

    #[test]
    fn classification_parse_rejects_unknown() {
        assert_eq!(Classification::parse("Imaginary"), None);
    }

    #[test]
    fn section_shape_tokens_roundtrip() {
        for s in [
            SectionShape::Rectangle,
            SectionShape::Circle,
            SectionShape::IProfile,
            SectionShape::TProfile,
        ] {
            assert_eq!(SectionShape::parse(s.token()), Some(s));
        }
    }

    #[test]
    fn curve_kind_parse_is_case_insensitive() {
        assert_eq!(CurveKind::parse("line"), Some(CurveKind::Line));
        assert_eq!(CurveKind::parse("ARC"), Some(CurveKind::Arc));
        assert_eq!(CurveKind::parse("spline"), None);
    }

    #[test]
    fn mismatched_parameters_message_names_both_shapes() {
        let err = ArmatureError::MismatchedParameters {
            id: "cs-1".to_string(),
            expected: SectionShape::IProfile,
            declared: SectionShape::Circle,
        };
        let message = err.to_string();
        assert!(message.contains("IProfile"));
        assert!(message.contains("Circle"));
        assert!(message.contains("cs-1"));
    }
}

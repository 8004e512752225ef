//! # Node Model
//!
//! The closed set of structural record kinds and the `Node` enum that
//! unifies them for graph operations.
//!
//! Every record embeds the same base attributes (`NodeCore`) and adds its
//! own typed fields. Reference fields hold the id of the referenced record;
//! they are not required to resolve against the owning model.
//!
//! ## Dedup Equality
//!
//! Two equality regimes back the mutation layer's deduplication:
//! - coordinate-bearing geometry (`Point`) compares by coordinate closeness
//!   within [`GEOMETRY_TOLERANCE`](crate::primitives::GEOMETRY_TOLERANCE);
//! - every other kind compares by case-insensitive equality of `source_id`,
//!   and only when both records carry a non-empty `source_id`.

use crate::primitives::GEOMETRY_TOLERANCE;
use crate::types::{Classification, CurveKind, SectionShape, ShapeParameters};
use serde::{Deserialize, Serialize};

// =============================================================================
// NODE CORE
// =============================================================================

/// Base attributes shared by every record kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeCore {
    /// Stable caller-supplied identifier, unique within a model when
    /// records are created through the mutation layer.
    pub id: String,
    /// Display name. When blank, the id stands in for it.
    pub name: String,
    /// Optional cross-system GUID. Opaque to the engine.
    pub external_ref: Option<String>,
    /// Optional identifier from an originating authoring tool; the
    /// value-equality dedup key for non-geometry records.
    pub source_id: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
}

impl NodeCore {
    /// Create a core with the given id and a blank name.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Set the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the cross-system GUID.
    #[must_use]
    pub fn with_external_ref(mut self, external_ref: impl Into<String>) -> Self {
        self.external_ref = Some(external_ref.into());
        self
    }

    /// Set the authoring-tool identifier.
    #[must_use]
    pub fn with_source_id(mut self, source_id: impl Into<String>) -> Self {
        self.source_id = Some(source_id.into());
        self
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The display name, defaulting to the id when blank.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }

    /// Non-empty `source_id`, if any.
    #[must_use]
    pub fn dedup_key(&self) -> Option<&str> {
        self.source_id.as_deref().filter(|s| !s.is_empty())
    }
}

// =============================================================================
// RECORD KINDS
// =============================================================================

/// A construction material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Base attributes.
    pub core: NodeCore,
    /// Optional material grade designation.
    pub grade: Option<String>,
}

impl Material {
    /// Create a material.
    #[must_use]
    pub fn new(core: NodeCore) -> Self {
        Self { core, grade: None }
    }

    /// Set the grade designation.
    #[must_use]
    pub fn with_grade(mut self, grade: impl Into<String>) -> Self {
        self.grade = Some(grade.into());
        self
    }
}

/// A member cross-section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossSection {
    /// Base attributes.
    pub core: NodeCore,
    /// Shape family of the section.
    pub shape: SectionShape,
    /// Optional dimension parameter set; must be declared for `shape`.
    pub parameters: Option<ShapeParameters>,
    /// Reference to the section's material.
    pub material: Option<String>,
}

impl CrossSection {
    /// Create a cross-section of the given shape.
    #[must_use]
    pub fn new(core: NodeCore, shape: SectionShape) -> Self {
        Self {
            core,
            shape,
            parameters: None,
            material: None,
        }
    }

    /// Attach a dimension parameter set.
    #[must_use]
    pub fn with_parameters(mut self, parameters: ShapeParameters) -> Self {
        self.parameters = Some(parameters);
        self
    }

    /// Reference a material by id.
    #[must_use]
    pub fn with_material(mut self, material: impl Into<String>) -> Self {
        self.material = Some(material.into());
        self
    }
}

/// A building storey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Storey {
    /// Base attributes.
    pub core: NodeCore,
    /// Elevation above the project datum.
    pub elevation: f64,
}

impl Storey {
    /// Create a storey at the given elevation.
    #[must_use]
    pub fn new(core: NodeCore, elevation: f64) -> Self {
        Self { core, elevation }
    }
}

/// A coordinate point.
///
/// Points compare equal when every coordinate component differs by strictly
/// less than the geometry tolerance; see the module docs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Point {
    /// Base attributes.
    pub core: NodeCore,
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
    /// Z coordinate.
    pub z: f64,
}

impl Point {
    /// Create a point at the given coordinates.
    #[must_use]
    pub fn new(core: NodeCore, x: f64, y: f64, z: f64) -> Self {
        Self { core, x, y, z }
    }

    /// Whether this point lies within the geometry tolerance of `other`
    /// on every coordinate component.
    #[must_use]
    pub fn coincides(&self, other: &Point) -> bool {
        (self.x - other.x).abs() < GEOMETRY_TOLERANCE
            && (self.y - other.y).abs() < GEOMETRY_TOLERANCE
            && (self.z - other.z).abs() < GEOMETRY_TOLERANCE
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.coincides(other)
    }
}

impl std::hash::Hash for Point {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        // Tolerance equality cannot be sharded by coordinate hashing: any
        // quantization grid splits some pairs that compare equal. Coordinate
        // components are therefore excluded from the hash; tolerance-equal
        // points hash identically. Dedup lookup is a linear scan, so hash
        // quality is not load-bearing here.
        state.write_u8(b'P');
    }
}

/// A line or arc through constituent points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveGeometry {
    /// Base attributes.
    pub core: NodeCore,
    /// Curve kind.
    pub curve: CurveKind,
    /// References to the constituent points, in order.
    pub points: Vec<String>,
}

impl CurveGeometry {
    /// Create a curve geometry of the given kind.
    #[must_use]
    pub fn new(core: NodeCore, curve: CurveKind) -> Self {
        Self {
            core,
            curve,
            points: Vec::new(),
        }
    }
}

/// One segment of a member's axis or boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Base attributes.
    pub core: NodeCore,
    /// Reference to the segment's curve geometry.
    pub geometry: Option<String>,
    /// Reference to the connection at the segment's begin end.
    pub begin_connection: Option<String>,
    /// Reference to the connection at the segment's end.
    pub end_connection: Option<String>,
}

impl Segment {
    /// Create a segment.
    #[must_use]
    pub fn new(core: NodeCore) -> Self {
        Self {
            core,
            geometry: None,
            begin_connection: None,
            end_connection: None,
        }
    }
}

/// A point support or member-end connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointConnection {
    /// Base attributes.
    pub core: NodeCore,
    /// Reference to the connection's point geometry.
    pub point: Option<String>,
    /// Reference to the connection's storey.
    pub storey: Option<String>,
}

impl PointConnection {
    /// Create a point connection.
    #[must_use]
    pub fn new(core: NodeCore) -> Self {
        Self {
            core,
            point: None,
            storey: None,
        }
    }
}

/// A one-dimensional member (beam, column, brace).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveMember {
    /// Base attributes.
    pub core: NodeCore,
    /// Reference to the member's cross-section.
    pub cross_section: Option<String>,
    /// Reference to the member's storey.
    pub storey: Option<String>,
    /// References to the member's segments, in axis order.
    pub segments: Vec<String>,
    /// Reference to the connection at the member's begin end.
    pub begin_connection: Option<String>,
    /// Reference to the connection at the member's end.
    pub end_connection: Option<String>,
}

impl CurveMember {
    /// Create a curve member.
    #[must_use]
    pub fn new(core: NodeCore) -> Self {
        Self {
            core,
            cross_section: None,
            storey: None,
            segments: Vec::new(),
            begin_connection: None,
            end_connection: None,
        }
    }
}

/// A two-dimensional member (slab, wall).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceMember {
    /// Base attributes.
    pub core: NodeCore,
    /// Reference to the member's material.
    pub material: Option<String>,
    /// Reference to the member's storey.
    pub storey: Option<String>,
    /// References to the member's boundary segments, in order.
    pub segments: Vec<String>,
}

impl SurfaceMember {
    /// Create a surface member.
    #[must_use]
    pub fn new(core: NodeCore) -> Self {
        Self {
            core,
            material: None,
            storey: None,
            segments: Vec::new(),
        }
    }
}

// =============================================================================
// NODE ENUM
// =============================================================================

/// A record in the structural model graph.
///
/// This enum is the closed set of record kinds the engine understands; the
/// wire format's type tags and the inference rulebook are both keyed on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    /// A construction material.
    Material(Material),
    /// A member cross-section.
    CrossSection(CrossSection),
    /// A building storey.
    Storey(Storey),
    /// A coordinate point.
    Point(Point),
    /// A line or arc geometry.
    CurveGeometry(CurveGeometry),
    /// A member segment.
    Segment(Segment),
    /// A point connection.
    PointConnection(PointConnection),
    /// A one-dimensional member.
    CurveMember(CurveMember),
    /// A two-dimensional member.
    SurfaceMember(SurfaceMember),
}

impl Node {
    /// Base attributes of the record.
    #[must_use]
    pub fn core(&self) -> &NodeCore {
        match self {
            Self::Material(n) => &n.core,
            Self::CrossSection(n) => &n.core,
            Self::Storey(n) => &n.core,
            Self::Point(n) => &n.core,
            Self::CurveGeometry(n) => &n.core,
            Self::Segment(n) => &n.core,
            Self::PointConnection(n) => &n.core,
            Self::CurveMember(n) => &n.core,
            Self::SurfaceMember(n) => &n.core,
        }
    }

    /// Mutable base attributes of the record.
    pub fn core_mut(&mut self) -> &mut NodeCore {
        match self {
            Self::Material(n) => &mut n.core,
            Self::CrossSection(n) => &mut n.core,
            Self::Storey(n) => &mut n.core,
            Self::Point(n) => &mut n.core,
            Self::CurveGeometry(n) => &mut n.core,
            Self::Segment(n) => &mut n.core,
            Self::PointConnection(n) => &mut n.core,
            Self::CurveMember(n) => &mut n.core,
            Self::SurfaceMember(n) => &mut n.core,
        }
    }

    /// Stable identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.core().id
    }

    /// Display name, defaulting to the id when blank.
    #[must_use]
    pub fn name(&self) -> &str {
        self.core().display_name()
    }

    /// Type tag: the string discriminator identifying the concrete kind.
    #[must_use]
    pub const fn type_tag(&self) -> &'static str {
        match self {
            Self::Material(_) => "Material",
            Self::CrossSection(_) => "CrossSection",
            Self::Storey(_) => "Storey",
            Self::Point(_) => "Point",
            Self::CurveGeometry(_) => "CurveGeometry",
            Self::Segment(_) => "Segment",
            Self::PointConnection(_) => "PointConnection",
            Self::CurveMember(_) => "CurveMember",
            Self::SurfaceMember(_) => "SurfaceMember",
        }
    }

    /// Classification of the record.
    #[must_use]
    pub const fn classification(&self) -> Classification {
        match self {
            Self::Material(_) | Self::CrossSection(_) => Classification::Shared,
            Self::Storey(_) => Classification::Functional,
            Self::Point(_) | Self::CurveGeometry(_) | Self::Segment(_) => Classification::Geometry,
            Self::PointConnection(_) | Self::CurveMember(_) | Self::SurfaceMember(_) => {
                Classification::StructuralAnalytical
            }
        }
    }

    /// The dedup equality predicate.
    ///
    /// Points compare by coordinate closeness; every other kind compares by
    /// case-insensitive `source_id` equality within the same kind, and only
    /// when both sides carry a non-empty `source_id`.
    #[must_use]
    pub fn matches(&self, other: &Node) -> bool {
        if let (Self::Point(a), Self::Point(b)) = (self, other) {
            return a.coincides(b);
        }
        if self.type_tag() != other.type_tag() {
            return false;
        }
        match (self.core().dedup_key(), other.core().dedup_key()) {
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            _ => false,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::hash::{DefaultHasher, Hash, Hasher};

    fn hash_of(point: &Point) -> u64 {
        let mut hasher = DefaultHasher::new();
        point.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn name_defaults_to_id_when_blank() {
        let node = Node::Storey(Storey::new(NodeCore::new("st-1"), 3.0));
        assert_eq!(node.name(), "st-1");

        let named = Node::Storey(Storey::new(NodeCore::new("st-1").with_name("Level 1"), 3.0));
        assert_eq!(named.name(), "Level 1");
    }

    #[test]
    fn classification_mapping() {
        let material = Node::Material(Material::new(NodeCore::new("m")));
        let point = Node::Point(Point::new(NodeCore::new("p"), 0.0, 0.0, 0.0));
        let storey = Node::Storey(Storey::new(NodeCore::new("s"), 0.0));
        let member = Node::CurveMember(CurveMember::new(NodeCore::new("b")));

        assert_eq!(material.classification(), Classification::Shared);
        assert_eq!(point.classification(), Classification::Geometry);
        assert_eq!(storey.classification(), Classification::Functional);
        assert_eq!(member.classification(), Classification::StructuralAnalytical);
    }

    #[test]
    fn points_within_tolerance_compare_equal_and_hash_identically() {
        let p = Point::new(NodeCore::new("p1"), 1.0, 2.0, 3.0);
        let q = Point::new(NodeCore::new("p2"), 1.0 + 5e-11, 2.0 - 5e-11, 3.0);

        assert_eq!(p, q);
        assert_eq!(hash_of(&p), hash_of(&q));
    }

    #[test]
    fn points_outside_tolerance_differ() {
        let p = Point::new(NodeCore::new("p1"), 1.0, 2.0, 3.0);
        let q = Point::new(NodeCore::new("p2"), 1.0 + 2e-10, 2.0, 3.0);
        assert_ne!(p, q);
    }

    #[test]
    fn point_matches_ignores_source_id() {
        let p = Node::Point(Point::new(
            NodeCore::new("p1").with_source_id("A"),
            0.0,
            0.0,
            0.0,
        ));
        let q = Node::Point(Point::new(
            NodeCore::new("p2").with_source_id("B"),
            0.0,
            0.0,
            0.0,
        ));
        assert!(p.matches(&q));
    }

    #[test]
    fn source_id_match_is_case_insensitive() {
        let a = Node::Material(Material::new(NodeCore::new("m1").with_source_id("Steel-S355")));
        let b = Node::Material(Material::new(NodeCore::new("m2").with_source_id("steel-s355")));
        assert!(a.matches(&b));
    }

    #[test]
    fn records_without_source_id_never_match() {
        let a = Node::Material(Material::new(NodeCore::new("m1")));
        let b = Node::Material(Material::new(NodeCore::new("m2")));
        assert!(!a.matches(&b));

        let blank = Node::Material(Material::new(NodeCore::new("m3").with_source_id("")));
        assert!(!a.matches(&blank));
    }

    #[test]
    fn different_kinds_never_match() {
        let material = Node::Material(Material::new(NodeCore::new("x").with_source_id("S")));
        let storey = Node::Storey(Storey::new(NodeCore::new("y").with_source_id("S"), 0.0));
        assert!(!material.matches(&storey));
    }
}

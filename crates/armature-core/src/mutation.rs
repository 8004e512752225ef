//! # Transactional Mutation Layer
//!
//! The create API: each `create_*` call is atomic with respect to the live
//! model. Either the resulting record (new or deduplicated) and every edge
//! it requires are fully committed, or nothing changes.
//!
//! Protocol:
//! 1. Validate caller-supplied record cores (non-blank, bounded id) before
//!    anything is staged; failures here surface immediately and are NOT
//!    logged to the model's error log.
//! 2. Build: dedup lookup first. An equal record already in the model is
//!    returned as-is with nothing staged. Otherwise every supplied
//!    sub-record is resolved to its canonical instance (or staged), and the
//!    new record plus its wiring edges are staged. The live model is only
//!    read during this phase.
//! 3. Commit: staged nodes, then staged edges, are appended to the model.
//! 4. Rollback: on any build error the staging area is discarded (the live
//!    lists were never touched), one `"<operation>: <detail>"` entry is
//!    appended to the error log, and the error is returned wrapped in
//!    [`ArmatureError::CreateFailed`].
//!
//! Direct append ([`Model::add_node`]/[`Model::add_edge`]) bypasses this
//! layer entirely.

use crate::edge::{Edge, EdgeKind};
use crate::model::Model;
use crate::node::{
    CrossSection, CurveGeometry, CurveMember, Material, Node, NodeCore, Point, PointConnection,
    Segment, Storey, SurfaceMember,
};
use crate::primitives::{MAX_ID_LENGTH, MAX_NAME_LENGTH};
use crate::types::ArmatureError;
use tracing::warn;

// =============================================================================
// MEMBER PARTS
// =============================================================================

/// Sub-records supplied alongside a curve member.
///
/// Each part is resolved to its canonical instance (deduplicated against the
/// live model and the staging area) before the member is wired to it.
#[derive(Debug, Default)]
pub struct CurveMemberParts {
    /// The member's cross-section.
    pub cross_section: Option<CrossSection>,
    /// The member's storey.
    pub storey: Option<Storey>,
    /// The member's segments, in axis order.
    pub segments: Vec<Segment>,
    /// The connection at the member's begin end.
    pub begin_connection: Option<PointConnection>,
    /// The connection at the member's end.
    pub end_connection: Option<PointConnection>,
}

/// Sub-records supplied alongside a surface member.
#[derive(Debug, Default)]
pub struct SurfaceMemberParts {
    /// The member's material.
    pub material: Option<Material>,
    /// The member's storey.
    pub storey: Option<Storey>,
    /// The member's boundary segments, in order.
    pub segments: Vec<Segment>,
}

// =============================================================================
// STAGING
// =============================================================================

/// The uncommitted changes of one create call.
///
/// Nothing in here touches the live model until `commit`; rollback is
/// simply dropping the staging area.
#[derive(Debug, Default)]
struct Staging {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl Staging {
    /// Resolve a record to its canonical id: an equal record in the model
    /// or the staging area wins; otherwise the record is staged as new.
    fn resolve(&mut self, model: &Model, node: Node) -> Result<String, ArmatureError> {
        if let Some(existing) = model.find_matching(&node) {
            return Ok(existing.id().to_string());
        }
        if let Some(staged) = self.nodes.iter().find(|n| n.matches(&node)) {
            return Ok(staged.id().to_string());
        }
        self.insert_new(model, node)
    }

    /// Stage a genuinely new record, enforcing id uniqueness across the
    /// model and the staging area.
    fn insert_new(&mut self, model: &Model, node: Node) -> Result<String, ArmatureError> {
        if model.contains_id(node.id()) || self.nodes.iter().any(|n| n.id() == node.id()) {
            return Err(ArmatureError::DuplicateId(node.id().to_string()));
        }
        let id = node.id().to_string();
        self.nodes.push(node);
        Ok(id)
    }

    /// Stage a wiring edge.
    fn link(&mut self, source: &str, target: &str, kind: EdgeKind) {
        self.edges.push(Edge::new(source, target, kind));
    }

    /// Stage a wiring edge labeled with a positional index.
    fn link_indexed(&mut self, source: &str, target: &str, kind: EdgeKind, index: usize) {
        self.edges
            .push(Edge::new(source, target, kind).labeled(index.to_string()));
    }

    /// Append staged nodes, then staged edges, to the live model.
    fn commit(self, model: &mut Model) {
        for node in self.nodes {
            model.add_node(node);
        }
        for edge in self.edges {
            model.add_edge(edge);
        }
    }
}

// =============================================================================
// MUTATION ENGINE
// =============================================================================

/// The transactional create API.
pub struct MutationEngine;

impl MutationEngine {
    // -------------------------------------------------------------------------
    // Leaf records
    // -------------------------------------------------------------------------

    /// Create (or dedup to) a material.
    pub fn create_material(model: &mut Model, material: Material) -> Result<String, ArmatureError> {
        Self::validate_core(&material.core)?;
        Self::run(model, "create_material", |model, staging| {
            staging.resolve(model, Node::Material(material))
        })
    }

    /// Create (or dedup to) a storey.
    pub fn create_storey(model: &mut Model, storey: Storey) -> Result<String, ArmatureError> {
        Self::validate_core(&storey.core)?;
        Self::run(model, "create_storey", |model, staging| {
            staging.resolve(model, Node::Storey(storey))
        })
    }

    /// Create (or dedup to) a coordinate point.
    ///
    /// Two points within the geometry tolerance of each other are the same
    /// record; the canonical instance's id is returned.
    pub fn create_point(model: &mut Model, point: Point) -> Result<String, ArmatureError> {
        Self::validate_core(&point.core)?;
        Self::run(model, "create_point", |model, staging| {
            staging.resolve(model, Node::Point(point))
        })
    }

    // -------------------------------------------------------------------------
    // Records with sub-references
    // -------------------------------------------------------------------------

    /// Create (or dedup to) a cross-section, optionally wiring it to a
    /// material.
    ///
    /// A parameter set declared for a different shape than the section's is
    /// a build failure: the call rolls back and logs.
    pub fn create_cross_section(
        model: &mut Model,
        section: CrossSection,
        material: Option<Material>,
    ) -> Result<String, ArmatureError> {
        Self::validate_core(&section.core)?;
        if let Some(material) = &material {
            Self::validate_core(&material.core)?;
        }
        Self::run(model, "create_cross_section", |model, staging| {
            Self::build_cross_section(model, staging, section, material)
        })
    }

    /// Create (or dedup to) a curve geometry, resolving and wiring its
    /// constituent points in order.
    pub fn create_curve_geometry(
        model: &mut Model,
        geometry: CurveGeometry,
        points: Vec<Point>,
    ) -> Result<String, ArmatureError> {
        Self::validate_core(&geometry.core)?;
        for point in &points {
            Self::validate_core(&point.core)?;
        }
        Self::run(model, "create_curve_geometry", |model, staging| {
            Self::build_curve_geometry(model, staging, geometry, points)
        })
    }

    /// Create (or dedup to) a point connection, optionally wiring its point
    /// geometry and storey.
    pub fn create_point_connection(
        model: &mut Model,
        connection: PointConnection,
        point: Option<Point>,
        storey: Option<Storey>,
    ) -> Result<String, ArmatureError> {
        Self::validate_core(&connection.core)?;
        if let Some(point) = &point {
            Self::validate_core(&point.core)?;
        }
        if let Some(storey) = &storey {
            Self::validate_core(&storey.core)?;
        }
        Self::run(model, "create_point_connection", |model, staging| {
            Self::build_point_connection(model, staging, connection, point, storey)
        })
    }

    /// Create (or dedup to) a segment, optionally wiring its geometry and
    /// begin/end connections.
    pub fn create_segment(
        model: &mut Model,
        segment: Segment,
        geometry: Option<CurveGeometry>,
        begin: Option<PointConnection>,
        end: Option<PointConnection>,
    ) -> Result<String, ArmatureError> {
        Self::validate_core(&segment.core)?;
        for core in [
            geometry.as_ref().map(|g| &g.core),
            begin.as_ref().map(|c| &c.core),
            end.as_ref().map(|c| &c.core),
        ]
        .into_iter()
        .flatten()
        {
            Self::validate_core(core)?;
        }
        Self::run(model, "create_segment", |model, staging| {
            Self::build_segment(model, staging, segment, geometry, begin, end)
        })
    }

    /// Create (or dedup to) a curve member, resolving and wiring every
    /// supplied part.
    pub fn create_curve_member(
        model: &mut Model,
        member: CurveMember,
        parts: CurveMemberParts,
    ) -> Result<String, ArmatureError> {
        Self::validate_core(&member.core)?;
        Self::validate_curve_member_parts(&parts)?;
        Self::run(model, "create_curve_member", |model, staging| {
            Self::build_curve_member(model, staging, member, parts)
        })
    }

    /// Create (or dedup to) a surface member, resolving and wiring every
    /// supplied part.
    pub fn create_surface_member(
        model: &mut Model,
        member: SurfaceMember,
        parts: SurfaceMemberParts,
    ) -> Result<String, ArmatureError> {
        Self::validate_core(&member.core)?;
        if let Some(material) = &parts.material {
            Self::validate_core(&material.core)?;
        }
        if let Some(storey) = &parts.storey {
            Self::validate_core(&storey.core)?;
        }
        for segment in &parts.segments {
            Self::validate_core(&segment.core)?;
        }
        Self::run(model, "create_surface_member", |model, staging| {
            Self::build_surface_member(model, staging, member, parts)
        })
    }

    // -------------------------------------------------------------------------
    // Transaction driver
    // -------------------------------------------------------------------------

    /// Run one build under the transaction protocol: commit the staging
    /// area on success, or roll back, log, and wrap on failure.
    fn run(
        model: &mut Model,
        operation: &'static str,
        build: impl FnOnce(&Model, &mut Staging) -> Result<String, ArmatureError>,
    ) -> Result<String, ArmatureError> {
        let mut staging = Staging::default();
        match build(model, &mut staging) {
            Ok(id) => {
                staging.commit(model);
                Ok(id)
            }
            Err(error) => {
                model.log_error(format!("{operation}: {error}"));
                warn!(operation, error = %error, "create rolled back");
                Err(ArmatureError::CreateFailed {
                    operation: operation.to_string(),
                    source: Box::new(error),
                })
            }
        }
    }

    // -------------------------------------------------------------------------
    // Builders (pure with respect to the live model)
    // -------------------------------------------------------------------------

    fn build_cross_section(
        model: &Model,
        staging: &mut Staging,
        mut section: CrossSection,
        material: Option<Material>,
    ) -> Result<String, ArmatureError> {
        if let Some(existing) = model.find_matching(&Node::CrossSection(section.clone())) {
            return Ok(existing.id().to_string());
        }
        Self::check_parameters(&section)?;
        if let Some(material) = material {
            let material_id = staging.resolve(model, Node::Material(material))?;
            staging.link(&section.core.id, &material_id, EdgeKind::HasMaterial);
            section.material = Some(material_id);
        }
        staging.insert_new(model, Node::CrossSection(section))
    }

    fn build_curve_geometry(
        model: &Model,
        staging: &mut Staging,
        mut geometry: CurveGeometry,
        points: Vec<Point>,
    ) -> Result<String, ArmatureError> {
        if let Some(existing) = model.find_matching(&Node::CurveGeometry(geometry.clone())) {
            return Ok(existing.id().to_string());
        }
        for point in points {
            let point_id = staging.resolve(model, Node::Point(point))?;
            let index = geometry.points.len();
            staging.link_indexed(&geometry.core.id, &point_id, EdgeKind::HasPoint, index);
            geometry.points.push(point_id);
        }
        staging.insert_new(model, Node::CurveGeometry(geometry))
    }

    fn build_point_connection(
        model: &Model,
        staging: &mut Staging,
        mut connection: PointConnection,
        point: Option<Point>,
        storey: Option<Storey>,
    ) -> Result<String, ArmatureError> {
        if let Some(existing) = model.find_matching(&Node::PointConnection(connection.clone())) {
            return Ok(existing.id().to_string());
        }
        if let Some(point) = point {
            let point_id = staging.resolve(model, Node::Point(point))?;
            staging.link(&connection.core.id, &point_id, EdgeKind::HasGeometry);
            connection.point = Some(point_id);
        }
        if let Some(storey) = storey {
            let storey_id = staging.resolve(model, Node::Storey(storey))?;
            staging.link(&connection.core.id, &storey_id, EdgeKind::OnStorey);
            connection.storey = Some(storey_id);
        }
        staging.insert_new(model, Node::PointConnection(connection))
    }

    fn build_segment(
        model: &Model,
        staging: &mut Staging,
        mut segment: Segment,
        geometry: Option<CurveGeometry>,
        begin: Option<PointConnection>,
        end: Option<PointConnection>,
    ) -> Result<String, ArmatureError> {
        if let Some(existing) = model.find_matching(&Node::Segment(segment.clone())) {
            return Ok(existing.id().to_string());
        }
        if let Some(geometry) = geometry {
            let geometry_id = staging.resolve(model, Node::CurveGeometry(geometry))?;
            staging.link(&segment.core.id, &geometry_id, EdgeKind::HasGeometry);
            segment.geometry = Some(geometry_id);
        }
        if let Some(begin) = begin {
            let begin_id = staging.resolve(model, Node::PointConnection(begin))?;
            staging.link(&segment.core.id, &begin_id, EdgeKind::BeginsAt);
            segment.begin_connection = Some(begin_id);
        }
        if let Some(end) = end {
            let end_id = staging.resolve(model, Node::PointConnection(end))?;
            staging.link(&segment.core.id, &end_id, EdgeKind::EndsAt);
            segment.end_connection = Some(end_id);
        }
        staging.insert_new(model, Node::Segment(segment))
    }

    fn build_curve_member(
        model: &Model,
        staging: &mut Staging,
        mut member: CurveMember,
        parts: CurveMemberParts,
    ) -> Result<String, ArmatureError> {
        if let Some(existing) = model.find_matching(&Node::CurveMember(member.clone())) {
            return Ok(existing.id().to_string());
        }
        if let Some(section) = parts.cross_section {
            let section_id = Self::resolve_cross_section(model, staging, section)?;
            staging.link(&member.core.id, &section_id, EdgeKind::HasCrossSection);
            member.cross_section = Some(section_id);
        }
        if let Some(storey) = parts.storey {
            let storey_id = staging.resolve(model, Node::Storey(storey))?;
            staging.link(&member.core.id, &storey_id, EdgeKind::OnStorey);
            member.storey = Some(storey_id);
        }
        for segment in parts.segments {
            let segment_id = staging.resolve(model, Node::Segment(segment))?;
            let index = member.segments.len();
            staging.link_indexed(&member.core.id, &segment_id, EdgeKind::HasSegment, index);
            member.segments.push(segment_id);
        }
        if let Some(begin) = parts.begin_connection {
            let begin_id = staging.resolve(model, Node::PointConnection(begin))?;
            staging.link(&member.core.id, &begin_id, EdgeKind::BeginsAt);
            member.begin_connection = Some(begin_id);
        }
        if let Some(end) = parts.end_connection {
            let end_id = staging.resolve(model, Node::PointConnection(end))?;
            staging.link(&member.core.id, &end_id, EdgeKind::EndsAt);
            member.end_connection = Some(end_id);
        }
        staging.insert_new(model, Node::CurveMember(member))
    }

    fn build_surface_member(
        model: &Model,
        staging: &mut Staging,
        mut member: SurfaceMember,
        parts: SurfaceMemberParts,
    ) -> Result<String, ArmatureError> {
        if let Some(existing) = model.find_matching(&Node::SurfaceMember(member.clone())) {
            return Ok(existing.id().to_string());
        }
        if let Some(material) = parts.material {
            let material_id = staging.resolve(model, Node::Material(material))?;
            staging.link(&member.core.id, &material_id, EdgeKind::HasMaterial);
            member.material = Some(material_id);
        }
        if let Some(storey) = parts.storey {
            let storey_id = staging.resolve(model, Node::Storey(storey))?;
            staging.link(&member.core.id, &storey_id, EdgeKind::OnStorey);
            member.storey = Some(storey_id);
        }
        for segment in parts.segments {
            let segment_id = staging.resolve(model, Node::Segment(segment))?;
            let index = member.segments.len();
            staging.link_indexed(&member.core.id, &segment_id, EdgeKind::HasSegment, index);
            member.segments.push(segment_id);
        }
        staging.insert_new(model, Node::SurfaceMember(member))
    }

    /// Resolve a cross-section part, applying the shape parameter check
    /// only when the section is genuinely new.
    fn resolve_cross_section(
        model: &Model,
        staging: &mut Staging,
        section: CrossSection,
    ) -> Result<String, ArmatureError> {
        let candidate = Node::CrossSection(section.clone());
        if let Some(existing) = model.find_matching(&candidate) {
            return Ok(existing.id().to_string());
        }
        if let Some(staged) = staging.nodes.iter().find(|n| n.matches(&candidate)) {
            return Ok(staged.id().to_string());
        }
        Self::check_parameters(&section)?;
        staging.insert_new(model, Node::CrossSection(section))
    }

    // -------------------------------------------------------------------------
    // Validation
    // -------------------------------------------------------------------------

    /// Caller-contract validation, applied before any staging. Failures
    /// here are rejected immediately and never reach the error log.
    fn validate_core(core: &NodeCore) -> Result<(), ArmatureError> {
        if core.id.trim().is_empty() {
            return Err(ArmatureError::InvalidRecord(
                "record id must not be blank".to_string(),
            ));
        }
        if core.id.len() > MAX_ID_LENGTH {
            return Err(ArmatureError::InvalidRecord(format!(
                "record id exceeds {MAX_ID_LENGTH} bytes"
            )));
        }
        if core.name.len() > MAX_NAME_LENGTH {
            return Err(ArmatureError::InvalidRecord(format!(
                "record name exceeds {MAX_NAME_LENGTH} bytes"
            )));
        }
        Ok(())
    }

    fn validate_curve_member_parts(parts: &CurveMemberParts) -> Result<(), ArmatureError> {
        if let Some(section) = &parts.cross_section {
            Self::validate_core(&section.core)?;
        }
        if let Some(storey) = &parts.storey {
            Self::validate_core(&storey.core)?;
        }
        for segment in &parts.segments {
            Self::validate_core(&segment.core)?;
        }
        if let Some(begin) = &parts.begin_connection {
            Self::validate_core(&begin.core)?;
        }
        if let Some(end) = &parts.end_connection {
            Self::validate_core(&end.core)?;
        }
        Ok(())
    }

    /// A parameter set must be declared for the section's own shape.
    fn check_parameters(section: &CrossSection) -> Result<(), ArmatureError> {
        if let Some(parameters) = &section.parameters {
            if parameters.shape != section.shape {
                return Err(ArmatureError::MismatchedParameters {
                    id: section.core.id.clone(),
                    expected: section.shape,
                    declared: parameters.shape,
                });
            }
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

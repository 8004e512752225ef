//! # Wire Format
//!
//! The canonical JSON codec for a model graph.
//!
//! A document is one object with two arrays:
//!
//! ```json
//! {"nodes": [{"Material": {"id": "steel", ...}}, ...],
//!  "edges": [{"HasMaterial": {"id": "...", "source": "cs", "target": "steel"}}, ...]}
//! ```
//!
//! Each array element is a single-key object: the key is the record's or
//! connection's type tag, the value its flattened attribute map.
//!
//! Flattening rules:
//! - absent attributes are omitted;
//! - primitive and string values pass through;
//! - enum values emit their canonical token, never an ordinal;
//! - a record reference flattens to the referenced id, a reference
//!   collection to an ordered id array;
//! - attribute order follows each kind's declared field order, so repeated
//!   exports of an unchanged graph are byte-stable (`serde_json` is built
//!   with `preserve_order`).
//!
//! Parsing is two-pass: pass 1 instantiates every record from its type tag,
//! pass 2 resolves every id-valued attribute and every edge endpoint
//! against the pass-1 index. A dangling id fails the parse; partial graphs
//! are never returned. Type tags and enum tokens match case-insensitively.

use crate::edge::{Edge, EdgeKind};
use crate::inference::InferenceEngine;
use crate::model::Model;
use crate::node::{
    CrossSection, CurveGeometry, CurveMember, Material, Node, NodeCore, Point, PointConnection,
    Segment, Storey, SurfaceMember,
};
use crate::primitives::{MAX_IMPORT_EDGE_COUNT, MAX_IMPORT_NODE_COUNT};
use crate::types::{ArmatureError, CurveKind, SectionShape, ShapeParameters};
use serde_json::{Map, Number, Value};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

// =============================================================================
// EXPORT
// =============================================================================

/// Serialize a model to the canonical JSON document.
pub fn to_json(model: &Model) -> Result<String, ArmatureError> {
    let nodes = model
        .nodes()
        .iter()
        .map(encode_node)
        .collect::<Result<Vec<_>, _>>()?;
    let edges = model
        .edges()
        .iter()
        .map(encode_edge)
        .collect::<Result<Vec<_>, _>>()?;

    let mut root = Map::new();
    root.insert("nodes".to_string(), Value::Array(nodes));
    root.insert("edges".to_string(), Value::Array(edges));

    debug!(
        nodes = model.node_count(),
        edges = model.edge_count(),
        "exporting wire document"
    );
    serde_json::to_string(&Value::Object(root))
        .map_err(|e| ArmatureError::Serialization(e.to_string()))
}

/// Serialize a model and write the document to `path`.
pub fn write_file(model: &Model, path: impl AsRef<Path>) -> Result<(), ArmatureError> {
    let document = to_json(model)?;
    std::fs::write(path, document).map_err(|e| ArmatureError::Io(e.to_string()))
}

fn encode_node(node: &Node) -> Result<Value, ArmatureError> {
    let mut attrs = Map::new();
    encode_core(&mut attrs, node);

    match node {
        Node::Material(material) => {
            put_opt(&mut attrs, "grade", &material.grade);
        }
        Node::CrossSection(section) => {
            put_token(&mut attrs, "shape", section.shape.token());
            if let Some(parameters) = &section.parameters {
                attrs.insert(
                    "parameters".to_string(),
                    encode_parameters(parameters)?,
                );
            }
            put_opt(&mut attrs, "material", &section.material);
        }
        Node::Storey(storey) => {
            attrs.insert("elevation".to_string(), number(storey.elevation)?);
        }
        Node::Point(point) => {
            attrs.insert("x".to_string(), number(point.x)?);
            attrs.insert("y".to_string(), number(point.y)?);
            attrs.insert("z".to_string(), number(point.z)?);
        }
        Node::CurveGeometry(geometry) => {
            put_token(&mut attrs, "curve", geometry.curve.token());
            put_id_list(&mut attrs, "points", &geometry.points);
        }
        Node::Segment(segment) => {
            put_opt(&mut attrs, "geometry", &segment.geometry);
            put_opt(&mut attrs, "beginConnection", &segment.begin_connection);
            put_opt(&mut attrs, "endConnection", &segment.end_connection);
        }
        Node::PointConnection(connection) => {
            put_opt(&mut attrs, "point", &connection.point);
            put_opt(&mut attrs, "storey", &connection.storey);
        }
        Node::CurveMember(member) => {
            put_opt(&mut attrs, "crossSection", &member.cross_section);
            put_opt(&mut attrs, "storey", &member.storey);
            put_id_list(&mut attrs, "segments", &member.segments);
            put_opt(&mut attrs, "beginConnection", &member.begin_connection);
            put_opt(&mut attrs, "endConnection", &member.end_connection);
        }
        Node::SurfaceMember(member) => {
            put_opt(&mut attrs, "material", &member.material);
            put_opt(&mut attrs, "storey", &member.storey);
            put_id_list(&mut attrs, "segments", &member.segments);
        }
    }

    Ok(single_key(node.type_tag(), attrs))
}

fn encode_core(attrs: &mut Map<String, Value>, node: &Node) {
    let core = node.core();
    attrs.insert("id".to_string(), Value::String(core.id.clone()));
    // The display name carries the blank-name default.
    attrs.insert("name".to_string(), Value::String(node.name().to_string()));
    put_opt(attrs, "externalRef", &core.external_ref);
    put_opt(attrs, "sourceId", &core.source_id);
    put_opt(attrs, "description", &core.description);
}

fn encode_parameters(parameters: &ShapeParameters) -> Result<Value, ArmatureError> {
    let mut map = Map::new();
    put_token(&mut map, "shape", parameters.shape.token());
    let values = parameters
        .values
        .iter()
        .map(|v| number(*v))
        .collect::<Result<Vec<_>, _>>()?;
    map.insert("values".to_string(), Value::Array(values));
    Ok(Value::Object(map))
}

fn encode_edge(edge: &Edge) -> Result<Value, ArmatureError> {
    let mut attrs = Map::new();
    attrs.insert("id".to_string(), Value::String(edge.id.clone()));
    attrs.insert("source".to_string(), Value::String(edge.source.clone()));
    attrs.insert("target".to_string(), Value::String(edge.target.clone()));
    put_opt(&mut attrs, "label", &edge.label);
    put_opt(&mut attrs, "description", &edge.description);
    Ok(single_key(edge.kind.token(), attrs))
}

fn single_key(tag: &str, attrs: Map<String, Value>) -> Value {
    let mut wrapper = Map::new();
    wrapper.insert(tag.to_string(), Value::Object(attrs));
    Value::Object(wrapper)
}

fn put_opt(attrs: &mut Map<String, Value>, key: &str, value: &Option<String>) {
    if let Some(value) = value {
        attrs.insert(key.to_string(), Value::String(value.clone()));
    }
}

fn put_token(attrs: &mut Map<String, Value>, key: &str, token: &str) {
    attrs.insert(key.to_string(), Value::String(token.to_string()));
}

fn put_id_list(attrs: &mut Map<String, Value>, key: &str, ids: &[String]) {
    let list = ids.iter().map(|id| Value::String(id.clone())).collect();
    attrs.insert(key.to_string(), Value::Array(list));
}

fn number(value: f64) -> Result<Value, ArmatureError> {
    Number::from_f64(value)
        .map(Value::Number)
        .ok_or_else(|| ArmatureError::Serialization(format!("non-finite number {value}")))
}

// =============================================================================
// IMPORT
// =============================================================================

/// Parse a canonical JSON document into a model.
///
/// # Errors
///
/// Fails with [`ArmatureError::Deserialization`] for malformed documents or
/// unknown tags/tokens, and [`ArmatureError::UnresolvedReference`] for any
/// id-valued attribute or edge endpoint that does not name a record in the
/// document.
pub fn from_json(text: &str) -> Result<Model, ArmatureError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| ArmatureError::Deserialization(e.to_string()))?;
    let root = value
        .as_object()
        .ok_or_else(|| ArmatureError::Deserialization("document root must be an object".into()))?;
    let node_entries = root
        .get("nodes")
        .and_then(Value::as_array)
        .ok_or_else(|| ArmatureError::Deserialization("missing 'nodes' array".into()))?;
    let edge_entries = root
        .get("edges")
        .and_then(Value::as_array)
        .ok_or_else(|| ArmatureError::Deserialization("missing 'edges' array".into()))?;

    // Size caps are enforced before any record is decoded.
    if node_entries.len() > MAX_IMPORT_NODE_COUNT {
        return Err(ArmatureError::Deserialization(format!(
            "node count {} exceeds maximum allowed {MAX_IMPORT_NODE_COUNT}",
            node_entries.len()
        )));
    }
    if edge_entries.len() > MAX_IMPORT_EDGE_COUNT {
        return Err(ArmatureError::Deserialization(format!(
            "edge count {} exceeds maximum allowed {MAX_IMPORT_EDGE_COUNT}",
            edge_entries.len()
        )));
    }

    // Pass 1: instantiate every record from its type tag.
    let mut model = Model::new();
    for entry in node_entries {
        let (tag, attrs) = single_entry(entry)?;
        model.add_node(decode_node(tag, attrs)?);
    }

    // Pass 2: every id-valued attribute must resolve. The inference
    // rulebook is the authoritative list of reference fields, so its
    // synthesized targets are exactly the ids to check.
    let ids: BTreeSet<&str> = model.nodes().iter().map(Node::id).collect();
    for reference in InferenceEngine::infer(model.nodes()) {
        if !ids.contains(reference.target.as_str()) {
            return Err(ArmatureError::UnresolvedReference(reference.target));
        }
    }

    // Pass 2, continued: edge endpoints must resolve.
    let mut edges = Vec::with_capacity(edge_entries.len());
    for entry in edge_entries {
        let (tag, attrs) = single_entry(entry)?;
        let edge = decode_edge(tag, attrs)?;
        for endpoint in [&edge.source, &edge.target] {
            if !ids.contains(endpoint.as_str()) {
                return Err(ArmatureError::UnresolvedReference(endpoint.clone()));
            }
        }
        edges.push(edge);
    }
    for edge in edges {
        model.add_edge(edge);
    }

    debug!(
        nodes = model.node_count(),
        edges = model.edge_count(),
        "parsed wire document"
    );
    Ok(model)
}

/// Read and parse a canonical JSON document from `path`.
pub fn read_file(path: impl AsRef<Path>) -> Result<Model, ArmatureError> {
    let text = std::fs::read_to_string(path).map_err(|e| ArmatureError::Io(e.to_string()))?;
    from_json(&text)
}

fn single_entry(value: &Value) -> Result<(&str, &Map<String, Value>), ArmatureError> {
    let wrapper = value.as_object().ok_or_else(|| {
        ArmatureError::Deserialization("array element must be a single-key object".into())
    })?;
    if wrapper.len() != 1 {
        return Err(ArmatureError::Deserialization(format!(
            "array element must have exactly one type tag key, found {}",
            wrapper.len()
        )));
    }
    let (tag, inner) = wrapper
        .iter()
        .next()
        .ok_or_else(|| ArmatureError::Deserialization("empty wrapper object".into()))?;
    let attrs = inner.as_object().ok_or_else(|| {
        ArmatureError::Deserialization(format!("attributes of '{tag}' must be an object"))
    })?;
    Ok((tag.as_str(), attrs))
}

/// The closed decoder registry: type tag -> constructor.
fn decode_node(tag: &str, attrs: &Map<String, Value>) -> Result<Node, ArmatureError> {
    let core = decode_core(attrs)?;
    match tag.to_ascii_lowercase().as_str() {
        "material" => {
            let mut material = Material::new(core);
            material.grade = opt_str(attrs, "grade")?;
            Ok(Node::Material(material))
        }
        "crosssection" => {
            let shape = req_token(attrs, "shape", SectionShape::parse, "section shape")?;
            let mut section = CrossSection::new(core, shape);
            if let Some(parameters) = attrs.get("parameters") {
                section.parameters = Some(decode_parameters(parameters)?);
            }
            section.material = opt_str(attrs, "material")?;
            Ok(Node::CrossSection(section))
        }
        "storey" => {
            let elevation = req_f64(attrs, "elevation")?;
            Ok(Node::Storey(Storey::new(core, elevation)))
        }
        "point" => {
            let x = req_f64(attrs, "x")?;
            let y = req_f64(attrs, "y")?;
            let z = req_f64(attrs, "z")?;
            Ok(Node::Point(Point::new(core, x, y, z)))
        }
        "curvegeometry" => {
            let curve = req_token(attrs, "curve", CurveKind::parse, "curve kind")?;
            let mut geometry = CurveGeometry::new(core, curve);
            geometry.points = id_list(attrs, "points")?;
            Ok(Node::CurveGeometry(geometry))
        }
        "segment" => {
            let mut segment = Segment::new(core);
            segment.geometry = opt_str(attrs, "geometry")?;
            segment.begin_connection = opt_str(attrs, "beginConnection")?;
            segment.end_connection = opt_str(attrs, "endConnection")?;
            Ok(Node::Segment(segment))
        }
        "pointconnection" => {
            let mut connection = PointConnection::new(core);
            connection.point = opt_str(attrs, "point")?;
            connection.storey = opt_str(attrs, "storey")?;
            Ok(Node::PointConnection(connection))
        }
        "curvemember" => {
            let mut member = CurveMember::new(core);
            member.cross_section = opt_str(attrs, "crossSection")?;
            member.storey = opt_str(attrs, "storey")?;
            member.segments = id_list(attrs, "segments")?;
            member.begin_connection = opt_str(attrs, "beginConnection")?;
            member.end_connection = opt_str(attrs, "endConnection")?;
            Ok(Node::CurveMember(member))
        }
        "surfacemember" => {
            let mut member = SurfaceMember::new(core);
            member.material = opt_str(attrs, "material")?;
            member.storey = opt_str(attrs, "storey")?;
            member.segments = id_list(attrs, "segments")?;
            Ok(Node::SurfaceMember(member))
        }
        _ => Err(ArmatureError::Deserialization(format!(
            "unknown record type tag '{tag}'"
        ))),
    }
}

fn decode_core(attrs: &Map<String, Value>) -> Result<NodeCore, ArmatureError> {
    let mut core = NodeCore::new(req_str(attrs, "id")?);
    if let Some(name) = opt_str(attrs, "name")? {
        core.name = name;
    }
    core.external_ref = opt_str(attrs, "externalRef")?;
    core.source_id = opt_str(attrs, "sourceId")?;
    core.description = opt_str(attrs, "description")?;
    Ok(core)
}

fn decode_parameters(value: &Value) -> Result<ShapeParameters, ArmatureError> {
    let map = value.as_object().ok_or_else(|| {
        ArmatureError::Deserialization("'parameters' must be an object".into())
    })?;
    let shape = req_token(map, "shape", SectionShape::parse, "section shape")?;
    let values = map
        .get("values")
        .and_then(Value::as_array)
        .ok_or_else(|| ArmatureError::Deserialization("missing 'parameters.values' array".into()))?
        .iter()
        .map(|v| {
            v.as_f64().ok_or_else(|| {
                ArmatureError::Deserialization("'parameters.values' entries must be numbers".into())
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ShapeParameters::new(shape, values))
}

fn decode_edge(tag: &str, attrs: &Map<String, Value>) -> Result<Edge, ArmatureError> {
    let kind = EdgeKind::parse(tag).ok_or_else(|| {
        ArmatureError::Deserialization(format!("unknown connection type tag '{tag}'"))
    })?;
    let id = match opt_str(attrs, "id")? {
        Some(id) => id,
        None => Edge::generate_id(),
    };
    let mut edge = Edge::with_id(id, req_str(attrs, "source")?, req_str(attrs, "target")?, kind);
    edge.label = opt_str(attrs, "label")?;
    edge.description = opt_str(attrs, "description")?;
    Ok(edge)
}

// -----------------------------------------------------------------------------
// Attribute extraction helpers
// -----------------------------------------------------------------------------

fn req_str(attrs: &Map<String, Value>, key: &str) -> Result<String, ArmatureError> {
    opt_str(attrs, key)?
        .ok_or_else(|| ArmatureError::Deserialization(format!("missing attribute '{key}'")))
}

fn opt_str(attrs: &Map<String, Value>, key: &str) -> Result<Option<String>, ArmatureError> {
    match attrs.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(ArmatureError::Deserialization(format!(
            "attribute '{key}' must be a string, found {other}"
        ))),
    }
}

fn req_f64(attrs: &Map<String, Value>, key: &str) -> Result<f64, ArmatureError> {
    attrs
        .get(key)
        .and_then(Value::as_f64)
        .ok_or_else(|| ArmatureError::Deserialization(format!("missing numeric attribute '{key}'")))
}

fn id_list(attrs: &Map<String, Value>, key: &str) -> Result<Vec<String>, ArmatureError> {
    match attrs.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(entries)) => entries
            .iter()
            .map(|v| {
                v.as_str().map(str::to_string).ok_or_else(|| {
                    ArmatureError::Deserialization(format!(
                        "entries of '{key}' must be id strings"
                    ))
                })
            })
            .collect(),
        Some(other) => Err(ArmatureError::Deserialization(format!(
            "attribute '{key}' must be an array, found {other}"
        ))),
    }
}

fn req_token<T>(
    attrs: &Map<String, Value>,
    key: &str,
    parse: impl Fn(&str) -> Option<T>,
    what: &str,
) -> Result<T, ArmatureError> {
    let token = req_str(attrs, key)?;
    parse(&token).ok_or_else(|| {
        ArmatureError::Deserialization(format!("unknown {what} token '{token}'"))
    })
}

// =============================================================================
// TESTS
// =============================================================================

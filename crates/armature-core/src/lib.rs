//! # armature-core
//!
//! The structural model graph engine for Armature - THE ENGINE.
//!
//! This crate builds an in-memory directed graph of structural records
//! (materials, cross-sections, storeys, members, connections, geometry)
//! and their typed connections, and exports/imports that graph as a stable
//! JSON wire format.
//!
//! ## Components
//!
//! - `node` / `edge` / `model`: the record and connection contract and the
//!   owning container
//! - `inference`: convention-based edge synthesis from record fields
//! - `analyzer`: topological ordering and cycle reporting
//! - `mutation`: the transactional, deduplicating create API
//! - `wire`: the canonical `{nodes, edges}` JSON codec
//!
//! ## Architectural Constraints
//!
//! - Pure Rust: no async, no network dependencies
//! - Single-threaded: one `Model` is driven from one thread at a time;
//!   callers serialize concurrent access
//! - No persistence beyond flat file/string export
//! - The engine never validates engineering correctness of the modeled
//!   structure, and never enforces referential integrity between edges and
//!   the node set (orphan edges are legitimate)

// =============================================================================
// MODULES
// =============================================================================

pub mod analyzer;
pub mod edge;
pub mod inference;
pub mod model;
pub mod mutation;
pub mod node;
pub mod primitives;
pub mod types;
pub mod wire;

// =============================================================================
// RE-EXPORTS: Core Types
// =============================================================================

pub use types::{ArmatureError, Classification, CurveKind, SectionShape, ShapeParameters};

// =============================================================================
// RE-EXPORTS: Node/Edge Model
// =============================================================================

pub use edge::{Edge, EdgeKind};
pub use node::{
    CrossSection, CurveGeometry, CurveMember, Material, Node, NodeCore, Point, PointConnection,
    Segment, Storey, SurfaceMember,
};

// =============================================================================
// RE-EXPORTS: Engine
// =============================================================================

pub use analyzer::DependencyAnalyzer;
pub use inference::InferenceEngine;
pub use model::{Model, ModelMetrics};
pub use mutation::{CurveMemberParts, MutationEngine, SurfaceMemberParts};

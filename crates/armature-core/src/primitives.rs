//! # Engine Primitives
//!
//! Hardcoded runtime constants for the Armature CORE.
//!
//! The engine carries no runtime configuration layer. These values are
//! compiled into the binary and are immutable at runtime.

/// Tolerance for coordinate equality.
///
/// Two coordinate-bearing geometry records compare equal when every
/// coordinate component differs by strictly less than this value.
pub const GEOMETRY_TOLERANCE: f64 = 1e-10;

/// Maximum length for record identifiers.
///
/// Identifiers longer than this are rejected by the mutation layer.
/// This prevents memory exhaustion from malicious or malformed input.
pub const MAX_ID_LENGTH: usize = 256;

/// Maximum length for record names.
///
/// Names longer than this are rejected by the mutation layer.
pub const MAX_NAME_LENGTH: usize = 1024;

// =============================================================================
// IMPORT LIMITS
// =============================================================================

/// Maximum allowed node count in wire-format imports.
///
/// This prevents memory exhaustion from malicious or corrupted documents.
/// 1 million nodes is a reasonable upper bound for most use cases.
pub const MAX_IMPORT_NODE_COUNT: usize = 1_000_000;

/// Maximum allowed edge count in wire-format imports.
///
/// This prevents memory exhaustion from malicious or corrupted documents.
/// 10 million edges is a reasonable upper bound (10x node count).
pub const MAX_IMPORT_EDGE_COUNT: usize = 10_000_000;

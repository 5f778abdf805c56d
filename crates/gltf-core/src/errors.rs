//! Error types for the glTF loader.

use std::fmt;

use crate::report::{Diagnostic, EntityKind, ErrorKind};
use crate::types::TargetPath;
use thiserror::Error;

/// Top-level error type for the glTF loader.
#[derive(Debug, Error)]
pub enum GltfError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Reference(#[from] ReferenceError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("JSON serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Location of a field inside the document, e.g. `accessors[3].sparse.count`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    pub kind: EntityKind,
    pub index: Option<usize>,
    /// Dotted path below the entity; empty for the entity itself.
    pub field: String,
}

impl FieldPath {
    pub fn new(kind: EntityKind, index: Option<usize>, field: impl Into<String>) -> Self {
        Self {
            kind,
            index,
            field: field.into(),
        }
    }

    /// The root object.
    pub fn root() -> Self {
        Self::new(EntityKind::Document, None, "")
    }

    /// A path one level deeper.
    pub fn join(&self, field: &str) -> Self {
        let field = if self.field.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", self.field, field)
        };
        Self::new(self.kind, self.index, field)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.kind, self.index) {
            (EntityKind::Document, _) if self.field.is_empty() => f.write_str("the root object"),
            (EntityKind::Document, _) => f.write_str(&self.field),
            (kind, Some(index)) => {
                write!(f, "{}[{}]", kind.property(), index)?;
                if !self.field.is_empty() {
                    write!(f, ".{}", self.field)?;
                }
                Ok(())
            }
            (kind, None) => {
                f.write_str(kind.property())?;
                if !self.field.is_empty() {
                    write!(f, ".{}", self.field)?;
                }
                Ok(())
            }
        }
    }
}

/// A malformed document. Parsing stops at the first one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Malformed JSON at line {line}, column {column}: {message}")]
    Syntax {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("Unexpected end of input at line {line}, column {column}")]
    Truncated { line: usize, column: usize },

    #[error("Wrong value type at line {line}, column {column}: {message}")]
    TypeMismatch {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("Missing required field '{field}' in {at}")]
    MissingField { at: FieldPath, field: &'static str },

    #[error("Unrecognized value {value} for {at}")]
    UnrecognizedEnumValue { at: FieldPath, value: String },

    #[error("Invalid value for {at}: {reason}")]
    InvalidValue { at: FieldPath, reason: String },

    #[error("Fields '{first}' and '{second}' of {at} are mutually exclusive")]
    ConflictingFields {
        at: FieldPath,
        first: &'static str,
        second: &'static str,
    },

    #[error("Input of {len} bytes exceeds the limit of {limit} bytes")]
    InputTooLarge { len: usize, limit: usize },
}

impl ParseError {
    fn location(&self) -> Option<&FieldPath> {
        match self {
            Self::MissingField { at, .. }
            | Self::UnrecognizedEnumValue { at, .. }
            | Self::InvalidValue { at, .. }
            | Self::ConflictingFields { at, .. } => Some(at),
            Self::Syntax { .. }
            | Self::Truncated { .. }
            | Self::TypeMismatch { .. }
            | Self::InputTooLarge { .. } => None,
        }
    }
}

impl Diagnostic for ParseError {
    fn error_kind(&self) -> ErrorKind {
        match self {
            Self::UnrecognizedEnumValue { .. } => ErrorKind::UnrecognizedEnumValue,
            _ => ErrorKind::MalformedDocument,
        }
    }

    fn entity(&self) -> (EntityKind, Option<usize>) {
        self.location()
            .map_or((EntityKind::Document, None), |at| (at.kind, at.index))
    }
}

/// Errors found while checking index references and the node hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    #[error(
        "{entity_kind}{}: {field} references {target_kind} {referenced_index}, but only {available} exist",
        display_index(.entity_index)
    )]
    DanglingReference {
        entity_kind: EntityKind,
        entity_index: Option<usize>,
        field: String,
        referenced_index: usize,
        target_kind: EntityKind,
        available: usize,
    },

    #[error("Invalid node hierarchy: {0}")]
    InvalidHierarchy(HierarchyViolation),
}

impl Diagnostic for ReferenceError {
    fn error_kind(&self) -> ErrorKind {
        match self {
            Self::DanglingReference { .. } => ErrorKind::DanglingReference,
            Self::InvalidHierarchy(_) => ErrorKind::InvalidHierarchy,
        }
    }

    fn entity(&self) -> (EntityKind, Option<usize>) {
        match self {
            Self::DanglingReference {
                entity_kind,
                entity_index,
                ..
            } => (*entity_kind, *entity_index),
            Self::InvalidHierarchy(violation) => (EntityKind::Node, Some(violation.node())),
        }
    }
}

/// Ways the node graph fails to be a forest.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HierarchyViolation {
    #[error("node {node} is a child of several nodes: {}", join_indices(.parents, ", "))]
    MultipleParents { node: usize, parents: Vec<usize> },

    #[error("node {parent} lists child {node} more than once")]
    RepeatedChild { parent: usize, node: usize },

    #[error("cycle {}", display_cycle(.cycle))]
    Cycle { cycle: Vec<usize> },

    #[error("node {node} is a root of scene {scene} but also a child of node {parent}")]
    RootHasParent {
        scene: usize,
        node: usize,
        parent: usize,
    },
}

impl HierarchyViolation {
    /// The offending node.
    pub fn node(&self) -> usize {
        match self {
            Self::MultipleParents { node, .. }
            | Self::RepeatedChild { node, .. }
            | Self::RootHasParent { node, .. } => *node,
            Self::Cycle { cycle } => cycle.first().copied().unwrap_or_default(),
        }
    }
}

/// Semantic constraints violated by an otherwise well-referenced document.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Validation skipped: {count} reference error(s) must be fixed first")]
    ReferencesUnresolved { count: usize },

    #[error("Node {node} declares matrix together with {}", .components.join(", "))]
    ConflictingTransform {
        node: usize,
        components: Vec<&'static str>,
    },

    #[error(
        "Node {node} has a skin but primitive {primitive} of mesh {mesh} lacks {}",
        .missing.join(" and ")
    )]
    MissingSkinningAttributes {
        node: usize,
        mesh: usize,
        primitive: usize,
        missing: Vec<&'static str>,
    },

    #[error(
        "Accessor {accessor}: sparse index {current} at position {position} does not exceed previous index {previous}"
    )]
    NonMonotonicSparseIndices {
        accessor: usize,
        position: usize,
        previous: u32,
        current: u32,
    },

    #[error(
        "Accessor {accessor}: sparse index {index} at position {position} is not below the element count {count}"
    )]
    SparseIndexOutOfRange {
        accessor: usize,
        position: usize,
        index: u32,
        count: usize,
    },

    #[error(
        "Skin {skin} has {joints} joints but inverse bind matrices accessor {accessor} holds {count} elements"
    )]
    SkinJointCountMismatch {
        skin: usize,
        joints: usize,
        accessor: usize,
        count: usize,
    },

    #[error("Skin {skin}: skeleton node {skeleton} is not an ancestor of joint {joint}")]
    SkeletonNotAncestor {
        skin: usize,
        skeleton: usize,
        joint: usize,
    },

    #[error("{entity_kind} {index} declares {weights} morph weights for {targets} morph targets")]
    MorphWeightCountMismatch {
        entity_kind: EntityKind,
        index: usize,
        weights: usize,
        targets: usize,
    },

    #[error("Node {node} declares morph weights without a mesh")]
    WeightsWithoutMesh { node: usize },

    #[error(
        "Mesh {mesh}: primitive {primitive} has {found} morph targets, expected {expected}"
    )]
    InconsistentMorphTargets {
        mesh: usize,
        primitive: usize,
        expected: usize,
        found: usize,
    },

    #[error("Animation {animation}: channel {channel} targets node {node}, which declares a matrix")]
    AnimatedMatrixNode {
        animation: usize,
        channel: usize,
        node: usize,
    },

    #[error(
        "Animation {animation}: channel {channel} targets {path} of node {node}, already targeted by channel {first}"
    )]
    DuplicateChannelTarget {
        animation: usize,
        channel: usize,
        first: usize,
        node: usize,
        path: TargetPath,
    },

    #[error("Accessor {accessor}: {field} has {found} values, expected {expected}")]
    AccessorBoundsMismatch {
        accessor: usize,
        field: &'static str,
        expected: usize,
        found: usize,
    },

    #[error(
        "Buffer view {buffer_view} ends at byte {end}, past the {byte_length}-byte buffer {buffer}"
    )]
    BufferViewOutOfRange {
        buffer_view: usize,
        end: usize,
        buffer: usize,
        byte_length: usize,
    },

    #[error("Camera {camera}: {reason}")]
    InvalidCamera { camera: usize, reason: String },

    #[error("Node {node}: rotation quaternion has length {length}, expected 1")]
    NonUnitRotation { node: usize, length: f32 },

    #[error("Asset version {version}: {reason}")]
    UnsupportedVersion { version: String, reason: String },

    #[error("Extension {name} is required but not listed in extensionsUsed")]
    UndeclaredRequiredExtension { name: String },
}

impl Diagnostic for ValidationError {
    fn error_kind(&self) -> ErrorKind {
        match self {
            Self::ReferencesUnresolved { .. } => ErrorKind::ReferencesUnresolved,
            Self::ConflictingTransform { .. } => ErrorKind::ConflictingTransform,
            Self::MissingSkinningAttributes { .. } => ErrorKind::MissingSkinningAttributes,
            Self::NonMonotonicSparseIndices { .. } => ErrorKind::NonMonotonicSparseIndices,
            Self::SparseIndexOutOfRange { .. } => ErrorKind::SparseIndexOutOfRange,
            Self::SkinJointCountMismatch { .. } => ErrorKind::SkinJointCountMismatch,
            Self::SkeletonNotAncestor { .. } => ErrorKind::SkeletonNotAncestor,
            Self::MorphWeightCountMismatch { .. } => ErrorKind::MorphWeightCountMismatch,
            Self::WeightsWithoutMesh { .. } => ErrorKind::WeightsWithoutMesh,
            Self::InconsistentMorphTargets { .. } => ErrorKind::InconsistentMorphTargets,
            Self::AnimatedMatrixNode { .. } => ErrorKind::AnimatedMatrixNode,
            Self::DuplicateChannelTarget { .. } => ErrorKind::DuplicateChannelTarget,
            Self::AccessorBoundsMismatch { .. } => ErrorKind::AccessorBoundsMismatch,
            Self::BufferViewOutOfRange { .. } => ErrorKind::BufferViewOutOfRange,
            Self::InvalidCamera { .. } => ErrorKind::InvalidCamera,
            Self::NonUnitRotation { .. } => ErrorKind::NonUnitRotation,
            Self::UnsupportedVersion { .. } => ErrorKind::UnsupportedVersion,
            Self::UndeclaredRequiredExtension { .. } => ErrorKind::UndeclaredRequiredExtension,
        }
    }

    fn entity(&self) -> (EntityKind, Option<usize>) {
        match self {
            Self::ReferencesUnresolved { .. } | Self::UndeclaredRequiredExtension { .. } => {
                (EntityKind::Document, None)
            }
            Self::UnsupportedVersion { .. } => (EntityKind::Asset, None),
            Self::ConflictingTransform { node, .. }
            | Self::MissingSkinningAttributes { node, .. }
            | Self::WeightsWithoutMesh { node }
            | Self::NonUnitRotation { node, .. } => (EntityKind::Node, Some(*node)),
            Self::NonMonotonicSparseIndices { accessor, .. }
            | Self::SparseIndexOutOfRange { accessor, .. }
            | Self::AccessorBoundsMismatch { accessor, .. } => {
                (EntityKind::Accessor, Some(*accessor))
            }
            Self::SkinJointCountMismatch { skin, .. } | Self::SkeletonNotAncestor { skin, .. } => {
                (EntityKind::Skin, Some(*skin))
            }
            Self::MorphWeightCountMismatch {
                entity_kind, index, ..
            } => (*entity_kind, Some(*index)),
            Self::InconsistentMorphTargets { mesh, .. } => (EntityKind::Mesh, Some(*mesh)),
            Self::AnimatedMatrixNode { animation, .. }
            | Self::DuplicateChannelTarget { animation, .. } => {
                (EntityKind::Animation, Some(*animation))
            }
            Self::BufferViewOutOfRange { buffer_view, .. } => {
                (EntityKind::BufferView, Some(*buffer_view))
            }
            Self::InvalidCamera { camera, .. } => (EntityKind::Camera, Some(*camera)),
        }
    }
}

/// Failures fetching buffer bytes. Never fatal: rules needing the bytes are skipped.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid data URI: {reason}")]
    InvalidDataUri { reason: String },

    #[error("Base64 payload could not be decoded: {0}")]
    Base64(String),

    #[error("Failed to fetch {uri}: {reason}")]
    Unavailable { uri: String, reason: String },

    #[error("URI {uri} cannot be resolved without an external resolver")]
    Unsupported { uri: String },

    #[error("URI {uri} points outside the directory of the document")]
    OutsideBase { uri: String },

    #[error("Buffer has no uri and no binary chunk was supplied")]
    MissingBinaryChunk,

    #[error("Fetched {actual} bytes, fewer than the declared byteLength {declared}")]
    TooShort { actual: usize, declared: usize },
}

fn display_index(index: &Option<usize>) -> String {
    index.map_or_else(String::new, |i| format!(" {}", i))
}

fn join_indices(indices: &[usize], separator: &str) -> String {
    indices
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(separator)
}

fn display_cycle(cycle: &[usize]) -> String {
    let mut path = join_indices(cycle, " -> ");
    if let Some(first) = cycle.first() {
        path.push_str(&format!(" -> {}", first));
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Stage;

    #[test]
    fn test_field_path_display() {
        let at = FieldPath::new(EntityKind::Accessor, Some(3), "sparse").join("count");
        assert_eq!(at.to_string(), "accessors[3].sparse.count");
        assert_eq!(FieldPath::root().to_string(), "the root object");
        assert_eq!(FieldPath::root().join("scene").to_string(), "scene");
        assert_eq!(
            FieldPath::new(EntityKind::Asset, None, "version").to_string(),
            "asset.version"
        );
    }

    #[test]
    fn test_cycle_message_closes_loop() {
        let err = ReferenceError::InvalidHierarchy(HierarchyViolation::Cycle { cycle: vec![0, 1] });
        assert_eq!(err.to_string(), "Invalid node hierarchy: cycle 0 -> 1 -> 0");
        assert_eq!(err.entity(), (EntityKind::Node, Some(0)));
    }

    #[test]
    fn test_dangling_reference_entry() {
        let err = ReferenceError::DanglingReference {
            entity_kind: EntityKind::Node,
            entity_index: Some(2),
            field: "mesh".to_string(),
            referenced_index: 7,
            target_kind: EntityKind::Mesh,
            available: 1,
        };
        let entry = err.to_entry(Stage::References);
        assert_eq!(entry.error_kind, ErrorKind::DanglingReference);
        assert_eq!(entry.entity_index, Some(2));
        assert_eq!(entry.message, "node 2: mesh references mesh 7, but only 1 exist");
    }

    #[test]
    fn test_unrecognized_enum_is_its_own_kind() {
        let err = ParseError::UnrecognizedEnumValue {
            at: FieldPath::new(EntityKind::Accessor, Some(0), "componentType"),
            value: "5124".to_string(),
        };
        assert_eq!(err.error_kind(), ErrorKind::UnrecognizedEnumValue);
        assert_eq!(err.entity(), (EntityKind::Accessor, Some(0)));
        assert_eq!(
            err.to_string(),
            "Unrecognized value 5124 for accessors[0].componentType"
        );
    }
}

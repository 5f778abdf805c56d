//! Flattened diagnostic records.
//!
//! Each pipeline stage has its own error enum; [`Diagnostic`] maps any of them
//! onto a uniform [`ReportEntry`] so collaborators (CLI, asset pipelines) can
//! print or serialize one list regardless of which stage failed.

use std::fmt;

/// Pipeline stage that produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum Stage {
    Parse,
    References,
    Validation,
}

impl Stage {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Parse => "parse",
            Self::References => "references",
            Self::Validation => "validation",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of glTF entity a diagnostic is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EntityKind {
    /// The root glTF object.
    Document,
    Asset,
    Accessor,
    Animation,
    /// A sampler inside an animation's own `samplers` array.
    AnimationSampler,
    Buffer,
    BufferView,
    Camera,
    Image,
    Material,
    Mesh,
    Node,
    Sampler,
    Scene,
    Skin,
    Texture,
}

impl EntityKind {
    /// Kinds stored in a top-level array of the document.
    pub const ARRAYS: [EntityKind; 13] = [
        Self::Accessor,
        Self::Animation,
        Self::Buffer,
        Self::BufferView,
        Self::Camera,
        Self::Image,
        Self::Material,
        Self::Mesh,
        Self::Node,
        Self::Sampler,
        Self::Scene,
        Self::Skin,
        Self::Texture,
    ];

    /// JSON property holding entities of this kind.
    pub const fn property(self) -> &'static str {
        match self {
            Self::Document => "",
            Self::Asset => "asset",
            Self::Accessor => "accessors",
            Self::Animation => "animations",
            Self::AnimationSampler => "samplers",
            Self::Buffer => "buffers",
            Self::BufferView => "bufferViews",
            Self::Camera => "cameras",
            Self::Image => "images",
            Self::Material => "materials",
            Self::Mesh => "meshes",
            Self::Node => "nodes",
            Self::Sampler => "samplers",
            Self::Scene => "scenes",
            Self::Skin => "skins",
            Self::Texture => "textures",
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Asset => "asset",
            Self::Accessor => "accessor",
            Self::Animation => "animation",
            Self::AnimationSampler => "animation sampler",
            Self::Buffer => "buffer",
            Self::BufferView => "buffer view",
            Self::Camera => "camera",
            Self::Image => "image",
            Self::Material => "material",
            Self::Mesh => "mesh",
            Self::Node => "node",
            Self::Sampler => "sampler",
            Self::Scene => "scene",
            Self::Skin => "skin",
            Self::Texture => "texture",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category of a diagnostic, stable across message wording changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorKind {
    MalformedDocument,
    UnrecognizedEnumValue,
    DanglingReference,
    InvalidHierarchy,
    ReferencesUnresolved,
    ConflictingTransform,
    MissingSkinningAttributes,
    NonMonotonicSparseIndices,
    SparseIndexOutOfRange,
    SkinJointCountMismatch,
    SkeletonNotAncestor,
    MorphWeightCountMismatch,
    WeightsWithoutMesh,
    InconsistentMorphTargets,
    AnimatedMatrixNode,
    DuplicateChannelTarget,
    AccessorBoundsMismatch,
    BufferViewOutOfRange,
    InvalidCamera,
    NonUnitRotation,
    UnsupportedVersion,
    UndeclaredRequiredExtension,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// One diagnostic, flattened for display or serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ReportEntry {
    pub stage: Stage,
    pub error_kind: ErrorKind,
    pub entity_kind: EntityKind,
    pub entity_index: Option<usize>,
    pub message: String,
}

impl fmt::Display for ReportEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ", self.stage, self.error_kind)?;
        match self.entity_index {
            Some(index) => write!(f, "{}[{}]", self.entity_kind.property(), index)?,
            None => write!(f, "{}", self.entity_kind)?,
        }
        write!(f, ": {}", self.message)
    }
}

/// Anything that can be flattened into a [`ReportEntry`].
pub trait Diagnostic: fmt::Display {
    fn error_kind(&self) -> ErrorKind;

    /// The entity the diagnostic is attached to, and its index when it has one.
    fn entity(&self) -> (EntityKind, Option<usize>);

    fn to_entry(&self, stage: Stage) -> ReportEntry {
        let (entity_kind, entity_index) = self.entity();
        ReportEntry {
            stage,
            error_kind: self.error_kind(),
            entity_kind,
            entity_index,
            message: self.to_string(),
        }
    }
}

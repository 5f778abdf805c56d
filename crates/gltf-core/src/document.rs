//! The glTF 2.0 schema model.
//!
//! Every entity is a plain record whose optional wire fields have already been
//! replaced by their documented defaults. Cross-entity references are raw
//! indices into the [`Document`]'s top-level arrays; nothing here guarantees
//! they are in range. That is the reference resolver's job.

use glam::{Mat4, Quat, Vec3};
use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::report::EntityKind;
use crate::types::{
    AccessorType, AlphaMode, BufferTarget, ComponentType, IndexComponentType, Interpolation,
    MagFilter, MimeType, MinFilter, PrimitiveMode, TargetPath, WrapMode,
};

/// Extension objects keyed by extension name, stored without interpretation.
pub type Extensions = IndexMap<String, serde_json::Value>;

/// Mesh attribute semantic (`POSITION`, `TEXCOORD_0`, custom `_FOO`, ...) to accessor index.
pub type Attributes = IndexMap<String, usize>;

/// Per-component bounds of an accessor; at most 16 values (MAT4).
pub type Bounds = SmallVec<[f64; 16]>;

/// The root object of a glTF asset.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub asset: Asset,
    /// Index of the default scene.
    pub scene: Option<usize>,
    pub scenes: Vec<Scene>,
    pub nodes: Vec<Node>,
    pub meshes: Vec<Mesh>,
    pub accessors: Vec<Accessor>,
    pub buffer_views: Vec<BufferView>,
    pub buffers: Vec<Buffer>,
    pub materials: Vec<Material>,
    pub textures: Vec<Texture>,
    pub images: Vec<Image>,
    pub samplers: Vec<Sampler>,
    pub animations: Vec<Animation>,
    pub skins: Vec<Skin>,
    pub cameras: Vec<Camera>,
    /// Names of extensions used by this asset.
    pub extensions_used: Vec<String>,
    /// Names of extensions required to load this asset.
    pub extensions_required: Vec<String>,
    pub extensions: Extensions,
    pub extras: Option<serde_json::Value>,
}

impl Document {
    /// Length of the top-level array holding entities of `kind`.
    ///
    /// Kinds without a top-level array (the root, the asset, animation
    /// samplers) report zero.
    pub fn len_of(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Accessor => self.accessors.len(),
            EntityKind::Animation => self.animations.len(),
            EntityKind::Buffer => self.buffers.len(),
            EntityKind::BufferView => self.buffer_views.len(),
            EntityKind::Camera => self.cameras.len(),
            EntityKind::Image => self.images.len(),
            EntityKind::Material => self.materials.len(),
            EntityKind::Mesh => self.meshes.len(),
            EntityKind::Node => self.nodes.len(),
            EntityKind::Sampler => self.samplers.len(),
            EntityKind::Scene => self.scenes.len(),
            EntityKind::Skin => self.skins.len(),
            EntityKind::Texture => self.textures.len(),
            EntityKind::Document | EntityKind::Asset | EntityKind::AnimationSampler => 0,
        }
    }

    /// Total number of entities across all top-level arrays.
    pub fn entity_count(&self) -> usize {
        EntityKind::ARRAYS.iter().map(|&kind| self.len_of(kind)).sum()
    }

    /// Flags the nodes targeted by at least one animation channel.
    pub fn animated_nodes(&self) -> Vec<bool> {
        let mut animated = vec![false; self.nodes.len()];
        let targets = self
            .animations
            .iter()
            .flat_map(|animation| &animation.channels)
            .filter_map(|channel| channel.target.node);
        for node in targets {
            if let Some(flag) = animated.get_mut(node) {
                *flag = true;
            }
        }
        animated
    }

    /// Drop node transform components that equal their defaults.
    ///
    /// See [`Node::canonical_transform`] for what is kept.
    pub fn normalize_transforms(&mut self) {
        let animated = self.animated_nodes();
        for (node, animated) in self.nodes.iter_mut().zip(animated) {
            let transform = node.canonical_transform(animated);
            node.matrix = transform.matrix;
            node.translation = transform.translation;
            node.rotation = transform.rotation;
            node.scale = transform.scale;
        }
    }
}

/// Metadata about the glTF asset.
#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    /// Targeted glTF version, `<major>.<minor>`.
    pub version: String,
    /// Minimum glTF version required to load this asset.
    pub min_version: Option<String>,
    /// Tool that generated the asset.
    pub generator: Option<String>,
    pub copyright: Option<String>,
    pub extensions: Extensions,
    pub extras: Option<serde_json::Value>,
}

impl Default for Asset {
    fn default() -> Self {
        Self {
            version: "2.0".to_string(),
            min_version: None,
            generator: None,
            copyright: None,
            extensions: Extensions::new(),
            extras: None,
        }
    }
}

/// A typed view into a buffer view.
#[derive(Debug, Clone, PartialEq)]
pub struct Accessor {
    pub buffer_view: Option<usize>,
    /// Offset relative to the start of the buffer view, in bytes.
    pub byte_offset: usize,
    pub component_type: ComponentType,
    /// Whether integer values are normalized before use.
    pub normalized: bool,
    /// Number of elements.
    pub count: usize,
    pub accessor_type: AccessorType,
    pub min: Option<Bounds>,
    pub max: Option<Bounds>,
    pub sparse: Option<Sparse>,
    pub name: Option<String>,
    pub extensions: Extensions,
    pub extras: Option<serde_json::Value>,
}

/// Sparse storage of elements that deviate from their initialization value.
#[derive(Debug, Clone, PartialEq)]
pub struct Sparse {
    /// Number of deviating elements.
    pub count: usize,
    pub indices: SparseIndices,
    pub values: SparseValues,
    pub extensions: Extensions,
    pub extras: Option<serde_json::Value>,
}

/// Location of the indices of deviating elements. Indices must strictly increase.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseIndices {
    pub buffer_view: usize,
    pub byte_offset: usize,
    pub component_type: IndexComponentType,
    pub extensions: Extensions,
    pub extras: Option<serde_json::Value>,
}

/// Location of the deviating element values.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseValues {
    pub buffer_view: usize,
    pub byte_offset: usize,
    pub extensions: Extensions,
    pub extras: Option<serde_json::Value>,
}

/// Raw binary storage.
#[derive(Debug, Clone, PartialEq)]
pub struct Buffer {
    /// Location of the bytes; absent for the GLB binary chunk.
    pub uri: Option<String>,
    pub byte_length: usize,
    pub name: Option<String>,
    pub extensions: Extensions,
    pub extras: Option<serde_json::Value>,
}

/// A byte range within a buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct BufferView {
    pub buffer: usize,
    pub byte_offset: usize,
    pub byte_length: usize,
    pub byte_stride: Option<usize>,
    pub target: Option<BufferTarget>,
    pub name: Option<String>,
    pub extensions: Extensions,
    pub extras: Option<serde_json::Value>,
}

/// Image data used to create a texture.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub source: ImageSource,
    pub name: Option<String>,
    pub extensions: Extensions,
    pub extras: Option<serde_json::Value>,
}

/// Where an image's bytes live. The two forms are mutually exclusive.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    /// External or `data:` URI.
    Uri {
        uri: String,
        mime_type: Option<MimeType>,
    },
    /// Bytes stored in a buffer view; the MIME type is then required.
    BufferView {
        buffer_view: usize,
        mime_type: MimeType,
    },
}

impl ImageSource {
    pub fn buffer_view(&self) -> Option<usize> {
        match self {
            Self::BufferView { buffer_view, .. } => Some(*buffer_view),
            Self::Uri { .. } => None,
        }
    }
}

/// Texture sampler properties for filtering and wrapping.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sampler {
    pub mag_filter: Option<MagFilter>,
    pub min_filter: Option<MinFilter>,
    pub wrap_s: WrapMode,
    pub wrap_t: WrapMode,
    pub name: Option<String>,
    pub extensions: Extensions,
    pub extras: Option<serde_json::Value>,
}

/// A texture and its sampler.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Texture {
    /// When absent, repeat wrapping and auto filtering apply.
    pub sampler: Option<usize>,
    pub source: Option<usize>,
    pub name: Option<String>,
    pub extensions: Extensions,
    pub extras: Option<serde_json::Value>,
}

/// Reference to a texture.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureInfo {
    pub index: usize,
    /// Set index of the `TEXCOORD_n` attribute used for mapping.
    pub tex_coord: u32,
    pub extensions: Extensions,
    pub extras: Option<serde_json::Value>,
}

/// Reference to a tangent-space normal texture.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalTextureInfo {
    pub index: usize,
    pub tex_coord: u32,
    pub scale: f32,
    pub extensions: Extensions,
    pub extras: Option<serde_json::Value>,
}

/// Reference to an occlusion texture.
#[derive(Debug, Clone, PartialEq)]
pub struct OcclusionTextureInfo {
    pub index: usize,
    pub tex_coord: u32,
    pub strength: f32,
    pub extensions: Extensions,
    pub extras: Option<serde_json::Value>,
}

/// The material appearance of a primitive.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub pbr_metallic_roughness: Option<PbrMetallicRoughness>,
    pub normal_texture: Option<NormalTextureInfo>,
    pub occlusion_texture: Option<OcclusionTextureInfo>,
    pub emissive_texture: Option<TextureInfo>,
    pub emissive_factor: [f32; 3],
    pub alpha_mode: AlphaMode,
    pub alpha_cutoff: f32,
    pub double_sided: bool,
    pub name: Option<String>,
    pub extensions: Extensions,
    pub extras: Option<serde_json::Value>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            pbr_metallic_roughness: None,
            normal_texture: None,
            occlusion_texture: None,
            emissive_texture: None,
            emissive_factor: [0.0, 0.0, 0.0],
            alpha_mode: AlphaMode::Opaque,
            alpha_cutoff: 0.5,
            double_sided: false,
            name: None,
            extensions: Extensions::new(),
            extras: None,
        }
    }
}

impl Material {
    /// Every texture index this material references, with the field that holds it.
    pub fn texture_refs(&self) -> SmallVec<[(&'static str, usize); 5]> {
        let mut refs = SmallVec::new();
        if let Some(pbr) = &self.pbr_metallic_roughness {
            if let Some(info) = &pbr.base_color_texture {
                refs.push(("pbrMetallicRoughness.baseColorTexture.index", info.index));
            }
            if let Some(info) = &pbr.metallic_roughness_texture {
                refs.push(("pbrMetallicRoughness.metallicRoughnessTexture.index", info.index));
            }
        }
        if let Some(info) = &self.normal_texture {
            refs.push(("normalTexture.index", info.index));
        }
        if let Some(info) = &self.occlusion_texture {
            refs.push(("occlusionTexture.index", info.index));
        }
        if let Some(info) = &self.emissive_texture {
            refs.push(("emissiveTexture.index", info.index));
        }
        refs
    }
}

/// Metallic-roughness material model parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct PbrMetallicRoughness {
    pub base_color_factor: [f32; 4],
    pub base_color_texture: Option<TextureInfo>,
    pub metallic_factor: f32,
    pub roughness_factor: f32,
    pub metallic_roughness_texture: Option<TextureInfo>,
    pub extensions: Extensions,
    pub extras: Option<serde_json::Value>,
}

impl Default for PbrMetallicRoughness {
    fn default() -> Self {
        Self {
            base_color_factor: [1.0, 1.0, 1.0, 1.0],
            base_color_texture: None,
            metallic_factor: 1.0,
            roughness_factor: 1.0,
            metallic_roughness_texture: None,
            extensions: Extensions::new(),
            extras: None,
        }
    }
}

/// A set of primitives to be rendered.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mesh {
    pub primitives: Vec<Primitive>,
    /// Default morph target weights.
    pub weights: Option<Vec<f32>>,
    pub name: Option<String>,
    pub extensions: Extensions,
    pub extras: Option<serde_json::Value>,
}

impl Mesh {
    /// Number of morph targets, taken from the first primitive.
    pub fn morph_target_count(&self) -> usize {
        self.primitives.first().map_or(0, |p| p.targets.len())
    }
}

/// Geometry to be rendered with a material.
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    pub attributes: Attributes,
    pub indices: Option<usize>,
    pub material: Option<usize>,
    pub mode: PrimitiveMode,
    /// Morph targets; each maps attribute semantics to displacement accessors.
    pub targets: Vec<Attributes>,
    pub extensions: Extensions,
    pub extras: Option<serde_json::Value>,
}

impl Primitive {
    /// Create a triangle primitive with only a `POSITION` attribute.
    pub fn with_position(accessor: usize) -> Self {
        let mut attributes = Attributes::new();
        attributes.insert("POSITION".to_string(), accessor);
        Self {
            attributes,
            indices: None,
            material: None,
            mode: PrimitiveMode::Triangles,
            targets: Vec::new(),
            extensions: Extensions::new(),
            extras: None,
        }
    }
}

/// Joints and matrices defining a skin.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Skin {
    /// Accessor of MAT4 inverse-bind matrices; identity when absent.
    pub inverse_bind_matrices: Option<usize>,
    /// Common root of the joint hierarchy.
    pub skeleton: Option<usize>,
    pub joints: Vec<usize>,
    pub name: Option<String>,
    pub extensions: Extensions,
    pub extras: Option<serde_json::Value>,
}

/// Column-major identity, the default `matrix`.
pub const IDENTITY_MATRIX: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0,
];
pub const DEFAULT_TRANSLATION: [f32; 3] = [0.0, 0.0, 0.0];
pub const DEFAULT_ROTATION: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
pub const DEFAULT_SCALE: [f32; 3] = [1.0, 1.0, 1.0];

/// The transform fields of a node, each present or absent.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NodeTransform {
    pub matrix: Option<[f32; 16]>,
    pub translation: Option<[f32; 3]>,
    pub rotation: Option<[f32; 4]>,
    pub scale: Option<[f32; 3]>,
}

fn unless_default<const N: usize>(value: Option<[f32; N]>, default: [f32; N]) -> Option<[f32; N]> {
    value.filter(|value| *value != default)
}

/// A node in the node hierarchy.
///
/// Parsed nodes omit transform components equal to their defaults, unless
/// [`Node::canonical_transform`] keeps them so a conflict can be reported.
/// Use [`Node::local_transform`] for the effective value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Node {
    pub camera: Option<usize>,
    pub children: Vec<usize>,
    pub skin: Option<usize>,
    /// Column-major 4x4 matrix.
    pub matrix: Option<[f32; 16]>,
    pub mesh: Option<usize>,
    /// Unit quaternion, `(x, y, z, w)`.
    pub rotation: Option<[f32; 4]>,
    pub scale: Option<[f32; 3]>,
    pub translation: Option<[f32; 3]>,
    /// Morph target weights overriding the mesh defaults.
    pub weights: Option<Vec<f32>>,
    pub name: Option<String>,
    pub extensions: Extensions,
    pub extras: Option<serde_json::Value>,
}

impl Node {
    /// Names of the TRS components this node declares.
    pub fn trs_components(&self) -> SmallVec<[&'static str; 3]> {
        let mut present = SmallVec::new();
        if self.translation.is_some() {
            present.push("translation");
        }
        if self.rotation.is_some() {
            present.push("rotation");
        }
        if self.scale.is_some() {
            present.push("scale");
        }
        present
    }

    /// Whether `matrix` is declared together with any TRS component.
    pub fn has_conflicting_transform(&self) -> bool {
        self.matrix.is_some()
            && (self.translation.is_some() || self.rotation.is_some() || self.scale.is_some())
    }

    /// The transform fields with values equal to their defaults dropped.
    ///
    /// A node with conflicting fields keeps all of them, and an animated node
    /// keeps its `matrix`, so neither mistake vanishes from the canonical form.
    pub fn canonical_transform(&self, animated: bool) -> NodeTransform {
        if self.has_conflicting_transform() {
            return NodeTransform {
                matrix: self.matrix,
                translation: self.translation,
                rotation: self.rotation,
                scale: self.scale,
            };
        }
        NodeTransform {
            matrix: if animated {
                self.matrix
            } else {
                unless_default(self.matrix, IDENTITY_MATRIX)
            },
            translation: unless_default(self.translation, DEFAULT_TRANSLATION),
            rotation: unless_default(self.rotation, DEFAULT_ROTATION),
            scale: unless_default(self.scale, DEFAULT_SCALE),
        }
    }

    /// The local transform: `matrix` when present, otherwise `T * R * S`.
    pub fn local_transform(&self) -> Mat4 {
        if let Some(matrix) = &self.matrix {
            return Mat4::from_cols_array(matrix);
        }
        let translation = self.translation.map_or(Vec3::ZERO, Vec3::from_array);
        let rotation = self.rotation.map_or(Quat::IDENTITY, Quat::from_array);
        let scale = self.scale.map_or(Vec3::ONE, Vec3::from_array);
        Mat4::from_scale_rotation_translation(scale, rotation, translation)
    }
}

/// A camera's projection.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub projection: Projection,
    pub name: Option<String>,
    pub extensions: Extensions,
    pub extras: Option<serde_json::Value>,
}

/// Perspective or orthographic projection parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    Perspective(Perspective),
    Orthographic(Orthographic),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Perspective {
    pub aspect_ratio: Option<f32>,
    /// Vertical field of view in radians.
    pub yfov: f32,
    /// Far clipping plane; infinite when absent.
    pub zfar: Option<f32>,
    pub znear: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Orthographic {
    pub xmag: f32,
    pub ymag: f32,
    pub zfar: f32,
    pub znear: f32,
}

/// The root nodes of a scene.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scene {
    pub nodes: Vec<usize>,
    pub name: Option<String>,
    pub extensions: Extensions,
    pub extras: Option<serde_json::Value>,
}

/// A keyframe animation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Animation {
    pub channels: Vec<Channel>,
    pub samplers: Vec<AnimationSampler>,
    pub name: Option<String>,
    pub extensions: Extensions,
    pub extras: Option<serde_json::Value>,
}

/// Binds an animation sampler to a node property.
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    /// Index into the owning animation's `samplers`.
    pub sampler: usize,
    pub target: ChannelTarget,
    pub extensions: Extensions,
    pub extras: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChannelTarget {
    /// Animated node; when absent, an extension is expected to define the target.
    pub node: Option<usize>,
    pub path: TargetPath,
    pub extensions: Extensions,
    pub extras: Option<serde_json::Value>,
}

/// Keyframe times and output values with an interpolation algorithm.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationSampler {
    pub input: usize,
    pub output: usize,
    pub interpolation: Interpolation,
    pub extensions: Extensions,
    pub extras: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_transform_identity() {
        let node = Node::default();
        assert_eq!(node.local_transform(), Mat4::IDENTITY);
    }

    #[test]
    fn test_canonical_transform_drops_defaults() {
        let node = Node {
            translation: Some(DEFAULT_TRANSLATION),
            rotation: Some(DEFAULT_ROTATION),
            scale: Some([2.0, 1.0, 1.0]),
            ..Default::default()
        };
        let transform = node.canonical_transform(false);
        assert_eq!(transform.translation, None);
        assert_eq!(transform.rotation, None);
        assert_eq!(transform.scale, Some([2.0, 1.0, 1.0]));

        let identity = Node {
            matrix: Some(IDENTITY_MATRIX),
            ..Default::default()
        };
        assert_eq!(identity.canonical_transform(false), NodeTransform::default());
        assert_eq!(
            identity.canonical_transform(true).matrix,
            Some(IDENTITY_MATRIX)
        );
    }

    #[test]
    fn test_canonical_transform_keeps_conflicts() {
        let node = Node {
            matrix: Some(IDENTITY_MATRIX),
            scale: Some(DEFAULT_SCALE),
            ..Default::default()
        };
        assert!(node.has_conflicting_transform());
        let transform = node.canonical_transform(false);
        assert_eq!(transform.matrix, Some(IDENTITY_MATRIX));
        assert_eq!(transform.scale, Some(DEFAULT_SCALE));
    }

    #[test]
    fn test_local_transform_trs_order() {
        let node = Node {
            translation: Some([1.0, 2.0, 3.0]),
            scale: Some([2.0, 2.0, 2.0]),
            ..Default::default()
        };
        let point = node.local_transform().transform_point3(Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(point, Vec3::new(3.0, 2.0, 3.0));
    }

    #[test]
    fn test_local_transform_prefers_matrix() {
        let mut matrix = Mat4::IDENTITY.to_cols_array();
        matrix[12] = 5.0;
        let node = Node {
            matrix: Some(matrix),
            translation: Some([1.0, 0.0, 0.0]),
            ..Default::default()
        };
        assert_eq!(node.local_transform().w_axis.x, 5.0);
        assert_eq!(node.trs_components().as_slice(), ["translation"]);
    }

    #[test]
    fn test_material_texture_refs() {
        let material = Material {
            pbr_metallic_roughness: Some(PbrMetallicRoughness {
                base_color_texture: Some(TextureInfo {
                    index: 2,
                    tex_coord: 0,
                    extensions: Extensions::new(),
                    extras: None,
                }),
                ..Default::default()
            }),
            emissive_texture: Some(TextureInfo {
                index: 4,
                tex_coord: 1,
                extensions: Extensions::new(),
                extras: None,
            }),
            ..Default::default()
        };
        let refs = material.texture_refs();
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0], ("pbrMetallicRoughness.baseColorTexture.index", 2));
        assert_eq!(refs[1], ("emissiveTexture.index", 4));
    }

    #[test]
    fn test_morph_target_count_from_first_primitive() {
        let mut primitive = Primitive::with_position(0);
        primitive.targets.push(Attributes::new());
        primitive.targets.push(Attributes::new());
        let mesh = Mesh {
            primitives: vec![primitive],
            ..Default::default()
        };
        assert_eq!(mesh.morph_target_count(), 2);
        assert_eq!(Mesh::default().morph_target_count(), 0);
    }

    #[test]
    fn test_len_of_matches_arrays() {
        let doc = Document {
            nodes: vec![Node::default(), Node::default()],
            scenes: vec![Scene::default()],
            ..Default::default()
        };
        assert_eq!(doc.len_of(EntityKind::Node), 2);
        assert_eq!(doc.len_of(EntityKind::Accessor), 0);
        assert_eq!(doc.entity_count(), 3);
    }
}

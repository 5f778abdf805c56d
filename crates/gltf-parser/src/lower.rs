//! Lowering from wire records to the schema model.
//!
//! Each `lower_*` function takes ownership of one wire record plus the path
//! it was found at, checks required fields and enum values, and fills in
//! the documented defaults. The first problem found stops lowering.

use std::str::FromStr;

use gltf_core::{
    Accessor, Animation, AnimationSampler, Asset, Attributes, Bounds, Buffer, BufferView, Camera,
    CameraType, Channel, ChannelTarget, Document, EntityKind, FieldPath, Image, ImageSource,
    Material, Mesh, Node, NormalTextureInfo, OcclusionTextureInfo, Orthographic, ParseError,
    PbrMetallicRoughness, Perspective, Primitive, Projection, Sampler, Scene, Skin, Sparse,
    SparseIndices, SparseValues, Texture, TextureInfo, UnknownVariant,
};

use crate::uri::parse_version;
use crate::wire::{
    WireAccessor, WireAnimation, WireAnimationSampler, WireAsset, WireBuffer, WireBufferView,
    WireCamera, WireChannel, WireDocument, WireImage, WireMaterial, WireMesh, WireNode,
    WirePbrMetallicRoughness, WirePrimitive, WireSampler, WireScene, WireSkin, WireSparse,
    WireTexture, WireTextureInfo,
};

type Result<T> = std::result::Result<T, ParseError>;

fn require<T>(value: Option<T>, at: &FieldPath, field: &'static str) -> Result<T> {
    value.ok_or_else(|| ParseError::MissingField {
        at: at.clone(),
        field,
    })
}

fn coded<E>(code: u32, at: &FieldPath, field: &str) -> Result<E>
where
    E: TryFrom<u32, Error = UnknownVariant>,
{
    E::try_from(code).map_err(|UnknownVariant(value)| ParseError::UnrecognizedEnumValue {
        at: at.join(field),
        value,
    })
}

fn named<E>(name: &str, at: &FieldPath, field: &str) -> Result<E>
where
    E: FromStr<Err = UnknownVariant>,
{
    name.parse()
        .map_err(|UnknownVariant(value)| ParseError::UnrecognizedEnumValue {
            at: at.join(field),
            value,
        })
}

fn lower_all<W, T>(
    items: Vec<W>,
    kind: EntityKind,
    lower: impl Fn(W, &FieldPath) -> Result<T>,
) -> Result<Vec<T>> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| lower(item, &FieldPath::new(kind, Some(index), "")))
        .collect()
}

pub(crate) fn lower_document(wire: WireDocument) -> Result<Document> {
    let root = FieldPath::root();
    let asset = lower_asset(require(wire.asset, &root, "asset")?)?;

    let default_scene = wire.scene;
    let scenes = wire
        .scenes
        .into_iter()
        .enumerate()
        .map(|(index, scene)| {
            let at = FieldPath::new(EntityKind::Scene, Some(index), "");
            lower_scene(scene, &at, default_scene == Some(index))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut doc = Document {
        asset,
        scene: default_scene,
        scenes,
        nodes: lower_all(wire.nodes, EntityKind::Node, lower_node)?,
        meshes: lower_all(wire.meshes, EntityKind::Mesh, lower_mesh)?,
        accessors: lower_all(wire.accessors, EntityKind::Accessor, lower_accessor)?,
        buffer_views: lower_all(wire.buffer_views, EntityKind::BufferView, lower_buffer_view)?,
        buffers: lower_all(wire.buffers, EntityKind::Buffer, lower_buffer)?,
        materials: lower_all(wire.materials, EntityKind::Material, lower_material)?,
        textures: lower_all(wire.textures, EntityKind::Texture, lower_texture)?,
        images: lower_all(wire.images, EntityKind::Image, lower_image)?,
        samplers: lower_all(wire.samplers, EntityKind::Sampler, lower_sampler)?,
        animations: lower_all(wire.animations, EntityKind::Animation, lower_animation)?,
        skins: lower_all(wire.skins, EntityKind::Skin, lower_skin)?,
        cameras: lower_all(wire.cameras, EntityKind::Camera, lower_camera)?,
        extensions_used: wire.extensions_used,
        extensions_required: wire.extensions_required,
        extensions: wire.extensions,
        extras: wire.extras,
    };
    doc.normalize_transforms();
    Ok(doc)
}

fn check_version(value: &str, at: &FieldPath, field: &str) -> Result<()> {
    match parse_version(value) {
        Some(_) => Ok(()),
        None => Err(ParseError::InvalidValue {
            at: at.join(field),
            reason: format!("expected <major>.<minor>, found \"{}\"", value),
        }),
    }
}

fn lower_asset(wire: WireAsset) -> Result<Asset> {
    let at = FieldPath::new(EntityKind::Asset, None, "");
    let version = require(wire.version, &at, "version")?;
    check_version(&version, &at, "version")?;
    if let Some(min_version) = &wire.min_version {
        check_version(min_version, &at, "minVersion")?;
    }
    Ok(Asset {
        version,
        min_version: wire.min_version,
        generator: wire.generator,
        copyright: wire.copyright,
        extensions: wire.extensions,
        extras: wire.extras,
    })
}

fn lower_accessor(wire: WireAccessor, at: &FieldPath) -> Result<Accessor> {
    let component_type = coded(
        require(wire.component_type, at, "componentType")?,
        at,
        "componentType",
    )?;
    let count = require(wire.count, at, "count")?;
    let accessor_type = named(require(wire.accessor_type.as_deref(), at, "type")?, at, "type")?;
    let sparse = wire
        .sparse
        .map(|sparse| lower_sparse(sparse, &at.join("sparse")))
        .transpose()?;

    Ok(Accessor {
        buffer_view: wire.buffer_view,
        byte_offset: wire.byte_offset.unwrap_or(0),
        component_type,
        normalized: wire.normalized.unwrap_or(false),
        count,
        accessor_type,
        min: wire.min.map(Bounds::from_vec),
        max: wire.max.map(Bounds::from_vec),
        sparse,
        name: wire.name,
        extensions: wire.extensions,
        extras: wire.extras,
    })
}

fn lower_sparse(wire: WireSparse, at: &FieldPath) -> Result<Sparse> {
    let count = require(wire.count, at, "count")?;
    let indices = require(wire.indices, at, "indices")?;
    let values = require(wire.values, at, "values")?;

    let indices_at = at.join("indices");
    let indices = SparseIndices {
        buffer_view: require(indices.buffer_view, &indices_at, "bufferView")?,
        byte_offset: indices.byte_offset.unwrap_or(0),
        component_type: coded(
            require(indices.component_type, &indices_at, "componentType")?,
            &indices_at,
            "componentType",
        )?,
        extensions: indices.extensions,
        extras: indices.extras,
    };

    let values_at = at.join("values");
    let values = SparseValues {
        buffer_view: require(values.buffer_view, &values_at, "bufferView")?,
        byte_offset: values.byte_offset.unwrap_or(0),
        extensions: values.extensions,
        extras: values.extras,
    };

    Ok(Sparse {
        count,
        indices,
        values,
        extensions: wire.extensions,
        extras: wire.extras,
    })
}

fn lower_buffer(wire: WireBuffer, at: &FieldPath) -> Result<Buffer> {
    Ok(Buffer {
        byte_length: require(wire.byte_length, at, "byteLength")?,
        uri: wire.uri,
        name: wire.name,
        extensions: wire.extensions,
        extras: wire.extras,
    })
}

fn lower_buffer_view(wire: WireBufferView, at: &FieldPath) -> Result<BufferView> {
    let buffer = require(wire.buffer, at, "buffer")?;
    let byte_length = require(wire.byte_length, at, "byteLength")?;
    if let Some(stride) = wire.byte_stride {
        if !(4..=252).contains(&stride) || stride % 4 != 0 {
            return Err(ParseError::InvalidValue {
                at: at.join("byteStride"),
                reason: format!("{} is not a multiple of 4 between 4 and 252", stride),
            });
        }
    }
    let target = wire
        .target
        .map(|code| coded(code, at, "target"))
        .transpose()?;

    Ok(BufferView {
        buffer,
        byte_offset: wire.byte_offset.unwrap_or(0),
        byte_length,
        byte_stride: wire.byte_stride,
        target,
        name: wire.name,
        extensions: wire.extensions,
        extras: wire.extras,
    })
}

fn lower_image(wire: WireImage, at: &FieldPath) -> Result<Image> {
    let mime_type = wire
        .mime_type
        .as_deref()
        .map(|mime| named(mime, at, "mimeType"))
        .transpose()?;

    let source = match (wire.uri, wire.buffer_view) {
        (Some(_), Some(_)) => {
            return Err(ParseError::ConflictingFields {
                at: at.clone(),
                first: "uri",
                second: "bufferView",
            })
        }
        (Some(uri), None) => ImageSource::Uri { uri, mime_type },
        (None, Some(buffer_view)) => ImageSource::BufferView {
            buffer_view,
            mime_type: require(mime_type, at, "mimeType")?,
        },
        (None, None) => {
            return Err(ParseError::MissingField {
                at: at.clone(),
                field: "uri",
            })
        }
    };

    Ok(Image {
        source,
        name: wire.name,
        extensions: wire.extensions,
        extras: wire.extras,
    })
}

fn lower_sampler(wire: WireSampler, at: &FieldPath) -> Result<Sampler> {
    Ok(Sampler {
        mag_filter: wire
            .mag_filter
            .map(|code| coded(code, at, "magFilter"))
            .transpose()?,
        min_filter: wire
            .min_filter
            .map(|code| coded(code, at, "minFilter"))
            .transpose()?,
        wrap_s: wire
            .wrap_s
            .map(|code| coded(code, at, "wrapS"))
            .transpose()?
            .unwrap_or_default(),
        wrap_t: wire
            .wrap_t
            .map(|code| coded(code, at, "wrapT"))
            .transpose()?
            .unwrap_or_default(),
        name: wire.name,
        extensions: wire.extensions,
        extras: wire.extras,
    })
}

fn lower_texture(wire: WireTexture, _at: &FieldPath) -> Result<Texture> {
    Ok(Texture {
        sampler: wire.sampler,
        source: wire.source,
        name: wire.name,
        extensions: wire.extensions,
        extras: wire.extras,
    })
}

fn lower_texture_info(wire: WireTextureInfo, at: &FieldPath) -> Result<TextureInfo> {
    Ok(TextureInfo {
        index: require(wire.index, at, "index")?,
        tex_coord: wire.tex_coord.unwrap_or(0),
        extensions: wire.extensions,
        extras: wire.extras,
    })
}

fn lower_material(wire: WireMaterial, at: &FieldPath) -> Result<Material> {
    let pbr_metallic_roughness = wire
        .pbr_metallic_roughness
        .map(|pbr| lower_pbr(pbr, &at.join("pbrMetallicRoughness")))
        .transpose()?;

    let normal_texture = match wire.normal_texture {
        Some(info) => {
            let info_at = at.join("normalTexture");
            Some(NormalTextureInfo {
                index: require(info.index, &info_at, "index")?,
                tex_coord: info.tex_coord.unwrap_or(0),
                scale: info.scale.unwrap_or(1.0),
                extensions: info.extensions,
                extras: info.extras,
            })
        }
        None => None,
    };

    let occlusion_texture = match wire.occlusion_texture {
        Some(info) => {
            let info_at = at.join("occlusionTexture");
            Some(OcclusionTextureInfo {
                index: require(info.index, &info_at, "index")?,
                tex_coord: info.tex_coord.unwrap_or(0),
                strength: info.strength.unwrap_or(1.0),
                extensions: info.extensions,
                extras: info.extras,
            })
        }
        None => None,
    };

    let emissive_texture = wire
        .emissive_texture
        .map(|info| lower_texture_info(info, &at.join("emissiveTexture")))
        .transpose()?;

    let defaults = Material::default();
    let alpha_mode = wire
        .alpha_mode
        .as_deref()
        .map(|mode| named(mode, at, "alphaMode"))
        .transpose()?
        .unwrap_or_default();

    Ok(Material {
        pbr_metallic_roughness,
        normal_texture,
        occlusion_texture,
        emissive_texture,
        emissive_factor: wire.emissive_factor.unwrap_or(defaults.emissive_factor),
        alpha_mode,
        alpha_cutoff: wire.alpha_cutoff.unwrap_or(defaults.alpha_cutoff),
        double_sided: wire.double_sided.unwrap_or(defaults.double_sided),
        name: wire.name,
        extensions: wire.extensions,
        extras: wire.extras,
    })
}

fn lower_pbr(wire: WirePbrMetallicRoughness, at: &FieldPath) -> Result<PbrMetallicRoughness> {
    let defaults = PbrMetallicRoughness::default();
    Ok(PbrMetallicRoughness {
        base_color_factor: wire.base_color_factor.unwrap_or(defaults.base_color_factor),
        base_color_texture: wire
            .base_color_texture
            .map(|info| lower_texture_info(info, &at.join("baseColorTexture")))
            .transpose()?,
        metallic_factor: wire.metallic_factor.unwrap_or(defaults.metallic_factor),
        roughness_factor: wire.roughness_factor.unwrap_or(defaults.roughness_factor),
        metallic_roughness_texture: wire
            .metallic_roughness_texture
            .map(|info| lower_texture_info(info, &at.join("metallicRoughnessTexture")))
            .transpose()?,
        extensions: wire.extensions,
        extras: wire.extras,
    })
}

fn lower_mesh(wire: WireMesh, at: &FieldPath) -> Result<Mesh> {
    let primitives = require(wire.primitives, at, "primitives")?
        .into_iter()
        .enumerate()
        .map(|(index, primitive)| {
            lower_primitive(primitive, &at.join(&format!("primitives[{}]", index)))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Mesh {
        primitives,
        weights: wire.weights,
        name: wire.name,
        extensions: wire.extensions,
        extras: wire.extras,
    })
}

fn lower_primitive(wire: WirePrimitive, at: &FieldPath) -> Result<Primitive> {
    let attributes: Attributes = require(wire.attributes, at, "attributes")?;
    if !attributes.contains_key("POSITION") {
        return Err(ParseError::MissingField {
            at: at.join("attributes"),
            field: "POSITION",
        });
    }
    let mode = wire
        .mode
        .map(|code| coded(code, at, "mode"))
        .transpose()?
        .unwrap_or_default();

    Ok(Primitive {
        attributes,
        indices: wire.indices,
        material: wire.material,
        mode,
        targets: wire.targets.unwrap_or_default(),
        extensions: wire.extensions,
        extras: wire.extras,
    })
}

fn lower_skin(wire: WireSkin, at: &FieldPath) -> Result<Skin> {
    Ok(Skin {
        joints: require(wire.joints, at, "joints")?,
        inverse_bind_matrices: wire.inverse_bind_matrices,
        skeleton: wire.skeleton,
        name: wire.name,
        extensions: wire.extensions,
        extras: wire.extras,
    })
}

fn lower_node(wire: WireNode, _at: &FieldPath) -> Result<Node> {
    Ok(Node {
        camera: wire.camera,
        children: wire.children.unwrap_or_default(),
        skin: wire.skin,
        matrix: wire.matrix,
        mesh: wire.mesh,
        rotation: wire.rotation,
        scale: wire.scale,
        translation: wire.translation,
        weights: wire.weights,
        name: wire.name,
        extensions: wire.extensions,
        extras: wire.extras,
    })
}

fn lower_camera(wire: WireCamera, at: &FieldPath) -> Result<Camera> {
    let camera_type: CameraType = named(require(wire.camera_type.as_deref(), at, "type")?, at, "type")?;
    if wire.perspective.is_some() && wire.orthographic.is_some() {
        return Err(ParseError::ConflictingFields {
            at: at.clone(),
            first: "perspective",
            second: "orthographic",
        });
    }

    let projection = match camera_type {
        CameraType::Perspective => {
            let wire = require(wire.perspective, at, "perspective")?;
            let at = at.join("perspective");
            Projection::Perspective(Perspective {
                aspect_ratio: wire.aspect_ratio,
                yfov: require(wire.yfov, &at, "yfov")?,
                zfar: wire.zfar,
                znear: require(wire.znear, &at, "znear")?,
            })
        }
        CameraType::Orthographic => {
            let wire = require(wire.orthographic, at, "orthographic")?;
            let at = at.join("orthographic");
            Projection::Orthographic(Orthographic {
                xmag: require(wire.xmag, &at, "xmag")?,
                ymag: require(wire.ymag, &at, "ymag")?,
                zfar: require(wire.zfar, &at, "zfar")?,
                znear: require(wire.znear, &at, "znear")?,
            })
        }
    };

    Ok(Camera {
        projection,
        name: wire.name,
        extensions: wire.extensions,
        extras: wire.extras,
    })
}

fn lower_scene(wire: WireScene, at: &FieldPath, is_default: bool) -> Result<Scene> {
    let nodes = if is_default {
        require(wire.nodes, at, "nodes")?
    } else {
        wire.nodes.unwrap_or_default()
    };
    Ok(Scene {
        nodes,
        name: wire.name,
        extensions: wire.extensions,
        extras: wire.extras,
    })
}

fn lower_animation(wire: WireAnimation, at: &FieldPath) -> Result<Animation> {
    let channels = require(wire.channels, at, "channels")?
        .into_iter()
        .enumerate()
        .map(|(index, channel)| lower_channel(channel, &at.join(&format!("channels[{}]", index))))
        .collect::<Result<Vec<_>>>()?;
    let samplers = require(wire.samplers, at, "samplers")?
        .into_iter()
        .enumerate()
        .map(|(index, sampler)| {
            lower_animation_sampler(sampler, &at.join(&format!("samplers[{}]", index)))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Animation {
        channels,
        samplers,
        name: wire.name,
        extensions: wire.extensions,
        extras: wire.extras,
    })
}

fn lower_channel(wire: WireChannel, at: &FieldPath) -> Result<Channel> {
    let sampler = require(wire.sampler, at, "sampler")?;
    let target = require(wire.target, at, "target")?;
    let target_at = at.join("target");
    let path = named(require(target.path.as_deref(), &target_at, "path")?, &target_at, "path")?;

    Ok(Channel {
        sampler,
        target: ChannelTarget {
            node: target.node,
            path,
            extensions: target.extensions,
            extras: target.extras,
        },
        extensions: wire.extensions,
        extras: wire.extras,
    })
}

fn lower_animation_sampler(wire: WireAnimationSampler, at: &FieldPath) -> Result<AnimationSampler> {
    Ok(AnimationSampler {
        input: require(wire.input, at, "input")?,
        output: require(wire.output, at, "output")?,
        interpolation: wire
            .interpolation
            .as_deref()
            .map(|name| named(name, at, "interpolation"))
            .transpose()?
            .unwrap_or_default(),
        extensions: wire.extensions,
        extras: wire.extras,
    })
}

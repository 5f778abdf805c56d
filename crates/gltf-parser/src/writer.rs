//! Canonical JSON writer.
//!
//! Raises the schema model back into wire records. Values equal to their
//! documented default and empty optional arrays are left out, so two documents
//! that differ only in spelled-out defaults serialize to the same bytes.

use gltf_core::{
    Accessor, Animation, Asset, Buffer, BufferView, Camera, Document, GltfError, Image,
    ImageSource, Material, Mesh, Node, PbrMetallicRoughness, Primitive, Projection, Sampler, Scene,
    Skin, Sparse, Texture, TextureInfo, WrapMode,
};

use crate::wire::{
    WireAccessor, WireAnimation, WireAnimationSampler, WireAsset, WireBuffer, WireBufferView,
    WireCamera, WireChannel, WireChannelTarget, WireDocument, WireImage, WireMaterial, WireMesh,
    WireNode, WireOrthographic, WirePbrMetallicRoughness, WirePerspective, WirePrimitive,
    WireSampler, WireScene, WireSkin, WireSparse, WireSparseIndices, WireSparseValues,
    WireTexture, WireTextureInfo,
};

/// Serialize a document as compact canonical JSON.
pub fn serialize(doc: &Document) -> Result<Vec<u8>, GltfError> {
    Ok(serde_json::to_vec(&raise_document(doc))?)
}

/// Serialize a document as indented canonical JSON.
pub fn serialize_pretty(doc: &Document) -> Result<Vec<u8>, GltfError> {
    Ok(serde_json::to_vec_pretty(&raise_document(doc))?)
}

fn unless_default<T: PartialEq>(value: T, default: T) -> Option<T> {
    (value != default).then_some(value)
}

fn unless_empty<T: Clone>(items: &[T]) -> Option<Vec<T>> {
    (!items.is_empty()).then(|| items.to_vec())
}

fn raise_document(doc: &Document) -> WireDocument {
    WireDocument {
        extensions_used: doc.extensions_used.clone(),
        extensions_required: doc.extensions_required.clone(),
        accessors: doc.accessors.iter().map(raise_accessor).collect(),
        animations: doc.animations.iter().map(raise_animation).collect(),
        asset: Some(raise_asset(&doc.asset)),
        buffers: doc.buffers.iter().map(raise_buffer).collect(),
        buffer_views: doc.buffer_views.iter().map(raise_buffer_view).collect(),
        cameras: doc.cameras.iter().map(raise_camera).collect(),
        images: doc.images.iter().map(raise_image).collect(),
        materials: doc.materials.iter().map(raise_material).collect(),
        meshes: doc.meshes.iter().map(raise_mesh).collect(),
        nodes: doc
            .nodes
            .iter()
            .zip(doc.animated_nodes())
            .map(|(node, animated)| raise_node(node, animated))
            .collect(),
        samplers: doc.samplers.iter().map(raise_sampler).collect(),
        scene: doc.scene,
        scenes: doc.scenes.iter().map(raise_scene).collect(),
        skins: doc.skins.iter().map(raise_skin).collect(),
        textures: doc.textures.iter().map(raise_texture).collect(),
        extensions: doc.extensions.clone(),
        extras: doc.extras.clone(),
    }
}

fn raise_asset(asset: &Asset) -> WireAsset {
    WireAsset {
        copyright: asset.copyright.clone(),
        generator: asset.generator.clone(),
        version: Some(asset.version.clone()),
        min_version: asset.min_version.clone(),
        extensions: asset.extensions.clone(),
        extras: asset.extras.clone(),
    }
}

fn raise_accessor(accessor: &Accessor) -> WireAccessor {
    WireAccessor {
        buffer_view: accessor.buffer_view,
        byte_offset: unless_default(accessor.byte_offset, 0),
        component_type: Some(accessor.component_type.code()),
        normalized: unless_default(accessor.normalized, false),
        count: Some(accessor.count),
        accessor_type: Some(accessor.accessor_type.as_str().to_string()),
        max: accessor.max.as_ref().map(|bounds| bounds.to_vec()),
        min: accessor.min.as_ref().map(|bounds| bounds.to_vec()),
        sparse: accessor.sparse.as_ref().map(raise_sparse),
        name: accessor.name.clone(),
        extensions: accessor.extensions.clone(),
        extras: accessor.extras.clone(),
    }
}

fn raise_sparse(sparse: &Sparse) -> WireSparse {
    WireSparse {
        count: Some(sparse.count),
        indices: Some(WireSparseIndices {
            buffer_view: Some(sparse.indices.buffer_view),
            byte_offset: unless_default(sparse.indices.byte_offset, 0),
            component_type: Some(sparse.indices.component_type.code()),
            extensions: sparse.indices.extensions.clone(),
            extras: sparse.indices.extras.clone(),
        }),
        values: Some(WireSparseValues {
            buffer_view: Some(sparse.values.buffer_view),
            byte_offset: unless_default(sparse.values.byte_offset, 0),
            extensions: sparse.values.extensions.clone(),
            extras: sparse.values.extras.clone(),
        }),
        extensions: sparse.extensions.clone(),
        extras: sparse.extras.clone(),
    }
}

fn raise_animation(animation: &Animation) -> WireAnimation {
    let channels = animation
        .channels
        .iter()
        .map(|channel| WireChannel {
            sampler: Some(channel.sampler),
            target: Some(WireChannelTarget {
                node: channel.target.node,
                path: Some(channel.target.path.as_str().to_string()),
                extensions: channel.target.extensions.clone(),
                extras: channel.target.extras.clone(),
            }),
            extensions: channel.extensions.clone(),
            extras: channel.extras.clone(),
        })
        .collect();
    let samplers = animation
        .samplers
        .iter()
        .map(|sampler| WireAnimationSampler {
            input: Some(sampler.input),
            interpolation: unless_default(sampler.interpolation, Default::default())
                .map(|interpolation| interpolation.as_str().to_string()),
            output: Some(sampler.output),
            extensions: sampler.extensions.clone(),
            extras: sampler.extras.clone(),
        })
        .collect();

    WireAnimation {
        channels: Some(channels),
        samplers: Some(samplers),
        name: animation.name.clone(),
        extensions: animation.extensions.clone(),
        extras: animation.extras.clone(),
    }
}

fn raise_buffer(buffer: &Buffer) -> WireBuffer {
    WireBuffer {
        uri: buffer.uri.clone(),
        byte_length: Some(buffer.byte_length),
        name: buffer.name.clone(),
        extensions: buffer.extensions.clone(),
        extras: buffer.extras.clone(),
    }
}

fn raise_buffer_view(view: &BufferView) -> WireBufferView {
    WireBufferView {
        buffer: Some(view.buffer),
        byte_offset: unless_default(view.byte_offset, 0),
        byte_length: Some(view.byte_length),
        byte_stride: view.byte_stride,
        target: view.target.map(|target| target.code()),
        name: view.name.clone(),
        extensions: view.extensions.clone(),
        extras: view.extras.clone(),
    }
}

fn raise_camera(camera: &Camera) -> WireCamera {
    let (camera_type, perspective, orthographic) = match &camera.projection {
        Projection::Perspective(p) => (
            "perspective",
            Some(WirePerspective {
                aspect_ratio: p.aspect_ratio,
                yfov: Some(p.yfov),
                zfar: p.zfar,
                znear: Some(p.znear),
            }),
            None,
        ),
        Projection::Orthographic(o) => (
            "orthographic",
            None,
            Some(WireOrthographic {
                xmag: Some(o.xmag),
                ymag: Some(o.ymag),
                zfar: Some(o.zfar),
                znear: Some(o.znear),
            }),
        ),
    };

    WireCamera {
        orthographic,
        perspective,
        camera_type: Some(camera_type.to_string()),
        name: camera.name.clone(),
        extensions: camera.extensions.clone(),
        extras: camera.extras.clone(),
    }
}

fn raise_image(image: &Image) -> WireImage {
    let (uri, buffer_view, mime_type) = match &image.source {
        ImageSource::Uri { uri, mime_type } => (Some(uri.clone()), None, *mime_type),
        ImageSource::BufferView {
            buffer_view,
            mime_type,
        } => (None, Some(*buffer_view), Some(*mime_type)),
    };

    WireImage {
        uri,
        mime_type: mime_type.map(|mime| mime.as_str().to_string()),
        buffer_view,
        name: image.name.clone(),
        extensions: image.extensions.clone(),
        extras: image.extras.clone(),
    }
}

fn raise_texture_info(info: &TextureInfo) -> WireTextureInfo {
    WireTextureInfo {
        index: Some(info.index),
        tex_coord: unless_default(info.tex_coord, 0),
        scale: None,
        strength: None,
        extensions: info.extensions.clone(),
        extras: info.extras.clone(),
    }
}

fn raise_material(material: &Material) -> WireMaterial {
    let defaults = Material::default();
    WireMaterial {
        name: material.name.clone(),
        pbr_metallic_roughness: material.pbr_metallic_roughness.as_ref().map(raise_pbr),
        normal_texture: material.normal_texture.as_ref().map(|info| WireTextureInfo {
            index: Some(info.index),
            tex_coord: unless_default(info.tex_coord, 0),
            scale: unless_default(info.scale, 1.0),
            strength: None,
            extensions: info.extensions.clone(),
            extras: info.extras.clone(),
        }),
        occlusion_texture: material.occlusion_texture.as_ref().map(|info| WireTextureInfo {
            index: Some(info.index),
            tex_coord: unless_default(info.tex_coord, 0),
            scale: None,
            strength: unless_default(info.strength, 1.0),
            extensions: info.extensions.clone(),
            extras: info.extras.clone(),
        }),
        emissive_texture: material.emissive_texture.as_ref().map(raise_texture_info),
        emissive_factor: unless_default(material.emissive_factor, defaults.emissive_factor),
        alpha_mode: unless_default(material.alpha_mode, defaults.alpha_mode)
            .map(|mode| mode.as_str().to_string()),
        alpha_cutoff: unless_default(material.alpha_cutoff, defaults.alpha_cutoff),
        double_sided: unless_default(material.double_sided, defaults.double_sided),
        extensions: material.extensions.clone(),
        extras: material.extras.clone(),
    }
}

fn raise_pbr(pbr: &PbrMetallicRoughness) -> WirePbrMetallicRoughness {
    let defaults = PbrMetallicRoughness::default();
    WirePbrMetallicRoughness {
        base_color_factor: unless_default(pbr.base_color_factor, defaults.base_color_factor),
        base_color_texture: pbr.base_color_texture.as_ref().map(raise_texture_info),
        metallic_factor: unless_default(pbr.metallic_factor, defaults.metallic_factor),
        roughness_factor: unless_default(pbr.roughness_factor, defaults.roughness_factor),
        metallic_roughness_texture: pbr.metallic_roughness_texture.as_ref().map(raise_texture_info),
        extensions: pbr.extensions.clone(),
        extras: pbr.extras.clone(),
    }
}

fn raise_mesh(mesh: &Mesh) -> WireMesh {
    WireMesh {
        primitives: Some(mesh.primitives.iter().map(raise_primitive).collect()),
        weights: mesh.weights.clone(),
        name: mesh.name.clone(),
        extensions: mesh.extensions.clone(),
        extras: mesh.extras.clone(),
    }
}

fn raise_primitive(primitive: &Primitive) -> WirePrimitive {
    WirePrimitive {
        attributes: Some(primitive.attributes.clone()),
        indices: primitive.indices,
        material: primitive.material,
        mode: unless_default(primitive.mode, Default::default()).map(|mode| mode.code()),
        targets: unless_empty(&primitive.targets),
        extensions: primitive.extensions.clone(),
        extras: primitive.extras.clone(),
    }
}

fn raise_node(node: &Node, animated: bool) -> WireNode {
    let transform = node.canonical_transform(animated);
    WireNode {
        camera: node.camera,
        children: unless_empty(&node.children),
        skin: node.skin,
        matrix: transform.matrix,
        mesh: node.mesh,
        rotation: transform.rotation,
        scale: transform.scale,
        translation: transform.translation,
        weights: node.weights.clone(),
        name: node.name.clone(),
        extensions: node.extensions.clone(),
        extras: node.extras.clone(),
    }
}

fn raise_sampler(sampler: &Sampler) -> WireSampler {
    WireSampler {
        mag_filter: sampler.mag_filter.map(|filter| filter.code()),
        min_filter: sampler.min_filter.map(|filter| filter.code()),
        wrap_s: unless_default(sampler.wrap_s, WrapMode::Repeat).map(|wrap| wrap.code()),
        wrap_t: unless_default(sampler.wrap_t, WrapMode::Repeat).map(|wrap| wrap.code()),
        name: sampler.name.clone(),
        extensions: sampler.extensions.clone(),
        extras: sampler.extras.clone(),
    }
}

// Scene nodes are always written: the default scene requires them on read.
fn raise_scene(scene: &Scene) -> WireScene {
    WireScene {
        nodes: Some(scene.nodes.clone()),
        name: scene.name.clone(),
        extensions: scene.extensions.clone(),
        extras: scene.extras.clone(),
    }
}

fn raise_skin(skin: &Skin) -> WireSkin {
    WireSkin {
        inverse_bind_matrices: skin.inverse_bind_matrices,
        skeleton: skin.skeleton,
        joints: Some(skin.joints.clone()),
        name: skin.name.clone(),
        extensions: skin.extensions.clone(),
        extras: skin.extras.clone(),
    }
}

fn raise_texture(texture: &Texture) -> WireTexture {
    WireTexture {
        sampler: texture.sampler,
        source: texture.source,
        name: texture.name.clone(),
        extensions: texture.extensions.clone(),
        extras: texture.extras.clone(),
    }
}

//! Index reference checks.
//!
//! Walks every index-valued field of a document and confirms it lands inside
//! the array it points into. All violations are collected in one pass.

use gltf_core::{
    Accessor, Animation, Attributes, Document, EntityKind, Image, Material, Mesh, Node,
    ReferenceError, Scene, Skin, Texture,
};

/// Collect every dangling reference in `doc`.
pub fn dangling_references(doc: &Document) -> Vec<ReferenceError> {
    let mut checker = ReferenceChecker::new(doc);
    checker.check_document();
    checker.errors
}

/// The entity whose fields are being checked.
#[derive(Clone, Copy)]
struct Owner {
    kind: EntityKind,
    index: Option<usize>,
}

impl Owner {
    fn at(kind: EntityKind, index: usize) -> Self {
        Self {
            kind,
            index: Some(index),
        }
    }
}

struct ReferenceChecker<'a> {
    doc: &'a Document,
    errors: Vec<ReferenceError>,
}

impl<'a> ReferenceChecker<'a> {
    fn new(doc: &'a Document) -> Self {
        Self {
            doc,
            errors: Vec::new(),
        }
    }

    /// Check `index` against the top-level array of `target`.
    fn check(&mut self, owner: Owner, field: impl FnOnce() -> String, index: usize, target: EntityKind) {
        let available = self.doc.len_of(target);
        self.check_len(owner, field, index, target, available);
    }

    fn check_len(
        &mut self,
        owner: Owner,
        field: impl FnOnce() -> String,
        index: usize,
        target: EntityKind,
        available: usize,
    ) {
        if index >= available {
            self.errors.push(ReferenceError::DanglingReference {
                entity_kind: owner.kind,
                entity_index: owner.index,
                field: field(),
                referenced_index: index,
                target_kind: target,
                available,
            });
        }
    }

    fn check_opt(
        &mut self,
        owner: Owner,
        field: &str,
        index: Option<usize>,
        target: EntityKind,
    ) {
        if let Some(index) = index {
            self.check(owner, || field.to_string(), index, target);
        }
    }

    fn check_list(&mut self, owner: Owner, field: &str, indices: &[usize], target: EntityKind) {
        for (position, &index) in indices.iter().enumerate() {
            self.check(owner, || format!("{}[{}]", field, position), index, target);
        }
    }

    fn check_document(&mut self) {
        let doc = self.doc;
        let root = Owner {
            kind: EntityKind::Document,
            index: None,
        };
        self.check_opt(root, "scene", doc.scene, EntityKind::Scene);

        for (i, scene) in doc.scenes.iter().enumerate() {
            self.check_scene(Owner::at(EntityKind::Scene, i), scene);
        }
        for (i, node) in doc.nodes.iter().enumerate() {
            self.check_node(Owner::at(EntityKind::Node, i), node);
        }
        for (i, mesh) in doc.meshes.iter().enumerate() {
            self.check_mesh(Owner::at(EntityKind::Mesh, i), mesh);
        }
        for (i, accessor) in doc.accessors.iter().enumerate() {
            self.check_accessor(Owner::at(EntityKind::Accessor, i), accessor);
        }
        for (i, view) in doc.buffer_views.iter().enumerate() {
            let owner = Owner::at(EntityKind::BufferView, i);
            self.check(owner, || "buffer".to_string(), view.buffer, EntityKind::Buffer);
        }
        for (i, image) in doc.images.iter().enumerate() {
            self.check_image(Owner::at(EntityKind::Image, i), image);
        }
        for (i, texture) in doc.textures.iter().enumerate() {
            self.check_texture(Owner::at(EntityKind::Texture, i), texture);
        }
        for (i, material) in doc.materials.iter().enumerate() {
            self.check_material(Owner::at(EntityKind::Material, i), material);
        }
        for (i, skin) in doc.skins.iter().enumerate() {
            self.check_skin(Owner::at(EntityKind::Skin, i), skin);
        }
        for (i, animation) in doc.animations.iter().enumerate() {
            self.check_animation(Owner::at(EntityKind::Animation, i), animation);
        }
    }

    fn check_scene(&mut self, owner: Owner, scene: &Scene) {
        self.check_list(owner, "nodes", &scene.nodes, EntityKind::Node);
    }

    fn check_node(&mut self, owner: Owner, node: &Node) {
        self.check_opt(owner, "camera", node.camera, EntityKind::Camera);
        self.check_opt(owner, "mesh", node.mesh, EntityKind::Mesh);
        self.check_opt(owner, "skin", node.skin, EntityKind::Skin);
        self.check_list(owner, "children", &node.children, EntityKind::Node);
    }

    fn check_attributes(&mut self, owner: Owner, prefix: &str, attributes: &Attributes) {
        for (semantic, &accessor) in attributes {
            self.check(
                owner,
                || format!("{}.{}", prefix, semantic),
                accessor,
                EntityKind::Accessor,
            );
        }
    }

    fn check_mesh(&mut self, owner: Owner, mesh: &Mesh) {
        for (p, primitive) in mesh.primitives.iter().enumerate() {
            let prefix = format!("primitives[{}]", p);
            self.check_attributes(owner, &format!("{}.attributes", prefix), &primitive.attributes);
            if let Some(indices) = primitive.indices {
                self.check(owner, || format!("{}.indices", prefix), indices, EntityKind::Accessor);
            }
            if let Some(material) = primitive.material {
                self.check(owner, || format!("{}.material", prefix), material, EntityKind::Material);
            }
            for (t, target) in primitive.targets.iter().enumerate() {
                self.check_attributes(owner, &format!("{}.targets[{}]", prefix, t), target);
            }
        }
    }

    fn check_accessor(&mut self, owner: Owner, accessor: &Accessor) {
        self.check_opt(owner, "bufferView", accessor.buffer_view, EntityKind::BufferView);
        if let Some(sparse) = &accessor.sparse {
            self.check(
                owner,
                || "sparse.indices.bufferView".to_string(),
                sparse.indices.buffer_view,
                EntityKind::BufferView,
            );
            self.check(
                owner,
                || "sparse.values.bufferView".to_string(),
                sparse.values.buffer_view,
                EntityKind::BufferView,
            );
        }
    }

    fn check_image(&mut self, owner: Owner, image: &Image) {
        self.check_opt(owner, "bufferView", image.source.buffer_view(), EntityKind::BufferView);
    }

    fn check_texture(&mut self, owner: Owner, texture: &Texture) {
        self.check_opt(owner, "sampler", texture.sampler, EntityKind::Sampler);
        self.check_opt(owner, "source", texture.source, EntityKind::Image);
    }

    fn check_material(&mut self, owner: Owner, material: &Material) {
        for (field, index) in material.texture_refs() {
            self.check(owner, || field.to_string(), index, EntityKind::Texture);
        }
    }

    fn check_skin(&mut self, owner: Owner, skin: &Skin) {
        self.check_opt(
            owner,
            "inverseBindMatrices",
            skin.inverse_bind_matrices,
            EntityKind::Accessor,
        );
        self.check_opt(owner, "skeleton", skin.skeleton, EntityKind::Node);
        self.check_list(owner, "joints", &skin.joints, EntityKind::Node);
    }

    fn check_animation(&mut self, owner: Owner, animation: &Animation) {
        let samplers = animation.samplers.len();
        for (c, channel) in animation.channels.iter().enumerate() {
            self.check_len(
                owner,
                || format!("channels[{}].sampler", c),
                channel.sampler,
                EntityKind::AnimationSampler,
                samplers,
            );
            if let Some(node) = channel.target.node {
                self.check(owner, || format!("channels[{}].target.node", c), node, EntityKind::Node);
            }
        }
        for (s, sampler) in animation.samplers.iter().enumerate() {
            self.check(owner, || format!("samplers[{}].input", s), sampler.input, EntityKind::Accessor);
            self.check(owner, || format!("samplers[{}].output", s), sampler.output, EntityKind::Accessor);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gltf_core::{Diagnostic, Primitive, Stage};

    fn parse(json: &str) -> Document {
        gltf_parser::parse(json.as_bytes()).unwrap()
    }

    #[test]
    fn test_clean_document() {
        let doc = parse(
            r#"{"asset":{"version":"2.0"},"scene":0,"scenes":[{"nodes":[0]}],"nodes":[{"children":[1]},{}]}"#,
        );
        assert!(dangling_references(&doc).is_empty());
    }

    #[test]
    fn test_node_mesh_out_of_range() {
        let doc = Document {
            nodes: vec![Node::default(), Node::default(), Node { mesh: Some(7), ..Default::default() }],
            meshes: vec![Mesh { primitives: vec![Primitive::with_position(0)], ..Default::default() }],
            ..Default::default()
        };
        let errors = dangling_references(&doc);
        // The primitive's POSITION accessor dangles too.
        assert_eq!(errors.len(), 2);
        let entry = errors[0].to_entry(Stage::References);
        assert_eq!(entry.entity_kind, EntityKind::Node);
        assert_eq!(entry.entity_index, Some(2));
        assert_eq!(entry.message, "node 2: mesh references mesh 7, but only 1 exist");
        assert_eq!(
            errors[1].to_string(),
            "mesh 0: primitives[0].attributes.POSITION references accessor 0, but only 0 exist"
        );
    }

    #[test]
    fn test_root_scene_out_of_range() {
        let doc = parse(r#"{"asset":{"version":"2.0"},"scene":2,"scenes":[{"nodes":[]}]}"#);
        let errors = dangling_references(&doc);
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].to_string(),
            "document: scene references scene 2, but only 1 exist"
        );
    }

    #[test]
    fn test_collects_all_violations() {
        let doc = parse(
            r#"{"asset":{"version":"2.0"},
            "scenes":[{"nodes":[0,5]}],
            "nodes":[{"children":[9],"camera":0,"skin":1}],
            "textures":[{"sampler":0,"source":0}],
            "materials":[{"pbrMetallicRoughness":{"baseColorTexture":{"index":3}},"normalTexture":{"index":0}}],
            "bufferViews":[{"buffer":0,"byteLength":4}],
            "images":[{"bufferView":1,"mimeType":"image/png"}]}"#,
        );
        let fields: Vec<String> = dangling_references(&doc)
            .iter()
            .map(|err| match err {
                ReferenceError::DanglingReference { field, .. } => field.clone(),
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(
            fields,
            vec![
                "nodes[1]",
                "camera",
                "skin",
                "children[0]",
                "buffer",
                "bufferView",
                "sampler",
                "pbrMetallicRoughness.baseColorTexture.index",
            ]
        );
    }

    #[test]
    fn test_animation_sampler_scoped_to_animation() {
        let doc = parse(
            r#"{"asset":{"version":"2.0"},
            "accessors":[{"componentType":5126,"count":2,"type":"SCALAR"}],
            "nodes":[{}],
            "animations":[{"channels":[{"sampler":1,"target":{"node":0,"path":"translation"}}],
                           "samplers":[{"input":0,"output":3}]}]}"#,
        );
        let errors = dangling_references(&doc);
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors[0].to_string(),
            "animation 0: channels[0].sampler references animation sampler 1, but only 1 exist"
        );
        assert!(matches!(
            &errors[1],
            ReferenceError::DanglingReference { field, referenced_index: 3, .. } if field == "samplers[0].output"
        ));
    }

    #[test]
    fn test_sparse_and_morph_target_references() {
        let doc = parse(
            r#"{"asset":{"version":"2.0"},
            "accessors":[{"componentType":5126,"count":2,"type":"VEC3",
                "sparse":{"count":1,"indices":{"bufferView":4,"componentType":5121},"values":{"bufferView":5}}}],
            "meshes":[{"primitives":[{"attributes":{"POSITION":0},"targets":[{"POSITION":2}]}]}]}"#,
        );
        let fields: Vec<String> = dangling_references(&doc)
            .into_iter()
            .filter_map(|err| match err {
                ReferenceError::DanglingReference { field, .. } => Some(field),
                _ => None,
            })
            .collect();
        assert_eq!(
            fields,
            vec![
                "primitives[0].targets[0].POSITION",
                "sparse.indices.bufferView",
                "sparse.values.bufferView",
            ]
        );
    }
}

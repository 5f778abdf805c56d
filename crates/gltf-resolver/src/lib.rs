//! Reference resolution for glTF documents.
//!
//! This crate checks:
//! - Index references (every index field points inside its target array)
//! - The node hierarchy (the `children` lists form a forest)
//!
//! Both checks collect every problem they find instead of stopping at the
//! first one. The resulting [`ReferenceReport`] also carries the node parent
//! map that later stages use to reason about ancestry.

mod hierarchy;
mod references;

pub use references::dangling_references;

use gltf_core::{Diagnostic, Document, ReferenceError, ReportEntry, Stage};
use tracing::debug;

/// Outcome of reference resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceReport {
    errors: Vec<ReferenceError>,
    parents: Vec<Option<usize>>,
}

impl ReferenceReport {
    /// Whether no reference or hierarchy error was found.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[ReferenceError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// First node listing `node` as a child.
    pub fn parent(&self, node: usize) -> Option<usize> {
        self.parents.get(node).copied().flatten()
    }

    /// First parent of every node, indexed like `Document::nodes`.
    pub fn parents(&self) -> &[Option<usize>] {
        &self.parents
    }

    /// Ancestors of `node`, nearest first, following first parents.
    ///
    /// Stops after visiting as many nodes as the document holds, so the walk
    /// terminates even when the hierarchy is cyclic.
    pub fn ancestors(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        let mut current = node;
        std::iter::from_fn(move || {
            let parent = self.parent(current)?;
            current = parent;
            Some(parent)
        })
        .take(self.parents.len())
    }

    /// Flatten into report entries.
    pub fn to_entries(&self) -> Vec<ReportEntry> {
        self.errors
            .iter()
            .map(|err| err.to_entry(Stage::References))
            .collect()
    }
}

/// Check every index reference and the node hierarchy of `doc`.
pub fn check_references(doc: &Document) -> ReferenceReport {
    let mut errors = dangling_references(doc);
    let dangling = errors.len();

    let hierarchy = hierarchy::analyze(doc);
    errors.extend(
        hierarchy
            .violations
            .into_iter()
            .map(ReferenceError::InvalidHierarchy),
    );

    debug!(
        dangling,
        hierarchy = errors.len() - dangling,
        nodes = doc.nodes.len(),
        "checked references"
    );

    ReferenceReport {
        errors,
        parents: hierarchy.parents,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gltf_core::{EntityKind, ErrorKind, HierarchyViolation};
    use proptest::prelude::*;

    fn parse(json: &str) -> Document {
        gltf_parser::parse(json.as_bytes()).unwrap()
    }

    #[test]
    fn test_minimal_document_is_clean() {
        let doc = parse(
            r#"{"asset":{"version":"2.0"},"scenes":[{"nodes":[0]}],"nodes":[{"children":[1]},{}]}"#,
        );
        let report = check_references(&doc);
        assert!(report.is_clean());
        assert_eq!(report.parents(), &[None, Some(0)]);
        assert_eq!(report.ancestors(1).collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn test_scene_cycle_reported_once() {
        let doc = parse(
            r#"{"asset":{"version":"2.0"},"scenes":[{"nodes":[0]}],"nodes":[{"children":[1]},{"children":[0]}]}"#,
        );
        let report = check_references(&doc);
        assert_eq!(report.len(), 1);
        assert_eq!(
            report.errors()[0],
            ReferenceError::InvalidHierarchy(HierarchyViolation::Cycle { cycle: vec![0, 1] })
        );
        let entries = report.to_entries();
        assert_eq!(entries[0].stage, Stage::References);
        assert_eq!(entries[0].error_kind, ErrorKind::InvalidHierarchy);
        assert_eq!(entries[0].entity_kind, EntityKind::Node);
        assert_eq!(entries[0].entity_index, Some(0));
    }

    #[test]
    fn test_ancestors_terminate_on_cycle() {
        let doc = parse(
            r#"{"asset":{"version":"2.0"},"nodes":[{"children":[1]},{"children":[2]},{"children":[0]}]}"#,
        );
        let report = check_references(&doc);
        assert_eq!(report.ancestors(0).count(), 3);
    }

    #[test]
    fn test_dangling_before_hierarchy() {
        let doc = parse(
            r#"{"asset":{"version":"2.0"},"nodes":[{"children":[2,4]},{"children":[2]},{"mesh":0}]}"#,
        );
        let kinds: Vec<ErrorKind> = report_kinds(&check_references(&doc));
        assert_eq!(
            kinds,
            vec![
                ErrorKind::DanglingReference,
                ErrorKind::DanglingReference,
                ErrorKind::InvalidHierarchy
            ]
        );
    }

    fn report_kinds(report: &ReferenceReport) -> Vec<ErrorKind> {
        report.errors().iter().map(|e| e.error_kind()).collect()
    }

    fn arb_children(count: usize) -> impl Strategy<Value = Vec<Vec<usize>>> {
        prop::collection::vec(prop::collection::vec(0..count + 2, 0..4), count)
    }

    fn document_from(children: Vec<Vec<usize>>, mesh_refs: Vec<Option<usize>>) -> Document {
        Document {
            nodes: children
                .into_iter()
                .zip(mesh_refs)
                .map(|(children, mesh)| gltf_core::Node {
                    children,
                    mesh,
                    ..Default::default()
                })
                .collect(),
            meshes: vec![gltf_core::Mesh::default(); 2],
            ..Default::default()
        }
    }

    proptest! {
        #[test]
        fn prop_clean_report_means_indices_in_range(
            children in arb_children(6),
            meshes in prop::collection::vec(prop::option::of(0usize..4), 6),
        ) {
            let doc = document_from(children, meshes);
            let report = check_references(&doc);
            let dangling = report
                .errors()
                .iter()
                .any(|e| e.error_kind() == ErrorKind::DanglingReference);
            if !dangling {
                for node in &doc.nodes {
                    prop_assert!(node.children.iter().all(|&c| c < doc.nodes.len()));
                    prop_assert!(node.mesh.map_or(true, |m| m < doc.meshes.len()));
                }
            }
        }

        #[test]
        fn prop_shared_child_always_reported(
            first in 0usize..5,
            second in 0usize..5,
            child in 5usize..8,
        ) {
            prop_assume!(first != second);
            let mut children = vec![Vec::new(); 8];
            children[first].push(child);
            children[second].push(child);
            let doc = document_from(children, vec![None; 8]);
            let report = check_references(&doc);
            let mut parents = vec![first, second];
            parents.sort_unstable();
            prop_assert_eq!(
                report.errors(),
                &[ReferenceError::InvalidHierarchy(HierarchyViolation::MultipleParents {
                    node: child,
                    parents,
                })][..]
            );
        }
    }
}

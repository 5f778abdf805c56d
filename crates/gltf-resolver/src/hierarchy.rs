//! Node hierarchy analysis.
//!
//! The `children` lists must describe a forest. Out-of-range children are
//! ignored here; they are reported as dangling references instead. Every
//! walk is iterative so arbitrarily deep chains cannot overflow the stack.

use std::collections::{HashMap, HashSet, VecDeque};

use gltf_core::{Document, HierarchyViolation};
use smallvec::SmallVec;

/// Outcome of analyzing the node graph.
pub struct Hierarchy {
    /// First parent of every node, in document order.
    pub parents: Vec<Option<usize>>,
    pub violations: Vec<HierarchyViolation>,
}

pub fn analyze(doc: &Document) -> Hierarchy {
    let count = doc.nodes.len();
    let mut all_parents: Vec<SmallVec<[usize; 2]>> = vec![SmallVec::new(); count];
    let mut edges: Vec<Vec<usize>> = vec![Vec::new(); count];
    let mut violations = Vec::new();

    for (parent, node) in doc.nodes.iter().enumerate() {
        let mut seen = HashSet::new();
        let mut repeated = HashSet::new();
        for &child in &node.children {
            if child >= count {
                continue;
            }
            if !seen.insert(child) {
                if repeated.insert(child) {
                    violations.push(HierarchyViolation::RepeatedChild {
                        parent,
                        node: child,
                    });
                }
                continue;
            }
            edges[parent].push(child);
            all_parents[child].push(parent);
        }
    }

    for (node, parents) in all_parents.iter().enumerate() {
        if parents.len() > 1 {
            let mut parents = parents.to_vec();
            parents.sort_unstable();
            violations.push(HierarchyViolation::MultipleParents { node, parents });
        }
    }

    // One cycle per component. A component with several cycles has a node
    // with several parents, already reported above.
    let mut on_cycle = vec![false; count];
    let mut cycles: Vec<Vec<usize>> = strongly_connected(&edges)
        .into_iter()
        .filter(|component| match component.as_slice() {
            [single] => edges[*single].contains(single),
            _ => true,
        })
        .map(|component| {
            for &node in &component {
                on_cycle[node] = true;
            }
            shortest_cycle(&edges, &component)
        })
        .collect();
    cycles.sort();
    violations.extend(
        cycles
            .into_iter()
            .map(|cycle| HierarchyViolation::Cycle { cycle }),
    );

    for (scene_index, scene) in doc.scenes.iter().enumerate() {
        let mut reported = HashSet::new();
        for &root in &scene.nodes {
            if root >= count || on_cycle[root] || !reported.insert(root) {
                continue;
            }
            if let Some(&parent) = all_parents[root].first() {
                violations.push(HierarchyViolation::RootHasParent {
                    scene: scene_index,
                    node: root,
                    parent,
                });
            }
        }
    }

    Hierarchy {
        parents: all_parents.iter().map(|p| p.first().copied()).collect(),
        violations,
    }
}

const UNVISITED: usize = usize::MAX;

/// Tarjan's strongly connected components, driven by an explicit stack.
fn strongly_connected(edges: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let count = edges.len();
    let mut index = vec![UNVISITED; count];
    let mut lowlink = vec![0; count];
    let mut on_stack = vec![false; count];
    let mut stack = Vec::new();
    let mut work: Vec<(usize, usize)> = Vec::new();
    let mut next = 0;
    let mut components = Vec::new();

    for root in 0..count {
        if index[root] != UNVISITED {
            continue;
        }
        index[root] = next;
        lowlink[root] = next;
        next += 1;
        stack.push(root);
        on_stack[root] = true;
        work.push((root, 0));

        while let Some(&(v, edge)) = work.last() {
            if let Some(&w) = edges[v].get(edge) {
                if let Some(top) = work.last_mut() {
                    top.1 += 1;
                }
                if index[w] == UNVISITED {
                    index[w] = next;
                    lowlink[w] = next;
                    next += 1;
                    stack.push(w);
                    on_stack[w] = true;
                    work.push((w, 0));
                } else if on_stack[w] {
                    lowlink[v] = lowlink[v].min(index[w]);
                }
                continue;
            }

            work.pop();
            if let Some(&(parent, _)) = work.last() {
                lowlink[parent] = lowlink[parent].min(lowlink[v]);
            }
            if lowlink[v] == index[v] {
                let mut component = Vec::new();
                while let Some(w) = stack.pop() {
                    on_stack[w] = false;
                    component.push(w);
                    if w == v {
                        break;
                    }
                }
                components.push(component);
            }
        }
    }

    components
}

/// Shortest cycle through the smallest node of a cyclic component, starting there.
fn shortest_cycle(edges: &[Vec<usize>], component: &[usize]) -> Vec<usize> {
    let members: HashSet<usize> = component.iter().copied().collect();
    let Some(&start) = component.iter().min() else {
        return Vec::new();
    };

    let mut previous: HashMap<usize, usize> = HashMap::new();
    let mut queue = VecDeque::from([start]);
    while let Some(v) = queue.pop_front() {
        for &w in &edges[v] {
            if !members.contains(&w) {
                continue;
            }
            if w == start {
                let mut cycle = vec![v];
                let mut current = v;
                while current != start {
                    match previous.get(&current) {
                        Some(&p) => {
                            cycle.push(p);
                            current = p;
                        }
                        None => break,
                    }
                }
                cycle.reverse();
                return cycle;
            }
            if !previous.contains_key(&w) {
                previous.insert(w, v);
                queue.push_back(w);
            }
        }
    }
    vec![start]
}

#[cfg(test)]
mod tests {
    use super::*;
    use gltf_core::{Node, Scene};

    fn graph(children: &[&[usize]]) -> Document {
        Document {
            nodes: children
                .iter()
                .map(|c| Node {
                    children: c.to_vec(),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_forest_has_no_violations() {
        let doc = graph(&[&[1, 2], &[3], &[], &[]]);
        let hierarchy = analyze(&doc);
        assert!(hierarchy.violations.is_empty());
        assert_eq!(hierarchy.parents, vec![None, Some(0), Some(0), Some(1)]);
    }

    #[test]
    fn test_two_node_cycle() {
        let mut doc = graph(&[&[1], &[0]]);
        doc.scenes.push(Scene {
            nodes: vec![0],
            ..Default::default()
        });
        let hierarchy = analyze(&doc);
        assert_eq!(
            hierarchy.violations,
            vec![HierarchyViolation::Cycle { cycle: vec![0, 1] }]
        );
    }

    #[test]
    fn test_cycle_rotated_to_smallest() {
        let doc = graph(&[&[], &[], &[3], &[4], &[2]]);
        let hierarchy = analyze(&doc);
        assert_eq!(
            hierarchy.violations,
            vec![HierarchyViolation::Cycle {
                cycle: vec![2, 3, 4]
            }]
        );
    }

    #[test]
    fn test_self_loop() {
        let doc = graph(&[&[0]]);
        let hierarchy = analyze(&doc);
        assert_eq!(
            hierarchy.violations,
            vec![HierarchyViolation::Cycle { cycle: vec![0] }]
        );
    }

    #[test]
    fn test_minimal_cycle_in_component() {
        // 0 -> 1 -> 2 -> 0 and 1 -> 0: the shortest loop through 0 is 0 -> 1 -> 0.
        let doc = graph(&[&[1], &[2, 0], &[0]]);
        let cycles: Vec<_> = analyze(&doc)
            .violations
            .into_iter()
            .filter(|v| matches!(v, HierarchyViolation::Cycle { .. }))
            .collect();
        assert_eq!(cycles, vec![HierarchyViolation::Cycle { cycle: vec![0, 1] }]);
    }

    #[test]
    fn test_component_with_two_cycles() {
        // 0 <-> 1 and 1 <-> 2 share node 1, which then has two parents.
        let doc = graph(&[&[1], &[0, 2], &[1]]);
        let hierarchy = analyze(&doc);
        assert_eq!(
            hierarchy.violations,
            vec![
                HierarchyViolation::MultipleParents {
                    node: 1,
                    parents: vec![0, 2]
                },
                HierarchyViolation::Cycle { cycle: vec![0, 1] },
            ]
        );
    }

    #[test]
    fn test_multiple_parents_sorted() {
        let doc = graph(&[&[], &[2], &[], &[2]]);
        let hierarchy = analyze(&doc);
        assert_eq!(
            hierarchy.violations,
            vec![HierarchyViolation::MultipleParents {
                node: 2,
                parents: vec![1, 3]
            }]
        );
        assert_eq!(hierarchy.parents[2], Some(1));
    }

    #[test]
    fn test_repeated_child_reported_once() {
        let doc = graph(&[&[1, 1, 1], &[]]);
        let hierarchy = analyze(&doc);
        assert_eq!(
            hierarchy.violations,
            vec![HierarchyViolation::RepeatedChild { parent: 0, node: 1 }]
        );
    }

    #[test]
    fn test_scene_root_with_parent() {
        let mut doc = graph(&[&[1], &[]]);
        doc.scenes.push(Scene {
            nodes: vec![0, 1],
            ..Default::default()
        });
        let hierarchy = analyze(&doc);
        assert_eq!(
            hierarchy.violations,
            vec![HierarchyViolation::RootHasParent {
                scene: 0,
                node: 1,
                parent: 0
            }]
        );
    }

    #[test]
    fn test_out_of_range_children_ignored() {
        let doc = graph(&[&[5]]);
        let hierarchy = analyze(&doc);
        assert!(hierarchy.violations.is_empty());
        assert_eq!(hierarchy.parents, vec![None]);
    }

    #[test]
    fn test_deep_chain_does_not_overflow() {
        let count = 100_000;
        let doc = Document {
            nodes: (0..count)
                .map(|i| Node {
                    children: if i + 1 < count { vec![i + 1] } else { Vec::new() },
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        };
        let hierarchy = analyze(&doc);
        assert!(hierarchy.violations.is_empty());
        assert_eq!(hierarchy.parents[count - 1], Some(count - 2));
    }
}

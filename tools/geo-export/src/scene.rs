//! Scene graph resolver
//!
//! The editor stores the hierarchy top-down only: groups list their
//! children by identifier. Resolution happens in two passes:
//! 1. index every group and element by identifier into an arena
//! 2. walk each group's child list and write the parent index back
//!
//! Elements that no group claims are either collected into a synthesized
//! `bb_main` root group or rejected, depending on [`LooseElements`].

use hashbrown::HashMap;
use serde::Deserialize;

use crate::error::ConvertError;
use crate::project::{Element, Group, OutlinerNode, Project};

/// Name of the root group synthesized for loose elements
pub const LOOSE_GROUP_NAME: &str = "bb_main";

/// Index of a group in [`Scene::groups`]
pub type GroupId = usize;

/// What to do with elements that are not a child of any group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LooseElements {
    /// Collect them into a `bb_main` group placed first in the hierarchy
    #[default]
    Group,
    /// Fail the conversion
    Reject,
}

/// Resolved reference to an arena entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRef {
    Group(GroupId),
    /// Index into the project's element list
    Element(usize),
}

/// Group with resolved links
#[derive(Debug, Clone)]
pub struct GroupNode {
    pub group: Group,
    pub parent: Option<GroupId>,
    pub children: Vec<NodeRef>,
}

/// Resolved hierarchy of a project
#[derive(Debug)]
pub struct Scene<'a> {
    pub groups: Vec<GroupNode>,
    pub elements: &'a [Element],
    /// Groups in compile order (outliner pre-order, `bb_main` first)
    pub order: Vec<GroupId>,
}

impl<'a> Scene<'a> {
    /// Build the lookup table and derive parent links
    pub fn resolve(project: &'a Project, loose: LooseElements) -> Result<Self, ConvertError> {
        // Pass 1: flatten groups (pre-order) and index everything by identifier
        let mut groups = Vec::new();
        for node in &project.outliner {
            flatten(node, &mut groups);
        }

        let mut lookup: HashMap<&str, NodeRef> =
            HashMap::with_capacity(groups.len() + project.elements.len());
        for (i, group) in groups.iter().enumerate() {
            if lookup.insert(group.uuid.as_str(), NodeRef::Group(i)).is_some() {
                tracing::warn!("Duplicate identifier {:?}, last definition wins", group.uuid);
            }
        }
        for (i, element) in project.elements.iter().enumerate() {
            if lookup
                .insert(element.uuid.as_str(), NodeRef::Element(i))
                .is_some()
            {
                tracing::warn!("Duplicate identifier {:?}, last definition wins", element.uuid);
            }
        }

        // Pass 2: resolve child lists and write parent links back by index
        let mut group_parents: Vec<Option<GroupId>> = vec![None; groups.len()];
        let mut element_parents: Vec<Option<GroupId>> = vec![None; project.elements.len()];
        let mut children: Vec<Vec<NodeRef>> = Vec::with_capacity(groups.len());

        for (i, group) in groups.iter().enumerate() {
            let mut resolved = Vec::with_capacity(group.children.len());
            for child in &group.children {
                let id = match child {
                    OutlinerNode::Ref(id) => id.as_str(),
                    OutlinerNode::Group(inline) => inline.uuid.as_str(),
                };
                let node = *lookup.get(id).ok_or_else(|| ConvertError::UnresolvedChild {
                    group: group.name.clone(),
                    child: id.to_string(),
                })?;
                let slot = match node {
                    NodeRef::Group(g) => &mut group_parents[g],
                    NodeRef::Element(e) => &mut element_parents[e],
                };
                if let Some(previous) = *slot {
                    return Err(ConvertError::DuplicateParent {
                        child: id.to_string(),
                        first: groups[previous].name.clone(),
                        second: group.name.clone(),
                    });
                }
                *slot = Some(i);
                resolved.push(node);
            }
            children.push(resolved);
        }
        drop(lookup);
        check_acyclic(&groups, &group_parents)?;

        let mut nodes: Vec<GroupNode> = groups
            .into_iter()
            .zip(group_parents)
            .zip(children)
            .map(|((group, parent), children)| GroupNode {
                group,
                parent,
                children,
            })
            .collect();
        let mut order: Vec<GroupId> = (0..nodes.len()).collect();

        let loose_elements: Vec<usize> = element_parents
            .iter()
            .enumerate()
            .filter(|(_, parent)| parent.is_none())
            .map(|(i, _)| i)
            .collect();

        if !loose_elements.is_empty() {
            match loose {
                LooseElements::Reject => {
                    let element = &project.elements[loose_elements[0]];
                    return Err(ConvertError::LooseElement {
                        element: display_name(element),
                    });
                }
                LooseElements::Group => {
                    let id = nodes.len();
                    let ids = loose_elements
                        .iter()
                        .map(|&i| project.elements[i].uuid.clone())
                        .collect();
                    nodes.push(GroupNode {
                        group: Group::synthetic(LOOSE_GROUP_NAME, ids),
                        parent: None,
                        children: loose_elements.iter().map(|&i| NodeRef::Element(i)).collect(),
                    });
                    order.insert(0, id);
                    tracing::debug!(
                        "Grouped {} loose element(s) into '{}'",
                        loose_elements.len(),
                        LOOSE_GROUP_NAME
                    );
                }
            }
        }

        Ok(Self {
            groups: nodes,
            elements: &project.elements,
            order,
        })
    }

    /// Groups in compile order
    pub fn iter(&self) -> impl Iterator<Item = &GroupNode> + '_ {
        self.order.iter().map(move |&id| &self.groups[id])
    }

    /// Name of a group's parent, `None` for roots
    pub fn parent_name(&self, node: &GroupNode) -> Option<&str> {
        node.parent.map(|p| self.groups[p].group.name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Fail if following parent links from any group leads back to it
fn check_acyclic(groups: &[Group], parents: &[Option<GroupId>]) -> Result<(), ConvertError> {
    // Each group has at most one parent, so every walk is a simple chain
    let mut settled = vec![false; parents.len()];
    let mut on_path = vec![false; parents.len()];
    for start in 0..parents.len() {
        let mut path = Vec::new();
        let mut cursor = Some(start);
        while let Some(id) = cursor {
            if settled[id] {
                break;
            }
            if on_path[id] {
                return Err(ConvertError::CyclicGroup {
                    group: groups[id].name.clone(),
                });
            }
            on_path[id] = true;
            path.push(id);
            cursor = parents[id];
        }
        for id in path {
            on_path[id] = false;
            settled[id] = true;
        }
    }
    Ok(())
}

/// Push `node` and its inline descendants in pre-order
fn flatten(node: &OutlinerNode, out: &mut Vec<Group>) {
    let OutlinerNode::Group(group) = node else {
        return;
    };
    out.push(group.clone());
    for child in &group.children {
        flatten(child, out);
    }
}

fn display_name(element: &Element) -> String {
    if element.name.is_empty() {
        element.uuid.clone()
    } else {
        element.name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(json: &str) -> Project {
        Project::parse(json).unwrap()
    }

    #[test]
    fn test_flat_outliner_links_parents_by_name() {
        let project = project(
            r#"{
                "resolution": {},
                "outliner": [
                    {"name": "body", "uuid": "g-body", "children": ["g-head", "e-torso"]},
                    {"name": "head", "uuid": "g-head", "children": ["e-skull"]}
                ],
                "elements": [
                    {"name": "torso", "uuid": "e-torso", "from": [0,0,0], "to": [1,1,1]},
                    {"name": "skull", "uuid": "e-skull", "from": [0,0,0], "to": [1,1,1]}
                ]
            }"#,
        );
        let scene = Scene::resolve(&project, LooseElements::Group).unwrap();
        let names: Vec<_> = scene.iter().map(|g| g.group.name.as_str()).collect();
        assert_eq!(names, ["body", "head"]);

        let head = &scene.groups[1];
        assert_eq!(scene.parent_name(head), Some("body"));
        assert_eq!(scene.parent_name(&scene.groups[0]), None);
        assert_eq!(scene.groups[0].children, [NodeRef::Group(1), NodeRef::Element(0)]);
        assert_eq!(scene.groups[1].children, [NodeRef::Element(1)]);
    }

    #[test]
    fn test_inline_groups_flatten_in_preorder() {
        let project = project(
            r#"{
                "resolution": {},
                "outliner": [
                    {"name": "root", "uuid": "a", "children": [
                        {"name": "arm", "uuid": "b", "children": [
                            {"name": "hand", "uuid": "c", "children": []}
                        ]},
                        {"name": "leg", "uuid": "d", "children": []}
                    ]},
                    {"name": "tail", "uuid": "e", "children": []}
                ],
                "elements": []
            }"#,
        );
        let scene = Scene::resolve(&project, LooseElements::Group).unwrap();
        let names: Vec<_> = scene.iter().map(|g| g.group.name.as_str()).collect();
        assert_eq!(names, ["root", "arm", "hand", "leg", "tail"]);
        let parents: Vec<_> = scene.iter().map(|g| scene.parent_name(g)).collect();
        assert_eq!(parents, [None, Some("root"), Some("arm"), Some("root"), None]);
    }

    #[test]
    fn test_unresolved_child() {
        let project = project(
            r#"{
                "resolution": {},
                "outliner": [{"name": "body", "uuid": "g", "children": ["missing"]}],
                "elements": []
            }"#,
        );
        let err = Scene::resolve(&project, LooseElements::Group).unwrap_err();
        assert!(matches!(
            err,
            ConvertError::UnresolvedChild { ref group, ref child } if group == "body" && child == "missing"
        ));
    }

    #[test]
    fn test_group_cycle_rejected() {
        let self_reference = project(
            r#"{
                "resolution": {},
                "outliner": [{"name": "a", "uuid": "ga", "children": ["ga"]}],
                "elements": []
            }"#,
        );
        let err = Scene::resolve(&self_reference, LooseElements::Group).unwrap_err();
        assert!(matches!(err, ConvertError::CyclicGroup { ref group } if group == "a"));

        let two_node = project(
            r#"{
                "resolution": {},
                "outliner": [
                    {"name": "a", "uuid": "ga", "children": [
                        {"name": "b", "uuid": "gb", "children": ["ga"]}
                    ]}
                ],
                "elements": []
            }"#,
        );
        let err = Scene::resolve(&two_node, LooseElements::Group).unwrap_err();
        assert!(matches!(err, ConvertError::CyclicGroup { .. }));
        assert_eq!(err.kind(), crate::error::ErrorKind::Reference);
    }

    #[test]
    fn test_duplicate_group_identifier_last_wins() {
        let project = project(
            r#"{
                "resolution": {},
                "outliner": [
                    {"name": "first", "uuid": "dup", "children": []},
                    {"name": "second", "uuid": "dup", "children": []},
                    {"name": "owner", "uuid": "g", "children": ["dup"]}
                ],
                "elements": []
            }"#,
        );
        let scene = Scene::resolve(&project, LooseElements::Group).unwrap();
        let parents: Vec<_> = scene
            .iter()
            .map(|g| (g.group.name.as_str(), scene.parent_name(g)))
            .collect();
        assert_eq!(
            parents,
            [("first", None), ("second", Some("owner")), ("owner", None)]
        );
    }

    #[test]
    fn test_deep_chain_is_not_a_cycle() {
        let project = project(
            r#"{
                "resolution": {},
                "outliner": [
                    {"name": "c", "uuid": "gc", "children": []},
                    {"name": "b", "uuid": "gb", "children": ["gc"]},
                    {"name": "a", "uuid": "ga", "children": ["gb"]}
                ],
                "elements": []
            }"#,
        );
        let scene = Scene::resolve(&project, LooseElements::Group).unwrap();
        let parents: Vec<_> = scene.iter().map(|g| scene.parent_name(g)).collect();
        assert_eq!(parents, [Some("b"), Some("a"), None]);
    }

    #[test]
    fn test_duplicate_parent() {
        let project = project(
            r#"{
                "resolution": {},
                "outliner": [
                    {"name": "a", "uuid": "ga", "children": ["e"]},
                    {"name": "b", "uuid": "gb", "children": ["e"]}
                ],
                "elements": [{"uuid": "e", "from": [0,0,0], "to": [1,1,1]}]
            }"#,
        );
        let err = Scene::resolve(&project, LooseElements::Group).unwrap_err();
        assert!(matches!(err, ConvertError::DuplicateParent { ref first, ref second, .. } if first == "a" && second == "b"));
    }

    #[test]
    fn test_loose_elements_grouped_first() {
        let project = project(
            r#"{
                "resolution": {},
                "outliner": [
                    "e2",
                    {"name": "body", "uuid": "g", "children": ["e1"]}
                ],
                "elements": [
                    {"name": "one", "uuid": "e1", "from": [0,0,0], "to": [1,1,1]},
                    {"name": "two", "uuid": "e2", "from": [0,0,0], "to": [1,1,1]},
                    {"name": "three", "uuid": "e3", "from": [0,0,0], "to": [1,1,1]}
                ]
            }"#,
        );
        let scene = Scene::resolve(&project, LooseElements::Group).unwrap();
        let first = scene.iter().next().unwrap();
        assert_eq!(first.group.name, LOOSE_GROUP_NAME);
        assert_eq!(first.group.origin, Some([0.0; 3]));
        assert_eq!(first.children, [NodeRef::Element(1), NodeRef::Element(2)]);
        assert_eq!(scene.parent_name(first), None);
        assert_eq!(scene.order.len(), 2);
    }

    #[test]
    fn test_loose_elements_rejected() {
        let project = project(
            r#"{
                "resolution": {},
                "elements": [{"name": "stray", "uuid": "e1", "from": [0,0,0], "to": [1,1,1]}]
            }"#,
        );
        let err = Scene::resolve(&project, LooseElements::Reject).unwrap_err();
        assert!(matches!(err, ConvertError::LooseElement { ref element } if element == "stray"));
    }

    #[test]
    fn test_empty_project() {
        let project = project(r#"{"resolution": {}, "elements": []}"#);
        let scene = Scene::resolve(&project, LooseElements::Group).unwrap();
        assert!(scene.is_empty());
    }
}

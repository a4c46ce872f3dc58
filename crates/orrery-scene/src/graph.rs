//! Ownership-tree scene graph.
//!
//! Every node exclusively owns its children. Descendants are addressed by a
//! [`NodePath`] of child indices, which stays valid because the tree shape is
//! fixed once a body has been constructed.

use glam::{Mat4, Vec3};

use crate::geometry::Shape;
use crate::material::Material;

/// Index path from a node to one of its descendants.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Path to the `index`-th child of the node at `self`.
    pub fn child(&self, index: usize) -> Self {
        let mut steps = self.0.clone();
        steps.push(index);
        Self(steps)
    }
}

/// A triangle mesh with its material.
#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    pub shape: Shape,
    pub material: Material,
}

/// An unlit connected line strip.
#[derive(Clone, Debug, PartialEq)]
pub struct Polyline {
    pub points: Vec<Vec3>,
    /// Linear RGB.
    pub color: Vec3,
}

/// Unlit points with per-point colour.
#[derive(Clone, Debug, PartialEq)]
pub struct PointCloud {
    pub positions: Vec<Vec3>,
    pub colors: Vec<Vec3>,
}

/// What a node draws, if anything.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum NodeContent {
    #[default]
    Empty,
    Mesh(Mesh),
    Polyline(Polyline),
    Points(PointCloud),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub name: String,
    pub transform: crate::Transform,
    pub content: NodeContent,
    children: Vec<Node>,
}

impl Node {
    /// An empty grouping node.
    pub fn group(name: impl Into<String>) -> Self {
        Self::with_content(name, NodeContent::Empty)
    }

    pub fn mesh(name: impl Into<String>, shape: Shape, material: Material) -> Self {
        Self::with_content(name, NodeContent::Mesh(Mesh { shape, material }))
    }

    pub fn with_content(name: impl Into<String>, content: NodeContent) -> Self {
        Self {
            name: name.into(),
            transform: crate::Transform::IDENTITY,
            content,
            children: Vec::new(),
        }
    }

    /// Append a child, returning its index.
    pub fn add_child(&mut self, child: Node) -> usize {
        self.children.push(child);
        self.children.len() - 1
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn get(&self, path: &NodePath) -> Option<&Node> {
        path.0
            .iter()
            .try_fold(self, |node, &index| node.children.get(index))
    }

    pub fn get_mut(&mut self, path: &NodePath) -> Option<&mut Node> {
        path.0
            .iter()
            .try_fold(self, |node, &index| node.children.get_mut(index))
    }

    /// Depth-first search by name, including `self`.
    pub fn find(&self, name: &str) -> Option<&Node> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(name))
    }

    /// Visit this node and every descendant with its world matrix.
    pub fn walk<F>(&self, parent: &Mat4, visit: &mut F)
    where
        F: FnMut(&Mat4, &Node),
    {
        let world = *parent * self.transform.matrix();
        visit(&world, self);
        for child in &self.children {
            child.walk(&world, visit);
        }
    }

    /// Number of mesh nodes in this subtree.
    pub fn mesh_count(&self) -> usize {
        let own = usize::from(matches!(self.content, NodeContent::Mesh(_)));
        own + self.children.iter().map(Node::mesh_count).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Transform;

    fn tree() -> Node {
        let mut root = Node::group("root");
        let mut arm = Node::group("arm");
        arm.transform = Transform::from_translation(Vec3::X * 5.0);
        arm.add_child(Node::group("hand"));
        root.add_child(Node::group("leg"));
        root.add_child(arm);
        root
    }

    #[test]
    fn test_path_lookup() {
        let root = tree();
        let hand = NodePath::root().child(1).child(0);
        assert_eq!(root.get(&hand).map(|n| n.name.as_str()), Some("hand"));
        assert_eq!(root.get(&NodePath::root()).map(|n| n.name.as_str()), Some("root"));
        assert!(root.get(&NodePath::root().child(7)).is_none());
    }

    #[test]
    fn test_get_mut_edits_in_place() {
        let mut root = tree();
        let leg = NodePath::root().child(0);
        root.get_mut(&leg).unwrap().transform.rotation.y = 1.5;
        assert_eq!(root.children()[0].transform.rotation.y, 1.5);
    }

    #[test]
    fn test_walk_composes_parent_transforms() {
        let mut root = tree();
        root.transform = Transform::from_translation(Vec3::Y);
        let mut seen = Vec::new();
        root.walk(&Mat4::IDENTITY, &mut |world, node| {
            seen.push((node.name.clone(), world.transform_point3(Vec3::ZERO)));
        });
        let names: Vec<_> = seen.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["root", "leg", "arm", "hand"]);
        assert!((seen[3].1 - Vec3::new(5.0, 1.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_find_by_name() {
        let root = tree();
        assert!(root.find("hand").is_some());
        assert!(root.find("tail").is_none());
    }
}

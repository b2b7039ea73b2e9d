//! Binary space partitioning over boundary facets.

use serde::{Deserialize, Serialize};
use sk_math::{Plane, Point3};
use slotmap::{new_key_type, SlotMap};

use crate::polygon::Polygon;

new_key_type! {
    pub struct NodeId;
}

/// Point classification against a solid region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Location {
    Inside,
    Outside,
    Boundary,
}

/// A BSP node: either a hyperplane cut with the open half-space
/// subtrees, or a homogeneous leaf.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Node {
    Cut {
        plane: Plane,
        /// Subtree on the positive (normal) side.
        plus: NodeId,
        /// Subtree on the negative side.
        minus: NodeId,
    },
    Leaf {
        inside: bool,
    },
}

/// An arena-allocated BSP tree built from outward-oriented boundary
/// facets: descending past a facet plane on its negative side with no
/// further cuts means the cell is interior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BspTree {
    nodes: SlotMap<NodeId, Node>,
    root: NodeId,
    /// Coincidence tolerance used during construction and classification.
    tol: f64,
}

impl BspTree {
    pub fn from_facets(facets: Vec<Polygon>, tol: f64) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = if facets.is_empty() {
            nodes.insert(Node::Leaf { inside: false })
        } else {
            Self::build(&mut nodes, facets, tol)
        };
        Self { nodes, root, tol }
    }

    fn build(nodes: &mut SlotMap<NodeId, Node>, facets: Vec<Polygon>, tol: f64) -> NodeId {
        let mut iter = facets.into_iter();
        let first = match iter.next() {
            Some(f) => f,
            None => return nodes.insert(Node::Leaf { inside: false }),
        };
        let plane = first.plane;

        let mut front = Vec::new();
        let mut back = Vec::new();
        for poly in iter {
            let (f, b) = poly.split(&plane, tol);
            if let Some(f) = f {
                front.push(f);
            }
            if let Some(b) = b {
                back.push(b);
            }
        }

        let plus = if front.is_empty() {
            nodes.insert(Node::Leaf { inside: false })
        } else {
            Self::build(nodes, front, tol)
        };
        let minus = if back.is_empty() {
            nodes.insert(Node::Leaf { inside: true })
        } else {
            Self::build(nodes, back, tol)
        };
        nodes.insert(Node::Cut { plane, plus, minus })
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Classify a point by tree descent. Within tolerance of a cut plane
    /// both subtrees are consulted; a disagreement is a boundary point.
    pub fn classify(&self, p: Point3) -> Location {
        self.classify_at(self.root, p)
    }

    fn classify_at(&self, id: NodeId, p: Point3) -> Location {
        match &self.nodes[id] {
            Node::Leaf { inside: true } => Location::Inside,
            Node::Leaf { inside: false } => Location::Outside,
            Node::Cut { plane, plus, minus } => {
                let d = plane.signed_distance(p);
                if d > self.tol {
                    self.classify_at(*plus, p)
                } else if d < -self.tol {
                    self.classify_at(*minus, p)
                } else {
                    let a = self.classify_at(*plus, p);
                    let b = self.classify_at(*minus, p);
                    if a == b {
                        a
                    } else {
                        Location::Boundary
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sk_math::dvec3;
    use sk_math::Vector3;

    /// Two facets of an infinite slab 0 <= z <= 1 (open in x/y, enough
    /// to exercise the descent logic).
    fn slab() -> BspTree {
        let bottom = Polygon::new(
            vec![
                dvec3(-10.0, -10.0, 0.0),
                dvec3(-10.0, 10.0, 0.0),
                dvec3(10.0, 10.0, 0.0),
                dvec3(10.0, -10.0, 0.0),
            ],
            Plane::new(Point3::ZERO, -Vector3::Z).unwrap(),
        );
        let top = Polygon::new(
            vec![
                dvec3(-10.0, -10.0, 1.0),
                dvec3(10.0, -10.0, 1.0),
                dvec3(10.0, 10.0, 1.0),
                dvec3(-10.0, 10.0, 1.0),
            ],
            Plane::new(dvec3(0.0, 0.0, 1.0), Vector3::Z).unwrap(),
        );
        BspTree::from_facets(vec![bottom, top], 1e-9)
    }

    #[test]
    fn test_slab_classification() {
        let tree = slab();
        assert_eq!(tree.classify(dvec3(0.0, 0.0, 0.5)), Location::Inside);
        assert_eq!(tree.classify(dvec3(0.0, 0.0, 2.0)), Location::Outside);
        assert_eq!(tree.classify(dvec3(0.0, 0.0, -1.0)), Location::Outside);
        assert_eq!(tree.classify(dvec3(3.0, -2.0, 0.0)), Location::Boundary);
        assert_eq!(tree.classify(dvec3(3.0, -2.0, 1.0)), Location::Boundary);
    }

    #[test]
    fn test_empty_tree_is_all_outside() {
        let tree = BspTree::from_facets(Vec::new(), 1e-9);
        assert_eq!(tree.classify(Point3::ZERO), Location::Outside);
    }
}

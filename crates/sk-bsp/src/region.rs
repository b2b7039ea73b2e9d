//! Polyhedral solid regions.

use serde::{Deserialize, Serialize};
use sk_core::traits::BoundingBox;
use sk_core::{GeomError, Result, Tolerance};
use sk_math::{Frame, Plane, Point3};

use crate::brep::Brep;
use crate::polygon::Polygon;
use crate::tree::{BspTree, Location};

/// Extent of the seed square used when deriving facets from raw
/// half-spaces; a clipped facet still touching it means the region is
/// unbounded.
const HALF_SPACE_EXTENT: f64 = 1e6;

/// A solid region of 3D space bounded by planar facets, carrying both
/// the validated boundary representation and the BSP tree derived from
/// it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolyhedronSet {
    brep: Brep,
    tree: BspTree,
    tol: Tolerance,
}

impl PolyhedronSet {
    /// Build from shared vertices and outward-wound facet loops.
    ///
    /// The boundary is validated first (closedness, orientation,
    /// planarity, vertex separation); the BSP tree is then derived from
    /// the facet planes.
    pub fn from_facets(vertices: Vec<Point3>, facets: Vec<Vec<usize>>) -> Result<Self> {
        Self::from_facets_with_tolerance(vertices, facets, Tolerance::default())
    }

    pub fn from_facets_with_tolerance(
        vertices: Vec<Point3>,
        facets: Vec<Vec<usize>>,
        tol: Tolerance,
    ) -> Result<Self> {
        let brep = Brep::new(vertices, facets, tol)?;
        let tree = BspTree::from_facets(brep.polygons()?, tol.linear);
        Ok(Self { brep, tree, tol })
    }

    /// Axis-aligned box `[x0, x1] x [y0, y1] x [z0, z1]`.
    pub fn from_box(x0: f64, x1: f64, y0: f64, y1: f64, z0: f64, z1: f64) -> Result<Self> {
        if !(x0 < x1 && y0 < y1 && z0 < z1) {
            return Err(GeomError::InvalidShape(format!(
                "box bounds must be ordered, got [{x0}, {x1}] x [{y0}, {y1}] x [{z0}, {z1}]"
            )));
        }
        let vertices = vec![
            Point3::new(x0, y0, z0),
            Point3::new(x1, y0, z0),
            Point3::new(x1, y1, z0),
            Point3::new(x0, y1, z0),
            Point3::new(x0, y0, z1),
            Point3::new(x1, y0, z1),
            Point3::new(x1, y1, z1),
            Point3::new(x0, y1, z1),
        ];
        let facets = vec![
            vec![0, 3, 2, 1],
            vec![4, 5, 6, 7],
            vec![0, 1, 5, 4],
            vec![2, 3, 7, 6],
            vec![0, 4, 7, 3],
            vec![1, 2, 6, 5],
        ];
        Self::from_facets(vertices, facets)
    }

    /// Convex region as the intersection of half-spaces (the negative
    /// side of each plane).
    ///
    /// Every facet is obtained by clipping a large seed polygon in its
    /// plane against all the other half-spaces; a facet still reaching
    /// the seed edge reveals an unbounded region, reported as an open
    /// boundary.
    pub fn from_half_spaces(planes: &[Plane]) -> Result<Self> {
        Self::from_half_spaces_with_tolerance(planes, Tolerance::default())
    }

    pub fn from_half_spaces_with_tolerance(planes: &[Plane], tol: Tolerance) -> Result<Self> {
        if planes.is_empty() {
            return Err(GeomError::Topology(
                "open boundary: no half-space bounds the region".into(),
            ));
        }

        let mut raw_facets: Vec<Vec<Point3>> = Vec::new();
        for (i, plane) in planes.iter().enumerate() {
            let frame = Frame::from_axis(plane.origin, plane.normal)?;
            let l = HALF_SPACE_EXTENT;
            let (u, v) = (frame.u(), frame.v());
            let mut poly = Polygon::new(
                vec![
                    plane.origin + l * (u + v),
                    plane.origin + l * (v - u),
                    plane.origin - l * (u + v),
                    plane.origin + l * (u - v),
                ],
                *plane,
            );
            let mut alive = true;
            for (j, other) in planes.iter().enumerate() {
                if i == j {
                    continue;
                }
                let (_, back) = poly.split(other, tol.linear);
                match back {
                    Some(b) => poly = b,
                    None => {
                        alive = false;
                        break;
                    }
                }
            }
            if !alive {
                continue; // redundant half-space
            }
            for vtx in &poly.vertices {
                if (*vtx - plane.origin).length() > 0.99 * HALF_SPACE_EXTENT {
                    return Err(GeomError::Topology(format!(
                        "open boundary: half-space {i} extends to infinity"
                    )));
                }
            }
            raw_facets.push(poly.vertices);
        }

        if raw_facets.is_empty() {
            return Err(GeomError::Topology(
                "the half-space intersection is empty".into(),
            ));
        }

        // Weld coincident corners into shared indices.
        let weld = tol.linear.max(1e-9);
        let mut vertices: Vec<Point3> = Vec::new();
        let mut facets: Vec<Vec<usize>> = Vec::new();
        for raw in raw_facets {
            let mut loop_idx = Vec::with_capacity(raw.len());
            for p in raw {
                let idx = vertices
                    .iter()
                    .position(|q| (*q - p).length() < weld)
                    .unwrap_or_else(|| {
                        vertices.push(p);
                        vertices.len() - 1
                    });
                if loop_idx.last() != Some(&idx) {
                    loop_idx.push(idx);
                }
            }
            if loop_idx.first() == loop_idx.last() && loop_idx.len() > 1 {
                loop_idx.pop();
            }
            facets.push(loop_idx);
        }

        Self::from_facets_with_tolerance(vertices, facets, tol)
    }

    /// The validated boundary representation.
    pub fn brep(&self) -> &Brep {
        &self.brep
    }

    pub fn tree(&self) -> &BspTree {
        &self.tree
    }

    /// Classify a point as inside, outside, or on the boundary.
    pub fn check_point(&self, p: Point3) -> Location {
        self.tree.classify(p)
    }

    pub fn contains_point(&self, p: Point3) -> bool {
        !matches!(self.check_point(p), Location::Outside)
    }

    /// Enclosed volume.
    pub fn size(&self) -> f64 {
        self.brep.volume()
    }

    /// Total boundary area.
    pub fn boundary_size(&self) -> f64 {
        self.brep.area()
    }

    pub fn barycenter(&self) -> Point3 {
        self.brep.barycenter()
    }

    pub fn tolerance(&self) -> Tolerance {
        self.tol
    }
}

impl BoundingBox for PolyhedronSet {
    type Point = Point3;

    fn bounding_box(&self) -> (Point3, Point3) {
        let vs = self.brep.vertices();
        if vs.is_empty() {
            return (Point3::ZERO, Point3::ZERO);
        }
        let mut min = vs[0];
        let mut max = vs[0];
        for &v in &vs[1..] {
            min = min.min(v);
            max = max.max(v);
        }
        (min, max)
    }
}

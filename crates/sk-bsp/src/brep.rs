//! Facet/vertex boundary representation with structural validation.

use std::collections::HashMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sk_core::traits::Validate;
use sk_core::{GeomError, Result, Tolerance};
use sk_math::accurate::cross_accurate;
use sk_math::{Plane, Point3, Vector3};

use crate::polygon::Polygon;

/// A closed boundary: shared vertices plus facets as vertex-index loops,
/// wound counter-clockwise seen from outside.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brep {
    vertices: Vec<Point3>,
    facets: Vec<Vec<usize>>,
    tol: Tolerance,
}

impl Brep {
    /// Build and validate; every malformation is reported as a
    /// descriptive [`GeomError::Topology`].
    pub fn new(vertices: Vec<Point3>, facets: Vec<Vec<usize>>, tol: Tolerance) -> Result<Self> {
        let brep = Self {
            vertices,
            facets,
            tol,
        };
        brep.validate()?;
        Ok(brep)
    }

    pub fn vertices(&self) -> &[Point3] {
        &self.vertices
    }

    pub fn facets(&self) -> &[Vec<usize>] {
        &self.facets
    }

    /// Newell normal of a facet (non-unit, area-weighted, outward).
    fn newell_normal(&self, facet: &[usize]) -> Vector3 {
        let mut n = Vector3::ZERO;
        for i in 0..facet.len() {
            let a = self.vertices[facet[i]];
            let b = self.vertices[facet[(i + 1) % facet.len()]];
            n += cross_accurate(a, b);
        }
        n
    }

    /// Supporting plane of a facet.
    pub fn facet_plane(&self, index: usize) -> Result<Plane> {
        let facet = &self.facets[index];
        let n = self.newell_normal(facet);
        Plane::new(self.vertices[facet[0]], n)
    }

    /// Facet polygons for BSP construction.
    pub fn polygons(&self) -> Result<Vec<Polygon>> {
        (0..self.facets.len())
            .map(|i| {
                let plane = self.facet_plane(i)?;
                Ok(Polygon::new(
                    self.facets[i].iter().map(|&v| self.vertices[v]).collect(),
                    plane,
                ))
            })
            .collect()
    }

    /// Enclosed volume (divergence theorem over fan triangles).
    pub fn volume(&self) -> f64 {
        self.facets
            .par_iter()
            .map(|facet| {
                let v0 = self.vertices[facet[0]];
                let mut sum = 0.0;
                for i in 1..facet.len() - 1 {
                    let a = self.vertices[facet[i]];
                    let b = self.vertices[facet[i + 1]];
                    sum += v0.dot(a.cross(b));
                }
                sum / 6.0
            })
            .sum()
    }

    /// Total facet area.
    pub fn area(&self) -> f64 {
        self.facets
            .par_iter()
            .map(|facet| {
                let mut n = Vector3::ZERO;
                for i in 0..facet.len() {
                    let a = self.vertices[facet[i]];
                    let b = self.vertices[facet[(i + 1) % facet.len()]];
                    n += a.cross(b);
                }
                n.length() / 2.0
            })
            .sum()
    }

    /// Volume centroid.
    pub fn barycenter(&self) -> Point3 {
        let (wsum, csum) = self
            .facets
            .par_iter()
            .map(|facet| {
                let v0 = self.vertices[facet[0]];
                let mut w = 0.0;
                let mut c = Point3::ZERO;
                for i in 1..facet.len() - 1 {
                    let a = self.vertices[facet[i]];
                    let b = self.vertices[facet[i + 1]];
                    let t = v0.dot(a.cross(b)) / 6.0;
                    w += t;
                    c += t * (v0 + a + b) / 4.0;
                }
                (w, c)
            })
            .reduce(
                || (0.0, Point3::ZERO),
                |(w1, c1), (w2, c2)| (w1 + w2, c1 + c2),
            );
        if wsum.abs() < 1e-300 {
            Point3::ZERO
        } else {
            csum / wsum
        }
    }
}

impl Validate for Brep {
    fn validate(&self) -> Result<()> {
        let nv = self.vertices.len();

        // 1. Facet shape and index sanity.
        for (fi, facet) in self.facets.iter().enumerate() {
            if facet.len() < 3 {
                return Err(GeomError::Topology(format!(
                    "facet {fi} has fewer than 3 vertices ({})",
                    facet.len()
                )));
            }
            for &v in facet {
                if v >= nv {
                    return Err(GeomError::Topology(format!(
                        "facet {fi} references vertex {v}, but only {nv} vertices exist"
                    )));
                }
            }
            for i in 0..facet.len() {
                for j in i + 1..facet.len() {
                    if facet[i] == facet[j] {
                        return Err(GeomError::Topology(format!(
                            "facet {fi} repeats vertex {}",
                            facet[i]
                        )));
                    }
                }
            }
        }

        // 2. Degenerately close vertices.
        for i in 0..nv {
            for j in i + 1..nv {
                if (self.vertices[i] - self.vertices[j]).length() < self.tol.linear {
                    return Err(GeomError::Topology(format!(
                        "vertices {i} and {j} are degenerately close: {:?} ~ {:?}",
                        self.vertices[i], self.vertices[j]
                    )));
                }
            }
        }

        // 3. Planarity of each facet against its supporting plane.
        for (fi, facet) in self.facets.iter().enumerate() {
            let n = self.newell_normal(facet);
            if n.length_squared() < 1e-24 {
                return Err(GeomError::Topology(format!(
                    "facet {fi} is degenerate (zero area)"
                )));
            }
            let plane = Plane::new(self.vertices[facet[0]], n)?;
            let scale = facet
                .iter()
                .map(|&v| (self.vertices[v] - plane.origin).length())
                .fold(1.0, f64::max);
            for &v in facet {
                let d = plane.signed_distance(self.vertices[v]);
                if d.abs() > 1e-9 * scale {
                    return Err(GeomError::Topology(format!(
                        "vertex {v} is out of the supporting plane of facet {fi} by {d:e}"
                    )));
                }
            }
        }

        // 4. Edge pairing: every directed edge once, and its reverse
        // present in exactly one other facet.
        let mut directed: HashMap<(usize, usize), usize> = HashMap::new();
        for (fi, facet) in self.facets.iter().enumerate() {
            for i in 0..facet.len() {
                let a = facet[i];
                let b = facet[(i + 1) % facet.len()];
                if let Some(&other) = directed.get(&(a, b)) {
                    return Err(GeomError::Topology(format!(
                        "edge {a}->{b} appears in facets {other} and {fi} with the same \
                         orientation: inconsistent facet winding"
                    )));
                }
                directed.insert((a, b), fi);
            }
        }
        for (&(a, b), &fi) in &directed {
            if !directed.contains_key(&(b, a)) {
                return Err(GeomError::Topology(format!(
                    "open boundary: edge {a}->{b} of facet {fi} has no facet on its other side"
                )));
            }
        }

        Ok(())
    }
}

use approx::assert_relative_eq;
use sk_bsp::{Location, PolyhedronSet};
use sk_core::traits::BoundingBox;
use sk_math::dvec3;

#[test]
fn test_unit_box_reference_metrics() {
    let region = PolyhedronSet::from_box(0.0, 1.0, 0.0, 1.0, 0.0, 1.0).unwrap();
    assert_relative_eq!(region.size(), 1.0, epsilon = 1e-12);
    assert_relative_eq!(region.boundary_size(), 6.0, epsilon = 1e-12);
    assert!((region.barycenter() - dvec3(0.5, 0.5, 0.5)).length() < 1e-12);
}

#[test]
fn test_box_point_classification_everywhere() {
    let region = PolyhedronSet::from_box(0.0, 1.0, 0.0, 1.0, 0.0, 1.0).unwrap();
    // Interior, face, edge, corner, exterior.
    assert_eq!(region.check_point(dvec3(0.5, 0.5, 0.5)), Location::Inside);
    assert_eq!(region.check_point(dvec3(0.5, 0.5, 1.0)), Location::Boundary);
    assert_eq!(region.check_point(dvec3(0.5, 1.0, 1.0)), Location::Boundary);
    assert_eq!(region.check_point(dvec3(1.0, 1.0, 1.0)), Location::Boundary);
    assert_eq!(region.check_point(dvec3(0.5, 0.5, -0.1)), Location::Outside);
    assert_eq!(region.check_point(dvec3(100.0, 100.0, 100.0)), Location::Outside);
}

/// L-shaped prism: non-convex cross-section extruded along z.
fn l_prism() -> PolyhedronSet {
    let section = [
        (0.0, 0.0),
        (2.0, 0.0),
        (2.0, 1.0),
        (1.0, 1.0),
        (1.0, 2.0),
        (0.0, 2.0),
    ];
    let mut vertices = Vec::new();
    for &(x, y) in &section {
        vertices.push(dvec3(x, y, 0.0));
    }
    for &(x, y) in &section {
        vertices.push(dvec3(x, y, 1.0));
    }
    let n = section.len();
    let mut facets = vec![
        (0..n).rev().collect::<Vec<_>>(),  // bottom, seen from below
        (n..2 * n).collect::<Vec<_>>(),    // top
    ];
    for i in 0..n {
        let j = (i + 1) % n;
        facets.push(vec![i, j, j + n, i + n]);
    }
    PolyhedronSet::from_facets(vertices, facets).unwrap()
}

#[test]
fn test_non_convex_prism_metrics() {
    let region = l_prism();
    assert!((region.size() - 3.0).abs() < 1e-12);
    assert!((region.boundary_size() - 14.0).abs() < 1e-12);
    let c = region.barycenter();
    assert!((c - dvec3(2.5 / 3.0, 2.5 / 3.0, 0.5)).length() < 1e-12);
}

#[test]
fn test_non_convex_prism_classification() {
    let region = l_prism();
    assert_eq!(region.check_point(dvec3(0.5, 0.5, 0.5)), Location::Inside);
    assert_eq!(region.check_point(dvec3(1.5, 0.5, 0.5)), Location::Inside);
    assert_eq!(region.check_point(dvec3(0.5, 1.5, 0.5)), Location::Inside);
    // The notch is outside the solid.
    assert_eq!(region.check_point(dvec3(1.5, 1.5, 0.5)), Location::Outside);
    // Re-entrant edge.
    assert_eq!(region.check_point(dvec3(1.0, 1.0, 0.5)), Location::Boundary);
}

#[test]
fn test_bounding_box_covers_all_vertices() {
    let region = l_prism();
    let (min, max) = region.bounding_box();
    assert!((min - dvec3(0.0, 0.0, 0.0)).length() < 1e-12);
    assert!((max - dvec3(2.0, 2.0, 1.0)).length() < 1e-12);
}

#[test]
fn test_malformed_boundaries_rejected() {
    // Open box: five facets only.
    let vertices = vec![
        dvec3(0.0, 0.0, 0.0),
        dvec3(1.0, 0.0, 0.0),
        dvec3(1.0, 1.0, 0.0),
        dvec3(0.0, 1.0, 0.0),
        dvec3(0.0, 0.0, 1.0),
        dvec3(1.0, 0.0, 1.0),
        dvec3(1.0, 1.0, 1.0),
        dvec3(0.0, 1.0, 1.0),
    ];
    let open_facets = vec![
        vec![0, 3, 2, 1],
        vec![0, 1, 5, 4],
        vec![2, 3, 7, 6],
        vec![0, 4, 7, 3],
        vec![1, 2, 6, 5],
    ];
    let err = PolyhedronSet::from_facets(vertices, open_facets).unwrap_err();
    assert!(err.to_string().contains("open boundary"));
}

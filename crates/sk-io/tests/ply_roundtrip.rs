use sk_bsp::Location;
use sk_io::{read_ply, write_ply, PolyMesh};
use sk_math::Point3;

fn tetra_mesh() -> PolyMesh {
    PolyMesh {
        vertices: vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ],
        faces: vec![
            vec![0, 2, 1],
            vec![0, 1, 3],
            vec![0, 3, 2],
            vec![1, 2, 3],
        ],
    }
}

#[test]
fn test_write_then_read_preserves_mesh() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tetra.ply");

    let mesh = tetra_mesh();
    write_ply(&mesh, &path).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("ply\nformat ascii 1.0\n"));
    assert!(content.contains("element vertex 4"));
    assert!(content.contains("element face 4"));
    assert!(content.contains("end_header"));
    assert!(content.contains("3 1 2 3"));

    let back = read_ply(&path).unwrap();
    assert_eq!(back.vertices.len(), 4);
    assert_eq!(back.faces, mesh.faces);
    for (a, b) in back.vertices.iter().zip(&mesh.vertices) {
        assert!((*a - *b).length() < 1e-6);
    }
}

#[test]
fn test_file_to_region_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tetra.ply");
    write_ply(&tetra_mesh(), &path).unwrap();

    let region = read_ply(&path).unwrap().into_region().unwrap();
    assert!((region.size() - 1.0 / 6.0).abs() < 1e-9);
    assert_eq!(region.check_point(Point3::new(0.1, 0.1, 0.1)), Location::Inside);
    assert_eq!(region.check_point(Point3::new(1.0, 1.0, 1.0)), Location::Outside);
}

#[test]
fn test_missing_file_is_io_error() {
    let err = read_ply("/nonexistent/path/mesh.ply").unwrap_err();
    assert!(matches!(err, sk_core::GeomError::Io(_)));
}

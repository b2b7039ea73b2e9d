//! Minimal ASCII PLY (Polygon File Format) support.
//!
//! Recognized header:
//! ```text
//! ply
//! format ascii 1.0
//! element vertex N
//! property float x
//! property float y
//! property float z
//! element face M
//! property list uchar int vertex_indices
//! end_header
//! ```
//! followed by `N` coordinate lines and `M` index-list lines. Extra
//! `property` and `comment` lines are accepted and ignored.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use sk_bsp::PolyhedronSet;
use sk_core::{GeomError, Result};
use sk_math::Point3;

/// A face-vertex mesh as read from (or written to) a PLY file.
#[derive(Debug, Clone, Default)]
pub struct PolyMesh {
    pub vertices: Vec<Point3>,
    pub faces: Vec<Vec<usize>>,
}

impl PolyMesh {
    /// Build the validated polyhedral region bounded by this mesh.
    pub fn into_region(self) -> Result<PolyhedronSet> {
        PolyhedronSet::from_facets(self.vertices, self.faces)
    }
}

fn parse_failure(line: &str) -> GeomError {
    GeomError::Parse(format!("unable to parse line: \"{line}\""))
}

/// Parse ASCII PLY text into a mesh.
pub fn parse_ply(input: &str) -> Result<PolyMesh> {
    let mut lines = input.lines().map(str::trim).filter(|l| !l.is_empty());

    match lines.next() {
        Some("ply") => {}
        other => {
            return Err(GeomError::Parse(format!(
                "expected \"ply\" magic, got {other:?}"
            )))
        }
    }

    let mut vertex_count: Option<usize> = None;
    let mut face_count: Option<usize> = None;
    let mut current_element = "";

    // Header.
    loop {
        let line = lines
            .next()
            .ok_or_else(|| GeomError::Parse("missing end_header".into()))?;
        let mut words = line.split_whitespace();
        match words.next() {
            Some("format") => {
                let rest: Vec<&str> = words.collect();
                if rest != ["ascii", "1.0"] {
                    return Err(GeomError::Parse(format!(
                        "unsupported format: \"{line}\" (only ascii 1.0)"
                    )));
                }
            }
            Some("comment") => {}
            Some("element") => {
                let kind = words.next().ok_or_else(|| parse_failure(line))?;
                let count: usize = words
                    .next()
                    .and_then(|w| w.parse().ok())
                    .ok_or_else(|| parse_failure(line))?;
                current_element = match kind {
                    "vertex" => {
                        vertex_count = Some(count);
                        "vertex"
                    }
                    "face" => {
                        face_count = Some(count);
                        "face"
                    }
                    _ => "", // unknown elements tolerated if empty
                };
                if current_element.is_empty() && count > 0 {
                    return Err(GeomError::Parse(format!(
                        "unsupported element: \"{line}\""
                    )));
                }
            }
            Some("property") => {}
            Some("end_header") => break,
            _ => return Err(parse_failure(line)),
        }
    }

    let vertex_count = vertex_count.ok_or_else(|| {
        GeomError::Parse("header declares no vertex element".into())
    })?;
    let face_count = face_count.unwrap_or(0);

    // Body: vertex coordinate lines.
    let mut mesh = PolyMesh::default();
    for _ in 0..vertex_count {
        let line = lines
            .next()
            .ok_or_else(|| GeomError::Parse("unexpected end of vertex list".into()))?;
        let coords: std::result::Result<Vec<f64>, _> = line
            .split_whitespace()
            .take(3)
            .map(str::parse::<f64>)
            .collect();
        match coords {
            Ok(c) if c.len() == 3 => mesh.vertices.push(Point3::new(c[0], c[1], c[2])),
            _ => return Err(parse_failure(line)),
        }
    }

    // Body: face index-list lines (`count i0 i1 ... i{count-1}`).
    for _ in 0..face_count {
        let line = lines
            .next()
            .ok_or_else(|| GeomError::Parse("unexpected end of face list".into()))?;
        let nums: std::result::Result<Vec<usize>, _> =
            line.split_whitespace().map(str::parse::<usize>).collect();
        let nums = nums.map_err(|_| parse_failure(line))?;
        match nums.split_first() {
            Some((&count, indices)) if indices.len() == count && count >= 3 => {
                mesh.faces.push(indices.to_vec());
            }
            _ => return Err(parse_failure(line)),
        }
    }

    Ok(mesh)
}

/// Read a mesh from an ASCII PLY file.
pub fn read_ply<P: AsRef<Path>>(path: P) -> Result<PolyMesh> {
    let text = std::fs::read_to_string(path)?;
    parse_ply(&text)
}

/// Write a mesh as ASCII PLY.
pub fn write_ply<P: AsRef<Path>>(mesh: &PolyMesh, path: P) -> Result<()> {
    let mut file = File::create(path)?;

    writeln!(file, "ply")?;
    writeln!(file, "format ascii 1.0")?;
    writeln!(file, "element vertex {}", mesh.vertices.len())?;
    writeln!(file, "property float x")?;
    writeln!(file, "property float y")?;
    writeln!(file, "property float z")?;
    writeln!(file, "element face {}", mesh.faces.len())?;
    writeln!(file, "property list uchar int vertex_indices")?;
    writeln!(file, "end_header")?;

    for v in &mesh.vertices {
        writeln!(file, "{:.6} {:.6} {:.6}", v.x, v.y, v.z)?;
    }
    for face in &mesh.faces {
        write!(file, "{}", face.len())?;
        for idx in face {
            write!(file, " {idx}")?;
        }
        writeln!(file)?;
    }

    Ok(())
}

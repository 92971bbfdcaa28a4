//! OFF (Object File Format) support.
//!
//! ```text
//! OFF
//! <vertices> <faces> <edges>
//! x y z
//! ...
//! n i0 i1 ... i(n-1)
//! ```
//!
//! Indices are zero-based. Polygons with more than three corners are split
//! into a triangle fan on load. Anything after `#` on a line is ignored, as
//! are trailing per-face colour values.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use nalgebra::Point3;

use crate::error::{MeshError, Result};
use crate::mesh::{build_from_triangles, to_face_vertex, HalfEdgeMesh, MeshIndex};

const MAX_PREALLOCATION: usize = 1 << 20;

/// Load a mesh from an OFF file.
///
/// # Example
///
/// ```no_run
/// use edgefold::io::off;
/// use edgefold::mesh::HalfEdgeMesh;
///
/// let mesh: HalfEdgeMesh = off::load("model.off").unwrap();
/// ```
pub fn load<P: AsRef<Path>, I: MeshIndex>(path: P) -> Result<HalfEdgeMesh<I>> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);

    let (vertices, faces) = read(reader).map_err(|message| MeshError::LoadError {
        path: path.to_path_buf(),
        message,
    })?;

    build_from_triangles(&vertices, &faces)
}

/// Save a mesh to an OFF file. Removed elements are skipped.
pub fn save<P: AsRef<Path>, I: MeshIndex>(mesh: &HalfEdgeMesh<I>, path: P) -> Result<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    write(mesh, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Parse OFF text into positions and triangles.
pub fn read<R: BufRead>(reader: R) -> std::result::Result<(Vec<Point3<f64>>, Vec<[usize; 3]>), String> {
    let mut lines = Vec::new();
    for line in reader.lines() {
        let line = line.map_err(|e| e.to_string())?;
        let content = line.split('#').next().unwrap_or("").trim().to_string();
        if !content.is_empty() {
            lines.push(content);
        }
    }
    let mut lines = lines.into_iter();

    // The counts may share the header line.
    let header = lines.next().ok_or("empty file")?;
    let mut tokens: Vec<String> = header.split_whitespace().map(str::to_string).collect();
    if tokens.first().map(String::as_str) != Some("OFF") {
        return Err(format!("expected 'OFF' header, got '{}'", tokens[0]));
    }
    tokens.remove(0);
    if tokens.is_empty() {
        let counts = lines.next().ok_or("missing element counts")?;
        tokens = counts.split_whitespace().map(str::to_string).collect();
    }
    if tokens.len() < 2 {
        return Err("missing element counts".to_string());
    }
    let num_vertices = parse_count(&tokens[0])?;
    let num_faces = parse_count(&tokens[1])?;

    // Counts come from the file, so they only bound the preallocation.
    let mut vertices = Vec::with_capacity(num_vertices.min(MAX_PREALLOCATION));
    for i in 0..num_vertices {
        let line = lines
            .next()
            .ok_or_else(|| format!("expected {} vertices, found {}", num_vertices, i))?;
        let coords: Vec<f64> = line
            .split_whitespace()
            .take(3)
            .map(|t| t.parse::<f64>().map_err(|e| format!("vertex {}: {}", i, e)))
            .collect::<std::result::Result<_, _>>()?;
        if coords.len() < 3 {
            return Err(format!("vertex {} has fewer than 3 coordinates", i));
        }
        vertices.push(Point3::new(coords[0], coords[1], coords[2]));
    }

    let mut faces = Vec::with_capacity(num_faces.min(MAX_PREALLOCATION));
    for f in 0..num_faces {
        let line = lines
            .next()
            .ok_or_else(|| format!("expected {} faces, found {}", num_faces, f))?;
        let mut fields = line.split_whitespace();
        let corners = parse_count(fields.next().ok_or_else(|| format!("face {} is empty", f))?)?;
        if corners < 3 {
            return Err(format!("face {} has {} corners", f, corners));
        }
        let polygon: Vec<usize> = fields
            .take(corners)
            .map(parse_count)
            .collect::<std::result::Result<_, _>>()?;
        if polygon.len() < corners {
            return Err(format!("face {} lists fewer than {} indices", f, corners));
        }
        for k in 1..corners - 1 {
            faces.push([polygon[0], polygon[k], polygon[k + 1]]);
        }
    }

    Ok((vertices, faces))
}

/// Write the live part of `mesh` as OFF text.
pub fn write<W: Write, I: MeshIndex>(mesh: &HalfEdgeMesh<I>, out: &mut W) -> Result<()> {
    let (vertices, faces) = to_face_vertex(mesh);

    writeln!(out, "OFF")?;
    writeln!(out, "{} {} {}", vertices.len(), faces.len(), mesh.num_edges())?;
    for p in &vertices {
        writeln!(out, "{} {} {}", p.x, p.y, p.z)?;
    }
    for f in &faces {
        writeln!(out, "3 {} {} {}", f[0], f[1], f[2])?;
    }
    Ok(())
}

fn parse_count(token: &str) -> std::result::Result<usize, String> {
    token
        .parse::<usize>()
        .map_err(|e| format!("invalid integer '{}': {}", token, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::fixtures;

    #[test]
    fn test_read_triangles() {
        let text = "OFF\n# a comment\n3 1 0\n0 0 0\n1 0 0\n0 1 0\n3 0 1 2\n";
        let (vertices, faces) = read(text.as_bytes()).unwrap();
        assert_eq!(vertices.len(), 3);
        assert_eq!(vertices[1], Point3::new(1.0, 0.0, 0.0));
        assert_eq!(faces, vec![[0, 1, 2]]);
    }

    #[test]
    fn test_read_fans_polygons() {
        let text = "OFF 4 1 4\n0 0 0\n1 0 0\n1 1 0\n0 1 0\n4 0 1 2 3 255 0 0\n";
        let (_, faces) = read(text.as_bytes()).unwrap();
        assert_eq!(faces, vec![[0, 1, 2], [0, 2, 3]]);
    }

    #[test]
    fn test_read_errors() {
        assert!(read("".as_bytes()).is_err());
        assert!(read("PLY\n3 1 0\n".as_bytes()).is_err());
        assert!(read("OFF\n3 1 0\n0 0 0\n".as_bytes()).is_err());
        assert!(read("OFF\n3 1 0\n0 0 0\n1 0 0\n0 1 0\n2 0 1\n".as_bytes()).is_err());
    }

    #[test]
    fn test_read_huge_counts() {
        let text = "OFF\n18446744073709551615 1 0\n0 0 0\n";
        let err = read(text.as_bytes()).unwrap_err();
        assert!(err.contains("expected 18446744073709551615 vertices"));

        let text = "OFF\n3 18446744073709551615 0\n0 0 0\n1 0 0\n0 1 0\n3 0 1 2\n";
        assert!(read(text.as_bytes()).is_err());
    }

    #[test]
    fn test_write_then_read() {
        let mesh = fixtures::octahedron();
        let mut buffer = Vec::new();
        write(&mesh, &mut buffer).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        assert!(text.starts_with("OFF\n6 8 12\n"));

        let (vertices, faces) = read(text.as_bytes()).unwrap();
        let rebuilt: HalfEdgeMesh = build_from_triangles(&vertices, &faces).unwrap();
        assert_eq!(rebuilt.num_edges(), 12);
        assert!(rebuilt.is_valid());
    }

    #[test]
    fn test_write_skips_removed() {
        let mut mesh = fixtures::octahedron();
        let h = mesh.halfedge_ids().next().unwrap();
        mesh.collapse_edge(h);

        let mut buffer = Vec::new();
        write(&mesh, &mut buffer).unwrap();
        let (vertices, faces) = read(buffer.as_slice()).unwrap();
        assert_eq!(vertices.len(), 5);
        assert_eq!(faces.len(), 6);
    }
}

//! STL (stereolithography) format support.
//!
//! STL stores a triangle soup: every triangle carries its own three corners.
//! Loading welds corners with bit-identical coordinates back into shared
//! vertices so the result has connectivity to simplify. Saving always writes
//! binary STL.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use nalgebra::Point3;

use crate::error::{MeshError, Result};
use crate::mesh::{build_from_triangles, HalfEdgeMesh, MeshIndex};

/// Load a mesh from an STL file.
///
/// Automatically detects binary vs ASCII format.
///
/// # Example
///
/// ```no_run
/// use edgefold::io::stl;
/// use edgefold::mesh::HalfEdgeMesh;
///
/// let mesh: HalfEdgeMesh = stl::load("model.stl").unwrap();
/// ```
pub fn load<P: AsRef<Path>, I: MeshIndex>(path: P) -> Result<HalfEdgeMesh<I>> {
    let path = path.as_ref();
    let mut file = File::open(path)?;

    let stl = stl_io::read_stl(&mut file).map_err(|e| MeshError::LoadError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut welded: HashMap<[u32; 3], usize> = HashMap::new();
    let mut vertices: Vec<Point3<f64>> = Vec::new();
    let mut remap = Vec::with_capacity(stl.vertices.len());
    for v in &stl.vertices {
        let key = [v[0].to_bits(), v[1].to_bits(), v[2].to_bits()];
        let index = *welded.entry(key).or_insert_with(|| {
            vertices.push(Point3::new(v[0] as f64, v[1] as f64, v[2] as f64));
            vertices.len() - 1
        });
        remap.push(index);
    }

    let faces: Vec<[usize; 3]> = stl
        .faces
        .iter()
        .map(|tri| tri.vertices.map(|i| remap[i]))
        // Slivers that weld to a repeated corner carry no area.
        .filter(|f| f[0] != f[1] && f[1] != f[2] && f[0] != f[2])
        .collect();

    if faces.is_empty() {
        return Err(MeshError::LoadError {
            path: path.to_path_buf(),
            message: "STL file contains no valid triangles".to_string(),
        });
    }

    build_from_triangles(&vertices, &faces)
}

/// Save a mesh to a binary STL file. Removed elements are skipped.
pub fn save<P: AsRef<Path>, I: MeshIndex>(mesh: &HalfEdgeMesh<I>, path: P) -> Result<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);

    stl_io::write_stl(&mut writer, triangles(mesh).iter()).map_err(|e| MeshError::SaveError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    writer.flush()?;

    Ok(())
}

fn triangles<I: MeshIndex>(mesh: &HalfEdgeMesh<I>) -> Vec<stl_io::Triangle> {
    let vertex = |p: &Point3<f64>| stl_io::Vertex::new([p.x as f32, p.y as f32, p.z as f32]);

    mesh.face_ids()
        .map(|f| {
            let [p0, p1, p2] = mesh.face_positions(f);
            let n = mesh.face_normal(f);

            stl_io::Triangle {
                normal: stl_io::Normal::new([n.x as f32, n.y as f32, n.z as f32]),
                vertices: [vertex(&p0), vertex(&p1), vertex(&p2)],
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::fixtures;

    #[test]
    fn test_save_then_load_welds_vertices() {
        let mesh = fixtures::octahedron();
        let path = std::env::temp_dir().join(format!("edgefold-stl-{}.stl", std::process::id()));

        save(&mesh, &path).unwrap();
        let loaded: HalfEdgeMesh = load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.num_vertices(), 6);
        assert_eq!(loaded.num_edges(), 12);
        assert_eq!(loaded.num_faces(), 8);
        assert!(loaded.is_valid());
    }

    #[test]
    fn test_triangle_normals() {
        let mesh = fixtures::single_triangle();
        let tris = triangles(&mesh);
        assert_eq!(tris.len(), 1);
        let n = tris[0].normal;
        assert!((n[2].abs() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_load_missing_file() {
        let result: Result<HalfEdgeMesh> = load("/nonexistent/edgefold/mesh.stl");
        assert!(matches!(result, Err(MeshError::Io(_))));
    }
}

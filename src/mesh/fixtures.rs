//! Small meshes shared by the unit tests.

use nalgebra::Point3;

use super::builder::build_from_triangles;
use super::halfedge::HalfEdgeMesh;

/// A single triangle; every edge is a border edge.
pub fn single_triangle() -> HalfEdgeMesh {
    let vertices = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(0.5, 1.0, 0.0),
    ];
    build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap()
}

/// A closed tetrahedron: 4 vertices, 6 edges, 4 faces.
pub fn tetrahedron() -> HalfEdgeMesh {
    let vertices = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(0.0, 0.0, 1.0),
    ];
    let faces = vec![[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]];
    build_from_triangles(&vertices, &faces).unwrap()
}

/// A closed octahedron: 6 vertices, 12 edges, 8 faces.
pub fn octahedron() -> HalfEdgeMesh {
    let (vertices, faces) = octahedron_faces();
    build_from_triangles(&vertices, &faces).unwrap()
}

/// The octahedron without its face `(0, 2, 4)`: a disk whose border is the
/// three-edge loop `0 - 2 - 4`.
pub fn open_octahedron() -> HalfEdgeMesh {
    let (vertices, faces) = octahedron_faces();
    build_from_triangles(&vertices, &faces[1..]).unwrap()
}

fn octahedron_faces() -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
    let vertices = vec![
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(-1.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(0.0, -1.0, 0.0),
        Point3::new(0.0, 0.0, 1.0),
        Point3::new(0.0, 0.0, -1.0),
    ];
    let faces = vec![
        [0, 2, 4],
        [2, 1, 4],
        [1, 3, 4],
        [3, 0, 4],
        [2, 0, 5],
        [1, 2, 5],
        [3, 1, 5],
        [0, 3, 5],
    ];
    (vertices, faces)
}

/// Vertex positions and triangles of an `n x n` grid of unit squares in the
/// XY plane. Vertex `(i, j)` sits at index `j * (n + 1) + i`.
pub fn grid_faces(n: usize) -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
    let mut vertices = Vec::with_capacity((n + 1) * (n + 1));
    for j in 0..=n {
        for i in 0..=n {
            vertices.push(Point3::new(i as f64, j as f64, 0.0));
        }
    }

    let mut faces = Vec::with_capacity(2 * n * n);
    for j in 0..n {
        for i in 0..n {
            let v00 = j * (n + 1) + i;
            let v10 = v00 + 1;
            let v01 = v00 + n + 1;
            let v11 = v01 + 1;
            faces.push([v00, v10, v11]);
            faces.push([v00, v11, v01]);
        }
    }

    (vertices, faces)
}

/// An `n x n` grid of unit squares, each split along its rising diagonal.
pub fn grid(n: usize) -> HalfEdgeMesh {
    let (vertices, faces) = grid_faces(n);
    build_from_triangles(&vertices, &faces).unwrap()
}

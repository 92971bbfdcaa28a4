//! Mesh construction utilities.
//!
//! This module provides functions for building half-edge meshes from
//! face-vertex lists as commonly found in mesh file formats, and for
//! converting them back.

use std::collections::HashMap;

use nalgebra::Point3;

use super::halfedge::HalfEdgeMesh;
use super::index::{HalfEdgeId, MeshIndex, VertexId};
use crate::error::{MeshError, Result};

/// Build a half-edge mesh from vertices and triangle faces.
///
/// Both halves of an edge are allocated together, so the twin of half-edge
/// `h` is always `h ^ 1`. Faces must be consistently oriented: a directed
/// edge used by two faces is reported as [`MeshError::NonManifoldEdge`].
///
/// # Arguments
/// * `vertices` - List of vertex positions
/// * `faces` - List of triangle faces, each as [v0, v1, v2] indices
///
/// # Returns
/// A half-edge mesh, or an error if the input is invalid.
///
/// # Example
/// ```
/// use edgefold::mesh::{build_from_triangles, HalfEdgeMesh};
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.5, 1.0, 0.0),
/// ];
/// let faces = vec![[0, 1, 2]];
///
/// let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &faces).unwrap();
/// assert_eq!(mesh.num_vertices(), 3);
/// assert_eq!(mesh.num_edges(), 3);
/// assert_eq!(mesh.num_faces(), 1);
/// ```
pub fn build_from_triangles<I: MeshIndex>(
    vertices: &[Point3<f64>],
    faces: &[[usize; 3]],
) -> Result<HalfEdgeMesh<I>> {
    if faces.is_empty() {
        return Err(MeshError::EmptyMesh);
    }
    if vertices.len() > I::MAX.to_usize() {
        return Err(MeshError::invalid_param(
            "vertices",
            vertices.len(),
            "too many vertices for the index type",
        ));
    }
    if faces.len() > I::MAX.to_usize() {
        return Err(MeshError::invalid_param(
            "faces",
            faces.len(),
            "too many faces for the index type",
        ));
    }

    // Validate vertex indices
    for (fi, face) in faces.iter().enumerate() {
        for &vi in face {
            if vi >= vertices.len() {
                return Err(MeshError::InvalidVertexIndex { face: fi, vertex: vi });
            }
        }
        // Check for degenerate faces
        if face[0] == face[1] || face[1] == face[2] || face[0] == face[2] {
            return Err(MeshError::DegenerateFace { face: fi });
        }
    }

    let mut mesh = HalfEdgeMesh::with_capacity(vertices.len(), faces.len());

    let vertex_ids: Vec<VertexId<I>> = vertices
        .iter()
        .map(|&pos| mesh.add_vertex(pos))
        .collect();

    // Directed edge (a, b) -> half-edge going from a to b. Both directions
    // are registered as soon as the pair is allocated.
    let mut edge_map: HashMap<(usize, usize), HalfEdgeId<I>> = HashMap::new();

    // First pass: allocate half-edge pairs and faces
    for face in faces {
        let mut hes = [HalfEdgeId::<I>::invalid(); 3];

        for k in 0..3 {
            let a = face[k];
            let b = face[(k + 1) % 3];

            let he = match edge_map.get(&(a, b)) {
                Some(&he) => {
                    if mesh.halfedge(he).face.is_valid() {
                        return Err(MeshError::NonManifoldEdge { v0: a, v1: b });
                    }
                    he
                }
                None => {
                    // The new pair takes ids `len` and `len + 1`.
                    if edge_map.len() + 1 > I::MAX.to_usize() {
                        return Err(MeshError::invalid_param(
                            "faces",
                            faces.len(),
                            "too many half-edges for the index type",
                        ));
                    }
                    let he = mesh.add_halfedge_pair(vertex_ids[a], vertex_ids[b]);
                    edge_map.insert((a, b), he);
                    edge_map.insert((b, a), he.twin());
                    he
                }
            };
            hes[k] = he;
        }

        let face_id = mesh.add_face(hes[0]);

        for k in 0..3 {
            let he = mesh.halfedge_mut(hes[k]);
            he.next = hes[(k + 1) % 3];
            he.prev = hes[(k + 2) % 3];
            he.face = face_id;
        }

        // Set vertex half-edges (will be overwritten for shared vertices)
        for k in 0..3 {
            mesh.vertex_mut(vertex_ids[face[k]]).halfedge = hes[k];
        }
    }

    // Second pass: link boundary half-edges into loops
    link_boundary_loops(&mut mesh);

    // Third pass: ensure boundary vertices point to boundary half-edges
    fix_boundary_vertex_halfedges(&mut mesh);

    Ok(mesh)
}

/// Link boundary half-edges into proper loops.
fn link_boundary_loops<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>) {
    let boundary_hes: Vec<HalfEdgeId<I>> = mesh
        .halfedge_ids()
        .filter(|&he| mesh.is_boundary_halfedge(he))
        .collect();

    // Group by origin vertex for quick lookup
    let mut outgoing: HashMap<usize, HalfEdgeId<I>> = HashMap::new();
    for &he in &boundary_hes {
        outgoing.insert(mesh.origin(he).index(), he);
    }

    for &he in &boundary_hes {
        // The next boundary half-edge starts where this one ends
        let dest = mesh.dest(he).index();
        if let Some(&next_he) = outgoing.get(&dest) {
            mesh.halfedge_mut(he).next = next_he;
            mesh.halfedge_mut(next_he).prev = he;
        }
    }
}

/// Ensure boundary vertices point to a boundary half-edge.
fn fix_boundary_vertex_halfedges<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>) {
    for vid in mesh.vertex_ids().collect::<Vec<_>>() {
        let start_he = mesh.vertex(vid).halfedge;
        if !start_he.is_valid() {
            continue;
        }

        // Same walk as VertexHalfEdgeIter: twin -> next
        let mut he = start_he;
        loop {
            if mesh.is_boundary_halfedge(he) {
                mesh.vertex_mut(vid).halfedge = he;
                break;
            }
            he = mesh.next(mesh.twin(he));
            if he == start_he || !he.is_valid() {
                break;
            }
        }
    }
}

/// Convert a half-edge mesh back to a face-vertex representation.
///
/// Removed elements are skipped and the surviving vertices are renumbered
/// densely in their original order. Returns a (vertices, faces) tuple.
pub fn to_face_vertex<I: MeshIndex>(mesh: &HalfEdgeMesh<I>) -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
    let mut remap = vec![usize::MAX; mesh.vertices.len()];
    let mut vertices = Vec::with_capacity(mesh.num_vertices());
    for v in mesh.vertex_ids() {
        remap[v.index()] = vertices.len();
        vertices.push(*mesh.position(v));
    }

    let faces: Vec<[usize; 3]> = mesh
        .face_ids()
        .map(|f| {
            let [v0, v1, v2] = mesh.face_triangle(f);
            [remap[v0.index()], remap[v1.index()], remap[v2.index()]]
        })
        .collect();

    (vertices, faces)
}

impl<I: MeshIndex> HalfEdgeMesh<I> {
    /// Rebuild the mesh without removed elements.
    ///
    /// Vertices keep their relative order. Half-edge and face ids are
    /// reassigned, so any ids held from before the call are invalidated.
    pub fn compact(&self) -> Result<Self> {
        let (vertices, faces) = to_face_vertex(self);
        build_from_triangles(&vertices, &faces)
    }
}

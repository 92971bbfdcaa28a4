//! Half-edge mesh data structure.
//!
//! This module provides a half-edge (doubly-connected edge list) representation
//! for triangle meshes. This structure enables O(1) adjacency queries and local
//! topology edits such as edge collapses.
//!
//! # Structure
//!
//! - Each edge is split into two **half-edges** pointing in opposite directions,
//!   stored at adjacent slots `2k` and `2k + 1`
//! - Each half-edge knows its **origin vertex**, **next** and **prev** half-edges
//!   around its face, and its **incident face**
//! - Each vertex stores one outgoing half-edge
//! - Each face stores one half-edge on its boundary
//!
//! # Boundary Handling
//!
//! Boundary half-edges have an invalid face ID. Boundary loops are linked with
//! `next`/`prev` like face loops, and a boundary vertex always points at one of
//! its outgoing boundary half-edges.
//!
//! # Removal
//!
//! Elements are never moved once allocated. Collapsing an edge marks the
//! affected elements as removed and keeps live counters up to date, so ids stay
//! stable for the lifetime of the mesh. [`HalfEdgeMesh::compact`] produces a
//! fresh, densely indexed copy.

use nalgebra::{Point3, Vector3};

use super::index::{EdgeId, FaceId, HalfEdgeId, MeshIndex, VertexId};

/// A vertex in the half-edge mesh.
#[derive(Debug, Clone)]
pub struct Vertex<I: MeshIndex = u32> {
    /// The 3D position of this vertex.
    pub position: Point3<f64>,

    /// One outgoing half-edge from this vertex.
    /// For boundary vertices, this is guaranteed to be a boundary half-edge.
    pub halfedge: HalfEdgeId<I>,

    /// Whether the vertex has been removed by a collapse.
    pub removed: bool,
}

impl<I: MeshIndex> Vertex<I> {
    /// Create a new vertex at the given position.
    pub fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            halfedge: HalfEdgeId::invalid(),
            removed: false,
        }
    }
}

/// A half-edge in the mesh.
#[derive(Debug, Clone, Copy)]
pub struct HalfEdge<I: MeshIndex = u32> {
    /// The vertex this half-edge originates from.
    pub origin: VertexId<I>,

    /// The next half-edge around the face (counter-clockwise).
    pub next: HalfEdgeId<I>,

    /// The previous half-edge around the face.
    pub prev: HalfEdgeId<I>,

    /// The face this half-edge belongs to.
    /// Invalid for boundary half-edges.
    pub face: FaceId<I>,

    /// Whether the half-edge has been removed by a collapse.
    pub removed: bool,
}

impl<I: MeshIndex> HalfEdge<I> {
    /// Create a new uninitialized half-edge.
    pub fn new() -> Self {
        Self {
            origin: VertexId::invalid(),
            next: HalfEdgeId::invalid(),
            prev: HalfEdgeId::invalid(),
            face: FaceId::invalid(),
            removed: false,
        }
    }

    /// Check if this half-edge is on the boundary.
    #[inline]
    pub fn is_boundary(&self) -> bool {
        !self.face.is_valid()
    }
}

impl<I: MeshIndex> Default for HalfEdge<I> {
    fn default() -> Self {
        Self::new()
    }
}

/// A face in the half-edge mesh.
#[derive(Debug, Clone, Copy)]
pub struct Face<I: MeshIndex = u32> {
    /// One half-edge on the boundary of this face.
    pub halfedge: HalfEdgeId<I>,

    /// Whether the face has been removed by a collapse.
    pub removed: bool,
}

impl<I: MeshIndex> Face<I> {
    /// Create a new face with the given half-edge.
    pub fn new(halfedge: HalfEdgeId<I>) -> Self {
        Self {
            halfedge,
            removed: false,
        }
    }
}

/// A half-edge mesh data structure for triangle meshes.
#[derive(Debug, Clone)]
pub struct HalfEdgeMesh<I: MeshIndex = u32> {
    pub(crate) vertices: Vec<Vertex<I>>,
    pub(crate) halfedges: Vec<HalfEdge<I>>,
    pub(crate) faces: Vec<Face<I>>,

    pub(crate) live_vertices: usize,
    pub(crate) live_halfedges: usize,
    pub(crate) live_faces: usize,
}

impl<I: MeshIndex> Default for HalfEdgeMesh<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: MeshIndex> HalfEdgeMesh<I> {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            halfedges: Vec::new(),
            faces: Vec::new(),
            live_vertices: 0,
            live_halfedges: 0,
            live_faces: 0,
        }
    }

    /// Create a mesh with pre-allocated capacity.
    pub fn with_capacity(num_vertices: usize, num_faces: usize) -> Self {
        // Closed mesh: E = 3F/2, so HE = 3F. Leave some room for boundaries.
        let num_halfedges = num_faces * 3 + num_faces / 2;

        Self {
            vertices: Vec::with_capacity(num_vertices),
            halfedges: Vec::with_capacity(num_halfedges),
            faces: Vec::with_capacity(num_faces),
            live_vertices: 0,
            live_halfedges: 0,
            live_faces: 0,
        }
    }

    // ==================== Accessors ====================

    /// Number of live vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.live_vertices
    }

    /// Number of live half-edges.
    #[inline]
    pub fn num_halfedges(&self) -> usize {
        self.live_halfedges
    }

    /// Number of live (full) edges.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.live_halfedges / 2
    }

    /// Number of live faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.live_faces
    }

    /// Number of half-edge slots ever allocated, including removed ones.
    ///
    /// Every half-edge id of this mesh is smaller than this bound.
    #[inline]
    pub fn halfedge_capacity(&self) -> usize {
        self.halfedges.len()
    }

    /// Get a vertex by ID.
    #[inline]
    pub fn vertex(&self, id: VertexId<I>) -> &Vertex<I> {
        &self.vertices[id.index()]
    }

    /// Get a mutable vertex by ID.
    #[inline]
    pub fn vertex_mut(&mut self, id: VertexId<I>) -> &mut Vertex<I> {
        &mut self.vertices[id.index()]
    }

    /// Get a half-edge by ID.
    #[inline]
    pub fn halfedge(&self, id: HalfEdgeId<I>) -> &HalfEdge<I> {
        &self.halfedges[id.index()]
    }

    /// Get a mutable half-edge by ID.
    #[inline]
    pub fn halfedge_mut(&mut self, id: HalfEdgeId<I>) -> &mut HalfEdge<I> {
        &mut self.halfedges[id.index()]
    }

    /// Get a face by ID.
    #[inline]
    pub fn face(&self, id: FaceId<I>) -> &Face<I> {
        &self.faces[id.index()]
    }

    /// Get a mutable face by ID.
    #[inline]
    pub fn face_mut(&mut self, id: FaceId<I>) -> &mut Face<I> {
        &mut self.faces[id.index()]
    }

    /// Get the position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId<I>) -> &Point3<f64> {
        &self.vertex(v).position
    }

    /// Set the position of a vertex.
    #[inline]
    pub fn set_position(&mut self, v: VertexId<I>, pos: Point3<f64>) {
        self.vertex_mut(v).position = pos;
    }

    /// Whether a vertex has been removed.
    #[inline]
    pub fn is_vertex_removed(&self, v: VertexId<I>) -> bool {
        self.vertex(v).removed
    }

    /// Whether a half-edge has been removed.
    #[inline]
    pub fn is_halfedge_removed(&self, he: HalfEdgeId<I>) -> bool {
        self.halfedge(he).removed
    }

    /// Whether a face has been removed.
    #[inline]
    pub fn is_face_removed(&self, f: FaceId<I>) -> bool {
        self.face(f).removed
    }

    // ==================== Topology Queries ====================

    /// Get the twin (opposite) half-edge.
    #[inline]
    pub fn twin(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        he.twin()
    }

    /// Get the next half-edge around the face.
    #[inline]
    pub fn next(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).next
    }

    /// Get the previous half-edge around the face.
    #[inline]
    pub fn prev(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).prev
    }

    /// Get the origin vertex of a half-edge.
    #[inline]
    pub fn origin(&self, he: HalfEdgeId<I>) -> VertexId<I> {
        self.halfedge(he).origin
    }

    /// Get the destination vertex of a half-edge.
    #[inline]
    pub fn dest(&self, he: HalfEdgeId<I>) -> VertexId<I> {
        self.origin(self.twin(he))
    }

    /// Get the face of a half-edge.
    #[inline]
    pub fn face_of(&self, he: HalfEdgeId<I>) -> FaceId<I> {
        self.halfedge(he).face
    }

    /// Check if a half-edge is on the boundary.
    #[inline]
    pub fn is_boundary_halfedge(&self, he: HalfEdgeId<I>) -> bool {
        self.halfedge(he).is_boundary()
    }

    /// Check if a vertex is on the boundary.
    pub fn is_boundary_vertex(&self, v: VertexId<I>) -> bool {
        if !self.vertex(v).halfedge.is_valid() {
            return true; // Isolated vertex
        }
        self.vertex_halfedges(v)
            .any(|he| self.is_boundary_halfedge(he))
    }

    /// Find the half-edge going from `from` to `to`, if the vertices are adjacent.
    pub fn find_halfedge(&self, from: VertexId<I>, to: VertexId<I>) -> Option<HalfEdgeId<I>> {
        self.vertex_halfedges(from).find(|&he| self.dest(he) == to)
    }

    // ==================== Iteration ====================

    /// Iterate over live vertex IDs.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId<I>> + '_ {
        self.vertices
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.removed)
            .map(|(i, _)| VertexId::new(i))
    }

    /// Iterate over live half-edge IDs.
    pub fn halfedge_ids(&self) -> impl Iterator<Item = HalfEdgeId<I>> + '_ {
        self.halfedges
            .iter()
            .enumerate()
            .filter(|(_, he)| !he.removed)
            .map(|(i, _)| HalfEdgeId::new(i))
    }

    /// Iterate over live edge IDs.
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId<I>> + '_ {
        self.halfedges
            .iter()
            .step_by(2)
            .enumerate()
            .filter(|(_, he)| !he.removed)
            .map(|(i, _)| EdgeId::new(i))
    }

    /// Iterate over live face IDs.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId<I>> + '_ {
        self.faces
            .iter()
            .enumerate()
            .filter(|(_, f)| !f.removed)
            .map(|(i, _)| FaceId::new(i))
    }

    /// Iterate over half-edges around a vertex (outgoing half-edges).
    pub fn vertex_halfedges(&self, v: VertexId<I>) -> VertexHalfEdgeIter<'_, I> {
        VertexHalfEdgeIter::new(self, v)
    }

    /// Get the three vertices of a triangular face.
    pub fn face_triangle(&self, f: FaceId<I>) -> [VertexId<I>; 3] {
        let he0 = self.face(f).halfedge;
        let he1 = self.next(he0);
        let he2 = self.next(he1);
        [self.origin(he0), self.origin(he1), self.origin(he2)]
    }

    /// Get the positions of the three vertices of a triangular face.
    pub fn face_positions(&self, f: FaceId<I>) -> [Point3<f64>; 3] {
        let [v0, v1, v2] = self.face_triangle(f);
        [*self.position(v0), *self.position(v1), *self.position(v2)]
    }

    // ==================== Geometry ====================

    /// Compute the unit normal of a face, or zero for a face without area.
    pub fn face_normal(&self, f: FaceId<I>) -> Vector3<f64> {
        let [p0, p1, p2] = self.face_positions(f);
        (p1 - p0)
            .cross(&(p2 - p0))
            .try_normalize(f64::EPSILON)
            .unwrap_or_else(Vector3::zeros)
    }

    /// Compute the area of a face.
    pub fn face_area(&self, f: FaceId<I>) -> f64 {
        let [p0, p1, p2] = self.face_positions(f);
        0.5 * (p1 - p0).cross(&(p2 - p0)).norm()
    }

    /// Compute the length of an edge.
    pub fn edge_length(&self, he: HalfEdgeId<I>) -> f64 {
        self.edge_vector(he).norm()
    }

    /// Compute the edge vector (from origin to destination).
    pub fn edge_vector(&self, he: HalfEdgeId<I>) -> Vector3<f64> {
        self.position(self.dest(he)) - self.position(self.origin(he))
    }

    /// Compute the valence (degree) of a vertex.
    pub fn valence(&self, v: VertexId<I>) -> usize {
        self.vertex_halfedges(v).count()
    }

    /// Compute the bounding box of the live vertices.
    pub fn bounding_box(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let mut live = self.vertices.iter().filter(|v| !v.removed);
        let first = live.next()?;

        let mut min = first.position;
        let mut max = first.position;
        for v in live {
            for i in 0..3 {
                min[i] = min[i].min(v.position[i]);
                max[i] = max[i].max(v.position[i]);
            }
        }

        Some((min, max))
    }

    /// Compute the total surface area of the mesh.
    pub fn surface_area(&self) -> f64 {
        self.face_ids().map(|f| self.face_area(f)).sum()
    }

    /// Euler characteristic `V - E + F` over live elements.
    pub fn euler_characteristic(&self) -> i64 {
        self.num_vertices() as i64 - self.num_edges() as i64 + self.num_faces() as i64
    }

    // ==================== Construction ====================

    /// Add a new vertex and return its ID.
    pub fn add_vertex(&mut self, position: Point3<f64>) -> VertexId<I> {
        let id = VertexId::new(self.vertices.len());
        self.vertices.push(Vertex::new(position));
        self.live_vertices += 1;
        id
    }

    /// Allocate a new edge as a pair of unlinked half-edges `(a -> b, b -> a)`.
    pub(crate) fn add_halfedge_pair(&mut self, a: VertexId<I>, b: VertexId<I>) -> HalfEdgeId<I> {
        let id = HalfEdgeId::new(self.halfedges.len());
        self.halfedges.push(HalfEdge {
            origin: a,
            ..HalfEdge::new()
        });
        self.halfedges.push(HalfEdge {
            origin: b,
            ..HalfEdge::new()
        });
        self.live_halfedges += 2;
        id
    }

    /// Add a new face whose boundary starts at `halfedge`.
    pub(crate) fn add_face(&mut self, halfedge: HalfEdgeId<I>) -> FaceId<I> {
        let id = FaceId::new(self.faces.len());
        self.faces.push(Face::new(halfedge));
        self.live_faces += 1;
        id
    }

    // ==================== Validation ====================

    /// Check if the mesh is valid (all live connectivity is consistent).
    pub fn is_valid(&self) -> bool {
        for vid in self.vertex_ids() {
            let he = self.vertex(vid).halfedge;
            if !he.is_valid() {
                continue;
            }
            if self.is_halfedge_removed(he) || self.origin(he) != vid {
                return false;
            }
            // A boundary vertex must point at a boundary half-edge.
            let on_boundary = self.vertex_halfedges(vid).any(|h| self.is_boundary_halfedge(h));
            if on_boundary && !self.is_boundary_halfedge(he) {
                return false;
            }
        }

        for heid in self.halfedge_ids() {
            let he = self.halfedge(heid);
            if self.is_halfedge_removed(heid.twin()) {
                return false;
            }
            if !he.next.is_valid() || !he.prev.is_valid() {
                return false;
            }
            if self.is_halfedge_removed(he.next) || self.halfedge(he.next).prev != heid {
                return false;
            }
            if self.halfedge(he.prev).next != heid {
                return false;
            }
            if self.is_vertex_removed(he.origin) {
                return false;
            }
            // Consecutive half-edges meet at a vertex.
            if self.dest(heid) != self.origin(he.next) {
                return false;
            }
            if he.face.is_valid() {
                if self.is_face_removed(he.face) || self.face_of(he.next) != he.face {
                    return false;
                }
            } else if self.is_boundary_halfedge(heid.twin()) {
                // An edge with no face on either side.
                return false;
            }
        }

        for fid in self.face_ids() {
            let start = self.face(fid).halfedge;
            if !start.is_valid() || self.is_halfedge_removed(start) || self.face_of(start) != fid {
                return false;
            }
            // Triangle mesh: every face loop has exactly three half-edges.
            if self.next(self.next(self.next(start))) != start {
                return false;
            }
        }

        true
    }
}

/// Iterator over half-edges around a vertex.
pub struct VertexHalfEdgeIter<'a, I: MeshIndex = u32> {
    mesh: &'a HalfEdgeMesh<I>,
    start: HalfEdgeId<I>,
    current: HalfEdgeId<I>,
    done: bool,
}

impl<'a, I: MeshIndex> VertexHalfEdgeIter<'a, I> {
    fn new(mesh: &'a HalfEdgeMesh<I>, v: VertexId<I>) -> Self {
        let start = mesh.vertex(v).halfedge;
        Self {
            mesh,
            start,
            current: start,
            done: !start.is_valid(),
        }
    }
}

impl<'a, I: MeshIndex> Iterator for VertexHalfEdgeIter<'a, I> {
    type Item = HalfEdgeId<I>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.current;

        // If he goes v -> w, twin(he) goes w -> v and next(twin(he)) leaves v again.
        self.current = self.mesh.next(self.current.twin());

        if self.current == self.start {
            self.done = true;
        }

        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::fixtures;

    #[test]
    fn test_empty_mesh() {
        let mesh = HalfEdgeMesh::<u32>::new();
        assert_eq!(mesh.num_vertices(), 0);
        assert_eq!(mesh.num_halfedges(), 0);
        assert_eq!(mesh.num_faces(), 0);
        assert!(mesh.is_valid());
        assert!(mesh.bounding_box().is_none());
    }

    #[test]
    fn test_add_vertex() {
        let mut mesh = HalfEdgeMesh::<u32>::new();
        let v0 = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let v1 = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));

        assert_eq!(mesh.num_vertices(), 2);
        assert_eq!(v0.index(), 0);
        assert_eq!(v1.index(), 1);
        assert!(mesh.is_boundary_vertex(v0));
    }

    #[test]
    fn test_tetrahedron_counts() {
        let mesh = fixtures::tetrahedron();
        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_edges(), 6);
        assert_eq!(mesh.num_faces(), 4);
        assert_eq!(mesh.euler_characteristic(), 2);
        for v in mesh.vertex_ids() {
            assert_eq!(mesh.valence(v), 3);
            assert!(!mesh.is_boundary_vertex(v));
        }
    }

    #[test]
    fn test_grid_boundary() {
        let mesh = fixtures::grid(2);
        // 3x3 vertices, only the center one is interior
        let interior: Vec<_> = mesh
            .vertex_ids()
            .filter(|&v| !mesh.is_boundary_vertex(v))
            .collect();
        assert_eq!(interior, vec![VertexId::new(4)]);
        assert_eq!(mesh.euler_characteristic(), 1);
    }

    #[test]
    fn test_find_halfedge() {
        let mesh = fixtures::tetrahedron();
        let v0 = VertexId::new(0);
        let v1 = VertexId::new(1);
        let he = mesh.find_halfedge(v0, v1).unwrap();
        assert_eq!(mesh.origin(he), v0);
        assert_eq!(mesh.dest(he), v1);
        assert_eq!(mesh.find_halfedge(v1, v0), Some(he.twin()));
    }

    #[test]
    fn test_edge_geometry() {
        let mesh = fixtures::grid(1);
        let he = mesh
            .find_halfedge(VertexId::new(0), VertexId::new(1))
            .unwrap();
        assert!((mesh.edge_length(he) - 1.0).abs() < 1e-12);
        assert_eq!(mesh.edge_vector(he), Vector3::new(1.0, 0.0, 0.0));
        assert!((mesh.surface_area() - 1.0).abs() < 1e-12);
        let f = mesh.face_ids().next().unwrap();
        assert!((mesh.face_normal(f).z - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_flat_face_has_zero_normal() {
        let mut mesh = fixtures::single_triangle();
        // Move the apex onto the base so the triangle has no area.
        mesh.set_position(VertexId::new(2), Point3::new(0.5, 0.0, 0.0));
        let f = mesh.face_ids().next().unwrap();
        assert_eq!(mesh.face_normal(f), Vector3::zeros());
        assert_eq!(mesh.face_area(f), 0.0);
    }
}

//! The mesh seam of the collapse engine.
//!
//! The engine never touches mesh storage directly. It sees the mesh through
//! [`CollapseMesh`] and reads per-element attributes through four small
//! property-map traits:
//!
//! | Map | Question it answers | Default |
//! |-----|---------------------|---------|
//! | [`VertexPointMap`] | where is a vertex | [`MeshPoints`] |
//! | [`VertexFixedMap`] | may a vertex be removed | [`NoFixedVertices`] |
//! | [`EdgeIndexMap`] | what is the directed id of a half-edge | [`MeshEdgeIndex`] |
//! | [`EdgeBorderMap`] | is a half-edge on the border | [`MeshBorder`] |
//!
//! Directed ids must pair the two halves of an edge as `2k` and `2k + 1`; the
//! undirected id of both halves is `k` and the even half is the primary one.

use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;

use nalgebra::Point3;

use crate::mesh::{HalfEdgeId, HalfEdgeMesh, MeshIndex, VertexId};

/// Half-edges that vanished in a collapse of `p -> q`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemovedEdges<H> {
    /// The collapsed half-edge `p -> q`.
    pub pq: H,
    /// The removed flank on the `(p, q, t)` side, if that side has a face.
    pub pt: Option<H>,
    /// The removed flank on the `(q, p, b)` side, if that side has a face.
    pub qb: Option<H>,
}

/// Outcome of [`CollapseMesh::collapse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collapsed<V, H> {
    /// The surviving vertex.
    pub kept: V,
    /// The half-edges that were removed.
    pub removed: RemovedEdges<H>,
}

/// A triangle mesh the collapse engine can simplify.
///
/// Border half-edges (those without a face) must be linked into loops, so
/// that `next` is defined for every half-edge.
pub trait CollapseMesh {
    /// Vertex handle.
    type Vertex: Copy + Eq + Hash + Debug;
    /// Directed half-edge handle.
    type Halfedge: Copy + Eq + Debug;

    /// Number of live vertices.
    fn num_vertices(&self) -> usize;
    /// Number of live undirected edges.
    fn num_edges(&self) -> usize;
    /// Number of live faces.
    fn num_faces(&self) -> usize;
    /// Strict upper bound of the directed ids of all half-edges.
    fn halfedge_bound(&self) -> usize;

    /// One half-edge of every live undirected edge.
    fn edges(&self) -> Vec<Self::Halfedge>;
    /// Origin of `h`.
    fn source(&self, h: Self::Halfedge) -> Self::Vertex;
    /// Destination of `h`.
    fn target(&self, h: Self::Halfedge) -> Self::Vertex;
    /// The other half of the edge of `h`.
    fn opposite(&self, h: Self::Halfedge) -> Self::Halfedge;
    /// The half-edge following `h` around its face or border loop.
    fn next(&self, h: Self::Halfedge) -> Self::Halfedge;
    /// Whether `h` bounds a face.
    fn has_face(&self, h: Self::Halfedge) -> bool;
    /// Half-edges leaving `v`.
    fn out_halfedges(&self, v: Self::Vertex) -> Vec<Self::Halfedge>;

    /// Stored position of `v`.
    fn point(&self, v: Self::Vertex) -> Point3<f64>;
    /// Move `v`.
    fn set_point(&mut self, v: Self::Vertex, p: Point3<f64>);

    /// Collapse `h = p -> q` keeping `p`. Legality is checked by the caller.
    fn collapse(&mut self, h: Self::Halfedge) -> Collapsed<Self::Vertex, Self::Halfedge>;
}

impl<I: MeshIndex> CollapseMesh for HalfEdgeMesh<I> {
    type Vertex = VertexId<I>;
    type Halfedge = HalfEdgeId<I>;

    fn num_vertices(&self) -> usize {
        HalfEdgeMesh::num_vertices(self)
    }

    fn num_edges(&self) -> usize {
        HalfEdgeMesh::num_edges(self)
    }

    fn num_faces(&self) -> usize {
        HalfEdgeMesh::num_faces(self)
    }

    fn halfedge_bound(&self) -> usize {
        self.halfedge_capacity()
    }

    fn edges(&self) -> Vec<HalfEdgeId<I>> {
        self.edge_ids().map(|e| e.halfedge(0)).collect()
    }

    fn source(&self, h: HalfEdgeId<I>) -> VertexId<I> {
        self.origin(h)
    }

    fn target(&self, h: HalfEdgeId<I>) -> VertexId<I> {
        self.dest(h)
    }

    fn opposite(&self, h: HalfEdgeId<I>) -> HalfEdgeId<I> {
        h.twin()
    }

    fn next(&self, h: HalfEdgeId<I>) -> HalfEdgeId<I> {
        HalfEdgeMesh::next(self, h)
    }

    fn has_face(&self, h: HalfEdgeId<I>) -> bool {
        !self.is_boundary_halfedge(h)
    }

    fn out_halfedges(&self, v: VertexId<I>) -> Vec<HalfEdgeId<I>> {
        self.vertex_halfedges(v).collect()
    }

    fn point(&self, v: VertexId<I>) -> Point3<f64> {
        *self.position(v)
    }

    fn set_point(&mut self, v: VertexId<I>, p: Point3<f64>) {
        self.set_position(v, p);
    }

    fn collapse(&mut self, h: HalfEdgeId<I>) -> Collapsed<VertexId<I>, HalfEdgeId<I>> {
        let record = self.collapse_edge(h);
        Collapsed {
            kept: record.kept,
            removed: RemovedEdges {
                pq: record.pq,
                pt: record.pt,
                qb: record.qb,
            },
        }
    }
}

// ==================== Property maps ====================

/// Read/write access to vertex positions.
pub trait VertexPointMap<M: CollapseMesh> {
    /// Position of `v`.
    fn get(&self, mesh: &M, v: M::Vertex) -> Point3<f64>;
    /// Move `v` to `p`.
    fn put(&self, mesh: &mut M, v: M::Vertex, p: Point3<f64>);
}

/// Positions stored in the mesh itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeshPoints;

impl<M: CollapseMesh> VertexPointMap<M> for MeshPoints {
    fn get(&self, mesh: &M, v: M::Vertex) -> Point3<f64> {
        mesh.point(v)
    }

    fn put(&self, mesh: &mut M, v: M::Vertex, p: Point3<f64>) {
        mesh.set_point(v, p);
    }
}

/// Read-only flag marking vertices that must never be removed.
pub trait VertexFixedMap<V> {
    /// Whether `v` is fixed.
    fn is_fixed(&self, v: V) -> bool;
}

impl<V, F> VertexFixedMap<V> for F
where
    F: Fn(V) -> bool,
{
    fn is_fixed(&self, v: V) -> bool {
        self(v)
    }
}

/// No vertex is fixed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFixedVertices;

impl<V> VertexFixedMap<V> for NoFixedVertices {
    fn is_fixed(&self, _v: V) -> bool {
        false
    }
}

/// An explicit set of fixed vertices.
#[derive(Debug, Clone, Default)]
pub struct FixedVertices<V: Eq + Hash>(pub HashSet<V>);

impl<V: Eq + Hash> FixedVertices<V> {
    /// Fix every vertex produced by `vertices`.
    pub fn new(vertices: impl IntoIterator<Item = V>) -> Self {
        Self(vertices.into_iter().collect())
    }

    /// Number of fixed vertices.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no vertex is fixed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<V: Eq + Hash> VertexFixedMap<V> for FixedVertices<V> {
    fn is_fixed(&self, v: V) -> bool {
        self.0.contains(&v)
    }
}

/// Directed id of a half-edge.
pub trait EdgeIndexMap<H> {
    /// Directed id of `h`; the halves of one edge are `2k` and `2k + 1`.
    fn directed_id(&self, h: H) -> usize;
}

impl<H, F> EdgeIndexMap<H> for F
where
    F: Fn(H) -> usize,
{
    fn directed_id(&self, h: H) -> usize {
        self(h)
    }
}

/// Half-edge ids of [`HalfEdgeMesh`], which already pair twins as `2k`/`2k + 1`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeshEdgeIndex;

impl<I: MeshIndex> EdgeIndexMap<HalfEdgeId<I>> for MeshEdgeIndex {
    fn directed_id(&self, h: HalfEdgeId<I>) -> usize {
        h.index()
    }
}

/// Border flag of a half-edge.
pub trait EdgeBorderMap<M: CollapseMesh> {
    /// Whether `h` lies on the border of the mesh.
    fn is_border(&self, mesh: &M, h: M::Halfedge) -> bool;
}

/// A half-edge is a border half-edge iff it has no face.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeshBorder;

impl<M: CollapseMesh> EdgeBorderMap<M> for MeshBorder {
    fn is_border(&self, mesh: &M, h: M::Halfedge) -> bool {
        !mesh.has_face(h)
    }
}

/// The four property maps the engine reads.
pub struct CollapseMaps<'a, M: CollapseMesh> {
    /// Vertex positions.
    pub points: &'a dyn VertexPointMap<M>,
    /// Fixed-vertex flags.
    pub fixed: &'a dyn VertexFixedMap<M::Vertex>,
    /// Directed half-edge ids.
    pub edge_index: &'a dyn EdgeIndexMap<M::Halfedge>,
    /// Border flags.
    pub border: &'a dyn EdgeBorderMap<M>,
}

impl<'a, M: CollapseMesh> Clone for CollapseMaps<'a, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, M: CollapseMesh> Copy for CollapseMaps<'a, M> {}

impl<'a, M: CollapseMesh> CollapseMaps<'a, M> {
    /// Replace the fixed-vertex map.
    pub fn with_fixed(mut self, fixed: &'a dyn VertexFixedMap<M::Vertex>) -> Self {
        self.fixed = fixed;
        self
    }

    /// Replace the point map.
    pub fn with_points(mut self, points: &'a dyn VertexPointMap<M>) -> Self {
        self.points = points;
        self
    }

    /// Replace the border map.
    pub fn with_border(mut self, border: &'a dyn EdgeBorderMap<M>) -> Self {
        self.border = border;
        self
    }

    /// Whether the undirected edge of `h` is a border edge.
    pub fn is_border_edge(&self, mesh: &M, h: M::Halfedge) -> bool {
        self.border.is_border(mesh, h) || self.border.is_border(mesh, mesh.opposite(h))
    }

    /// Whether `v` has an incident border edge.
    pub fn is_border_vertex(&self, mesh: &M, v: M::Vertex) -> bool {
        mesh.out_halfedges(v)
            .into_iter()
            .any(|h| self.is_border_edge(mesh, h))
    }
}

impl<'a, I: MeshIndex> CollapseMaps<'a, HalfEdgeMesh<I>> {
    /// Mesh positions, no fixed vertices, mesh half-edge ids and face-based borders.
    pub fn defaults() -> Self {
        Self {
            points: &MeshPoints,
            fixed: &NoFixedVertices,
            edge_index: &MeshEdgeIndex,
            border: &MeshBorder,
        }
    }
}

impl<'a, M: CollapseMesh> Debug for CollapseMaps<'a, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollapseMaps").finish_non_exhaustive()
    }
}

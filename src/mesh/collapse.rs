//! Local edge collapse on the half-edge mesh.
//!
//! Collapsing the half-edge `h = p -> q` merges `q` into `p`: every half-edge
//! leaving `q` is re-rooted at `p`, the edge `pq` disappears, and each
//! triangle incident to `pq` degenerates into a two-edge loop that is folded
//! away. On the side of the face `(p, q, t)` the edge `pt` is removed, on the
//! side of the face `(q, p, b)` the edge `qb` is removed.
//!
//! The mutation performs no legality checks. Callers are expected to test the
//! link condition first (see [`crate::algo::decimate::is_collapsable`]).

use super::halfedge::HalfEdgeMesh;
use super::index::{FaceId, HalfEdgeId, MeshIndex, VertexId};

/// What a single collapse removed from the mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollapseRecord<I: MeshIndex = u32> {
    /// The surviving endpoint `p`.
    pub kept: VertexId<I>,
    /// The removed endpoint `q`.
    pub removed_vertex: VertexId<I>,
    /// The collapsed half-edge `p -> q`.
    pub pq: HalfEdgeId<I>,
    /// The half-edge `p -> t` of the removed edge on the `(p, q, t)` side.
    pub pt: Option<HalfEdgeId<I>>,
    /// The half-edge `q -> b` of the removed edge on the `(q, p, b)` side.
    pub qb: Option<HalfEdgeId<I>>,
}

impl<I: MeshIndex> HalfEdgeMesh<I> {
    /// Collapse `h = p -> q`, keeping `p` and removing `q`.
    ///
    /// Removes one vertex, one face per non-border side of the edge and three
    /// edges (two if `pq` is a border edge). The kept vertex keeps its
    /// position; callers move it afterwards if needed.
    pub fn collapse_edge(&mut self, h: HalfEdgeId<I>) -> CollapseRecord<I> {
        debug_assert!(!self.is_halfedge_removed(h));

        let o = h.twin();
        let hn = self.next(h);
        let hp = self.prev(h);
        let on = self.next(o);
        let op = self.prev(o);

        let fh = self.face_of(h);
        let fo = self.face_of(o);

        let p = self.origin(h);
        let q = self.origin(o);

        // half-edge -> vertex
        let outgoing: Vec<_> = self.vertex_halfedges(q).collect();
        for he in outgoing {
            self.halfedge_mut(he).origin = p;
        }

        // half-edge -> half-edge
        self.link(hp, hn);
        self.link(op, on);

        // face -> half-edge
        if fh.is_valid() {
            self.face_mut(fh).halfedge = hn;
        }
        if fo.is_valid() {
            self.face_mut(fo).halfedge = on;
        }

        // vertex -> half-edge
        if self.vertex(p).halfedge == h {
            self.vertex_mut(p).halfedge = hn;
        }
        self.adjust_outgoing(p);

        self.remove_edge(h);
        self.remove_vertex(q);

        // Each incident triangle is now a two-edge loop.
        let mut pt = None;
        if fh.is_valid() && self.next(self.next(hn)) == hn {
            pt = Some(hp.twin());
            self.collapse_loop(hp);
        }
        let mut qb = None;
        if fo.is_valid() && self.next(self.next(on)) == on {
            qb = Some(op.twin());
            self.collapse_loop(op);
        }

        CollapseRecord {
            kept: p,
            removed_vertex: q,
            pq: h,
            pt,
            qb,
        }
    }

    /// Fold the loop `h0 -> h1 -> h0` by removing the edge of `h0`.
    ///
    /// `h1` takes over the place of `twin(h0)` in its face (or border loop).
    fn collapse_loop(&mut self, h0: HalfEdgeId<I>) {
        let h1 = self.next(h0);
        let o0 = h0.twin();
        let o1 = h1.twin();

        let v0 = self.origin(h1);
        let v1 = self.origin(h0);

        let fh = self.face_of(h0);
        let fo = self.face_of(o0);

        debug_assert!(self.next(h1) == h0 && h1 != o0);

        // half-edge -> half-edge
        let o0_next = self.next(o0);
        let o0_prev = self.prev(o0);
        self.link(h1, o0_next);
        self.link(o0_prev, h1);

        // half-edge -> face
        self.halfedge_mut(h1).face = fo;

        // vertex -> half-edge
        self.vertex_mut(v0).halfedge = h1;
        self.adjust_outgoing(v0);
        self.vertex_mut(v1).halfedge = o1;
        self.adjust_outgoing(v1);

        // face -> half-edge
        if fo.is_valid() && self.face(fo).halfedge == o0 {
            self.face_mut(fo).halfedge = h1;
        }

        if fh.is_valid() {
            self.remove_face(fh);
        }
        self.remove_edge(h0);
    }

    #[inline]
    fn link(&mut self, a: HalfEdgeId<I>, b: HalfEdgeId<I>) {
        self.halfedge_mut(a).next = b;
        self.halfedge_mut(b).prev = a;
    }

    /// Point `v` at a boundary half-edge if it has one.
    fn adjust_outgoing(&mut self, v: VertexId<I>) {
        if let Some(he) = self
            .vertex_halfedges(v)
            .find(|&he| self.is_boundary_halfedge(he))
        {
            self.vertex_mut(v).halfedge = he;
        }
    }

    fn remove_edge(&mut self, he: HalfEdgeId<I>) {
        for id in [he, he.twin()] {
            let half = self.halfedge_mut(id);
            debug_assert!(!half.removed);
            half.removed = true;
            half.face = FaceId::invalid();
        }
        self.live_halfedges -= 2;
    }

    fn remove_vertex(&mut self, v: VertexId<I>) {
        let vertex = self.vertex_mut(v);
        debug_assert!(!vertex.removed);
        vertex.removed = true;
        vertex.halfedge = HalfEdgeId::invalid();
        self.live_vertices -= 1;
    }

    fn remove_face(&mut self, f: FaceId<I>) {
        let face = self.face_mut(f);
        debug_assert!(!face.removed);
        face.removed = true;
        face.halfedge = HalfEdgeId::invalid();
        self.live_faces -= 1;
    }
}

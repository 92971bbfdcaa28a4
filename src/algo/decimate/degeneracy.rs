//! Topological legality tests for edge collapses.

use std::collections::HashSet;

use log::trace;

use super::adapter::{CollapseMaps, CollapseMesh};

/// Marker for the virtual vertex adjacent to every border vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum LinkVertex<V> {
    Real(V),
    Virtual,
}

/// Whether collapsing `h = p -> q` keeps the mesh a manifold.
///
/// Refuses the edge if either endpoint is fixed. Otherwise checks the link
/// condition: the common neighbours of `p` and `q` must be exactly the apexes
/// of the faces incident to `pq`. Borders are closed by a virtual vertex that
/// is adjacent to every border vertex, so it is a common neighbour iff both
/// endpoints lie on the border and an apex iff `pq` is a border edge.
pub fn is_collapsable<M: CollapseMesh>(mesh: &M, maps: &CollapseMaps<'_, M>, h: M::Halfedge) -> bool {
    let p = mesh.source(h);
    let q = mesh.target(h);

    if maps.fixed.is_fixed(p) || maps.fixed.is_fixed(q) {
        trace!("edge {:?} refused: fixed endpoint", h);
        return false;
    }

    let neighbors_p = link_of(mesh, maps, p);
    let neighbors_q = link_of(mesh, maps, q);
    let common: HashSet<_> = neighbors_p.intersection(&neighbors_q).copied().collect();

    let mut apexes = HashSet::with_capacity(3);
    for side in [h, mesh.opposite(h)] {
        if maps.border.is_border(mesh, side) {
            apexes.insert(LinkVertex::Virtual);
        } else {
            apexes.insert(LinkVertex::Real(mesh.target(mesh.next(side))));
        }
    }

    let ok = common == apexes;
    if !ok {
        trace!("edge {:?} refused: link condition", h);
    }
    ok
}

/// Neighbours of `v`, including the virtual vertex if `v` is on the border.
fn link_of<M: CollapseMesh>(
    mesh: &M,
    maps: &CollapseMaps<'_, M>,
    v: M::Vertex,
) -> HashSet<LinkVertex<M::Vertex>> {
    let mut link = HashSet::new();
    for out in mesh.out_halfedges(v) {
        link.insert(LinkVertex::Real(mesh.target(out)));
        if maps.is_border_edge(mesh, out) {
            link.insert(LinkVertex::Virtual);
        }
    }
    link
}

/// Whether the edge belongs to a closed component with exactly four vertices.
///
/// Collapsing any edge of a tetrahedron would leave a degenerate double
/// triangle, so such components are never simplified further.
pub fn is_tetrahedron<M: CollapseMesh>(mesh: &M, maps: &CollapseMaps<'_, M>, h: M::Halfedge) -> bool {
    let start = mesh.source(h);
    let mut visited = HashSet::with_capacity(5);
    let mut stack = vec![start];
    visited.insert(start);

    while let Some(v) = stack.pop() {
        for out in mesh.out_halfedges(v) {
            if maps.is_border_edge(mesh, out) {
                return false;
            }
            let w = mesh.target(out);
            if visited.insert(w) {
                if visited.len() > 4 {
                    return false;
                }
                stack.push(w);
            }
        }
    }

    visited.len() == 4
}

/// Whether one half of the edge is a border half-edge of a three-edge hole.
///
/// This is the situation of an isolated triangle; collapsing it would leave
/// a dangling edge.
pub fn is_open_triangle<M: CollapseMesh>(
    mesh: &M,
    maps: &CollapseMaps<'_, M>,
    h: M::Halfedge,
) -> bool {
    [h, mesh.opposite(h)].into_iter().any(|side| {
        maps.border.is_border(mesh, side) && mesh.next(mesh.next(mesh.next(side))) == side
    })
}

//! Cost, placement, cache and stop policies.
//!
//! The engine itself knows nothing about geometry. Before each cost query it
//! asks a [`SetCache`] policy to fill the edge's cache, then asks [`GetCost`]
//! how expensive the collapse is and [`GetPlacement`] where the merged vertex
//! goes. A `None` from either is not an error: the edge is skipped for now and
//! may be reconsidered once its neighbourhood changes.
//!
//! Closures implement every policy trait, so ad-hoc policies need no type:
//!
//! ```
//! use edgefold::algo::decimate::{CollapseCounts, ShouldStop};
//! use edgefold::mesh::{HalfEdgeId, HalfEdgeMesh};
//!
//! let stop = |_cost: f64, counts: &CollapseCounts| counts.collapses >= 10;
//! let mesh = HalfEdgeMesh::<u32>::new();
//! let counts = CollapseCounts { initial_edges: 30, current_edges: 12, collapses: 10 };
//! assert!(stop.should_stop(0.0, HalfEdgeId::new(0), &mesh, &counts));
//! ```

use nalgebra::Point3;

use super::adapter::CollapseMesh;

/// Edge and collapse counters handed to the stop predicate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollapseCounts {
    /// Undirected edges when the run started.
    pub initial_edges: usize,
    /// Undirected edges now.
    pub current_edges: usize,
    /// Collapses performed so far.
    pub collapses: usize,
}

impl CollapseCounts {
    /// Undirected edges removed so far.
    pub fn removed_edges(&self) -> usize {
        self.initial_edges - self.current_edges
    }
}

/// Fills the per-edge cache before cost and placement are queried.
pub trait SetCache<M: CollapseMesh> {
    /// The cached payload.
    type Cache: Default;

    /// Recompute `cache` for the edge `h`.
    fn set_cache(&self, cache: &mut Self::Cache, h: M::Halfedge, mesh: &M);
}

/// Collapse cost of an edge.
pub trait GetCost<M: CollapseMesh, C> {
    /// Cost of collapsing `h`, or `None` if it cannot be computed.
    fn cost(&self, h: M::Halfedge, mesh: &M, cache: &C) -> Option<f64>;
}

impl<M, C, F> GetCost<M, C> for F
where
    M: CollapseMesh,
    F: Fn(M::Halfedge, &M, &C) -> Option<f64>,
{
    fn cost(&self, h: M::Halfedge, mesh: &M, cache: &C) -> Option<f64> {
        self(h, mesh, cache)
    }
}

/// Position of the merged vertex.
pub trait GetPlacement<M: CollapseMesh, C> {
    /// Where the kept vertex of `h` goes, or `None` if undetermined.
    fn placement(&self, h: M::Halfedge, mesh: &M, cache: &C) -> Option<Point3<f64>>;
}

impl<M, C, F> GetPlacement<M, C> for F
where
    M: CollapseMesh,
    F: Fn(M::Halfedge, &M, &C) -> Option<Point3<f64>>,
{
    fn placement(&self, h: M::Halfedge, mesh: &M, cache: &C) -> Option<Point3<f64>> {
        self(h, mesh, cache)
    }
}

/// Predicate polled before every prospective collapse.
pub trait ShouldStop<M: CollapseMesh> {
    /// Whether to end the run instead of collapsing `h` at `cost`.
    fn should_stop(&self, cost: f64, h: M::Halfedge, mesh: &M, counts: &CollapseCounts) -> bool;
}

impl<M, F> ShouldStop<M> for F
where
    M: CollapseMesh,
    F: Fn(f64, &CollapseCounts) -> bool,
{
    fn should_stop(&self, cost: f64, _h: M::Halfedge, _mesh: &M, counts: &CollapseCounts) -> bool {
        self(cost, counts)
    }
}

// ==================== Caches ====================

/// Caches nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCache;

impl<M: CollapseMesh> SetCache<M> for NoCache {
    type Cache = ();

    fn set_cache(&self, _cache: &mut (), _h: M::Halfedge, _mesh: &M) {}
}

/// Endpoint positions of an edge, captured when its cache was last set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeGeometry {
    /// Position of the source vertex.
    pub p: Point3<f64>,
    /// Position of the target vertex.
    pub q: Point3<f64>,
}

impl Default for EdgeGeometry {
    fn default() -> Self {
        Self {
            p: Point3::origin(),
            q: Point3::origin(),
        }
    }
}

impl EdgeGeometry {
    /// Squared distance between the endpoints.
    pub fn squared_length(&self) -> f64 {
        (self.q - self.p).norm_squared()
    }

    /// Midpoint of the endpoints.
    pub fn midpoint(&self) -> Point3<f64> {
        nalgebra::center(&self.p, &self.q)
    }
}

/// Caches the endpoint positions of every edge.
#[derive(Debug, Clone, Copy, Default)]
pub struct SetEdgeGeometry;

impl<M: CollapseMesh> SetCache<M> for SetEdgeGeometry {
    type Cache = EdgeGeometry;

    fn set_cache(&self, cache: &mut EdgeGeometry, h: M::Halfedge, mesh: &M) {
        cache.p = mesh.point(mesh.source(h));
        cache.q = mesh.point(mesh.target(h));
    }
}

// ==================== Costs ====================

/// Squared Euclidean edge length.
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeLengthCost;

impl<M: CollapseMesh, C> GetCost<M, C> for EdgeLengthCost {
    fn cost(&self, h: M::Halfedge, mesh: &M, _cache: &C) -> Option<f64> {
        let p = mesh.point(mesh.source(h));
        let q = mesh.point(mesh.target(h));
        Some((q - p).norm_squared())
    }
}

/// Makes costs above `max` undefined.
#[derive(Debug, Clone, Copy)]
pub struct MaxCost<C> {
    /// The wrapped cost policy.
    pub inner: C,
    /// Largest cost still reported.
    pub max: f64,
}

impl<C> MaxCost<C> {
    /// Cap `inner` at `max`.
    pub fn new(inner: C, max: f64) -> Self {
        Self { inner, max }
    }
}

impl<M, Ca, C> GetCost<M, Ca> for MaxCost<C>
where
    M: CollapseMesh,
    C: GetCost<M, Ca>,
{
    fn cost(&self, h: M::Halfedge, mesh: &M, cache: &Ca) -> Option<f64> {
        self.inner.cost(h, mesh, cache).filter(|&c| c <= self.max)
    }
}

// ==================== Placements ====================

/// Midpoint of the edge.
#[derive(Debug, Clone, Copy, Default)]
pub struct MidpointPlacement;

impl<M: CollapseMesh, C> GetPlacement<M, C> for MidpointPlacement {
    fn placement(&self, h: M::Halfedge, mesh: &M, _cache: &C) -> Option<Point3<f64>> {
        let p = mesh.point(mesh.source(h));
        let q = mesh.point(mesh.target(h));
        Some(nalgebra::center(&p, &q))
    }
}

// ==================== Stop predicates ====================

/// Stop once the edge count has dropped to `target` or below.
#[derive(Debug, Clone, Copy)]
pub struct EdgeCountStop {
    /// Edge count to reach.
    pub target: usize,
}

impl EdgeCountStop {
    /// Stop at `target` edges.
    pub fn new(target: usize) -> Self {
        Self { target }
    }
}

impl<M: CollapseMesh> ShouldStop<M> for EdgeCountStop {
    fn should_stop(&self, _cost: f64, _h: M::Halfedge, _mesh: &M, counts: &CollapseCounts) -> bool {
        counts.current_edges <= self.target
    }
}

/// Stop once the edge count has dropped to `ratio` of the initial count.
#[derive(Debug, Clone, Copy)]
pub struct EdgeRatioStop {
    /// Fraction of the initial edges to keep, in `[0, 1]`.
    pub ratio: f64,
}

impl EdgeRatioStop {
    /// Stop at `ratio` of the initial edges.
    pub fn new(ratio: f64) -> Self {
        Self {
            ratio: ratio.clamp(0.0, 1.0),
        }
    }
}

impl<M: CollapseMesh> ShouldStop<M> for EdgeRatioStop {
    fn should_stop(&self, _cost: f64, _h: M::Halfedge, _mesh: &M, counts: &CollapseCounts) -> bool {
        counts.current_edges as f64 <= counts.initial_edges as f64 * self.ratio
    }
}

// ==================== Bundles ====================

/// The cache, cost and placement policies of one run.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollapsePolicies<K, C, P> {
    /// Cache policy.
    pub set_cache: K,
    /// Cost policy.
    pub cost: C,
    /// Placement policy.
    pub placement: P,
}

impl<K, C, P> CollapsePolicies<K, C, P> {
    /// Bundle the three policies.
    pub fn new(set_cache: K, cost: C, placement: P) -> Self {
        Self {
            set_cache,
            cost,
            placement,
        }
    }

    /// Replace the cost policy.
    pub fn with_cost<C2>(self, cost: C2) -> CollapsePolicies<K, C2, P> {
        CollapsePolicies {
            set_cache: self.set_cache,
            cost,
            placement: self.placement,
        }
    }
}

impl CollapsePolicies<NoCache, EdgeLengthCost, MidpointPlacement> {
    /// Squared edge length cost with midpoint placement.
    pub fn edge_length() -> Self {
        Self::new(NoCache, EdgeLengthCost, MidpointPlacement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{fixtures, HalfEdgeMesh, VertexId};

    #[test]
    fn test_edge_length_cost_and_midpoint() {
        let mesh = fixtures::grid(2);
        let h = mesh
            .find_halfedge(VertexId::new(0), VertexId::new(4))
            .unwrap();

        let cost = GetCost::<HalfEdgeMesh, ()>::cost(&EdgeLengthCost, h, &mesh, &());
        assert!((cost.unwrap() - 2.0).abs() < 1e-12);

        let at = GetPlacement::<HalfEdgeMesh, ()>::placement(&MidpointPlacement, h, &mesh, &());
        assert_eq!(at, Some(Point3::new(0.5, 0.5, 0.0)));
    }

    #[test]
    fn test_edge_geometry_cache() {
        let mesh = fixtures::grid(1);
        let h = mesh
            .find_halfedge(VertexId::new(0), VertexId::new(3))
            .unwrap();

        let mut cache = EdgeGeometry::default();
        SetCache::<HalfEdgeMesh>::set_cache(&SetEdgeGeometry, &mut cache, h, &mesh);
        assert_eq!(cache.p, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(cache.q, Point3::new(1.0, 1.0, 0.0));
        assert!((cache.squared_length() - 2.0).abs() < 1e-12);
        assert_eq!(cache.midpoint(), Point3::new(0.5, 0.5, 0.0));
    }

    #[test]
    fn test_max_cost() {
        let mesh = fixtures::grid(1);
        let side = mesh
            .find_halfedge(VertexId::new(0), VertexId::new(1))
            .unwrap();
        let diagonal = mesh
            .find_halfedge(VertexId::new(0), VertexId::new(3))
            .unwrap();

        let capped = MaxCost::new(EdgeLengthCost, 1.5);
        assert_eq!(GetCost::<HalfEdgeMesh, ()>::cost(&capped, side, &mesh, &()), Some(1.0));
        assert_eq!(GetCost::<HalfEdgeMesh, ()>::cost(&capped, diagonal, &mesh, &()), None);
    }

    #[test]
    fn test_stop_predicates() {
        let mesh = HalfEdgeMesh::<u32>::new();
        let h = crate::mesh::HalfEdgeId::new(0);
        let mut counts = CollapseCounts {
            initial_edges: 100,
            current_edges: 60,
            collapses: 14,
        };
        assert_eq!(counts.removed_edges(), 40);

        let by_count = EdgeCountStop::new(50);
        let by_ratio = EdgeRatioStop::new(0.5);
        assert!(!by_count.should_stop(0.0, h, &mesh, &counts));
        assert!(!by_ratio.should_stop(0.0, h, &mesh, &counts));

        counts.current_edges = 50;
        assert!(by_count.should_stop(0.0, h, &mesh, &counts));
        assert!(by_ratio.should_stop(0.0, h, &mesh, &counts));
    }

    #[test]
    fn test_closure_policies() {
        let mesh = fixtures::grid(1);
        let h = mesh.halfedge_ids().next().unwrap();

        let cost = |_: crate::mesh::HalfEdgeId, _: &HalfEdgeMesh, g: &EdgeGeometry| {
            Some(g.squared_length())
        };
        let geometry = EdgeGeometry {
            p: Point3::origin(),
            q: Point3::new(0.0, 3.0, 4.0),
        };
        assert_eq!(cost.cost(h, &mesh, &geometry), Some(25.0));

        let policies = CollapsePolicies::edge_length().with_cost(MaxCost::new(EdgeLengthCost, 0.0));
        assert_eq!(GetCost::<HalfEdgeMesh, ()>::cost(&policies.cost, h, &mesh, &()), None);
    }
}

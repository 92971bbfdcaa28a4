//! Greedy edge-collapse engine.
//!
//! A run has two phases. The collector visits every edge once, fills its
//! cache, and queues every edge that may legally be collapsed. The collapse
//! loop then repeatedly pops the cheapest edge, re-validates it against the
//! current mesh, consults the stop predicate, collapses it, and re-evaluates
//! every edge incident to the surviving vertex.
//!
//! Per-edge state lives in an [`EdgeRecords`] store indexed by undirected id,
//! which is always reached through the primary (even) half of the edge.

use log::{debug, trace};
use nalgebra::Point3;

use super::adapter::{CollapseMaps, CollapseMesh, RemovedEdges};
use super::degeneracy::{is_collapsable, is_open_triangle, is_tetrahedron};
use super::policy::{CollapseCounts, CollapsePolicies, GetCost, GetPlacement, SetCache, ShouldStop};
use super::queue::{Cost, EdgeQueue};
use super::records::{EdgeRecord, EdgeRecords};
use super::visitor::{EdgeProfile, ProfileOf, Visitor};

/// What to do when the placement policy yields no position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingPlacement {
    /// Discard the edge, as for an undefined cost.
    #[default]
    Skip,
    /// Collapse anyway; the kept vertex keeps its current position.
    KeepSource,
}

/// Options of a collapse run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollapseOptions {
    /// Handling of edges without a placement.
    pub missing_placement: MissingPlacement,
}

impl CollapseOptions {
    /// Set the handling of edges without a placement.
    pub fn with_missing_placement(mut self, missing_placement: MissingPlacement) -> Self {
        self.missing_placement = missing_placement;
        self
    }
}

/// State of the collapse loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// The loop has edges left to examine.
    Running,
    /// The stop predicate ended the run.
    StoppedByPredicate,
    /// The queue ran empty.
    Exhausted,
}

/// Result of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollapseSummary {
    /// Initial minus final number of undirected edges.
    pub removed_edges: usize,
    /// Number of collapses performed.
    pub collapses: usize,
    /// Why the run ended.
    pub state: LoopState,
}

/// One simplification run over a borrowed mesh.
pub struct EdgeCollapse<'a, M, S, K, C, P, V>
where
    M: CollapseMesh,
    K: SetCache<M>,
{
    mesh: &'a mut M,
    should_stop: S,
    maps: CollapseMaps<'a, M>,
    policies: CollapsePolicies<K, C, P>,
    visitor: V,
    options: CollapseOptions,

    records: EdgeRecords<K::Cache>,
    primaries: Vec<Option<M::Halfedge>>,
    queue: EdgeQueue,

    initial_edges: usize,
    collapses: usize,
    state: LoopState,
}

impl<'a, M, S, K, C, P, V> EdgeCollapse<'a, M, S, K, C, P, V>
where
    M: CollapseMesh,
    S: ShouldStop<M>,
    K: SetCache<M>,
    C: GetCost<M, K::Cache>,
    P: GetPlacement<M, K::Cache>,
    V: Visitor<M>,
{
    /// Prepare a run. Records are sized for the mesh's current id bound.
    pub fn new(
        mesh: &'a mut M,
        should_stop: S,
        maps: CollapseMaps<'a, M>,
        policies: CollapsePolicies<K, C, P>,
        visitor: V,
        options: CollapseOptions,
    ) -> Self {
        let edge_bound = (mesh.halfedge_bound() + 1) / 2;
        let initial_edges = mesh.num_edges();

        Self {
            mesh,
            should_stop,
            maps,
            policies,
            visitor,
            options,
            records: EdgeRecords::new(edge_bound),
            primaries: vec![None; edge_bound],
            queue: EdgeQueue::with_capacity(initial_edges),
            initial_edges,
            collapses: 0,
            state: LoopState::Running,
        }
    }

    /// Collect, then collapse until the queue is empty or the stop predicate fires.
    pub fn run(mut self) -> CollapseSummary {
        self.visitor.on_started(&*self.mesh);

        self.collect();
        self.process();

        self.visitor.on_finished(&*self.mesh);

        let summary = self.summary();
        debug!(
            "edge collapse finished ({:?}): {} collapses, {} -> {} edges",
            summary.state,
            summary.collapses,
            self.initial_edges,
            self.mesh.num_edges()
        );
        summary
    }

    /// Visit every edge once and queue the collapsable ones.
    pub fn collect(&mut self) {
        debug!("collecting {} edges", self.initial_edges);

        for e in self.mesh.edges() {
            let h = self.primary_edge(e);
            self.register(h);
            self.set_cache(h);

            if !is_collapsable(&*self.mesh, &self.maps, h)
                || is_tetrahedron(&*self.mesh, &self.maps, h)
                || is_open_triangle(&*self.mesh, &self.maps, h)
            {
                continue;
            }

            let cost = self.get_cost(h);
            let placement = self.get_placement(h);
            self.insert_in_queue(h, Cost(cost));

            let profile = self.profile(h);
            self.visitor
                .on_collected(&*self.mesh, &profile, cost, placement);
        }

        debug!("collected {} of {} edges", self.queue.len(), self.initial_edges);
    }

    /// Run the collapse loop until it leaves [`LoopState::Running`].
    pub fn process(&mut self) {
        while self.step() == LoopState::Running {}
    }

    /// Pop and handle a single edge.
    pub fn step(&mut self) -> LoopState {
        if self.state != LoopState::Running {
            return self.state;
        }

        let Some((h, queued_cost)) = self.pop_from_queue() else {
            self.state = LoopState::Exhausted;
            return self.state;
        };
        trace!("popped edge {:?} at {:?}", h, queued_cost.value());

        let profile = self.profile(h);
        let collapsable = is_collapsable(&*self.mesh, &self.maps, h);
        let (cost, placement) = if collapsable {
            (self.get_cost(h), self.get_placement(h))
        } else {
            (None, None)
        };

        self.visitor
            .on_processed(&*self.mesh, &profile, cost, placement, collapsable);

        if !collapsable {
            return self.state;
        }
        let Some(cost) = cost else {
            trace!("edge {:?} discarded: no cost", h);
            return self.state;
        };

        let counts = self.counts();
        if self
            .should_stop
            .should_stop(cost, h, &*self.mesh, &counts)
        {
            self.visitor.on_stop_condition_reached(&*self.mesh);
            self.state = LoopState::StoppedByPredicate;
            return self.state;
        }

        if is_tetrahedron(&*self.mesh, &self.maps, h) {
            trace!("edge {:?} discarded: tetrahedron", h);
            self.visitor.on_tetrahedron_reached(&*self.mesh);
            return self.state;
        }
        if is_open_triangle(&*self.mesh, &self.maps, h) {
            trace!("edge {:?} discarded: open triangle", h);
            return self.state;
        }

        let placement = match (placement, self.options.missing_placement) {
            (Some(point), _) => Some(point),
            (None, MissingPlacement::KeepSource) => None,
            (None, MissingPlacement::Skip) => {
                trace!("edge {:?} discarded: no placement", h);
                return self.state;
            }
        };

        self.collapse(h, placement);
        self.state
    }

    /// Counters as seen by the stop predicate.
    pub fn counts(&self) -> CollapseCounts {
        CollapseCounts {
            initial_edges: self.initial_edges,
            current_edges: self.mesh.num_edges(),
            collapses: self.collapses,
        }
    }

    /// Summary of the run so far.
    pub fn summary(&self) -> CollapseSummary {
        CollapseSummary {
            removed_edges: self.initial_edges - self.mesh.num_edges(),
            collapses: self.collapses,
            state: self.state,
        }
    }

    /// The mesh being simplified.
    pub fn mesh(&self) -> &M {
        &*self.mesh
    }

    /// The visitor of this run.
    pub fn visitor(&self) -> &V {
        &self.visitor
    }

    /// Cost currently queued for the edge of `h`, if it is queued.
    pub fn queued_cost(&self, h: M::Halfedge) -> Option<Cost> {
        let h = self.primary_edge(h);
        let handle = self.records.get(self.undirected_id(h)).handle?;
        self.queue.cost_of(handle.edge())
    }

    /// Number of edges waiting in the queue.
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    // ==================== Collapse ====================

    fn collapse(&mut self, h: M::Halfedge, placement: Option<Point3<f64>>) {
        let collapsed = self.mesh.collapse(h);
        let kept = collapsed.kept;
        self.collapses += 1;

        trace!(
            "collapsed {:?} into {:?} ({} edges left)",
            h,
            kept,
            self.mesh.num_edges()
        );

        self.retire(&collapsed.removed);

        if let Some(point) = placement {
            self.maps.points.put(&mut *self.mesh, kept, point);
        }

        self.update_neighbors(kept);

        self.visitor
            .on_collapsed(&*self.mesh, kept, &collapsed.removed);
    }

    /// Drop the queue entries of edges that no longer exist.
    fn retire(&mut self, removed: &RemovedEdges<M::Halfedge>) {
        let gone = [Some(removed.pq), removed.pt, removed.qb];
        for h in gone.into_iter().flatten() {
            let id = self.undirected_id(h);
            let record = self.records.get_mut(id);
            if let Some(handle) = record.handle.take() {
                self.queue.erase(handle);
            }
            self.primaries[id] = None;
        }
    }

    /// Re-evaluate every edge incident to `v` from the current adjacency.
    fn update_neighbors(&mut self, v: M::Vertex) {
        for out in self.mesh.out_halfedges(v) {
            let h = self.primary_edge(out);
            self.register(h);
            self.set_cache(h);

            let queued = self.record(h).handle.is_some();
            let fixed = self.maps.fixed.is_fixed(self.mesh.source(h))
                || self.maps.fixed.is_fixed(self.mesh.target(h));

            if fixed {
                if queued {
                    self.remove_from_queue(h);
                }
                continue;
            }

            let cost = Cost(self.get_cost(h));
            if queued {
                self.update_in_queue(h, cost);
            } else {
                self.insert_in_queue(h, cost);
            }
        }
    }

    // ==================== Policies ====================

    fn set_cache(&mut self, h: M::Halfedge) {
        let id = self.undirected_id(h);
        let record = self.records.get_mut(id);
        self.policies
            .set_cache
            .set_cache(&mut record.cache, h, &*self.mesh);
    }

    fn get_cost(&self, h: M::Halfedge) -> Option<f64> {
        self.policies
            .cost
            .cost(h, &*self.mesh, &self.record(h).cache)
    }

    fn get_placement(&self, h: M::Halfedge) -> Option<Point3<f64>> {
        self.policies
            .placement
            .placement(h, &*self.mesh, &self.record(h).cache)
    }

    fn profile(&self, h: M::Halfedge) -> ProfileOf<M> {
        let p = self.mesh.source(h);
        let q = self.mesh.target(h);
        EdgeProfile {
            edge: h,
            p,
            q,
            p_fixed: self.maps.fixed.is_fixed(p),
            q_fixed: self.maps.fixed.is_fixed(q),
        }
    }

    // ==================== Edge ids and records ====================

    fn is_primary(&self, h: M::Halfedge) -> bool {
        self.maps.edge_index.directed_id(h) % 2 == 0
    }

    fn undirected_id(&self, h: M::Halfedge) -> usize {
        self.maps.edge_index.directed_id(h) / 2
    }

    /// The even half of the edge of `h`.
    fn primary_edge(&self, h: M::Halfedge) -> M::Halfedge {
        if self.is_primary(h) {
            return h;
        }
        let o = self.mesh.opposite(h);
        assert_eq!(
            self.maps.edge_index.directed_id(o),
            self.maps.edge_index.directed_id(h) ^ 1,
            "half-edges of one edge must have directed ids 2k and 2k + 1"
        );
        o
    }

    fn register(&mut self, h: M::Halfedge) {
        let id = self.undirected_id(h);
        self.primaries[id] = Some(h);
    }

    fn record(&self, h: M::Halfedge) -> &EdgeRecord<K::Cache> {
        assert!(self.is_primary(h), "record accessed through non-primary {:?}", h);
        self.records.get(self.undirected_id(h))
    }

    fn insert_in_queue(&mut self, h: M::Halfedge, cost: Cost) {
        assert!(self.is_primary(h), "queue accessed through non-primary {:?}", h);
        let id = self.undirected_id(h);
        let record = self.records.get_mut(id);
        assert!(record.handle.is_none(), "edge {id} is already queued");
        record.handle = Some(self.queue.push(id, cost));
    }

    fn update_in_queue(&mut self, h: M::Halfedge, cost: Cost) {
        assert!(self.is_primary(h), "queue accessed through non-primary {:?}", h);
        let id = self.undirected_id(h);
        let record = self.records.get_mut(id);
        let handle = record
            .handle
            .unwrap_or_else(|| panic!("edge {id} is not queued"));
        record.handle = Some(self.queue.update(handle, cost));
    }

    fn remove_from_queue(&mut self, h: M::Halfedge) {
        assert!(self.is_primary(h), "queue accessed through non-primary {:?}", h);
        let id = self.undirected_id(h);
        let record = self.records.get_mut(id);
        let handle = record
            .handle
            .take()
            .unwrap_or_else(|| panic!("edge {id} is not queued"));
        self.queue.erase(handle);
    }

    fn pop_from_queue(&mut self) -> Option<(M::Halfedge, Cost)> {
        let (id, cost) = self.queue.pop_min()?;
        self.records.get_mut(id).handle = None;
        let h = self.primaries[id]
            .unwrap_or_else(|| panic!("queued edge {id} has no registered half-edge"));
        Some((h, cost))
    }
}

/// Simplify `mesh` in place and return the number of undirected edges removed.
///
/// This is the one-call form of [`EdgeCollapse`].
///
/// # Example
///
/// ```
/// use edgefold::prelude::*;
/// use edgefold::algo::decimate::{
///     edge_collapse, CollapseMaps, CollapseOptions, CollapsePolicies, EdgeCountStop,
/// };
/// use nalgebra::Point3;
///
/// // A 4x4 grid of unit squares.
/// let mut vertices = Vec::new();
/// for j in 0..5 {
///     for i in 0..5 {
///         vertices.push(Point3::new(i as f64, j as f64, 0.0));
///     }
/// }
/// let mut faces = Vec::new();
/// for j in 0..4 {
///     for i in 0..4 {
///         let v = j * 5 + i;
///         faces.push([v, v + 1, v + 6]);
///         faces.push([v, v + 6, v + 5]);
///     }
/// }
/// let mut mesh: HalfEdgeMesh = build_from_triangles(&vertices, &faces).unwrap();
/// let before = mesh.num_edges();
///
/// let removed = edge_collapse(
///     &mut mesh,
///     EdgeCountStop::new(40),
///     CollapseMaps::defaults(),
///     CollapsePolicies::edge_length(),
///     (),
///     CollapseOptions::default(),
/// );
///
/// assert_eq!(removed, before - mesh.num_edges());
/// assert!(mesh.num_edges() <= 40);
/// assert!(mesh.is_valid());
/// ```
pub fn edge_collapse<M, S, K, C, P, V>(
    mesh: &mut M,
    should_stop: S,
    maps: CollapseMaps<'_, M>,
    policies: CollapsePolicies<K, C, P>,
    visitor: V,
    options: CollapseOptions,
) -> usize
where
    M: CollapseMesh,
    S: ShouldStop<M>,
    K: SetCache<M>,
    C: GetCost<M, K::Cache>,
    P: GetPlacement<M, K::Cache>,
    V: Visitor<M>,
{
    EdgeCollapse::new(mesh, should_stop, maps, policies, visitor, options)
        .run()
        .removed_edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::decimate::adapter::FixedVertices;
    use crate::algo::decimate::policy::{
        EdgeCountStop, EdgeGeometry, EdgeLengthCost, MidpointPlacement, NoCache, SetEdgeGeometry,
    };
    use crate::algo::decimate::visitor::StatsVisitor;
    use crate::mesh::{fixtures, HalfEdgeId, HalfEdgeMesh, VertexId};

    fn never_stop(_cost: f64, _counts: &CollapseCounts) -> bool {
        false
    }

    #[derive(Default)]
    struct KeptRecorder {
        kept: Vec<VertexId>,
    }

    impl Visitor<HalfEdgeMesh> for KeptRecorder {
        fn on_collapsed(
            &mut self,
            _mesh: &HalfEdgeMesh,
            kept: VertexId,
            _removed: &RemovedEdges<HalfEdgeId>,
        ) {
            self.kept.push(kept);
        }
    }

    #[test]
    fn test_tetrahedron_is_never_collapsed() {
        let mut mesh = fixtures::tetrahedron();
        let summary = EdgeCollapse::new(
            &mut mesh,
            never_stop,
            CollapseMaps::defaults(),
            CollapsePolicies::edge_length(),
            (),
            CollapseOptions::default(),
        )
        .run();

        assert_eq!(summary.collapses, 0);
        assert_eq!(summary.removed_edges, 0);
        assert_eq!(summary.state, LoopState::Exhausted);
        assert_eq!(mesh.num_edges(), 6);
    }

    #[test]
    fn test_octahedron_reduces_to_tetrahedron() {
        let mut mesh = fixtures::octahedron();
        let mut stats = StatsVisitor::new();
        let removed = edge_collapse(
            &mut mesh,
            never_stop,
            CollapseMaps::defaults(),
            CollapsePolicies::edge_length(),
            &mut stats,
            CollapseOptions::default(),
        );

        assert_eq!(removed, 6);
        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_edges(), 6);
        assert_eq!(mesh.num_faces(), 4);
        assert!(mesh.is_valid());

        assert_eq!(stats.initial, 12);
        assert_eq!(stats.collected, 12);
        assert_eq!(stats.collapsed, 2);
        assert_eq!(stats.removed, 6);
        assert!(stats.tetrahedra > 0);
        assert!(!stats.stopped);
    }

    #[test]
    fn test_single_triangle_is_refused() {
        let mut mesh = fixtures::single_triangle();
        let mut stats = StatsVisitor::new();
        let removed = edge_collapse(
            &mut mesh,
            never_stop,
            CollapseMaps::defaults(),
            CollapsePolicies::edge_length(),
            &mut stats,
            CollapseOptions::default(),
        );

        assert_eq!(removed, 0);
        assert_eq!(stats.collected, 0);
        assert_eq!(mesh.num_faces(), 1);
    }

    #[test]
    fn test_triangular_hole_stays_a_disk() {
        let mut mesh = fixtures::open_octahedron();
        assert_eq!(mesh.euler_characteristic(), 1);

        let removed = edge_collapse(
            &mut mesh,
            never_stop,
            CollapseMaps::defaults(),
            CollapsePolicies::edge_length(),
            (),
            CollapseOptions::default(),
        );

        assert!(removed > 0);
        assert!(mesh.num_faces() >= 1);
        assert_eq!(mesh.euler_characteristic(), 1);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_grid_reaches_target() {
        let mut mesh = fixtures::grid(10);
        let initial = mesh.num_edges();
        assert_eq!(initial, 320);
        let target = 150;

        let summary = EdgeCollapse::new(
            &mut mesh,
            EdgeCountStop::new(target),
            CollapseMaps::defaults(),
            CollapsePolicies::edge_length(),
            (),
            CollapseOptions::default(),
        )
        .run();

        assert_eq!(summary.state, LoopState::StoppedByPredicate);
        assert_eq!(summary.removed_edges, initial - mesh.num_edges());
        assert!(mesh.num_edges() <= target);
        assert!(mesh.num_edges() + 2 >= target);
        assert!(mesh.is_valid());
        assert_eq!(mesh.euler_characteristic(), 1);
    }

    #[test]
    fn test_fixed_vertices_survive() {
        let mut mesh = fixtures::grid(6);
        let border: Vec<_> = mesh
            .vertex_ids()
            .filter(|&v| mesh.is_boundary_vertex(v))
            .collect();
        let positions: Vec<_> = border.iter().map(|&v| *mesh.position(v)).collect();
        let fixed = FixedVertices::new(border.iter().copied());

        let mut stats = StatsVisitor::new();
        let summary = EdgeCollapse::new(
            &mut mesh,
            never_stop,
            CollapseMaps::<HalfEdgeMesh>::defaults().with_fixed(&fixed),
            CollapsePolicies::edge_length(),
            &mut stats,
            CollapseOptions::default(),
        )
        .run();

        assert!(summary.collapses > 0);
        for (&v, p) in border.iter().zip(&positions) {
            assert!(!mesh.is_vertex_removed(v));
            assert_eq!(mesh.position(v), p);
        }
        assert!(mesh.is_valid());
        assert_eq!(stats.collapsed, summary.collapses);
    }

    #[test]
    fn test_neighborhood_is_refreshed() {
        let mut mesh = fixtures::octahedron();
        let mut engine = EdgeCollapse::new(
            &mut mesh,
            never_stop,
            CollapseMaps::defaults(),
            CollapsePolicies::edge_length(),
            KeptRecorder::default(),
            CollapseOptions::default(),
        );

        engine.collect();
        assert_eq!(engine.queue_len(), 12);
        assert_eq!(engine.step(), LoopState::Running);

        let kept = engine.visitor().kept[0];
        let mesh = engine.mesh();
        // The kept vertex moved to the midpoint, so its edges changed length.
        for out in mesh.vertex_halfedges(kept).collect::<Vec<_>>() {
            let expected = (mesh.position(mesh.dest(out)) - mesh.position(kept)).norm_squared();
            let queued = engine.queued_cost(out).and_then(|c| c.value());
            assert!((queued.unwrap() - expected).abs() < 1e-12);
        }
        // One edge was popped and its two flanks were retired.
        assert_eq!(engine.queue_len(), 9);
    }

    #[test]
    fn test_undefined_cost_never_collapses() {
        let mut mesh = fixtures::grid(3);
        let no_cost = |_: HalfEdgeId, _: &HalfEdgeMesh, _: &()| None::<f64>;
        let mut stats = StatsVisitor::new();
        let summary = EdgeCollapse::new(
            &mut mesh,
            never_stop,
            CollapseMaps::defaults(),
            CollapsePolicies::new(NoCache, no_cost, MidpointPlacement),
            &mut stats,
            CollapseOptions::default(),
        )
        .run();

        assert_eq!(summary.collapses, 0);
        assert_eq!(summary.state, LoopState::Exhausted);
        assert!(stats.collected > 0);
        assert_eq!(stats.cost_uncomputable, stats.collected);
    }

    #[test]
    fn test_missing_placement_policy() {
        let no_place = |_: HalfEdgeId, _: &HalfEdgeMesh, _: &()| None::<Point3<f64>>;
        let policies = CollapsePolicies::new(NoCache, EdgeLengthCost, no_place);

        let mut skipped = fixtures::grid(3);
        let summary = EdgeCollapse::new(
            &mut skipped,
            never_stop,
            CollapseMaps::defaults(),
            policies,
            (),
            CollapseOptions::default(),
        )
        .run();
        assert_eq!(summary.collapses, 0);

        let mut kept = fixtures::grid(3);
        let original: Vec<_> = kept.vertex_ids().map(|v| *kept.position(v)).collect();
        let summary = EdgeCollapse::new(
            &mut kept,
            never_stop,
            CollapseMaps::defaults(),
            policies,
            (),
            CollapseOptions::default().with_missing_placement(MissingPlacement::KeepSource),
        )
        .run();
        assert!(summary.collapses > 0);
        for v in kept.vertex_ids() {
            assert_eq!(*kept.position(v), original[v.index()]);
        }
        assert!(kept.is_valid());
    }

    #[test]
    fn test_edge_count_shrinks_with_every_collapse() {
        #[derive(Default)]
        struct EdgeCounts(Vec<usize>);

        impl Visitor<HalfEdgeMesh> for EdgeCounts {
            fn on_started(&mut self, mesh: &HalfEdgeMesh) {
                self.0.push(mesh.num_edges());
            }

            fn on_collapsed(
                &mut self,
                mesh: &HalfEdgeMesh,
                _kept: VertexId,
                _removed: &RemovedEdges<HalfEdgeId>,
            ) {
                self.0.push(mesh.num_edges());
            }
        }

        let mut mesh = fixtures::grid(6);
        let mut counts = EdgeCounts::default();
        let removed = edge_collapse(
            &mut mesh,
            EdgeCountStop::new(30),
            CollapseMaps::defaults(),
            CollapsePolicies::edge_length(),
            &mut counts,
            CollapseOptions::default(),
        );

        assert!(counts.0.len() > 1);
        for pair in counts.0.windows(2) {
            let step = pair[0] - pair[1];
            assert!(step == 2 || step == 3, "collapse removed {} edges", step);
        }
        assert_eq!(removed, counts.0[0] - mesh.num_edges());
    }

    #[test]
    fn test_stop_predicate_sees_collapse_count() {
        let mut mesh = fixtures::grid(5);
        let summary = EdgeCollapse::new(
            &mut mesh,
            |_cost: f64, counts: &CollapseCounts| counts.collapses >= 3,
            CollapseMaps::defaults(),
            CollapsePolicies::edge_length(),
            (),
            CollapseOptions::default(),
        )
        .run();

        assert_eq!(summary.collapses, 3);
        assert_eq!(summary.state, LoopState::StoppedByPredicate);
    }

    #[test]
    fn test_cached_geometry_cost() {
        let mut mesh = fixtures::grid(4);
        let cached_cost = |_: HalfEdgeId, _: &HalfEdgeMesh, g: &EdgeGeometry| Some(g.squared_length());
        let cached_place = |_: HalfEdgeId, _: &HalfEdgeMesh, g: &EdgeGeometry| Some(g.midpoint());
        let removed = edge_collapse(
            &mut mesh,
            EdgeCountStop::new(40),
            CollapseMaps::defaults(),
            CollapsePolicies::new(SetEdgeGeometry, cached_cost, cached_place),
            (),
            CollapseOptions::default(),
        );

        assert!(removed > 0);
        assert!(mesh.num_edges() <= 40);
        assert!(mesh.is_valid());
    }

    #[test]
    #[should_panic]
    fn test_non_paired_edge_index_panics() {
        let mut mesh = fixtures::grid(1);
        // Odd ids whose partner is not id ^ 1.
        let bad_index = |h: HalfEdgeId| if h.is_primary() { h.index() } else { h.index() + 2 };
        let maps = CollapseMaps::<HalfEdgeMesh> {
            edge_index: &bad_index,
            ..CollapseMaps::defaults()
        };
        let engine = EdgeCollapse::new(
            &mut mesh,
            never_stop,
            maps,
            CollapsePolicies::edge_length(),
            (),
            CollapseOptions::default(),
        );
        engine.queued_cost(HalfEdgeId::new(1));
    }
}

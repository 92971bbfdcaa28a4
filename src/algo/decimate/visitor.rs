//! Observation hooks of the collapse engine.

use std::fmt;

use nalgebra::Point3;

use super::adapter::{CollapseMesh, RemovedEdges};
use crate::algo::progress::Progress;

/// The edge under consideration together with its endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeProfile<V, H> {
    /// The primary half-edge `p -> q`.
    pub edge: H,
    /// Source vertex, kept by a collapse.
    pub p: V,
    /// Target vertex, removed by a collapse.
    pub q: V,
    /// Whether `p` is fixed.
    pub p_fixed: bool,
    /// Whether `q` is fixed.
    pub q_fixed: bool,
}

/// Profile type of mesh `M`.
pub type ProfileOf<M> = EdgeProfile<<M as CollapseMesh>::Vertex, <M as CollapseMesh>::Halfedge>;

/// Callbacks invoked during a run. Every method defaults to a no-op.
///
/// Visitors only receive `&M`, so they can inspect but not edit the mesh.
#[allow(unused_variables)]
pub trait Visitor<M: CollapseMesh> {
    /// Before the collector runs.
    fn on_started(&mut self, mesh: &M) {}

    /// After the loop ends, whatever the reason.
    fn on_finished(&mut self, mesh: &M) {}

    /// The popped edge belonged to a lone tetrahedron and was discarded.
    fn on_tetrahedron_reached(&mut self, mesh: &M) {}

    /// The stop predicate ended the run.
    fn on_stop_condition_reached(&mut self, mesh: &M) {}

    /// An edge entered the queue during collection.
    fn on_collected(
        &mut self,
        mesh: &M,
        profile: &ProfileOf<M>,
        cost: Option<f64>,
        placement: Option<Point3<f64>>,
    ) {
    }

    /// An edge was popped from the queue and examined.
    fn on_processed(
        &mut self,
        mesh: &M,
        profile: &ProfileOf<M>,
        cost: Option<f64>,
        placement: Option<Point3<f64>>,
        is_collapsable: bool,
    ) {
    }

    /// An edge was collapsed into `kept`.
    fn on_collapsed(&mut self, mesh: &M, kept: M::Vertex, removed: &RemovedEdges<M::Halfedge>) {}
}

impl<M: CollapseMesh> Visitor<M> for () {}

impl<M: CollapseMesh, V: Visitor<M> + ?Sized> Visitor<M> for &mut V {
    fn on_started(&mut self, mesh: &M) {
        (**self).on_started(mesh);
    }

    fn on_finished(&mut self, mesh: &M) {
        (**self).on_finished(mesh);
    }

    fn on_tetrahedron_reached(&mut self, mesh: &M) {
        (**self).on_tetrahedron_reached(mesh);
    }

    fn on_stop_condition_reached(&mut self, mesh: &M) {
        (**self).on_stop_condition_reached(mesh);
    }

    fn on_collected(
        &mut self,
        mesh: &M,
        profile: &ProfileOf<M>,
        cost: Option<f64>,
        placement: Option<Point3<f64>>,
    ) {
        (**self).on_collected(mesh, profile, cost, placement);
    }

    fn on_processed(
        &mut self,
        mesh: &M,
        profile: &ProfileOf<M>,
        cost: Option<f64>,
        placement: Option<Point3<f64>>,
        is_collapsable: bool,
    ) {
        (**self).on_processed(mesh, profile, cost, placement, is_collapsable);
    }

    fn on_collapsed(&mut self, mesh: &M, kept: M::Vertex, removed: &RemovedEdges<M::Halfedge>) {
        (**self).on_collapsed(mesh, kept, removed);
    }
}

impl<M: CollapseMesh, A: Visitor<M>, B: Visitor<M>> Visitor<M> for (A, B) {
    fn on_started(&mut self, mesh: &M) {
        self.0.on_started(mesh);
        self.1.on_started(mesh);
    }

    fn on_finished(&mut self, mesh: &M) {
        self.0.on_finished(mesh);
        self.1.on_finished(mesh);
    }

    fn on_tetrahedron_reached(&mut self, mesh: &M) {
        self.0.on_tetrahedron_reached(mesh);
        self.1.on_tetrahedron_reached(mesh);
    }

    fn on_stop_condition_reached(&mut self, mesh: &M) {
        self.0.on_stop_condition_reached(mesh);
        self.1.on_stop_condition_reached(mesh);
    }

    fn on_collected(
        &mut self,
        mesh: &M,
        profile: &ProfileOf<M>,
        cost: Option<f64>,
        placement: Option<Point3<f64>>,
    ) {
        self.0.on_collected(mesh, profile, cost, placement);
        self.1.on_collected(mesh, profile, cost, placement);
    }

    fn on_processed(
        &mut self,
        mesh: &M,
        profile: &ProfileOf<M>,
        cost: Option<f64>,
        placement: Option<Point3<f64>>,
        is_collapsable: bool,
    ) {
        self.0
            .on_processed(mesh, profile, cost, placement, is_collapsable);
        self.1
            .on_processed(mesh, profile, cost, placement, is_collapsable);
    }

    fn on_collapsed(&mut self, mesh: &M, kept: M::Vertex, removed: &RemovedEdges<M::Halfedge>) {
        self.0.on_collapsed(mesh, kept, removed);
        self.1.on_collapsed(mesh, kept, removed);
    }
}

/// Counts what happened to every edge during a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsVisitor {
    /// Undirected edges when the run started.
    pub initial: usize,
    /// Edges queued by the collector.
    pub collected: usize,
    /// Edges popped and examined.
    pub processed: usize,
    /// Examined edges that passed every check.
    pub collapsable: usize,
    /// Examined edges refused because an endpoint is fixed.
    pub fixed: usize,
    /// Examined edges refused by the link condition.
    pub non_collapsable: usize,
    /// Collapsable edges without a defined cost.
    pub cost_uncomputable: usize,
    /// Collapses performed.
    pub collapsed: usize,
    /// Undirected edges removed by collapses.
    pub removed: usize,
    /// Edges discarded because they belonged to a tetrahedron.
    pub tetrahedra: usize,
    /// Whether the stop predicate ended the run.
    pub stopped: bool,
}

impl StatsVisitor {
    /// Create a zeroed visitor.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<M: CollapseMesh> Visitor<M> for StatsVisitor {
    fn on_started(&mut self, mesh: &M) {
        self.initial = mesh.num_edges();
    }

    fn on_tetrahedron_reached(&mut self, _mesh: &M) {
        self.tetrahedra += 1;
    }

    fn on_stop_condition_reached(&mut self, _mesh: &M) {
        self.stopped = true;
    }

    fn on_collected(
        &mut self,
        _mesh: &M,
        _profile: &ProfileOf<M>,
        _cost: Option<f64>,
        _placement: Option<Point3<f64>>,
    ) {
        self.collected += 1;
    }

    fn on_processed(
        &mut self,
        _mesh: &M,
        profile: &ProfileOf<M>,
        cost: Option<f64>,
        _placement: Option<Point3<f64>>,
        is_collapsable: bool,
    ) {
        self.processed += 1;
        if profile.p_fixed || profile.q_fixed {
            self.fixed += 1;
        } else if !is_collapsable {
            self.non_collapsable += 1;
        } else if cost.is_none() {
            self.cost_uncomputable += 1;
        } else {
            self.collapsable += 1;
        }
    }

    fn on_collapsed(&mut self, _mesh: &M, _kept: M::Vertex, removed: &RemovedEdges<M::Halfedge>) {
        self.collapsed += 1;
        self.removed += 1 + removed.pt.is_some() as usize + removed.qb.is_some() as usize;
    }
}

impl fmt::Display for StatsVisitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Edges collected:     {}", self.collected)?;
        writeln!(f, "Edges processed:     {}", self.processed)?;
        writeln!(f, "  collapsable:       {}", self.collapsable)?;
        writeln!(f, "  fixed:             {}", self.fixed)?;
        writeln!(f, "  non-collapsable:   {}", self.non_collapsable)?;
        writeln!(f, "  cost uncomputable: {}", self.cost_uncomputable)?;
        writeln!(f, "Edges collapsed:     {}", self.collapsed)?;
        write!(f, "Edges removed:       {} of {}", self.removed, self.initial)
    }
}

/// Forwards the number of removed edges to a [`Progress`] callback.
pub struct ProgressVisitor<'a> {
    progress: &'a Progress,
    goal: Option<usize>,
    initial: usize,
    removed: usize,
}

impl<'a> ProgressVisitor<'a> {
    /// Report against the initial edge count.
    pub fn new(progress: &'a Progress) -> Self {
        Self {
            progress,
            goal: None,
            initial: 0,
            removed: 0,
        }
    }

    /// Report against `goal` removed edges instead.
    pub fn with_goal(mut self, goal: usize) -> Self {
        self.goal = Some(goal);
        self
    }

    fn total(&self) -> usize {
        self.goal.unwrap_or(self.initial).max(1)
    }
}

impl fmt::Debug for ProgressVisitor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressVisitor")
            .field("goal", &self.goal)
            .field("initial", &self.initial)
            .field("removed", &self.removed)
            .finish_non_exhaustive()
    }
}

impl<M: CollapseMesh> Visitor<M> for ProgressVisitor<'_> {
    fn on_started(&mut self, mesh: &M) {
        self.initial = mesh.num_edges();
        self.removed = 0;
        self.progress.report(0, self.total(), "Collapsing edges");
    }

    fn on_finished(&mut self, _mesh: &M) {
        let total = self.total();
        self.progress.report(total, total, "Done");
    }

    fn on_collapsed(&mut self, _mesh: &M, _kept: M::Vertex, removed: &RemovedEdges<M::Halfedge>) {
        self.removed += 1 + removed.pt.is_some() as usize + removed.qb.is_some() as usize;
        let total = self.total();
        self.progress
            .report(self.removed.min(total), total, "Collapsing edges");
    }
}

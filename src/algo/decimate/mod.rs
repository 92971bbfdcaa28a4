//! Mesh decimation by greedy edge collapse.
//!
//! The engine in this module simplifies a triangle mesh by repeatedly
//! collapsing its cheapest edge, merging the two endpoints into one vertex.
//! Every decision is delegated to a policy:
//!
//! - a **cache** policy fills per-edge data before each cost query,
//! - a **cost** policy orders the edges,
//! - a **placement** policy positions the merged vertex,
//! - a **stop** predicate ends the run,
//! - a **visitor** observes what happened.
//!
//! A collapse is only committed if it keeps the mesh a 2-manifold (the link
//! condition), never touches a fixed vertex, and would not reduce a lone
//! tetrahedron or an isolated triangle.
//!
//! The engine reaches the mesh through the [`CollapseMesh`] trait, which is
//! implemented for [`HalfEdgeMesh`](crate::mesh::HalfEdgeMesh).
//!
//! # Example
//!
//! ```no_run
//! use edgefold::prelude::*;
//! use edgefold::algo::decimate::{decimate, DecimateOptions};
//!
//! let mut mesh: HalfEdgeMesh = edgefold::io::load("input.off").unwrap();
//!
//! // Keep 30% of the edges, leaving the border untouched.
//! let options = DecimateOptions::with_target_ratio(0.3).with_preserve_boundary(true);
//! let result = decimate(&mut mesh, &options).unwrap();
//! println!("removed {} edges", result.removed_edges);
//!
//! edgefold::io::save(&mesh, "output.off").unwrap();
//! ```
//!
//! For full control, call [`edge_collapse`] with custom policies.

mod adapter;
mod degeneracy;
mod engine;
mod policy;
mod queue;
mod records;
mod visitor;

pub use adapter::{
    CollapseMaps, CollapseMesh, Collapsed, EdgeBorderMap, EdgeIndexMap, FixedVertices,
    MeshBorder, MeshEdgeIndex, MeshPoints, NoFixedVertices, RemovedEdges, VertexFixedMap,
    VertexPointMap,
};
pub use degeneracy::{is_collapsable, is_open_triangle, is_tetrahedron};
pub use engine::{
    edge_collapse, CollapseOptions, CollapseSummary, EdgeCollapse, LoopState, MissingPlacement,
};
pub use policy::{
    CollapseCounts, CollapsePolicies, EdgeCountStop, EdgeGeometry, EdgeLengthCost, EdgeRatioStop,
    GetCost, GetPlacement, MaxCost, MidpointPlacement, NoCache, SetCache, SetEdgeGeometry,
    ShouldStop,
};
pub use queue::{Cost, EdgeQueue, QueueHandle};
pub use records::{EdgeRecord, EdgeRecords};
pub use visitor::{EdgeProfile, ProfileOf, ProgressVisitor, StatsVisitor, Visitor};

use log::{debug, info};

use crate::algo::progress::Progress;
use crate::error::{MeshError, Result};
use crate::mesh::{HalfEdgeMesh, MeshIndex};

/// Options for [`decimate`].
#[derive(Debug, Clone)]
pub struct DecimateOptions {
    /// Target number of undirected edges after decimation.
    /// If None, uses target_ratio instead.
    pub target_edges: Option<usize>,

    /// Target ratio of edges to keep (0.0 to 1.0).
    /// Only used if target_edges is None.
    pub target_ratio: f64,

    /// Fix every border vertex so the outline is kept exactly.
    pub preserve_boundary: bool,

    /// Maximum squared edge length that may still be collapsed.
    pub max_cost: Option<f64>,

    /// What to do with edges that have no placement.
    pub missing_placement: MissingPlacement,

    /// Rebuild the mesh without removed elements afterwards.
    pub compact: bool,
}

impl Default for DecimateOptions {
    fn default() -> Self {
        Self::with_target_ratio(0.5)
    }
}

impl DecimateOptions {
    /// Create options to reduce to a target number of edges.
    pub fn with_target_edges(target: usize) -> Self {
        Self {
            target_edges: Some(target),
            ..Self::with_target_ratio(0.5)
        }
    }

    /// Create options to reduce to a ratio of the original edge count.
    pub fn with_target_ratio(ratio: f64) -> Self {
        Self {
            target_edges: None,
            target_ratio: ratio.clamp(0.0, 1.0),
            preserve_boundary: false,
            max_cost: None,
            missing_placement: MissingPlacement::Skip,
            compact: false,
        }
    }

    /// Set whether border vertices are fixed.
    pub fn with_preserve_boundary(mut self, preserve: bool) -> Self {
        self.preserve_boundary = preserve;
        self
    }

    /// Refuse collapses whose cost exceeds `max_cost`.
    pub fn with_max_cost(mut self, max_cost: f64) -> Self {
        self.max_cost = Some(max_cost);
        self
    }

    /// Set the handling of edges without a placement.
    pub fn with_missing_placement(mut self, missing_placement: MissingPlacement) -> Self {
        self.missing_placement = missing_placement;
        self
    }

    /// Set whether the result is compacted.
    pub fn with_compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }

    /// Compute the target number of edges given the original count.
    pub fn compute_target(&self, original_edges: usize) -> usize {
        if let Some(target) = self.target_edges {
            target.min(original_edges)
        } else {
            ((original_edges as f64) * self.target_ratio).round() as usize
        }
    }

    /// Check that every option holds a usable value.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.target_ratio) {
            return Err(MeshError::invalid_param(
                "target_ratio",
                self.target_ratio,
                "must be within [0, 1]",
            ));
        }
        if let Some(max_cost) = self.max_cost {
            if !max_cost.is_finite() || max_cost < 0.0 {
                return Err(MeshError::invalid_param(
                    "max_cost",
                    max_cost,
                    "must be finite and non-negative",
                ));
            }
        }
        Ok(())
    }
}

/// Outcome of [`decimate`].
#[derive(Debug, Clone)]
pub struct DecimateResult {
    /// Undirected edges before decimation.
    pub initial_edges: usize,
    /// Undirected edges after decimation.
    pub final_edges: usize,
    /// Edges removed by collapses.
    pub removed_edges: usize,
    /// Number of collapses performed.
    pub collapses: usize,
    /// Why the run ended.
    pub state: LoopState,
    /// Per-edge statistics of the run.
    pub stats: StatsVisitor,
}

/// Decimate a mesh with squared edge length cost and midpoint placement.
///
/// Stops once the edge count reaches the target of `options`. Because a
/// collapse removes two or three edges at once, the result may undershoot the
/// target by up to two edges; it overshoots only if no legal collapse is left.
///
/// # Arguments
///
/// * `mesh` - The mesh to decimate (modified in place)
/// * `options` - Decimation parameters
pub fn decimate<I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<I>,
    options: &DecimateOptions,
) -> Result<DecimateResult> {
    decimate_with_progress(mesh, options, &Progress::none())
}

/// Like [`decimate`], reporting removed edges through `progress`.
pub fn decimate_with_progress<I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<I>,
    options: &DecimateOptions,
    progress: &Progress,
) -> Result<DecimateResult> {
    options.validate()?;
    if mesh.num_faces() == 0 {
        return Err(MeshError::EmptyMesh);
    }

    let initial_edges = mesh.num_edges();
    let target = options.compute_target(initial_edges);
    debug!(
        "decimating {} edges down to {} (preserve boundary: {})",
        initial_edges, target, options.preserve_boundary
    );

    let fixed = if options.preserve_boundary {
        FixedVertices::new(mesh.vertex_ids().filter(|&v| mesh.is_boundary_vertex(v)))
    } else {
        FixedVertices::default()
    };
    let maps = CollapseMaps::<HalfEdgeMesh<I>>::defaults().with_fixed(&fixed);

    let cost = MaxCost::new(EdgeLengthCost, options.max_cost.unwrap_or(f64::INFINITY));
    let policies = CollapsePolicies::edge_length().with_cost(cost);

    let mut stats = StatsVisitor::new();
    let reporter = ProgressVisitor::new(progress).with_goal(initial_edges - target);
    let collapse_options = CollapseOptions::default().with_missing_placement(options.missing_placement);

    let summary = EdgeCollapse::new(
        mesh,
        EdgeCountStop::new(target),
        maps,
        policies,
        (&mut stats, reporter),
        collapse_options,
    )
    .run();

    if options.compact {
        *mesh = mesh.compact()?;
    }

    info!(
        "decimated {} -> {} edges in {} collapses",
        initial_edges,
        mesh.num_edges(),
        summary.collapses
    );

    Ok(DecimateResult {
        initial_edges,
        final_edges: mesh.num_edges(),
        removed_edges: summary.removed_edges,
        collapses: summary.collapses,
        state: summary.state,
        stats,
    })
}

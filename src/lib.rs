//! # Edgefold
//!
//! Half-edge triangle meshes and a policy-driven greedy edge-collapse
//! simplification engine.
//!
//! Edgefold reduces the number of edges of a triangle mesh by repeatedly
//! collapsing the cheapest edge while keeping the surface a 2-manifold. The
//! engine is generic: it reaches the mesh through a small adapter trait and
//! asks pluggable policies for costs, vertex placements and when to stop.
//!
//! ## Features
//!
//! - **Half-edge data structure**: O(1) adjacency queries with type-safe indices
//! - **Flexible indexing**: Support for 16-bit, 32-bit, and 64-bit indices
//! - **Edge collapse**: link-condition checked collapses with stable ids until compaction
//! - **Policies**: cost, placement, cache and stop policies as traits or closures
//! - **File formats**: OFF and STL
//!
//! ## Quick Start
//!
//! ```no_run
//! use edgefold::prelude::*;
//! use edgefold::algo::decimate::{decimate, DecimateOptions};
//!
//! let mut mesh: HalfEdgeMesh = edgefold::io::load("model.off").unwrap();
//! println!("Edges: {}", mesh.num_edges());
//!
//! let result = decimate(&mut mesh, &DecimateOptions::with_target_edges(1000)).unwrap();
//! println!("Removed {} edges", result.removed_edges);
//!
//! edgefold::io::save(&mesh, "simplified.off").unwrap();
//! ```
//!
//! ## Building Meshes Programmatically
//!
//! ```
//! use edgefold::prelude::*;
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//!     Point3::new(0.5, 0.5, 1.0),
//! ];
//!
//! let faces = vec![
//!     [0, 2, 1],  // bottom
//!     [0, 1, 3],  // front
//!     [1, 2, 3],  // right
//!     [2, 0, 3],  // left
//! ];
//!
//! let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &faces).unwrap();
//! assert_eq!(mesh.num_vertices(), 4);
//! assert_eq!(mesh.num_edges(), 6);
//! assert_eq!(mesh.euler_characteristic(), 2);
//! ```
//!
//! ## Custom Policies
//!
//! Closures can stand in for any policy:
//!
//! ```
//! use edgefold::prelude::*;
//! use edgefold::algo::decimate::{
//!     edge_collapse, CollapseCounts, CollapseMaps, CollapseOptions, CollapsePolicies,
//! };
//! use nalgebra::Point3;
//!
//! # let vertices = vec![
//! #     Point3::new(1.0, 0.0, 0.0), Point3::new(-1.0, 0.0, 0.0),
//! #     Point3::new(0.0, 1.0, 0.0), Point3::new(0.0, -1.0, 0.0),
//! #     Point3::new(0.0, 0.0, 1.0), Point3::new(0.0, 0.0, -1.0),
//! # ];
//! # let faces = vec![
//! #     [0, 2, 4], [2, 1, 4], [1, 3, 4], [3, 0, 4],
//! #     [2, 0, 5], [1, 2, 5], [3, 1, 5], [0, 3, 5],
//! # ];
//! let mut mesh: HalfEdgeMesh = build_from_triangles(&vertices, &faces).unwrap();
//!
//! // Vertex 4 must survive.
//! let pinned = |v: VertexId| v.index() == 4;
//! let one_collapse = |_cost: f64, counts: &CollapseCounts| counts.collapses >= 1;
//!
//! let removed = edge_collapse(
//!     &mut mesh,
//!     one_collapse,
//!     CollapseMaps::<HalfEdgeMesh>::defaults().with_fixed(&pinned),
//!     CollapsePolicies::edge_length(),
//!     (),
//!     CollapseOptions::default(),
//! );
//! assert_eq!(removed, 3);
//! assert!(!mesh.is_vertex_removed(VertexId::new(4)));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod io;
pub mod mesh;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use edgefold::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{MeshError, Result};
    pub use crate::mesh::{
        build_from_triangles, to_face_vertex, EdgeId, Face, FaceId, HalfEdge, HalfEdgeId,
        HalfEdgeMesh, MeshIndex, Vertex, VertexId,
    };
}

// Re-export nalgebra types for convenience
pub use nalgebra;

//! Index types for mesh elements.
//!
//! Vertices, half-edges, faces and full edges are identified by type-safe
//! wrappers that are generic over the underlying integer type, so a mesh can
//! use `u16`, `u32` or `u64` indices depending on its size.
//!
//! Half-edges are always allocated in twin pairs: the half-edges of edge `k`
//! are `2k` and `2k + 1`. The even half is the *primary* half of its edge.

use std::fmt::{self, Debug};
use std::hash::Hash;

/// Trait for types that can be used as mesh indices.
///
/// This trait is implemented for `u16`, `u32`, and `u64`.
pub trait MeshIndex:
    Copy + Clone + Eq + PartialEq + Ord + PartialOrd + Hash + Debug + Send + Sync + 'static
{
    /// The maximum valid index value.
    const MAX: Self;

    /// A sentinel value representing an invalid/null index.
    const INVALID: Self;

    /// Convert from usize to this index type.
    fn from_usize(v: usize) -> Self;

    /// Convert to usize.
    fn to_usize(self) -> usize;

    /// Check if this is a valid (non-sentinel) index.
    fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

macro_rules! impl_mesh_index {
    ($ty:ty) => {
        impl MeshIndex for $ty {
            const MAX: Self = <$ty>::MAX - 1;
            const INVALID: Self = <$ty>::MAX;

            #[inline]
            fn from_usize(v: usize) -> Self {
                debug_assert!(
                    v as u64 <= Self::MAX as u64,
                    "index {} too large for {}",
                    v,
                    stringify!($ty)
                );
                v as $ty
            }

            #[inline]
            fn to_usize(self) -> usize {
                self as usize
            }
        }
    };
}

impl_mesh_index!(u16);
impl_mesh_index!(u32);
impl_mesh_index!(u64);

/// A type-safe vertex index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct VertexId<I: MeshIndex = u32>(I);

/// A type-safe half-edge index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct HalfEdgeId<I: MeshIndex = u32>(I);

/// A type-safe face index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct FaceId<I: MeshIndex = u32>(I);

/// A type-safe edge index (for full edges, not half-edges).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct EdgeId<I: MeshIndex = u32>(I);

macro_rules! impl_index_type {
    ($name:ident, $display:literal) => {
        impl<I: MeshIndex> $name<I> {
            /// Create a new index from a raw value.
            #[inline]
            pub fn new(index: usize) -> Self {
                Self(I::from_usize(index))
            }

            /// Create an invalid/null index.
            #[inline]
            pub fn invalid() -> Self {
                Self(I::INVALID)
            }

            /// Get the raw index value.
            #[inline]
            pub fn index(self) -> usize {
                self.0.to_usize()
            }

            /// Check if this is a valid (non-null) index.
            #[inline]
            pub fn is_valid(self) -> bool {
                self.0.is_valid()
            }
        }

        impl<I: MeshIndex> Debug for $name<I> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, "{}({})", $display, self.index())
                } else {
                    write!(f, "{}(INVALID)", $display)
                }
            }
        }

        impl<I: MeshIndex> Default for $name<I> {
            fn default() -> Self {
                Self::invalid()
            }
        }

        impl<I: MeshIndex> From<usize> for $name<I> {
            fn from(v: usize) -> Self {
                Self::new(v)
            }
        }
    };
}

impl_index_type!(VertexId, "V");
impl_index_type!(HalfEdgeId, "HE");
impl_index_type!(FaceId, "F");
impl_index_type!(EdgeId, "E");

impl<I: MeshIndex> HalfEdgeId<I> {
    /// The opposite half of the same edge.
    #[inline]
    pub fn twin(self) -> Self {
        Self::new(self.index() ^ 1)
    }

    /// The full edge this half-edge belongs to.
    #[inline]
    pub fn edge(self) -> EdgeId<I> {
        EdgeId::new(self.index() / 2)
    }

    /// Whether this is the even (primary) half of its edge.
    #[inline]
    pub fn is_primary(self) -> bool {
        self.index() % 2 == 0
    }
}

impl<I: MeshIndex> EdgeId<I> {
    /// One of the two half-edges of this edge (`side` 0 is the primary half).
    #[inline]
    pub fn halfedge(self, side: usize) -> HalfEdgeId<I> {
        debug_assert!(side < 2);
        HalfEdgeId::new(self.index() * 2 + side)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_id() {
        let v: VertexId = VertexId::new(42);
        assert_eq!(v.index(), 42);
        assert!(v.is_valid());

        let invalid: VertexId = VertexId::invalid();
        assert!(!invalid.is_valid());
    }

    #[test]
    fn test_small_indices() {
        let v: VertexId<u16> = VertexId::new(1000);
        assert_eq!(v.index(), 1000);
        assert!(!VertexId::<u16>::invalid().is_valid());
    }

    #[test]
    fn test_halfedge_pairing() {
        let he: HalfEdgeId = HalfEdgeId::new(6);
        assert!(he.is_primary());
        assert_eq!(he.twin().index(), 7);
        assert!(!he.twin().is_primary());
        assert_eq!(he.twin().twin(), he);
        assert_eq!(he.edge(), he.twin().edge());
        assert_eq!(he.edge().index(), 3);
        assert_eq!(he.edge().halfedge(0), he);
        assert_eq!(he.edge().halfedge(1), he.twin());
    }

    #[test]
    fn test_debug_format() {
        let v: VertexId = VertexId::new(42);
        assert_eq!(format!("{:?}", v), "V(42)");

        let invalid: HalfEdgeId = HalfEdgeId::invalid();
        assert_eq!(format!("{:?}", invalid), "HE(INVALID)");
    }
}

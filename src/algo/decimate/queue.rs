//! Indexed mutable priority queue of edge candidates.
//!
//! The collapse loop needs more than a binary heap: after every collapse the
//! entries of arbitrary edges are re-prioritized or removed. Entries are keyed
//! by undirected edge id and addressed through the [`QueueHandle`] returned on
//! insertion.

use std::cmp::Ordering;

use priority_queue::DoublePriorityQueue;

/// Collapse cost of a queued edge.
///
/// `Cost(None)` marks an edge whose cost could not be computed. Such entries
/// sort before every defined cost, so they are popped (and re-examined) first.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cost(pub Option<f64>);

impl Cost {
    /// A defined cost.
    pub fn new(value: f64) -> Self {
        Self(Some(value))
    }

    /// The undefined cost.
    pub fn none() -> Self {
        Self(None)
    }

    /// The cost value, if defined.
    pub fn value(self) -> Option<f64> {
        self.0
    }
}

impl From<Option<f64>> for Cost {
    fn from(value: Option<f64>) -> Self {
        Self(value)
    }
}

impl PartialEq for Cost {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Cost {}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cost {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.0, other.0) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(a), Some(b)) => a.total_cmp(&b),
        }
    }
}

/// Handle to a pending queue entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueueHandle(usize);

impl QueueHandle {
    /// The undirected edge id this entry belongs to.
    pub fn edge(self) -> usize {
        self.0
    }
}

/// Min-queue of undirected edge ids ordered by [`Cost`].
///
/// Ties between equal costs are broken arbitrarily.
pub struct EdgeQueue {
    heap: DoublePriorityQueue<usize, Cost>,
}

impl EdgeQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            heap: DoublePriorityQueue::new(),
        }
    }

    /// Create an empty queue with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: DoublePriorityQueue::with_capacity(capacity),
        }
    }

    /// Insert `edge` with the given cost.
    ///
    /// # Panics
    /// If `edge` already has an entry.
    pub fn push(&mut self, edge: usize, cost: Cost) -> QueueHandle {
        let previous = self.heap.push(edge, cost);
        assert!(previous.is_none(), "edge {edge} queued twice");
        QueueHandle(edge)
    }

    /// Change the cost of a pending entry.
    ///
    /// # Panics
    /// If the handle does not refer to a pending entry.
    pub fn update(&mut self, handle: QueueHandle, cost: Cost) -> QueueHandle {
        let previous = self.heap.change_priority(&handle.0, cost);
        assert!(previous.is_some(), "edge {} is not queued", handle.0);
        handle
    }

    /// Remove a pending entry.
    ///
    /// # Panics
    /// If the handle does not refer to a pending entry.
    pub fn erase(&mut self, handle: QueueHandle) {
        let removed = self.heap.remove(&handle.0);
        assert!(removed.is_some(), "edge {} is not queued", handle.0);
    }

    /// Remove and return the cheapest entry.
    pub fn pop_min(&mut self) -> Option<(usize, Cost)> {
        self.heap.pop_min()
    }

    /// The cheapest entry, without removing it.
    pub fn peek_min(&self) -> Option<(usize, Cost)> {
        self.heap.peek_min().map(|(&edge, &cost)| (edge, cost))
    }

    /// The cost currently queued for `edge`.
    pub fn cost_of(&self, edge: usize) -> Option<Cost> {
        self.heap.get_priority(&edge).copied()
    }

    /// Whether `edge` has a pending entry.
    pub fn contains(&self, edge: usize) -> bool {
        self.heap.get_priority(&edge).is_some()
    }

    /// Number of pending entries.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

impl Default for EdgeQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EdgeQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EdgeQueue")
            .field("len", &self.heap.len())
            .finish_non_exhaustive()
    }
}

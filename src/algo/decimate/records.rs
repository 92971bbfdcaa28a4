//! Per-edge bookkeeping for the collapse engine.

use super::queue::QueueHandle;

/// Engine state attached to one undirected edge.
#[derive(Debug, Clone, Default)]
pub struct EdgeRecord<C> {
    /// Payload computed by the cache policy.
    pub cache: C,
    /// Handle of the pending queue entry, if the edge is queued.
    pub handle: Option<QueueHandle>,
}

impl<C> EdgeRecord<C> {
    /// Whether the edge currently has a pending queue entry.
    #[inline]
    pub fn is_queued(&self) -> bool {
        self.handle.is_some()
    }
}

/// Dense store of [`EdgeRecord`]s indexed by undirected edge id.
///
/// Sized once for the id bound of the mesh at engine start. Ids of edges
/// removed during a run are retired and never reused.
#[derive(Debug, Clone)]
pub struct EdgeRecords<C> {
    records: Vec<EdgeRecord<C>>,
}

impl<C: Default> EdgeRecords<C> {
    /// Allocate default records for undirected ids `0..edge_count`.
    pub fn new(edge_count: usize) -> Self {
        let mut records = Vec::with_capacity(edge_count);
        records.resize_with(edge_count, EdgeRecord::default);
        Self { records }
    }
}

impl<C> EdgeRecords<C> {
    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record of undirected edge `edge`.
    ///
    /// # Panics
    /// If `edge` lies beyond the allocated bound.
    #[inline]
    pub fn get(&self, edge: usize) -> &EdgeRecord<C> {
        assert!(edge < self.records.len(), "edge id {edge} out of range");
        &self.records[edge]
    }

    /// Mutable record of undirected edge `edge`.
    ///
    /// # Panics
    /// If `edge` lies beyond the allocated bound.
    #[inline]
    pub fn get_mut(&mut self, edge: usize) -> &mut EdgeRecord<C> {
        assert!(edge < self.records.len(), "edge id {edge} out of range");
        &mut self.records[edge]
    }

    /// Number of records with a pending queue entry.
    pub fn queued_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_queued()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_records_are_unqueued() {
        let records: EdgeRecords<u8> = EdgeRecords::new(5);
        assert_eq!(records.len(), 5);
        assert!((0..5).all(|e| !records.get(e).is_queued()));
        assert_eq!(records.queued_count(), 0);
    }

    #[test]
    fn test_get_mut() {
        let mut records: EdgeRecords<f64> = EdgeRecords::new(2);
        records.get_mut(1).cache = 2.5;
        assert_eq!(records.get(1).cache, 2.5);
        assert_eq!(records.get(0).cache, 0.0);
    }

    #[test]
    #[should_panic]
    fn test_out_of_range_panics() {
        let records: EdgeRecords<()> = EdgeRecords::new(2);
        records.get(2);
    }
}

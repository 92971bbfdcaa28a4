//! Progress reporting for long-running algorithms.
//!
//! Algorithms report through a [`Progress`] callback so that callers (the CLI
//! progress bar, a GUI, a log line) decide how to present it.
//!
//! # Example
//!
//! ```
//! use edgefold::algo::progress::Progress;
//!
//! let progress = Progress::new(|current, total, message| {
//!     println!("[{}/{}] {}", current, total, message);
//! });
//! progress.report(3, 10, "Collapsing edges");
//! ```

/// A progress callback that receives updates during long-running operations.
///
/// The callback receives:
/// - `current`: Work done so far
/// - `total`: Total amount of work
/// - `message`: Description of the current operation
pub struct Progress {
    callback: Box<dyn Fn(usize, usize, &str) + Send + Sync>,
}

impl Progress {
    /// Create a new progress reporter with the given callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(usize, usize, &str) + Send + Sync + 'static,
    {
        Self {
            callback: Box::new(callback),
        }
    }

    /// Report progress.
    #[inline]
    pub fn report(&self, current: usize, total: usize, message: &str) {
        (self.callback)(current, total, message);
    }

    /// Create a no-op progress reporter that discards all updates.
    pub fn none() -> Self {
        Self::new(|_, _, _| {})
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::none()
    }
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_report_forwards_to_callback() {
        let last = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&last);
        let progress = Progress::new(move |current, total, _| {
            seen.store(current * 100 / total, Ordering::Relaxed);
        });

        progress.report(1, 4, "step");
        assert_eq!(last.load(Ordering::Relaxed), 25);

        Progress::none().report(1, 1, "ignored");
    }
}

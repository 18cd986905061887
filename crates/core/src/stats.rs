//! Call statistics
//!
//! Counters maintained by the call protocol for the at-exit report. They are
//! plain integers on the [`Context`](crate::context::Context); the runtime is
//! single-threaded so nothing here is atomic.

/// Counters for one call chain
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallStats {
    /// Closure bodies entered natively (including those driven by a trampoline)
    pub native_calls: u64,
    /// Tail calls scheduled on the trampoline
    pub tail_calls: u64,
    /// Pending calls drained by driver loops
    pub bounces: u64,
    /// Longest run of bounces drained by a single driver loop
    pub longest_chain: u64,
    /// Current native nesting depth of closure bodies
    pub depth: usize,
    /// Deepest native nesting seen so far
    pub peak_depth: usize,
    /// Closure instances built
    pub instances_built: u64,
}

impl CallStats {
    pub fn enter(&mut self) {
        self.native_calls += 1;
        self.depth += 1;
        if self.depth > self.peak_depth {
            self.peak_depth = self.depth;
        }
    }

    pub fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Record that a driver loop finished after `bounces` pending calls
    pub fn drained(&mut self, bounces: u64) {
        self.bounces += bounces;
        self.longest_chain = self.longest_chain.max(bounces);
    }
}

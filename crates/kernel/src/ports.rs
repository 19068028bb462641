// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Exclusive port lease pool.
//!
//! The pool hands out ports from `[start, end)` exactly once until released.
//! All mutation happens under one lock, so concurrently issued leases are
//! unique even when callers interleave at await points.

use parking_lot::Mutex;
use std::collections::BTreeSet;
use thiserror::Error;

/// Errors from port allocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortError {
    /// Distinct from other failures so callers can back off or widen the pool.
    #[error("port pool exhausted ({start}..{end} all allocated)")]
    Exhausted { start: u16, end: u16 },
}

/// Exclusive integer pool over `[start, end)`.
#[derive(Debug)]
pub struct PortAllocator {
    start: u16,
    end: u16,
    allocated: Mutex<BTreeSet<u16>>,
}

impl PortAllocator {
    /// Create a pool over `[start, end)`. An inverted range yields an
    /// immediately exhausted pool.
    pub fn new(start: u16, end: u16) -> Self {
        Self { start, end, allocated: Mutex::new(BTreeSet::new()) }
    }

    /// Lease the lowest free port.
    pub fn allocate(&self) -> Result<u16, PortError> {
        let mut allocated = self.allocated.lock();
        for port in self.start..self.end {
            if allocated.insert(port) {
                return Ok(port);
            }
        }
        Err(PortError::Exhausted { start: self.start, end: self.end })
    }

    /// Return a port to the pool. Idempotent: releasing a port that was never
    /// allocated (or already released) is a no-op.
    pub fn release(&self, port: u16) {
        self.allocated.lock().remove(&port);
    }

    /// Number of currently leased ports.
    pub fn leased(&self) -> usize {
        self.allocated.lock().len()
    }
}

#[cfg(test)]
#[path = "ports_tests.rs"]
mod tests;

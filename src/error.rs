//! The error type of the allocation primitives.
use core::fmt;

/// An allocation request could not be satisfied.
///
/// This is the only error, that the primitives of this crate report. It is
/// never retried internally, since there is no other memory source to fall
/// back to: the caller decides whether to try another free-list node, grow its
/// arena or give up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
    /// The alignment-rounded request does not fit into the available capacity.
    OutOfMemory {
        /// Number of bytes requested.
        requested: usize,
        /// Alignment requested for the payload.
        alignment: usize,
        /// Capacity of the span the request was carved from.
        capacity: usize,
    },
}
impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfMemory {
                requested,
                alignment,
                capacity,
            } => write!(
                f,
                "out of memory: requested {requested} bytes aligned to {alignment}, capacity {capacity} bytes"
            ),
        }
    }
}
impl core::error::Error for AllocError {}

//! Errors reported by fallible [`Deque`](crate::Deque) operations.

use core::alloc::{Layout, LayoutError};

use alloc::alloc::handle_alloc_error;
use thiserror::Error;

/// The error type for fallible deque operations.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A checked accessor was called with an index past the end of the deque.
    #[error("index {index} is out of range for a deque of length {len}")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// The length of the deque at the time of the access.
        len: usize,
    },

    /// The allocator could not satisfy a request for a bucket or for the bucket table.
    #[error("memory allocation of {} bytes failed", .layout.size())]
    AllocationFailure {
        /// The layout that was requested.
        layout: Layout,
    },

    /// The number of buckets required exceeds what can be addressed.
    #[error("capacity overflow")]
    CapacityOverflow,
}

/// A specialized [`Result`](core::result::Result) type for deque operations.
pub type Result<T, E = Error> = core::result::Result<T, E>;

impl Error {
    /// Escalates the error the way the infallible APIs of `alloc` do.
    ///
    /// Allocation failures go through [`handle_alloc_error`]; everything else panics.
    #[cold]
    #[inline(never)]
    pub(crate) fn escalate(self) -> ! {
        match self {
            Error::AllocationFailure { layout } => handle_alloc_error(layout),
            other => panic!("{other}"),
        }
    }
}

impl From<LayoutError> for Error {
    fn from(_: LayoutError) -> Self {
        Error::CapacityOverflow
    }
}

//! Image construction error types

use thiserror::Error;

/// Errors surfaced while building or finalizing a relocatable image.
///
/// None of these are retryable: any failure aborts the in-progress image,
/// and every slot allocated so far is released when the tracker drops.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ReloError {
    /// Slot size arithmetic overflowed, or the image outgrew the 32-bit
    /// offset space the fixup tables are defined in.
    #[error("allocation of {count} x {size} bytes does not fit a 32-bit image")]
    AllocationTooLarge { count: usize, size: usize },

    /// A fixup location does not lie fully within its owning slot.
    #[error("fixup location {offset} out of bounds for a {size}-byte slot")]
    OffsetOutOfBounds { offset: usize, size: usize },

    /// `pop` was called with no matching `push` outstanding.
    #[error("scope pop without a matching push")]
    StackUnderflow,

    /// `finalize` was called while nested scopes were still open.
    #[error("finalize with {depth} unclosed scopes")]
    UnbalancedScopes { depth: usize },
}

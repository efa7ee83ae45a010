//! Allocator Errors

use core::fmt;

/// Errors the allocator can surface to its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
    /// The region cannot satisfy the request.
    Exhausted,
    /// The requested layout has zero size.
    ZeroSized,
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted => write!(f, "heap region exhausted"),
            Self::ZeroSized => write!(f, "zero-sized allocation"),
        }
    }
}

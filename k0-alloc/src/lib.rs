//! # k0-alloc
//!
//! A bump allocator over an externally provided memory region.
//!
//! The kernel's only dynamic-memory customer is `spawn`, which needs a
//! stack (and a process header) per task, never freed before the system
//! halts. A bump pointer over the `.heap` region covers that exactly;
//! there is no free list, no size classes and no `dealloc`.
//!
//! What the crate does guarantee:
//!
//! - every allocation is aligned as requested
//! - exhaustion is a typed error ([`AllocError::Exhausted`]), never a
//!   panic, so `spawn` can surface it to its caller
//!
//! # Usage
//!
//! ```ignore
//! use core::alloc::Layout;
//! use k0_alloc::BumpAllocator;
//!
//! // SAFETY: the linker reserved this region for the heap
//! let mut heap = unsafe { BumpAllocator::new(heap_start, heap_len) };
//! let stack = heap.alloc(Layout::from_size_align(1024, 8).unwrap())?;
//! ```

#![no_std]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod bump;
pub mod error;

pub use bump::BumpAllocator;
pub use error::AllocError;

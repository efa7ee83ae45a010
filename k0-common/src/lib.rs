//! # k0-common
//!
//! Shared constants and small helpers for the k0 kernel crates.
//!
//! This crate pins down the architectural facts the rest of the tree
//! relies on — word size, stack alignment, the minimum usable task
//! stack — plus the alignment arithmetic used by the boot path and the
//! allocator.
//!
//! # no_std
//!
//! This crate is `#![no_std]` and has zero dependencies, making it
//! suitable as a foundation crate that all other k0 crates can depend on.

#![no_std]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod align;

/// Machine word size in bytes (ARMv6-M is a 32-bit architecture).
pub const WORD_SIZE: usize = 4;

/// Stack alignment required by AAPCS at public call boundaries.
pub const STACK_ALIGN: usize = 8;

/// Size in bytes of the register frame `switch_context` pushes onto a
/// task stack: r8-r11 and r4-r7, eight words.
pub const SWITCH_FRAME_SIZE: usize = 8 * WORD_SIZE;

/// Smallest stack a task can be created with.
///
/// One switch frame plus enough headroom for the trampoline to call the
/// entry function and for `exit` to run on the dying task's stack.
pub const MIN_TASK_STACK: usize = 256;

/// Default stack size handed to `spawn` when the caller has no opinion.
pub const DEFAULT_TASK_STACK: usize = 1024;

//! ARMv6-M Architecture Support
//!
//! Everything in the kernel that knows it is running on a Cortex-M0+
//! lives here:
//!
//! - [`cpu`]: PRIMASK control, `wfi`, spin-halt
//! - [`critical`]: scoped interrupt-disable sections
//! - [`sync`]: [`IrqSpinMutex`], a lock that disables interrupts while held
//! - [`context`]: the task context, `switch_context` and the task trampoline
//! - [`vectors`]: default exception stubs for the ARMv6-M vector table
//!
//! # Host builds
//!
//! The crates above this one carry unit tests that run on the build host.
//! For those builds `cpu` emulates PRIMASK with an atomic and
//! `switch_context` records its arguments instead of switching, so the
//! scheduler's queue discipline stays observable without a Cortex-M core.

#![no_std]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod context;
pub mod cpu;
pub mod critical;
pub mod sync;
pub mod vectors;

pub use critical::CriticalSection;
pub use sync::{IrqSpinMutex, IrqSpinMutexGuard};

#[cfg(test)]
pub(crate) mod test_support {
    extern crate std;

    /// Serialises tests that touch the process-global emulated PRIMASK.
    pub(crate) static INTERRUPT_STATE_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
}

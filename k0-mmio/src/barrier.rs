//! Memory Barrier Helpers
//!
//! Barrier support for device drivers, for the cases where an MMIO
//! write's side effect cannot be confirmed by polling a status
//! register.
//!
//! Cortex-M0+ cores issue memory accesses in program order, so most
//! driver sequences need no explicit ordering; where a completion flag
//! exists (a RESET_DONE or SELECTED register), polling it is both the
//! barrier and the proof. [`dsb`] covers the remainder: writes whose
//! effect is invisible to the bus, such as enabling a clock through a
//! mux with no status register, where the write must have completed
//! before the newly clocked peripheral is touched.
//!
//! On non-ARM hosts (unit tests) the barrier degrades to a compiler
//! fence so the crates using it stay compilable.

#[cfg(all(target_arch = "arm", target_os = "none"))]
mod imp {
    /// Data Synchronisation Barrier.
    ///
    /// Completes all outstanding memory accesses before continuing.
    #[inline]
    pub fn dsb() {
        // SAFETY: DSB is always safe to execute
        unsafe {
            core::arch::asm!("dsb", options(nostack, preserves_flags));
        }
    }
}

#[cfg(not(all(target_arch = "arm", target_os = "none")))]
mod imp {
    use core::sync::atomic::{Ordering, fence};

    /// Host stand-in for the ARMv6-M DSB instruction.
    #[inline]
    pub fn dsb() {
        fence(Ordering::SeqCst);
    }
}

pub use imp::dsb;

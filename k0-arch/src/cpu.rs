//! CPU Control
//!
//! Low-level Cortex-M0+ operations: the PRIMASK interrupt mask, wait-for-
//! interrupt and the terminal spin-halt.
//!
//! PRIMASK is a one-bit mask register: bit 0 set means all configurable
//! exceptions are masked. [`disable_interrupts`] returns the previous
//! value so callers can restore rather than unconditionally re-enable,
//! which keeps nested critical sections idempotent.

#[cfg(all(target_arch = "arm", target_os = "none"))]
mod imp {
    use core::arch::asm;

    /// Read the PRIMASK register.
    #[must_use]
    #[inline]
    pub fn read_primask() -> u32 {
        let primask: u32;
        // SAFETY: Reading PRIMASK has no side effects
        unsafe {
            asm!("mrs {}, PRIMASK", out(reg) primask, options(nomem, nostack, preserves_flags));
        }
        primask
    }

    /// Disable all configurable interrupts and return the previous PRIMASK.
    #[must_use]
    #[inline]
    pub fn disable_interrupts() -> u32 {
        let primask = read_primask();
        // SAFETY: Masking interrupts is safe in handler and thread mode
        unsafe {
            asm!("cpsid i", options(nomem, nostack, preserves_flags));
        }
        primask
    }

    /// Restore a PRIMASK value previously returned by [`disable_interrupts`].
    ///
    /// Interrupts are re-enabled only if they were enabled when the mask
    /// was sampled.
    #[inline]
    pub fn restore_interrupts(primask: u32) {
        if primask & 1 == 0 {
            // SAFETY: The caller held interrupts disabled since sampling
            unsafe {
                asm!("cpsie i", options(nomem, nostack, preserves_flags));
            }
        }
    }

    /// Check if interrupts are enabled.
    #[must_use]
    #[inline]
    pub fn interrupts_enabled() -> bool {
        read_primask() & 1 == 0
    }

    /// Wait for interrupt (WFI instruction).
    #[inline]
    pub fn wait_for_interrupt() {
        // SAFETY: WFI is always safe to call
        unsafe {
            asm!("wfi", options(nomem, nostack, preserves_flags));
        }
    }

    /// Halt the CPU (spin loop).
    #[inline]
    pub fn halt() -> ! {
        loop {
            wait_for_interrupt();
        }
    }
}

#[cfg(not(all(target_arch = "arm", target_os = "none")))]
mod imp {
    use core::sync::atomic::{AtomicU32, Ordering};

    /// Emulated PRIMASK for host unit tests.
    static PRIMASK: AtomicU32 = AtomicU32::new(0);

    /// Read the emulated PRIMASK register.
    #[must_use]
    #[inline]
    pub fn read_primask() -> u32 {
        PRIMASK.load(Ordering::SeqCst)
    }

    /// Set the emulated mask bit and return the previous value.
    #[must_use]
    #[inline]
    pub fn disable_interrupts() -> u32 {
        PRIMASK.swap(1, Ordering::SeqCst)
    }

    /// Restore a previously sampled emulated PRIMASK value.
    #[inline]
    pub fn restore_interrupts(primask: u32) {
        if primask & 1 == 0 {
            PRIMASK.store(0, Ordering::SeqCst);
        }
    }

    /// Check if the emulated mask has interrupts enabled.
    #[must_use]
    #[inline]
    pub fn interrupts_enabled() -> bool {
        read_primask() & 1 == 0
    }

    /// No-op on the host.
    #[inline]
    pub fn wait_for_interrupt() {
        core::hint::spin_loop();
    }

    /// Host stand-in for the terminal spin-halt.
    #[inline]
    pub fn halt() -> ! {
        panic!("cpu::halt() reached on the host");
    }
}

pub use imp::{disable_interrupts, halt, interrupts_enabled, read_primask, restore_interrupts, wait_for_interrupt};

//! Critical Sections
//!
//! A scoped interrupt-disable region. [`enter`] samples PRIMASK, masks
//! interrupts and hands back a guard; dropping the guard re-enables
//! interrupts only if they were enabled on entry, so sections nest
//! without clobbering an outer mask.
//!
//! # Example
//!
//! ```ignore
//! let section = critical::enter();
//! // ... touch state shared with interrupt context ...
//! drop(section); // PRIMASK restored to its pre-entry value
//! ```

use core::marker::PhantomData;

use crate::cpu::{disable_interrupts, restore_interrupts};

/// An active critical section.
///
/// Interrupts stay masked for as long as this value is alive. The guard
/// is `!Send`: it must be dropped on the execution context that created
/// it, because the saved mask travels with that context's stack.
///
/// The guard cannot be copied or cloned, so a section cannot be "exited"
/// twice.
#[must_use = "interrupts stay disabled until the guard is dropped"]
pub struct CriticalSection {
    primask: u32,
    // Raw pointers are !Send; the saved mask must not migrate
    _not_send: PhantomData<*const ()>,
}

/// Enter a critical section.
///
/// Samples PRIMASK and masks all configurable interrupts.
pub fn enter() -> CriticalSection {
    let primask = disable_interrupts();
    CriticalSection {
        primask,
        _not_send: PhantomData,
    }
}

impl CriticalSection {
    /// The PRIMASK value sampled on entry.
    #[must_use]
    #[inline]
    pub fn saved_primask(&self) -> u32 {
        self.primask
    }
}

impl Drop for CriticalSection {
    fn drop(&mut self) {
        restore_interrupts(self.primask);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::read_primask;
    use crate::test_support::INTERRUPT_STATE_LOCK;

    #[test]
    fn test_enter_exit_restores_primask() {
        let _lock = INTERRUPT_STATE_LOCK.lock().unwrap_or_else(|e| e.into_inner());

        let before = read_primask();
        let section = enter();
        assert_eq!(read_primask() & 1, 1);
        drop(section);
        assert_eq!(read_primask(), before);
    }

    #[test]
    fn test_nested_sections_are_idempotent() {
        let _lock = INTERRUPT_STATE_LOCK.lock().unwrap_or_else(|e| e.into_inner());

        let before = read_primask();
        let outer = enter();
        let inner = enter();
        // The inner section saw interrupts already masked
        assert_eq!(inner.saved_primask() & 1, 1);
        drop(inner);
        // Still masked: only the outer guard may unmask
        assert_eq!(read_primask() & 1, 1);
        drop(outer);
        assert_eq!(read_primask(), before);
    }
}

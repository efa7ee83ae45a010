//! Interrupt-safe synchronisation primitives
//!
//! Provides [`IrqSpinMutex`] which disables interrupts while held to
//! prevent deadlock when interrupt handlers need to acquire the same
//! lock.
//!
//! The RP2040 boots the kernel on a single Cortex-M0+ core, so the spin
//! component never actually spins today; the lock exists so the scheduler
//! state is already correct when interrupt-driven preemption is added.
//!
//! # Example
//!
//! ```ignore
//! use k0_arch::sync::IrqSpinMutex;
//!
//! static COUNTER: IrqSpinMutex<u64> = IrqSpinMutex::new(0);
//!
//! fn increment() {
//!     let mut guard = COUNTER.lock();
//!     *guard += 1;
//! }   // Interrupts restored here
//! ```

use core::cell::UnsafeCell;
use core::ops::{Deref, DerefMut};
use core::sync::atomic::{AtomicBool, Ordering};

use crate::critical::{self, CriticalSection};

/// A spinlock that disables interrupts while held.
///
/// By entering a critical section before acquiring the lock, a holder
/// can never be preempted on its own core by a handler that would try to
/// take the same lock.
///
/// # Safety Invariants
///
/// - The lock must be released before blocking or yielding
/// - Critical sections should be kept short
pub struct IrqSpinMutex<T> {
    locked: AtomicBool,
    data: UnsafeCell<T>,
}

// SAFETY: IrqSpinMutex provides synchronisation for its data.
// The data is only accessible through the guard which requires holding the lock.
unsafe impl<T: Send> Sync for IrqSpinMutex<T> {}
unsafe impl<T: Send> Send for IrqSpinMutex<T> {}

impl<T> IrqSpinMutex<T> {
    /// Create a new mutex with the given value.
    #[must_use]
    pub const fn new(value: T) -> Self {
        Self {
            locked: AtomicBool::new(false),
            data: UnsafeCell::new(value),
        }
    }

    /// Acquire the lock, disabling interrupts.
    ///
    /// Returns a guard that restores interrupts when dropped.
    ///
    /// ARMv6-M has no compare-and-swap, so acquisition is a plain
    /// load/store pair. That is sound here: with interrupts masked and
    /// core1 never started, nothing can take the lock between the load
    /// and the store. A load observing `true` means the current context
    /// already holds the lock, which is a deadlock under any
    /// interrupt-disabling lock; the loop makes that hang observable at
    /// the acquisition site.
    #[must_use]
    pub fn lock(&self) -> IrqSpinMutexGuard<'_, T> {
        // Mask interrupts BEFORE touching the lock word, so a handler
        // cannot fire between the load and the store.
        let section = critical::enter();

        while self.locked.load(Ordering::Acquire) {
            core::hint::spin_loop();
        }
        self.locked.store(true, Ordering::Relaxed);

        IrqSpinMutexGuard {
            mutex: self,
            _section: section,
        }
    }

    /// Try to acquire the lock without blocking.
    ///
    /// Returns `None` if the lock is already held. Interrupts are only
    /// left disabled if the lock is successfully acquired.
    #[must_use]
    pub fn try_lock(&self) -> Option<IrqSpinMutexGuard<'_, T>> {
        let section = critical::enter();

        if self.locked.load(Ordering::Acquire) {
            // Held elsewhere - the section drop restores interrupts
            return None;
        }
        self.locked.store(true, Ordering::Relaxed);

        Some(IrqSpinMutexGuard {
            mutex: self,
            _section: section,
        })
    }

    /// Check if the lock is currently held.
    ///
    /// This is a racy check intended for debugging only.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Relaxed)
    }

    /// Get a mutable reference to the underlying data.
    ///
    /// `&mut self` guarantees exclusive access without locking.
    pub fn get_mut(&mut self) -> &mut T {
        self.data.get_mut()
    }

    /// Consume the mutex and return the inner value.
    pub fn into_inner(self) -> T {
        self.data.into_inner()
    }
}

impl<T: Default> Default for IrqSpinMutex<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// Guard that provides access to the locked data.
///
/// Interrupts are disabled while this guard exists. When the guard is
/// dropped the lock is released first, then the held [`CriticalSection`]
/// restores the pre-entry PRIMASK. The guard inherits `!Send` from the
/// critical section.
pub struct IrqSpinMutexGuard<'a, T> {
    mutex: &'a IrqSpinMutex<T>,
    _section: CriticalSection,
}

impl<'a, T> Deref for IrqSpinMutexGuard<'a, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: We hold the lock, so we have exclusive access
        unsafe { &*self.mutex.data.get() }
    }
}

impl<'a, T> DerefMut for IrqSpinMutexGuard<'a, T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: We hold the lock, so we have exclusive access
        unsafe { &mut *self.mutex.data.get() }
    }
}

impl<'a, T> Drop for IrqSpinMutexGuard<'a, T> {
    fn drop(&mut self) {
        // Release the lock; all writes must be visible before interrupts
        // can fire again. The _section field drops after this body and
        // restores PRIMASK.
        self.mutex.locked.store(false, Ordering::Release);
        core::sync::atomic::fence(Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::INTERRUPT_STATE_LOCK;

    #[test]
    fn test_lock_provides_access() {
        let _lock = INTERRUPT_STATE_LOCK.lock().unwrap_or_else(|e| e.into_inner());

        let mutex = IrqSpinMutex::new(41u32);
        {
            let mut guard = mutex.lock();
            *guard += 1;
        }
        assert_eq!(*mutex.lock(), 42);
    }

    #[test]
    fn test_try_lock_fails_while_held() {
        let _lock = INTERRUPT_STATE_LOCK.lock().unwrap_or_else(|e| e.into_inner());

        let mutex = IrqSpinMutex::new(());
        let guard = mutex.lock();
        assert!(mutex.try_lock().is_none());
        drop(guard);
        assert!(mutex.try_lock().is_some());
    }

    #[test]
    fn test_is_locked_tracks_guard() {
        let _lock = INTERRUPT_STATE_LOCK.lock().unwrap_or_else(|e| e.into_inner());

        let mutex = IrqSpinMutex::new(0u8);
        assert!(!mutex.is_locked());
        let guard = mutex.lock();
        assert!(mutex.is_locked());
        drop(guard);
        assert!(!mutex.is_locked());
    }
}

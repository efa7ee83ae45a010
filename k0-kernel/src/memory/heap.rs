//! Kernel Heap
//!
//! Glue between the `.heap` region and the bump allocator. The only
//! caller today is `Process::spawn`, which takes one block per task and
//! never frees it; exhaustion surfaces as a typed error at the spawn
//! boundary rather than a panic.

use core::alloc::Layout;
use core::ptr::NonNull;

use k0_alloc::{AllocError, BumpAllocator};
use k0_arch::IrqSpinMutex;

/// Global heap state; `None` until [`init`] runs.
static HEAP: IrqSpinMutex<Option<BumpAllocator>> = IrqSpinMutex::new(None);

/// Initialise the kernel heap over `[start, start + size)`.
///
/// # Panics
///
/// Panics if called more than once.
///
/// # Safety
///
/// The region must be valid, writable RAM that nothing else hands out.
pub unsafe fn init(start: usize, size: usize) {
    let mut heap = HEAP.lock();
    if heap.is_some() {
        panic!("heap::init() called more than once");
    }

    // SAFETY: Region validity is the caller's contract
    *heap = Some(unsafe { BumpAllocator::new(start, size) });
    drop(heap);

    log::info!("heap initialised: {} KB at {:#010x}", size / 1024, start);
}

/// Initialise the kernel heap over the linker-reserved `.heap` region.
///
/// # Safety
///
/// Must be called exactly once, after the RAM image is set up.
#[cfg(all(target_arch = "arm", target_os = "none"))]
pub unsafe fn init_from_layout() {
    use super::layout;

    let start = layout::heap_start();
    let size = layout::heap_end() - start;
    // SAFETY: The linker reserved [heap_start, heap_end) for us
    unsafe { init(start, size) };
}

/// Allocate from the kernel heap.
///
/// # Panics
///
/// Panics if the heap has not been initialised; calling `spawn` before
/// `kmain` set up the heap is a kernel bug, not a recoverable error.
pub fn alloc(layout: Layout) -> Result<NonNull<u8>, AllocError> {
    HEAP.lock()
        .as_mut()
        .expect("heap used before heap::init()")
        .alloc(layout)
}

/// Bytes still available on the heap.
#[must_use]
pub fn remaining() -> usize {
    HEAP.lock().as_ref().map_or(0, BumpAllocator::remaining)
}

//! RAM Image Construction
//!
//! At reset, `.bss` is garbage and `.data` only exists as a load image
//! in flash. These two routines build the RAM image the compiled code
//! assumes. Both run before any static is touched, which is also why
//! they must not use any themselves.
//!
//! The linker aligns both regions to word boundaries, so the loops move
//! whole words.

use super::layout;

/// Zero the `.bss` region.
///
/// # Safety
///
/// Must be called exactly once, from the reset path, before anything
/// reads a zero-initialised static.
pub unsafe fn zero_bss() {
    let mut dst = layout::bss_start() as *mut u32;
    let end = layout::bss_end() as *mut u32;

    while dst < end {
        // SAFETY: [bss_start, bss_end) is word-aligned RAM owned by .bss
        unsafe {
            dst.write_volatile(0);
            dst = dst.add(1);
        }
    }
}

/// Copy the `.data` image from flash into RAM.
///
/// # Safety
///
/// Must be called exactly once, from the reset path, before anything
/// reads an initialised static.
pub unsafe fn copy_data() {
    let mut src = layout::data_source() as *const u32;
    let mut dst = layout::data_start() as *mut u32;
    let end = layout::data_end() as *mut u32;

    while dst < end {
        // SAFETY: The load image in flash mirrors [data_start, data_end)
        unsafe {
            dst.write_volatile(src.read());
            src = src.add(1);
            dst = dst.add(1);
        }
    }
}

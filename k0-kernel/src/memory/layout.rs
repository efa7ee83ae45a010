//! Linker-Symbol Interface
//!
//! `kernel.ld` defines one symbol family describing the RAM image:
//! `__kernel_{data,bss,stack,heap}_{start,end}` plus
//! `__kernel_data_source`, the flash address of `.data`'s load image.
//!
//! The symbols are zero-sized anchors; only their addresses carry
//! meaning. The accessors below take those addresses so the rest of the
//! kernel never spells `&raw` on an extern static.

unsafe extern "C" {
    static __kernel_data_source: u32;
    static __kernel_data_start: u32;
    static __kernel_data_end: u32;
    static __kernel_bss_start: u32;
    static __kernel_bss_end: u32;
    static __kernel_stack_start: u32;
    static __kernel_stack_end: u32;
    static __kernel_heap_start: u32;
    static __kernel_heap_end: u32;
}

/// The address of a linker anchor.
///
/// Wraps the unsafe extern-static access; only the address is taken,
/// the anchor itself is never read.
macro_rules! symbol_addr {
    ($sym:ident) => {{
        // SAFETY: Address-of only; the symbol is defined by kernel.ld
        unsafe { (&raw const $sym) as usize }
    }};
}

/// Flash address of the `.data` load image.
#[must_use]
pub fn data_source() -> usize {
    symbol_addr!(__kernel_data_source)
}

/// First byte of `.data` in RAM.
#[must_use]
pub fn data_start() -> usize {
    symbol_addr!(__kernel_data_start)
}

/// One past the last byte of `.data` in RAM.
#[must_use]
pub fn data_end() -> usize {
    symbol_addr!(__kernel_data_end)
}

/// First byte of `.bss`.
#[must_use]
pub fn bss_start() -> usize {
    symbol_addr!(__kernel_bss_start)
}

/// One past the last byte of `.bss`.
#[must_use]
pub fn bss_end() -> usize {
    symbol_addr!(__kernel_bss_end)
}

/// Bottom of the kernel stack region.
#[must_use]
pub fn stack_start() -> usize {
    symbol_addr!(__kernel_stack_start)
}

/// Top of the kernel stack; the initial SP in vector slot 0.
#[must_use]
pub fn stack_end() -> usize {
    symbol_addr!(__kernel_stack_end)
}

/// First byte of the heap region.
#[must_use]
pub fn heap_start() -> usize {
    symbol_addr!(__kernel_heap_start)
}

/// One past the last byte of the heap region.
#[must_use]
pub fn heap_end() -> usize {
    symbol_addr!(__kernel_heap_end)
}

//! Platform Abstraction Layer
//!
//! Everything the kernel needs from a target SoC, behind one module:
//!
//! - `init()`: clock tree, LED GPIO and UART transmit, ready to use
//! - `led_on()` / `led_off()` / `led_toggle()`
//! - a byte sink the [`console`] drains log output into
//!
//! The platform is bound at compile time by a cargo feature; exactly one
//! implementation is linked and the kernel performs no runtime dispatch
//! over platforms. The kernel itself never touches a memory-mapped
//! register — all MMIO lives below this crate's surface.
//!
//! # Boot ordering
//!
//! `target::init()` runs before `.bss` is zeroed and `.data` is copied,
//! so it must not rely on statics. Anything with state (the console, the
//! logger) is enabled later from `kmain`.

#![no_std]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod console;

#[cfg(feature = "rp2040")]
pub mod rp2040;

#[cfg(feature = "rp2040")]
pub use rp2040 as target;

#[cfg(not(any(feature = "rp2040")))]
compile_error!(
    "no platform selected: enable exactly one platform feature of k0-pal (e.g. `rp2040`)"
);

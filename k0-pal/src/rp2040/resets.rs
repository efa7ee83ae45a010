//! Subsystem Resets
//!
//! Most RP2040 peripherals come out of chip reset held in reset; the
//! RESETS block releases them. Deassertion is asynchronous, so after
//! clearing a reset bit the corresponding RESET_DONE bit must be polled
//! before the peripheral is touched.

use k0_mmio::MmioRegion;

const RESETS_BASE: usize = 0x4000_C000;

/// RESET register: a set bit holds the subsystem in reset.
const RESET: usize = 0x00;
/// RESET_DONE register: a set bit means the subsystem left reset.
const RESET_DONE: usize = 0x08;

/// Reset bit for the user IO mux bank.
pub const IO_BANK0: u32 = 1 << 5;
/// Reset bit for the user pad bank.
pub const PADS_BANK0: u32 = 1 << 8;
/// Reset bit for UART0.
pub const UART0: u32 = 1 << 22;

fn resets() -> MmioRegion {
    // SAFETY: RESETS block per the datasheet, alias windows decoded
    unsafe { MmioRegion::new(RESETS_BASE, 0x0C) }
}

/// Release the given subsystems from reset and wait until they report
/// ready.
pub fn bring_out_of_reset(mask: u32) {
    let resets = resets();
    resets.clear_bits32(RESET, mask);
    while resets.read32(RESET_DONE) & mask != mask {
        core::hint::spin_loop();
    }
}

//! Clock Tree
//!
//! Starts the 12 MHz crystal oscillator and moves the reference and
//! system clocks onto it, then enables the peripheral clock for the
//! UART. The ring-oscillator frequency the chip boots on is neither
//! accurate nor stable enough for a UART bit clock.
//!
//! clk_ref and clk_sys use glitchless muxes: the new source is written
//! to CTRL.SRC and the SELECTED register is polled until the switch
//! completes. clk_peri has a plain aux mux and no SELECTED register, so
//! its enable is followed by a barrier instead of a poll.

use k0_mmio::{MmioRegion, barrier};

const XOSC_BASE: usize = 0x4002_4000;
const CLOCKS_BASE: usize = 0x4000_8000;

/// Crystal frequency on every known RP2040 board.
pub const XOSC_HZ: u32 = 12_000_000;

/// System and peripheral clock frequency; no PLL, straight from the
/// crystal.
pub const SYS_CLK_HZ: u32 = XOSC_HZ;

// XOSC registers
const XOSC_CTRL: usize = 0x00;
const XOSC_STATUS: usize = 0x04;
const XOSC_STARTUP: usize = 0x0C;

/// CTRL.FREQ_RANGE value for the 1-15 MHz crystal range.
const XOSC_CTRL_FREQ_RANGE_1_15MHZ: u32 = 0xAA0;
/// CTRL.ENABLE magic value.
const XOSC_CTRL_ENABLE: u32 = 0xFAB << 12;
/// STATUS.STABLE flag.
const XOSC_STATUS_STABLE: u32 = 1 << 31;
/// Startup delay in units of 256 crystal cycles, about 1 ms at 12 MHz.
const XOSC_STARTUP_DELAY: u32 = (XOSC_HZ / 1000) / 256;

// CLOCKS registers
const CLK_REF_CTRL: usize = 0x30;
const CLK_REF_SELECTED: usize = 0x38;
const CLK_SYS_CTRL: usize = 0x3C;
const CLK_SYS_SELECTED: usize = 0x44;
const CLK_PERI_CTRL: usize = 0x48;

/// CLK_REF_CTRL.SRC value selecting the crystal.
const CLK_REF_SRC_XOSC: u32 = 0x2;
/// CLK_SYS_CTRL.SRC value selecting clk_ref (as opposed to the aux mux).
const CLK_SYS_SRC_CLK_REF: u32 = 0x0;
/// CLK_PERI_CTRL.ENABLE flag; AUXSRC field left at 0 = clk_sys.
const CLK_PERI_ENABLE: u32 = 1 << 11;

fn xosc() -> MmioRegion {
    // SAFETY: XOSC block per the datasheet, alias windows decoded
    unsafe { MmioRegion::new(XOSC_BASE, 0x20) }
}

fn clocks() -> MmioRegion {
    // SAFETY: CLOCKS block per the datasheet, alias windows decoded
    unsafe { MmioRegion::new(CLOCKS_BASE, 0xC8) }
}

/// Start the crystal and re-root the clock tree onto it.
pub fn init() {
    let xosc = xosc();
    let clocks = clocks();

    // Crystal bring-up: range, startup delay, enable, wait for stable
    xosc.write32(XOSC_CTRL, XOSC_CTRL_FREQ_RANGE_1_15MHZ);
    xosc.write32(XOSC_STARTUP, XOSC_STARTUP_DELAY);
    xosc.set_bits32(XOSC_CTRL, XOSC_CTRL_ENABLE);
    xosc.poll_set32(XOSC_STATUS, XOSC_STATUS_STABLE);

    // clk_ref <- xosc, through the glitchless mux
    clocks.write32(CLK_REF_CTRL, CLK_REF_SRC_XOSC);
    clocks.poll_set32(CLK_REF_SELECTED, 1 << CLK_REF_SRC_XOSC);

    // clk_sys <- clk_ref
    clocks.write32(CLK_SYS_CTRL, CLK_SYS_SRC_CLK_REF);
    clocks.poll_set32(CLK_SYS_SELECTED, 1 << CLK_SYS_SRC_CLK_REF);

    // clk_peri <- clk_sys, enabled. Nothing confirms this write: the
    // enable must have completed before the UART it clocks is touched.
    clocks.write32(CLK_PERI_CTRL, CLK_PERI_ENABLE);
    barrier::dsb();
}

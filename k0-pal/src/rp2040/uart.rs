//! UART0 Console Transmit
//!
//! The RP2040's UARTs are ARM PL011 peripherals. Only the transmit side
//! is brought up: the kernel log is write-only. 9600 baud, 8N1, FIFOs
//! enabled, clocked from clk_peri.

use k0_mmio::MmioRegion;
use tock_registers::register_bitfields;

use super::clocks;

const UART0_BASE: usize = 0x4003_4000;

/// Console baud rate.
pub const BAUD: u32 = 9600;

// PL011 register offsets
const UARTDR: usize = 0x000;
const UARTFR: usize = 0x018;
const UARTIBRD: usize = 0x024;
const UARTFBRD: usize = 0x028;
const UARTLCR_H: usize = 0x02C;
const UARTCR: usize = 0x030;

register_bitfields![u32,
    /// Flag register
    FR [
        /// Transmit FIFO full
        TXFF OFFSET(5) NUMBITS(1) [],
        /// UART busy shifting out data
        BUSY OFFSET(3) NUMBITS(1) [],
    ],
    /// Line control register
    LCR_H [
        /// Word length
        WLEN OFFSET(5) NUMBITS(2) [
            Eight = 3
        ],
        /// FIFO enable
        FEN OFFSET(4) NUMBITS(1) [],
        /// Two stop bits select
        STP2 OFFSET(3) NUMBITS(1) [],
        /// Parity enable
        PEN OFFSET(1) NUMBITS(1) [],
    ],
    /// Control register
    CR [
        /// Transmit enable
        TXE OFFSET(8) NUMBITS(1) [],
        /// UART enable
        UARTEN OFFSET(0) NUMBITS(1) [],
    ],
];

fn uart0() -> MmioRegion {
    // SAFETY: UART0 block per the datasheet, alias windows decoded
    unsafe { MmioRegion::new(UART0_BASE, 0x4C) }
}

/// Configure UART0 for transmit.
///
/// Must run after the peripheral clock is up and UART0 is out of reset.
pub fn init() {
    let uart = uart0();

    // Disable while reprogramming
    uart.write32(UARTCR, 0);

    // Baud divisor: clk_peri / (16 * baud), fraction in 1/64ths.
    // At 12 MHz and 9600 baud: 78 + 8/64.
    let divisor_x64 = (clocks::SYS_CLK_HZ * 4) / BAUD;
    uart.write32(UARTIBRD, divisor_x64 >> 6);
    uart.write32(UARTFBRD, divisor_x64 & 0x3F);

    // 8N1, FIFOs on. The LCR_H write also latches the divisor.
    uart.write32(UARTLCR_H, (LCR_H::WLEN::Eight + LCR_H::FEN::SET).value);

    // Transmit only
    uart.write32(UARTCR, (CR::TXE::SET + CR::UARTEN::SET).value);
}

/// Push one byte into the transmit FIFO, waiting for space.
pub fn putc_blocking(c: u8) {
    let uart = uart0();
    uart.poll_clear32(UARTFR, FR::TXFF::SET.value);
    uart.write32(UARTDR, c as u32);
}

/// Wait until the transmitter has fully drained.
///
/// Used by the panic path so the last diagnostic line is on the wire
/// before the core parks itself.
pub fn flush() {
    let uart = uart0();
    uart.poll_clear32(UARTFR, FR::BUSY::SET.value);
}

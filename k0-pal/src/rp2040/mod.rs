//! RP2040 Platform Driver
//!
//! Brings the chip from its post-boot2 state to the configuration the
//! kernel expects: crystal oscillator running, the reference and system
//! clocks sourced from it, the peripheral clock enabled, the on-board
//! LED driveable over SIO and UART0 transmitting on GPIO0.
//!
//! The clock tree deliberately skips the PLLs and runs the whole system
//! at the 12 MHz crystal frequency; a blinking LED and a 9600 baud
//! console do not justify the extra bring-up surface.
//!
//! Register addresses come from the RP2040 datasheet. Each peripheral
//! block is wrapped in an [`MmioRegion`]; the `*_bits32` helpers use the
//! chip's atomic set/clear/xor alias windows, except on SIO which has
//! dedicated set/clear/xor registers instead.

pub mod clocks;
pub mod resets;
pub mod uart;

use k0_mmio::MmioRegion;

/// Single-cycle IO block (GPIO fast path). Not affected by RESETS.
const SIO_BASE: usize = 0xD000_0000;
/// User IO mux bank.
const IO_BANK0_BASE: usize = 0x4001_4000;

/// SIO GPIO output value set/clear/xor and output-enable set registers.
const GPIO_OUT_SET: usize = 0x14;
const GPIO_OUT_CLR: usize = 0x18;
const GPIO_OUT_XOR: usize = 0x1C;
const GPIO_OE_SET: usize = 0x24;

/// The Pico's on-board LED.
const LED_PIN: u32 = 25;

/// GPIO function select values (IO_BANK0 CTRL.FUNCSEL).
const FUNCSEL_UART: u32 = 2;
const FUNCSEL_SIO: u32 = 5;

fn sio() -> MmioRegion {
    // SAFETY: SIO block per the datasheet; dedicated set/clear registers
    // are addressed explicitly, the alias helpers are never used on it
    unsafe { MmioRegion::new(SIO_BASE, 0x180) }
}

fn io_bank0() -> MmioRegion {
    // SAFETY: IO_BANK0 block per the datasheet, alias windows decoded
    unsafe { MmioRegion::new(IO_BANK0_BASE, 0x190) }
}

/// IO_BANK0 CTRL register offset for a GPIO.
const fn gpio_ctrl(pin: u32) -> usize {
    pin as usize * 8 + 4
}

/// Bring up the platform.
///
/// Called from the reset path before the RAM image exists, so this
/// function (and everything it calls) must not touch statics. On return
/// the LED GPIO and the UART are usable.
pub fn init() {
    resets::bring_out_of_reset(resets::IO_BANK0 | resets::PADS_BANK0 | resets::UART0);
    clocks::init();

    // LED: route the pin to SIO, drive it as an output, start dark
    io_bank0().write32(gpio_ctrl(LED_PIN), FUNCSEL_SIO);
    sio().write32(GPIO_OUT_CLR, 1 << LED_PIN);
    sio().write32(GPIO_OE_SET, 1 << LED_PIN);

    // Console TX: GPIO0 carries UART0 TX
    io_bank0().write32(gpio_ctrl(0), FUNCSEL_UART);
    uart::init();
}

/// Drive the LED high.
pub fn led_on() {
    sio().write32(GPIO_OUT_SET, 1 << LED_PIN);
}

/// Drive the LED low.
pub fn led_off() {
    sio().write32(GPIO_OUT_CLR, 1 << LED_PIN);
}

/// Invert the LED.
pub fn led_toggle() {
    sio().write32(GPIO_OUT_XOR, 1 << LED_PIN);
}

/// Transmit one byte over the console UART, blocking on FIFO space.
pub fn uart_putc(c: u8) {
    uart::putc_blocking(c);
}

/// Block until the console UART has drained its FIFO.
pub fn uart_flush() {
    uart::flush();
}

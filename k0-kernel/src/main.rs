//! Kernel Entry
//!
//! The binary glue around the kernel library: the second-stage image and
//! reset vector the linker script anchors into flash, the reset handler
//! that builds the RAM image, `kmain`, the LED demo tasks and the panic
//! handler.
//!
//! # Boot sequence
//!
//! ROM → `.boot2` (XIP setup, CRC-checked) → vector table slot 1 →
//! [`_start`] → [`kmain`] → scheduler. `_start` runs on the kernel stack
//! installed from vector slot 0.
//!
//! On the host this file compiles to an empty stub so the workspace
//! builds and tests without a cross target.

#![cfg_attr(all(target_arch = "arm", target_os = "none"), no_std, no_main)]
#![deny(unsafe_op_in_unsafe_fn)]

#[cfg(all(target_arch = "arm", target_os = "none"))]
mod kernel {
    use core::fmt::Write;
    use core::panic::PanicInfo;

    use k0_kernel::sched::{self, Process, SpawnOpts};
    use k0_kernel::{KernelError, logging, memory};

    /// Second-stage bootloader image, first 256 bytes of flash.
    #[unsafe(link_section = ".boot2")]
    #[unsafe(no_mangle)]
    #[used]
    pub static BOOT2: [u8; 256] = k0_boot::BOOT2_W25Q080;

    /// Vector table slot 1. Slot 0 (the initial SP) is emitted by the
    /// linker script; slots 2..16 come from `k0_arch::vectors`.
    #[unsafe(link_section = ".vectors.reset")]
    #[unsafe(no_mangle)]
    #[used]
    pub static __RESET_VECTOR: unsafe extern "C" fn() -> ! = _start;

    /// Reset handler.
    ///
    /// Runs with interrupts masked off reset. The platform is brought up
    /// first — it touches only MMIO, never statics — then the RAM image
    /// is constructed and the kernel proper takes over.
    ///
    /// # Safety
    ///
    /// Entered by hardware exactly once, through the reset vector.
    #[unsafe(no_mangle)]
    pub unsafe extern "C" fn _start() -> ! {
        k0_pal::target::init();

        // SAFETY: Reset path, before any static is read
        unsafe {
            memory::init::zero_bss();
            memory::init::copy_data();
        }

        match kmain() {
            Ok(()) => log::info!("kmain: all tasks exited; halting"),
            Err(e) => log::error!("kmain failed: {}; halting", e),
        }
        k0_arch::cpu::halt();
    }

    /// Bring up kernel services, spawn the demo tasks, run them.
    fn kmain() -> Result<(), KernelError> {
        logging::init();
        log::info!("k0 {} on rp2040", env!("CARGO_PKG_VERSION"));

        // SAFETY: Called once, after the RAM image is built
        unsafe { memory::heap::init_from_layout() };
        sched::init();

        let on = Process::spawn(
            led_on_task,
            core::ptr::null_mut(),
            SpawnOpts {
                stack_size: 1024,
                name: "led-on",
            },
        )?;
        let off = Process::spawn(
            led_off_task,
            core::ptr::null_mut(),
            SpawnOpts {
                stack_size: 1024,
                name: "led-off",
            },
        )?;
        sched::enqueue(on);
        sched::enqueue(off);

        sched::run();
        Ok(())
    }

    /// Turns the alternation of two tasks into a visible blink.
    const BLINK_TICKS: u32 = 100_000;

    extern "C" fn led_on_task(_args: *mut ()) -> u32 {
        loop {
            k0_pal::target::led_on();
            sched::sleep(BLINK_TICKS);
        }
    }

    extern "C" fn led_off_task(_args: *mut ()) -> u32 {
        loop {
            k0_pal::target::led_off();
            sched::sleep(BLINK_TICKS);
        }
    }

    /// Last words: `panic: {message} ({file}:{line})`, straight to the
    /// UART, bypassing the console lock — the panicking context may hold
    /// it.
    #[panic_handler]
    fn panic(info: &PanicInfo) -> ! {
        let _ = k0_arch::cpu::disable_interrupts();

        let mut out = k0_pal::console::PanicWriter;
        let _ = write!(out, "panic: {}", info.message());
        if let Some(location) = info.location() {
            let _ = write!(out, " ({}:{})", location.file(), location.line());
        }
        let _ = out.write_str("\n");
        k0_pal::target::uart_flush();

        k0_arch::cpu::halt();
    }
}

#[cfg(not(all(target_arch = "arm", target_os = "none")))]
fn main() {
    // The kernel only runs on the freestanding target; this stub keeps
    // host builds (and `cargo test` on the workspace) linking.
    eprintln!("k0-kernel is a freestanding RP2040 image; build for thumbv6m-none-eabi");
}

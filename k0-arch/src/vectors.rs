//! Exception Vector Stubs
//!
//! The ARMv6-M vector table is 16 words at the base of the image: the
//! initial stack pointer, the reset handler, then 14 exception entries.
//! The linker script emits slot 0 (`LONG(__kernel_stack_end)`) and the
//! kernel binary provides the reset vector; this module provides the
//! remaining entries.
//!
//! Every entry defaults to a stub that panics with the exception's name
//! and therefore halts the core with a diagnostic on the console. The
//! ARMv6-M profile routes most faults into HardFault; the MemManage,
//! BusFault, UsageFault and DebugMonitor slots are architecturally
//! reserved on this core but kept populated so a misconfigured vector
//! fetch still lands in a named stub.

/// One vector table entry: a handler address or a reserved zero word.
#[derive(Clone, Copy)]
pub union Vector {
    handler: unsafe extern "C" fn() -> !,
    reserved: u32,
}

// SAFETY: Vector is a plain word written once at link time.
unsafe impl Sync for Vector {}

impl Vector {
    const fn handler(handler: unsafe extern "C" fn() -> !) -> Self {
        Self { handler }
    }

    const fn reserved() -> Self {
        Self { reserved: 0 }
    }
}

/// Diagnose and halt. The panic handler prints over the UART and spins.
fn unhandled_exception(name: &'static str) -> ! {
    panic!("unhandled exception: {}", name);
}

unsafe extern "C" fn nmi() -> ! {
    unhandled_exception("nmi")
}

unsafe extern "C" fn hard_fault() -> ! {
    unhandled_exception("hard_fault")
}

unsafe extern "C" fn mem_manage() -> ! {
    unhandled_exception("mem_manage")
}

unsafe extern "C" fn bus_fault() -> ! {
    unhandled_exception("bus_fault")
}

unsafe extern "C" fn usage_fault() -> ! {
    unhandled_exception("usage_fault")
}

unsafe extern "C" fn svcall() -> ! {
    unhandled_exception("svcall")
}

unsafe extern "C" fn debug_monitor() -> ! {
    unhandled_exception("debug_monitor")
}

unsafe extern "C" fn pendsv() -> ! {
    unhandled_exception("pendsv")
}

unsafe extern "C" fn systick() -> ! {
    unhandled_exception("systick")
}

/// Vector table entries 2..16.
///
/// Placed immediately after the reset vector by the linker script
/// (`KEEP(*(.vectors.exceptions))`), pulled in via `EXTERN(__EXCEPTIONS)`.
#[unsafe(link_section = ".vectors.exceptions")]
#[unsafe(no_mangle)]
#[used]
pub static __EXCEPTIONS: [Vector; 14] = [
    Vector::handler(nmi),           //  2: NMI
    Vector::handler(hard_fault),    //  3: HardFault
    Vector::handler(mem_manage),    //  4: reserved (MemManage on v7-M)
    Vector::handler(bus_fault),     //  5: reserved (BusFault on v7-M)
    Vector::handler(usage_fault),   //  6: reserved (UsageFault on v7-M)
    Vector::reserved(),             //  7
    Vector::reserved(),             //  8
    Vector::reserved(),             //  9
    Vector::reserved(),             // 10
    Vector::handler(svcall),        // 11: SVCall
    Vector::handler(debug_monitor), // 12: reserved (DebugMonitor on v7-M)
    Vector::reserved(),             // 13
    Vector::handler(pendsv),        // 14: PendSV
    Vector::handler(systick),       // 15: SysTick
];

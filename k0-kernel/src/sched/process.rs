//! Processes
//!
//! A [`Process`] is one schedulable task: a name, a saved context, the
//! stack it runs on, its exit code once it has one, and the intrusive
//! links that thread it onto the run-queue. Queue membership costs no
//! allocation; the links live in the `Process` itself, which therefore
//! must not move between creation and exit.
//!
//! A process does not own its stack in the drop-glue sense. The stack is
//! provided from outside (statically, or by [`Process::spawn`] from the
//! heap) and must outlive the process; what the process owns is the
//! exclusive use of that memory for frames until it terminates.

use core::alloc::Layout;
use core::ptr::NonNull;

use k0_alloc::AllocError;
use k0_arch::context::{self, TaskContext, TaskEntry};
use k0_common::align::{align_up, is_aligned};
use k0_common::{DEFAULT_TASK_STACK, MIN_TASK_STACK, STACK_ALIGN};

use crate::memory::heap;

/// Scheduling state of a process.
///
/// ```text
/// Created --enqueue--> Runnable --switch in--> Running --exit--> Terminated
///                         ^                       |
///                         +--------yield----------+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    /// Created, never enqueued.
    Created,
    /// Waiting in the run-queue.
    Runnable,
    /// The current process.
    Running,
    /// Exited; never scheduled again.
    Terminated,
}

/// One schedulable task.
pub struct Process {
    name: &'static str,
    /// Saved machine state while not running.
    pub(super) context: TaskContext,
    stack_base: usize,
    stack_len: usize,
    /// Set exactly once, at termination.
    exit_code: Option<u32>,
    state: ProcessState,
    /// Intrusive run-queue linkage, owned by [`super::run_queue::RunQueue`].
    pub(super) queue_next: Option<NonNull<Process>>,
    pub(super) queue_prev: Option<NonNull<Process>>,
    pub(super) linked: bool,
}

/// Options for [`Process::spawn`].
pub struct SpawnOpts {
    /// Stack size in bytes; rounded up to the stack alignment and to at
    /// least [`MIN_TASK_STACK`].
    pub stack_size: usize,
    /// Human-readable label for diagnostics.
    pub name: &'static str,
}

impl Default for SpawnOpts {
    fn default() -> Self {
        Self {
            stack_size: DEFAULT_TASK_STACK,
            name: "task",
        }
    }
}

impl Process {
    /// Create a process on a caller-provided stack.
    ///
    /// Primes `stack` so that the first switch into the process enters
    /// the trampoline, which calls `entry(args)` and routes its return
    /// value into [`super::exit`].
    ///
    /// # Panics
    ///
    /// Panics if the stack is misaligned for AAPCS or smaller than
    /// [`MIN_TASK_STACK`]. These are construction bugs, not runtime
    /// conditions.
    pub fn create(
        entry: TaskEntry,
        args: *mut (),
        stack: &'static mut [u8],
        name: &'static str,
    ) -> Process {
        let stack_base = stack.as_ptr() as usize;
        let stack_len = stack.len();

        assert!(
            is_aligned(stack_base, STACK_ALIGN) && is_aligned(stack_len, STACK_ALIGN),
            "stack for task '{}' is not {}-byte aligned",
            name,
            STACK_ALIGN
        );
        assert!(
            stack_len >= MIN_TASK_STACK,
            "stack for task '{}' is {} bytes, minimum is {}",
            name,
            stack_len,
            MIN_TASK_STACK
        );

        // SAFETY: The stack is 'static and exclusively ours; alignment
        // and size were just checked
        let context = unsafe { context::prime_stack(stack, entry, args, super::exit) };

        Process {
            name,
            context,
            stack_base,
            stack_len,
            exit_code: None,
            state: ProcessState::Created,
            queue_next: None,
            queue_prev: None,
            linked: false,
        }
    }

    /// Create a process with a heap-allocated stack.
    ///
    /// One heap block carries the `Process` header followed by the
    /// stack, so a spawned task costs a single allocation. Allocation
    /// failure is returned, not raised; the caller decides whether a
    /// missing task is fatal.
    pub fn spawn(
        entry: TaskEntry,
        args: *mut (),
        opts: SpawnOpts,
    ) -> Result<&'static mut Process, AllocError> {
        let header = align_up(core::mem::size_of::<Process>(), STACK_ALIGN);
        let stack_len = align_up(opts.stack_size.max(MIN_TASK_STACK), STACK_ALIGN);

        let layout = match Layout::from_size_align(header + stack_len, STACK_ALIGN) {
            Ok(l) => l,
            Err(_) => return Err(AllocError::Exhausted),
        };
        let block = heap::alloc(layout)?.as_ptr();

        // SAFETY: The block is ours, never freed, and header/stack are
        // disjoint; the stack inherits the block's alignment because the
        // header size is rounded to it
        unsafe {
            let stack = core::slice::from_raw_parts_mut(block.add(header), stack_len);
            let process = Self::create(entry, args, stack, opts.name);

            let slot = block.cast::<Process>();
            slot.write(process);
            Ok(&mut *slot)
        }
    }

    /// The process's label.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The exit code, once the process has terminated.
    #[must_use]
    pub fn exit_code(&self) -> Option<u32> {
        self.exit_code
    }

    /// Current scheduling state.
    #[must_use]
    pub fn state(&self) -> ProcessState {
        self.state
    }

    pub(super) fn set_runnable(&mut self) {
        debug_assert!(self.state != ProcessState::Terminated);
        self.state = ProcessState::Runnable;
    }

    pub(super) fn set_running(&mut self) {
        debug_assert!(self.state == ProcessState::Runnable);
        self.state = ProcessState::Running;
    }

    /// Record termination. The exit code is write-once.
    pub(super) fn record_exit(&mut self, code: u32) {
        debug_assert!(self.exit_code.is_none(), "exit code written twice");
        self.exit_code = Some(code);
        self.state = ProcessState::Terminated;
    }

    /// Check the saved-context invariant: SP inside the stack and
    /// aligned. Holds whenever the process is suspended.
    pub(super) fn assert_context_invariant(&self) {
        debug_assert!(
            self.context.sp >= self.stack_base
                && self.context.sp <= self.stack_base + self.stack_len,
            "task '{}': saved sp {:#010x} outside its stack",
            self.name,
            self.context.sp
        );
        debug_assert!(
            is_aligned(self.context.sp, STACK_ALIGN),
            "task '{}': saved sp {:#010x} misaligned",
            self.name,
            self.context.sp
        );
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use k0_common::SWITCH_FRAME_SIZE;
    use std::boxed::Box;

    #[repr(align(8))]
    struct TestStack([u8; 512]);

    extern "C" fn entry_stub(_args: *mut ()) -> u32 {
        0
    }

    fn leaked_stack() -> &'static mut [u8] {
        &mut Box::leak(Box::new(TestStack([0; 512]))).0
    }

    #[test]
    fn test_create_primes_the_stack() {
        let stack = leaked_stack();
        let base = stack.as_ptr() as usize;
        let len = stack.len();

        let args = 0xDEAD_BEEF as *mut ();
        let process = Process::create(entry_stub, args, stack, "prime");

        assert_eq!(process.name(), "prime");
        assert_eq!(process.state(), ProcessState::Created);
        assert_eq!(process.exit_code(), None);
        assert!(!process.linked);

        // First switch-in pops the synthetic frame at the stack top
        assert_eq!(process.context.sp, base + len - SWITCH_FRAME_SIZE);
        process.assert_context_invariant();

        // entry, args and the exit routine sit in the r4/r5/r6 slots
        let frame = process.context.sp as *const usize;
        // SAFETY: The frame was just primed inside the leaked stack
        unsafe {
            assert_eq!(frame.add(4).read(), entry_stub as usize);
            assert_eq!(frame.add(5).read(), args as usize);
            assert_eq!(frame.add(6).read(), super::super::exit as usize);
        }
    }

    #[test]
    #[should_panic(expected = "not 8-byte aligned")]
    fn test_create_rejects_misaligned_stack() {
        let stack = leaked_stack();
        let skewed = &mut stack[1..9];
        // SAFETY: test-only lifetime laundering of a leaked buffer
        let skewed: &'static mut [u8] = unsafe { &mut *(skewed as *mut [u8]) };
        let _ = Process::create(entry_stub, core::ptr::null_mut(), skewed, "skewed");
    }

    #[test]
    #[should_panic(expected = "minimum is")]
    fn test_create_rejects_undersized_stack() {
        let stack = leaked_stack();
        let short = &mut stack[..MIN_TASK_STACK - STACK_ALIGN];
        // SAFETY: test-only lifetime laundering of a leaked buffer
        let short: &'static mut [u8] = unsafe { &mut *(short as *mut [u8]) };
        let _ = Process::create(entry_stub, core::ptr::null_mut(), short, "short");
    }

    #[test]
    fn test_exit_code_is_recorded_once() {
        let mut process =
            Process::create(entry_stub, core::ptr::null_mut(), leaked_stack(), "exit");
        process.record_exit(42);
        assert_eq!(process.exit_code(), Some(42));
        assert_eq!(process.state(), ProcessState::Terminated);
    }

    #[test]
    fn test_spawn_uses_the_heap_and_surfaces_exhaustion() {
        // The global heap is one-shot; this is the only test that
        // initialises or allocates from it.
        let region = Box::leak(Box::new(TestStack([0; 512]))).0.as_mut_ptr();
        // SAFETY: The leaked region is valid forever and used only here
        unsafe { heap::init(region as usize, 512) };

        // 512 bytes cannot carry a header plus a default stack
        let err = Process::spawn(entry_stub, core::ptr::null_mut(), SpawnOpts::default());
        assert_eq!(err.err(), Some(AllocError::Exhausted));

        // A stack that fits spawns; the header block stays aligned
        let process = Process::spawn(
            entry_stub,
            core::ptr::null_mut(),
            SpawnOpts {
                stack_size: MIN_TASK_STACK,
                name: "spawned",
            },
        )
        .unwrap();
        assert_eq!(process.name(), "spawned");
        assert_eq!(process.state(), ProcessState::Created);
        process.assert_context_invariant();
    }
}

//! Round-Robin Scheduler
//!
//! Cooperative scheduling over a FIFO run-queue. A task runs until it
//! calls [`yield_now`] (back of the queue, head runs next) or [`exit`]
//! (terminated, never scheduled again). There are no priorities, no time
//! slices and no preemption.
//!
//! # The kernel context
//!
//! The kernel itself — the execution that called [`run`] on the boot
//! stack — is the implicit singleton process. `current == None` means
//! the kernel context is running; it becomes current only when [`run`]
//! is entered or when the last task exits and the queue is empty, at
//! which point [`run`] returns to its caller.
//!
//! # Locking
//!
//! Scheduler state is a module-level singleton behind an
//! [`IrqSpinMutex`]. On today's single-core cooperative configuration
//! the lock never contends; it is here so every touch point is already
//! correct when a SysTick/PendSV preemption path starts calling into
//! this module from interrupt context. The lock is *not* held across a
//! switch — hand-off pointers are computed under it, the switch itself
//! runs in a plain critical section whose guard travels with the
//! suspended task.

use core::ptr::NonNull;

use k0_arch::IrqSpinMutex;
use k0_arch::context::{self, TaskContext};
use k0_arch::critical;

pub mod process;
pub mod run_queue;

pub use process::{Process, ProcessState, SpawnOpts};
pub use run_queue::RunQueue;

/// Scheduler singleton state.
struct Sched {
    /// The running task; `None` while the kernel context runs.
    current: Option<NonNull<Process>>,
    /// Runnable tasks in FIFO order.
    queue: RunQueue,
    /// Saved state of the kernel context while tasks run.
    kernel_context: TaskContext,
}

// SAFETY: The NonNull members point at pinned, 'static processes and are
// only touched under the mutex.
unsafe impl Send for Sched {}

static SCHED: IrqSpinMutex<Sched> = IrqSpinMutex::new(Sched {
    current: None,
    queue: RunQueue::new(),
    kernel_context: TaskContext::new(),
});

/// Initialise the scheduler.
///
/// Nothing to do in the current design; the hook exists so the boot path
/// has a fixed place for future scheduler bring-up.
pub fn init() {
    log::debug!("scheduler ready");
}

/// Append a process to the run-queue.
///
/// The reference is handed over for good: from here on the scheduler
/// owns the process through its intrusive links.
pub fn enqueue(process: &'static mut Process) {
    let mut sched = SCHED.lock();
    process.set_runnable();
    // SAFETY: A 'static reference is live and address-stable
    unsafe { sched.queue.push_back(NonNull::from(process)) };
}

/// Run tasks until the queue drains.
///
/// Installs the kernel context as the implicit current process and
/// switches into the head of the queue. Returns when every task has
/// exited (or immediately, with a warning, if the queue was empty).
///
/// # Panics
///
/// Panics if a task is already installed as current — `run` is the
/// kernel context's entry into scheduling and cannot be re-entered from
/// a task.
pub fn run() {
    {
        let sched = SCHED.lock();
        assert!(
            sched.current.is_none(),
            "run() called with a task already current"
        );
    }

    loop {
        let handoff = {
            let mut sched = SCHED.lock();
            let sched = &mut *sched;
            match sched.queue.pop_front() {
                None => None,
                Some(next) => {
                    // SAFETY: Queue members are live and pinned
                    unsafe {
                        next.as_ref().assert_context_invariant();
                        (*next.as_ptr()).set_running();
                    }
                    sched.current = Some(next);
                    // SAFETY: Deriving hand-off pointers to pinned state
                    Some((&raw mut sched.kernel_context, unsafe {
                        &raw const (*next.as_ptr()).context
                    }))
                }
            }
        };

        match handoff {
            Some((prev, next)) => do_switch(prev, next),
            None => {
                log::warn!("no processes");
                return;
            }
        }
    }
}

/// Give up the CPU until every other runnable task has had a turn.
///
/// The caller goes to the back of the queue and the head runs next; with
/// no other runnable task this is a no-op.
///
/// # Panics
///
/// Panics if called from the kernel context (outside [`run`]).
pub fn yield_now() {
    let (prev, next) = {
        let mut sched = SCHED.lock();
        let current = sched.current.expect("yield from the kernel context");

        // SAFETY: The current process is live and pinned
        unsafe {
            (*current.as_ptr()).set_runnable();
            sched.queue.push_back(current);
        }
        let next = sched
            .queue
            .pop_front()
            .expect("run-queue empty after enqueueing current");
        // SAFETY: Queue members are live and pinned
        unsafe {
            next.as_ref().assert_context_invariant();
            (*next.as_ptr()).set_running();
        }
        sched.current = Some(next);

        // SAFETY: Deriving hand-off pointers to pinned state
        unsafe {
            (
                &raw mut (*current.as_ptr()).context,
                &raw const (*next.as_ptr()).context,
            )
        }
    };
    do_switch(prev, next);
}

/// Terminate the current task with `code`.
///
/// Records the exit code (write-once), removes the task from scheduling
/// for good and switches to the next runnable task — or back to the
/// kernel context if the queue is empty, which makes [`run`] return.
///
/// `extern "C"` because the task trampoline tail-calls this with the
/// entry function's return value already in the argument register.
///
/// # Panics
///
/// Panics if called from the kernel context.
pub extern "C" fn exit(code: u32) -> ! {
    let (prev, next) = {
        let mut sched = SCHED.lock();
        let sched = &mut *sched;
        let current = sched.current.take().expect("exit from the kernel context");

        // SAFETY: The exiting process is live and pinned
        unsafe { (*current.as_ptr()).record_exit(code) };

        let next = match sched.queue.pop_front() {
            Some(next) => {
                // SAFETY: Queue members are live and pinned
                unsafe {
                    next.as_ref().assert_context_invariant();
                    (*next.as_ptr()).set_running();
                }
                sched.current = Some(next);
                // SAFETY: Deriving a hand-off pointer to pinned state
                unsafe { &raw const (*next.as_ptr()).context }
            }
            None => &raw const sched.kernel_context,
        };

        // SAFETY: Deriving a hand-off pointer to pinned state
        (unsafe { &raw mut (*current.as_ptr()).context }, next)
    };

    do_switch(prev, next);
    unreachable!("terminated task was scheduled again");
}

/// Give away `ticks` turns.
///
/// TODO: drive this from SysTick once the kernel has a time base; until
/// then a tick is one trip around the run-queue.
pub fn sleep(ticks: u32) {
    for _ in 0..ticks {
        yield_now();
    }
}

/// Switch from `prev` into `next`, or log-and-skip a self-switch.
fn do_switch(prev: *mut TaskContext, next: *const TaskContext) {
    if core::ptr::eq(prev as *const TaskContext, next) {
        log::trace!("context switch to self ignored");
        return;
    }

    // The PRIMASK restore travels with each task: this guard lives on
    // the outgoing task's stack and is dropped when that task is next
    // resumed and falls out of its own switch.
    let section = critical::enter();
    // SAFETY: prev describes this execution, next a validly saved or
    // freshly primed context; both were produced under the scheduler lock
    unsafe { context::switch_context(prev, next) };
    drop(section);
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::boxed::Box;
    use std::sync::Mutex;

    // Scheduler state is process-global; these tests take turns.
    static SCHED_TEST_LOCK: Mutex<()> = Mutex::new(());

    #[repr(align(8))]
    struct TestStack([u8; 512]);

    extern "C" fn entry_stub(_args: *mut ()) -> u32 {
        0
    }

    fn leaked(name: &'static str) -> &'static mut Process {
        let stack = &mut Box::leak(Box::new(TestStack([0; 512]))).0;
        Box::leak(Box::new(Process::create(
            entry_stub,
            core::ptr::null_mut(),
            stack,
            name,
        )))
    }

    fn reset_scheduler() {
        let mut sched = SCHED.lock();
        sched.current = None;
        while sched.queue.pop_front().is_some() {}
        drop(sched);
        context::reset_switch_log();
    }

    fn kernel_context_addr() -> usize {
        let mut sched = SCHED.lock();
        let sched = &mut *sched;
        (&raw const sched.kernel_context) as usize
    }

    #[test]
    fn test_run_hands_off_in_fifo_order_then_drains() {
        let _lock = SCHED_TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        reset_scheduler();

        let a = leaked("a");
        let b = leaked("b");
        let c = leaked("c");
        let ctxs = [
            (&raw const a.context) as usize,
            (&raw const b.context) as usize,
            (&raw const c.context) as usize,
        ];
        enqueue(a);
        enqueue(b);
        enqueue(c);

        run();

        // One hand-off per task, kernel context outgoing, FIFO order
        let kernel_ctx = kernel_context_addr();
        assert_eq!(context::switch_log_len(), 3);
        for (i, &expected_next) in ctxs.iter().enumerate() {
            let (prev, next) = context::switch_log_entry(i).unwrap();
            assert_eq!(prev, kernel_ctx);
            assert_eq!(next, expected_next);
        }
        assert!(SCHED.lock().queue.is_empty());
    }

    #[test]
    fn test_enqueue_marks_runnable_and_links_once() {
        let _lock = SCHED_TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        reset_scheduler();

        let a = leaked("a");
        let a_ptr = NonNull::from(&mut *a);
        enqueue(a);

        let sched = SCHED.lock();
        // SAFETY: The leaked process is live forever
        unsafe {
            assert_eq!(a_ptr.as_ref().state(), ProcessState::Runnable);
        }
        assert!(sched.queue.contains(a_ptr));
        assert_eq!(sched.queue.len(), 1);
    }

    #[test]
    fn test_yield_with_sole_runnable_task_short_circuits() {
        let _lock = SCHED_TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        reset_scheduler();

        enqueue(leaked("solo"));
        run();
        // The recording stub returns straight from the hand-off, leaving
        // the task installed as current - the view from inside the task.
        let before = context::switch_log_len();

        yield_now();

        // Self-switch short-circuits: nothing recorded, task still
        // current, queue empty again
        assert_eq!(context::switch_log_len(), before);
        let sched = SCHED.lock();
        assert!(sched.current.is_some());
        assert!(sched.queue.is_empty());
    }

    #[test]
    #[should_panic(expected = "yield from the kernel context")]
    fn test_yield_from_kernel_context_panics() {
        let _lock = SCHED_TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        reset_scheduler();

        yield_now();
    }

    #[test]
    #[should_panic(expected = "exit from the kernel context")]
    fn test_exit_from_kernel_context_panics() {
        let _lock = SCHED_TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        reset_scheduler();

        exit(1);
    }

    #[test]
    #[should_panic(expected = "already current")]
    fn test_run_with_task_current_panics() {
        let _lock = SCHED_TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        reset_scheduler();

        enqueue(leaked("only"));
        run();
        // The recording stub leaves the task current - exactly the
        // misuse state a re-entered run() must reject.
        run();
    }

    #[test]
    fn test_queue_membership_survives_misuse_panic() {
        let _lock = SCHED_TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        reset_scheduler();

        let a = leaked("a");
        let a_ptr = NonNull::from(&mut *a);
        enqueue(a);

        let result = std::panic::catch_unwind(|| yield_now());
        assert!(result.is_err());

        // The failed yield must not have corrupted the queue
        let sched = SCHED.lock();
        assert!(sched.queue.contains(a_ptr));
        assert_eq!(sched.queue.len(), 1);
    }
}

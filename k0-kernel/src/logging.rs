//! Kernel Logging
//!
//! Wires the `log` crate facade to the platform console.
//!
//! Each record is formatted into a fixed-size stack buffer (no
//! allocation, truncating on overflow) and emitted as one line:
//!
//! ```text
//! INFO kmain: heap initialised: 230 KB
//! ```
//!
//! The console layer converts `\n` to `\r\n` on the wire. Output is
//! best-effort: records logged before [`init`] runs, or on a platform
//! with no UART sink, are dropped.
//!
//! The panic handler does not come through here; it writes to the
//! console hardware directly so a panic inside the logger still reports.

use core::fmt::Write;

use log::{Level, LevelFilter, Log, Metadata, Record};

/// Formatting space per log line; longer messages are truncated.
const LOG_LINE_SIZE: usize = 160;

/// Stack buffer for formatting a record before it hits the console.
struct LineBuffer {
    data: [u8; LOG_LINE_SIZE],
    len: usize,
}

impl LineBuffer {
    const fn new() -> Self {
        Self {
            data: [0u8; LOG_LINE_SIZE],
            len: 0,
        }
    }

    fn as_str(&self) -> &str {
        core::str::from_utf8(&self.data[..self.len]).unwrap_or("<invalid>")
    }
}

impl Write for LineBuffer {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        let bytes = s.as_bytes();
        let remaining = LOG_LINE_SIZE - self.len;
        let to_copy = bytes.len().min(remaining);
        self.data[self.len..self.len + to_copy].copy_from_slice(&bytes[..to_copy]);
        self.len += to_copy;
        Ok(())
    }
}

/// Kernel logger implementation
struct KernelLogger;

impl Log for KernelLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Debug
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let mut line = LineBuffer::new();
            let _ = writeln!(
                line,
                "{} {}: {}",
                record.level(),
                record.target(),
                record.args()
            );
            k0_pal::console::puts(line.as_str());
        }
    }

    fn flush(&self) {}
}

/// Global logger instance
static LOGGER: KernelLogger = KernelLogger;

/// Initialise the logging system.
///
/// Enables the platform console and installs the kernel logger. Must run
/// after the RAM image is set up; records logged earlier are dropped.
pub fn init() {
    k0_pal::console::init();

    log::set_logger(&LOGGER)
        .map(|()| log::set_max_level(LevelFilter::Debug))
        .ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_buffer_formats() {
        let mut line = LineBuffer::new();
        write!(line, "{} {}: {}", Level::Info, "sched", 42).unwrap();
        assert_eq!(line.as_str(), "INFO sched: 42");
    }

    #[test]
    fn test_line_buffer_truncates_instead_of_failing() {
        let mut line = LineBuffer::new();
        for _ in 0..LOG_LINE_SIZE {
            write!(line, "xy").unwrap();
        }
        assert_eq!(line.len, LOG_LINE_SIZE);
        assert!(line.as_str().bytes().all(|b| b == b'x' || b == b'y'));
    }
}

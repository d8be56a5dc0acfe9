//! Forward interrupt-context log entries to the `log` facade.
//!
//! Runs on the main task, where blocking in the logger backend is fine.
//!
//! # Output
//!
//! ```text
//! I (12345) isr: [   1234567] edge accepted
//! ```
//!
//! The bracketed value is the timestamp captured when the ISR pushed the
//! entry, which can be well before the drain.

use crate::logging::{LogEntry, LogStream};

/// Target name used for forwarded entries.
pub const LOG_TARGET: &str = "isr";

/// Format log entry to a line.
///
/// Format: `[timestamp_us] message`
pub fn format_log_entry(entry: &LogEntry, buf: &mut [u8]) -> usize {
    crate::logging::format_to_buffer(
        buf,
        format_args!("[{:10}] {}", entry.timestamp_us, entry.text()),
    )
}

/// Drain every committed entry into `log`, then report drops.
///
/// Returns the number of entries forwarded.
pub fn drain_to_log<const N: usize>(stream: &LogStream<N>) -> usize {
    let mut format_buf = [0u8; 128];
    let mut forwarded = 0;

    while let Some(entry) = stream.drain() {
        let len = format_log_entry(&entry, &mut format_buf);
        let line = core::str::from_utf8(&format_buf[..len]).unwrap_or("<invalid utf8>");
        log::log!(target: LOG_TARGET, log::Level::from(entry.level), "{}", line);
        forwarded += 1;
    }

    let dropped = stream.take_dropped();
    if dropped > 0 {
        log::warn!(target: LOG_TARGET, "dropped {} event log entries", dropped);
    }

    forwarded
}

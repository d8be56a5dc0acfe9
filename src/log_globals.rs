//! Global log stream instance.
//!
//! Written by the button ISR and the re-arm timer callback, drained by the
//! main task.

use crate::logging::LogStream;

/// Event log for interrupt and timer contexts.
pub static EVENT_LOG: LogStream = LogStream::new();

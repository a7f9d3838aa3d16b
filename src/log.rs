use std::fmt;
use std::sync::Mutex;

/// Severity of a message handed to a [`LogSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Debug,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
            Severity::Debug => "debug",
        };
        f.write_str(s)
    }
}

/// Destination for diagnostics produced while resolving.
pub trait LogSink {
    fn log(&self, message: &str, severity: Severity);
}

impl<T: LogSink + ?Sized> LogSink for &T {
    fn log(&self, message: &str, severity: Severity) {
        (**self).log(message, severity)
    }
}

/// Forwards messages to `tracing` under the `geocoder` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Error => {
                tracing::error!(target: "geocoder", channel = "geocoder", "{}", message)
            }
            Severity::Warning => {
                tracing::warn!(target: "geocoder", channel = "geocoder", "{}", message)
            }
            Severity::Info => {
                tracing::info!(target: "geocoder", channel = "geocoder", "{}", message)
            }
            Severity::Debug => {
                tracing::debug!(target: "geocoder", channel = "geocoder", "{}", message)
            }
        }
    }
}

/// A message recorded by [`MemorySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub severity: Severity,
    pub message: String,
}

/// Keeps every message in memory, e.g. to show them to a user afterwards.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded messages, oldest first.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Remove and return the recorded messages.
    pub fn drain(&self) -> Vec<LogEntry> {
        match self.entries.lock() {
            Ok(mut entries) => std::mem::take(&mut *entries),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LogSink for MemorySink {
    fn log(&self, message: &str, severity: Severity) {
        let entry = LogEntry {
            severity,
            message: message.to_string(),
        };
        match self.entries.lock() {
            Ok(mut entries) => entries.push(entry),
            Err(poisoned) => poisoned.into_inner().push(entry),
        }
    }
}

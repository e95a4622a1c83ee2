use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Utc};

/// Maximum number of lines retained; older lines are evicted first.
pub const LOG_CAPACITY: usize = 1500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    #[default]
    Info,
    Warn,
    Error,
    Success,
}

impl LogLevel {
    /// Maps a producer-supplied level name; anything unrecognised is `Info`.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "warn" | "warning" => LogLevel::Warn,
            "error" => LogLevel::Error,
            "success" | "ok" => LogLevel::Success,
            _ => LogLevel::Info,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Success => "SUCCESS",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One timestamped status line. Never mutated once appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    seq: u64,
    pub at: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
}

impl LogEntry {
    pub fn new(at: DateTime<Utc>, level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            seq: 0,
            at,
            level,
            message: message.into(),
        }
    }

    /// Position in the append sequence; strictly increasing, survives `clear`.
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// Append-only, capacity-bounded record of status lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogBuffer {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    next_seq: u64,
    appended_since_clear: u64,
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::with_capacity(LOG_CAPACITY)
    }
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(LOG_CAPACITY)),
            capacity,
            next_seq: 1,
            appended_since_clear: 0,
        }
    }

    pub fn append(&mut self, mut entry: LogEntry) {
        entry.seq = self.next_seq;
        self.next_seq += 1;
        self.appended_since_clear += 1;
        self.entries.push_back(entry);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub fn push(&mut self, at: DateTime<Utc>, level: LogLevel, message: impl Into<String>) {
        self.append(LogEntry::new(at, level, message));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.appended_since_clear = 0;
    }

    /// Retained entries in arrival order.
    pub fn all(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &LogEntry> + ExactSizeIterator {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Lines appended since the last clear, including evicted ones.
    pub fn appended_since_clear(&self) -> u64 {
        self.appended_since_clear
    }
}

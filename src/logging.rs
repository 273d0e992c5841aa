//! Request journal.
//!
//! Every event goes to `tracing`. When a journal file is configured, the same
//! event is also appended to it as one JSON object per line, so a session of
//! translated exchanges can be replayed or grepped later.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub component: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Value>,
}

impl LogEntry {
    pub fn new(level: LogLevel, component: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            component: component.into(),
            message: message.into(),
            context: None,
        }
    }

    pub fn with_context(mut self, ctx: serde_json::Value) -> Self {
        self.context = Some(ctx);
        self
    }

    fn emit(&self) {
        let component = self.component.as_str();
        let message = self.message.as_str();
        match (self.level, &self.context) {
            (LogLevel::Debug, None) => tracing::debug!(component, "{message}"),
            (LogLevel::Debug, Some(ctx)) => tracing::debug!(component, %ctx, "{message}"),
            (LogLevel::Info, None) => tracing::info!(component, "{message}"),
            (LogLevel::Info, Some(ctx)) => tracing::info!(component, %ctx, "{message}"),
            (LogLevel::Warn, None) => tracing::warn!(component, "{message}"),
            (LogLevel::Warn, Some(ctx)) => tracing::warn!(component, %ctx, "{message}"),
            (LogLevel::Error, None) => tracing::error!(component, "{message}"),
            (LogLevel::Error, Some(ctx)) => tracing::error!(component, %ctx, "{message}"),
        }
    }
}

/// Append-only JSONL writer.
struct Journal {
    writer: BufWriter<File>,
}

impl Journal {
    fn open(file_path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = file_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)?;

        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    fn append(&mut self, entry: &LogEntry) {
        if let Ok(json) = serde_json::to_string(entry) {
            let _ = writeln!(self.writer, "{}", json);
            let _ = self.writer.flush();
        }
    }
}

/// Cloneable logging handle shared by the server and the forwarding path.
#[derive(Clone)]
pub struct SharedLogger(Option<Arc<Mutex<Journal>>>);

impl SharedLogger {
    /// Log to `tracing` and append to the JSONL file at `file_path`.
    pub fn new(file_path: impl AsRef<Path>) -> std::io::Result<Self> {
        let journal = Journal::open(file_path.as_ref())?;
        Ok(Self(Some(Arc::new(Mutex::new(journal)))))
    }

    /// Log to `tracing` only.
    pub fn tracing_only() -> Self {
        Self(None)
    }

    pub fn log(&self, entry: LogEntry) {
        entry.emit();
        if let Some(ref journal) = self.0 {
            if let Ok(mut journal) = journal.lock() {
                journal.append(&entry);
            }
        }
    }

    pub fn info(&self, component: impl Into<String>, message: impl Into<String>) {
        self.log(LogEntry::new(LogLevel::Info, component, message));
    }

    pub fn warn(&self, component: impl Into<String>, message: impl Into<String>) {
        self.log(LogEntry::new(LogLevel::Warn, component, message));
    }

    pub fn error(&self, component: impl Into<String>, message: impl Into<String>) {
        self.log(LogEntry::new(LogLevel::Error, component, message));
    }

    pub fn debug(&self, component: impl Into<String>, message: impl Into<String>) {
        self.log(LogEntry::new(LogLevel::Debug, component, message));
    }

    pub fn log_with_context(
        &self,
        level: LogLevel,
        component: impl Into<String>,
        message: impl Into<String>,
        context: serde_json::Value,
    ) {
        self.log(LogEntry::new(level, component, message).with_context(context));
    }
}

//! Diagnostic sink for the panel client and rule loader.
//!
//! Both components report problems through a [`Reporter`] handed to them
//! instead of writing to a process-wide logger directly. The binary wires
//! in [`TracingReporter`]; tests use [`MemoryReporter`] to inspect what
//! was reported.

use std::fmt;
use std::sync::{Mutex, PoisonError};

/// How serious a reported condition is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Debug,
    Info,
    Warn,
    Error,
    /// The node cannot keep running with this configuration.
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Fatal => "fatal",
        };
        f.write_str(label)
    }
}

/// Receives diagnostics. Reporting never alters control flow.
pub trait Reporter: Send + Sync {
    fn report(&self, severity: Severity, message: &str);
}

/// Forwards reports to `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Debug => tracing::debug!("{message}"),
            Severity::Info => tracing::info!("{message}"),
            Severity::Warn => tracing::warn!("{message}"),
            Severity::Error => tracing::error!("{message}"),
            Severity::Fatal => tracing::error!(fatal = true, "{message}"),
        }
    }
}

/// Keeps every report in memory, in arrival order.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    reports: Mutex<Vec<(Severity, String)>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything reported so far.
    pub fn reports(&self) -> Vec<(Severity, String)> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Reports at exactly `severity`.
    pub fn with_severity(&self, severity: Severity) -> Vec<String> {
        self.reports()
            .into_iter()
            .filter(|(s, _)| *s == severity)
            .map(|(_, message)| message)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}

impl Reporter for MemoryReporter {
    fn report(&self, severity: Severity, message: &str) {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((severity, message.to_owned()));
    }
}

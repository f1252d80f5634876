//! Worker → foreground messages.

use crossbeam_channel::Sender;

use super::SessionReport;
use crate::log::LogEntry;

/// Messages a session worker sends back to the foreground
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A log entry to append and display
    Log(LogEntry),
    /// The worker finished all device calls for its phase
    Finished(SessionReport),
}

/// Sending half of the session event channel.
///
/// Send failures are ignored: a dropped receiver means the foreground is
/// gone and nobody is left to show the message.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: Sender<SessionEvent>,
}

impl EventSink {
    pub fn new(tx: Sender<SessionEvent>) -> Self {
        Self { tx }
    }

    pub fn log(&self, entry: LogEntry) {
        let _ = self.tx.send(SessionEvent::Log(entry));
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(LogEntry::info(message));
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.log(LogEntry::warning(message));
    }

    pub fn error(&self, message: impl Into<String>) {
        self.log(LogEntry::error(message));
    }

    pub fn finished(&self, report: SessionReport) {
        let _ = self.tx.send(SessionEvent::Finished(report));
    }
}

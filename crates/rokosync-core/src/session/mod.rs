//! Recording session state machine and its coordinator.
//!
//! ```text
//! Idle --begin()--> Recording --end()--> Stopping --(stop attempts done)--> Idle
//!                       |
//!                       +--(any start attempt failed)--> Idle
//! ```

mod coordinator;
mod events;

pub use coordinator::SessionCoordinator;
pub use events::{EventSink, SessionEvent};

use serde::Serialize;
use std::fmt;

use crate::config::Subsystem;
use crate::device::AttemptOutcome;

/// Current state of the session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// Nothing recording; `begin()` accepted
    #[default]
    Idle,
    /// Both devices asked to record; `end()` accepted
    Recording,
    /// Stop attempts in flight
    Stopping,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Recording => "recording",
            SessionState::Stopping => "stopping",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which half of the session a worker ran
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    Begin,
    End,
}

/// Aggregate outcome of one begin or end, in the order devices were called
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionReport {
    pub phase: SessionPhase,
    pub outcomes: Vec<(Subsystem, AttemptOutcome)>,
}

impl SessionReport {
    pub fn new(phase: SessionPhase) -> Self {
        Self {
            phase,
            outcomes: Vec::with_capacity(2),
        }
    }

    pub fn record(&mut self, subsystem: Subsystem, outcome: AttemptOutcome) {
        self.outcomes.push((subsystem, outcome));
    }

    /// True iff every device reported success
    pub fn success(&self) -> bool {
        !self.outcomes.is_empty() && self.outcomes.iter().all(|(_, o)| o.success)
    }

    pub fn failed(&self) -> Vec<Subsystem> {
        self.outcomes
            .iter()
            .filter(|(_, o)| !o.success)
            .map(|(s, _)| *s)
            .collect()
    }

    pub fn succeeded(&self) -> Vec<Subsystem> {
        self.outcomes
            .iter()
            .filter(|(_, o)| o.success)
            .map(|(s, _)| *s)
            .collect()
    }

    pub fn outcome(&self, subsystem: Subsystem) -> Option<&AttemptOutcome> {
        self.outcomes
            .iter()
            .find(|(s, _)| *s == subsystem)
            .map(|(_, o)| o)
    }

    /// One-line summary for the operator
    pub fn summary(&self) -> String {
        let verb = match self.phase {
            SessionPhase::Begin => "started",
            SessionPhase::End => "stopped",
        };
        if self.success() {
            return format!("Recording {verb} on Rokoko and Audacity.");
        }
        format!(
            "Recording not cleanly {verb}: {} failed.",
            join_names(&self.failed())
        )
    }
}

/// "Rokoko", "Rokoko and Audacity"
pub(crate) fn join_names(subsystems: &[Subsystem]) -> String {
    subsystems
        .iter()
        .map(|s| s.display_name())
        .collect::<Vec<_>>()
        .join(" and ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_success_requires_all_outcomes() {
        let mut report = SessionReport::new(SessionPhase::Begin);
        assert!(!report.success());

        report.record(Subsystem::Mocap, AttemptOutcome::ok("started"));
        assert!(report.success());

        report.record(Subsystem::Workstation, AttemptOutcome::failed("no pipe"));
        assert!(!report.success());
        assert_eq!(report.failed(), vec![Subsystem::Workstation]);
        assert_eq!(report.succeeded(), vec![Subsystem::Mocap]);
        assert_eq!(
            report.outcome(Subsystem::Workstation).unwrap().detail,
            "no pipe"
        );
    }

    #[test]
    fn test_summary_names_failed_subsystems() {
        let mut report = SessionReport::new(SessionPhase::End);
        report.record(Subsystem::Workstation, AttemptOutcome::failed("x"));
        report.record(Subsystem::Mocap, AttemptOutcome::failed("y"));
        assert_eq!(
            report.summary(),
            "Recording not cleanly stopped: Audacity and Rokoko failed."
        );
    }

    #[test]
    fn test_default_state_is_idle() {
        assert_eq!(SessionState::default(), SessionState::Idle);
        assert_eq!(SessionState::Stopping.to_string(), "stopping");
    }
}

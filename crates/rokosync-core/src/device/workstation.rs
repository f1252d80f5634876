//! Audacity control over mod-script-pipe.
//!
//! The accepted command names differ between Audacity releases, so each
//! action has an ordered list of aliases. The first alias the pipe accepts
//! wins; the rest are skipped. Each alias is tried exactly once, with no delay
//! between attempts.

use std::sync::Mutex;
use std::time::Duration;

use super::{AttemptOutcome, RecordingDevice};
use crate::config::Subsystem;
use crate::pipe::ScriptPipe;
use crate::settings::DeviceConfig;

/// Start aliases, in priority order.
///
/// `Record1stChoice` keeps recording on the existing track (Audacity creates
/// one if the project is empty); `Record2ndChoice` always adds a new track.
pub const START_ALIASES: [&str; 4] = [
    "Record1stChoice",
    "Transport: Record",
    "Record2ndChoice",
    "Record",
];

/// Stop aliases, in priority order
pub const STOP_ALIASES: [&str; 2] = ["Transport: Stop", "Stop"];

/// Pause after an accepted start so the transport is running before the
/// outcome is reported
pub const DEFAULT_SETTLE: Duration = Duration::from_millis(100);

/// Result of walking an alias list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasResult {
    Accepted { alias: &'static str, attempts: usize },
    Exhausted { last_error: String, attempts: usize },
}

/// Try each alias in order until one is accepted.
pub fn try_aliases(pipe: &mut dyn ScriptPipe, aliases: &[&'static str]) -> AliasResult {
    let mut last_error = String::from("no aliases to try");
    let mut attempts = 0;

    for &alias in aliases {
        attempts += 1;
        match pipe.send(alias) {
            Ok(_) => {
                crate::verbose!("'{alias}' accepted after {attempts} attempt(s)");
                return AliasResult::Accepted { alias, attempts };
            }
            Err(e) => {
                crate::verbose!("'{alias}' rejected: {e}");
                last_error = e.to_string();
            }
        }
    }

    AliasResult::Exhausted {
        last_error,
        attempts,
    }
}

/// Audacity adapter over any [`ScriptPipe`].
pub struct WorkstationAdapter<P: ScriptPipe> {
    pipe: Mutex<P>,
    settle: Duration,
}

impl<P: ScriptPipe> WorkstationAdapter<P> {
    pub fn new(pipe: P) -> Self {
        Self::with_settle(pipe, DEFAULT_SETTLE)
    }

    pub fn with_settle(pipe: P, settle: Duration) -> Self {
        Self {
            pipe: Mutex::new(pipe),
            settle,
        }
    }

    fn run(&self, aliases: &[&'static str]) -> AliasResult {
        let mut pipe = self
            .pipe
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        try_aliases(&mut *pipe, aliases)
    }
}

impl<P: ScriptPipe> RecordingDevice for WorkstationAdapter<P> {
    fn subsystem(&self) -> Subsystem {
        Subsystem::Workstation
    }

    fn is_available(&self) -> bool {
        self.pipe
            .lock()
            .map(|pipe| pipe.is_present())
            .unwrap_or(false)
    }

    fn start(&self, _config: &DeviceConfig) -> AttemptOutcome {
        match self.run(&START_ALIASES) {
            AliasResult::Accepted { alias, .. } => {
                if !self.settle.is_zero() {
                    std::thread::sleep(self.settle);
                }
                AttemptOutcome::ok(format!("Audacity recording started (using: {alias})."))
            }
            AliasResult::Exhausted { last_error, .. } => AttemptOutcome::failed(format!(
                "Error starting Audacity recording. Last error: {last_error} \
                 (tried: {}). Make sure Audacity is running with mod-script-pipe enabled \
                 and an input device is configured.",
                START_ALIASES.join(", ")
            )),
        }
    }

    fn stop(&self, _config: &DeviceConfig) -> AttemptOutcome {
        match self.run(&STOP_ALIASES) {
            AliasResult::Accepted { alias, .. } => {
                AttemptOutcome::ok(format!("Audacity recording stopped (using: {alias})."))
            }
            AliasResult::Exhausted { last_error, .. } => AttemptOutcome::failed(format!(
                "Could not stop Audacity recording. Error: {last_error}. \
                 You may need to stop recording in Audacity manually."
            )),
        }
    }
}

//! Session coordinator
//!
//! Owns the session state on the foreground thread and runs each begin/end
//! on a short-lived worker thread. Workers never touch the state: they
//! report through the event channel and the foreground applies the result
//! in [`SessionCoordinator::handle`].

use crossbeam_channel::{Receiver, unbounded};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use super::events::{EventSink, SessionEvent};
use super::{SessionPhase, SessionReport, SessionState, join_names};
use crate::config::Subsystem;
use crate::device::{AttemptOutcome, RecordingDevice};
use crate::settings::{DeviceConfig, SettingsStore};

/// Drives the mocap and workstation devices as one recording session.
pub struct SessionCoordinator {
    state: SessionState,
    mocap: Arc<dyn RecordingDevice>,
    workstation: Arc<dyn RecordingDevice>,
    store: Arc<dyn SettingsStore>,
    events: EventSink,
    /// Phase of the worker that has not reported yet
    in_flight: Option<SessionPhase>,
    worker: Option<JoinHandle<()>>,
    /// Settings used by the last begin, for stopping if a reload fails
    last_config: Option<DeviceConfig>,
}

impl SessionCoordinator {
    /// Create a coordinator and the receiving end of its event channel.
    ///
    /// The caller drains the receiver and passes every event to
    /// [`handle`](Self::handle).
    pub fn new(
        mocap: Arc<dyn RecordingDevice>,
        workstation: Arc<dyn RecordingDevice>,
        store: Arc<dyn SettingsStore>,
    ) -> (Self, Receiver<SessionEvent>) {
        let (tx, rx) = unbounded();
        let coordinator = Self {
            state: SessionState::Idle,
            mocap,
            workstation,
            store,
            events: EventSink::new(tx),
            in_flight: None,
            worker: None,
            last_config: None,
        };
        (coordinator, rx)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether a worker is still running device calls
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Sink for foreground code that wants to add to the same log
    pub fn events(&self) -> &EventSink {
        &self.events
    }

    /// Start recording on both devices.
    ///
    /// Returns `false` without touching any device unless the session is
    /// idle. The state becomes `Recording` immediately; the worker's report
    /// decides whether it stays there.
    pub fn begin(&mut self) -> bool {
        if self.state != SessionState::Idle || self.in_flight.is_some() {
            crate::verbose!("begin() ignored in state {}", self.state);
            return false;
        }

        let config = match self.store.load_effective().and_then(|c| c.validate().map(|_| c)) {
            Ok(config) => config,
            Err(e) => {
                self.events.error(format!("Cannot start recording: {e}"));
                return false;
            }
        };
        self.last_config = Some(config.clone());

        let mocap = Arc::clone(&self.mocap);
        let workstation = Arc::clone(&self.workstation);
        let sink = self.events.clone();

        self.state = SessionState::Recording;
        self.spawn(SessionPhase::Begin, move || {
            run_begin(mocap.as_ref(), workstation.as_ref(), &config, &sink);
        })
    }

    /// Stop recording on both devices.
    ///
    /// Returns `false` unless the session is recording and its start has
    /// been confirmed by the worker.
    pub fn end(&mut self) -> bool {
        if self.state != SessionState::Recording {
            crate::verbose!("end() ignored in state {}", self.state);
            return false;
        }
        if self.in_flight.is_some() {
            self.events
                .warning("Recording is still starting; stop again once it has started.");
            return false;
        }

        let config = match self.store.load_effective() {
            Ok(config) => config,
            Err(e) => match self.last_config.clone() {
                Some(previous) => {
                    self.events.warning(format!(
                        "Could not reload settings ({e}); stopping with the settings used to start."
                    ));
                    previous
                }
                None => {
                    self.events.error(format!("Cannot stop recording: {e}"));
                    return false;
                }
            },
        };

        let mocap = Arc::clone(&self.mocap);
        let workstation = Arc::clone(&self.workstation);
        let sink = self.events.clone();

        self.state = SessionState::Stopping;
        self.spawn(SessionPhase::End, move || {
            run_end(mocap.as_ref(), workstation.as_ref(), &config, &sink);
        })
    }

    /// `begin()` when idle, `end()` when recording, nothing otherwise
    pub fn toggle(&mut self) -> bool {
        match self.state {
            SessionState::Idle => self.begin(),
            SessionState::Recording => self.end(),
            SessionState::Stopping => false,
        }
    }

    /// Apply a worker event to the session state.
    ///
    /// Returns `true` when the state changed.
    pub fn handle(&mut self, event: &SessionEvent) -> bool {
        let SessionEvent::Finished(report) = event else {
            return false;
        };

        self.in_flight = None;
        if let Some(worker) = self.worker.take() {
            // The worker sends Finished as its last act
            let _ = worker.join();
        }

        let previous = self.state;
        self.state = match report.phase {
            SessionPhase::Begin if report.success() => SessionState::Recording,
            SessionPhase::Begin | SessionPhase::End => SessionState::Idle,
        };
        crate::verbose!("{:?} finished: {} -> {}", report.phase, previous, self.state);
        previous != self.state
    }

    fn spawn<F>(&mut self, phase: SessionPhase, work: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        let name = match phase {
            SessionPhase::Begin => "rokosync-begin",
            SessionPhase::End => "rokosync-end",
        };

        match thread::Builder::new().name(name.to_string()).spawn(work) {
            Ok(handle) => {
                self.in_flight = Some(phase);
                self.worker = Some(handle);
                true
            }
            Err(e) => {
                self.events
                    .error(format!("Failed to start session worker: {e}"));
                self.state = match phase {
                    SessionPhase::Begin => SessionState::Idle,
                    SessionPhase::End => SessionState::Recording,
                };
                false
            }
        }
    }
}

/// Start mocap, then the workstation, regardless of the first result.
fn run_begin(
    mocap: &dyn RecordingDevice,
    workstation: &dyn RecordingDevice,
    config: &DeviceConfig,
    sink: &EventSink,
) {
    let mut report = SessionReport::new(SessionPhase::Begin);

    for device in [mocap, workstation] {
        let outcome = device.start(config);
        log_attempt(sink, device.subsystem(), SessionPhase::Begin, &outcome);
        report.record(device.subsystem(), outcome);
    }

    let started = report.succeeded();
    if !report.success() && !started.is_empty() {
        sink.warning(format!(
            "{} may still be recording; stop it manually before retrying.",
            join_names(&started)
        ));
    }

    sink.finished(report);
}

/// Stop the workstation first to bound trailing audio, then mocap.
fn run_end(
    mocap: &dyn RecordingDevice,
    workstation: &dyn RecordingDevice,
    config: &DeviceConfig,
    sink: &EventSink,
) {
    let mut report = SessionReport::new(SessionPhase::End);

    for device in [workstation, mocap] {
        let outcome = device.stop(config);
        log_attempt(sink, device.subsystem(), SessionPhase::End, &outcome);
        report.record(device.subsystem(), outcome);
    }

    if !report.success() {
        sink.warning(format!(
            "Session ended, but {} did not confirm the stop.",
            join_names(&report.failed())
        ));
    }

    sink.finished(report);
}

fn log_attempt(sink: &EventSink, subsystem: Subsystem, phase: SessionPhase, outcome: &AttemptOutcome) {
    if outcome.success {
        sink.info(outcome.detail.clone());
        return;
    }

    let action = match phase {
        SessionPhase::Begin => "starting",
        SessionPhase::End => "stopping",
    };
    match (subsystem, phase) {
        // A stuck Audacity transport can still be stopped by hand
        (Subsystem::Workstation, SessionPhase::End) => sink.warning(outcome.detail.clone()),
        (Subsystem::Workstation, SessionPhase::Begin) => sink.error(outcome.detail.clone()),
        (Subsystem::Mocap, _) => sink.error(format!(
            "Error {action} {}: {}",
            subsystem.display_name(),
            outcome.detail
        )),
    }
}

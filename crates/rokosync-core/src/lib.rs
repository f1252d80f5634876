pub mod config;
pub mod device;
pub mod log;
pub mod pipe;
pub mod session;
pub mod settings;
pub mod verbose;

pub use config::Subsystem;
pub use device::{
    AttemptOutcome, MocapAdapter, RecordingDevice, START_ALIASES, STOP_ALIASES,
    UnavailableDevice, WorkstationAdapter,
};
pub use log::{EventLog, LogEntry, LogLevel};
pub use pipe::{FifoScriptPipe, PipeError, ScriptPipe, ScriptPipeLocation};
pub use session::{
    EventSink, SessionCoordinator, SessionEvent, SessionPhase, SessionReport, SessionState,
};
pub use settings::{DeviceConfig, JsonFileStore, MemoryStore, SettingsError, SettingsStore};
pub use verbose::set_verbose;

use std::sync::Arc;

/// Build the workstation device for this system.
///
/// Resolved once at startup: platforms without mod-script-pipe get an
/// [`UnavailableDevice`] with the same interface.
pub fn workstation_device() -> Arc<dyn RecordingDevice> {
    match ScriptPipeLocation::detect() {
        Some(location) => {
            crate::verbose!(
                "Using Audacity pipes {} / {}",
                location.to_server.display(),
                location.from_server.display()
            );
            Arc::new(WorkstationAdapter::new(FifoScriptPipe::new(location)))
        }
        None => Arc::new(UnavailableDevice::new(
            Subsystem::Workstation,
            "Audacity mod-script-pipe is not supported on this platform",
        )),
    }
}

//! Recording devices driven by a session.
//!
//! Both external systems sit behind [`RecordingDevice`]. A device never
//! returns an error to the coordinator: every failure, whether transport,
//! protocol or configuration, is folded into an [`AttemptOutcome`].

pub mod mocap;
pub mod workstation;

pub use mocap::MocapAdapter;
pub use workstation::{START_ALIASES, STOP_ALIASES, WorkstationAdapter};

use serde::Serialize;

use crate::config::Subsystem;
use crate::settings::DeviceConfig;

/// Result of one start or stop call against one device
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttemptOutcome {
    pub success: bool,
    /// Human-readable detail: what succeeded, or why it failed
    pub detail: String,
}

impl AttemptOutcome {
    pub fn ok(detail: impl Into<String>) -> Self {
        Self {
            success: true,
            detail: detail.into(),
        }
    }

    pub fn failed(detail: impl Into<String>) -> Self {
        Self {
            success: false,
            detail: detail.into(),
        }
    }
}

/// A system that can be told to start and stop recording.
pub trait RecordingDevice: Send + Sync {
    /// Which subsystem this device drives
    fn subsystem(&self) -> Subsystem;

    /// Whether the device's transport was found at startup
    fn is_available(&self) -> bool {
        true
    }

    fn start(&self, config: &DeviceConfig) -> AttemptOutcome;

    fn stop(&self, config: &DeviceConfig) -> AttemptOutcome;
}

/// Stand-in for a device whose transport is missing on this system.
///
/// Exposes the same interface as the real adapter but every operation fails
/// with the reason recorded at startup.
#[derive(Debug, Clone)]
pub struct UnavailableDevice {
    subsystem: Subsystem,
    reason: String,
}

impl UnavailableDevice {
    pub fn new(subsystem: Subsystem, reason: impl Into<String>) -> Self {
        Self {
            subsystem,
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl RecordingDevice for UnavailableDevice {
    fn subsystem(&self) -> Subsystem {
        self.subsystem
    }

    fn is_available(&self) -> bool {
        false
    }

    fn start(&self, _config: &DeviceConfig) -> AttemptOutcome {
        AttemptOutcome::failed(self.reason.clone())
    }

    fn stop(&self, _config: &DeviceConfig) -> AttemptOutcome {
        AttemptOutcome::failed(self.reason.clone())
    }
}

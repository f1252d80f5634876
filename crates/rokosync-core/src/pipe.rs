//! Audacity mod-script-pipe transport.
//!
//! Audacity's `mod-script-pipe` module exposes two named pipes: one the
//! client writes commands to, one it reads responses from. A response is a
//! block of lines terminated by an empty line; the last non-empty line is a
//! status line such as `BatchCommand finished: OK`.
//!
//! The pipes only exist while Audacity runs with the module enabled, so their
//! presence is checked on every command rather than once at startup.

use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Status line Audacity prints when a command fails
const FAILED_MARKER: &str = "BatchCommand finished: Failed!";

#[cfg(windows)]
const EOL: &str = "\r\n\0";
#[cfg(not(windows))]
const EOL: &str = "\n";

#[derive(Debug, Error)]
pub enum PipeError {
    #[error(
        "Audacity scripting pipe not found at {0}. \
         Make sure Audacity is running and mod-script-pipe is enabled"
    )]
    NotFound(String),

    #[error("Scripting pipe I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Audacity rejected '{command}': {response}")]
    CommandFailed { command: String, response: String },

    #[error("Scripting pipe closed before a response was received")]
    Closed,
}

/// A command channel to a running audio tool.
///
/// `send` returns the raw response text or the reason the command was not
/// accepted.
pub trait ScriptPipe: Send {
    fn send(&mut self, command: &str) -> Result<String, PipeError>;

    /// Whether the channel's endpoints currently exist
    fn is_present(&self) -> bool {
        true
    }
}

/// Locations of the to/from pipes on this platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptPipeLocation {
    pub to_server: PathBuf,
    pub from_server: PathBuf,
}

impl ScriptPipeLocation {
    /// Resolve the platform's pipe locations.
    ///
    /// Returns `None` on platforms mod-script-pipe does not support; callers
    /// downgrade the workstation to an unavailable device.
    pub fn detect() -> Option<Self> {
        #[cfg(windows)]
        {
            Some(Self {
                to_server: PathBuf::from(r"\\.\pipe\ToSrvPipe"),
                from_server: PathBuf::from(r"\\.\pipe\FromSrvPipe"),
            })
        }

        #[cfg(unix)]
        {
            // SAFETY: getuid has no preconditions and cannot fail
            let uid = unsafe { libc::getuid() };
            Some(Self::in_dir(Path::new("/tmp"), uid))
        }

        #[cfg(not(any(unix, windows)))]
        {
            None
        }
    }

    /// Unix-style pipe names under `dir` for user `uid`
    pub fn in_dir(dir: &Path, uid: u32) -> Self {
        Self {
            to_server: dir.join(format!("audacity_script_pipe.to.{uid}")),
            from_server: dir.join(format!("audacity_script_pipe.from.{uid}")),
        }
    }

    pub fn exists(&self) -> bool {
        self.to_server.exists() && self.from_server.exists()
    }
}

/// Blocking client for the real mod-script-pipe.
///
/// Each command opens the pipes, writes one line and reads until the empty
/// terminator line. There is no timeout: an unresponsive Audacity blocks
/// the caller.
#[derive(Debug, Clone)]
pub struct FifoScriptPipe {
    location: ScriptPipeLocation,
}

impl FifoScriptPipe {
    pub fn new(location: ScriptPipeLocation) -> Self {
        Self { location }
    }

    pub fn location(&self) -> &ScriptPipeLocation {
        &self.location
    }
}

impl ScriptPipe for FifoScriptPipe {
    fn send(&mut self, command: &str) -> Result<String, PipeError> {
        if !self.location.to_server.exists() {
            return Err(PipeError::NotFound(
                self.location.to_server.display().to_string(),
            ));
        }
        if !self.location.from_server.exists() {
            return Err(PipeError::NotFound(
                self.location.from_server.display().to_string(),
            ));
        }

        crate::verbose!("pipe <- {command}");
        {
            let mut to_pipe = OpenOptions::new()
                .write(true)
                .open(&self.location.to_server)?;
            to_pipe.write_all(format!("{command}{EOL}").as_bytes())?;
            to_pipe.flush()?;
        }

        let from_pipe = OpenOptions::new()
            .read(true)
            .open(&self.location.from_server)?;
        let response = read_response(BufReader::new(from_pipe))?;
        crate::verbose!("pipe -> {}", response.trim_end());

        check_response(command, response)
    }

    fn is_present(&self) -> bool {
        self.location.exists()
    }
}

/// Read one response block: lines up to and excluding the empty terminator.
fn read_response(mut reader: impl BufRead) -> Result<String, PipeError> {
    let mut response = String::new();
    loop {
        let mut line = String::new();
        let read = reader.read_line(&mut line)?;
        if read == 0 {
            return if response.is_empty() {
                Err(PipeError::Closed)
            } else {
                Ok(response)
            };
        }
        let trimmed = line.trim_end_matches(['\r', '\n', '\0']);
        if trimmed.is_empty() {
            if response.is_empty() {
                continue;
            }
            return Ok(response);
        }
        response.push_str(trimmed);
        response.push('\n');
    }
}

fn check_response(command: &str, response: String) -> Result<String, PipeError> {
    if response.contains(FAILED_MARKER) {
        return Err(PipeError::CommandFailed {
            command: command.to_string(),
            response: response.trim_end().to_string(),
        });
    }
    Ok(response)
}

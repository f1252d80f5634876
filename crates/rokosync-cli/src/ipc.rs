//! Control socket
//!
//! A running session listens on a local socket so other processes (a
//! hotkey daemon, a Stream Deck button, `rokosync toggle`) can drive it.
//! Requests are single lines; the reply is a single line.

use anyhow::{Context, Result};
use crossbeam_channel::Sender;
use interprocess::local_socket::{
    GenericFilePath, GenericNamespaced, Listener, ListenerOptions, Name, Stream, prelude::*,
};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::thread;

const SOCKET_NAME: &str = "rokosync.sock";

/// Requests the foreground loop acts on, from the keyboard or the socket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlRequest {
    Toggle,
    Quit,
}

impl ControlRequest {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlRequest::Toggle => "toggle",
            ControlRequest::Quit => "quit",
        }
    }

    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_lowercase().as_str() {
            "toggle" => Some(ControlRequest::Toggle),
            "quit" => Some(ControlRequest::Quit),
            _ => None,
        }
    }
}

/// Socket file used where namespaced sockets are unavailable
fn socket_path() -> PathBuf {
    std::env::temp_dir().join(SOCKET_NAME)
}

/// Abstract socket on Linux and Windows, a file in the temp dir elsewhere
fn socket_name() -> io::Result<Name<'static>> {
    if GenericNamespaced::is_supported() {
        SOCKET_NAME.to_ns_name::<GenericNamespaced>()
    } else {
        socket_path().to_fs_name::<GenericFilePath>()
    }
}

fn listen() -> io::Result<Listener> {
    if GenericNamespaced::is_supported() {
        let name = SOCKET_NAME.to_ns_name::<GenericNamespaced>()?;
        ListenerOptions::new().name(name).create_sync()
    } else {
        listen_at_path(&socket_path())
    }
}

/// Bind a file socket at `path`, replacing one left by a session that exited
fn listen_at_path(path: &Path) -> io::Result<Listener> {
    // Remove old socket if exists
    let _ = std::fs::remove_file(path);
    let name = path.to_fs_name::<GenericFilePath>()?;
    ListenerOptions::new().name(name).create_sync()
}

/// Start listening for control requests on a background thread.
///
/// Accepted requests are forwarded to `requests`; the session loop handles
/// them exactly like keypresses.
pub fn start_listener(requests: Sender<ControlRequest>) -> Result<()> {
    let listener =
        listen().context("Failed to create control socket (is another session running?)")?;

    thread::Builder::new()
        .name("rokosync-ipc".into())
        .spawn(move || {
            for conn in listener.incoming() {
                match conn {
                    Ok(stream) => {
                        if let Err(e) = serve(stream, &requests) {
                            rokosync_core::verbose!("Control connection error: {e}");
                        }
                    }
                    Err(e) => rokosync_core::verbose!("Control socket error: {e}"),
                }
            }
        })
        .context("Failed to spawn control socket thread")?;

    Ok(())
}

fn serve(stream: Stream, requests: &Sender<ControlRequest>) -> io::Result<()> {
    let mut reader = BufReader::new(stream);
    let mut line = String::new();
    reader.read_line(&mut line)?;

    let reply = match ControlRequest::parse(&line) {
        Some(request) => {
            rokosync_core::verbose!("Control request: {}", request.as_str());
            match requests.send(request) {
                Ok(()) => "ok",
                Err(_) => "session closed",
            }
        }
        None => "unknown request",
    };

    reader.get_mut().write_all(format!("{reply}\n").as_bytes())
}

/// Send one request to the running session and return its reply
pub fn send_request(request: ControlRequest) -> Result<String> {
    let name = socket_name().context("Invalid control socket name")?;
    let stream = Stream::connect(name)
        .context("Could not connect to a running session. Is `rokosync session` running?")?;

    let mut reader = BufReader::new(stream);
    reader
        .get_mut()
        .write_all(format!("{}\n", request.as_str()).as_bytes())
        .context("Failed to send request")?;

    let mut reply = String::new();
    reader
        .read_line(&mut reply)
        .context("Failed to read reply")?;
    Ok(reply.trim().to_string())
}

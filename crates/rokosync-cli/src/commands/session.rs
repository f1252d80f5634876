//! Interactive recording session
//!
//! The foreground thread owns the coordinator and waits on two channels:
//! session events from device workers, and control requests from the
//! keyboard thread and the control socket.
//!
//! Keys: Enter toggles recording, `q` + Enter quits (stopping first if a
//! recording is running).

use anyhow::Result;
use crossbeam_channel::{Sender, never, select, unbounded};
use rokosync_core::{
    EventLog, MocapAdapter, SessionCoordinator, SessionEvent, SessionState, SettingsStore,
};
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use crate::app;
use crate::ipc::{self, ControlRequest};
use crate::ui;

pub fn run(config_path: Option<PathBuf>, start_now: bool) -> Result<()> {
    let store = app::settings_store(config_path);
    let config = app::load_settings(&store)?.with_env_fallback();

    ui::header("rokosync");
    app::print_settings(&config);
    println!();

    let mocap = Arc::new(MocapAdapter::new()?);
    let workstation = rokosync_core::workstation_device();
    if !workstation.is_available() {
        ui::info("Audacity scripting pipe not found yet. Start Audacity with mod-script-pipe enabled before recording.");
    }

    let store: Arc<dyn SettingsStore> = Arc::new(store);
    let (mut coordinator, events) = SessionCoordinator::new(mocap, workstation, store);

    let (requests_tx, mut requests) = unbounded();
    spawn_keyboard_reader(requests_tx.clone())?;
    if let Err(e) = ipc::start_listener(requests_tx) {
        ui::info(&format!("Control socket disabled: {e:#}"));
    }

    let mut log = EventLog::new();
    let mut quitting = false;

    if start_now {
        coordinator.begin();
    }
    ui::prompt(coordinator.state());

    loop {
        select! {
            recv(events) -> event => {
                let Ok(event) = event else { break };
                coordinator.handle(&event);

                match event {
                    SessionEvent::Log(entry) => {
                        ui::log_entry(&entry);
                        log.push(entry);
                    }
                    SessionEvent::Finished(report) => {
                        ui::report(&report);
                        if quitting {
                            match coordinator.state() {
                                SessionState::Recording => {
                                    coordinator.end();
                                }
                                SessionState::Idle => break,
                                SessionState::Stopping => {}
                            }
                        }
                        ui::prompt(coordinator.state());
                    }
                }
            }
            recv(requests) -> request => {
                match request {
                    Ok(ControlRequest::Toggle) if !quitting => {
                        if !coordinator.toggle() && coordinator.is_busy() {
                            ui::info("Waiting for Rokoko and Audacity to respond...");
                        }
                    }
                    Ok(ControlRequest::Toggle) => {}
                    Ok(ControlRequest::Quit) | Err(_) => {
                        if request.is_err() {
                            // Every sender is gone; stop selecting on it
                            requests = never();
                        }
                        quitting = true;
                        if coordinator.is_busy() {
                            ui::info("Waiting for Rokoko and Audacity before quitting...");
                            continue;
                        }
                        match coordinator.state() {
                            SessionState::Recording => {
                                ui::info("Stopping recording before quitting...");
                                coordinator.end();
                            }
                            _ => break,
                        }
                    }
                }
            }
        }
    }

    let errors = log.count(rokosync_core::LogLevel::Error);
    if errors > 0 {
        ui::info(&format!("Session closed with {errors} error(s)."));
    }
    println!("Recording complete.");
    println!("  - Rokoko: check Rokoko Studio for the mocap clip");
    println!("  - Audacity: audio recorded (save the project manually if needed)");
    Ok(())
}

/// Read lines from stdin: empty line toggles, `q`/`quit` or EOF quits
fn spawn_keyboard_reader(requests: Sender<ControlRequest>) -> Result<()> {
    thread::Builder::new()
        .name("rokosync-keyboard".into())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                let Some(request) = parse_key_line(&line) else {
                    continue;
                };
                if requests.send(request).is_err() || request == ControlRequest::Quit {
                    return;
                }
            }
            let _ = requests.send(ControlRequest::Quit);
        })?;
    Ok(())
}

fn parse_key_line(line: &str) -> Option<ControlRequest> {
    match line.trim().to_lowercase().as_str() {
        "" => Some(ControlRequest::Toggle),
        "q" | "quit" | "exit" => Some(ControlRequest::Quit),
        _ => None,
    }
}

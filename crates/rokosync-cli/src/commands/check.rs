//! `rokosync check`: reachability probe for both systems
//!
//! Nothing is recorded. Rokoko is probed with a TCP connect to the command
//! API port; Audacity by looking for its scripting pipes.

use anyhow::{Context, Result, bail};
use rokosync_core::{DeviceConfig, ScriptPipeLocation};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::path::PathBuf;
use std::time::Duration;

use crate::app;
use crate::ui;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

pub fn run(config_path: Option<PathBuf>) -> Result<()> {
    let store = app::settings_store(config_path);
    let config = app::load_settings(&store)?;

    ui::header("rokosync check");
    let mut problems = 0;

    match probe_studio(&config) {
        Ok(addr) => ui::success(&format!("Rokoko Studio is listening on {addr}")),
        Err(e) => {
            problems += 1;
            ui::error(&format!("Rokoko Studio: {e:#}"));
            println!("    Check that Rokoko Studio is running with the Command API enabled,");
            println!("    and that IP and port match (`rokosync config --show`).");
        }
    }

    match ScriptPipeLocation::detect() {
        Some(location) if location.exists() => ui::success(&format!(
            "Audacity scripting pipe found at {}",
            location.to_server.display()
        )),
        Some(location) => {
            problems += 1;
            ui::error(&format!(
                "Audacity scripting pipe not found at {}",
                location.to_server.display()
            ));
            println!("    1. Open Audacity");
            println!("    2. Preferences > Modules: set mod-script-pipe to Enabled");
            println!("    3. Restart Audacity");
        }
        None => {
            problems += 1;
            ui::error("Audacity mod-script-pipe is not supported on this platform");
        }
    }

    if problems > 0 {
        bail!("{problems} system(s) not reachable");
    }
    Ok(())
}

/// Resolve the configured host and try each address until one accepts
fn probe_studio(config: &DeviceConfig) -> Result<SocketAddr> {
    let target = format!("{}:{}", config.host.trim(), config.port);
    let addrs: Vec<SocketAddr> = target
        .to_socket_addrs()
        .with_context(|| format!("Could not resolve {target}"))?
        .collect();

    let mut last_error = None;
    for addr in addrs {
        rokosync_core::verbose!("Connecting to {addr}");
        match TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT) {
            Ok(_) => return Ok(addr),
            Err(e) => last_error = Some(e),
        }
    }

    match last_error {
        Some(e) => Err(e).with_context(|| format!("Could not connect to {target}")),
        None => bail!("{target} resolved to no addresses"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn test_probe_studio_reaches_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let config = DeviceConfig {
            port,
            ..Default::default()
        };
        let addr = probe_studio(&config).unwrap();
        assert_eq!(addr.port(), port);
    }

    #[test]
    fn test_probe_studio_refused() {
        // Bind then drop to get a port nothing listens on
        let port = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let config = DeviceConfig {
            port,
            ..Default::default()
        };
        let err = probe_studio(&config).unwrap_err();
        assert!(format!("{err:#}").contains("Could not connect"));
    }
}

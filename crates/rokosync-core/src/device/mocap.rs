//! Rokoko Studio command API.
//!
//! Studio's command API takes the API key as a path segment:
//!
//! ```text
//! POST http://{host}:{port}/v1/{api_key}/recording/start  {"filename", "frame_rate"}
//! POST http://{host}:{port}/v1/{api_key}/recording/stop   {"filename", "frame_rate", "back_to_live"}
//! ```
//!
//! Any 2xx response counts as success. Calls are not retried.

use anyhow::{Context, Result};
use serde::Serialize;
use std::time::Duration;

use super::{AttemptOutcome, RecordingDevice};
use crate::config::Subsystem;
use crate::settings::DeviceConfig;

/// Request timeout for start/stop calls
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingAction {
    Start,
    Stop,
}

impl RecordingAction {
    fn path(&self) -> &'static str {
        match self {
            RecordingAction::Start => "start",
            RecordingAction::Stop => "stop",
        }
    }
}

#[derive(Debug, Serialize)]
struct StartRequest<'a> {
    filename: &'a str,
    frame_rate: u32,
}

#[derive(Debug, Serialize)]
struct StopRequest<'a> {
    filename: &'a str,
    frame_rate: u32,
    /// Return Studio to the live view after the take
    back_to_live: bool,
}

/// Build the command URL for `action`
pub fn recording_url(config: &DeviceConfig, action: RecordingAction) -> String {
    format!(
        "{}/v1/{}/recording/{}",
        config.base_url(),
        config.credential.trim(),
        action.path()
    )
}

/// HTTP adapter for Rokoko Studio.
#[derive(Debug, Clone)]
pub struct MocapAdapter {
    client: reqwest::blocking::Client,
}

impl MocapAdapter {
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client })
    }

    fn post(&self, config: &DeviceConfig, action: RecordingAction) -> Result<()> {
        let url = recording_url(config, action);
        crate::verbose!("POST {url}");

        let request = self.client.post(&url);
        let request = match action {
            RecordingAction::Start => request.json(&StartRequest {
                filename: &config.clip_name,
                frame_rate: config.frame_rate,
            }),
            RecordingAction::Stop => request.json(&StopRequest {
                filename: &config.clip_name,
                frame_rate: config.frame_rate,
                back_to_live: true,
            }),
        };

        let response = request.send().context("Failed to reach Rokoko Studio")?;
        let status = response.status();
        crate::verbose!("Rokoko responded {status}");

        if !status.is_success() {
            let body = response
                .text()
                .unwrap_or_else(|_| "Unknown error".to_string());
            let body = body.trim();
            if body.is_empty() {
                anyhow::bail!("API error ({status})");
            }
            anyhow::bail!("API error ({status}): {body}");
        }

        Ok(())
    }
}

impl RecordingDevice for MocapAdapter {
    fn subsystem(&self) -> Subsystem {
        Subsystem::Mocap
    }

    fn start(&self, config: &DeviceConfig) -> AttemptOutcome {
        match self.post(config, RecordingAction::Start) {
            Ok(()) => AttemptOutcome::ok("Rokoko recording started."),
            Err(e) => AttemptOutcome::failed(format!("{e:#}")),
        }
    }

    fn stop(&self, config: &DeviceConfig) -> AttemptOutcome {
        match self.post(config, RecordingAction::Stop) {
            Ok(()) => AttemptOutcome::ok("Rokoko recording stopped."),
            Err(e) => AttemptOutcome::failed(format!("{e:#}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::net::TcpListener;
    use std::thread;

    /// A recorded request: (method, url, body)
    type Captured = (String, String, String);

    /// Serve `responses.len()` requests with the given status codes and bodies
    fn fake_studio(responses: Vec<(u16, &'static str)>) -> (u16, thread::JoinHandle<Vec<Captured>>) {
        let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
        let port = server.server_addr().to_ip().unwrap().port();

        let handle = thread::spawn(move || {
            let mut captured = Vec::new();
            for (status, body) in responses {
                let mut request = server.recv().unwrap();
                let mut content = String::new();
                request.as_reader().read_to_string(&mut content).unwrap();
                captured.push((request.method().to_string(), request.url().to_string(), content));
                request
                    .respond(tiny_http::Response::from_string(body).with_status_code(status))
                    .unwrap();
            }
            captured
        });

        (port, handle)
    }

    fn config_for(port: u16) -> DeviceConfig {
        DeviceConfig {
            host: "127.0.0.1".into(),
            port,
            credential: "abc".into(),
            clip_name: "Take1".into(),
            frame_rate: 30,
        }
    }

    #[test]
    fn test_recording_url() {
        let config = DeviceConfig {
            host: "10.0.0.5".into(),
            port: 14053,
            credential: "1234".into(),
            ..DeviceConfig::default()
        };
        assert_eq!(
            recording_url(&config, RecordingAction::Start),
            "http://10.0.0.5:14053/v1/1234/recording/start"
        );
        assert_eq!(
            recording_url(&config, RecordingAction::Stop),
            "http://10.0.0.5:14053/v1/1234/recording/stop"
        );
    }

    #[test]
    fn test_start_posts_clip_and_frame_rate() {
        let (port, server) = fake_studio(vec![(200, "{}")]);
        let adapter = MocapAdapter::new().unwrap();

        let outcome = adapter.start(&config_for(port));
        assert!(outcome.success, "{}", outcome.detail);

        let captured = server.join().unwrap();
        let (method, url, body) = &captured[0];
        assert_eq!(method, "POST");
        assert_eq!(url, "/v1/abc/recording/start");

        let body: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(body["filename"], "Take1");
        assert_eq!(body["frame_rate"], 30);
        assert!(body.get("back_to_live").is_none());
    }

    #[test]
    fn test_stop_requests_back_to_live() {
        let (port, server) = fake_studio(vec![(204, "")]);
        let adapter = MocapAdapter::new().unwrap();

        let outcome = adapter.stop(&config_for(port));
        assert!(outcome.success, "{}", outcome.detail);

        let captured = server.join().unwrap();
        let (_, url, body) = &captured[0];
        assert_eq!(url, "/v1/abc/recording/stop");
        let body: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(body["back_to_live"], true);
    }

    #[test]
    fn test_non_2xx_is_failure_with_body_as_detail() {
        let (port, server) = fake_studio(vec![(401, "Invalid API key")]);
        let adapter = MocapAdapter::new().unwrap();

        let outcome = adapter.start(&config_for(port));
        server.join().unwrap();

        assert!(!outcome.success);
        assert!(outcome.detail.contains("401"));
        assert!(outcome.detail.contains("Invalid API key"));
    }

    #[test]
    fn test_unreachable_host_is_failure() {
        // Bind then drop to get a port nothing listens on
        let port = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let adapter = MocapAdapter::with_timeout(Duration::from_millis(500)).unwrap();

        let outcome = adapter.start(&config_for(port));
        assert!(!outcome.success);
        assert!(outcome.detail.contains("Failed to reach Rokoko Studio"));
    }
}

use anyhow::{Result, bail};

use crate::ipc::{self, ControlRequest};
use crate::ui;

pub fn run() -> Result<()> {
    let reply = ipc::send_request(ControlRequest::Toggle)?;
    if reply != "ok" {
        bail!("Session refused the request: {reply}");
    }
    ui::success("Toggle sent to the running session");
    Ok(())
}

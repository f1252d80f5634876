use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "rokosync",
    version,
    about = "Start and stop Rokoko mocap and Audacity recording together",
    long_about = "Start and stop Rokoko mocap and Audacity recording together.\n\n\
        Run without a subcommand to open a session: press Enter to start both \
        recordings, Enter again to stop them."
)]
pub struct Cli {
    /// Print diagnostics (HTTP requests, pipe traffic) to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Settings file to use instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run an interactive recording session (default)
    Session {
        /// Start recording as soon as the session opens
        #[arg(long)]
        start: bool,
    },

    /// Show or change device settings
    Config(ConfigArgs),

    /// Walk through all settings interactively
    Setup,

    /// Start or stop recording in a running session
    Toggle,

    /// Check that Rokoko Studio and Audacity can be reached
    Check,
}

#[derive(Args, Debug, Default)]
pub struct ConfigArgs {
    /// Host or IP address running Rokoko Studio
    #[arg(long, value_name = "HOST")]
    pub ip: Option<String>,

    /// Rokoko command API port
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    pub port: Option<u16>,

    /// Rokoko command API key
    #[arg(long, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Clip name for new takes
    #[arg(long, value_name = "NAME")]
    pub clip_name: Option<String>,

    /// Take frame rate
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub frame_rate: Option<u32>,

    /// Print the current settings
    #[arg(long)]
    pub show: bool,
}

impl ConfigArgs {
    /// Whether any setting was given on the command line
    pub fn has_changes(&self) -> bool {
        self.ip.is_some()
            || self.port.is_some()
            || self.api_key.is_some()
            || self.clip_name.is_some()
            || self.frame_rate.is_some()
    }
}

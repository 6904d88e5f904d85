//! # InkCalc CLI
//!
//! Headless host for the InkCalc engine. Replays a JSON script of user
//! interactions, sends the canvas to the recognition service on `run`, and
//! writes the final canvas to a PNG.
//!
//! ## Usage
//!
//! ```bash
//! inkcalc --script session.json --output canvas.png
//! inkcalc --api-url http://localhost:8900 --script session.json
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `CliConfig` - Canvas size, recognition endpoint and I/O paths
//! - `InkCalcApp` - Drives the session and forwards its events to the
//!   renderer and the mounted typesetter

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

mod app;
mod collab;
pub mod script;

pub use app::{InkCalcApp, OverlaySummary, Summary};
pub use collab::{LogTypesetter, ViewportListener};
pub use script::{load_script, parse_script, Action};

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use inkcalc_client::RecognitionConfig;

/// Command-line arguments for inkcalc.
#[derive(Debug, Clone, Parser)]
#[command(name = "inkcalc")]
#[command(about = "Handwritten math canvas with recognition overlays")]
#[command(version)]
pub struct CliArgs {
    /// Recognition API base URL (requests go to `<url>/calculate`)
    #[arg(long, env = "INKCALC_API_URL", default_value = "http://localhost:8900")]
    pub api_url: String,

    /// Canvas width in pixels
    #[arg(long, default_value = "1280")]
    pub width: u32,

    /// Canvas height in pixels
    #[arg(long, default_value = "720")]
    pub height: u32,

    /// JSON input script to replay
    #[arg(long)]
    pub script: Option<PathBuf>,

    /// Write the final canvas to this PNG file
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// HTTP timeout in seconds for recognition requests (0 disables)
    #[arg(long, env = "INKCALC_TIMEOUT_SECS", default_value = "30")]
    pub timeout_secs: u64,

    /// Background composited under strokes in snapshots (e.g. "#000000")
    #[arg(long)]
    pub background: Option<String>,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Recognition service settings.
    pub recognition: RecognitionConfig,
    /// Script to replay.
    pub script: Option<PathBuf>,
    /// PNG export path.
    pub output: Option<PathBuf>,
    /// Snapshot background color string.
    pub background: Option<String>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl CliConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            width: 1280,
            height: 720,
            recognition: RecognitionConfig::default(),
            script: None,
            output: None,
            background: None,
        }
    }
}

impl From<CliArgs> for CliConfig {
    fn from(args: CliArgs) -> Self {
        Self {
            width: args.width,
            height: args.height,
            recognition: RecognitionConfig {
                api_url: args.api_url,
                timeout: (args.timeout_secs > 0).then_some(Duration::from_secs(args.timeout_secs)),
            },
            script: args.script,
            output: args.output,
            background: args.background,
        }
    }
}

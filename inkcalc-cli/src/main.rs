//! # InkCalc
//!
//! Replays an input script against the drawing engine and prints the final
//! overlays and bindings as JSON.

use clap::Parser;
use inkcalc_cli::{load_script, CliArgs, CliConfig, InkCalcApp};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing with an env filter; JSON output when
/// `RUST_LOG_FORMAT=json`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,inkcalc_core=debug,inkcalc_client=debug"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = CliArgs::parse();
    let config = CliConfig::from(args);

    tracing::info!(
        "Canvas {}x{}, recognition at {}",
        config.width,
        config.height,
        config.recognition.api_url
    );

    let mut app = InkCalcApp::new(&config)?;

    if let Some(ref path) = config.script {
        let actions = load_script(path)?;
        app.run_script(&actions).await?;
    } else {
        tracing::warn!("No --script given; nothing to replay");
    }

    if let Some(ref path) = config.output {
        app.export_png(path)?;
    }

    println!("{}", serde_json::to_string_pretty(&app.summary())?);
    Ok(())
}

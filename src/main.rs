#![forbid(unsafe_code)]

mod cli;
mod config;
mod monitor;
mod template;

use anyhow::Result;
use clap::Parser;
use tracing::{Level as TraceLevel, error, info};
use tracing_subscriber::FmtSubscriber;

use cli::Cli;
use config::Config;
use monitor::{DetectedMonitors, RawDisplays};
use template::Renderer;

fn main() {
    // Parse log level from environment variable
    let log_level = match std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "warn" => TraceLevel::WARN,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("i3gen: failed to initialize logging: {e}");
        std::process::exit(1);
    }

    if let Err(e) = run(Cli::parse()) {
        error!("generation failed: {e:#}");
        eprintln!("i3gen: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config_path().as_deref())?;

    let monitors = detect_monitors(&config)?;
    info!("monitors: {monitors}");

    let output_path = cli.output_path();
    info!("rendering layout '{}' to {}", cli.layout, output_path.display());
    let renderer = Renderer::new(cli.template_dir.clone());
    renderer.render_to_file(&config, &cli.layout, &monitors, &output_path)?;

    info!(
        "i3 configuration generated: layout={}, output={}, monitors={}",
        cli.layout,
        output_path.display(),
        monitors.all.len()
    );
    Ok(())
}

/// One-shot monitor resolution. With detection disabled, the raw list
/// stays empty and the configured dummy monitors become the static
/// monitor set through the same padding path.
fn detect_monitors(config: &Config) -> Result<DetectedMonitors> {
    let detection = &config.monitor_detection;
    let raw = if config.use_detected_monitors {
        info!("detecting monitors ({:?} method)", detection.method);
        detection.detector().enumerate()?
    } else {
        info!("using static monitor configuration");
        RawDisplays::default()
    };
    Ok(monitor::resolve(
        raw,
        &detection.dummy_monitors,
        detection.min_monitors,
    ))
}

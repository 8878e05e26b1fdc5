use anyhow::Result;
use critmon_alert::engine::AggregationEngine;
use critmon_notify::plugin::ChannelRegistry;
use critmon_server::config::AppConfig;
use critmon_server::feed::JsonLinesFeed;
use critmon_server::monitor::run_monitor;
use critmon_server::notifier::build_notification_manager;
use tokio::signal;
use tracing_subscriber::EnvFilter;

#[allow(clippy::print_stderr)]
fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  critmon-server [config.toml]                 Start the monitor");
    eprintln!("  critmon-server check-config <config.toml>    Validate config and channels, then exit");
}

#[tokio::main]
async fn main() -> Result<()> {
    critmon_common::id::init(1, 1);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("critmon=info".parse()?))
        .init();

    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        Some("check-config") => {
            let config_path = args.get(2).ok_or_else(|| {
                print_usage();
                anyhow::anyhow!("check-config requires <config.toml> argument")
            })?;
            run_check_config(config_path)
        }
        Some("--help" | "-h") => {
            print_usage();
            Ok(())
        }
        _ => {
            let config_path = args
                .get(1)
                .map(|s| s.as_str())
                .unwrap_or("config/critmon.toml");
            run_server(config_path).await
        }
    }
}

/// Loads the config, instantiates every channel, and prints the resolved
/// settings with secrets redacted.
#[allow(clippy::print_stdout)]
fn run_check_config(config_path: &str) -> Result<()> {
    let config = AppConfig::load(config_path)?;
    let registry = ChannelRegistry::default();
    build_notification_manager(&registry, &config.channels)?;

    let mut printable = config.clone();
    for ch in &mut printable.channels {
        if let Some(plugin) = registry.get_plugin(&ch.channel_type) {
            ch.config = plugin.redact_config(&ch.config);
        }
    }
    println!("{}", toml::to_string_pretty(&printable)?);
    tracing::info!(channels = config.channels.len(), "Config OK");
    Ok(())
}

async fn run_server(config_path: &str) -> Result<()> {
    let config = AppConfig::load(config_path)?;

    tracing::info!(
        feed = %config.feed.path,
        backlog = config.feed.backlog,
        period_secs = config.monitor.period_secs,
        alert_threshold = config.monitor.alert_threshold,
        "critmon-server starting"
    );

    let registry = ChannelRegistry::default();
    let notifier = build_notification_manager(&registry, &config.channels)?;
    let mut feed = JsonLinesFeed::open(&config.feed.path, config.feed.backlog).await?;
    let mut engine = AggregationEngine::new(&config.monitor);

    tokio::select! {
        result = run_monitor(&mut feed, &mut engine, &notifier, &config.monitor) => {
            tracing::error!("Monitor loop stopped");
            result
        }
        _ = signal::ctrl_c() => {
            tracing::info!("Shutting down gracefully");
            Ok(())
        }
    }
}

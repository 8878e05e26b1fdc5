use crate::config::ChannelConfig;
use critmon_notify::manager::NotificationManager;
use critmon_notify::plugin::ChannelRegistry;
use critmon_notify::routing::ChannelRoute;
use critmon_notify::NotificationChannel;

/// Instantiates every enabled channel and its route.
///
/// With no channels configured the manager gets one log channel that
/// takes every report kind.
pub fn build_notification_manager(
    registry: &ChannelRegistry,
    configs: &[ChannelConfig],
) -> anyhow::Result<NotificationManager> {
    let mut channels: Vec<Box<dyn NotificationChannel>> = Vec::new();
    let mut routes = Vec::new();

    for cfg in configs.iter().filter(|c| c.enabled) {
        let channel = registry
            .create_channel(&cfg.channel_type, &cfg.name, &cfg.config, &cfg.recipients)
            .map_err(|e| anyhow::anyhow!("Channel '{}': {e}", cfg.name))?;
        tracing::info!(
            name = %cfg.name,
            channel_type = %cfg.channel_type,
            recipients = cfg.recipients.len(),
            kinds = ?cfg.kinds,
            "Notification channel ready"
        );
        routes.push(ChannelRoute {
            kinds: cfg.kinds.clone(),
            channel_index: channels.len(),
        });
        channels.push(channel);
    }

    if channels.is_empty() {
        tracing::info!("No notification channels enabled, reporting to log");
        let channel = registry.create_channel("log", "log", &serde_json::Value::Null, &[])?;
        channels.push(channel);
        routes.push(ChannelRoute::all(0));
    }

    Ok(NotificationManager::new(channels, routes))
}

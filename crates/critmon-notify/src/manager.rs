use crate::routing::ChannelRoute;
use crate::NotificationChannel;
use critmon_common::report::Report;

pub struct NotificationManager {
    channels: Vec<Box<dyn NotificationChannel>>,
    routes: Vec<ChannelRoute>,
}

impl NotificationManager {
    pub fn new(channels: Vec<Box<dyn NotificationChannel>>, routes: Vec<ChannelRoute>) -> Self {
        Self { channels, routes }
    }

    /// Delivers the report to every channel whose route accepts its kind.
    ///
    /// Failures are logged and otherwise ignored; the caller never waits on
    /// a retry decision.
    pub async fn notify(&self, report: &Report) {
        let mut delivered = 0usize;

        for route in &self.routes {
            if !route.should_send(report.kind) {
                continue;
            }

            let Some(channel) = self.channels.get(route.channel_index) else {
                tracing::warn!(index = route.channel_index, "Route points at missing channel");
                continue;
            };

            match channel.send(report).await {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::error!(
                        channel = channel.channel_type(),
                        instance = channel.instance_id(),
                        report_id = %report.id,
                        error = %e,
                        "Failed to send notification"
                    );
                }
            }
        }

        tracing::debug!(
            report_id = %report.id,
            kind = %report.kind,
            delivered,
            "Report dispatched"
        );
    }

    pub fn channels(&self) -> &[Box<dyn NotificationChannel>] {
        &self.channels
    }
}

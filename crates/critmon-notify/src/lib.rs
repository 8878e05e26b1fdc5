//! Report delivery with pluggable channels.
//!
//! Reports are routed by [`ReportKind`](critmon_common::report::ReportKind)
//! to one or more [`NotificationChannel`] implementations. Built-in
//! channels are email (SMTP), webhook, and log.

pub mod channels;
pub mod error;
pub mod manager;
pub mod plugin;
pub mod report_template;
pub mod routing;
pub mod utils;

#[cfg(test)]
mod tests;

use async_trait::async_trait;
use critmon_common::report::Report;

/// A delivery channel that hands a report to an external service.
///
/// Instances are created by the matching [`plugin::ChannelPlugin`] and
/// registered with the [`manager::NotificationManager`].
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Delivers the report through this channel.
    ///
    /// # Errors
    ///
    /// Returns an error if delivery fails after retries (if applicable).
    async fn send(&self, report: &Report) -> error::Result<()>;

    /// Returns the channel type name (e.g., `"email"`, `"webhook"`).
    fn channel_type(&self) -> &str;

    /// Name of the configured instance, used in logs.
    fn instance_id(&self) -> &str;
}

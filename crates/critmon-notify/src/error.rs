/// Errors that can occur within the notification subsystem.
///
/// # Examples
///
/// ```rust
/// use critmon_notify::error::NotifyError;
///
/// let err = NotifyError::InvalidConfig("missing smtp_host".to_string());
/// assert!(err.to_string().contains("smtp_host"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// Channel configuration is missing a required field or contains an invalid value.
    #[error("Notify: invalid channel configuration: {0}")]
    InvalidConfig(String),

    /// The channel type is not registered in the plugin registry.
    #[error("Notify: unknown channel type '{0}'")]
    UnknownChannelType(String),

    #[error("Notify: HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Notify: SMTP error: {0}")]
    SmtpError(String),

    #[error("Notify: JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// The external endpoint returned a non-success response.
    #[error("Notify: API error from {service}: status={status}, body={body}")]
    ApiError {
        service: String,
        status: u16,
        body: String,
    },

    /// Some recipients of a channel could not be reached.
    #[error("Notify: delivery failed for {failed} of {total} recipients")]
    PartialDelivery { failed: usize, total: usize },
}

/// Convenience `Result` alias for notification operations.
pub type Result<T> = std::result::Result<T, NotifyError>;

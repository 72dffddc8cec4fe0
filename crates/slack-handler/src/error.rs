//! Error types for the Slack handler.

use thiserror::Error;

use crate::config::Source;

/// Errors raised while resolving the handler configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No webhook URL was supplied by any source
    #[error("--webhook-url or SLACK_WEBHOOK_URL environment variable is required")]
    MissingWebhookUrl,

    /// The redaction pattern does not compile
    #[error("regexp ({pattern}) specified by SLACK_REDACT_MATCH or --redact-match is invalid: {source}")]
    InvalidRedactPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A value could not be parsed into the option's type
    #[error("invalid value {value:?} for {option} from {origin}: {reason}")]
    InvalidValue {
        option: &'static str,
        origin: Source,
        value: String,
        reason: String,
    },
}

/// Errors raised while reading and validating the incoming event.
#[derive(Debug, Error)]
pub enum EventError {
    /// Nothing was read from stdin
    #[error("event is empty")]
    Empty,

    /// Stdin could not be read
    #[error("failed to read event: {0}")]
    Read(#[from] std::io::Error),

    /// The event is not valid JSON for the expected shape
    #[error("failed to parse event: {0}")]
    Parse(#[from] serde_json::Error),

    /// The event parsed but is structurally invalid
    #[error("invalid event: {0}")]
    Invalid(String),
}

/// Errors that can occur when delivering a notification.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The webhook answered with a non-success status
    #[error("webhook returned {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Top-level error for one handler run.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Event(#[from] EventError),

    #[error("failed to send notification: {0}")]
    Delivery(#[from] ChannelError),
}

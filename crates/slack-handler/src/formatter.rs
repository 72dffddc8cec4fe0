//! Turns an event into a notification payload.

use serde::Serialize;
use tracing::warn;

use crate::config::HandlerConfig;
use crate::event::{Event, STATUS_CRITICAL, STATUS_OK};
use crate::redact::Redactor;
use crate::template;

/// Maximum number of output characters kept in the summary.
pub const SUMMARY_MAX_LEN: usize = 100;

/// Prefix that makes Slack notify everyone in the channel.
pub const CHANNEL_MENTION: &str = "<!channel>";

const TITLE: &str = "Description";

/// Classification of a check status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Ok,
    Critical,
    /// Warning and every code we don't recognise.
    Other(u32),
}

impl CheckStatus {
    #[must_use]
    pub const fn from_code(code: u32) -> Self {
        match code {
            STATUS_OK => Self::Ok,
            STATUS_CRITICAL => Self::Critical,
            other => Self::Other(other),
        }
    }

    /// `RESOLVED` for OK, `ALERT` for everything else.
    #[must_use]
    pub const fn action(&self) -> &'static str {
        match self {
            Self::Ok => "RESOLVED",
            Self::Critical | Self::Other(_) => "ALERT",
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Ok => "Resolved",
            Self::Critical => "Critical",
            Self::Other(_) => "Warning",
        }
    }

    #[must_use]
    pub const fn color(&self) -> Color {
        match self {
            Self::Ok => Color::Good,
            Self::Critical => Color::Danger,
            Self::Other(_) => Color::Warning,
        }
    }
}

/// Attachment color understood by Slack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Good,
    Warning,
    Danger,
}

/// One titled value shown in the attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub title: String,
    pub value: String,
    pub short: bool,
}

impl Field {
    fn new(title: &str, value: impl Into<String>, short: bool) -> Self {
        Self {
            title: title.to_string(),
            value: value.into(),
            short,
        }
    }
}

/// Channel-independent notification content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationPayload {
    pub title: String,
    pub text: String,
    pub fallback: String,
    pub color: Color,
    pub fields: Vec<Field>,
}

/// Strip all trailing carriage returns and newlines.
#[must_use]
pub fn chomp(s: &str) -> &str {
    s.trim_end_matches(['\r', '\n'])
}

/// `<entity>/<check>`
#[must_use]
pub fn event_key(event: &Event) -> String {
    format!("{}/{}", event.entity_name(), event.check_name())
}

/// `<entity>/<check>:<output>`, with the output cut to `max_len` characters.
#[must_use]
pub fn event_summary(event: &Event, max_len: usize) -> String {
    let output = chomp(event.check_output());
    let output = if output.chars().count() > max_len {
        let truncated: String = output.chars().take(max_len).collect();
        format!("{truncated}...")
    } else {
        output.to_string()
    };
    format!("{}:{}", event_key(event), output)
}

/// Fallback text for clients that can't show attachments.
#[must_use]
pub fn formatted_message(event: &Event) -> String {
    format!(
        "{} - {}",
        CheckStatus::from_code(event.check_status()).action(),
        event_summary(event, SUMMARY_MAX_LEN)
    )
}

/// Status field value, with a channel mention for criticals when enabled.
#[must_use]
pub fn message_status(event: &Event, alert_on_critical: bool) -> String {
    let status = CheckStatus::from_code(event.check_status());
    if alert_on_critical && status == CheckStatus::Critical {
        format!("{CHANNEL_MENTION} {}", status.label())
    } else {
        status.label().to_string()
    }
}

/// Render the description template, or an empty string if it fails.
#[must_use]
pub fn description(event: &Event, config: &HandlerConfig) -> String {
    match template::render(&config.description_template, event) {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "Failed to render description template");
            String::new()
        }
    }
}

/// Build the notification for `event`.
#[must_use]
pub fn format_payload(event: &Event, config: &HandlerConfig) -> NotificationPayload {
    let status = CheckStatus::from_code(event.check_status());

    let mut fields = vec![
        Field::new("Status", message_status(event, config.alert_on_critical), false),
        Field::new("Entity", event.entity_name(), true),
        Field::new("Check", event.check_name(), true),
    ];

    let redactor = Redactor::new(&config.redact_match, config.redact);
    if config.include_entity_labels {
        if let Some(block) = redactor.render(event.entity_labels()) {
            fields.push(Field::new("Entity Labels", block, false));
        }
    }
    if config.include_check_labels {
        if let Some(block) = redactor.render(event.check_labels()) {
            fields.push(Field::new("Check Labels", block, false));
        }
    }

    NotificationPayload {
        title: TITLE.to_string(),
        text: description(event, config),
        fallback: formatted_message(event),
        color: status.color(),
        fields,
    }
}

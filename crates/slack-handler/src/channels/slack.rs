//! Slack incoming-webhook channel.

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};

use super::Notifier;
use crate::config::HandlerConfig;
use crate::error::ChannelError;
use crate::formatter::{Color, Field, NotificationPayload};

/// Posts notifications to a Slack incoming webhook.
pub struct SlackWebhook {
    webhook_url: String,
    channel: String,
    username: String,
    icon_url: String,
    client: reqwest::Client,
}

impl SlackWebhook {
    /// Create a webhook channel from the resolved configuration.
    pub fn from_config(config: &HandlerConfig) -> Result<Self, ChannelError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            webhook_url: config.webhook_url.clone(),
            channel: config.channel.clone(),
            username: config.username.clone(),
            icon_url: config.icon_url.clone(),
            client,
        })
    }

    /// Wrap `payload` in the webhook message envelope.
    pub fn message<'a>(&'a self, payload: &'a NotificationPayload) -> SlackMessage<'a> {
        SlackMessage {
            channel: &self.channel,
            username: &self.username,
            icon_url: &self.icon_url,
            attachments: vec![SlackAttachment {
                title: &payload.title,
                text: &payload.text,
                fallback: &payload.fallback,
                color: payload.color,
                fields: &payload.fields,
            }],
        }
    }
}

#[async_trait]
impl Notifier for SlackWebhook {
    fn name(&self) -> &'static str {
        "slack"
    }

    async fn send(&self, payload: &NotificationPayload) -> Result<(), ChannelError> {
        let message = self.message(payload);

        debug!(channel = "slack", slack_channel = %self.channel, "Sending notification");

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&message)
            .send()
            .await?;

        if response.status().is_success() {
            debug!(channel = "slack", "Notification sent successfully");
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            warn!(
                channel = "slack",
                status = %status,
                body = %body,
                "Slack webhook request failed"
            );

            Err(ChannelError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }
}

// =============================================================================
// Slack API types
// =============================================================================

/// Body posted to the webhook.
#[derive(Debug, Serialize)]
pub struct SlackMessage<'a> {
    #[serde(skip_serializing_if = "str::is_empty")]
    channel: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    username: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    icon_url: &'a str,
    attachments: Vec<SlackAttachment<'a>>,
}

#[derive(Debug, Serialize)]
struct SlackAttachment<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    text: &'a str,
    fallback: &'a str,
    color: Color,
    fields: &'a [Field],
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Event;
    use crate::formatter::format_payload;
    use serde_json::json;

    #[test]
    fn test_message_shape() {
        let config = HandlerConfig {
            webhook_url: "http://localhost/hook".to_string(),
            channel: "#test".to_string(),
            username: String::new(),
            icon_url: String::new(),
            ..HandlerConfig::default()
        };
        let event = Event::fixture("entity1", "check1");
        let payload = format_payload(&event, &config);
        let slack = SlackWebhook::from_config(&config).unwrap();

        let body = serde_json::to_value(slack.message(&payload)).unwrap();
        assert_eq!(
            body,
            json!({
                "channel": "#test",
                "attachments": [{
                    "title": "Description",
                    "fallback": "RESOLVED - entity1/check1:",
                    "color": "good",
                    "fields": [
                        {"title": "Status", "value": "Resolved", "short": false},
                        {"title": "Entity", "value": "entity1", "short": true},
                        {"title": "Check", "value": "check1", "short": true}
                    ]
                }]
            })
        );
    }

    #[test]
    fn test_message_includes_identity_and_text() {
        let config = HandlerConfig {
            webhook_url: "http://localhost/hook".to_string(),
            ..HandlerConfig::default()
        };
        let mut event = Event::fixture("entity1", "check1");
        event.check.as_mut().unwrap().output = "disk is full".to_string();
        let payload = format_payload(&event, &config);
        let slack = SlackWebhook::from_config(&config).unwrap();

        let body = serde_json::to_value(slack.message(&payload)).unwrap();
        assert_eq!(body["channel"], "#general");
        assert_eq!(body["username"], "sensu");
        assert_eq!(
            body["icon_url"],
            "http://s3-us-west-2.amazonaws.com/sensuapp.org/sensu.png"
        );
        assert_eq!(body["attachments"][0]["text"], "disk is full");
    }
}

//! One handler run: read the event, resolve configuration, format, deliver.

use std::io::Read;
use tracing::{debug, info};

use crate::channels::slack::SlackWebhook;
use crate::channels::Notifier;
use crate::config::{self, FlagValues, HandlerConfig};
use crate::error::HandlerError;
use crate::event::Event;
use crate::formatter::{self, event_key};

/// Parse and validate the event, then resolve the configuration against it.
///
/// Nothing is sent; every input and configuration error surfaces here.
pub fn prepare<E>(
    input: impl Read,
    flags: &FlagValues,
    env: E,
) -> Result<(Event, HandlerConfig), HandlerError>
where
    E: Fn(&str) -> Option<String>,
{
    let event = Event::from_reader(input)?;
    event.validate()?;
    debug!(event = %event_key(&event), status = event.check_status(), "Read event");

    let config = config::resolve(flags, env, &event)?;
    Ok((event, config))
}

/// Format `event` and hand it to `notifier`.
pub async fn deliver(
    event: &Event,
    config: &HandlerConfig,
    notifier: &dyn Notifier,
) -> Result<(), HandlerError> {
    let payload = formatter::format_payload(event, config);
    notifier.send(&payload).await?;

    info!(
        channel = notifier.name(),
        event = %event_key(event),
        fallback = %payload.fallback,
        "Notification delivered"
    );
    Ok(())
}

/// Handle a single event read from `input` and post it to Slack.
pub async fn run<E>(input: impl Read, flags: &FlagValues, env: E) -> Result<(), HandlerError>
where
    E: Fn(&str) -> Option<String>,
{
    let (event, config) = prepare(input, flags, env)?;
    let slack = SlackWebhook::from_config(&config)?;
    deliver(&event, &config, &slack).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CHANNEL, WEBHOOK_URL};
    use crate::error::{ChannelError, ConfigError, EventError};
    use crate::formatter::NotificationPayload;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<NotificationPayload>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn send(&self, payload: &NotificationPayload) -> Result<(), ChannelError> {
            self.sent.lock().unwrap().push(payload.clone());
            Ok(())
        }
    }

    struct FailingNotifier;

    #[async_trait]
    impl Notifier for FailingNotifier {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn send(&self, _: &NotificationPayload) -> Result<(), ChannelError> {
            Err(ChannelError::Rejected {
                status: 500,
                body: "no_service".to_string(),
            })
        }
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn event_json(status: u32) -> String {
        let mut event = Event::fixture("entity1", "check1");
        event.check.as_mut().unwrap().status = status;
        serde_json::to_string(&event).unwrap()
    }

    #[test]
    fn test_prepare_requires_webhook() {
        let input = event_json(0);
        let err = prepare(input.as_bytes(), &FlagValues::new(), no_env).unwrap_err();
        assert!(matches!(
            err,
            HandlerError::Config(ConfigError::MissingWebhookUrl)
        ));
    }

    #[test]
    fn test_prepare_rejects_invalid_event() {
        let flags = FlagValues::new().with(WEBHOOK_URL, "http://localhost/hook");
        let err = prepare(r#"{"timestamp": 1}"#.as_bytes(), &flags, no_env).unwrap_err();
        assert!(matches!(err, HandlerError::Event(EventError::Invalid(_))));

        let err = prepare("".as_bytes(), &flags, no_env).unwrap_err();
        assert!(matches!(err, HandlerError::Event(EventError::Empty)));
    }

    #[tokio::test]
    async fn test_deliver_sends_formatted_payload() {
        let flags = FlagValues::new()
            .with(WEBHOOK_URL, "http://localhost/hook")
            .with(CHANNEL, "#test");
        let input = event_json(2);
        let (event, config) = prepare(input.as_bytes(), &flags, no_env).unwrap();

        let notifier = RecordingNotifier::default();
        deliver(&event, &config, &notifier).await.unwrap();

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].fallback, "ALERT - entity1/check1:");
        assert_eq!(sent[0].fields[0].value, "Critical");
    }

    #[tokio::test]
    async fn test_delivery_failure_is_reported() {
        let flags = FlagValues::new().with(WEBHOOK_URL, "http://localhost/hook");
        let input = event_json(1);
        let (event, config) = prepare(input.as_bytes(), &flags, no_env).unwrap();

        let err = deliver(&event, &config, &FailingNotifier).await.unwrap_err();
        assert!(matches!(err, HandlerError::Delivery(_)));
        assert!(err.to_string().contains("no_service"));
    }
}

//! Sensu event handler that posts check results to Slack.
//!
//! The handler reads one monitoring event as JSON on stdin, resolves its
//! configuration, formats an attachment and posts it to a Slack incoming
//! webhook. It runs once per event and keeps no state between runs.
//!
//! # Usage
//!
//! ```no_run
//! use slack_handler::config::FlagValues;
//!
//! # async fn example() -> Result<(), slack_handler::HandlerError> {
//! let flags = FlagValues::new().with("webhook-url", "https://hooks.slack.com/services/T/B/X");
//! slack_handler::run(std::io::stdin(), &flags, |key| std::env::var(key).ok()).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! Options are resolved per run from, in order of precedence, command-line
//! flags, environment variables, event annotations under
//! `sensu.io/plugins/slack/config/` and built-in defaults. See [`config`].
//!
//! # Architecture
//!
//! - [`event`] parses and validates the incoming event
//! - [`config`] declares the options and resolves them
//! - [`formatter`] builds the channel-independent [`NotificationPayload`]
//! - [`channels`] delivers it; [`SlackWebhook`] is the only channel

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod channels;
pub mod cli;
pub mod config;
pub mod error;
pub mod event;
pub mod formatter;
pub mod handler;
pub mod redact;
pub mod template;

pub use channels::slack::SlackWebhook;
pub use channels::Notifier;
pub use config::{FlagValues, HandlerConfig};
pub use error::{ChannelError, ConfigError, EventError, HandlerError};
pub use event::Event;
pub use formatter::NotificationPayload;
pub use handler::run;

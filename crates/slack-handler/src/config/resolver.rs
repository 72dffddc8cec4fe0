//! Layered resolution of [`OPTIONS`](super::OPTIONS) against one event.

use std::collections::BTreeMap;
use tracing::debug;

use super::{ConfigOption, HandlerConfig, SetError, Source, OPTIONS};
use crate::error::ConfigError;
use crate::event::Event;

/// Option values given explicitly on the command line, keyed by option path.
#[derive(Debug, Clone, Default)]
pub struct FlagValues(BTreeMap<&'static str, String>);

impl FlagValues {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: &'static str, value: impl Into<String>) {
        self.0.insert(path, value.into());
    }

    #[must_use]
    pub fn get(&self, path: &str) -> Option<&str> {
        self.0.get(path).map(String::as_str)
    }

    #[must_use]
    pub fn with(mut self, path: &'static str, value: impl Into<String>) -> Self {
        self.insert(path, value);
        self
    }
}

/// Resolve every option for `event`.
///
/// `env` looks up an environment variable by name; the binary passes
/// `std::env::var`, tests pass a fixed map.
pub fn resolve<E>(flags: &FlagValues, env: E, event: &Event) -> Result<HandlerConfig, ConfigError>
where
    E: Fn(&str) -> Option<String>,
{
    let mut config = HandlerConfig::default();

    for opt in OPTIONS {
        let (source, value) = winning_value(opt, flags, &env, event);

        if opt.secret {
            debug!(option = opt.path, source = %source, "Resolved option");
        } else {
            debug!(option = opt.path, source = %source, value = %value, "Resolved option");
        }

        opt.apply(&mut config, &value).map_err(|e| match e {
            SetError::Parse(reason) => ConfigError::InvalidValue {
                option: opt.path,
                origin: source,
                value: value.clone(),
                reason,
            },
            SetError::Pattern(err) => ConfigError::InvalidRedactPattern {
                pattern: value.clone(),
                source: err,
            },
        })?;
        config.record_source(opt.path, source);
    }

    if config.webhook_url.is_empty() {
        return Err(ConfigError::MissingWebhookUrl);
    }

    Ok(config)
}

fn winning_value<E>(
    opt: &ConfigOption,
    flags: &FlagValues,
    env: &E,
    event: &Event,
) -> (Source, String)
where
    E: Fn(&str) -> Option<String>,
{
    if let Some(value) = flags.get(opt.path) {
        return (Source::Flag, value.to_string());
    }

    if let Some(value) = env(opt.env).filter(|v| !v.is_empty()) {
        return (Source::Env, value);
    }

    if let Some(key) = opt.annotation_key() {
        if let Some(value) = event.check_annotations().and_then(|a| a.get(&key)) {
            return (Source::CheckAnnotation, value.clone());
        }
        if let Some(value) = event.entity_annotations().and_then(|a| a.get(&key)) {
            return (Source::EntityAnnotation, value.clone());
        }
    }

    (Source::Default, opt.default.to_string())
}

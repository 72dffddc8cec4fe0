//! Handler configuration.
//!
//! Every configurable value is declared once in [`OPTIONS`]. The table drives
//! the command-line flags, the environment variables and the event
//! annotation overrides, and each entry carries the setter that writes the
//! parsed value into [`HandlerConfig`].
//!
//! # Precedence
//!
//! For each option the first source that has a value wins:
//!
//! 1. the command-line flag, when given explicitly
//! 2. the environment variable, when set and non-empty
//! 3. the check annotation `sensu.io/plugins/slack/config/<path>`, then the
//!    same key on the entity
//! 4. the compiled-in default

mod resolver;

pub use resolver::{resolve, FlagValues};

use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;
use std::time::Duration;

/// Annotation prefix under which events may override options.
pub const KEYSPACE: &str = "sensu.io/plugins/slack/config";

pub const WEBHOOK_URL: &str = "webhook-url";
pub const CHANNEL: &str = "channel";
pub const USERNAME: &str = "username";
pub const ICON_URL: &str = "icon-url";
pub const DESCRIPTION_TEMPLATE: &str = "description-template";
pub const ALERT_ON_CRITICAL: &str = "alert-on-critical";
pub const REDACT_MATCH: &str = "redact-match";
pub const REDACT: &str = "redact";
pub const INCLUDE_CHECK_LABELS: &str = "include-check-labels";
pub const INCLUDE_ENTITY_LABELS: &str = "include-entity-labels";
pub const TIMEOUT: &str = "timeout";

const DEFAULT_CHANNEL: &str = "#general";
const DEFAULT_USERNAME: &str = "sensu";
const DEFAULT_ICON_URL: &str = "http://s3-us-west-2.amazonaws.com/sensuapp.org/sensu.png";
const DEFAULT_DESCRIPTION_TEMPLATE: &str = "{{check.output}}";
const DEFAULT_REDACT_MATCH: &str = "(?i).*(pass|key).*";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

static DEFAULT_REDACT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DEFAULT_REDACT_MATCH).unwrap());

/// Where the winning value of an option came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Flag,
    Env,
    CheckAnnotation,
    EntityAnnotation,
    Default,
}

impl Source {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Flag => "flag",
            Self::Env => "environment",
            Self::CheckAnnotation => "check annotation",
            Self::EntityAnnotation => "entity annotation",
            Self::Default => "default",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value type of an option, used to shape its command-line flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Text,
    Bool,
    Seconds,
}

/// Failure reported by an option setter.
#[derive(Debug)]
pub(crate) enum SetError {
    Parse(String),
    Pattern(regex::Error),
}

type Setter = fn(&mut HandlerConfig, &str) -> Result<(), SetError>;

/// Declaration of a single configurable option.
pub struct ConfigOption {
    /// Option name, used as the long flag and the annotation suffix.
    pub path: &'static str,
    pub short: char,
    pub env: &'static str,
    pub default: &'static str,
    pub usage: &'static str,
    pub kind: OptionKind,
    /// Annotation suffix under [`KEYSPACE`]; `None` means events cannot
    /// override the option.
    pub annotation: Option<&'static str>,
    /// Values are never logged.
    pub secret: bool,
    set: Setter,
}

impl ConfigOption {
    /// Full annotation key for this option, if it accepts overrides.
    #[must_use]
    pub fn annotation_key(&self) -> Option<String> {
        self.annotation.map(|path| format!("{KEYSPACE}/{path}"))
    }

    pub(crate) fn apply(&self, config: &mut HandlerConfig, value: &str) -> Result<(), SetError> {
        (self.set)(config, value)
    }
}

impl fmt::Debug for ConfigOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigOption")
            .field("path", &self.path)
            .field("env", &self.env)
            .field("annotation", &self.annotation)
            .finish_non_exhaustive()
    }
}

/// All options understood by the handler.
pub static OPTIONS: &[ConfigOption] = &[
    ConfigOption {
        path: WEBHOOK_URL,
        short: 'w',
        env: "SLACK_WEBHOOK_URL",
        default: "",
        usage: "The webhook url to send messages to",
        kind: OptionKind::Text,
        annotation: Some(WEBHOOK_URL),
        secret: true,
        set: |c, v| {
            c.webhook_url = v.to_string();
            Ok(())
        },
    },
    ConfigOption {
        path: CHANNEL,
        short: 'c',
        env: "SLACK_CHANNEL",
        default: DEFAULT_CHANNEL,
        usage: "The channel to post messages to",
        kind: OptionKind::Text,
        annotation: Some(CHANNEL),
        secret: false,
        set: |c, v| {
            c.channel = v.to_string();
            Ok(())
        },
    },
    ConfigOption {
        path: USERNAME,
        short: 'u',
        env: "SLACK_USERNAME",
        default: DEFAULT_USERNAME,
        usage: "The username that messages will be sent as",
        kind: OptionKind::Text,
        annotation: Some(USERNAME),
        secret: false,
        set: |c, v| {
            c.username = v.to_string();
            Ok(())
        },
    },
    ConfigOption {
        path: ICON_URL,
        short: 'i',
        env: "SLACK_ICON_URL",
        default: DEFAULT_ICON_URL,
        usage: "A URL to an image to use as the user avatar",
        kind: OptionKind::Text,
        annotation: Some(ICON_URL),
        secret: false,
        set: |c, v| {
            c.icon_url = v.to_string();
            Ok(())
        },
    },
    ConfigOption {
        path: DESCRIPTION_TEMPLATE,
        short: 't',
        env: "SLACK_DESCRIPTION_TEMPLATE",
        default: DEFAULT_DESCRIPTION_TEMPLATE,
        usage: "The Slack notification output template, in Handlebars format",
        kind: OptionKind::Text,
        annotation: Some(DESCRIPTION_TEMPLATE),
        secret: false,
        set: |c, v| {
            c.description_template = v.to_string();
            Ok(())
        },
    },
    ConfigOption {
        path: ALERT_ON_CRITICAL,
        short: 'a',
        env: "SLACK_ALERT_ON_CRITICAL",
        default: "false",
        usage: "Mention the whole channel when the check is critical",
        kind: OptionKind::Bool,
        annotation: Some(ALERT_ON_CRITICAL),
        secret: false,
        set: |c, v| {
            c.alert_on_critical = parse_bool(v)?;
            Ok(())
        },
    },
    ConfigOption {
        path: REDACT_MATCH,
        short: 'm',
        env: "SLACK_REDACT_MATCH",
        default: DEFAULT_REDACT_MATCH,
        usage: "Regex to redact values of matching labels",
        kind: OptionKind::Text,
        annotation: Some(REDACT_MATCH),
        secret: false,
        set: |c, v| {
            c.redact_match = Regex::new(v).map_err(SetError::Pattern)?;
            Ok(())
        },
    },
    ConfigOption {
        path: REDACT,
        short: 'r',
        env: "SLACK_REDACT",
        default: "false",
        usage: "Enable redaction of labels",
        kind: OptionKind::Bool,
        annotation: Some(REDACT),
        secret: false,
        set: |c, v| {
            c.redact = parse_bool(v)?;
            Ok(())
        },
    },
    ConfigOption {
        path: INCLUDE_CHECK_LABELS,
        short: 'l',
        env: "SLACK_INCLUDE_CHECK_LABELS",
        default: "false",
        usage: "Include check labels in slack message",
        kind: OptionKind::Bool,
        annotation: Some(INCLUDE_CHECK_LABELS),
        secret: false,
        set: |c, v| {
            c.include_check_labels = parse_bool(v)?;
            Ok(())
        },
    },
    ConfigOption {
        path: INCLUDE_ENTITY_LABELS,
        short: 'e',
        env: "SLACK_INCLUDE_ENTITY_LABELS",
        default: "false",
        usage: "Include entity labels in slack message",
        kind: OptionKind::Bool,
        annotation: Some(INCLUDE_ENTITY_LABELS),
        secret: false,
        set: |c, v| {
            c.include_entity_labels = parse_bool(v)?;
            Ok(())
        },
    },
    ConfigOption {
        path: TIMEOUT,
        short: 'T',
        env: "SLACK_TIMEOUT",
        default: "10",
        usage: "Seconds to wait for the webhook to answer",
        kind: OptionKind::Seconds,
        annotation: None,
        secret: false,
        set: |c, v| {
            c.timeout = Duration::from_secs(parse_seconds(v)?);
            Ok(())
        },
    },
];

/// Resolved handler configuration for one run.
#[derive(Debug, Clone)]
pub struct HandlerConfig {
    pub webhook_url: String,
    pub channel: String,
    pub username: String,
    pub icon_url: String,
    pub description_template: String,
    pub alert_on_critical: bool,
    pub redact_match: Regex,
    pub redact: bool,
    pub include_check_labels: bool,
    pub include_entity_labels: bool,
    pub timeout: Duration,
    pub(crate) sources: BTreeMap<&'static str, Source>,
}

impl HandlerConfig {
    /// Source that supplied the value of `path`, once resolved.
    #[must_use]
    pub fn source_of(&self, path: &str) -> Option<Source> {
        self.sources.get(path).copied()
    }

    pub(crate) fn record_source(&mut self, path: &'static str, source: Source) {
        self.sources.insert(path, source);
    }
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            webhook_url: String::new(),
            channel: DEFAULT_CHANNEL.to_string(),
            username: DEFAULT_USERNAME.to_string(),
            icon_url: DEFAULT_ICON_URL.to_string(),
            description_template: DEFAULT_DESCRIPTION_TEMPLATE.to_string(),
            alert_on_critical: false,
            redact_match: DEFAULT_REDACT_PATTERN.clone(),
            redact: false,
            include_check_labels: false,
            include_entity_labels: false,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            sources: BTreeMap::new(),
        }
    }
}

/// Parse a boolean the way Go's `strconv.ParseBool` does, which is what
/// existing Sensu deployments put in their annotations.
fn parse_bool(value: &str) -> Result<bool, SetError> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(SetError::Parse("expected a boolean".to_string())),
    }
}

fn parse_seconds(value: &str) -> Result<u64, SetError> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|e| SetError::Parse(format!("expected a whole number of seconds: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_paths_are_unique() {
        let mut paths: Vec<_> = OPTIONS.iter().map(|o| o.path).collect();
        paths.sort_unstable();
        paths.dedup();
        assert_eq!(paths.len(), OPTIONS.len());
    }

    #[test]
    fn test_defaults_match_table() {
        let mut config = HandlerConfig::default();
        for opt in OPTIONS {
            opt.apply(&mut config, opt.default).unwrap();
        }
        let defaults = HandlerConfig::default();
        assert_eq!(config.channel, defaults.channel);
        assert_eq!(config.username, defaults.username);
        assert_eq!(config.icon_url, defaults.icon_url);
        assert_eq!(config.description_template, defaults.description_template);
        assert_eq!(config.redact_match.as_str(), defaults.redact_match.as_str());
        assert_eq!(config.timeout, defaults.timeout);
        assert!(!config.redact);
    }

    fn option(path: &str) -> Option<&'static ConfigOption> {
        OPTIONS.iter().find(|o| o.path == path)
    }

    #[test]
    fn test_annotation_key() {
        assert_eq!(
            option(CHANNEL).unwrap().annotation_key().as_deref(),
            Some("sensu.io/plugins/slack/config/channel")
        );
        assert_eq!(option(TIMEOUT).unwrap().annotation_key(), None);
    }

    #[test]
    fn test_parse_bool() {
        for v in ["1", "t", "T", "TRUE", "true", "True"] {
            assert!(parse_bool(v).unwrap());
        }
        for v in ["0", "f", "F", "FALSE", "false", "False"] {
            assert!(!parse_bool(v).unwrap());
        }
        assert!(parse_bool("yes").is_err());
        assert!(parse_bool("").is_err());
    }

    #[test]
    fn test_parse_seconds() {
        assert_eq!(parse_seconds("30").unwrap(), 30);
        assert!(parse_seconds("-1").is_err());
        assert!(parse_seconds("ten").is_err());
    }
}

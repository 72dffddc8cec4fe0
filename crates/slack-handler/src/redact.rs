//! Label redaction.

use regex::Regex;
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Marker written in place of a redacted label value.
pub const REDACTED: &str = "**REDACTED**";

/// Replaces values of labels whose key matches a pattern.
#[derive(Debug, Clone, Copy)]
pub struct Redactor<'a> {
    pattern: &'a Regex,
    enabled: bool,
}

impl<'a> Redactor<'a> {
    #[must_use]
    pub const fn new(pattern: &'a Regex, enabled: bool) -> Self {
        Self { pattern, enabled }
    }

    /// Value to publish for the label `key`.
    #[must_use]
    pub fn value<'v>(&self, key: &str, value: &'v str) -> &'v str {
        if self.enabled && self.pattern.is_match(key) {
            REDACTED
        } else {
            value
        }
    }

    /// Render labels as `key=value` lines, or `None` when there are none.
    #[must_use]
    pub fn render(&self, labels: Option<&BTreeMap<String, String>>) -> Option<String> {
        let labels = labels.filter(|l| !l.is_empty())?;

        let mut block = String::new();
        for (key, value) in labels {
            let _ = writeln!(block, "{key}={}", self.value(key, value));
        }
        Some(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> BTreeMap<String, String> {
        BTreeMap::from([
            ("api_key".to_string(), "s3cr3t".to_string()),
            ("Password".to_string(), "hunter2".to_string()),
            ("region".to_string(), "us-east-1".to_string()),
        ])
    }

    fn pattern() -> Regex {
        Regex::new("(?i).*(pass|key).*").unwrap()
    }

    #[test]
    fn test_matching_keys_are_redacted() {
        let re = pattern();
        let block = Redactor::new(&re, true).render(Some(&labels())).unwrap();

        assert_eq!(
            block,
            "Password=**REDACTED**\napi_key=**REDACTED**\nregion=us-east-1\n"
        );
        assert!(!block.contains("s3cr3t"));
        assert!(!block.contains("hunter2"));
    }

    #[test]
    fn test_disabled_redaction_keeps_values() {
        let re = pattern();
        let block = Redactor::new(&re, false).render(Some(&labels())).unwrap();

        assert!(block.contains("api_key=s3cr3t\n"));
        assert!(block.contains("Password=hunter2\n"));
        assert!(!block.contains(REDACTED));
    }

    #[test]
    fn test_empty_or_missing_labels_render_nothing() {
        let re = pattern();
        let redactor = Redactor::new(&re, true);
        assert_eq!(redactor.render(None), None);
        assert_eq!(redactor.render(Some(&BTreeMap::new())), None);
    }

    #[test]
    fn test_pattern_matches_keys_not_values() {
        let re = pattern();
        let redactor = Redactor::new(&re, true);
        assert_eq!(redactor.value("owner", "password-team"), "password-team");
        assert_eq!(redactor.value("db_pass", "x"), REDACTED);
    }
}

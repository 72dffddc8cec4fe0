//! Monitoring event types consumed by the handler.
//!
//! Only the fields the handler reads are typed. Everything else in the
//! incoming JSON is kept in `extra` maps so description templates can still
//! reach it.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::io::Read;
use std::sync::LazyLock;

use crate::error::EventError;

/// Allowed characters for entity and check names.
static NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[\w.\-:]+$").unwrap());

/// Check status codes reported by the monitoring agent.
pub const STATUS_OK: u32 = 0;
pub const STATUS_WARNING: u32 = 1;
pub const STATUS_CRITICAL: u32 = 2;

/// Object metadata shared by entities and checks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectMeta {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
}

/// The monitored entity an event was produced for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The check result carried by an event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Check {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub output: String,
    #[serde(default)]
    pub status: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single monitoring event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub entity: Option<Entity>,
    #[serde(default)]
    pub check: Option<Check>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Event {
    /// Build a minimal OK event for the given entity and check names.
    #[cfg(test)]
    pub(crate) fn fixture(entity: &str, check: &str) -> Self {
        Self {
            timestamp: 1_700_000_000,
            entity: Some(Entity {
                metadata: ObjectMeta {
                    name: entity.to_string(),
                    namespace: "default".to_string(),
                    ..ObjectMeta::default()
                },
                extra: Map::new(),
            }),
            check: Some(Check {
                metadata: ObjectMeta {
                    name: check.to_string(),
                    namespace: "default".to_string(),
                    ..ObjectMeta::default()
                },
                output: String::new(),
                status: STATUS_OK,
                extra: Map::new(),
            }),
            extra: Map::new(),
        }
    }

    /// Parse an event from a JSON string.
    pub fn from_json(input: &str) -> Result<Self, EventError> {
        if input.trim().is_empty() {
            return Err(EventError::Empty);
        }
        Ok(serde_json::from_str(input)?)
    }

    /// Read and parse an event from a reader, typically stdin.
    pub fn from_reader(mut reader: impl Read) -> Result<Self, EventError> {
        let mut input = String::new();
        reader.read_to_string(&mut input)?;
        Self::from_json(&input)
    }

    /// Check the structural requirements the handler relies on.
    pub fn validate(&self) -> Result<(), EventError> {
        if self.timestamp < 0 {
            return Err(EventError::Invalid(format!(
                "timestamp {} is negative",
                self.timestamp
            )));
        }

        let entity = self
            .entity
            .as_ref()
            .ok_or_else(|| EventError::Invalid("event must contain an entity".to_string()))?;
        validate_name("entity", &entity.metadata.name)?;

        let check = self
            .check
            .as_ref()
            .ok_or_else(|| EventError::Invalid("event must contain a check".to_string()))?;
        validate_name("check", &check.metadata.name)?;

        Ok(())
    }

    /// Name of the entity, or an empty string when absent.
    pub fn entity_name(&self) -> &str {
        self.entity.as_ref().map_or("", |e| e.metadata.name.as_str())
    }

    /// Name of the check, or an empty string when absent.
    pub fn check_name(&self) -> &str {
        self.check.as_ref().map_or("", |c| c.metadata.name.as_str())
    }

    pub fn check_output(&self) -> &str {
        self.check.as_ref().map_or("", |c| c.output.as_str())
    }

    pub fn check_status(&self) -> u32 {
        self.check.as_ref().map_or(STATUS_OK, |c| c.status)
    }

    pub fn check_labels(&self) -> Option<&BTreeMap<String, String>> {
        self.check.as_ref().map(|c| &c.metadata.labels)
    }

    pub fn entity_labels(&self) -> Option<&BTreeMap<String, String>> {
        self.entity.as_ref().map(|e| &e.metadata.labels)
    }

    pub fn check_annotations(&self) -> Option<&BTreeMap<String, String>> {
        self.check.as_ref().map(|c| &c.metadata.annotations)
    }

    pub fn entity_annotations(&self) -> Option<&BTreeMap<String, String>> {
        self.entity.as_ref().map(|e| &e.metadata.annotations)
    }
}

fn validate_name(kind: &str, name: &str) -> Result<(), EventError> {
    if name.is_empty() {
        return Err(EventError::Invalid(format!("{kind} name must not be empty")));
    }
    if !NAME_PATTERN.is_match(name) {
        return Err(EventError::Invalid(format!(
            "{kind} name {name:?} contains invalid characters"
        )));
    }
    Ok(())
}

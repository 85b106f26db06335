use crate::model::DefinitionKind;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Largest samples count the execution service accepts.
pub const MAX_SAMPLES_COUNT: u32 = 65536;

/// Execution parameters attached to a single tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunningInstance {
    pub start_point: i64,
    pub transformation_shift: i64,
}

impl RunningInstance {
    pub fn new(start_point: i64, transformation_shift: i64) -> Self {
        Self {
            start_point,
            transformation_shift,
        }
    }
}

/// Body of `POST /execute`.
///
/// The name and count keys depend on the tree kind, so serialization is
/// written out by hand: `{particle_name, samples_count, running_instances}`
/// or `{feature_name, n, running_instances}`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecuteRequest {
    pub kind: DefinitionKind,
    pub name: String,
    pub samples_count: u32,
    pub running_instances: Vec<RunningInstance>,
}

impl Serialize for ExecuteRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry(self.kind.name_key(), &self.name)?;
        map.serialize_entry(self.kind.samples_key(), &self.samples_count.to_string())?;
        map.serialize_entry("running_instances", &self.running_instances)?;
        map.end()
    }
}

/// Parses a user-entered samples count. Zero is passed on to the service;
/// only counts above `MAX_SAMPLES_COUNT` are rejected.
pub fn parse_samples_count(raw: &str) -> Option<u32> {
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|count| *count <= MAX_SAMPLES_COUNT)
}

/// Status and body returned by `POST /execute`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecuteOutcome {
    pub status: u16,
    pub body: String,
}

impl ExecuteOutcome {
    /// Pretty-prints the body when it is JSON, otherwise keeps it as sent.
    pub fn from_raw(status: u16, raw: String) -> Self {
        let body = match serde_json::from_str::<serde_json::Value>(&raw) {
            Ok(json) => serde_json::to_string_pretty(&json).unwrap_or(raw),
            Err(_) => raw,
        };
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

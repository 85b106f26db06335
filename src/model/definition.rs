use serde::{Deserialize, Serialize};
use std::fmt;

/// Which family of catalog definitions a tree is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefinitionKind {
    #[default]
    Particle,
    Feature,
}

impl DefinitionKind {
    /// Path segment of the lookup endpoint (`/particle/{name}`).
    pub fn endpoint(&self) -> &'static str {
        match self {
            DefinitionKind::Particle => "particle",
            DefinitionKind::Feature => "feature",
        }
    }

    /// Key that carries the root name in an execute request body.
    pub fn name_key(&self) -> &'static str {
        match self {
            DefinitionKind::Particle => "particle_name",
            DefinitionKind::Feature => "feature_name",
        }
    }

    /// Key that carries the samples count in an execute request body.
    pub fn samples_key(&self) -> &'static str {
        match self {
            DefinitionKind::Particle => "samples_count",
            DefinitionKind::Feature => "n",
        }
    }
}

impl fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.endpoint())
    }
}

/// Reads the `name` field of a definition, falling back to the requested name.
pub fn definition_name<'a>(definition: &'a serde_json::Value, requested: &'a str) -> &'a str {
    definition
        .get("name")
        .and_then(|v| v.as_str())
        .filter(|name| !name.is_empty())
        .unwrap_or(requested)
}

/// Reads the `feature_name` reference of a definition, if it carries a non-empty one.
pub fn feature_reference(definition: &serde_json::Value) -> Option<&str> {
    definition
        .get("feature_name")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|name| !name.is_empty())
}

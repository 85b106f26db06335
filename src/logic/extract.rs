use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const COMPOSITE_NAMES_FIELD: &str = "composite_names";
pub const LEGACY_COMPOSITE_NAMES_FIELD: &str = "compositeNames";
pub const COMPOSITES_FIELD: &str = "composites";

/// Highest slot count a sparse `composites` map may describe. Maps with a
/// key at or past this bound are not recognised as the sparse shape.
pub const MAX_COMPOSITE_SLOTS: usize = 65536;

/// Child references of a definition, tagged by the JSON shape they came in.
///
/// The catalog format changed over time; every historical shape maps onto
/// the same ordered list of child names. An empty name marks a scalar slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompositeRefs {
    /// `composite_names: ["B", ""]`
    Names(Vec<String>),
    /// `compositeNames: ["B", ""]`
    LegacyNames(Vec<String>),
    /// `composites: ["B", {"name": "C"}]`
    Entries(Vec<String>),
    /// `composites: {"0": "B", "3": "C"}`
    Sparse(BTreeMap<usize, String>),
    /// Nothing recognisable, treated as scalar.
    None,
}

impl CompositeRefs {
    /// Tries each known shape in order and keeps the first that parses.
    pub fn parse(definition: &Value) -> Self {
        let Some(object) = definition.as_object() else {
            return CompositeRefs::None;
        };

        if let Some(names) = string_list(object, COMPOSITE_NAMES_FIELD) {
            return CompositeRefs::Names(names);
        }
        if let Some(names) = string_list(object, LEGACY_COMPOSITE_NAMES_FIELD) {
            return CompositeRefs::LegacyNames(names);
        }
        if let Some(names) = entry_list(object.get(COMPOSITES_FIELD)) {
            return CompositeRefs::Entries(names);
        }
        if let Some(map) = index_map(object.get(COMPOSITES_FIELD)) {
            return CompositeRefs::Sparse(map);
        }

        CompositeRefs::None
    }

    /// Only the sparse shape needs a dimension count to know its length.
    pub fn needs_dimensions(&self) -> bool {
        matches!(self, CompositeRefs::Sparse(_))
    }

    /// Dense, trimmed child names. `expected` widens a sparse map to at
    /// least that many slots; other shapes ignore it.
    pub fn into_names(self, expected: Option<usize>) -> Vec<String> {
        let names = match self {
            CompositeRefs::Names(names)
            | CompositeRefs::LegacyNames(names)
            | CompositeRefs::Entries(names) => names,
            CompositeRefs::Sparse(map) => {
                // Keys are below MAX_COMPOSITE_SLOTS, so `max + 1` cannot overflow.
                let width = map
                    .keys()
                    .next_back()
                    .map(|max| max + 1)
                    .unwrap_or(0)
                    .max(expected.unwrap_or(0));
                let mut dense = vec![String::new(); width];
                for (index, name) in map {
                    dense[index] = name;
                }
                dense
            }
            CompositeRefs::None => Vec::new(),
        };

        names.into_iter().map(|name| name.trim().to_string()).collect()
    }
}

/// Ordered child names of a definition.
pub fn extract_composite_names(definition: &Value, expected: Option<usize>) -> Vec<String> {
    CompositeRefs::parse(definition).into_names(expected)
}

/// A node is scalar when none of its child slots names a composite.
pub fn is_scalar(names: &[String]) -> bool {
    names.iter().all(|name| name.trim().is_empty())
}

fn string_list(object: &Map<String, Value>, field: &str) -> Option<Vec<String>> {
    object
        .get(field)?
        .as_array()?
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect()
}

fn entry_list(value: Option<&Value>) -> Option<Vec<String>> {
    value?
        .as_array()?
        .iter()
        .map(|item| match item {
            Value::String(name) => Some(name.clone()),
            Value::Object(entry) => entry.get("name")?.as_str().map(str::to_string),
            _ => None,
        })
        .collect()
}

fn index_map(value: Option<&Value>) -> Option<BTreeMap<usize, String>> {
    value?
        .as_object()?
        .iter()
        .map(|(key, name)| {
            let index = key
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|index| *index < MAX_COMPOSITE_SLOTS)?;
            Some((index, name.as_str()?.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_primary_field() {
        let def = json!({"name": "A", "composite_names": ["B", ""]});
        assert_eq!(CompositeRefs::parse(&def), CompositeRefs::Names(names(&["B", ""])));
        assert_eq!(extract_composite_names(&def, None), names(&["B", ""]));
    }

    #[test]
    fn test_primary_wins_over_legacy() {
        let def = json!({"composite_names": ["B"], "compositeNames": ["X"], "composites": ["Y"]});
        assert_eq!(extract_composite_names(&def, None), names(&["B"]));
    }

    #[test]
    fn test_legacy_camel_case_field() {
        let def = json!({"compositeNames": ["", "C"]});
        assert!(matches!(CompositeRefs::parse(&def), CompositeRefs::LegacyNames(_)));
        assert_eq!(extract_composite_names(&def, None), names(&["", "C"]));
    }

    #[test]
    fn test_malformed_primary_falls_through() {
        let def = json!({"composite_names": ["B", 7], "compositeNames": ["C"]});
        assert_eq!(extract_composite_names(&def, None), names(&["C"]));
    }

    #[test]
    fn test_mixed_entries() {
        let def = json!({"composites": ["B", {"name": "C", "extra": 1}, ""]});
        assert!(matches!(CompositeRefs::parse(&def), CompositeRefs::Entries(_)));
        assert_eq!(extract_composite_names(&def, None), names(&["B", "C", ""]));
    }

    #[test]
    fn test_entry_without_name_is_unrecognised() {
        let def = json!({"composites": ["B", {"id": 3}]});
        assert_eq!(CompositeRefs::parse(&def), CompositeRefs::None);
        assert!(extract_composite_names(&def, None).is_empty());
    }

    #[test]
    fn test_sparse_map_densified() {
        let def = json!({"composites": {"2": "C", "0": "A"}});
        assert!(CompositeRefs::parse(&def).needs_dimensions());
        assert_eq!(extract_composite_names(&def, None), names(&["A", "", "C"]));
    }

    #[test]
    fn test_sparse_map_sized_by_expected_dimensions() {
        let def = json!({"composites": {"1": "B"}});
        assert_eq!(extract_composite_names(&def, Some(4)), names(&["", "B", "", ""]));
        // Keys beyond the expected count still widen the list.
        assert_eq!(extract_composite_names(&def, Some(1)), names(&["", "B"]));
    }

    #[test]
    fn test_empty_sparse_map_uses_expected_only() {
        let def = json!({"composites": {}});
        assert_eq!(extract_composite_names(&def, Some(2)), names(&["", ""]));
        assert!(extract_composite_names(&def, None).is_empty());
    }

    #[test]
    fn test_sparse_map_with_bad_key_is_unrecognised() {
        let def = json!({"composites": {"x": "B"}});
        assert_eq!(CompositeRefs::parse(&def), CompositeRefs::None);
    }

    #[test]
    fn test_sparse_key_at_usize_max_is_unrecognised() {
        let def = json!({"composites": {"18446744073709551615": "B"}});
        assert_eq!(CompositeRefs::parse(&def), CompositeRefs::None);
        assert!(extract_composite_names(&def, None).is_empty());
    }

    #[test]
    fn test_sparse_key_past_slot_limit_is_unrecognised() {
        let def = json!({"composites": {"0": "A", "100000000000": "B"}});
        assert_eq!(CompositeRefs::parse(&def), CompositeRefs::None);
        assert!(extract_composite_names(&def, Some(2)).is_empty());

        let edge = MAX_COMPOSITE_SLOTS.to_string();
        assert_eq!(
            CompositeRefs::parse(&json!({"composites": {edge: "B"}})),
            CompositeRefs::None
        );
    }

    #[test]
    fn test_sparse_key_below_slot_limit_is_kept() {
        let last = (MAX_COMPOSITE_SLOTS - 1).to_string();
        let extracted = extract_composite_names(&json!({"composites": {last: "Z"}}), None);
        assert_eq!(extracted.len(), MAX_COMPOSITE_SLOTS);
        assert_eq!(extracted.last().map(String::as_str), Some("Z"));
    }

    #[test]
    fn test_unknown_shapes_are_scalar() {
        for def in [json!({"name": "A"}), json!({"composites": 5}), json!("A"), json!(null)] {
            let extracted = extract_composite_names(&def, Some(3));
            assert!(extracted.is_empty(), "{} should have no children", def);
            assert!(is_scalar(&extracted));
        }
    }

    #[test]
    fn test_names_trimmed() {
        let def = json!({"composite_names": [" B ", "   "]});
        let extracted = extract_composite_names(&def, None);
        assert_eq!(extracted, names(&["B", ""]));
        assert!(!is_scalar(&extracted));
    }

    #[test]
    fn test_scalar_when_all_empty() {
        let def = json!({"composite_names": ["", ""]});
        assert!(is_scalar(&extract_composite_names(&def, None)));
    }

    #[test]
    fn test_extraction_is_pure() {
        let def = json!({"composites": {"3": "D", "1": "B"}, "feature_name": "f"});
        let first = extract_composite_names(&def, Some(5));
        let second = extract_composite_names(&def, Some(5));
        assert_eq!(first, second);
    }
}

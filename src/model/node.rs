use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub type NodeId = usize;

/// One entry of a resolved tree, in pre-order.
///
/// `name` holds the slash-joined path from the root (`/A/B`), so a child's
/// name always starts with its parent's name. The root has no parent and
/// is serialized with `parent: -1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    #[serde(serialize_with = "serialize_parent", deserialize_with = "deserialize_parent")]
    pub parent: Option<NodeId>,
    pub name: String,
    pub scalar: bool,
}

impl Node {
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Last path segment, the name shown for this node.
    pub fn label(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }
}

fn serialize_parent<S: Serializer>(parent: &Option<NodeId>, serializer: S) -> Result<S::Ok, S::Error> {
    match parent {
        Some(id) => serializer.serialize_i64(*id as i64),
        None => serializer.serialize_i64(-1),
    }
}

fn deserialize_parent<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NodeId>, D::Error> {
    let raw = i64::deserialize(deserializer)?;
    if raw < 0 {
        Ok(None)
    } else {
        Ok(Some(raw as NodeId))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_parent_serializes_as_minus_one() {
        let node = Node {
            id: 0,
            parent: None,
            name: "/A".to_string(),
            scalar: false,
        };
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": 0, "parent": -1, "name": "/A", "scalar": false})
        );

        let parsed: Node = serde_json::from_value(json).unwrap();
        assert!(parsed.is_root());
    }

    #[test]
    fn test_label_is_last_segment() {
        let node = Node {
            id: 2,
            parent: Some(0),
            name: "/A/A_1".to_string(),
            scalar: true,
        };
        assert_eq!(node.label(), "A_1");
    }
}

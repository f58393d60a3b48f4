//! Nodes, edges and right-to-exist records of the graph context.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::value::Value;

/// Caller-supplied attributes on entities and relations.
pub type Attributes = BTreeMap<String, Value>;

/// Attribute keys set by the context itself. Callers cannot override them.
pub const RESERVED_KEYS: &[&str] = &["created_at", "lifecycle_status"];

/// Attribute key carrying intention metadata for the recorded event.
pub const INTENTION_KEY: &str = "intention";

/// Lifecycle status of every freshly created entity.
pub const STATUS_ACTIVE: &str = "active";

/// Lifecycle status set by Ω.
pub const STATUS_RETURNED: &str = "returned";

/// A named node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entity {
    pub name: String,
    /// Seconds since the UNIX epoch, set once at creation.
    pub created_at: u64,
    pub lifecycle_status: String,
    pub attributes: Attributes,
}

impl Entity {
    pub(crate) fn new(name: impl Into<String>, created_at: u64) -> Self {
        Self {
            name: name.into(),
            created_at,
            lifecycle_status: STATUS_ACTIVE.to_string(),
            attributes: Attributes::new(),
        }
    }

    /// Whether this is one of the canonical operator entities.
    pub fn is_system(&self) -> bool {
        self.attributes.get("system") == Some(&Value::Bool(true))
    }

    /// Look up an attribute, including the reserved ones.
    pub fn attribute(&self, key: &str) -> Option<Value> {
        match key {
            "created_at" => i64::try_from(self.created_at).ok().map(Value::Int),
            "lifecycle_status" => Some(Value::str(&self.lifecycle_status)),
            _ => self.attributes.get(key).cloned(),
        }
    }

    /// Merge caller attributes. Reserved keys are dropped.
    pub(crate) fn merge(&mut self, attrs: Attributes) {
        for (key, value) in attrs {
            if !RESERVED_KEYS.contains(&key.as_str()) {
                self.attributes.insert(key, value);
            }
        }
    }
}

/// A directed, typed edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Relation {
    pub id: String,
    pub source: String,
    pub target: String,
    /// Relation type, `Λ` unless the caller says otherwise.
    #[serde(rename = "type")]
    pub kind: String,
    pub intentions: Vec<String>,
    /// Name of the owning context.
    pub context: String,
    pub attributes: Attributes,
    pub created_at: u64,
}

/// Deterministic edge id for a `(source, target, type)` triple.
pub fn edge_id(source: &str, target: &str, kind: &str) -> String {
    format!("{source}→{target}({kind})")
}

/// A right-to-exist grant, appended once per `add_entity` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HabeasRecord {
    pub subject: String,
    pub right_type: String,
    pub granted_by: String,
    pub granted_at: u64,
    pub context: String,
}

/// Pull the intention list out of an attribute map.
///
/// A string yields one intention, a list yields each of its scalar items.
pub(crate) fn take_intentions(attrs: &mut Attributes) -> Vec<String> {
    match attrs.remove(INTENTION_KEY) {
        Some(Value::List(items)) => items.iter().filter_map(Value::as_name).collect(),
        Some(other) => other.as_name().into_iter().collect(),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_discards_reserved_keys() {
        let mut entity = Entity::new("sun", 100);
        let mut attrs = Attributes::new();
        attrs.insert("created_at".into(), Value::Int(1));
        attrs.insert("lifecycle_status".into(), Value::str("gone"));
        attrs.insert("color".into(), Value::str("gold"));
        entity.merge(attrs);

        assert_eq!(entity.created_at, 100);
        assert_eq!(entity.lifecycle_status, STATUS_ACTIVE);
        assert_eq!(entity.attribute("color"), Some(Value::str("gold")));
        assert_eq!(entity.attribute("created_at"), Some(Value::Int(100)));
        assert!(!entity.attributes.contains_key("created_at"));
    }

    #[test]
    fn edge_ids_are_deterministic() {
        assert_eq!(edge_id("a", "b", "Λ"), "a→b(Λ)");
    }

    #[test]
    fn intentions_come_from_strings_and_lists() {
        let mut attrs = Attributes::new();
        attrs.insert(
            INTENTION_KEY.into(),
            Value::List(vec![Value::str("one"), Value::str("two")]),
        );
        assert_eq!(take_intentions(&mut attrs), ["one", "two"]);
        assert!(attrs.is_empty());

        attrs.insert(INTENTION_KEY.into(), Value::str("single"));
        assert_eq!(take_intentions(&mut attrs), ["single"]);
    }
}

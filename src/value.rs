//! Values: the shared representation of AST nodes and evaluation results.
//!
//! A parsed program is a sequence of [`Value`]s: atoms (strings, numbers) or
//! nested lists whose head is an operator symbol. Evaluation returns values of
//! the same type, so quoted structure and computed results mix freely.

use std::fmt;

use serde::ser::{Serialize, SerializeSeq, Serializer};

/// A LOGOS-κ value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The absent value.
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Strings, symbols and keywords all read as strings.
    Str(String),
    /// A list form `(head operand ...)`.
    List(Vec<Value>),
    /// Inline marker for an expression that failed during program evaluation.
    Error(String),
}

impl Value {
    /// Build a string value.
    pub fn str(s: impl Into<String>) -> Self {
        Self::Str(s.into())
    }

    /// Whether this value evaluates to itself.
    pub fn is_atom(&self) -> bool {
        !matches!(self, Self::List(_))
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// The string payload, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Whether this is a keyword-shaped string (`:name`).
    pub fn is_keyword(&self) -> bool {
        self.as_keyword().is_some()
    }

    /// The key of a `:key` string, without the colon.
    pub fn as_keyword(&self) -> Option<&str> {
        self.as_str().and_then(|s| s.strip_prefix(':'))
    }

    /// Source-like rendering: operand strings quoted and escaped, list heads
    /// and keywords bare.
    pub fn quoted(&self) -> Quoted<'_> {
        Quoted(self)
    }

    /// The entity name this value denotes, if any.
    ///
    /// Strings name themselves, numbers and booleans name their printed
    /// form. Lists, nil and error markers name nothing.
    pub fn as_name(&self) -> Option<String> {
        match self {
            Self::Str(s) => Some(s.clone()),
            Self::Int(i) => Some(i.to_string()),
            Self::Float(f) => Some(f.to_string()),
            Self::Bool(b) => Some(b.to_string()),
            Self::Nil | Self::List(_) | Self::Error(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => write!(f, "nil"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Str(s) => write!(f, "{s}"),
            Self::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
            Self::Error(msg) => write!(f, "ERROR: {msg}"),
        }
    }
}

/// [`Display`](fmt::Display) adapter returned by [`Value::quoted`].
#[derive(Debug, Clone, Copy)]
pub struct Quoted<'a>(&'a Value);

impl fmt::Display for Quoted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Value::Str(s) if self.0.is_keyword() => write!(f, "{s}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    match (i, item) {
                        (0, Value::Str(head)) => write!(f, "{head}")?,
                        (0, _) => write!(f, "{}", item.quoted())?,
                        _ => write!(f, " {}", item.quoted())?,
                    }
                }
                write!(f, ")")
            }
            other => write!(f, "{other}"),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Nil => serializer.serialize_none(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Float(x) => serializer.serialize_f64(*x),
            Self::Str(s) => serializer.serialize_str(s),
            Self::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Error(msg) => serializer.serialize_str(&format!("ERROR: {msg}")),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

// ---------------------------------------------------------------------------
// Keyword arguments
// ---------------------------------------------------------------------------

/// Ordered keyword arguments extracted from `:key value` pairs.
///
/// Re-inserting a key replaces its value in place, so iteration follows the
/// order in which keys were first seen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Keywords {
    entries: Vec<(String, Value)>,
}

impl Keywords {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a key.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Remove a key, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl IntoIterator for Keywords {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_are_not_atoms() {
        assert!(Value::str("a").is_atom());
        assert!(Value::Nil.is_atom());
        assert!(!Value::List(vec![Value::str("Λ")]).is_atom());
    }

    #[test]
    fn names_come_from_scalars() {
        assert_eq!(Value::str("sun").as_name().as_deref(), Some("sun"));
        assert_eq!(Value::Int(7).as_name().as_deref(), Some("7"));
        assert_eq!(Value::Nil.as_name(), None);
        assert_eq!(Value::List(vec![]).as_name(), None);
    }

    #[test]
    fn display_renders_lists_and_markers() {
        let v = Value::List(vec![Value::str("Λ"), Value::str("a"), Value::Int(2)]);
        assert_eq!(v.to_string(), "(Λ a 2)");
        assert_eq!(Value::Error("boom".into()).to_string(), "ERROR: boom");
    }

    #[test]
    fn quoted_rendering_keeps_string_quotes() {
        let v = Value::List(vec![
            Value::str("Λ"),
            Value::str("a"),
            Value::str("say \"hi\""),
            Value::str(":type"),
            Value::Int(2),
            Value::List(vec![Value::str("Α"), Value::str("b")]),
        ]);
        assert_eq!(
            v.quoted().to_string(),
            r#"(Λ "a" "say \"hi\"" :type 2 (Α "b"))"#
        );
        assert_eq!(Value::str("x").quoted().to_string(), "\"x\"");
    }

    #[test]
    fn keyword_accessors() {
        assert_eq!(Value::str(":name").as_keyword(), Some("name"));
        assert!(Value::str(":name").is_keyword());
        assert!(!Value::str("name").is_keyword());
        assert!(!Value::Int(1).is_keyword());
    }

    #[test]
    fn keywords_overwrite_in_place() {
        let mut kw = Keywords::new();
        kw.insert("a", Value::Int(1));
        kw.insert("b", Value::Int(2));
        kw.insert("a", Value::Int(3));
        let keys: Vec<_> = kw.keys().collect();
        assert_eq!(keys, ["a", "b"]);
        assert_eq!(kw.get("a"), Some(&Value::Int(3)));
    }

    #[test]
    fn values_serialize_as_plain_json() {
        let v = Value::List(vec![Value::Nil, Value::Bool(true), Value::str("x")]);
        assert_eq!(serde_json::to_string(&v).unwrap(), r#"[null,true,"x"]"#);
        let e = Value::Error("bad".into());
        assert_eq!(serde_json::to_string(&e).unwrap(), r#""ERROR: bad""#);
    }
}

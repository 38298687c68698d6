//! Ordered attribute records.
//!
//! Column definitions and foreign key specs keep their modifiers in a
//! [`Fluent`] record: an insertion-ordered map from attribute name to a
//! tagged [`Value`]. Typed builder methods on the owning types write into
//! the record and typed getters read it back.

use serde::{Deserialize, Serialize};

/// A tagged attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// SQL NULL.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// String value. Rendered quoted when used as a default.
    String(String),
    /// List of strings (column lists, enum members).
    List(Vec<String>),
    /// Raw SQL expression, rendered verbatim (e.g. `CURRENT_TIMESTAMP`).
    Expression(String),
}

impl Value {
    /// Creates a raw SQL expression value.
    #[must_use]
    pub fn raw(expression: impl Into<String>) -> Self {
        Self::Expression(expression.into())
    }

    /// Returns `true` for [`Value::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the boolean if this is a [`Value::Bool`].
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer if this is a [`Value::Int`].
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the text of a [`Value::String`] or [`Value::Expression`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::Expression(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the items of a [`Value::List`].
    #[must_use]
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Vec<String>> for Value {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

impl From<&[&str]> for Value {
    fn from(value: &[&str]) -> Self {
        Self::List(value.iter().map(ToString::to_string).collect())
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// An insertion-ordered attribute record.
///
/// Setting an existing key replaces its value in place, so the iteration
/// order always reflects the first time each attribute was set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fluent {
    entries: Vec<(String, Value)>,
}

impl Fluent {
    /// Creates an empty record.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Sets an attribute, returning the record for chaining.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
        self
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Removes an attribute, returning its previous value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let position = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(position).1)
    }

    /// Returns whether `key` is present (even if set to [`Value::Null`]).
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Returns `true` only if `key` holds `Value::Bool(true)`.
    #[must_use]
    pub fn get_bool(&self, key: &str) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Returns the text stored under `key`.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Returns the integer stored under `key`.
    #[must_use]
    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_int)
    }

    /// Returns the list stored under `key`.
    #[must_use]
    pub fn get_list(&self, key: &str) -> Option<&[String]> {
        self.get(key).and_then(Value::as_list)
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no attribute is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates attributes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_preserves_insertion_order() {
        let mut attrs = Fluent::new();
        attrs.set("nullable", true).set("default", "draft").set("comment", "x");
        attrs.set("nullable", false);

        let keys: Vec<&str> = attrs.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["nullable", "default", "comment"]);
        assert!(!attrs.get_bool("nullable"));
        assert!(attrs.contains("nullable"));
    }

    #[test]
    fn test_typed_getters() {
        let mut attrs = Fluent::new();
        attrs
            .set("length", 255)
            .set("columns", vec!["a".to_string(), "b".to_string()])
            .set("expr", Value::raw("now()"));

        assert_eq!(attrs.get_int("length"), Some(255));
        assert_eq!(attrs.get_list("columns").map(<[String]>::len), Some(2));
        assert_eq!(attrs.get_str("expr"), Some("now()"));
        assert_eq!(attrs.get_str("missing"), None);
        assert!(!attrs.get_bool("missing"));
    }

    #[test]
    fn test_remove() {
        let mut attrs = Fluent::new();
        attrs.set("unique", true);
        assert_eq!(attrs.remove("unique"), Some(Value::Bool(true)));
        assert_eq!(attrs.remove("unique"), None);
        assert!(attrs.is_empty());
    }

    #[test]
    fn test_option_into_value() {
        assert_eq!(Value::from(None::<&str>), Value::Null);
        assert_eq!(Value::from(Some(3)), Value::Int(3));
    }
}

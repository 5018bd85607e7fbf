//! The ordered YAML value model.
//!
//! `Value` owns its children outright; comparison and rendering dispatch on
//! the variant rather than on a runtime type query. `OrderedMap` is the one
//! piece of machinery that needs care: it must remember insertion order
//! while still offering O(1)-ish lookup, so the key list and the key->value
//! table have to move together or the two can desync.

use hashlink::LinkedHashMap;
use std::fmt;

/// A parsed YAML scalar, sequence, or mapping.
///
/// Integer vs. float is decided by the parser from the source lexeme;
/// there is no separate source-type tag beyond the variant itself.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(OrderedMap),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Value::Null | Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::String(_)
        )
    }

    pub fn as_map(&self) -> Option<&OrderedMap> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// The spelled-out type name used by the "type change" descriptor (spec
    /// §4.11: "from int to string").
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    /// Renders a scalar the way it would appear inline in YAML. Used by the
    /// renderer for leaf values; complex values fall back to structural
    /// inlining (spec §4.11a) instead of this.
    pub fn scalar_display(&self) -> String {
        match self {
            Value::Null => "<nil>".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::String(s) => s.clone(),
            Value::List(_) | Value::Map(_) => String::new(),
        }
    }

    /// A single comparable scalar token, used by identifier extraction
    /// (spec §4.4) and by the list order-detection multiset comparison
    /// (spec §4.8). Non-scalars are not comparable this way.
    pub fn comparable_scalar(&self) -> Option<ScalarToken> {
        match self {
            Value::Null => Some(ScalarToken::Null),
            Value::Bool(b) => Some(ScalarToken::Bool(*b)),
            Value::Int(i) => Some(ScalarToken::Int(*i)),
            Value::Float(f) => Some(ScalarToken::Float(f.to_bits())),
            Value::String(s) => Some(ScalarToken::String(s.clone())),
            Value::List(_) | Value::Map(_) => None,
        }
    }
}

/// A hashable, orderable stand-in for a scalar `Value`, used wherever values
/// need to sit in a `HashMap` key or a multiset (identifiers, order
/// detection).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScalarToken {
    Null,
    Bool(bool),
    Int(i64),
    Float(u64),
    String(String),
}

impl fmt::Display for ScalarToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarToken::Null => write!(f, "null"),
            ScalarToken::Bool(b) => write!(f, "{b}"),
            ScalarToken::Int(i) => write!(f, "{i}"),
            ScalarToken::Float(bits) => write!(f, "{}", f64::from_bits(*bits)),
            ScalarToken::String(s) => write!(f, "{s}"),
        }
    }
}

/// An insertion-ordered mapping from `String` to `Value`.
///
/// The key list and the lookup table are two faces of the same structure,
/// not two structures a caller could desync: every mutator updates both in
/// lockstep.
#[derive(Debug, Clone, Default)]
pub struct OrderedMap {
    entries: LinkedHashMap<String, Value>,
}

impl OrderedMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.entries.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl PartialEq for OrderedMap {
    /// Maps compare equal when their keys match as sets (order is
    /// irrelevant here -- see spec §4.1) and values match pairwise.
    fn eq(&self, other: &Self) -> bool {
        if self.entries.len() != other.entries.len() {
            return false;
        }
        self.entries
            .iter()
            .all(|(k, v)| other.entries.get(k).is_some_and(|ov| ov == v))
    }
}

impl FromIterator<(String, Value)> for OrderedMap {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        let mut map = OrderedMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insertion_order_is_preserved() {
        let mut map = OrderedMap::new();
        map.insert("b", Value::Int(1));
        map.insert("a", Value::Int(2));
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["b", "a"]);
    }

    #[test]
    fn equality_ignores_key_order() {
        let mut left = OrderedMap::new();
        left.insert("a", Value::Int(1));
        left.insert("b", Value::Int(2));

        let mut right = OrderedMap::new();
        right.insert("b", Value::Int(2));
        right.insert("a", Value::Int(1));

        assert_eq!(Value::Map(left), Value::Map(right));
    }

    #[test]
    fn comparable_scalar_distinguishes_types() {
        assert_ne!(
            Value::Int(1).comparable_scalar(),
            Value::String("1".to_string()).comparable_scalar()
        );
    }
}

//! Variable bindings supplied to the renderer
//!
//! Bindings map identifiers to [`Value`]s. Nested maps make dotted paths like
//! `user.role` resolvable. Bindings can be built in code, loaded from TOML or
//! JSON, or assembled from `path=value` assignments.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::Path;

use thiserror::Error;

use crate::parser::VariablePath;

/// Errors that can occur when building or loading bindings
#[derive(Error, Debug)]
pub enum BindingsError {
    #[error("Failed to read bindings file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse bindings TOML: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Failed to parse bindings JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("bindings must be a table/object at the top level")]
    NotAMap,

    #[error("null value at '{path}' has no rendering")]
    Null { path: String },

    #[error("invalid variable path '{path}'")]
    InvalidPath { path: String },

    #[error("cannot assign '{path}': '{at}' is not a map")]
    PathConflict { path: String, at: String },

    #[error("expected PATH=VALUE, got '{0}'")]
    InvalidAssignment(String),

    #[error("unsupported bindings file format: {0}")]
    UnsupportedFormat(String),
}

/// A bound value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Rendered text of a scalar, or `None` for maps and lists
    ///
    /// Strings are returned verbatim, booleans as `true`/`false`, integers
    /// in canonical decimal and floats in Rust's shortest round-trip form
    /// (`1.5`, `2`, `NaN`, `inf`).
    pub fn as_scalar_str(&self) -> Option<Cow<'_, str>> {
        match self {
            Value::String(s) => Some(Cow::Borrowed(s.as_str())),
            Value::Integer(n) => Some(Cow::Owned(n.to_string())),
            Value::Float(f) => Some(Cow::Owned(f.to_string())),
            Value::Bool(b) => Some(Cow::Borrowed(if *b { "true" } else { "false" })),
            Value::List(_) | Value::Map(_) => None,
        }
    }

    pub fn is_scalar(&self) -> bool {
        !matches!(self, Value::List(_) | Value::Map(_))
    }

    fn from_json(value: serde_json::Value, path: &str) -> Result<Self, BindingsError> {
        use serde_json::Value as Json;

        Ok(match value {
            Json::Null => {
                return Err(BindingsError::Null {
                    path: path.to_string(),
                })
            }
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(s) => Value::String(s),
            Json::Array(items) => Value::List(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(i, item)| Value::from_json(item, &format!("{}[{}]", path, i)))
                    .collect::<Result<_, _>>()?,
            ),
            Json::Object(map) => Value::Map(
                map.into_iter()
                    .map(|(k, v)| {
                        let child = join_path(path, &k);
                        Value::from_json(v, &child).map(|v| (k, v))
                    })
                    .collect::<Result<_, _>>()?,
            ),
        })
    }

    fn from_toml(value: toml::Value) -> Self {
        match value {
            toml::Value::String(s) => Value::String(s),
            toml::Value::Integer(i) => Value::Integer(i),
            toml::Value::Float(f) => Value::Float(f),
            toml::Value::Boolean(b) => Value::Bool(b),
            toml::Value::Datetime(dt) => Value::String(dt.to_string()),
            toml::Value::Array(items) => Value::List(items.into_iter().map(Value::from_toml).collect()),
            toml::Value::Table(table) => Value::Map(
                table
                    .into_iter()
                    .map(|(k, v)| (k, Value::from_toml(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Value::Map(map)
    }
}

impl From<Bindings> for Value {
    fn from(bindings: Bindings) -> Self {
        Value::Map(bindings.values)
    }
}

/// Top-level variable bindings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    values: BTreeMap<String, Value>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.values.keys().map(|k| k.as_str())
    }

    /// Look up a dotted path through nested maps
    ///
    /// Returns `None` when any component is missing or when an intermediate
    /// value is not a map.
    pub fn resolve(&self, path: &VariablePath) -> Option<&Value> {
        let (first, rest) = path.components().split_first()?;
        rest.iter().try_fold(self.values.get(first)?, |value, key| match value {
            Value::Map(map) => map.get(key),
            _ => None,
        })
    }

    /// Assign a value at a dotted path, creating intermediate maps
    pub fn set_path(&mut self, path: &str, value: impl Into<Value>) -> Result<(), BindingsError> {
        let components = split_path(path)?;
        let (last, parents) = components
            .split_last()
            .ok_or_else(|| BindingsError::InvalidPath {
                path: path.to_string(),
            })?;

        let mut map = &mut self.values;
        for (depth, key) in parents.iter().enumerate() {
            let entry = map
                .entry(key.to_string())
                .or_insert_with(|| Value::Map(BTreeMap::new()));
            map = match entry {
                Value::Map(inner) => inner,
                _ => {
                    return Err(BindingsError::PathConflict {
                        path: path.to_string(),
                        at: components[..=depth].join("."),
                    })
                }
            };
        }
        map.insert(last.to_string(), value.into());
        Ok(())
    }

    /// Apply a `path=value` assignment; the value is always a string
    pub fn parse_assignment(&mut self, assignment: &str) -> Result<(), BindingsError> {
        let (path, value) = assignment
            .split_once('=')
            .ok_or_else(|| BindingsError::InvalidAssignment(assignment.to_string()))?;
        self.set_path(path.trim(), value)
    }

    /// Merge another set of bindings; nested maps merge recursively and
    /// `other` wins on conflicts
    pub fn merge(&mut self, other: Bindings) {
        merge_maps(&mut self.values, other.values);
    }

    /// Load bindings from a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, BindingsError> {
        let table: toml::Table = toml::from_str(content)?;
        Ok(Self {
            values: table
                .into_iter()
                .map(|(k, v)| (k, Value::from_toml(v)))
                .collect(),
        })
    }

    /// Load bindings from a JSON object
    pub fn from_json_str(content: &str) -> Result<Self, BindingsError> {
        let json: serde_json::Value = serde_json::from_str(content)?;
        Self::from_json_value(json)
    }

    /// Convert a parsed JSON object into bindings
    pub fn from_json_value(json: serde_json::Value) -> Result<Self, BindingsError> {
        match Value::from_json(json, "")? {
            Value::Map(values) => Ok(Self { values }),
            _ => Err(BindingsError::NotAMap),
        }
    }

    /// Load bindings from a `.toml` or `.json` file
    pub fn from_file(path: &Path) -> Result<Self, BindingsError> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            Some("json") => Self::from_json_str(&content),
            _ => Err(BindingsError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Bindings {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

fn merge_maps(into: &mut BTreeMap<String, Value>, from: BTreeMap<String, Value>) {
    for (key, value) in from {
        match (into.get_mut(&key), value) {
            (Some(Value::Map(existing)), Value::Map(incoming)) => merge_maps(existing, incoming),
            (_, value) => {
                into.insert(key, value);
            }
        }
    }
}

fn split_path(path: &str) -> Result<Vec<&str>, BindingsError> {
    let components: Vec<&str> = path.split('.').collect();
    let valid = components.iter().all(|c| is_identifier(c));
    if valid {
        Ok(components)
    } else {
        Err(BindingsError::InvalidPath {
            path: path.to_string(),
        })
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn join_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> VariablePath {
        VariablePath::new(s.split('.').map(String::from).collect())
    }

    #[test]
    fn test_scalar_formatting() {
        assert_eq!(Value::from("x").as_scalar_str().unwrap(), "x");
        assert_eq!(Value::from(42).as_scalar_str().unwrap(), "42");
        assert_eq!(Value::from(-7i64).as_scalar_str().unwrap(), "-7");
        assert_eq!(Value::from(1.5).as_scalar_str().unwrap(), "1.5");
        assert_eq!(Value::from(2.0).as_scalar_str().unwrap(), "2");
        assert_eq!(Value::from(true).as_scalar_str().unwrap(), "true");
        assert_eq!(Value::from(false).as_scalar_str().unwrap(), "false");
        assert!(Value::List(vec![]).as_scalar_str().is_none());
        assert!(Value::Map(BTreeMap::new()).as_scalar_str().is_none());
    }

    #[test]
    fn test_non_finite_and_large_floats() {
        assert_eq!(Value::from(f64::NAN).as_scalar_str().unwrap(), "NaN");
        assert_eq!(Value::from(f64::INFINITY).as_scalar_str().unwrap(), "inf");
        assert_eq!(Value::from(f64::NEG_INFINITY).as_scalar_str().unwrap(), "-inf");
        assert_eq!(Value::from(1e21).as_scalar_str().unwrap(), "1000000000000000000000");
    }

    #[test]
    fn test_json_integer_beyond_i64_is_float() {
        let b = Bindings::from_json_str(r#"{"big": 18446744073709551615, "max": 9223372036854775807}"#)
            .unwrap();
        assert!(matches!(b.get("big"), Some(Value::Float(_))));
        assert_eq!(b.get("big").unwrap().as_scalar_str().unwrap(), "18446744073709552000");
        assert_eq!(b.get("max"), Some(&Value::Integer(i64::MAX)));
    }

    #[test]
    fn test_toml_datetimes_load_as_strings() {
        let b = Bindings::from_toml_str("when = 1979-05-27T07:32:00Z\nday = 1979-05-27").unwrap();
        assert_eq!(b.get("when"), Some(&Value::from("1979-05-27T07:32:00Z")));
        assert_eq!(b.get("day"), Some(&Value::from("1979-05-27")));
    }

    #[test]
    fn test_resolve_nested() {
        let mut b = Bindings::new();
        b.set_path("user.role", "Developer").unwrap();
        assert_eq!(b.resolve(&path("user.role")), Some(&Value::from("Developer")));
        assert!(matches!(b.resolve(&path("user")), Some(Value::Map(_))));
        assert_eq!(b.resolve(&path("user.name")), None);
        assert_eq!(b.resolve(&path("user.role.x")), None);
    }

    #[test]
    fn test_resolve_does_not_traverse_lists() {
        let b = Bindings::new().with("items", vec![Value::from("a")]);
        assert_eq!(b.resolve(&path("items.first")), None);
    }

    #[test]
    fn test_set_path_conflict() {
        let mut b = Bindings::new().with("a", 1);
        let err = b.set_path("a.b", "x").unwrap_err();
        assert!(matches!(err, BindingsError::PathConflict { ref at, .. } if at == "a"));
    }

    #[test]
    fn test_set_path_invalid() {
        let mut b = Bindings::new();
        assert!(matches!(b.set_path("a..b", 1), Err(BindingsError::InvalidPath { .. })));
        assert!(matches!(b.set_path("", 1), Err(BindingsError::InvalidPath { .. })));
        assert!(matches!(b.set_path("9a", 1), Err(BindingsError::InvalidPath { .. })));
    }

    #[test]
    fn test_parse_assignment() {
        let mut b = Bindings::new();
        b.parse_assignment("user.name=John=Doe").unwrap();
        assert_eq!(b.resolve(&path("user.name")), Some(&Value::from("John=Doe")));
        assert!(matches!(
            b.parse_assignment("novalue"),
            Err(BindingsError::InvalidAssignment(_))
        ));
    }

    #[test]
    fn test_merge_nested() {
        let mut base = Bindings::new();
        base.set_path("user.name", "John").unwrap();
        base.set_path("user.role", "Dev").unwrap();
        let mut over = Bindings::new();
        over.set_path("user.role", "Lead").unwrap();
        base.merge(over);
        assert_eq!(base.resolve(&path("user.name")), Some(&Value::from("John")));
        assert_eq!(base.resolve(&path("user.role")), Some(&Value::from("Lead")));
    }

    #[test]
    fn test_from_toml() {
        let b = Bindings::from_toml_str(
            r#"
            name = "John"
            age = 30
            ratio = 0.5
            active = true

            [user]
            role = "Developer"
            "#,
        )
        .unwrap();
        assert_eq!(b.get("age"), Some(&Value::Integer(30)));
        assert_eq!(b.get("ratio"), Some(&Value::Float(0.5)));
        assert_eq!(b.resolve(&path("user.role")), Some(&Value::from("Developer")));
    }

    #[test]
    fn test_from_json() {
        let b = Bindings::from_json_str(r#"{"name": "John", "n": 3, "tags": ["a"], "u": {"x": 1.25}}"#)
            .unwrap();
        assert_eq!(b.get("n"), Some(&Value::Integer(3)));
        assert_eq!(b.resolve(&path("u.x")), Some(&Value::Float(1.25)));
        assert_eq!(b.len(), 4);
    }

    #[test]
    fn test_json_null_rejected() {
        let err = Bindings::from_json_str(r#"{"user": {"name": null}}"#).unwrap_err();
        assert!(matches!(err, BindingsError::Null { ref path } if path == "user.name"));
    }

    #[test]
    fn test_json_top_level_must_be_object() {
        assert!(matches!(
            Bindings::from_json_str("[1, 2]"),
            Err(BindingsError::NotAMap)
        ));
    }

    #[test]
    fn test_from_iterator() {
        let b: Bindings = [("a", "x"), ("b", "y")].into_iter().collect();
        assert_eq!(b.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}

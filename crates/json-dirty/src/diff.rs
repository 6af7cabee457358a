//! Flattened diff output.
//!
//! Keyed composites report assignments as a `dotted.path -> value` map and
//! deletions as a list of dotted paths. Sequences report both as plain lists
//! of element values, since positions shift under mutation and are not
//! stable keys.
//!
//! Every type here serializes to the JSON shape a persistence layer expects:
//!
//! ```
//! use json_dirty::{wrap, ChangeTracking};
//! use serde_json::json;
//!
//! let mut doc = wrap(json!({"object": {"field1": "hi"}, "tags": ["a"]}));
//! doc.remove_at("/object/field1").unwrap();
//! doc.set_at("/tags/-", json!("b")).unwrap();
//!
//! let changes = doc.changes();
//! assert_eq!(
//!     serde_json::to_value(&changes).unwrap(),
//!     json!({
//!         "assignments": {"tags": ["b"]},
//!         "deletions": ["object.field1"],
//!     })
//! );
//! ```

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::path;

/// Assignments since the last checkpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Assignments {
    /// Dotted path to last written value, in first-write order.
    Keyed(Map<String, Value>),
    /// Written element values in write order.
    Sequence(Vec<Value>),
}

impl Assignments {
    pub fn is_empty(&self) -> bool {
        match self {
            Assignments::Keyed(map) => map.is_empty(),
            Assignments::Sequence(values) => values.is_empty(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Assignments::Keyed(map) => map.len(),
            Assignments::Sequence(values) => values.len(),
        }
    }

    /// Looks up a dotted path. Always `None` for sequences.
    pub fn get(&self, path: &str) -> Option<&Value> {
        match self {
            Assignments::Keyed(map) => map.get(path),
            Assignments::Sequence(_) => None,
        }
    }

    pub fn as_keyed(&self) -> Option<&Map<String, Value>> {
        match self {
            Assignments::Keyed(map) => Some(map),
            Assignments::Sequence(_) => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Assignments::Keyed(_) => None,
            Assignments::Sequence(values) => Some(values),
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            Assignments::Keyed(map) => Value::Object(map),
            Assignments::Sequence(values) => Value::Array(values),
        }
    }
}

/// A single flattened deletion inside a keyed composite.
#[derive(Debug, Clone, PartialEq)]
pub enum Deletion {
    /// A removed field, or a removed scalar element rendered as
    /// `parent.value`.
    Path(String),
    /// A removed composite element. It has no single-path form, so it is
    /// reported under its parent path with its fields intact; serializes as
    /// `{path: value}`.
    Element { path: String, value: Value },
}

impl Deletion {
    pub fn path(&self) -> &str {
        match self {
            Deletion::Path(path) | Deletion::Element { path, .. } => path,
        }
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Deletion::Path(_) => None,
            Deletion::Element { value, .. } => Some(value),
        }
    }

    /// Prefixes the entry with its parent key.
    pub(crate) fn under(self, parent: &str) -> Self {
        match self {
            Deletion::Path(child) => Deletion::Path(path::join(parent, &child)),
            Deletion::Element { path: child, value } => Deletion::Element {
                path: path::join(parent, &child),
                value,
            },
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Deletion::Path(path) => Value::String(path.clone()),
            Deletion::Element { path, value } => {
                let mut map = Map::new();
                map.insert(path.clone(), value.clone());
                Value::Object(map)
            }
        }
    }
}

impl Serialize for Deletion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Deletion::Path(path) => serializer.serialize_str(path),
            Deletion::Element { path, value } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(path, value)?;
                map.end()
            }
        }
    }
}

/// Deletions since the last checkpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Deletions {
    /// Removed fields and nested removals, in discovery order.
    Keyed(Vec<Deletion>),
    /// Removed element values, in removal order.
    Sequence(Vec<Value>),
}

impl Deletions {
    pub fn is_empty(&self) -> bool {
        match self {
            Deletions::Keyed(entries) => entries.is_empty(),
            Deletions::Sequence(values) => values.is_empty(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Deletions::Keyed(entries) => entries.len(),
            Deletions::Sequence(values) => values.len(),
        }
    }

    /// Returns `true` if a keyed entry reports exactly `path`.
    pub fn contains_path(&self, path: &str) -> bool {
        match self {
            Deletions::Keyed(entries) => entries
                .iter()
                .any(|d| matches!(d, Deletion::Path(p) if p == path)),
            Deletions::Sequence(_) => false,
        }
    }

    /// Dotted paths of keyed entries, in order.
    pub fn paths(&self) -> Vec<&str> {
        match self {
            Deletions::Keyed(entries) => entries.iter().map(Deletion::path).collect(),
            Deletions::Sequence(_) => Vec::new(),
        }
    }

    pub fn as_keyed(&self) -> Option<&[Deletion]> {
        match self {
            Deletions::Keyed(entries) => Some(entries),
            Deletions::Sequence(_) => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Deletions::Keyed(_) => None,
            Deletions::Sequence(values) => Some(values),
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            Deletions::Keyed(entries) => {
                Value::Array(entries.iter().map(Deletion::to_value).collect())
            }
            Deletions::Sequence(values) => Value::Array(values),
        }
    }
}

/// Both halves of a diff, as handed to a persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeSet {
    pub assignments: Assignments,
    pub deletions: Deletions,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty() && self.deletions.is_empty()
    }
}

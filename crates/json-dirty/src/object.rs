//! Tracked keyed composite.
//!
//! Reads pass straight through to the owned entries. `set` and `remove`
//! perform the real mutation and append to the change log; nothing else
//! is intercepted. Mutable access is only handed out for tracked children
//! (whose own logs then record) and for untracked composites, so no write
//! to a tracked field can bypass the log.

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::array::TrackedArray;
use crate::diff::{Assignments, Deletion, Deletions};
use crate::log::{ChangeLog, ChangeTracking};
use crate::node::Node;
use crate::path;
use crate::wrap::{adopt, wrap_value, Markers};

#[derive(Debug, Clone)]
pub struct TrackedObject {
    entries: IndexMap<String, Node>,
    log: ChangeLog<String, String>,
    markers: Markers,
}

impl TrackedObject {
    pub(crate) fn build(map: Map<String, Value>, excluded: &[String], markers: &Markers) -> Self {
        let entries = map
            .into_iter()
            .map(|(key, value)| {
                let node = if excluded.iter().any(|e| e == &key) {
                    Node::Plain(value)
                } else {
                    wrap_value(value, &[], markers)
                };
                (key, node)
            })
            .collect();
        Self {
            entries,
            log: ChangeLog::new(),
            markers: markers.clone(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Assigns `value` to `key` and records the write.
    ///
    /// Eligible plain values are wrapped first. Every call records, even if
    /// the value is unchanged. Returns the replaced node.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Node>) -> Option<Node> {
        let key = key.into();
        let node = adopt(value.into(), &self.markers);
        let snapshot = node.to_value();
        let previous = self.entries.insert(key.clone(), node);
        self.log.record_assignment(key, snapshot);
        previous
    }

    /// Deletes `key` and records the key name.
    ///
    /// The key is recorded whether or not it was present; the delete itself
    /// behaves like a plain map removal. Remaining keys keep their order.
    pub fn remove(&mut self, key: &str) -> Option<Node> {
        self.log.record_deletion(key.to_string());
        self.entries.shift_remove(key)
    }

    pub fn object_mut(&mut self, key: &str) -> Option<&mut TrackedObject> {
        self.entries.get_mut(key).and_then(Node::as_object_mut)
    }

    pub fn array_mut(&mut self, key: &str) -> Option<&mut TrackedArray> {
        self.entries.get_mut(key).and_then(Node::as_array_mut)
    }

    /// Mutable access to an untracked composite member (excluded or opaque).
    ///
    /// Writes through this reference are never recorded. Scalars are not
    /// reachable here; assign them with [`set`](Self::set).
    pub fn untracked_mut(&mut self, key: &str) -> Option<&mut Value> {
        match self.entries.get_mut(key)? {
            Node::Plain(value @ (Value::Object(_) | Value::Array(_))) => Some(value),
            _ => None,
        }
    }

    pub(crate) fn node_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.entries.get_mut(key)
    }

    pub fn to_value(&self) -> Value {
        Value::Object(
            self.entries
                .iter()
                .map(|(k, v)| (k.clone(), v.to_value()))
                .collect(),
        )
    }

    pub fn into_value(self) -> Value {
        Value::Object(
            self.entries
                .into_iter()
                .map(|(k, v)| (k, v.into_value()))
                .collect(),
        )
    }

    /// Flattened assignments: own writes (last write wins) plus the dotted
    /// assignments of every dirty tracked member.
    ///
    /// An own-assigned key reports the member's current value. If that
    /// member was edited afterwards, its nested paths are reported too, as
    /// with any dirty member, so they line up with its nested deletions.
    /// Sequence members are reported as the list of their written element
    /// values under their own key.
    pub fn assignment_map(&self) -> Map<String, Value> {
        let mut out = Map::new();
        for assignment in self.log.assignments() {
            out.insert(assignment.property.clone(), assignment.value.clone());
        }
        for (key, value) in out.iter_mut() {
            if let Some(node) = self.entries.get(key) {
                *value = node.to_value();
            }
        }
        for (key, node) in &self.entries {
            if !node.is_dirty() {
                continue;
            }
            match node {
                Node::Array(arr) => {
                    out.insert(key.clone(), Value::Array(arr.assignment_values()));
                }
                Node::Object(obj) => {
                    for (child, value) in obj.assignment_map() {
                        out.insert(path::join(key, &child), value);
                    }
                }
                Node::Plain(_) => {}
            }
        }
        out
    }

    /// Flattened deletions: own deleted keys, then the entries of every
    /// dirty tracked member prefixed with the member key.
    ///
    /// Elements removed from a sequence member render as `key.value` when
    /// scalar. Composite elements are reported as [`Deletion::Element`] so
    /// their fields survive.
    pub fn deletion_entries(&self) -> Vec<Deletion> {
        let mut out: Vec<Deletion> = self
            .log
            .deletions()
            .iter()
            .cloned()
            .map(Deletion::Path)
            .collect();
        for (key, node) in &self.entries {
            if !node.is_dirty() {
                continue;
            }
            match node {
                Node::Object(obj) => {
                    out.extend(obj.deletion_entries().into_iter().map(|d| d.under(key)));
                }
                Node::Array(arr) => {
                    out.extend(arr.removed().iter().map(|removed| {
                        match path::element_label(removed) {
                            Some(label) => Deletion::Path(path::join(key, &label)),
                            None => Deletion::Element {
                                path: key.clone(),
                                value: removed.to_value(),
                            },
                        }
                    }));
                }
                Node::Plain(_) => {}
            }
        }
        out
    }
}

impl ChangeTracking for TrackedObject {
    fn reset(&mut self) {
        for node in self.entries.values_mut() {
            node.reset();
        }
        self.log.clear();
    }

    fn is_dirty(&self) -> bool {
        !self.log.is_empty() || self.entries.values().any(Node::is_dirty)
    }

    fn assignments(&self) -> Assignments {
        Assignments::Keyed(self.assignment_map())
    }

    fn deletions(&self) -> Deletions {
        Deletions::Keyed(self.deletion_entries())
    }
}

impl Serialize for TrackedObject {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, node) in &self.entries {
            map.serialize_entry(key, node)?;
        }
        map.end()
    }
}

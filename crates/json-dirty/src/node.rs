//! The tracked value tree.
//!
//! A [`Node`] is one of:
//!
//! - [`Node::Plain`]: a value that is not tracked. Scalars, `null`, opaque
//!   temporal values, and composites excluded at wrap time.
//! - [`Node::Object`]: a tracked keyed composite.
//! - [`Node::Array`]: a tracked ordered composite.
//!
//! Tracking state lives next to the owned storage, never inside it, so a
//! node serializes to exactly the JSON it holds.

use std::ops::Index;

use serde::{Serialize, Serializer};
use serde_json::Value;
use tracing::debug;

use crate::array::TrackedArray;
use crate::diff::{Assignments, ChangeSet, Deletions};
use crate::error::TrackError;
use crate::log::ChangeTracking;
use crate::object::TrackedObject;
use crate::path::{parse_index, parse_pointer};

static NULL: Node = Node::Plain(Value::Null);

#[derive(Debug, Clone)]
pub enum Node {
    Plain(Value),
    Object(TrackedObject),
    Array(TrackedArray),
}

impl Node {
    /// Returns `true` for tracked composites.
    pub fn is_tracked(&self) -> bool {
        !matches!(self, Node::Plain(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Node::Plain(Value::Null))
    }

    pub fn as_plain(&self) -> Option<&Value> {
        match self {
            Node::Plain(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_plain().and_then(Value::as_str)
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.as_plain().and_then(Value::as_bool)
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_plain().and_then(Value::as_i64)
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_plain().and_then(Value::as_f64)
    }

    pub fn as_object(&self) -> Option<&TrackedObject> {
        match self {
            Node::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut TrackedObject> {
        match self {
            Node::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&TrackedArray> {
        match self {
            Node::Array(arr) => Some(arr),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut TrackedArray> {
        match self {
            Node::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Clones the raw JSON this node holds.
    pub fn to_value(&self) -> Value {
        match self {
            Node::Plain(value) => value.clone(),
            Node::Object(obj) => obj.to_value(),
            Node::Array(arr) => arr.to_value(),
        }
    }

    /// Drops tracking state and returns the raw JSON.
    pub fn into_value(self) -> Value {
        match self {
            Node::Plain(value) => value,
            Node::Object(obj) => obj.into_value(),
            Node::Array(arr) => arr.into_value(),
        }
    }

    /// Structural comparison against raw JSON, ignoring tracking state.
    pub fn eq_value(&self, other: &Value) -> bool {
        match (self, other) {
            (Node::Plain(value), _) => value == other,
            (Node::Object(obj), Value::Object(map)) => {
                obj.len() == map.len()
                    && obj
                        .iter()
                        .all(|(k, node)| map.get(k).is_some_and(|v| node.eq_value(v)))
            }
            (Node::Array(arr), Value::Array(items)) => {
                arr.len() == items.len()
                    && arr.iter().zip(items).all(|(node, v)| node.eq_value(v))
            }
            _ => false,
        }
    }

    /// Resolves a JSON Pointer through tracked composites.
    ///
    /// Resolution stops at untracked values: a pointer that continues into
    /// a [`Node::Plain`] composite yields `None`. Use
    /// [`to_value`](Self::to_value) to read inside excluded subtrees.
    pub fn pointer(&self, pointer: &str) -> Option<&Node> {
        let mut cur = self;
        for step in parse_pointer(pointer) {
            cur = match cur {
                Node::Object(obj) => obj.get(&step)?,
                Node::Array(arr) => arr.get(parse_index(&step).ok()?)?,
                Node::Plain(_) => return None,
            };
        }
        Some(cur)
    }

    /// Writes `value` at a JSON Pointer.
    ///
    /// The write is recorded by the composite owning the final step. For
    /// arrays, `-` or the current length appends; indices past the end are
    /// [`TrackError::InvalidIndex`]. Returns the replaced node, if any.
    pub fn set_at(
        &mut self,
        pointer: &str,
        value: impl Into<Node>,
    ) -> Result<Option<Node>, TrackError> {
        let steps = parse_pointer(pointer);
        let (leaf, parents) = steps.split_last().ok_or(TrackError::RootPath)?;
        match self.node_at_mut(parents, pointer)? {
            Node::Object(obj) => Ok(obj.set(leaf.as_str(), value)),
            Node::Array(arr) if leaf == "-" => {
                arr.push(value);
                Ok(None)
            }
            Node::Array(arr) => {
                let index = parse_index(leaf)?;
                if index > arr.len() {
                    return Err(TrackError::InvalidIndex(leaf.clone()));
                }
                Ok(arr.set(index, value))
            }
            Node::Plain(_) => Err(TrackError::NotComposite(pointer.to_string())),
        }
    }

    /// Removes the node at a JSON Pointer.
    ///
    /// Object fields are deleted; array elements are removed with shifting,
    /// as by [`TrackedArray::remove`].
    pub fn remove_at(&mut self, pointer: &str) -> Result<Option<Node>, TrackError> {
        let steps = parse_pointer(pointer);
        let (leaf, parents) = steps.split_last().ok_or(TrackError::RootPath)?;
        match self.node_at_mut(parents, pointer)? {
            Node::Object(obj) => Ok(obj.remove(leaf)),
            Node::Array(arr) => Ok(arr.remove(parse_index(leaf)?)),
            Node::Plain(_) => Err(TrackError::NotComposite(pointer.to_string())),
        }
    }

    fn node_at_mut(&mut self, steps: &[String], pointer: &str) -> Result<&mut Node, TrackError> {
        let mut cur = self;
        for step in steps {
            cur = match cur {
                Node::Object(obj) => obj
                    .node_mut(step)
                    .ok_or_else(|| TrackError::PathNotFound(pointer.to_string()))?,
                Node::Array(arr) => arr
                    .node_mut(parse_index(step)?)
                    .ok_or_else(|| TrackError::PathNotFound(pointer.to_string()))?,
                Node::Plain(_) => return Err(TrackError::NotComposite(pointer.to_string())),
            };
        }
        Ok(cur)
    }

    /// Builds the current diff without clearing it.
    pub fn changes(&self) -> ChangeSet {
        ChangeSet {
            assignments: self.assignments(),
            deletions: self.deletions(),
        }
    }

    /// Builds the current diff, then checkpoints.
    pub fn take_changes(&mut self) -> ChangeSet {
        let changes = self.changes();
        debug!(
            assignments = changes.assignments.len(),
            deletions = changes.deletions.len(),
            "changes taken; checkpointing"
        );
        self.reset();
        changes
    }
}

impl ChangeTracking for Node {
    fn reset(&mut self) {
        match self {
            Node::Plain(_) => {}
            Node::Object(obj) => obj.reset(),
            Node::Array(arr) => arr.reset(),
        }
    }

    fn is_dirty(&self) -> bool {
        match self {
            Node::Plain(_) => false,
            Node::Object(obj) => obj.is_dirty(),
            Node::Array(arr) => arr.is_dirty(),
        }
    }

    fn assignments(&self) -> Assignments {
        match self {
            Node::Plain(_) => Assignments::Keyed(Default::default()),
            Node::Object(obj) => obj.assignments(),
            Node::Array(arr) => arr.assignments(),
        }
    }

    fn deletions(&self) -> Deletions {
        match self {
            Node::Plain(_) => Deletions::Keyed(Vec::new()),
            Node::Object(obj) => obj.deletions(),
            Node::Array(arr) => arr.deletions(),
        }
    }
}

/// A raw value, not yet tracked. Wrapping or storing it into a tracked
/// composite applies the wrap policy.
impl From<Value> for Node {
    fn from(value: Value) -> Self {
        Node::Plain(value)
    }
}

impl From<TrackedObject> for Node {
    fn from(obj: TrackedObject) -> Self {
        Node::Object(obj)
    }
}

impl From<TrackedArray> for Node {
    fn from(arr: TrackedArray) -> Self {
        Node::Array(arr)
    }
}

impl From<Node> for Value {
    fn from(node: Node) -> Self {
        node.into_value()
    }
}

/// Value equality; tracking state is not compared.
impl PartialEq for Node {
    fn eq(&self, other: &Node) -> bool {
        match other {
            Node::Plain(value) => self.eq_value(value),
            _ => self.eq_value(&other.to_value()),
        }
    }
}

impl PartialEq<Value> for Node {
    fn eq(&self, other: &Value) -> bool {
        self.eq_value(other)
    }
}

impl PartialEq<Node> for Value {
    fn eq(&self, other: &Node) -> bool {
        other.eq_value(self)
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Plain(value) => value.serialize(serializer),
            Node::Object(obj) => obj.serialize(serializer),
            Node::Array(arr) => arr.serialize(serializer),
        }
    }
}

impl Index<&str> for Node {
    type Output = Node;

    /// Missing keys and non-objects index to `null`, as with `serde_json::Value`.
    fn index(&self, key: &str) -> &Node {
        match self {
            Node::Object(obj) => obj.get(key).unwrap_or(&NULL),
            _ => &NULL,
        }
    }
}

impl Index<usize> for Node {
    type Output = Node;

    fn index(&self, index: usize) -> &Node {
        match self {
            Node::Array(arr) => arr.get(index).unwrap_or(&NULL),
            _ => &NULL,
        }
    }
}

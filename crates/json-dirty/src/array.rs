//! Tracked ordered composite.
//!
//! Element writes are recorded as `(index, value)` but flattened to values
//! only. Deletions record the removed element itself, not its index, since
//! indices shift under later mutation.
//!
//! Every shifting removal goes through [`TrackedArray::splice`], which
//! records exactly one deletion per removed element and none of the
//! index-shift or length churn the move produces.

use std::iter;

use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};
use serde_json::Value;
use tracing::trace;

use crate::diff::{Assignments, Deletions};
use crate::log::{ChangeLog, ChangeTracking};
use crate::node::Node;
use crate::object::TrackedObject;
use crate::wrap::{adopt, wrap_value, Markers};

#[derive(Debug, Clone)]
pub struct TrackedArray {
    items: Vec<Node>,
    log: ChangeLog<usize, Node>,
    markers: Markers,
}

impl TrackedArray {
    pub(crate) fn build(items: Vec<Value>, excluded: &[String], markers: &Markers) -> Self {
        let items = items
            .into_iter()
            .enumerate()
            .map(|(index, value)| {
                if excluded.iter().any(|e| e.parse::<usize>().ok() == Some(index)) {
                    Node::Plain(value)
                } else {
                    wrap_value(value, &[], markers)
                }
            })
            .collect();
        Self {
            items,
            log: ChangeLog::new(),
            markers: markers.clone(),
        }
    }

    pub fn get(&self, index: usize) -> Option<&Node> {
        self.items.get(index)
    }

    pub fn first(&self) -> Option<&Node> {
        self.items.first()
    }

    pub fn last(&self) -> Option<&Node> {
        self.items.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Writes `value` at `index` and records it.
    ///
    /// `index == len` appends. Indices past the end leave the array
    /// untouched and record nothing. Returns the replaced node.
    pub fn set(&mut self, index: usize, value: impl Into<Node>) -> Option<Node> {
        if index > self.items.len() {
            return None;
        }
        let node = adopt(value.into(), &self.markers);
        let snapshot = node.to_value();
        let previous = match self.items.get_mut(index) {
            Some(slot) => Some(std::mem::replace(slot, node)),
            None => {
                self.items.push(node);
                None
            }
        };
        self.log.record_assignment(index, snapshot);
        previous
    }

    /// Appends one element; recorded as one assignment.
    pub fn push(&mut self, value: impl Into<Node>) {
        let index = self.items.len();
        self.set(index, value);
    }

    pub fn extend<I>(&mut self, values: I)
    where
        I: IntoIterator,
        I::Item: Into<Node>,
    {
        for value in values {
            self.push(value);
        }
    }

    /// Removes and returns the last element, recording it as deleted.
    pub fn pop(&mut self) -> Option<Node> {
        let removed = self.items.pop()?;
        self.log.record_deletion(removed.clone());
        Some(removed)
    }

    /// Clears the slot at `index` without shifting, leaving `null` behind.
    ///
    /// The element that was there is recorded as deleted. Out-of-range
    /// indices are a no-op.
    pub fn delete(&mut self, index: usize) -> Option<Node> {
        let slot = self.items.get_mut(index)?;
        let removed = std::mem::replace(slot, Node::Plain(Value::Null));
        self.log.record_deletion(removed.clone());
        Some(removed)
    }

    /// Removes `delete_count` elements starting at `start`, inserting
    /// `items` in their place, and returns the removed elements.
    ///
    /// `start` and the removed range are clamped to the array. Each removed
    /// element is recorded once, as a whole: tracked composites keep their
    /// own logs so nested changes stay queryable through
    /// [`removed`](Self::removed). Inserted elements are recorded as new
    /// element values, unlike a guard-flag splice that swallows every write
    /// made during the removal; an insert-only splice still marks the array
    /// dirty. Shifted elements are not recorded.
    pub fn splice<I>(&mut self, start: usize, delete_count: usize, items: I) -> Vec<Node>
    where
        I: IntoIterator,
        I::Item: Into<Node>,
    {
        let start = start.min(self.items.len());
        let end = start.saturating_add(delete_count).min(self.items.len());
        let inserted: Vec<Node> = items
            .into_iter()
            .map(|v| adopt(v.into(), &self.markers))
            .collect();
        let snapshots: Vec<Value> = inserted.iter().map(Node::to_value).collect();

        let removed: Vec<Node> = self.items.splice(start..end, inserted).collect();
        trace!(
            start,
            removed = removed.len(),
            inserted = snapshots.len(),
            "bulk removal"
        );

        for node in &removed {
            self.log.record_deletion(node.clone());
        }
        for (offset, value) in snapshots.into_iter().enumerate() {
            self.log.record_assignment(start + offset, value);
        }
        removed
    }

    /// Removes the element at `index`, shifting the rest down.
    pub fn remove(&mut self, index: usize) -> Option<Node> {
        if index >= self.items.len() {
            return None;
        }
        self.splice(index, 1, iter::empty::<Node>()).pop()
    }

    pub fn insert(&mut self, index: usize, value: impl Into<Node>) {
        self.splice(index, 0, iter::once(value.into()));
    }

    pub fn shift(&mut self) -> Option<Node> {
        self.remove(0)
    }

    pub fn unshift(&mut self, value: impl Into<Node>) {
        self.insert(0, value);
    }

    /// Shortens the array to `len`, recording each dropped element.
    pub fn truncate(&mut self, len: usize) -> Vec<Node> {
        if len >= self.items.len() {
            return Vec::new();
        }
        let count = self.items.len() - len;
        self.splice(len, count, iter::empty::<Node>())
    }

    pub fn clear(&mut self) -> Vec<Node> {
        self.truncate(0)
    }

    pub fn object_mut(&mut self, index: usize) -> Option<&mut TrackedObject> {
        self.items.get_mut(index).and_then(Node::as_object_mut)
    }

    pub fn array_mut(&mut self, index: usize) -> Option<&mut TrackedArray> {
        self.items.get_mut(index).and_then(Node::as_array_mut)
    }

    /// Mutable access to an untracked composite element. Never recorded.
    pub fn untracked_mut(&mut self, index: usize) -> Option<&mut Value> {
        match self.items.get_mut(index)? {
            Node::Plain(value @ (Value::Object(_) | Value::Array(_))) => Some(value),
            _ => None,
        }
    }

    pub(crate) fn node_mut(&mut self, index: usize) -> Option<&mut Node> {
        self.items.get_mut(index)
    }

    /// Elements removed since the last checkpoint, in removal order.
    pub fn removed(&self) -> &[Node] {
        self.log.deletions()
    }

    /// Written element values, in write order.
    ///
    /// Each value is a snapshot taken when it was written. Later edits inside
    /// the stored element mark the array dirty but do not change these.
    pub fn assignment_values(&self) -> Vec<Value> {
        self.log
            .assignments()
            .iter()
            .map(|a| a.value.clone())
            .collect()
    }

    pub fn removed_values(&self) -> Vec<Value> {
        self.removed().iter().map(Node::to_value).collect()
    }

    pub fn to_value(&self) -> Value {
        Value::Array(self.items.iter().map(Node::to_value).collect())
    }

    pub fn into_value(self) -> Value {
        Value::Array(self.items.into_iter().map(Node::into_value).collect())
    }
}

impl ChangeTracking for TrackedArray {
    fn reset(&mut self) {
        for node in &mut self.items {
            node.reset();
        }
        self.log.clear();
    }

    fn is_dirty(&self) -> bool {
        !self.log.is_empty() || self.items.iter().any(Node::is_dirty)
    }

    fn assignments(&self) -> Assignments {
        Assignments::Sequence(self.assignment_values())
    }

    fn deletions(&self) -> Deletions {
        Deletions::Sequence(self.removed_values())
    }
}

impl<'a> IntoIterator for &'a TrackedArray {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl Serialize for TrackedArray {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.items.len()))?;
        for node in &self.items {
            seq.serialize_element(node)?;
        }
        seq.end()
    }
}

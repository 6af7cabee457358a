//! Per-composite change log.
//!
//! Every tracked composite owns one [`ChangeLog`] holding two append-only
//! sequences: assignments in mutation order and deletion records. Logs only
//! grow until a checkpoint ([`ChangeTracking::reset`]) truncates them.
//!
//! Logs of nested composites are never copied into their parent; the parent
//! queries its children on demand when flattening.

use std::fmt::Debug;

use serde_json::Value;
use tracing::trace;

use crate::diff::{Assignments, Deletions};

/// One recorded write: the property that was assigned and the value written.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment<K> {
    pub property: K,
    pub value: Value,
}

/// Ordered assignment and deletion records of one composite.
///
/// `K` is the property type (`String` for objects, `usize` for arrays) and
/// `D` the deletion record type (the key for objects, the removed element
/// for arrays).
#[derive(Debug, Clone)]
pub struct ChangeLog<K, D> {
    assignments: Vec<Assignment<K>>,
    deletions: Vec<D>,
}

impl<K, D> Default for ChangeLog<K, D> {
    fn default() -> Self {
        Self {
            assignments: Vec::new(),
            deletions: Vec::new(),
        }
    }
}

impl<K: Debug + PartialEq, D> ChangeLog<K, D> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_assignment(&mut self, property: K, value: Value) {
        trace!(property = ?property, "assignment recorded");
        self.assignments.push(Assignment { property, value });
    }

    pub fn record_deletion(&mut self, record: D) {
        trace!(count = self.deletions.len() + 1, "deletion recorded");
        self.deletions.push(record);
    }

    pub fn assignments(&self) -> &[Assignment<K>] {
        &self.assignments
    }

    pub fn deletions(&self) -> &[D] {
        &self.deletions
    }

    /// Returns `true` if `property` was assigned since the last checkpoint.
    pub fn has_assignment(&self, property: &K) -> bool {
        self.assignments.iter().any(|a| &a.property == property)
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty() && self.deletions.is_empty()
    }

    pub fn clear(&mut self) {
        self.assignments.clear();
        self.deletions.clear();
    }
}

/// Checkpoint and diff queries shared by every tracked composite.
pub trait ChangeTracking {
    /// Clears this log and every reachable nested log.
    fn reset(&mut self);

    /// Returns `true` if this log or any nested log has entries.
    fn is_dirty(&self) -> bool;

    /// Flattened assignments since the last checkpoint.
    fn assignments(&self) -> Assignments;

    /// Flattened deletions since the last checkpoint.
    fn deletions(&self) -> Deletions;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_log_records_in_order() {
        let mut log: ChangeLog<String, String> = ChangeLog::new();
        assert!(log.is_empty());

        log.record_assignment("a".into(), json!(1));
        log.record_assignment("a".into(), json!(2));
        log.record_deletion("b".into());

        assert!(!log.is_empty());
        assert_eq!(log.assignments().len(), 2);
        assert_eq!(log.assignments()[1].value, json!(2));
        assert_eq!(log.deletions(), &["b".to_string()]);
        assert!(log.has_assignment(&"a".to_string()));
        assert!(!log.has_assignment(&"b".to_string()));
    }

    #[test]
    fn test_log_clear() {
        let mut log: ChangeLog<usize, Value> = ChangeLog::new();
        log.record_assignment(0, json!("x"));
        log.record_deletion(json!("y"));
        log.clear();
        assert!(log.is_empty());
        assert!(log.assignments().is_empty());
        assert!(log.deletions().is_empty());
    }
}

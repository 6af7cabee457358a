//! Wrap policy: which values become tracked, and how a tree is wrapped.
//!
//! A value is trackable iff it is an array, or an object that is not an
//! opaque temporal value. Members are wrapped bottom-up before their parent,
//! so every tracked composite can assume its children are already tracked
//! or plain. Exclusions apply only at the level they are given.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::array::TrackedArray;
use crate::node::Node;
use crate::object::TrackedObject;

/// Extended-JSON style date marker: `{"$date": ...}`.
pub const DATE_MARKER: &str = "$date";

/// Temporal marker keys shared by every composite of one wrapped tree.
pub(crate) type Markers = Arc<[String]>;

/// Wrap configuration.
///
/// Deserializable so it can be loaded from the caller's own configuration;
/// missing fields take their defaults.
///
/// ```
/// use json_dirty::WrapOptions;
///
/// let options: WrapOptions =
///     serde_json::from_str(r#"{"excluded_keys": ["attachments"]}"#).unwrap();
/// assert_eq!(options.excluded_keys, vec!["attachments"]);
/// assert_eq!(options.temporal_markers, vec!["$date"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WrapOptions {
    /// Top-level members left untracked. Not applied to descendants.
    pub excluded_keys: Vec<String>,
    /// Keys that mark a single-key object as an opaque temporal value.
    pub temporal_markers: Vec<String>,
}

impl Default for WrapOptions {
    fn default() -> Self {
        Self {
            excluded_keys: Vec::new(),
            temporal_markers: vec![DATE_MARKER.to_string()],
        }
    }
}

impl WrapOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exclude<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_keys.extend(keys.into_iter().map(Into::into));
        self
    }

    pub fn temporal_marker(mut self, marker: impl Into<String>) -> Self {
        self.temporal_markers.push(marker.into());
        self
    }
}

/// Returns `true` if `value` would become a tracked composite.
pub fn is_trackable(value: &Value, temporal_markers: &[String]) -> bool {
    match value {
        Value::Array(_) => true,
        Value::Object(map) => !is_temporal(map, temporal_markers),
        _ => false,
    }
}

fn is_temporal(map: &Map<String, Value>, temporal_markers: &[String]) -> bool {
    map.len() == 1
        && map
            .keys()
            .next()
            .is_some_and(|key| temporal_markers.iter().any(|m| m == key))
}

/// Wraps a value with default options.
///
/// Already-tracked nodes are returned unchanged, with their logs intact.
pub fn wrap(value: impl Into<Node>) -> Node {
    wrap_with(value, &WrapOptions::default())
}

/// Wraps a value, leaving the named top-level members untracked.
pub fn wrap_except(value: impl Into<Node>, excluded_keys: &[&str]) -> Node {
    wrap_with(value, &WrapOptions::default().exclude(excluded_keys.iter().copied()))
}

pub fn wrap_with(value: impl Into<Node>, options: &WrapOptions) -> Node {
    match value.into() {
        Node::Plain(value) => {
            let markers: Markers = Arc::from(options.temporal_markers.clone());
            let node = wrap_value(value, &options.excluded_keys, &markers);
            debug!(
                tracked = node.is_tracked(),
                excluded = options.excluded_keys.len(),
                "value wrapped"
            );
            node
        }
        tracked => {
            debug!("value already tracked; returned unchanged");
            tracked
        }
    }
}

pub(crate) fn wrap_value(value: Value, excluded: &[String], markers: &Markers) -> Node {
    if !is_trackable(&value, markers) {
        return Node::Plain(value);
    }
    match value {
        Value::Object(map) => Node::Object(TrackedObject::build(map, excluded, markers)),
        Value::Array(items) => Node::Array(TrackedArray::build(items, excluded, markers)),
        other => Node::Plain(other),
    }
}

/// Applies the policy to a node about to be stored into a tracked composite.
/// Full-value replacement always re-wraps eligible plain values.
pub(crate) fn adopt(node: Node, markers: &Markers) -> Node {
    match node {
        Node::Plain(value) => wrap_value(value, &[], markers),
        tracked => tracked,
    }
}

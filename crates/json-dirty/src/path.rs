//! Path helpers.
//!
//! Two path notations meet in this crate:
//!
//! - JSON Pointer (RFC 6901) strings address nodes for reads and writes,
//!   e.g. `/states/inspection` or `/attachments/0`.
//! - Dotted paths name changed fields in flattened diffs, e.g.
//!   `states.inspection`.

use serde_json::Value;

use crate::error::TrackError;
use crate::node::Node;

/// Unescapes a JSON Pointer path component (`~1` -> `/`, `~0` -> `~`).
pub fn unescape_component(component: &str) -> String {
    if !component.contains('~') {
        return component.to_string();
    }
    // ~1 must be replaced before ~0
    component.replace("~1", "/").replace("~0", "~")
}

/// Splits a JSON Pointer into unescaped components.
///
/// The leading `/` is optional: `states/inspection` and `/states/inspection`
/// address the same node. The empty string is the root.
///
/// # Example
///
/// ```
/// use json_dirty::path::parse_pointer;
///
/// assert_eq!(parse_pointer(""), Vec::<String>::new());
/// assert_eq!(parse_pointer("/a/b"), vec!["a", "b"]);
/// assert_eq!(parse_pointer("a~1b/c"), vec!["a/b", "c"]);
/// ```
pub fn parse_pointer(pointer: &str) -> Vec<String> {
    if pointer.is_empty() {
        return Vec::new();
    }
    let body = pointer.strip_prefix('/').unwrap_or(pointer);
    body.split('/').map(unescape_component).collect()
}

/// Parses an array index step. Leading zeros and signs are rejected.
pub fn parse_index(step: &str) -> Result<usize, TrackError> {
    let bytes = step.as_bytes();
    let valid = !bytes.is_empty()
        && bytes.iter().all(|b| b.is_ascii_digit())
        && !(bytes.len() > 1 && bytes[0] == b'0');
    if !valid {
        return Err(TrackError::InvalidIndex(step.to_string()));
    }
    step.parse()
        .map_err(|_| TrackError::InvalidIndex(step.to_string()))
}

/// Joins a parent key and a child entry into a dotted path.
pub fn join(parent: &str, child: &str) -> String {
    let mut out = String::with_capacity(parent.len() + child.len() + 1);
    out.push_str(parent);
    out.push('.');
    out.push_str(child);
    out
}

/// Renders a removed sequence element as a path segment.
///
/// Scalars render the way they read (`"Orange"` -> `Orange`, `3` -> `3`,
/// `null` -> `null`). Composites have no single-segment form and yield
/// `None`.
pub fn element_label(node: &Node) -> Option<String> {
    match node {
        Node::Plain(Value::String(s)) => Some(s.clone()),
        Node::Plain(Value::Number(n)) => Some(n.to_string()),
        Node::Plain(Value::Bool(b)) => Some(b.to_string()),
        Node::Plain(Value::Null) => Some("null".to_string()),
        _ => None,
    }
}

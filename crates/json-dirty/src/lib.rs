//! json-dirty - change tracking for JSON documents.
//!
//! Wrap a JSON value once, mutate it through the returned [`Node`], and later
//! ask whether it changed since the last checkpoint and what changed, as
//! dotted-path assignments and deletions a persistence layer can apply as a
//! partial update.
//!
//! ```
//! use json_dirty::{wrap, ChangeTracking};
//! use serde_json::json;
//!
//! let mut order = wrap(json!({
//!     "owner": "12345",
//!     "states": {"inspection": "pending"},
//!     "fruits": ["Banana", "Orange", "Apple", "Mango"],
//! }));
//! assert!(!order.is_dirty());
//!
//! order.set_at("/states/inspection", json!("done")).unwrap();
//! let fruits = order.as_object_mut().unwrap().array_mut("fruits").unwrap();
//! fruits.remove(1);
//! fruits.pop();
//!
//! assert_eq!(order["fruits"], json!(["Banana", "Apple"]));
//! assert_eq!(order.assignments().get("states.inspection"), Some(&json!("done")));
//! assert_eq!(order.deletions().paths(), vec!["fruits.Orange", "fruits.Mango"]);
//!
//! order.reset();
//! assert!(!order.is_dirty());
//! ```

pub mod array;
pub mod diff;
pub mod error;
pub mod log;
pub mod node;
pub mod object;
pub mod path;
pub mod wrap;

pub use array::TrackedArray;
pub use diff::{Assignments, ChangeSet, Deletion, Deletions};
pub use error::TrackError;
pub use log::{Assignment, ChangeLog, ChangeTracking};
pub use node::Node;
pub use object::TrackedObject;
pub use wrap::{is_trackable, wrap, wrap_except, wrap_with, WrapOptions, DATE_MARKER};

use json_dirty::{wrap, wrap_except, ChangeTracking, Node};
use serde_json::{json, Value};

/// Business object holding its state in a tracked tree. Its methods mutate
/// through the tree the way calling code would.
struct InspectionOrder {
    doc: Node,
}

impl InspectionOrder {
    fn raw() -> Value {
        json!({
            "owner": "12345",
            "states": {"inspection": "pending"},
            "attachments": [],
        })
    }

    fn new() -> Self {
        Self { doc: wrap(Self::raw()) }
    }

    fn with_untracked(excluded: &[&str]) -> Self {
        Self {
            doc: wrap_except(Self::raw(), excluded),
        }
    }

    fn finish(&mut self) {
        let root = self.doc.as_object_mut().expect("root is tracked");
        match root.object_mut("states") {
            Some(states) => {
                states.set("inspection", json!("done"));
            }
            None => {
                root.untracked_mut("states").expect("states present")["inspection"] =
                    json!("done");
            }
        }
    }

    fn close(&mut self) {
        self.doc.set_at("/closed", json!(true)).expect("root is an object");
    }

    fn add_attachment(&mut self, src: &str, name: &str) {
        let attachment = json!({"src": src, "name": name});
        let root = self.doc.as_object_mut().expect("root is tracked");
        match root.array_mut("attachments") {
            Some(list) => list.push(attachment),
            None => root
                .untracked_mut("attachments")
                .and_then(Value::as_array_mut)
                .expect("attachments present")
                .push(attachment),
        }
    }
}

const PIC_SRC: &str = "/s3.amazon.com/apicture.jpeg";
const PIC_NAME: &str = "a-picture.jpeg";
const OTHER_SRC: &str = "/s3.amazon.com/anotherpicture.jpeg";
const OTHER_NAME: &str = "another-picture.jpeg";

#[test]
fn wrapped_order_reads_and_writes_like_the_raw_value() {
    let raw = InspectionOrder::raw();
    let mut order = InspectionOrder::new();

    assert_eq!(order.doc["owner"], raw["owner"]);
    assert_eq!(order.doc["states"]["inspection"], raw["states"]["inspection"]);
    assert!(order.doc.pointer("/closed").is_none());

    order.close();
    assert_eq!(order.doc["closed"].as_bool(), Some(true));

    order.finish();
    assert_eq!(order.doc["states"]["inspection"].as_str(), Some("done"));
}

#[test]
fn primitive_changes_are_flattened_to_dotted_paths() {
    let mut order = InspectionOrder::new();
    order.close();
    order.finish();

    let assignments = order.doc.assignments();
    assert_eq!(assignments.get("closed"), Some(&json!(true)));
    assert_eq!(assignments.get("states.inspection"), Some(&json!("done")));
    assert_eq!(assignments.len(), 2);
}

#[test]
fn pushed_attachments_are_reported_as_element_values() {
    let mut order = InspectionOrder::new();
    order.add_attachment(PIC_SRC, PIC_NAME);
    order.add_attachment(OTHER_SRC, OTHER_NAME);

    let assignments = order.doc.assignments();
    let attachments = assignments
        .get("attachments")
        .and_then(Value::as_array)
        .expect("attachments reported as an array");
    assert_eq!(attachments.len(), 2);
    assert_eq!(attachments[0]["src"], PIC_SRC);
    assert_eq!(attachments[0]["name"], PIC_NAME);
    assert_eq!(attachments[1]["src"], OTHER_SRC);
    assert_eq!(attachments[1]["name"], OTHER_NAME);
}

#[test]
fn reset_clears_all_assignments() {
    let mut order = InspectionOrder::new();
    order.close();
    order.finish();
    order.add_attachment(PIC_SRC, PIC_NAME);
    order.add_attachment(OTHER_SRC, OTHER_NAME);

    order.doc.reset();

    assert!(order.doc.assignments().is_empty());
    assert!(order.doc.deletions().is_empty());
    assert!(!order.doc.is_dirty());
    assert_eq!(order.doc["attachments"].as_array().map(|a| a.len()), Some(2));
}

#[test]
fn is_dirty_tracks_any_change() {
    let mut order = InspectionOrder::new();
    assert!(!order.doc.is_dirty());

    order.close();
    order.finish();
    order.add_attachment(PIC_SRC, PIC_NAME);
    order.add_attachment(OTHER_SRC, OTHER_NAME);

    assert!(order.doc.is_dirty());
}

#[test]
fn excluded_members_never_mark_dirty() {
    let mut order = InspectionOrder::with_untracked(&["attachments", "states"]);

    order.finish();
    order.add_attachment(PIC_SRC, PIC_NAME);
    order.add_attachment(OTHER_SRC, OTHER_NAME);

    assert!(!order.doc.is_dirty());
    assert_eq!(order.doc["states"]["inspection"].as_str(), None);
    assert_eq!(
        order.doc.to_value()["states"]["inspection"],
        json!("done")
    );
    assert_eq!(order.doc.to_value()["attachments"].as_array().map(Vec::len), Some(2));
}

#[test]
fn wrapping_a_wrapped_order_is_a_no_op() {
    let mut order = InspectionOrder::with_untracked(&["attachments", "states"]);
    order.close();

    let rewrapped = wrap(order.doc);
    assert!(rewrapped.is_dirty());
    assert_eq!(rewrapped.assignments().get("closed"), Some(&json!(true)));
    assert!(!rewrapped["states"].is_tracked());
}

#[test]
fn inner_object_change_makes_root_dirty() {
    let mut order = InspectionOrder::new();
    assert!(!order.doc.is_dirty());

    order.doc.set_at("/states/report", json!("pending")).unwrap();

    assert!(order.doc.is_dirty());
    assert_eq!(order.doc.assignments().get("states.report"), Some(&json!("pending")));
}

#[test]
fn serialized_order_does_not_leak_tracking_state() {
    let mut order = InspectionOrder::new();
    order.close();
    order.add_attachment(PIC_SRC, PIC_NAME);

    let serialized = serde_json::to_value(&order.doc).unwrap();
    assert_eq!(
        serialized,
        json!({
            "owner": "12345",
            "states": {"inspection": "pending"},
            "attachments": [{"src": PIC_SRC, "name": PIC_NAME}],
            "closed": true,
        })
    );
    let keys: Vec<&str> = order.doc.as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["owner", "states", "attachments", "closed"]);
}

#[test]
fn take_changes_hands_over_a_changeset_and_checkpoints() {
    let mut order = InspectionOrder::new();
    order.finish();
    order.add_attachment(PIC_SRC, PIC_NAME);

    let changes = order.doc.take_changes();
    assert_eq!(
        serde_json::to_value(&changes).unwrap(),
        json!({
            "assignments": {
                "states.inspection": "done",
                "attachments": [{"src": PIC_SRC, "name": PIC_NAME}],
            },
            "deletions": [],
        })
    );
    assert!(!order.doc.is_dirty());

    order.close();
    let changes = order.doc.take_changes();
    assert_eq!(changes.assignments.len(), 1);
    assert_eq!(changes.assignments.get("closed"), Some(&json!(true)));
}

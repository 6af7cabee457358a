use json_dirty::{wrap, wrap_except, ChangeTracking, Node, TrackError};
use serde_json::json;

fn doc() -> Node {
    wrap(json!({
        "object": {"field1": "hi", "deep": {"x": 1}},
        "list": [{"n": 1}, {"n": 2}],
        "name": "order",
    }))
}

#[test]
fn set_at_records_at_the_nearest_tracked_parent() {
    let mut d = doc();
    assert_eq!(d.set_at("/object/deep/x", json!(2)).unwrap(), Some(Node::Plain(json!(1))));
    assert_eq!(d.set_at("object/new", json!("v")).unwrap(), None);

    let assignments = d.assignments();
    assert_eq!(assignments.get("object.deep.x"), Some(&json!(2)));
    assert_eq!(assignments.get("object.new"), Some(&json!("v")));
    assert_eq!(d["object"]["deep"]["x"].as_i64(), Some(2));
}

#[test]
fn set_at_on_arrays_supports_index_and_append() {
    let mut d = doc();
    d.set_at("/list/-", json!({"n": 3})).unwrap();
    d.set_at("/list/0", json!({"n": 10})).unwrap();

    assert_eq!(d["list"], json!([{"n": 10}, {"n": 2}, {"n": 3}]));
    assert_eq!(d.assignments().get("list"), Some(&json!([{"n": 3}, {"n": 10}])));
    assert!(d["list"][0].is_tracked());
}

#[test]
fn element_field_writes_mark_the_array_dirty() {
    let mut d = doc();
    d.set_at("/list/1/n", json!(20)).unwrap();
    assert!(d.is_dirty());
    assert!(d["list"].is_dirty());
    assert_eq!(d["list"][1]["n"].as_i64(), Some(20));
}

#[test]
fn remove_at_object_field_flattens_to_path() {
    let mut d = doc();
    let removed = d.remove_at("/object/field1").unwrap();
    assert_eq!(removed, Some(Node::Plain(json!("hi"))));

    let deletions = d.deletions();
    assert_eq!(deletions.paths(), vec!["object.field1"]);
    assert!(deletions.contains_path("object.field1"));
    assert!(d.pointer("/object/field1").is_none());
}

#[test]
fn top_level_removal_is_a_plain_key() {
    let mut d = doc();
    d.remove_at("/name").unwrap();
    assert_eq!(d.deletions().paths(), vec!["name"]);
    assert!(d.assignments().is_empty());
}

#[test]
fn pointer_errors() {
    let mut d = wrap_except(json!({"raw": {"a": 1}, "list": [1], "s": "x"}), &["raw"]);

    assert_eq!(d.set_at("", json!(1)), Err(TrackError::RootPath));
    assert_eq!(d.remove_at(""), Err(TrackError::RootPath));
    assert_eq!(
        d.set_at("/missing/a", json!(1)),
        Err(TrackError::PathNotFound("/missing/a".into()))
    );
    assert_eq!(
        d.set_at("/raw/a", json!(2)),
        Err(TrackError::NotComposite("/raw/a".into()))
    );
    assert_eq!(
        d.set_at("/s/a", json!(2)),
        Err(TrackError::NotComposite("/s/a".into()))
    );
    assert_eq!(
        d.set_at("/list/01", json!(2)),
        Err(TrackError::InvalidIndex("01".into()))
    );
    assert_eq!(
        d.remove_at("/list/-"),
        Err(TrackError::InvalidIndex("-".into()))
    );
    assert!(!d.is_dirty());
}

#[test]
fn error_messages_name_the_pointer() {
    assert_eq!(
        TrackError::PathNotFound("/a/b".into()).to_string(),
        "path not found: /a/b"
    );
    assert_eq!(
        TrackError::InvalidIndex("x".into()).to_string(),
        "invalid array index: x"
    );
}

#[test]
fn escaped_pointer_components() {
    let mut d = wrap(json!({"a/b": {"c~d": 1}}));
    assert_eq!(d.pointer("/a~1b/c~0d").and_then(Node::as_i64), Some(1));
    d.set_at("/a~1b/c~0d", json!(2)).unwrap();
    assert_eq!(d.assignments().get("a/b.c~d"), Some(&json!(2)));
}

#[test]
fn set_at_past_the_end_of_an_array_is_rejected() {
    let mut d = wrap(json!({"list": []}));
    assert_eq!(
        d.set_at("/list/18446744073709551615", json!(1)),
        Err(TrackError::InvalidIndex("18446744073709551615".into()))
    );
    assert_eq!(
        d.set_at("/list/1", json!(1)),
        Err(TrackError::InvalidIndex("1".into()))
    );
    assert!(!d.is_dirty());

    assert_eq!(d.set_at("/list/0", json!("first")).unwrap(), None);
    assert_eq!(d["list"], json!(["first"]));
}

#[test]
fn reassigned_member_also_reports_later_nested_writes() {
    let mut d = wrap(json!({"states": {}}));
    d.set_at("/states", json!({"a": 1})).unwrap();
    d.set_at("/states/inspection", json!("done")).unwrap();

    let changes = d.changes();
    assert_eq!(
        serde_json::to_value(&changes).unwrap(),
        json!({
            "assignments": {
                "states": {"a": 1, "inspection": "done"},
                "states.inspection": "done",
            },
            "deletions": [],
        })
    );
}

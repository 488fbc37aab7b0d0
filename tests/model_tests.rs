//! Integration tests for model path selection

use pretty_assertions::assert_eq;
use serde_json::json;
use slotgen::{Bindings, Config, Kind, ModelError, ModelNode, PathError, RawValue};

fn raw(value: serde_json::Value) -> RawValue {
    serde_json::from_value(value).expect("Should convert")
}

fn document() -> RawValue {
    raw(json!({
        "components": {
            "componentA": {
                "properties": {
                    "name": "componentA",
                    "color": "blue",
                    "age": 3,
                    "dead": false,
                    "nothing": null,
                    "nicknames": ["cA", "compA", "A"],
                    "brokenref": "$/components/componentX"
                }
            },
            "componentB": {
                "favoriteprop": "$properties/color",
                "properties": {
                    "name": "componentB",
                    "color": "red",
                    "age": 9,
                    "dead": true,
                    "nicknames": ["cB", "compB", "B"],
                    "parent": "$/components/componentA"
                }
            }
        },
        "week": ["mon", "tue", "wed", "thu", "fri"],
        "animals": [
            {"type": "whale", "environment": "ocean", "other": "$/animals/1"},
            {"type": "lion", "environment": "land", "other": "$/animals/0"}
        ]
    }))
}

fn model() -> ModelNode {
    ModelNode::new("model", document())
}

fn ref_model() -> ModelNode {
    ModelNode::with_ref_prefix("model", document(), "$")
}

fn message(err: ModelError) -> String {
    err.to_string()
}

#[test]
fn test_select_absolute() {
    let m = model();

    let components = m.select("/components").expect("Should select");
    assert_eq!(components.kind(), Kind::Mapping);
    assert_eq!(components.keys(), vec!["componentA", "componentB"]);

    let b = m.select("/components/componentB").expect("Should select");
    assert_eq!(b.name(), "componentB");
    assert_eq!(
        b,
        raw(json!({
            "favoriteprop": "$properties/color",
            "properties": {
                "name": "componentB",
                "color": "red",
                "age": 9,
                "dead": true,
                "nicknames": ["cB", "compB", "B"],
                "parent": "$/components/componentA"
            }
        }))
    );

    let color = m.select("/components/componentB/properties/color").expect("Should select");
    assert_eq!(color, "red");
    assert_eq!(color.kind(), Kind::String);

    let nothing = m.select("/components/componentA/properties/nothing").expect("Should select");
    assert!(nothing.is_null());
    assert_eq!(nothing.kind(), Kind::Null);

    let week = m.select("/week").expect("Should select");
    assert_eq!(week.kind(), Kind::Sequence);
    assert_eq!(week.len(), Some(5));
}

#[test]
fn test_select_missing_paths() {
    let m = model();
    assert_eq!(
        message(m.select("/doesnotexist").expect_err("Should fail")),
        "could not find path '/doesnotexist'"
    );
    assert_eq!(
        message(m.select("/components/componentX").expect_err("Should fail")),
        "could not find path '/components/componentX'"
    );
    assert_eq!(
        message(
            m.select("/components/componentB/properties/height")
                .expect_err("Should fail")
        ),
        "could not find path '/components/componentB/properties/height'"
    );
}

#[test]
fn test_select_navigation_errors() {
    let m = model();
    let err = m
        .select("/components/componentB/properties/dead/*")
        .expect_err("Should fail");
    assert_eq!(
        err,
        ModelError::Path(PathError::NotIterable {
            path: "/components/componentB/properties/dead".to_string()
        })
    );
    assert_eq!(
        message(err),
        "cannot iterate over '/components/componentB/properties/dead'"
    );

    let err = m
        .select("/components/componentB/properties/dead/type")
        .expect_err("Should fail");
    assert_eq!(message(err), "cannot lookup path 'type' in value 'true'");
}

#[test]
fn test_select_star() {
    let m = model();
    let all = m.select("/components/*").expect("Should expand");
    assert_eq!(all.name(), "*");
    assert_eq!(all.kind(), Kind::Sequence);

    let names: Vec<String> = all.iter().map(|c| c.name().to_string()).collect();
    assert_eq!(names, vec!["componentA", "componentB"]);
    assert!(all.iter().all(|c| c.ref_prefix() == m.ref_prefix()));
    assert!(all.iter().all(|c| c.same_root(&m)));

    let a = m.select("/components/componentA").expect("Should select");
    let b = m.select("/components/componentB").expect("Should select");
    assert_eq!(all.children(), vec![a.clone(), b.clone()]);

    assert_eq!(all.select("/components/componentA").expect("Should select"), a);
    assert_eq!(all.select("1").expect("Should select"), b);
}

#[test]
fn test_select_relative() {
    let m = model();
    let components = m.select("/components").expect("Should select");
    let a = components.select("componentA").expect("Should select");
    assert_eq!(a, m.select("/components/componentA").expect("Should select"));
    assert_eq!(a.select("properties/dead").expect("Should select"), false);
}

#[test]
fn test_select_array() {
    let m = model();
    let nicknames = "/components/componentA/properties/nicknames";
    assert_eq!(
        m.select(nicknames).expect("Should select"),
        raw(json!(["cA", "compA", "A"]))
    );
    assert_eq!(m.select(&format!("{nicknames}/0")).expect("ok"), "cA");
    assert_eq!(m.select(&format!("{nicknames}/1")).expect("ok"), "compA");
    assert_eq!(m.select(&format!("{nicknames}/2")).expect("ok"), "A");
    assert_eq!(
        message(m.select(&format!("{nicknames}/3")).expect_err("Should fail")),
        format!("could not find path '{nicknames}/3'")
    );

    assert_eq!(m.select("/week/0").expect("ok"), "mon");
    assert_eq!(m.select("/week/2").expect("ok"), "wed");
    assert_eq!(m.select("/week/-1").expect("ok"), "fri");
    assert_eq!(
        message(m.select("/week/a").expect_err("Should fail")),
        "sequence navigation requires integers, got 'a'"
    );

    let animals = raw(json!([
        {"type": "whale", "environment": "ocean", "other": "$/animals/1"},
        {"type": "lion", "environment": "land", "other": "$/animals/0"}
    ]));
    assert_eq!(m.select("/animals").expect("ok"), animals);
    assert_eq!(m.select("/animals/*").expect("ok"), animals);
    assert_eq!(
        m.select("/animals/-1").expect("ok"),
        m.select("/animals/1").expect("ok")
    );
    assert_eq!(
        m.select("/animals/0").expect("ok").select("type").expect("ok"),
        "whale"
    );

    // Strings index by character
    assert_eq!(m.select("/animals/0/type/2").expect("ok"), "a");

    assert_eq!(
        message(m.select("/animals/99").expect_err("Should fail")),
        "could not find path '/animals/99'"
    );
}

#[test]
fn test_select_ref() {
    let m = ref_model();
    assert_eq!(
        m.select("/components/componentB/properties/parent").expect("ok"),
        "$/components/componentA"
    );

    let a = m.select("/components/componentA").expect("ok");
    let parent = m
        .select("/components/componentB/properties/parent->")
        .expect("Should deref");
    assert_eq!(parent, a);
    assert_eq!(parent.name(), "componentA");

    assert_eq!(
        m.select("/components/componentB/properties/parent->/properties/color")
            .expect("ok"),
        "blue"
    );
    assert_eq!(m.select("$/animals/1/other->/type").expect("ok"), "whale");

    // A reference value is itself a path
    let reference = m.select("/components/componentB/properties/parent").expect("ok");
    let path = format!("{}->", reference.as_str().expect("Should be a string"));
    assert_eq!(m.select(&path).expect("ok"), a);

    // Relative reference, resolved from the node holding it
    assert_eq!(
        m.select("/components/componentB/favoriteprop->").expect("ok"),
        "red"
    );

    assert_eq!(
        message(
            m.select("/components/componentA/properties/brokenref->")
                .expect_err("Should fail")
        ),
        "could not find path '/components/componentX'"
    );
}

#[test]
fn test_select_default() {
    let m = model();
    assert!(m.select("attr").expect_err("Should fail").is_not_found());
    assert_eq!(m.select_or("attr", "default value").expect("ok"), "default value");

    assert!(m.select("/components/componentZ").expect_err("Should fail").is_not_found());
    assert_eq!(
        m.select_or("/components/componentZ", vec![1, 2]).expect("ok"),
        raw(json!([1, 2]))
    );

    assert_eq!(m.select_or("/animals/99", "not found").expect("ok"), "not found");
    assert_eq!(m.select_or("/animals/1/type/120", "x").expect("ok"), "x");

    // Falsy defaults are still defaults
    assert!(m.select_or("missing", RawValue::Null).expect("ok").is_null());
    assert_eq!(m.select_or("missing", false).expect("ok"), false);
    assert_eq!(m.select_or("missing", 0).expect("ok"), 0);
}

#[test]
fn test_select_with_bindings() {
    let m = model();
    let bindings: Bindings = [("comp", "componentA"), ("prop", "color")].into_iter().collect();
    assert_eq!(
        m.select_with("/components/<comp>/properties/<prop>", &bindings, None)
            .expect("ok"),
        "blue"
    );

    let err = m
        .select_with("/components/<comp>/properties/<fail>", &bindings, None)
        .expect_err("Should fail");
    assert_eq!(message(err), "could not find 'fail' in bindings");
}

#[test]
fn test_bound_reference() {
    let m = ref_model();
    let reference = m.select("/components/componentB/properties/parent").expect("ok");
    let bindings = Bindings::new().bind("ref", reference.as_str().expect("Should be a string"));

    let target = m.select_with("<ref>->", &bindings, None).expect("Should deref");
    assert_eq!(target, m.select("/components/componentA").expect("ok"));
}

#[test]
fn test_has() {
    let m = model();
    assert!(m.has("/components/componentA"));
    assert!(!m.has("/components/componentZ"));
    assert!(!m.has("/week/a"));
    assert!(!m.has("/components/componentB/properties/dead/type"));
}

#[test]
fn test_is_reference() {
    let m = ref_model();
    assert!(m.is_reference("/components/componentB/properties/parent").expect("ok"));
    assert!(!m.is_reference("/components/componentB/properties/color").expect("ok"));
    assert!(m.is_reference("/components/componentZ").is_err());
}

#[test]
fn test_is_enabled() {
    let m = model();
    assert!(m.is_enabled("/components/componentB/properties/dead"));
    assert!(!m.is_enabled("/components/componentA/properties/dead"));
    assert!(m.is_enabled("/components/componentA/properties/age"));
    assert!(!m.is_enabled("/components/componentA/properties/color"));
    assert!(!m.is_enabled("/components/componentA/properties/nicknames"));
    assert!(!m.is_enabled("/components/componentZ"));
    assert!(!m.is_enabled("/week/a"));
}

#[test]
fn test_ref_prefix_from_config() {
    let config = Config::from_str("ref_prefix = \"$\"").expect("Should parse");
    let m = ModelNode::from_config("model", document(), &config);
    assert_eq!(m.ref_prefix(), "$");
    assert_eq!(
        m.select("/components/componentB/favoriteprop->").expect("ok"),
        "red"
    );
}

#[test]
fn test_selection_never_mutates() {
    let m = model();
    let before = m.to_raw();
    let _ = m.select_or("/components/componentQ/x", "d");
    let _ = m.select("/components/*");
    assert_eq!(m.to_raw(), before);
}

//! `apply` on canonical valid values preserves them across representations.

use std::net::IpAddr;

use nebula_ruleset::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

#[test]
fn text_rule_sets_round_trip_through_json() {
    let cases: [(&dyn Fn(&str, &mut Value) -> ValidationResult, &str); 4] = [
        (&|v, out| string().apply(&Context::new(), v, out), "hello"),
        (&|v, out| domain().apply(&Context::new(), v, out), "example.com"),
        (&|v, out| email().apply(&Context::new(), v, out), "a@example.com"),
        (&|v, out| uri().apply(&Context::new(), v, out), "https://example.com/p?q=1#f"),
    ];
    for (apply, value) in cases {
        let mut out = Value::Null;
        apply(value, &mut out).unwrap();
        assert_eq!(out, json!(value));
    }
}

#[test]
fn json_string_back_to_text() {
    let input = json!("https://example.com");
    let mut out = String::new();
    uri().apply(&Context::new(), &input, &mut out).unwrap();
    assert_eq!(out, "https://example.com");
}

#[test]
fn integer_round_trip() {
    let rs = int::<i64>().with_range(-10, 10);

    let mut json_out = Value::Null;
    rs.apply(&Context::new(), Input::Int(-3), &mut json_out).unwrap();
    assert_eq!(json_out, json!(-3));

    let mut int_out = 0i64;
    rs.apply(&Context::new(), &json_out, &mut int_out).unwrap();
    assert_eq!(int_out, -3);

    let mut text_out = String::new();
    rs.apply(&Context::new(), Input::Int(int_out), &mut text_out).unwrap();
    assert_eq!(text_out, "-3");
}

#[test]
fn ip_round_trip() {
    for text in ["192.0.2.1", "2001:db8::1"] {
        let addr: IpAddr = text.parse().unwrap();

        let mut text_out = String::new();
        ip().apply(&Context::new(), addr, &mut text_out).unwrap();
        assert_eq!(text_out, text);

        let mut addr_out: IpAddr = [0, 0, 0, 0].into();
        ip().apply(&Context::new(), text_out.as_str(), &mut addr_out).unwrap();
        assert_eq!(addr_out, addr);
    }
}

#[test]
fn query_round_trip_across_map_text_and_json() {
    let mut map = QueryMap::new();
    map.insert("q".into(), vec!["rust lang".into()]);
    map.insert("tag".into(), vec!["a".into(), "b".into()]);

    let mut text = String::new();
    query().apply(&Context::new(), &map, &mut text).unwrap();
    assert_eq!(text, "q=rust+lang&tag=a&tag=b");

    let mut json_out = Value::Null;
    query().apply(&Context::new(), text.as_str(), &mut json_out).unwrap();
    assert_eq!(json_out, json!({"q": "rust lang", "tag": ["a", "b"]}));

    let mut map_out = QueryMap::new();
    query().apply(&Context::new(), &json_out, &mut map_out).unwrap();
    assert_eq!(map_out, map);
}

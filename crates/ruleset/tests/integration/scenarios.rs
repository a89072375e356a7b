//! End-to-end `apply` scenarios, one rule set per test.

use nebula_ruleset::prelude::*;
use pretty_assertions::assert_eq;
use std::net::IpAddr;

fn single_kind(result: ValidationResult) -> ErrorKind {
    let errors = result.expect_err("expected a validation failure");
    assert_eq!(errors.len(), 1, "{errors:?}");
    errors.first().unwrap().kind
}

#[test]
fn absolute_uri_is_stored_unchanged() {
    let mut out = String::new();
    uri()
        .apply(&Context::new(), "https://example.com", &mut out)
        .unwrap();
    assert_eq!(out, "https://example.com");
}

#[test]
fn empty_relative_uri_is_accepted() {
    let mut out = String::from("previous");
    uri()
        .with_relative()
        .apply(&Context::new(), "", &mut out)
        .unwrap();
    assert_eq!(out, "");
}

#[test]
fn unknown_tld_is_one_pattern_error() {
    let mut out = String::new();
    let result = domain()
        .with_tld()
        .apply(&Context::new(), "example.bogustld", &mut out);
    assert_eq!(single_kind(result), ErrorKind::Pattern);
}

#[test]
fn double_at_sign_is_one_pattern_error() {
    let mut out = String::new();
    let result = email().apply(&Context::new(), "a@@b.com", &mut out);
    assert_eq!(single_kind(result), ErrorKind::Pattern);
}

#[test]
fn address_past_range_end_is_one_pattern_error() {
    let mut out: IpAddr = [0, 0, 0, 0].into();
    let result = ip()
        .with_range("192.168.1.1", "192.168.1.100")
        .apply(&Context::new(), "192.168.1.101", &mut out);
    assert_eq!(single_kind(result), ErrorKind::Pattern);
}

#[test]
fn negative_port_is_located_at_component_path() {
    let mut out = String::new();
    let ctx = Context::new().with_path("url");
    let errors = uri()
        .with_deep_errors()
        .apply(&ctx, "https://example.com:-1", &mut out)
        .unwrap_err();
    assert_eq!(errors.len(), 1);
    let error = errors.first().unwrap();
    assert_eq!(error.path, "/url/port");
    assert_eq!(error.kind, ErrorKind::Min);
}

#[test]
fn null_input_depends_on_nilable() {
    let mut out = Some(String::from("stale"));
    let result = string().apply(&Context::new(), Input::Null, &mut out);
    assert_eq!(single_kind(result), ErrorKind::Null);

    string()
        .with_nil()
        .apply(&Context::new(), Input::Null, &mut out)
        .unwrap();
    assert_eq!(out, None);
}

#[test]
fn unsupported_output_slot_is_internal_error() {
    let mut out = 0i64;
    let result = email().apply(&Context::new(), "a@example.com", &mut out);
    assert_eq!(single_kind(result), ErrorKind::Internal);
}

#[test]
fn non_text_input_is_type_error() {
    let mut out = String::new();
    let result = uri().apply(&Context::new(), Input::Int(7), &mut out);
    assert_eq!(single_kind(result), ErrorKind::Type);
}

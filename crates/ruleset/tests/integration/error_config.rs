//! Per-rule-set error customization.

use nebula_ruleset::prelude::*;
use pretty_assertions::assert_eq;

#[test]
fn overrides_apply_to_every_error() {
    let rs = email()
        .with_error_code("contact.invalid")
        .with_error_message("enter a valid email address")
        .with_doc_uri("https://docs.example.com/errors/email")
        .with_trace_uri("https://trace.example.com/abc")
        .with_error_meta("field", "contact");

    let errors = rs
        .evaluate(&Context::new().with_path("contact"), "not-an-address")
        .unwrap_err();
    let error = errors.first().unwrap();

    assert_eq!(error.kind, ErrorKind::Pattern);
    assert_eq!(error.code, "contact.invalid");
    assert_eq!(error.message, "enter a valid email address");
    assert_eq!(error.path, "/contact");
    assert_eq!(
        error.doc_uri.as_deref(),
        Some("https://docs.example.com/errors/email")
    );
    assert_eq!(error.trace_uri.as_deref(), Some("https://trace.example.com/abc"));
    assert_eq!(error.param("field"), Some("contact"));
}

#[test]
fn error_meta_accumulates() {
    let rs = string()
        .with_min_len(5)
        .with_error_meta("a", "1")
        .with_error_meta("b", "2");
    let errors = rs.evaluate(&Context::new(), "abc").unwrap_err();
    let error = errors.first().unwrap();
    assert_eq!(error.param("a"), Some("1"));
    assert_eq!(error.param("b"), Some("2"));
}

#[test]
fn callback_runs_after_overrides() {
    let rs = string()
        .with_max_len(1)
        .with_error_code("short")
        .with_error_callback(|mut error| {
            error.message = format!("[{}] {}", error.code, error.message).into();
            error
        });
    let errors = rs.evaluate(&Context::new(), "long").unwrap_err();
    assert!(errors.first().unwrap().message.starts_with("[short] "));
}

#[test]
fn nested_rule_sets_keep_their_own_configuration() {
    let rs = uri()
        .with_host(domain().with_tld().with_error_code("host.invalid"))
        .with_error_code("url.invalid")
        .with_deep_errors();

    let errors = rs
        .evaluate(&Context::new(), "1x://example.bogustld")
        .unwrap_err();
    let codes: Vec<_> = errors.iter().map(|e| (e.path.as_str(), e.code.as_ref())).collect();
    assert_eq!(
        codes,
        vec![("/scheme", "url.invalid"), ("/host", "host.invalid")]
    );
}

#[test]
fn codes_default_to_kind() {
    let private: std::net::IpAddr = "10.0.0.1".parse().unwrap();
    assert!(ip().evaluate(&Context::new(), &private).is_ok());

    let errors = ip()
        .with_public()
        .evaluate(&Context::new(), &private)
        .unwrap_err();
    assert_eq!(errors.first().unwrap().code, ErrorKind::Pattern.code());
}

#[test]
fn errors_serialize_for_api_responses() {
    let errors = uri()
        .with_deep_errors()
        .evaluate(&Context::new().with_path("url"), "https://h:99999")
        .unwrap_err();
    let json = serde_json::to_value(errors.first().unwrap()).unwrap();
    assert_eq!(json["kind"], "max");
    assert_eq!(json["path"], "/url/port");
    assert!(json.get("doc_uri").is_none());
}

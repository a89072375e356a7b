//! Idempotence, conflict replacement, non-mutation and aggregation.

use nebula_ruleset::prelude::*;
use pretty_assertions::assert_eq;
use rstest::rstest;

fn kinds(result: ValidationResult) -> Vec<ErrorKind> {
    result
        .err()
        .map(|errors| errors.iter().map(|e| e.kind).collect())
        .unwrap_or_default()
}

// ============================================================================
// IDEMPOTENCE
// ============================================================================

#[test]
fn required_and_nil_are_idempotent_everywhere() {
    let string_rs = string().with_required();
    assert!(string_rs.with_required().ptr_eq(&string_rs));
    let string_rs = string().with_nil();
    assert!(string_rs.with_nil().ptr_eq(&string_rs));

    let domain_rs = domain().with_required();
    assert!(domain_rs.with_required().ptr_eq(&domain_rs));

    let email_rs = email().with_nil();
    assert!(email_rs.with_nil().ptr_eq(&email_rs));

    let ip_rs = ip().with_required();
    assert!(ip_rs.with_required().ptr_eq(&ip_rs));

    let query_rs = query().with_nil();
    assert!(query_rs.with_nil().ptr_eq(&query_rs));

    let int_rs = int::<u16>().with_required();
    assert!(int_rs.with_required().ptr_eq(&int_rs));
}

#[test]
fn uri_toggles_are_idempotent() {
    let rs = uri()
        .with_relative()
        .with_deep_errors()
        .with_host_required()
        .with_port_required();
    assert!(rs.with_relative().ptr_eq(&rs));
    assert!(rs.with_deep_errors().ptr_eq(&rs));
    assert!(rs.with_host_required().ptr_eq(&rs));
    assert!(rs.with_port_required().ptr_eq(&rs));
}

#[test]
fn ip_version_toggles_are_idempotent() {
    let v4 = ip().with_ipv4();
    assert!(v4.with_ipv4().ptr_eq(&v4));
    let v6 = ip().with_ipv6();
    assert!(v6.with_ipv6().ptr_eq(&v6));
}

#[test]
fn trail_is_not_duplicated_by_repeated_toggles() {
    let rs = domain().with_required().with_suffix(["COM"]).with_required();
    assert_eq!(
        rs.to_string(),
        r#"DomainRuleSet.with_required().with_suffix("COM")"#
    );
}

// ============================================================================
// CONFLICT REPLACEMENT
// ============================================================================

#[rstest]
#[case("example.org", true)]
#[case("example.com", false)]
fn latest_suffix_wins(#[case] value: &str, #[case] valid: bool) {
    let rs = domain().with_suffix(["com"]).with_suffix(["org"]);
    assert_eq!(rs.evaluate(&Context::new(), value).is_ok(), valid);
}

#[test]
fn latest_string_bound_wins() {
    let rs = string().with_max_len(2).with_min_len(1).with_max_len(5);
    assert!(rs.evaluate(&Context::new(), "four").is_ok());
    assert_eq!(
        rs.to_string(),
        "StringRuleSet.with_min_len(1).with_max_len(5)"
    );
}

#[test]
fn latest_error_message_wins() {
    let rs = email()
        .with_error_message("first")
        .with_error_message("second");
    let errors = rs.evaluate(&Context::new(), "nope").unwrap_err();
    assert_eq!(errors.first().unwrap().message, "second");
}

#[test]
fn custom_rules_accumulate() {
    let rs = string()
        .with_rule_fn(|ctx, v: &str| {
            if v.contains('x') {
                Err(ctx.error(ErrorKind::Pattern, "no x").into())
            } else {
                Ok(())
            }
        })
        .with_rule_fn(|ctx, v: &str| {
            if v.contains('y') {
                Err(ctx.error(ErrorKind::Pattern, "no y").into())
            } else {
                Ok(())
            }
        });
    assert_eq!(rs.evaluate(&Context::new(), "xy").unwrap_err().len(), 2);
}

// ============================================================================
// NON-MUTATION
// ============================================================================

#[test]
fn siblings_evaluate_independently() {
    let base = domain();
    let com = base.with_suffix(["com"]);
    let org = base.with_suffix(["org"]);
    let ctx = Context::new();

    assert!(base.evaluate(&ctx, "example.net").is_ok());
    assert!(com.evaluate(&ctx, "example.com").is_ok());
    assert!(com.evaluate(&ctx, "example.org").is_err());
    assert!(org.evaluate(&ctx, "example.org").is_ok());
    assert!(org.evaluate(&ctx, "example.com").is_err());
    assert_eq!(base.to_string(), "DomainRuleSet");
}

#[test]
fn shared_base_instances_are_not_affected() {
    let strict = uri().with_port_required();
    assert!(uri().evaluate(&Context::new(), "https://example.com").is_ok());
    assert!(strict.evaluate(&Context::new(), "https://example.com").is_err());
}

// ============================================================================
// AGGREGATION
// ============================================================================

#[test]
fn uri_reports_every_component_violation() {
    let rs = uri().with_host(domain().with_tld());
    let kinds = kinds(rs.evaluate(&Context::new(), "1https://example.bogustld:70000"));
    assert_eq!(
        kinds,
        vec![ErrorKind::Pattern, ErrorKind::Pattern, ErrorKind::Max]
    );
}

#[test]
fn baseline_failure_short_circuits_custom_rules() {
    let rs = email().with_rule_fn(|ctx, _: &str| Err(ctx.error(ErrorKind::NotAllowed, "never").into()));
    assert_eq!(
        kinds(rs.evaluate(&Context::new(), "broken")),
        vec![ErrorKind::Pattern]
    );
    assert_eq!(
        kinds(rs.evaluate(&Context::new(), "ok@example.com")),
        vec![ErrorKind::NotAllowed]
    );
}

// ============================================================================
// BOUNDARIES
// ============================================================================

#[rstest]
#[case("http://h:0", vec![])]
#[case("http://h:65535", vec![])]
#[case("http://h:-1", vec![ErrorKind::Min])]
#[case("http://h:65536", vec![ErrorKind::Max])]
fn port_boundaries(#[case] value: &str, #[case] expected: Vec<ErrorKind>) {
    assert_eq!(kinds(uri().evaluate(&Context::new(), value)), expected);
}

#[rstest]
#[case("192.168.1.0", false)]
#[case("192.168.1.1", true)]
#[case("192.168.1.100", true)]
#[case("192.168.1.101", false)]
fn ip_range_endpoints(#[case] value: &str, #[case] valid: bool) {
    let rs = ip().with_range("192.168.1.1", "192.168.1.100");
    let mut out = String::new();
    assert_eq!(rs.apply(&Context::new(), value, &mut out).is_ok(), valid);
}

#[rstest]
#[case(0, false)]
#[case(1, true)]
#[case(100, true)]
#[case(101, false)]
fn int_range_endpoints(#[case] value: i64, #[case] valid: bool) {
    let rs = int::<i64>().with_range(1, 100);
    assert_eq!(rs.evaluate(&Context::new(), &value).is_ok(), valid);
}

//! Call trails rendered by `Display`.

use insta::assert_snapshot;
use nebula_ruleset::prelude::*;

#[test]
fn domain_trail() {
    let rs = domain().with_required().with_suffix(["COM"]);
    assert_snapshot!(rs.to_string(), @r#"DomainRuleSet.with_required().with_suffix("COM")"#);
}

#[test]
fn long_argument_lists_are_truncated() {
    let rs = domain().with_suffix(["com", "org", "net", "io", "dev"]);
    assert_snapshot!(
        rs.to_string(),
        @r#"DomainRuleSet.with_suffix("com", "org", "net" ... and 2 more)"#
    );
}

#[test]
fn long_string_arguments_are_truncated() {
    let rs = string().with_error_message("this message is definitely longer than the limit");
    assert_snapshot!(
        rs.to_string(),
        @r#"StringRuleSet.with_error_message("this message is definitely lo...")"#
    );
}

#[test]
fn nested_rule_sets_render_inline() {
    let rs = uri()
        .with_deep_errors()
        .with_host(domain().with_tld())
        .with_port(int::<i64>().with_min(1024));
    assert_snapshot!(
        rs.to_string(),
        @"UriRuleSet.with_deep_errors().with_host(DomainRuleSet.with_tld()).with_port(IntRuleSet.with_min(1024))"
    );
}

#[test]
fn debug_wraps_the_trail() {
    let rs = email().with_required();
    assert_snapshot!(
        format!("{rs:?}"),
        @r#"EmailRuleSet { trail: EmailRuleSet.with_required() }"#
    );
}

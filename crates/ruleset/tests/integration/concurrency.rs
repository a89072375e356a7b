//! Rule sets are shared and derived across threads without locking.

use std::thread;

use nebula_ruleset::prelude::*;

#[test]
fn shared_rule_set_evaluates_concurrently() {
    let rs = uri()
        .with_host(domain().with_tld())
        .with_query(query().with_param("page", int::<u32>().with_min(1)));

    thread::scope(|scope| {
        for worker in 0..8u32 {
            let rs = &rs;
            scope.spawn(move || {
                for page in 0..50u32 {
                    let value = format!("https://w{worker}.example.com/?page={page}");
                    let result = rs.evaluate(&Context::new(), &value);
                    assert_eq!(result.is_ok(), page >= 1, "{value}");
                }
            });
        }
    });
}

#[test]
fn concurrent_derivation_from_common_base() {
    let base = domain().with_required();

    let derived: Vec<DomainRuleSet> = thread::scope(|scope| {
        let handles: Vec<_> = ["com", "org", "net", "io"]
            .into_iter()
            .map(|suffix| {
                let base = base.clone();
                scope.spawn(move || base.with_suffix([suffix]))
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for (rs, suffix) in derived.iter().zip(["com", "org", "net", "io"]) {
        let own = format!("example.{suffix}");
        assert!(rs.evaluate(&Context::new(), &own).is_ok());
        assert!(rs.evaluate(&Context::new(), "example.dev").is_err());
    }
    assert!(base.evaluate(&Context::new(), "example.dev").is_ok());
}

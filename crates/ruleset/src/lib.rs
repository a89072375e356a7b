//! # nebula-ruleset
//!
//! Immutable, composable rule sets for validating typed input.
//!
//! ## Quick Start
//!
//! ```
//! use nebula_ruleset::prelude::*;
//!
//! let callback = uri()
//!     .with_scheme(string().with_allowed_values(["https"]))
//!     .with_host(domain().with_tld())
//!     .with_deep_errors();
//!
//! let ctx = Context::new().with_path("callback");
//! assert!(callback.evaluate(&ctx, "https://hooks.example.com/in").is_ok());
//!
//! let errors = callback.evaluate(&ctx, "ftp://example.com:99999").unwrap_err();
//! assert_eq!(errors.len(), 2);
//! assert_eq!(errors.first().unwrap().path, "/callback/scheme");
//! ```
//!
//! ## Building Rule Sets
//!
//! Every builder returns a new rule set and leaves its receiver untouched,
//! so a configured rule set can be shared across threads and extended from
//! several places. Options that exclude each other (two suffix lists, two
//! host validators) keep only the most recent call; the history is visible
//! through `Display`:
//!
//! ```
//! use nebula_ruleset::prelude::*;
//!
//! let rs = domain().with_suffix(["com"]).with_suffix(["org"]);
//! assert_eq!(rs.to_string(), r#"DomainRuleSet.with_suffix("org")"#);
//! ```
//!
//! ## Coercion
//!
//! `evaluate` checks a value already in the working type. `apply` also
//! converts at the boundary: it accepts an [`Input`](foundation::Input)
//! (text, integers, JSON, query maps) and writes the validated value into
//! an [`Output`](foundation::Output) slot.
//!
//! ## Rule Sets
//!
//! - **Text**: [`StringRuleSet`](rule_sets::StringRuleSet)
//! - **Numeric**: [`IntRuleSet`](rule_sets::IntRuleSet)
//! - **Network**: [`DomainRuleSet`](rule_sets::DomainRuleSet),
//!   [`EmailRuleSet`](rule_sets::EmailRuleSet), [`IpRuleSet`](rule_sets::IpRuleSet)
//! - **Web**: [`UriRuleSet`](rule_sets::UriRuleSet),
//!   [`QueryRuleSet`](rule_sets::QueryRuleSet)

// ValidationError carries its params inline; boxing it would add an
// allocation to every failure.
#![allow(clippy::result_large_err)]

#[macro_use]
mod macros;

pub(crate) mod encoding;
pub(crate) mod engine;
pub mod foundation;
pub mod prelude;
pub mod rule_sets;
pub mod rules;

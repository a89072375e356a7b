//! Core validation types and traits
//!
//! This module contains the fundamental building blocks of the rule engine:
//!
//! - **Traits**: [`Rule`], [`RuleSet`]
//! - **Errors**: [`ValidationError`], [`ValidationErrors`], [`ErrorKind`]
//! - **Context**: [`Context`] for error paths and rule-set annotation
//! - **Configuration**: [`ErrorConfig`] overrides, [`ConfigError`]
//! - **Boundary**: [`Input`] / [`Output`] representations used by `apply`
//!
//! # Architecture
//!
//! ## 1. Immutability
//!
//! Rule sets never change after construction. Every builder call returns a
//! new rule set that shares its history with the receiver:
//!
//! ```rust,ignore
//! let base = domain();
//! let com = base.with_suffix(["com"]);
//! let org = base.with_suffix(["org"]); // `com` is unaffected
//! ```
//!
//! ## 2. Conflict resolution
//!
//! Mutually exclusive options keep only the most recent instance:
//!
//! ```rust,ignore
//! let rs = domain().with_suffix(["com"]).with_suffix(["org"]);
//! assert_eq!(rs.to_string(), r#"DomainRuleSet.with_suffix("org")"#);
//! ```
//!
//! ## 3. Structured errors
//!
//! Every failure has a kind and a path, independent of its message:
//!
//! ```rust,ignore
//! let err = uri().with_deep_errors()
//!     .evaluate(&Context::new().with_path("url"), "https://example.com:-1")
//!     .unwrap_err();
//! assert_eq!(err.first().unwrap().path, "/url/port");
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod input;
pub mod rule;

pub use config::{ConfigError, ErrorCallback, ErrorConfig};
pub use context::Context;
pub use error::{ErrorKind, ErrorParams, ValidationError, ValidationErrors};
pub use input::{Input, Output, QueryMap};
pub use rule::{Rule, RuleFn, RuleSet};

/// A validation result carrying every failure found.
pub type ValidationResult = Result<(), ValidationErrors>;

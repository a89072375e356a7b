//! Prelude module for convenient imports.
//!
//! Provides a single `use nebula_ruleset::prelude::*;` import that brings
//! in the core traits, error types and every rule set factory.
//!
//! # Examples
//!
//! ```
//! use nebula_ruleset::prelude::*;
//!
//! let homepage = uri().with_host(domain().with_tld()).with_required();
//! let contact = email();
//! let port = int::<u16>().with_range(1, 65535);
//!
//! assert!(homepage.evaluate(&Context::new(), "https://example.com").is_ok());
//! assert!(contact.evaluate(&Context::new(), "ops@example.com").is_ok());
//! assert!(port.evaluate(&Context::new(), &443).is_ok());
//! ```

// ============================================================================
// FOUNDATION: Core traits, errors, context
// ============================================================================

pub use crate::foundation::{
    ConfigError, Context, ErrorKind, Input, Output, QueryMap, Rule, RuleFn, RuleSet,
    ValidationError, ValidationErrors, ValidationResult,
};

// ============================================================================
// RULE SETS: Types and factories
// ============================================================================

pub use crate::rule_sets::{
    DomainRuleSet, EmailRuleSet, IntRuleSet, Integer, IpRuleSet, QueryRuleSet, StringRuleSet,
    UriParts, UriRuleSet, domain, email, int, ip, query, string, uri,
};

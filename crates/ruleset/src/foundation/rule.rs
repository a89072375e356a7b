//! The rule capability
//!
//! A [`Rule`] is a single pluggable check attached to a rule set node.
//! Rule sets themselves implement [`Rule`] (and [`RuleSet`]) so they can be
//! nested as component validators of other rule sets.

use std::fmt;

use crate::foundation::{Context, ValidationErrors};

// ============================================================================
// RULE TRAIT
// ============================================================================

/// A check over values of type `T`.
///
/// Only [`evaluate`](Rule::evaluate) is required. Rules that represent a
/// mutually exclusive option declare a [`conflict_key`](Rule::conflict_key);
/// attaching a rule whose key matches an ancestor's key removes the
/// ancestor from the chain.
///
/// # Examples
///
/// ```
/// use nebula_ruleset::foundation::{Context, ErrorKind, Rule, ValidationErrors};
///
/// struct NoSpaces;
///
/// impl Rule<str> for NoSpaces {
///     fn evaluate(&self, ctx: &Context, value: &str) -> Result<(), ValidationErrors> {
///         if value.contains(' ') {
///             return Err(ctx.error(ErrorKind::Pattern, "must not contain spaces").into());
///         }
///         Ok(())
///     }
/// }
///
/// assert!(NoSpaces.evaluate(&Context::new(), "a b").is_err());
/// ```
pub trait Rule<T: ?Sized>: Send + Sync {
    /// Checks `value`, returning every violation found.
    fn evaluate(&self, ctx: &Context, value: &T) -> Result<(), ValidationErrors>;

    /// Identifies the logical option this rule configures.
    ///
    /// At most one rule per key survives along a chain.
    fn conflict_key(&self) -> Option<&str> {
        None
    }

    /// Returns true if attaching `self` should remove `other` from the chain.
    ///
    /// Defaults to comparing [`conflict_key`](Rule::conflict_key)s.
    fn replaces(&self, other: &dyn Rule<T>) -> bool {
        match (self.conflict_key(), other.conflict_key()) {
            (Some(mine), Some(theirs)) => mine == theirs,
            _ => false,
        }
    }

    /// Short description used in the rule set's call trail.
    fn label(&self) -> Option<String> {
        None
    }
}

// ============================================================================
// RULE SET TRAIT
// ============================================================================

/// A composed validator that can be nested inside another rule set.
///
/// Containers (URI components, query parameters, email domains) consult
/// [`is_required`](RuleSet::is_required) when the value is missing.
pub trait RuleSet<T: ?Sized>: Rule<T> + fmt::Display {
    /// Whether a containing structure must report a missing value.
    fn is_required(&self) -> bool;

    /// Whether explicit null is accepted at the coercion boundary.
    fn is_nilable(&self) -> bool;
}

// ============================================================================
// CLOSURE ADAPTER
// ============================================================================

/// Adapts a closure into a [`Rule`].
///
/// # Examples
///
/// ```
/// use nebula_ruleset::foundation::{Context, ErrorKind, Rule, RuleFn, ValidationErrors};
///
/// let even = RuleFn::new(|ctx: &Context, value: &i64| -> Result<(), ValidationErrors> {
///     if value % 2 == 0 {
///         Ok(())
///     } else {
///         Err(ctx.error(ErrorKind::Pattern, "must be even").into())
///     }
/// });
///
/// assert!(even.evaluate(&Context::new(), &4).is_ok());
/// assert!(even.evaluate(&Context::new(), &5).is_err());
/// ```
#[derive(Clone)]
pub struct RuleFn<F> {
    f: F,
    label: Option<String>,
}

impl<F> RuleFn<F> {
    /// Wraps `f` as a rule.
    pub fn new(f: F) -> Self {
        Self { f, label: None }
    }

    /// Names the rule in call trails.
    #[must_use = "builder methods must be chained or built"]
    pub fn named(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

impl<T, F> Rule<T> for RuleFn<F>
where
    T: ?Sized,
    F: Fn(&Context, &T) -> Result<(), ValidationErrors> + Send + Sync,
{
    fn evaluate(&self, ctx: &Context, value: &T) -> Result<(), ValidationErrors> {
        (self.f)(ctx, value)
    }

    fn label(&self) -> Option<String> {
        self.label.clone()
    }
}

impl<F> fmt::Debug for RuleFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleFn")
            .field("label", &self.label)
            .field("f", &"<function>")
            .finish()
    }
}

// ============================================================================
// TESTS
// ============================================================================

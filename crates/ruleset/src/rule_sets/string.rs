//! Plain string rule set
//!
//! The simplest rule set: no baseline, just the attached rules. Used on its
//! own and as the component validator for URI parts and query parameters.

use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::engine::apply::{apply, coerce_text, store_text};
use crate::engine::{Chain, Label};
use crate::foundation::config::expect_valid;
use crate::foundation::{ConfigError, Context, Input, Output, ValidationResult};
use crate::rules::{AllowedStrings, Matches, MaxLength, MinLength};

static BASE: LazyLock<StringRuleSet> = LazyLock::new(|| StringRuleSet {
    chain: Chain::new("StringRuleSet", ()),
});

/// Validates text.
///
/// # Examples
///
/// ```
/// use nebula_ruleset::prelude::*;
///
/// let username = string().with_min_len(3).with_max_len(16).with_regex(r"^[a-z0-9_]+$");
/// assert!(username.evaluate(&Context::new(), "alice_01").is_ok());
///
/// // Length and pattern are independent: both are reported.
/// let errors = username.evaluate(&Context::new(), "A").unwrap_err();
/// assert_eq!(errors.len(), 2);
/// ```
#[derive(Clone)]
pub struct StringRuleSet {
    chain: Chain<str, ()>,
}

impl StringRuleSet {
    /// Returns the shared base rule set.
    #[must_use]
    pub fn new() -> Self {
        BASE.clone()
    }

    /// Requires at least `min` chars.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_min_len(&self, min: usize) -> Self {
        Self {
            chain: self
                .chain
                .attach(MinLength { min }, Label::call("with_min_len").arg(min)),
        }
    }

    /// Allows at most `max` chars.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_max_len(&self, max: usize) -> Self {
        Self {
            chain: self
                .chain
                .attach(MaxLength { max }, Label::call("with_max_len").arg(max)),
        }
    }

    /// Requires a match of `pattern`.
    ///
    /// # Panics
    ///
    /// Panics if `pattern` is not a valid regular expression.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_regex(&self, pattern: &str) -> Self {
        expect_valid(self.try_with_regex(pattern))
    }

    /// Fallible [`with_regex`](Self::with_regex).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPattern`] if `pattern` does not compile.
    pub fn try_with_regex(&self, pattern: &str) -> Result<Self, ConfigError> {
        let regex = Regex::new(pattern)?;
        Ok(Self {
            chain: self
                .chain
                .attach(Matches { regex }, Label::call("with_regex").arg_str(pattern)),
        })
    }

    /// Requires the value to be one of `values`.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_allowed_values<I, S>(&self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Arc<[String]> = values.into_iter().map(Into::into).collect();
        let label = Label::call("with_allowed_values").args_str(values.iter());
        Self {
            chain: self.chain.attach(AllowedStrings { values }, label),
        }
    }

    /// Runs every attached rule against `value`.
    ///
    /// # Errors
    ///
    /// Returns every violation found.
    pub fn evaluate(&self, ctx: &Context, value: &str) -> ValidationResult {
        let ctx = self.chain.annotate(ctx);
        self.chain.evaluate_rules(&ctx, value).into_result()
    }

    /// Coerces `input` to text, evaluates it and writes it to `output`.
    ///
    /// Accepts text and JSON strings; writes to any text or JSON slot.
    ///
    /// # Errors
    ///
    /// Returns `Null`, `Type`, validation or `Internal` errors.
    pub fn apply<'i, 'o>(
        &self,
        ctx: &Context,
        input: impl Into<Input<'i>>,
        output: impl Into<Output<'o>>,
    ) -> ValidationResult {
        let ctx = self.chain.annotate(ctx);
        apply(
            &ctx,
            self.is_nilable(),
            input.into(),
            output.into(),
            coerce_text,
            |ctx, value: &String| self.evaluate(ctx, value),
            store_text,
        )
    }
}

impl Default for StringRuleSet {
    fn default() -> Self {
        Self::new()
    }
}

rule_set_common!(StringRuleSet, value: str, rule: str);

/// Returns the base [`StringRuleSet`].
#[must_use]
pub fn string() -> StringRuleSet {
    StringRuleSet::new()
}

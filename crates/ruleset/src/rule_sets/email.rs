//! Email address rule set
//!
//! Baseline (short-circuits on failure):
//! - exactly one `@`
//! - non-empty local part without leading, trailing or consecutive dots
//! - domain part accepted by the nested [`DomainRuleSet`]
//!
//! The local part is otherwise unrestricted: quoting and comments are not
//! interpreted.

use std::sync::LazyLock;

use crate::engine::apply::{apply, coerce_text, store_text};
use crate::engine::{Chain, ConflictType, Label};
use crate::foundation::{Context, ErrorKind, Input, Output, ValidationError, ValidationResult};
use crate::rule_sets::DomainRuleSet;

static BASE: LazyLock<EmailRuleSet> = LazyLock::new(|| EmailRuleSet {
    chain: Chain::new(
        "EmailRuleSet",
        EmailSettings {
            domain: DomainRuleSet::new().with_tld(),
        },
    ),
});

#[derive(Clone)]
struct EmailSettings {
    domain: DomainRuleSet,
}

fn split_address<'a>(ctx: &Context, value: &'a str) -> Result<(&'a str, &'a str), ValidationError> {
    let mut parts = value.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => Ok((local, domain)),
        _ => {
            let count = value.matches('@').count();
            Err(ctx
                .error(
                    ErrorKind::Pattern,
                    "email address must contain exactly one '@'",
                )
                .with_param("actual", count.to_string()))
        }
    }
}

fn check_local_part(ctx: &Context, local: &str) -> Result<(), ValidationError> {
    let message = if local.is_empty() {
        "local part must not be empty"
    } else if local.starts_with('.') || local.ends_with('.') {
        "local part must not start or end with a dot"
    } else if local.contains("..") {
        "local part must not contain consecutive dots"
    } else {
        return Ok(());
    };
    Err(ctx.error(ErrorKind::Pattern, message))
}

/// Validates email addresses.
///
/// # Examples
///
/// ```
/// use nebula_ruleset::prelude::*;
///
/// let rs = email();
/// assert!(rs.evaluate(&Context::new(), "user@example.com").is_ok());
/// assert!(rs.evaluate(&Context::new(), "a@@b.com").is_err());
///
/// // Intranet addresses: drop the TLD requirement.
/// let internal = email().with_domain(domain().with_suffix(["corp"]));
/// assert!(internal.evaluate(&Context::new(), "ops@mail.corp").is_ok());
/// ```
#[derive(Clone)]
pub struct EmailRuleSet {
    chain: Chain<str, EmailSettings>,
}

impl EmailRuleSet {
    /// Returns the shared base rule set.
    ///
    /// Its domain part must end in a known top-level domain.
    #[must_use]
    pub fn new() -> Self {
        BASE.clone()
    }

    /// Replaces the rule set the domain part is checked against.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_domain(&self, domain: DomainRuleSet) -> Self {
        let label = Label::call("with_domain").arg(&domain);
        Self {
            chain: self
                .chain
                .derive(ConflictType::EmailDomain, None, label, |settings| {
                    settings.extra.domain = domain;
                }),
        }
    }

    /// Checks the baseline, then every attached rule.
    ///
    /// # Errors
    ///
    /// Returns the baseline failure alone, or every rule violation.
    pub fn evaluate(&self, ctx: &Context, value: &str) -> ValidationResult {
        let ctx = self.chain.annotate(ctx);
        let (local, domain) = split_address(&ctx, value)?;
        check_local_part(&ctx, local)?;
        self.chain.extra().domain.evaluate(&ctx, domain)?;
        self.chain.evaluate_rules(&ctx, value).into_result()
    }

    /// Coerces `input` to text, evaluates it and writes it to `output`.
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

impl Default for EmailRuleSet {
    fn default() -> Self {
        Self::new()
    }
}

rule_set_common!(EmailRuleSet, value: str, rule: str);

/// Returns the base [`EmailRuleSet`].
#[must_use]
pub fn email() -> EmailRuleSet {
    EmailRuleSet::new()
}

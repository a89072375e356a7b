//! Domain name rule set
//!
//! Baseline (short-circuits on failure):
//! - IDNA conversion to ASCII; input that cannot be converted is a
//!   `Pattern` error
//! - Total length at most 253 octets (`Max`)
//! - Labels of 1..=63 chars from `[a-z0-9-]`, not starting or ending with
//!   a hyphen (`Pattern`)
//!
//! A single trailing dot (FQDN notation) is accepted. Attached rules see
//! the lowercase ASCII form.

use std::sync::{Arc, LazyLock};

use url::Host;

use crate::engine::apply::{apply, coerce_text, store_text};
use crate::engine::{Chain, Label};
use crate::foundation::config::expect_valid;
use crate::foundation::{
    ConfigError, Context, ErrorKind, Input, Output, Rule, ValidationError, ValidationResult,
};
use crate::rule_sets::tld;

const MAX_LENGTH: usize = 253;
const MAX_LABEL_LENGTH: usize = 63;

static BASE: LazyLock<DomainRuleSet> = LazyLock::new(|| DomainRuleSet {
    chain: Chain::new("DomainRuleSet", ()),
});

// ============================================================================
// BASELINE
// ============================================================================

/// Why a value is not a domain name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DomainFault {
    /// Not convertible to ASCII, or an IP literal.
    Malformed,
    /// Longer than [`MAX_LENGTH`] once converted.
    TooLong(usize),
    /// A label breaks the label rules.
    Label(String),
}

impl DomainFault {
    fn into_error(self, ctx: &Context) -> ValidationError {
        match self {
            Self::Malformed => ctx.error(ErrorKind::Pattern, "not a valid domain name"),
            Self::TooLong(len) => ctx
                .error(
                    ErrorKind::Max,
                    format!("domain name must be at most {MAX_LENGTH} characters long"),
                )
                .with_param("max", MAX_LENGTH.to_string())
                .with_param("actual", len.to_string()),
            Self::Label(label) => ctx
                .error(ErrorKind::Pattern, format!("invalid domain label {label:?}"))
                .with_param("label", label),
        }
    }
}

fn is_valid_label(label: &str) -> bool {
    !label.is_empty()
        && label.len() <= MAX_LABEL_LENGTH
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

/// Converts `value` to its lowercase ASCII form and checks its structure.
pub(crate) fn to_ascii(value: &str) -> Result<String, DomainFault> {
    let trimmed = value.strip_suffix('.').unwrap_or(value);
    // The host parser percent-decodes and maps ASCII symbols; only non-ASCII
    // text may be rewritten by IDNA.
    if trimmed
        .bytes()
        .any(|b| b.is_ascii() && !(b.is_ascii_alphanumeric() || b == b'-' || b == b'.'))
    {
        return Err(DomainFault::Malformed);
    }
    let ascii = match Host::parse(trimmed) {
        Ok(Host::Domain(domain)) => domain,
        // Dotted numerals are still a well-formed label sequence.
        Ok(Host::Ipv4(_)) => trimmed.to_ascii_lowercase(),
        Ok(Host::Ipv6(_)) | Err(_) => return Err(DomainFault::Malformed),
    };

    if ascii.len() > MAX_LENGTH {
        return Err(DomainFault::TooLong(ascii.len()));
    }
    if let Some(label) = ascii.split('.').find(|label| !is_valid_label(label)) {
        return Err(DomainFault::Label(label.to_owned()));
    }
    Ok(ascii)
}

// ============================================================================
// SUFFIX RULE
// ============================================================================

#[derive(Debug, Clone)]
enum Suffixes {
    Listed(Arc<[String]>),
    KnownTld,
}

/// Requires the domain to end in a configured suffix, with at least one
/// more label in front of it.
#[derive(Debug, Clone)]
struct SuffixRule {
    suffixes: Suffixes,
}

fn has_suffix(domain: &str, suffix: &str) -> bool {
    domain
        .strip_suffix(suffix)
        .and_then(|rest| rest.strip_suffix('.'))
        .is_some_and(|rest| !rest.is_empty())
}

impl Rule<str> for SuffixRule {
    fn evaluate(&self, ctx: &Context, value: &str) -> ValidationResult {
        match &self.suffixes {
            Suffixes::Listed(list) => {
                if list.iter().any(|suffix| has_suffix(value, suffix)) {
                    return Ok(());
                }
                Err(ctx
                    .error(
                        ErrorKind::Pattern,
                        "domain does not end in an allowed suffix",
                    )
                    .with_param("suffixes", list.join(", "))
                    .into())
            }
            Suffixes::KnownTld => {
                let known = value
                    .rsplit_once('.')
                    .is_some_and(|(_, tld)| tld::is_known(tld));
                if known {
                    return Ok(());
                }
                Err(ctx
                    .error(
                        ErrorKind::Pattern,
                        "domain does not end in a known top-level domain",
                    )
                    .into())
            }
        }
    }

    fn conflict_key(&self) -> Option<&str> {
        Some("domain.suffix")
    }
}

fn normalize_suffix(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.strip_prefix('.').unwrap_or(raw);
    if trimmed.is_empty() {
        return Err(ConfigError::InvalidSuffix(raw.to_owned()));
    }
    to_ascii(trimmed).map_err(|_| ConfigError::InvalidSuffix(raw.to_owned()))
}

// ============================================================================
// DOMAIN RULE SET
// ============================================================================

/// Validates domain names.
///
/// # Examples
///
/// ```
/// use nebula_ruleset::prelude::*;
///
/// let rs = domain().with_suffix(["com"]).with_suffix(["org"]);
/// assert!(rs.evaluate(&Context::new(), "example.org").is_ok());
/// assert!(rs.evaluate(&Context::new(), "example.com").is_err());
/// assert_eq!(rs.to_string(), r#"DomainRuleSet.with_suffix("org")"#);
/// ```
#[derive(Clone)]
pub struct DomainRuleSet {
    chain: Chain<str, ()>,
}

impl DomainRuleSet {
    /// Returns the shared base rule set.
    #[must_use]
    pub fn new() -> Self {
        BASE.clone()
    }

    /// Requires the domain to end in one of `suffixes` (e.g. `"co.uk"`),
    /// preceded by at least one label.
    ///
    /// Replaces any previous suffix or TLD rule.
    ///
    /// # Panics
    ///
    /// Panics if the list is empty or a suffix is not a valid domain.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_suffix<I, S>(&self, suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        expect_valid(self.try_with_suffix(suffixes))
    }

    /// Fallible [`with_suffix`](Self::with_suffix).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSuffix`] for an empty list or a
    /// malformed suffix.
    pub fn try_with_suffix<I, S>(&self, suffixes: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let raw: Vec<S> = suffixes.into_iter().collect();
        if raw.is_empty() {
            return Err(ConfigError::InvalidSuffix(String::new()));
        }
        let normalized = raw
            .iter()
            .map(|suffix| normalize_suffix(suffix.as_ref()))
            .collect::<Result<Arc<[String]>, _>>()?;

        let label = Label::call("with_suffix").args_str(raw.iter());
        Ok(Self {
            chain: self.chain.attach(
                SuffixRule {
                    suffixes: Suffixes::Listed(normalized),
                },
                label,
            ),
        })
    }

    /// Requires the domain to end in a known top-level domain, preceded by
    /// at least one label.
    ///
    /// Replaces any previous suffix or TLD rule.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_tld(&self) -> Self {
        Self {
            chain: self.chain.attach(
                SuffixRule {
                    suffixes: Suffixes::KnownTld,
                },
                Label::call("with_tld"),
            ),
        }
    }

    /// Checks the baseline, then every attached rule.
    ///
    /// # Errors
    ///
    /// Returns the baseline failure alone, or every rule violation.
    pub fn evaluate(&self, ctx: &Context, value: &str) -> ValidationResult {
        let ctx = self.chain.annotate(ctx);
        let ascii = to_ascii(value).map_err(|fault| fault.into_error(&ctx))?;
        self.chain.evaluate_rules(&ctx, &ascii).into_result()
    }

    /// Coerces `input` to text, evaluates it and writes it to `output`
    /// unchanged.
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

impl Default for DomainRuleSet {
    fn default() -> Self {
        Self::new()
    }
}

rule_set_common!(DomainRuleSet, value: str, rule: str);

/// Returns the base [`DomainRuleSet`].
#[must_use]
pub fn domain() -> DomainRuleSet {
    DomainRuleSet::new()
}

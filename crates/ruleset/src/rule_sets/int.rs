//! Integer rule sets
//!
//! [`IntRuleSet<T>`] covers the primitive integer types. Inputs are
//! coerced from integers, decimal text or JSON numbers; values outside the
//! range of `T` are `Type` errors.

use std::fmt;
use std::hash::Hash;
use std::str::FromStr;
use std::sync::Arc;

use serde_json::Value;

use crate::engine::apply::{apply, slot_mismatch, type_mismatch};
use crate::engine::{Chain, Label};
use crate::foundation::config::expect_valid;
use crate::foundation::{
    ConfigError, Context, ErrorKind, Input, Output, Rule, RuleSet, ValidationError, ValidationResult,
};
use crate::rules::{AllowedInts, Max, Min};

// ============================================================================
// INTEGER TRAIT
// ============================================================================

/// A primitive integer type an [`IntRuleSet`] can validate.
pub trait Integer:
    Copy + Ord + Hash + fmt::Display + fmt::Debug + FromStr + Send + Sync + 'static
{
    /// Type name used in diagnostics.
    const NAME: &'static str;

    /// Converts from `i64`, failing if out of range.
    fn from_i64(value: i64) -> Option<Self>;

    /// Converts from `u64`, failing if out of range.
    fn from_u64(value: u64) -> Option<Self>;

    /// Converts to `i64`, failing if out of range.
    fn to_i64(self) -> Option<i64>;

    /// Converts to a JSON number.
    fn to_json(self) -> Value;
}

macro_rules! impl_integer {
    ($($t:ty),+ $(,)?) => {
        $(
            impl Integer for $t {
                const NAME: &'static str = stringify!($t);

                fn from_i64(value: i64) -> Option<Self> {
                    Self::try_from(value).ok()
                }

                fn from_u64(value: u64) -> Option<Self> {
                    Self::try_from(value).ok()
                }

                fn to_i64(self) -> Option<i64> {
                    i64::try_from(self).ok()
                }

                fn to_json(self) -> Value {
                    Value::from(self)
                }
            }
        )+
    };
}

impl_integer!(i8, i16, i32, i64, u8, u16, u32, u64);

// ============================================================================
// INT RULE SET
// ============================================================================

/// Validates integers of type `T`.
///
/// # Examples
///
/// ```
/// use nebula_ruleset::prelude::*;
///
/// let percent = int::<u8>().with_range(0, 100);
/// assert!(percent.evaluate(&Context::new(), &100).is_ok());
/// assert!(percent.evaluate(&Context::new(), &101).is_err());
///
/// let mut out = 0i64;
/// percent.apply(&Context::new(), "42", &mut out).unwrap();
/// assert_eq!(out, 42);
/// ```
#[derive(Clone)]
pub struct IntRuleSet<T: Integer> {
    chain: Chain<T, ()>,
}

impl<T: Integer> IntRuleSet<T> {
    /// Returns a new base rule set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            chain: Chain::new("IntRuleSet", ()),
        }
    }

    /// Requires the value to be at least `min`.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_min(&self, min: T) -> Self {
        Self {
            chain: self.chain.attach(Min { min }, Label::call("with_min").arg(min)),
        }
    }

    /// Requires the value to be at most `max`.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_max(&self, max: T) -> Self {
        Self {
            chain: self.chain.attach(Max { max }, Label::call("with_max").arg(max)),
        }
    }

    /// Requires `min <= value <= max`.
    ///
    /// # Panics
    ///
    /// Panics if `min > max`.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_range(&self, min: T, max: T) -> Self {
        expect_valid(self.try_with_range(min, max))
    }

    /// Fallible [`with_range`](Self::with_range).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvertedRange`] if `min > max`.
    pub fn try_with_range(&self, min: T, max: T) -> Result<Self, ConfigError> {
        if min > max {
            return Err(ConfigError::InvertedRange {
                start: min.to_string(),
                end: max.to_string(),
            });
        }
        Ok(self.with_min(min).with_max(max))
    }

    /// Requires the value to be one of `values`.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_allowed_values(&self, values: impl IntoIterator<Item = T>) -> Self {
        let values: Arc<[T]> = values.into_iter().collect();
        let label = values
            .iter()
            .fold(Label::call("with_allowed_values"), |label, v| label.arg(v));
        Self {
            chain: self.chain.attach(AllowedInts { values }, label),
        }
    }

    /// Runs every attached rule against `value`.
    ///
    /// # Errors
    ///
    /// Returns every violation found.
    pub fn evaluate(&self, ctx: &Context, value: &T) -> ValidationResult {
        let ctx = self.chain.annotate(ctx);
        self.chain.evaluate_rules(&ctx, value).into_result()
    }

    /// Coerces `input` to `T`, evaluates it and writes it to `output`.
    ///
    /// Writes to integer, text, JSON and `Any` slots (`T`, `Option<T>`,
    /// `i64`, `String`, `serde_json::Value`).
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
            coerce_int::<T>,
            |ctx, value: &T| self.evaluate(ctx, value),
            store_int::<T>,
        )
    }
}

impl<T: Integer> Default for IntRuleSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

rule_set_common!(@generic[T: Integer] IntRuleSet<T>, value: T, rule: T);

/// Decimal text is parsed first (`Type` on failure), so integer rule sets
/// can check query parameters and other textual components.
impl<T: Integer> Rule<str> for IntRuleSet<T> {
    fn evaluate(&self, ctx: &Context, value: &str) -> ValidationResult {
        let parsed = coerce_int::<T>(&self.chain.annotate(ctx), Input::Text(value))?;
        self.evaluate(ctx, &parsed)
    }

    fn label(&self) -> Option<String> {
        Some(self.to_string())
    }
}

impl<T: Integer> RuleSet<str> for IntRuleSet<T> {
    fn is_required(&self) -> bool {
        self.chain.settings().required
    }

    fn is_nilable(&self) -> bool {
        self.chain.settings().nilable
    }
}

/// Returns a base [`IntRuleSet`] for `T`.
#[must_use]
pub fn int<T: Integer>() -> IntRuleSet<T> {
    IntRuleSet::new()
}

// ============================================================================
// COERCION
// ============================================================================

fn out_of_range<T: Integer>(ctx: &Context, value: impl fmt::Display) -> ValidationError {
    ctx.error(
        ErrorKind::Type,
        format!("{value} does not fit in {}", T::NAME),
    )
    .with_param("expected", T::NAME)
}

pub(crate) fn coerce_int<T: Integer>(ctx: &Context, input: Input<'_>) -> Result<T, ValidationError> {
    match input {
        Input::Int(i) => T::from_i64(i).ok_or_else(|| out_of_range::<T>(ctx, i)),
        Input::Json(Value::Number(n)) => n
            .as_i64()
            .and_then(T::from_i64)
            .or_else(|| n.as_u64().and_then(T::from_u64))
            .ok_or_else(|| out_of_range::<T>(ctx, n)),
        _ => match input.as_text() {
            Some(text) => text.trim().parse::<T>().map_err(|_| {
                tracing::debug!(input = text, target_type = T::NAME, "integer coercion failed");
                type_mismatch(ctx, &input, T::NAME)
            }),
            None => Err(type_mismatch(ctx, &input, T::NAME)),
        },
    }
}

fn store_int<T: Integer>(ctx: &Context, value: T, output: Output<'_>) -> Result<(), ValidationError> {
    let as_i64 = || value.to_i64().ok_or_else(|| slot_mismatch(ctx, "i64", T::NAME));
    match output {
        Output::Int(slot) => *slot = as_i64()?,
        Output::OptionalInt(slot) => *slot = Some(as_i64()?),
        Output::Text(slot) => *slot = value.to_string(),
        Output::OptionalText(slot) => *slot = Some(value.to_string()),
        Output::Json(slot) => *slot = value.to_json(),
        Output::Any(slot) => {
            if let Some(s) = slot.downcast_mut::<T>() {
                *s = value;
            } else if let Some(s) = slot.downcast_mut::<Option<T>>() {
                *s = Some(value);
            } else if let Some(s) = slot.downcast_mut::<i64>() {
                *s = as_i64()?;
            } else if let Some(s) = slot.downcast_mut::<String>() {
                *s = value.to_string();
            } else if let Some(s) = slot.downcast_mut::<Value>() {
                *s = value.to_json();
            } else {
                return Err(slot_mismatch(ctx, "dyn Any", T::NAME));
            }
        }
        other => return Err(slot_mismatch(ctx, other.describe(), T::NAME)),
    }
    Ok(())
}

//! Coerce, evaluate, store.
//!
//! Every rule set's `apply` runs the same pipeline; only the coercion and
//! the set of writable output slots differ per type.

use serde_json::Value;

use crate::foundation::{
    Context, ErrorKind, Input, Output, ValidationError, ValidationErrors, ValidationResult,
};

/// Runs the apply pipeline for one rule set.
///
/// 1. Null input is accepted only if `nilable`, writing the slot's "no
///    value" representation.
/// 2. `coerce` converts the input to the working value (`Type` on failure).
/// 3. `evaluate` runs the rule set.
/// 4. `store` writes the working value to the slot (`Internal` on an
///    incompatible slot).
///
/// `ctx` must already be annotated with the rule set.
pub(crate) fn apply<'i, 'o, W>(
    ctx: &Context,
    nilable: bool,
    input: Input<'i>,
    output: Output<'o>,
    coerce: impl FnOnce(&Context, Input<'i>) -> Result<W, ValidationError>,
    evaluate: impl FnOnce(&Context, &W) -> ValidationResult,
    store: impl FnOnce(&Context, W, Output<'o>) -> Result<(), ValidationError>,
) -> ValidationResult {
    if input.is_null() {
        if !nilable {
            return Err(ctx.error(ErrorKind::Null, "value must not be null").into());
        }
        output.clear();
        return Ok(());
    }

    let value = coerce(ctx, input).map_err(ValidationErrors::from)?;
    evaluate(ctx, &value)?;
    store(ctx, value, output).map_err(ValidationErrors::from)
}

/// `Type` error for an input representation the rule set cannot coerce.
pub(crate) fn type_mismatch(ctx: &Context, input: &Input<'_>, expected: &str) -> ValidationError {
    ctx.error(
        ErrorKind::Type,
        format!("expected {expected}, got {}", input.describe()),
    )
    .with_param("expected", expected.to_owned())
    .with_param("actual", input.describe())
}

/// `Internal` error for an output slot that cannot hold the value.
pub(crate) fn slot_mismatch(ctx: &Context, slot: &'static str, value: &str) -> ValidationError {
    tracing::debug!(rule_set = ?ctx.rule_set(), slot, value, "incompatible output slot");
    ctx.error(
        ErrorKind::Internal,
        format!("cannot store {value} into {slot}"),
    )
}

/// Coerces text or a JSON string.
pub(crate) fn coerce_text(ctx: &Context, input: Input<'_>) -> Result<String, ValidationError> {
    input
        .as_text()
        .map(ToOwned::to_owned)
        .ok_or_else(|| type_mismatch(ctx, &input, "string"))
}

/// Stores text into a text-like slot.
pub(crate) fn store_text(ctx: &Context, value: String, output: Output<'_>) -> Result<(), ValidationError> {
    match output {
        Output::Text(slot) => *slot = value,
        Output::OptionalText(slot) => *slot = Some(value),
        Output::Json(slot) => *slot = Value::String(value),
        Output::Any(slot) => {
            if let Some(s) = slot.downcast_mut::<String>() {
                *s = value;
            } else if let Some(s) = slot.downcast_mut::<Option<String>>() {
                *s = Some(value);
            } else if let Some(s) = slot.downcast_mut::<Value>() {
                *s = Value::String(value);
            } else {
                return Err(slot_mismatch(ctx, "dyn Any", "string"));
            }
        }
        other => return Err(slot_mismatch(ctx, other.describe(), "string")),
    }
    Ok(())
}

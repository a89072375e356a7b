//! String length rules
//!
//! Length is measured in Unicode scalar values (chars).

use crate::foundation::ErrorKind;

// ============================================================================
// MIN LENGTH
// ============================================================================

rule! {
    /// Requires at least `min` chars.
    pub MinLength { min: usize } for str;
    key "string.min_len";
    rule(self, input) { input.chars().count() >= self.min }
    error(self, ctx, input) {
        ctx.error(
            ErrorKind::Min,
            format!("must be at least {} characters long", self.min),
        )
        .with_param("min", self.min.to_string())
        .with_param("actual", input.chars().count().to_string())
    }
}

// ============================================================================
// MAX LENGTH
// ============================================================================

rule! {
    /// Allows at most `max` chars.
    pub MaxLength { max: usize } for str;
    key "string.max_len";
    rule(self, input) { input.chars().count() <= self.max }
    error(self, ctx, input) {
        ctx.error(
            ErrorKind::Max,
            format!("must be at most {} characters long", self.max),
        )
        .with_param("max", self.max.to_string())
        .with_param("actual", input.chars().count().to_string())
    }
}

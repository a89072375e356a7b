//! Integer bound rules

use crate::foundation::ErrorKind;
use crate::rule_sets::Integer;

rule! {
    /// Requires the value to be at least `min`.
    pub Min<T: Integer> { min: T } for T;
    key "int.min";
    rule(self, input) { *input >= self.min }
    error(self, ctx, input) {
        ctx.error(ErrorKind::Min, format!("must be at least {}", self.min))
            .with_param("min", self.min.to_string())
            .with_param("actual", input.to_string())
    }
}

rule! {
    /// Requires the value to be at most `max`.
    pub Max<T: Integer> { max: T } for T;
    key "int.max";
    rule(self, input) { *input <= self.max }
    error(self, ctx, input) {
        ctx.error(ErrorKind::Max, format!("must be at most {}", self.max))
            .with_param("max", self.max.to_string())
            .with_param("actual", input.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::{Context, Rule};

    #[test]
    fn test_inclusive_bounds() {
        let ctx = Context::new();
        let min = Min { min: 10u16 };
        let max = Max { max: 20u16 };

        assert!(min.evaluate(&ctx, &10).is_ok());
        assert!(max.evaluate(&ctx, &20).is_ok());
        assert_eq!(min.evaluate(&ctx, &9).unwrap_err().first().unwrap().kind, ErrorKind::Min);
        assert_eq!(max.evaluate(&ctx, &21).unwrap_err().first().unwrap().kind, ErrorKind::Max);
    }

    #[test]
    fn test_error_params() {
        let errors = Min { min: -5i32 }.evaluate(&Context::new(), &-6).unwrap_err();
        let error = errors.first().unwrap();
        assert_eq!(error.param("min"), Some("-5"));
        assert_eq!(error.param("actual"), Some("-6"));
    }
}

//! Allow-list rules

use std::sync::Arc;

use crate::foundation::ErrorKind;
use crate::rule_sets::Integer;

fn render<T: ToString>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

rule! {
    /// Requires the value to equal one of a fixed set of strings.
    pub AllowedStrings { values: Arc<[String]> } for str;
    key "allowed";
    rule(self, input) { self.values.iter().any(|v| v == input) }
    error(self, ctx, input) {
        ctx.error(ErrorKind::NotAllowed, "value is not allowed")
            .with_param("allowed", render(&self.values))
    }
}

rule! {
    /// Requires the value to equal one of a fixed set of integers.
    pub AllowedInts<T: Integer> { values: Arc<[T]> } for T;
    key "allowed";
    rule(self, input) { self.values.contains(input) }
    error(self, ctx, input) {
        ctx.error(ErrorKind::NotAllowed, format!("{input} is not allowed"))
            .with_param("allowed", render(&self.values))
    }
}

//! Regular expression rule

use regex::Regex;

use crate::foundation::ErrorKind;

rule! {
    /// Requires the whole value to be matched by a regular expression.
    ///
    /// The expression is used as given; anchor it to constrain the full
    /// value.
    pub Matches { regex: Regex } for str;
    key "string.regex";
    rule(self, input) { self.regex.is_match(input) }
    error(self, ctx, input) {
        ctx.error(
            ErrorKind::Pattern,
            format!("must match pattern {}", self.regex.as_str()),
        )
        .with_param("pattern", self.regex.as_str().to_owned())
    }
}

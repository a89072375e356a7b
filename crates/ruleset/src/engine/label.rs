//! Human-readable trail entries.

use std::fmt;

/// Arguments rendered before the rest are summarized.
const MAX_ARGS: usize = 3;

/// Characters kept from a string argument, ellipsis included.
const MAX_ARG_LEN: usize = 32;

/// One entry in a rule set's construction history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Label {
    /// The base rule set, rendered as its name.
    Root(&'static str),
    /// A builder call, rendered as `method(args)`.
    Call {
        method: &'static str,
        args: Vec<String>,
    },
}

impl Label {
    pub(crate) fn call(method: &'static str) -> Self {
        Self::Call {
            method,
            args: Vec::new(),
        }
    }

    /// Appends an argument rendered verbatim.
    #[must_use]
    pub(crate) fn arg(mut self, value: impl fmt::Display) -> Self {
        if let Self::Call { args, .. } = &mut self {
            args.push(value.to_string());
        }
        self
    }

    /// Appends a quoted string argument, truncated if long.
    #[must_use]
    pub(crate) fn arg_str(self, value: &str) -> Self {
        let quoted = if value.chars().count() > MAX_ARG_LEN {
            let kept: String = value.chars().take(MAX_ARG_LEN - 3).collect();
            format!("{:?}", format!("{kept}..."))
        } else {
            format!("{value:?}")
        };
        self.arg(quoted)
    }

    /// Appends one quoted argument per string.
    #[must_use]
    pub(crate) fn args_str<I, S>(self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        values
            .into_iter()
            .fold(self, |label, value| label.arg_str(value.as_ref()))
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root(name) => f.write_str(name),
            Self::Call { method, args } => {
                write!(f, "{method}(")?;
                for (i, arg) in args.iter().take(MAX_ARGS).enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    f.write_str(arg)?;
                }
                if args.len() > MAX_ARGS {
                    write!(f, " ... and {} more", args.len() - MAX_ARGS)?;
                }
                f.write_str(")")
            }
        }
    }
}

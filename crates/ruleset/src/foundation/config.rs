//! Per-rule-set error customization and builder-time configuration errors.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::foundation::ValidationError;

/// Callback applied to every error constructed under a rule set's scope.
pub type ErrorCallback = Arc<dyn Fn(ValidationError) -> ValidationError + Send + Sync>;

// ============================================================================
// ERROR CONFIG
// ============================================================================

/// Overrides applied when an error is constructed under a rule set.
///
/// Built up through the `with_error_*` builders shared by every rule set;
/// applied by [`Context::error`](crate::foundation::Context::error).
#[derive(Clone, Default)]
pub struct ErrorConfig {
    pub(crate) message: Option<Cow<'static, str>>,
    pub(crate) code: Option<Cow<'static, str>>,
    pub(crate) doc_uri: Option<Cow<'static, str>>,
    pub(crate) trace_uri: Option<Cow<'static, str>>,
    pub(crate) meta: Vec<(Cow<'static, str>, Cow<'static, str>)>,
    pub(crate) callback: Option<ErrorCallback>,
}

impl ErrorConfig {
    /// Applies every configured override to `error`.
    ///
    /// The callback runs last and sees the already-overridden error.
    #[must_use]
    pub fn apply(&self, mut error: ValidationError) -> ValidationError {
        if let Some(message) = &self.message {
            error.message = message.clone();
        }
        if let Some(code) = &self.code {
            error.code = code.clone();
        }
        if let Some(uri) = &self.doc_uri {
            error.doc_uri = Some(uri.clone());
        }
        if let Some(uri) = &self.trace_uri {
            error.trace_uri = Some(uri.clone());
        }
        error.params.extend(self.meta.iter().cloned());

        match &self.callback {
            Some(callback) => callback(error),
            None => error,
        }
    }
}

impl fmt::Debug for ErrorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorConfig")
            .field("message", &self.message)
            .field("code", &self.code)
            .field("doc_uri", &self.doc_uri)
            .field("trace_uri", &self.trace_uri)
            .field("meta", &self.meta)
            .field("callback", &self.callback.as_ref().map(|_| "<function>"))
            .finish()
    }
}

// ============================================================================
// CONFIG ERROR
// ============================================================================

/// An invalid literal passed to a rule set builder.
///
/// These describe defects in the calling code, not properties of the data
/// being validated. The `with_*` builders panic with this error; the
/// `try_with_*` variants return it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A CIDR block could not be parsed.
    #[error("invalid CIDR block {0:?}")]
    InvalidCidr(String),

    /// An IP address literal could not be parsed.
    #[error("invalid IP address {0:?}")]
    InvalidAddress(String),

    /// Two addresses that must share a family do not.
    #[error("address family mismatch between {0} and {1}")]
    FamilyMismatch(String, String),

    /// Range start is after range end.
    #[error("range start {start} is after range end {end}")]
    InvertedRange {
        /// Lower endpoint as given.
        start: String,
        /// Upper endpoint as given.
        end: String,
    },

    /// A domain suffix is not a valid domain.
    #[error("invalid domain suffix {0:?}")]
    InvalidSuffix(String),

    /// A regular expression failed to compile.
    #[error("invalid regular expression: {0}")]
    InvalidPattern(String),
}

impl From<regex::Error> for ConfigError {
    fn from(error: regex::Error) -> Self {
        Self::InvalidPattern(error.to_string())
    }
}

/// Unwraps a builder result, aborting on a programmer error.
pub(crate) fn expect_valid<T>(result: Result<T, ConfigError>) -> T {
    match result {
        Ok(value) => value,
        Err(error) => panic!("{error}"),
    }
}

// ============================================================================
// TESTS
// ============================================================================

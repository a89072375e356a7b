//! Error types for validation failures
//!
//! Every failure carries an [`ErrorKind`] (the taxonomy used for
//! programmatic handling), a hierarchical path such as `/url/port`, and a
//! human-readable message that callers may override per rule set.
//!
//! All string fields use `Cow<'static, str>` so static codes and messages
//! never allocate.

use std::borrow::Cow;
use std::fmt;

use serde::Serialize;
use smallvec::SmallVec;

// ============================================================================
// ERROR KIND
// ============================================================================

/// Classification of a validation failure.
///
/// The kind is independent of the (customizable) message text, so callers
/// can branch on it without string matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ErrorKind {
    /// A mandatory value is absent.
    Required,
    /// An explicit null was given where null is not allowed.
    Null,
    /// The input could not be coerced into the working type.
    Type,
    /// Format or structure violation.
    Pattern,
    /// Lower bound violation.
    Min,
    /// Upper bound violation.
    Max,
    /// Malformed percent-encoding.
    Encoding,
    /// Value outside an allow-list.
    NotAllowed,
    /// Misuse of the API at the coercion boundary.
    Internal,
}

impl ErrorKind {
    /// Returns the stable error code for this kind.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Null => "null",
            Self::Type => "type",
            Self::Pattern => "pattern",
            Self::Min => "min",
            Self::Max => "max",
            Self::Encoding => "encoding",
            Self::NotAllowed => "not_allowed",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ============================================================================
// VALIDATION ERROR
// ============================================================================

/// Ordered key-value metadata attached to an error (typically 0-2 pairs).
pub type ErrorParams = SmallVec<[(Cow<'static, str>, Cow<'static, str>); 2]>;

/// A single, located validation failure.
///
/// Errors are normally created through [`Context::error`], which fills in
/// the path and applies the rule set's [`ErrorConfig`].
///
/// [`Context::error`]: crate::foundation::Context::error
/// [`ErrorConfig`]: crate::foundation::ErrorConfig
///
/// # Examples
///
/// ```
/// use nebula_ruleset::foundation::{ErrorKind, ValidationError};
///
/// let error = ValidationError::new(ErrorKind::Max, "port must be at most 65535")
///     .with_path("/url/port")
///     .with_param("max", "65535");
///
/// assert_eq!(error.code, "max");
/// assert_eq!(error.param("max"), Some("65535"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// Taxonomy of the failure.
    pub kind: ErrorKind,

    /// Error code, defaults to [`ErrorKind::code`] unless overridden.
    pub code: Cow<'static, str>,

    /// Human-readable message.
    pub message: Cow<'static, str>,

    /// Hierarchical path of the failing value, e.g. `/url/port`.
    ///
    /// Empty when the value was validated at the root.
    pub path: String,

    /// Metadata pairs.
    pub params: ErrorParams,

    /// Link to documentation describing the failed check.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_uri: Option<Cow<'static, str>>,

    /// Link used to correlate the failure with a trace.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_uri: Option<Cow<'static, str>>,
}

impl ValidationError {
    /// Creates a new error of the given kind at the root path.
    pub fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            code: Cow::Borrowed(kind.code()),
            message: message.into(),
            path: String::new(),
            params: SmallVec::new(),
            doc_uri: None,
            trace_uri: None,
        }
    }

    /// Sets the path of this error.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Overrides the error code.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_code(mut self, code: impl Into<Cow<'static, str>>) -> Self {
        self.code = code.into();
        self
    }

    /// Replaces the message.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
        self.message = message.into();
        self
    }

    /// Adds a metadata pair.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_param(
        mut self,
        key: impl Into<Cow<'static, str>>,
        value: impl Into<Cow<'static, str>>,
    ) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Sets the documentation URI.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_doc_uri(mut self, uri: impl Into<Cow<'static, str>>) -> Self {
        self.doc_uri = Some(uri.into());
        self
    }

    /// Sets the trace URI.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_trace_uri(mut self, uri: impl Into<Cow<'static, str>>) -> Self {
        self.trace_uri = Some(uri.into());
        self
    }

    /// Looks up a metadata value by key.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k.as_ref() == key)
            .map(|(_, v)| v.as_ref())
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}: {}", self.code, self.message)?;
        } else {
            write!(f, "[{}] {}: {}", self.path, self.code, self.message)?;
        }

        if !self.params.is_empty() {
            write!(f, " (params: [")?;
            for (i, (k, v)) in self.params.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{k}={v}")?;
            }
            write!(f, "])")?;
        }

        Ok(())
    }
}

impl std::error::Error for ValidationError {}

// ============================================================================
// ERROR COLLECTION
// ============================================================================

/// An ordered collection of validation errors.
///
/// Returned by every `evaluate` / `apply` call; a successful call returns
/// `Ok(())` rather than an empty collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    /// Creates a new empty error collection.
    #[must_use]
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Adds an error to the collection.
    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Moves all errors of `other` into this collection.
    pub fn merge(&mut self, other: ValidationErrors) {
        self.errors.extend(other.errors);
    }

    /// Records the error side of `result`, if any.
    pub fn absorb(&mut self, result: Result<(), ValidationErrors>) {
        if let Err(errors) = result {
            self.merge(errors);
        }
    }

    /// Returns the first error, if any.
    #[must_use]
    pub fn first(&self) -> Option<&ValidationError> {
        self.errors.first()
    }

    /// Returns the number of errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns true if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Iterates over all errors in order.
    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.errors.iter()
    }

    /// Returns all errors.
    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Converts to a Result.
    #[must_use = "result must be used"]
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl FromIterator<ValidationError> for ValidationErrors {
    fn from_iter<I: IntoIterator<Item = ValidationError>>(iter: I) -> Self {
        Self {
            errors: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Validation failed with {} error(s):", self.errors.len())?;
        for (i, error) in self.errors.iter().enumerate() {
            writeln!(f, "  {}. {}", i + 1, error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_defaults_to_kind() {
        let error = ValidationError::new(ErrorKind::NotAllowed, "nope");
        assert_eq!(error.code, "not_allowed");
        assert!(matches!(error.code, Cow::Borrowed(_)));
    }

    #[test]
    fn test_code_override_keeps_kind() {
        let error = ValidationError::new(ErrorKind::Pattern, "bad").with_code("E_DOMAIN");
        assert_eq!(error.kind, ErrorKind::Pattern);
        assert_eq!(error.code, "E_DOMAIN");
    }

    #[test]
    fn test_display_with_path_and_params() {
        let error = ValidationError::new(ErrorKind::Min, "too small")
            .with_path("/url/port")
            .with_param("min", "0");
        assert_eq!(
            error.to_string(),
            "[/url/port] min: too small (params: [min=0])"
        );
    }

    #[test]
    fn test_collection_first_and_iter() {
        let mut errors = ValidationErrors::new();
        assert!(errors.first().is_none());

        errors.add(ValidationError::new(ErrorKind::Required, "first"));
        errors.add(ValidationError::new(ErrorKind::Pattern, "second"));

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.first().map(|e| e.kind), Some(ErrorKind::Required));
        let kinds: Vec<_> = errors.iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![ErrorKind::Required, ErrorKind::Pattern]);
    }

    #[test]
    fn test_absorb_and_into_result() {
        let mut errors = ValidationErrors::new();
        errors.absorb(Ok(()));
        assert!(errors.clone().into_result().is_ok());

        errors.absorb(Err(ValidationError::new(ErrorKind::Max, "big").into()));
        assert_eq!(errors.into_result().unwrap_err().len(), 1);
    }

    #[test]
    fn test_serialize_kind_snake_case() {
        let error = ValidationError::new(ErrorKind::NotAllowed, "nope").with_path("/a");
        let json = serde_json::to_value(&error).unwrap();
        assert_eq!(json["kind"], "not_allowed");
        assert_eq!(json["path"], "/a");
        assert!(json.get("doc_uri").is_none());
    }
}

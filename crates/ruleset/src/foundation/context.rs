//! Evaluation context
//!
//! A [`Context`] travels through every `evaluate` / `apply` call. It carries
//! the hierarchical path used to locate errors and the annotation of the
//! rule set currently evaluating (its name and [`ErrorConfig`]).
//!
//! Contexts are cheap to clone: the path is a persistent list of shared
//! segments, so descending into a component never copies the parent path.
//!
//! # Examples
//!
//! ```
//! use nebula_ruleset::foundation::{Context, ErrorKind};
//!
//! let ctx = Context::new().with_path("url").with_path("port");
//! assert_eq!(ctx.path(), "/url/port");
//!
//! let error = ctx.error(ErrorKind::Max, "port must be at most 65535");
//! assert_eq!(error.path, "/url/port");
//! ```

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::foundation::{ErrorConfig, ErrorKind, ValidationError};

#[derive(Debug)]
struct Segment {
    parent: Option<Arc<Segment>>,
    name: String,
}

/// Path and rule-set annotation for one evaluation.
#[derive(Clone, Default)]
pub struct Context {
    path: Option<Arc<Segment>>,
    rule_set: Option<&'static str>,
    error_config: Option<Arc<ErrorConfig>>,
}

impl Context {
    /// Creates a root context with an empty path.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a child context one path segment deeper.
    #[must_use]
    pub fn with_path(&self, segment: impl Into<String>) -> Self {
        Self {
            path: Some(Arc::new(Segment {
                parent: self.path.clone(),
                name: segment.into(),
            })),
            rule_set: self.rule_set,
            error_config: self.error_config.clone(),
        }
    }

    /// Renders the path as `/a/b/c`; the root path renders as an empty string.
    #[must_use]
    pub fn path(&self) -> String {
        let mut names = Vec::new();
        let mut segment = self.path.as_deref();
        while let Some(s) = segment {
            names.push(s.name.as_str());
            segment = s.parent.as_deref();
        }

        let mut path = String::new();
        for name in names.iter().rev() {
            path.push('/');
            path.push_str(name);
        }
        path
    }

    /// Name of the rule set currently evaluating, if any.
    #[must_use]
    pub fn rule_set(&self) -> Option<&'static str> {
        self.rule_set
    }

    /// Error overrides of the rule set currently evaluating, if any.
    #[must_use]
    pub fn error_config(&self) -> Option<&ErrorConfig> {
        self.error_config.as_deref()
    }

    /// Annotates the context with the rule set that is about to evaluate.
    ///
    /// Replaces any previous annotation, so errors raised by a nested rule
    /// set use the nested set's overrides rather than the parent's.
    #[must_use]
    pub(crate) fn for_rule_set(
        &self,
        name: &'static str,
        error_config: Option<Arc<ErrorConfig>>,
    ) -> Self {
        Self {
            path: self.path.clone(),
            rule_set: Some(name),
            error_config,
        }
    }

    /// Constructs an error located at this context's path, applying the
    /// current rule set's [`ErrorConfig`].
    #[must_use]
    pub fn error(&self, kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> ValidationError {
        let error = ValidationError::new(kind, message).with_path(self.path());
        match &self.error_config {
            Some(config) => config.apply(error),
            None => error,
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("path", &self.path())
            .field("rule_set", &self.rule_set)
            .field("error_config", &self.error_config)
            .finish()
    }
}

// ============================================================================
// TESTS
// ============================================================================

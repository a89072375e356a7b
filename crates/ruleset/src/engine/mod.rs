//! The persistent rule chain
//!
//! Every rule set wraps a [`Chain`]: a singly linked list of immutable
//! nodes, leaf first, shared through `Arc`. Builder calls push one new
//! node; nothing already built is ever mutated, so any number of children
//! can derive from a common base concurrently.
//!
//! ```text
//!            base ── with_required ── with_suffix("com")      (child 1)
//!                               └──── with_tld()              (child 2)
//! ```
//!
//! Attaching a node first removes ancestors it supersedes (see
//! [`Chain::derive`]); ancestors between the removed node and the new head
//! are re-created with the new parent, everything above is shared.

pub(crate) mod apply;
pub(crate) mod label;

use std::fmt;
use std::sync::Arc;

use crate::foundation::{Context, ErrorConfig, Rule, ValidationErrors};

pub(crate) use label::Label;

// ============================================================================
// CONFLICT TYPE
// ============================================================================

/// Logical option a node configures.
///
/// At most one node per category (other than `None`) survives along a
/// chain; attaching a second one removes the first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) enum ConflictType {
    #[default]
    None,
    Required,
    Nilable,
    ErrorMessage,
    ErrorCode,
    DocUri,
    TraceUri,
    ErrorCallback,
    // uri
    Relative,
    DeepErrors,
    UserRequired,
    PasswordRequired,
    HostRequired,
    PortRequired,
    Scheme,
    User,
    Password,
    Host,
    Port,
    Path,
    Query,
    Fragment,
    // email
    EmailDomain,
}

// ============================================================================
// SETTINGS
// ============================================================================

/// Configuration visible at a node: shared flags plus type-specific state.
///
/// Copied forward into each new node, so the head always holds the
/// effective configuration.
#[derive(Debug, Clone, Default)]
pub(crate) struct Settings<S> {
    pub(crate) required: bool,
    pub(crate) nilable: bool,
    pub(crate) error_config: Option<Arc<ErrorConfig>>,
    pub(crate) extra: S,
}

// ============================================================================
// NODE
// ============================================================================

struct Node<R: ?Sized, S> {
    parent: Option<Arc<Node<R, S>>>,
    rule: Option<Arc<dyn Rule<R>>>,
    conflict: ConflictType,
    label: Label,
    settings: Settings<S>,
}

impl<R: ?Sized, S: Clone> Node<R, S> {
    fn conflicts_with(&self, conflict: ConflictType, rule: Option<&dyn Rule<R>>) -> bool {
        if conflict != ConflictType::None && self.conflict == conflict {
            return true;
        }
        match (rule, self.rule.as_deref()) {
            (Some(new), Some(existing)) => new.replaces(existing),
            _ => false,
        }
    }

    fn reparent(&self, parent: Option<Arc<Node<R, S>>>) -> Self {
        Self {
            parent,
            rule: self.rule.clone(),
            conflict: self.conflict,
            label: self.label.clone(),
            settings: self.settings.clone(),
        }
    }
}

/// Returns `node`'s chain with every node conflicting with the new option
/// removed; `None` when every node was removed.
///
/// Returns the same `Arc` when nothing changed.
fn without_conflicts<R: ?Sized, S: Clone>(
    name: &'static str,
    node: &Arc<Node<R, S>>,
    conflict: ConflictType,
    rule: Option<&dyn Rule<R>>,
) -> Option<Arc<Node<R, S>>> {
    if node.conflicts_with(conflict, rule) {
        tracing::trace!(rule_set = name, removed = %node.label, "superseded option removed");
        return node
            .parent
            .as_ref()
            .and_then(|parent| without_conflicts(name, parent, conflict, rule));
    }

    let Some(parent) = &node.parent else {
        return Some(Arc::clone(node));
    };

    match without_conflicts(name, parent, conflict, rule) {
        Some(resolved) if Arc::ptr_eq(&resolved, parent) => Some(Arc::clone(node)),
        resolved => Some(Arc::new(node.reparent(resolved))),
    }
}

// ============================================================================
// CHAIN
// ============================================================================

/// Head of an immutable rule chain.
///
/// `R` is the value type attached rules receive, `S` the type-specific
/// state carried in [`Settings::extra`].
pub(crate) struct Chain<R: ?Sized, S> {
    name: &'static str,
    head: Arc<Node<R, S>>,
}

impl<R: ?Sized, S> Clone for Chain<R, S> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            head: Arc::clone(&self.head),
        }
    }
}

impl<R: ?Sized, S: Clone> Chain<R, S> {
    /// Creates a base chain with a single root node.
    pub(crate) fn new(name: &'static str, extra: S) -> Self {
        Self {
            name,
            head: Arc::new(Node {
                parent: None,
                rule: None,
                conflict: ConflictType::None,
                label: Label::Root(name),
                settings: Settings {
                    required: false,
                    nilable: false,
                    error_config: None,
                    extra,
                },
            }),
        }
    }

    pub(crate) fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn settings(&self) -> &Settings<S> {
        &self.head.settings
    }

    pub(crate) fn extra(&self) -> &S {
        &self.head.settings.extra
    }

    /// Pushes a new node.
    ///
    /// `update` edits a copy of the current settings. Ancestors whose
    /// category equals `conflict`, or whose rule is replaced by `rule`, are
    /// removed first.
    pub(crate) fn derive<F>(
        &self,
        conflict: ConflictType,
        rule: Option<Arc<dyn Rule<R>>>,
        label: Label,
        update: F,
    ) -> Self
    where
        F: FnOnce(&mut Settings<S>),
    {
        let mut settings = self.head.settings.clone();
        update(&mut settings);

        let parent = without_conflicts(self.name, &self.head, conflict, rule.as_deref());

        Self {
            name: self.name,
            head: Arc::new(Node {
                parent,
                rule,
                conflict,
                label,
                settings,
            }),
        }
    }

    /// Pushes a node carrying `rule`, with no conflict category.
    pub(crate) fn attach<Q>(&self, rule: Q, label: Label) -> Self
    where
        Q: Rule<R> + 'static,
    {
        let rule: Arc<dyn Rule<R>> = Arc::new(rule);
        self.derive(ConflictType::None, Some(rule), label, |_| {})
    }

    /// Pushes a node that edits the error overrides.
    pub(crate) fn with_error_config<F>(&self, conflict: ConflictType, label: Label, update: F) -> Self
    where
        F: FnOnce(&mut ErrorConfig),
    {
        self.derive(conflict, None, label, |settings| {
            let mut config = settings
                .error_config
                .as_deref()
                .cloned()
                .unwrap_or_default();
            update(&mut config);
            settings.error_config = Some(Arc::new(config));
        })
    }

    /// Annotates `ctx` with this rule set's name and error overrides.
    pub(crate) fn annotate(&self, ctx: &Context) -> Context {
        ctx.for_rule_set(self.name, self.head.settings.error_config.clone())
    }

    /// Runs every attached rule, leaf to root, collecting all failures.
    pub(crate) fn evaluate_rules(&self, ctx: &Context, value: &R) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        let mut node = Some(&self.head);
        while let Some(current) = node {
            if let Some(rule) = &current.rule {
                errors.absorb(rule.evaluate(ctx, value));
            }
            node = current.parent.as_ref();
        }
        errors
    }

    pub(crate) fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.head, &other.head)
    }

    /// Number of nodes, root included.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        let mut len = 0;
        let mut node = Some(&self.head);
        while let Some(current) = node {
            len += 1;
            node = current.parent.as_ref();
        }
        len
    }
}

impl<R: ?Sized, S> fmt::Display for Chain<R, S> {
    /// Renders the construction history, e.g.
    /// `DomainRuleSet.with_required().with_suffix("com")`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut labels = Vec::new();
        let mut node = Some(&self.head);
        while let Some(current) = node {
            labels.push(&current.label);
            node = current.parent.as_ref();
        }

        for (i, label) in labels.iter().rev().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{label}")?;
        }
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::{ErrorKind, ValidationResult};

    struct Tagged {
        key: &'static str,
        name: &'static str,
    }

    impl Rule<str> for Tagged {
        fn evaluate(&self, ctx: &Context, _value: &str) -> ValidationResult {
            Err(ctx.error(ErrorKind::Pattern, self.name).into())
        }

        fn conflict_key(&self) -> Option<&str> {
            Some(self.key)
        }
    }

    fn tagged(key: &'static str, name: &'static str) -> Option<Arc<dyn Rule<str>>> {
        Some(Arc::new(Tagged { key, name }))
    }

    fn base() -> Chain<str, ()> {
        Chain::new("TestRuleSet", ())
    }

    #[test]
    fn test_derive_pushes_one_node() {
        let chain = base().derive(ConflictType::Required, None, Label::call("with_required"), |s| {
            s.required = true;
        });
        assert_eq!(chain.len(), 2);
        assert!(chain.settings().required);
        assert_eq!(chain.to_string(), "TestRuleSet.with_required()");
    }

    #[test]
    fn test_same_category_is_replaced() {
        let chain = base()
            .derive(ConflictType::Relative, None, Label::call("first"), |_| {})
            .derive(ConflictType::None, tagged("x", "x"), Label::call("unrelated"), |_| {})
            .derive(ConflictType::Relative, None, Label::call("second"), |_| {});

        assert_eq!(chain.len(), 3);
        assert_eq!(chain.to_string(), "TestRuleSet.unrelated().second()");
    }

    #[test]
    fn test_replaced_rule_is_not_evaluated() {
        let chain = base()
            .derive(ConflictType::None, tagged("suffix", "old"), Label::call("a"), |_| {})
            .derive(ConflictType::None, tagged("suffix", "new"), Label::call("b"), |_| {});

        let errors = chain.evaluate_rules(&Context::new(), "value");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.first().unwrap().message, "new");
    }

    #[test]
    fn test_unchanged_ancestors_are_shared() {
        let parent = base().derive(ConflictType::Required, None, Label::call("with_required"), |_| {});
        let child = parent.derive(ConflictType::None, tagged("k", "v"), Label::call("rule"), |_| {});

        let resolved = without_conflicts(
            "TestRuleSet",
            &child.head,
            ConflictType::Nilable,
            None,
        )
        .unwrap();
        assert!(Arc::ptr_eq(&resolved, &child.head));
    }

    #[test]
    fn test_siblings_are_independent() {
        let parent = base().derive(ConflictType::None, tagged("k", "parent"), Label::call("p"), |_| {});
        let left = parent.derive(ConflictType::None, tagged("k", "left"), Label::call("l"), |_| {});
        let right = parent.derive(ConflictType::None, tagged("other", "right"), Label::call("r"), |_| {});

        assert_eq!(left.evaluate_rules(&Context::new(), "").len(), 1);
        assert_eq!(right.evaluate_rules(&Context::new(), "").len(), 2);
        assert_eq!(parent.evaluate_rules(&Context::new(), "").len(), 1);
    }

    #[test]
    fn test_all_rules_run_leaf_to_root() {
        let chain = base()
            .derive(ConflictType::None, tagged("a", "root-most"), Label::call("a"), |_| {})
            .derive(ConflictType::None, tagged("b", "leaf-most"), Label::call("b"), |_| {});

        let errors = chain.evaluate_rules(&Context::new(), "");
        let messages: Vec<_> = errors.iter().map(|e| e.message.as_ref()).collect();
        assert_eq!(messages, vec!["leaf-most", "root-most"]);
    }

    #[test]
    fn test_error_config_accumulates() {
        let chain = base()
            .with_error_config(ConflictType::ErrorCode, Label::call("code"), |c| {
                c.code = Some("E1".into());
            })
            .with_error_config(ConflictType::ErrorMessage, Label::call("msg"), |c| {
                c.message = Some("custom".into());
            });

        let config = chain.settings().error_config.as_deref().unwrap();
        assert_eq!(config.code.as_deref(), Some("E1"));
        assert_eq!(config.message.as_deref(), Some("custom"));
    }
}

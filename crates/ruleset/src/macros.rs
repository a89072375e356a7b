//! Internal macros removing boilerplate from rules and rule sets.
//!
//! - `rule!`: a leaf rule (struct + `Rule` impl) from a condition and an
//!   error expression
//! - `rule_set_common!`: the builders and trait impls every rule set shares

// ============================================================================
// RULE MACRO
// ============================================================================

/// Creates a leaf rule: struct definition plus `Rule` implementation.
///
/// `#[derive(Debug, Clone)]` is always applied. The rule reports a conflict
/// key, so attaching it twice keeps only the latest instance.
///
/// ```rust,ignore
/// rule! {
///     /// Minimum length in chars.
///     pub MinLength { min: usize } for str;
///     key "string.min_len";
///     rule(self, input) { input.chars().count() >= self.min }
///     error(self, ctx, input) { ctx.error(ErrorKind::Min, "too short") }
/// }
/// ```
macro_rules! rule {
    (
        $(#[$meta:meta])*
        $vis:vis $name:ident $(<$gen:ident: $bound:path>)? { $($field:ident: $fty:ty),+ $(,)? } for $input:ty;
        key $key:literal;
        rule($self_:ident, $inp:ident) $rule:block
        error($self2:ident, $ctx:ident, $einp:ident) $err:block
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        $vis struct $name $(<$gen: $bound>)? {
            $($vis $field: $fty,)+
        }

        impl $(<$gen: $bound>)? $crate::foundation::Rule<$input> for $name $(<$gen>)? {
            #[allow(unused_variables)]
            fn evaluate(
                &$self_,
                ctx: &$crate::foundation::Context,
                $inp: &$input,
            ) -> $crate::foundation::ValidationResult {
                if $rule {
                    Ok(())
                } else {
                    let $ctx = ctx;
                    let $einp = $inp;
                    Err($err.into())
                }
            }

            fn conflict_key(&self) -> Option<&str> {
                Some($key)
            }
        }
    };
}

// ============================================================================
// RULE SET MACRO
// ============================================================================

/// Generates what every rule set shares.
///
/// The rule set must be a struct with a single `chain` field and provide
/// inherent `evaluate(&self, &Context, &Value)` and `apply` methods.
///
/// - `value`: type accepted by `evaluate`
/// - `rule`: type handed to attached rules (differs for URIs)
/// - `@generic[T: Bound]`: optional type parameters, written before the
///   type as `rule_set_common!(@generic[T: Integer] IntRuleSet<T>, ..)`
///
/// Generated: the shared builders (`with_required`, `with_nil`,
/// `with_rule`, `with_rule_fn`, error customization), flag accessors,
/// `ptr_eq`, `Display` / `Debug` and the `Rule` / `RuleSet` impls that let
/// the rule set nest inside another.
macro_rules! rule_set_common {
    (
        $(@generic[$($gen:ident: $bound:path),+])? $ty:ty,
        value: $value:ty,
        rule: $rule:ty $(,)?
    ) => {
        impl $(<$($gen: $bound),+>)? $ty {
            /// Marks the value as mandatory when nested in a container.
            ///
            /// Idempotent: returns the same rule set if already required.
            #[must_use = "builder methods must be chained or built"]
            pub fn with_required(&self) -> Self {
                if self.chain.settings().required {
                    return self.clone();
                }
                Self {
                    chain: self.chain.derive(
                        $crate::engine::ConflictType::Required,
                        None,
                        $crate::engine::Label::call("with_required"),
                        |settings| settings.required = true,
                    ),
                }
            }

            /// Accepts explicit null at the coercion boundary.
            ///
            /// Idempotent: returns the same rule set if already nilable.
            #[must_use = "builder methods must be chained or built"]
            pub fn with_nil(&self) -> Self {
                if self.chain.settings().nilable {
                    return self.clone();
                }
                Self {
                    chain: self.chain.derive(
                        $crate::engine::ConflictType::Nilable,
                        None,
                        $crate::engine::Label::call("with_nil"),
                        |settings| settings.nilable = true,
                    ),
                }
            }

            /// Attaches a custom rule.
            ///
            /// Ancestors the rule [`replaces`]($crate::foundation::Rule::replaces)
            /// are removed.
            #[must_use = "builder methods must be chained or built"]
            pub fn with_rule<Q>(&self, rule: Q) -> Self
            where
                Q: $crate::foundation::Rule<$rule> + 'static,
            {
                let label = $crate::engine::Label::call("with_rule").arg(
                    $crate::foundation::Rule::<$rule>::label(&rule)
                        .unwrap_or_else(|| "..".to_owned()),
                );
                let rule: ::std::sync::Arc<dyn $crate::foundation::Rule<$rule>> =
                    ::std::sync::Arc::new(rule);
                Self {
                    chain: self.chain.derive(
                        $crate::engine::ConflictType::None,
                        Some(rule),
                        label,
                        |_| {},
                    ),
                }
            }

            /// Attaches a closure as a custom rule.
            #[must_use = "builder methods must be chained or built"]
            pub fn with_rule_fn<F>(&self, f: F) -> Self
            where
                F: Fn(&$crate::foundation::Context, &$rule) -> $crate::foundation::ValidationResult
                    + Send
                    + Sync
                    + 'static,
            {
                self.with_rule($crate::foundation::RuleFn::new(f))
            }

            /// Replaces the message of every error raised by this rule set.
            #[must_use = "builder methods must be chained or built"]
            pub fn with_error_message(
                &self,
                message: impl Into<::std::borrow::Cow<'static, str>>,
            ) -> Self {
                let message = message.into();
                let label = $crate::engine::Label::call("with_error_message").arg_str(&message);
                Self {
                    chain: self.chain.with_error_config(
                        $crate::engine::ConflictType::ErrorMessage,
                        label,
                        |config| config.message = Some(message),
                    ),
                }
            }

            /// Replaces the code of every error raised by this rule set.
            #[must_use = "builder methods must be chained or built"]
            pub fn with_error_code(&self, code: impl Into<::std::borrow::Cow<'static, str>>) -> Self {
                let code = code.into();
                let label = $crate::engine::Label::call("with_error_code").arg_str(&code);
                Self {
                    chain: self.chain.with_error_config(
                        $crate::engine::ConflictType::ErrorCode,
                        label,
                        |config| config.code = Some(code),
                    ),
                }
            }

            /// Attaches a documentation link to every error.
            #[must_use = "builder methods must be chained or built"]
            pub fn with_doc_uri(&self, uri: impl Into<::std::borrow::Cow<'static, str>>) -> Self {
                let uri = uri.into();
                let label = $crate::engine::Label::call("with_doc_uri").arg_str(&uri);
                Self {
                    chain: self.chain.with_error_config(
                        $crate::engine::ConflictType::DocUri,
                        label,
                        |config| config.doc_uri = Some(uri),
                    ),
                }
            }

            /// Attaches a trace link to every error.
            #[must_use = "builder methods must be chained or built"]
            pub fn with_trace_uri(&self, uri: impl Into<::std::borrow::Cow<'static, str>>) -> Self {
                let uri = uri.into();
                let label = $crate::engine::Label::call("with_trace_uri").arg_str(&uri);
                Self {
                    chain: self.chain.with_error_config(
                        $crate::engine::ConflictType::TraceUri,
                        label,
                        |config| config.trace_uri = Some(uri),
                    ),
                }
            }

            /// Adds a metadata pair to every error. Pairs accumulate.
            #[must_use = "builder methods must be chained or built"]
            pub fn with_error_meta(
                &self,
                key: impl Into<::std::borrow::Cow<'static, str>>,
                value: impl Into<::std::borrow::Cow<'static, str>>,
            ) -> Self {
                let (key, value) = (key.into(), value.into());
                let label = $crate::engine::Label::call("with_error_meta")
                    .arg_str(&key)
                    .arg_str(&value);
                Self {
                    chain: self.chain.with_error_config(
                        $crate::engine::ConflictType::None,
                        label,
                        |config| config.meta.push((key, value)),
                    ),
                }
            }

            /// Transforms every error raised by this rule set, after the
            /// other overrides are applied.
            #[must_use = "builder methods must be chained or built"]
            pub fn with_error_callback<F>(&self, callback: F) -> Self
            where
                F: Fn($crate::foundation::ValidationError) -> $crate::foundation::ValidationError
                    + Send
                    + Sync
                    + 'static,
            {
                let callback: $crate::foundation::ErrorCallback = ::std::sync::Arc::new(callback);
                Self {
                    chain: self.chain.with_error_config(
                        $crate::engine::ConflictType::ErrorCallback,
                        $crate::engine::Label::call("with_error_callback").arg(".."),
                        |config| config.callback = Some(callback),
                    ),
                }
            }

            /// Whether a containing structure must report a missing value.
            #[must_use]
            pub fn is_required(&self) -> bool {
                self.chain.settings().required
            }

            /// Whether explicit null is accepted by `apply`.
            #[must_use]
            pub fn is_nilable(&self) -> bool {
                self.chain.settings().nilable
            }

            /// Returns true if both handles point at the same node.
            #[must_use]
            pub fn ptr_eq(&self, other: &Self) -> bool {
                self.chain.ptr_eq(&other.chain)
            }
        }

        impl $(<$($gen: $bound),+>)? ::std::fmt::Display for $ty {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::fmt::Display::fmt(&self.chain, f)
            }
        }

        impl $(<$($gen: $bound),+>)? ::std::fmt::Debug for $ty {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.debug_struct(self.chain.name())
                    .field("trail", &format_args!("{}", self.chain))
                    .finish()
            }
        }

        impl $(<$($gen: $bound),+>)? $crate::foundation::Rule<$value> for $ty {
            fn evaluate(
                &self,
                ctx: &$crate::foundation::Context,
                value: &$value,
            ) -> $crate::foundation::ValidationResult {
                <$ty>::evaluate(self, ctx, value)
            }

            fn label(&self) -> Option<String> {
                Some(self.to_string())
            }
        }

        impl $(<$($gen: $bound),+>)? $crate::foundation::RuleSet<$value> for $ty {
            fn is_required(&self) -> bool {
                self.chain.settings().required
            }

            fn is_nilable(&self) -> bool {
                self.chain.settings().nilable
            }
        }
    };
}

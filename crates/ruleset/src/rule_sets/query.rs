//! Query string rule set
//!
//! The working value is the encoded query text (`a=1&b=2`, without the
//! leading `?`). Decoded maps and JSON objects are re-encoded canonically
//! before validation: keys in sorted order, values in their given order,
//! `application/x-www-form-urlencoded` escaping.
//!
//! Baseline: every `%` starts a valid escape (`Encoding`).

use std::sync::{Arc, LazyLock};

use serde_json::{Map, Value};
use url::form_urlencoded;

use crate::encoding::check_escapes;
use crate::engine::apply::{apply, slot_mismatch, type_mismatch};
use crate::engine::{Chain, Label};
use crate::foundation::{
    Context, ErrorKind, Input, Output, QueryMap, Rule, RuleSet, ValidationError, ValidationResult,
};

static BASE: LazyLock<QueryRuleSet> = LazyLock::new(|| QueryRuleSet {
    chain: Chain::new("QueryRuleSet", ()),
});

// ============================================================================
// ENCODING
// ============================================================================

/// Encodes `map` canonically.
///
/// Keys with an empty value list produce no output; `apply` rejects such
/// maps instead of dropping the key.
#[must_use]
pub fn encode(map: &QueryMap) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, values) in map {
        for value in values {
            serializer.append_pair(key, value);
        }
    }
    serializer.finish()
}

/// Decodes query text into a map. Malformed escapes decode leniently.
#[must_use]
pub fn decode(text: &str) -> QueryMap {
    let mut map = QueryMap::new();
    for (key, value) in form_urlencoded::parse(text.as_bytes()) {
        map.entry(key.into_owned())
            .or_default()
            .push(value.into_owned());
    }
    map
}

fn first_value(text: &str, name: &str) -> Option<String> {
    form_urlencoded::parse(text.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

fn json_scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn json_to_map(object: &Map<String, Value>) -> Option<QueryMap> {
    object
        .iter()
        .map(|(key, value)| {
            let values = match value {
                Value::Array(items) => items.iter().map(json_scalar).collect::<Option<Vec<_>>>()?,
                scalar => vec![json_scalar(scalar)?],
            };
            Some((key.clone(), values))
        })
        .collect()
}

fn map_to_json(map: QueryMap) -> Value {
    let object = map
        .into_iter()
        .map(|(key, mut values)| {
            let value = if values.len() == 1 {
                Value::String(values.remove(0))
            } else {
                Value::Array(values.into_iter().map(Value::String).collect())
            };
            (key, value)
        })
        .collect();
    Value::Object(object)
}

// ============================================================================
// PARAMETER RULE
// ============================================================================

/// Validates the first value of one named parameter.
struct ParamRule {
    name: String,
    key: String,
    rule_set: Arc<dyn RuleSet<str>>,
}

impl Rule<str> for ParamRule {
    fn evaluate(&self, ctx: &Context, value: &str) -> ValidationResult {
        let ctx = ctx.with_path(self.name.as_str());
        match first_value(value, &self.name) {
            Some(param) => self.rule_set.evaluate(&ctx, &param),
            None if self.rule_set.is_required() => Err(ctx
                .error(
                    ErrorKind::Required,
                    format!("query parameter {:?} is required", self.name),
                )
                .with_param("parameter", self.name.clone())
                .into()),
            None => Ok(()),
        }
    }

    fn conflict_key(&self) -> Option<&str> {
        Some(&self.key)
    }
}

// ============================================================================
// QUERY RULE SET
// ============================================================================

/// Validates query strings.
///
/// # Examples
///
/// ```
/// use nebula_ruleset::prelude::*;
///
/// let rs = query()
///     .with_param("page", int::<u32>().with_min(1).with_required())
///     .with_param("sort", string().with_allowed_values(["asc", "desc"]));
///
/// assert!(rs.evaluate(&Context::new(), "page=2&sort=asc").is_ok());
///
/// let errors = rs.evaluate(&Context::new(), "sort=up").unwrap_err();
/// assert_eq!(errors.len(), 2);
/// ```
#[derive(Clone)]
pub struct QueryRuleSet {
    chain: Chain<str, ()>,
}

impl QueryRuleSet {
    /// Returns the shared base rule set.
    #[must_use]
    pub fn new() -> Self {
        BASE.clone()
    }

    /// Validates the first value of parameter `name` with `rule_set`.
    ///
    /// A missing parameter is a `Required` error at `/<name>` only if
    /// `rule_set` is required. Re-adding a name replaces its rule set.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_param<R>(&self, name: impl Into<String>, rule_set: R) -> Self
    where
        R: RuleSet<str> + 'static,
    {
        let name = name.into();
        let label = Label::call("with_param").arg_str(&name).arg(&rule_set);
        let rule = ParamRule {
            key: format!("query.param:{name}"),
            name,
            rule_set: Arc::new(rule_set),
        };
        Self {
            chain: self.chain.attach(rule, label),
        }
    }

    /// Checks the baseline, then every attached rule.
    ///
    /// # Errors
    ///
    /// Returns the baseline failure alone, or every rule violation.
    pub fn evaluate(&self, ctx: &Context, value: &str) -> ValidationResult {
        let ctx = self.chain.annotate(ctx);
        check_escapes(&ctx, value)?;
        self.chain.evaluate_rules(&ctx, value).into_result()
    }

    /// Coerces `input` to query text, evaluates it and writes it to
    /// `output`.
    ///
    /// Accepts text, [`QueryMap`] and JSON objects whose values are scalars
    /// or arrays of scalars. Writes text to text slots, the decoded map to
    /// [`QueryMap`] slots and a JSON object to JSON slots.
    ///
    /// # Errors
    ///
    /// Returns `Null`, `Type`, validation or `Internal` errors.
    pub fn apply<'i, 'o>(
        &self,
        ctx: &Context,
        input: impl Into<Input<'i>>,
        output: impl Into<Output<'o>>,
    ) -> ValidationResult {
        let ctx = self.chain.annotate(ctx);
        apply(
            &ctx,
            self.is_nilable(),
            input.into(),
            output.into(),
            coerce_query,
            |ctx, value: &String| self.evaluate(ctx, value),
            store_query,
        )
    }
}

impl Default for QueryRuleSet {
    fn default() -> Self {
        Self::new()
    }
}

rule_set_common!(QueryRuleSet, value: str, rule: str);

/// Returns the base [`QueryRuleSet`].
#[must_use]
pub fn query() -> QueryRuleSet {
    QueryRuleSet::new()
}

// ============================================================================
// COERCION
// ============================================================================

/// A key without values has no encoding and would vanish on the way back.
fn encode_checked(
    ctx: &Context,
    input: &Input<'_>,
    map: &QueryMap,
) -> Result<String, ValidationError> {
    match map.iter().find(|(_, values)| values.is_empty()) {
        Some((key, _)) => Err(type_mismatch(ctx, input, "query map")
            .with_param("reason", "empty value list")
            .with_param("parameter", key.clone())),
        None => Ok(encode(map)),
    }
}

fn coerce_query(ctx: &Context, input: Input<'_>) -> Result<String, ValidationError> {
    match input {
        Input::Query(map) => encode_checked(ctx, &input, map),
        Input::Json(Value::Object(object)) => match json_to_map(object) {
            Some(map) => encode_checked(ctx, &input, &map),
            None => {
                Err(type_mismatch(ctx, &input, "query map").with_param("reason", "nested value"))
            }
        },
        _ => input
            .as_text()
            .map(ToOwned::to_owned)
            .ok_or_else(|| type_mismatch(ctx, &input, "query string")),
    }
}

fn store_query(ctx: &Context, text: String, output: Output<'_>) -> Result<(), ValidationError> {
    match output {
        Output::Text(slot) => *slot = text,
        Output::OptionalText(slot) => *slot = Some(text),
        Output::Query(slot) => *slot = decode(&text),
        Output::Json(slot) => *slot = map_to_json(decode(&text)),
        Output::Any(slot) => {
            if let Some(s) = slot.downcast_mut::<String>() {
                *s = text;
            } else if let Some(s) = slot.downcast_mut::<Option<String>>() {
                *s = Some(text);
            } else if let Some(s) = slot.downcast_mut::<QueryMap>() {
                *s = decode(&text);
            } else if let Some(s) = slot.downcast_mut::<Value>() {
                *s = map_to_json(decode(&text));
            } else {
                return Err(slot_mismatch(ctx, "dyn Any", "query"));
            }
        }
        other => return Err(slot_mismatch(ctx, other.describe(), "query")),
    }
    Ok(())
}

//! Representations accepted and produced at the coercion boundary.
//!
//! [`Input`] enumerates every loosely-typed shape a value may arrive in;
//! [`Output`] enumerates every slot a validated value may be written to.
//! Each rule set's `apply` accepts the subset that makes sense for its type
//! and rejects the rest with `Type` (input) or `Internal` (output) errors.

use std::any::Any;
use std::collections::BTreeMap;
use std::net::IpAddr;

use serde_json::Value;

/// A decoded query string: each key maps to all of its values in order.
///
/// Keys are kept sorted, which is also the canonical encoding order.
pub type QueryMap = BTreeMap<String, Vec<String>>;

// ============================================================================
// INPUT
// ============================================================================

/// A value arriving at the coercion boundary.
#[derive(Debug, Clone, Copy)]
pub enum Input<'a> {
    /// Explicit absence.
    Null,
    /// Text.
    Text(&'a str),
    /// An integer.
    Int(i64),
    /// A structured IP address.
    Ip(IpAddr),
    /// A decoded query multimap.
    Query(&'a QueryMap),
    /// A decoded JSON value; `null`, strings, numbers and objects are
    /// unwrapped into the variants above.
    Json(&'a Value),
}

impl Input<'_> {
    /// Returns true if the input denotes explicit absence.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null | Self::Json(Value::Null))
    }

    /// Returns the text carried by a `Text` or JSON string input.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(*s),
            Self::Json(Value::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Short name of the representation, used in `Type` error messages.
    #[must_use]
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Null | Self::Json(Value::Null) => "null",
            Self::Text(_) | Self::Json(Value::String(_)) => "string",
            Self::Int(_) | Self::Json(Value::Number(_)) => "number",
            Self::Ip(_) => "IP address",
            Self::Query(_) | Self::Json(Value::Object(_)) => "map",
            Self::Json(Value::Bool(_)) => "boolean",
            Self::Json(Value::Array(_)) => "array",
        }
    }
}

impl<'a> From<&'a str> for Input<'a> {
    fn from(value: &'a str) -> Self {
        Self::Text(value)
    }
}

impl<'a> From<&'a String> for Input<'a> {
    fn from(value: &'a String) -> Self {
        Self::Text(value)
    }
}

impl<'a> From<Option<&'a str>> for Input<'a> {
    fn from(value: Option<&'a str>) -> Self {
        value.map_or(Self::Null, Self::Text)
    }
}

impl From<i64> for Input<'_> {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<IpAddr> for Input<'_> {
    fn from(value: IpAddr) -> Self {
        Self::Ip(value)
    }
}

impl<'a> From<&'a QueryMap> for Input<'a> {
    fn from(value: &'a QueryMap) -> Self {
        Self::Query(value)
    }
}

impl<'a> From<&'a Value> for Input<'a> {
    fn from(value: &'a Value) -> Self {
        Self::Json(value)
    }
}

// ============================================================================
// OUTPUT
// ============================================================================

/// A mutable slot receiving a validated value.
///
/// `Any` is the generic holder: the rule set downcasts it to the concrete
/// types it knows how to write.
pub enum Output<'a> {
    /// Text slot.
    Text(&'a mut String),
    /// Optional text slot; receives `None` for accepted nulls.
    OptionalText(&'a mut Option<String>),
    /// Integer slot.
    Int(&'a mut i64),
    /// Optional integer slot.
    OptionalInt(&'a mut Option<i64>),
    /// IP address slot.
    Ip(&'a mut IpAddr),
    /// Optional IP address slot.
    OptionalIp(&'a mut Option<IpAddr>),
    /// Query multimap slot.
    Query(&'a mut QueryMap),
    /// JSON slot; receives `null` for accepted nulls.
    Json(&'a mut Value),
    /// Generic holder.
    Any(&'a mut dyn Any),
}

impl Output<'_> {
    /// Writes the "no value" representation, if the slot has one.
    ///
    /// Slots that cannot represent absence are left untouched.
    pub(crate) fn clear(self) {
        match self {
            Self::OptionalText(slot) => *slot = None,
            Self::OptionalInt(slot) => *slot = None,
            Self::OptionalIp(slot) => *slot = None,
            Self::Json(slot) => *slot = Value::Null,
            Self::Any(slot) => {
                if let Some(s) = slot.downcast_mut::<Option<String>>() {
                    *s = None;
                } else if let Some(s) = slot.downcast_mut::<Option<i64>>() {
                    *s = None;
                } else if let Some(s) = slot.downcast_mut::<Option<IpAddr>>() {
                    *s = None;
                } else if let Some(s) = slot.downcast_mut::<Value>() {
                    *s = Value::Null;
                }
            }
            Self::Text(_) | Self::Int(_) | Self::Ip(_) | Self::Query(_) => {}
        }
    }

    /// Short name of the slot, used in `Internal` error messages.
    #[must_use]
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Text(_) => "String",
            Self::OptionalText(_) => "Option<String>",
            Self::Int(_) => "i64",
            Self::OptionalInt(_) => "Option<i64>",
            Self::Ip(_) => "IpAddr",
            Self::OptionalIp(_) => "Option<IpAddr>",
            Self::Query(_) => "QueryMap",
            Self::Json(_) => "serde_json::Value",
            Self::Any(_) => "dyn Any",
        }
    }
}

impl<'a> From<&'a mut String> for Output<'a> {
    fn from(slot: &'a mut String) -> Self {
        Self::Text(slot)
    }
}

impl<'a> From<&'a mut Option<String>> for Output<'a> {
    fn from(slot: &'a mut Option<String>) -> Self {
        Self::OptionalText(slot)
    }
}

impl<'a> From<&'a mut i64> for Output<'a> {
    fn from(slot: &'a mut i64) -> Self {
        Self::Int(slot)
    }
}

impl<'a> From<&'a mut Option<i64>> for Output<'a> {
    fn from(slot: &'a mut Option<i64>) -> Self {
        Self::OptionalInt(slot)
    }
}

impl<'a> From<&'a mut IpAddr> for Output<'a> {
    fn from(slot: &'a mut IpAddr) -> Self {
        Self::Ip(slot)
    }
}

impl<'a> From<&'a mut Option<IpAddr>> for Output<'a> {
    fn from(slot: &'a mut Option<IpAddr>) -> Self {
        Self::OptionalIp(slot)
    }
}

impl<'a> From<&'a mut QueryMap> for Output<'a> {
    fn from(slot: &'a mut QueryMap) -> Self {
        Self::Query(slot)
    }
}

impl<'a> From<&'a mut Value> for Output<'a> {
    fn from(slot: &'a mut Value) -> Self {
        Self::Json(slot)
    }
}

// ============================================================================
// TESTS
// ============================================================================

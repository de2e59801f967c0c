//! Action records and the trust-boundary checks that admit them.
//!
//! An [`Action`] is a flat record with a required `"type"` discriminant and
//! any number of extra fields. Inside the process actions are always built
//! through the typed constructors, so no runtime shape checks are needed.
//! Payloads that arrive from outside (JSON from a socket, a file, a test
//! fixture) go through [`Action::from_value`], which is the only place the
//! plain-object predicate and the [`ValueKind`] probe are used.
//!
//! # Example
//!
//! ```
//! use statecell_core::action::Action;
//! use serde_json::json;
//!
//! let action = Action::new("todos/add").with("text", "write docs");
//! assert_eq!(action.action_type(), "todos/add");
//! assert_eq!(action.get("text"), Some(&json!("write docs")));
//!
//! let parsed = Action::from_value(json!({ "type": "todos/add", "text": "write docs" })).unwrap();
//! assert_eq!(parsed, action);
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// Errors produced when admitting an externally supplied action.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// The payload was not a plain object.
    #[error("Actions must be plain objects, but the received value was a {kind}")]
    NotAPlainObject {
        /// What was received instead
        kind: ValueKind,
    },

    /// The `"type"` field was missing or not a string.
    #[error("Actions must have a string \"type\" field, but it was {kind}")]
    InvalidType {
        /// Kind of the `"type"` field (`undefined` when absent)
        kind: ValueKind,
    },
}

/// Coarse classification of an arbitrary JSON value.
///
/// Only used to make diagnostics readable ("expected a plain object, received
/// an array").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// No value at all (a missing field)
    Undefined,
    /// JSON `null`
    Null,
    /// `true` / `false`
    Boolean,
    /// Any JSON number
    Number,
    /// JSON string
    String,
    /// JSON array
    Array,
    /// JSON object
    Object,
}

impl ValueKind {
    /// Classify a value.
    #[must_use]
    pub const fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Boolean,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }

    /// Classify a possibly missing value; `None` is [`ValueKind::Undefined`].
    #[must_use]
    pub const fn of_optional(value: Option<&Value>) -> Self {
        match value {
            Some(value) => Self::of(value),
            None => Self::Undefined,
        }
    }

    /// The lowercase tag used in diagnostics
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns `true` if `value` is a literal key/value record.
///
/// JSON has no class instances, so every object qualifies and nothing else
/// does.
#[must_use]
pub const fn is_plain_object(value: &Value) -> bool {
    matches!(value, Value::Object(_))
}

/// A structured record describing an intended state change.
///
/// Serializes as a flat object: `{"type": "...", ...payload}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    action_type: String,

    #[serde(flatten)]
    payload: Map<String, Value>,
}

impl Action {
    /// Create an action with the given type and no extra fields.
    #[must_use]
    pub fn new(action_type: impl Into<String>) -> Self {
        Self {
            action_type: action_type.into(),
            payload: Map::new(),
        }
    }

    /// Add (or overwrite) an extra field.
    ///
    /// A field named `"type"` is ignored so the discriminant cannot be
    /// shadowed by payload data.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        if key != "type" {
            self.payload.insert(key, value.into());
        }
        self
    }

    /// The discriminant
    #[must_use]
    pub fn action_type(&self) -> &str {
        &self.action_type
    }

    /// All extra fields
    #[must_use]
    pub const fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }

    /// Look up a single extra field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    /// Whether this action carries a usable discriminant.
    ///
    /// Typed construction cannot produce a non-record action, so the only
    /// malformation left is an empty type tag.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        !self.action_type.is_empty()
    }

    /// Admit an externally supplied JSON value as an action.
    ///
    /// # Errors
    ///
    /// - [`ActionError::NotAPlainObject`] if `value` is not an object
    /// - [`ActionError::InvalidType`] if the `"type"` field is missing or not a string
    pub fn from_value(value: Value) -> Result<Self, ActionError> {
        let mut fields = match value {
            Value::Object(fields) => fields,
            other => {
                return Err(ActionError::NotAPlainObject {
                    kind: ValueKind::of(&other),
                });
            },
        };

        match fields.remove("type") {
            Some(Value::String(action_type)) => Ok(Self {
                action_type,
                payload: fields,
            }),
            other => Err(ActionError::InvalidType {
                kind: ValueKind::of_optional(other.as_ref()),
            }),
        }
    }

    /// Render this action as a flat JSON object.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut fields = self.payload.clone();
        fields.insert("type".to_string(), Value::String(self.action_type.clone()));
        Value::Object(fields)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.action_type)
    }
}

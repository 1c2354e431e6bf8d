//! Typed field access over a generic JSON object
//!
//! Every accessor checks presence and type of a single field and reports the
//! failing field by path, so decoders can chain them with `?` and stop at the
//! first invalid field.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::records::Unit;

/// A JSON object as produced by `serde_json`.
pub type Object = Map<String, Value>;

/// Why a message could not be decoded. Advisory: callers only ever see the
/// resulting parse-error outcome.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("message is not a JSON object")]
    NotAnObject,

    #[error("{field}: not found")]
    Missing { field: String },

    #[error("{field}: expected {expected}")]
    WrongType {
        field: String,
        expected: &'static str,
    },

    #[error("{field}: unit of {len} bytes exceeds capacity")]
    UnitTooLong { field: String, len: usize },
}

impl DecodeError {
    pub fn wrong_type(field: impl Into<String>, expected: &'static str) -> Self {
        Self::WrongType {
            field: field.into(),
            expected,
        }
    }

    /// Prefix the failing field with the path of its enclosing value.
    pub fn within(self, parent: &str) -> Self {
        let nest = |field: String| {
            if field.starts_with('[') {
                format!("{parent}{field}")
            } else {
                format!("{parent}.{field}")
            }
        };

        match self {
            Self::NotAnObject => Self::NotAnObject,
            Self::Missing { field } => Self::Missing { field: nest(field) },
            Self::WrongType { field, expected } => Self::WrongType {
                field: nest(field),
                expected,
            },
            Self::UnitTooLong { field, len } => Self::UnitTooLong {
                field: nest(field),
                len,
            },
        }
    }

    /// Path of the field that failed, if any.
    #[cfg(test)]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::NotAnObject => None,
            Self::Missing { field }
            | Self::WrongType { field, .. }
            | Self::UnitTooLong { field, .. } => Some(field),
        }
    }
}

/// View a value as an object.
pub fn as_object(value: &Value) -> Result<&Object, DecodeError> {
    value.as_object().ok_or(DecodeError::NotAnObject)
}

/// Typed "try-get" accessors for the fields of a JSON object.
pub trait Fields {
    fn field(&self, key: &str) -> Result<&Value, DecodeError>;

    fn number(&self, key: &str) -> Result<f64, DecodeError> {
        self.field(key)?
            .as_f64()
            .ok_or_else(|| DecodeError::wrong_type(key, "number"))
    }

    fn boolean(&self, key: &str) -> Result<bool, DecodeError> {
        self.field(key)?
            .as_bool()
            .ok_or_else(|| DecodeError::wrong_type(key, "boolean"))
    }

    fn string(&self, key: &str) -> Result<&str, DecodeError> {
        self.field(key)?
            .as_str()
            .ok_or_else(|| DecodeError::wrong_type(key, "string"))
    }

    fn object(&self, key: &str) -> Result<&Object, DecodeError> {
        self.field(key)?
            .as_object()
            .ok_or_else(|| DecodeError::wrong_type(key, "object"))
    }

    fn array(&self, key: &str) -> Result<&[Value], DecodeError> {
        self.field(key)?
            .as_array()
            .map(Vec::as_slice)
            .ok_or_else(|| DecodeError::wrong_type(key, "array"))
    }

    /// Capture time in whole seconds. Fractions are dropped and out-of-range
    /// values saturate.
    fn timestamp(&self) -> Result<u32, DecodeError> {
        self.number("timestamp").map(|seconds| seconds as u32)
    }

    /// A unit string that must fit a [`Unit`].
    fn unit(&self, key: &str) -> Result<Unit, DecodeError> {
        let text = self.string(key)?;
        let mut unit = Unit::new();
        unit.push_str(text).map_err(|_| DecodeError::UnitTooLong {
            field: key.to_string(),
            len: text.len(),
        })?;
        Ok(unit)
    }
}

impl Fields for Object {
    fn field(&self, key: &str) -> Result<&Value, DecodeError> {
        self.get(key).ok_or_else(|| DecodeError::Missing {
            field: key.to_string(),
        })
    }
}

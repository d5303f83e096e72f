use std::num::ParseIntError;

use crate::schema::FieldKind;

/// A raw value could not be converted to a field's declared kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoercionError {
    #[error("nil value provided")]
    NilValue,

    #[error("unsupported declared kind '{0}'")]
    UnsupportedKind(&'static str),

    #[error("cannot coerce {found} into {expected}")]
    Incompatible {
        expected: FieldKind,
        found: &'static str,
    },

    #[error("numeric '{text}' is not a 64-bit integer: {source}")]
    InvalidNumber { text: String, source: ParseIntError },

    #[error("temporal value outside timestamp range ({seconds}s since epoch)")]
    TimestampOutOfRange { seconds: i64 },
}

/// Assigning a coerced value into a record field failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WriteError {
    #[error("record has no field '{0}'")]
    UnknownField(String),

    #[error("field '{0}' is not assignable")]
    Unassignable(String),

    #[error("field '{field}' expects {expected}, got {found}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MapError {
    #[error("invalid target kind: {0} is not a record")]
    InvalidTargetKind(String),

    #[error("unable to map column '{0}' to a record field")]
    FieldNotMapped(String),

    #[error("row has no value at ordinal {ordinal} (row length {len})")]
    MissingValue { ordinal: usize, len: usize },

    #[error("coercion error: {0}")]
    Coercion(#[from] CoercionError),

    #[error("write error: {0}")]
    Write(#[from] WriteError),

    #[error("config error: {0}")]
    Config(String),
}

impl MapError {
    /// Fatal errors abort the call that raised them; the rest only skip one column.
    pub fn is_fatal(&self) -> bool {
        matches!(self, MapError::InvalidTargetKind(_) | MapError::Config(_))
    }

    /// Add context to the error.
    ///
    /// Message-carrying variants get the context prepended; wrapped errors
    /// keep their structure and are returned unchanged.
    pub fn with_context(self, ctx: impl std::fmt::Display) -> Self {
        match self {
            MapError::InvalidTargetKind(msg) => {
                MapError::InvalidTargetKind(format!("{ctx}: {msg}"))
            }
            MapError::Config(msg) => MapError::Config(format!("{ctx}: {msg}")),
            other => other,
        }
    }
}

use crate::error::CoercionError;
use crate::schema::FieldKind;
use crate::value::{RawValue, Timestamp, TypedValue};

/// Convert one source-native value into the given declared kind.
///
/// `Null` fails with `NilValue` before any kind-specific branch runs.
pub fn coerce(value: &RawValue<'_>, kind: FieldKind) -> Result<TypedValue, CoercionError> {
    if value.is_null() {
        return Err(CoercionError::NilValue);
    }

    match kind {
        FieldKind::Int64 => to_int64(value).map(TypedValue::Int64),
        FieldKind::Int32 => to_int32(value).map(TypedValue::Int32),
        FieldKind::Text => to_text(value).map(TypedValue::Text),
        FieldKind::Timestamp => to_timestamp(value).map(TypedValue::Timestamp),
        FieldKind::Unsupported(name) => Err(CoercionError::UnsupportedKind(name)),
    }
}

pub fn to_int64(value: &RawValue<'_>) -> Result<i64, CoercionError> {
    match value {
        RawValue::Int64(v) => Ok(*v),
        RawValue::Numeric(text) => {
            text.parse::<i64>()
                .map_err(|source| CoercionError::InvalidNumber {
                    text: text.to_string(),
                    source,
                })
        }
        RawValue::Null => Err(CoercionError::NilValue),
        other => Err(incompatible(FieldKind::Int64, other)),
    }
}

/// Goes through the int64 path, then truncates to the low 32 bits.
pub fn to_int32(value: &RawValue<'_>) -> Result<i32, CoercionError> {
    to_int64(value)
        .map(|v| v as i32)
        .map_err(|e| match e {
            CoercionError::Incompatible { found, .. } => CoercionError::Incompatible {
                expected: FieldKind::Int32,
                found,
            },
            other => other,
        })
}

/// Only text values qualify; other kinds are never stringified.
pub fn to_text(value: &RawValue<'_>) -> Result<String, CoercionError> {
    match value {
        RawValue::Text(text) => Ok(text.clone().into_owned()),
        RawValue::Null => Err(CoercionError::NilValue),
        other => Err(incompatible(FieldKind::Text, other)),
    }
}

pub fn to_timestamp(value: &RawValue<'_>) -> Result<Timestamp, CoercionError> {
    match value {
        RawValue::DateTime(dt) => Timestamp::from_datetime(dt)
            .ok_or(CoercionError::TimestampOutOfRange {
                seconds: dt.timestamp(),
            }),
        RawValue::NaiveDateTime(naive) => {
            let dt = naive.and_utc();
            Timestamp::from_datetime(&dt).ok_or(CoercionError::TimestampOutOfRange {
                seconds: dt.timestamp(),
            })
        }
        RawValue::Null => Err(CoercionError::NilValue),
        other => Err(incompatible(FieldKind::Timestamp, other)),
    }
}

fn incompatible(expected: FieldKind, found: &RawValue<'_>) -> CoercionError {
    CoercionError::Incompatible {
        expected,
        found: found.type_name(),
    }
}

use std::borrow::Cow;
use std::fmt;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

/// Source-native value of a single column, as handed over by the driver.
///
/// Strategy by type:
/// - Integers, floats, booleans: already decoded by the driver
/// - Numeric: arbitrary-precision number kept in its canonical base-10 text
/// - Text, Bytes: `Cow` (zero-copy when the driver buffer outlives the row)
/// - DateTime / NaiveDateTime: native temporal values
pub enum RawValue<'a> {
    Int64(i64),
    Float64(f64),
    Bool(bool),
    /// Canonical base-10 text, e.g. `"-1200"` or `"3.25"`.
    Numeric(Cow<'a, str>),
    Text(Cow<'a, str>),
    Bytes(Cow<'a, [u8]>),
    DateTime(DateTime<chrono::FixedOffset>),
    /// Zone-less temporal value; interpreted as UTC.
    NaiveDateTime(NaiveDateTime),

    Null,
}

impl RawValue<'_> {
    /// Source kind name used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            RawValue::Int64(_) => "int64",
            RawValue::Float64(_) => "float64",
            RawValue::Bool(_) => "bool",
            RawValue::Numeric(_) => "numeric",
            RawValue::Text(_) => "text",
            RawValue::Bytes(_) => "bytes",
            RawValue::DateTime(_) => "datetime",
            RawValue::NaiveDateTime(_) => "naive datetime",
            RawValue::Null => "null",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, RawValue::Null)
    }
}

impl fmt::Debug for RawValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Int64(v) => write!(f, "Int64({v})"),
            RawValue::Float64(v) => write!(f, "Float64({v})"),
            RawValue::Bool(v) => write!(f, "Bool({v})"),
            RawValue::Numeric(v) => write!(f, "Numeric({v})"),
            RawValue::Text(v) => write!(f, "Text({v:?})"),
            RawValue::Bytes(v) => write!(f, "Bytes({} bytes)", v.len()),
            RawValue::DateTime(v) => write!(f, "DateTime({v})"),
            RawValue::NaiveDateTime(v) => write!(f, "NaiveDateTime({v})"),
            RawValue::Null => f.write_str("Null"),
        }
    }
}

impl From<i64> for RawValue<'_> {
    fn from(v: i64) -> Self {
        RawValue::Int64(v)
    }
}

impl<'a> From<&'a str> for RawValue<'a> {
    fn from(v: &'a str) -> Self {
        RawValue::Text(Cow::Borrowed(v))
    }
}

impl From<String> for RawValue<'_> {
    fn from(v: String) -> Self {
        RawValue::Text(Cow::Owned(v))
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for RawValue<'_> {
    fn from(v: DateTime<Tz>) -> Self {
        RawValue::DateTime(v.fixed_offset())
    }
}

impl<'a, T> From<Option<T>> for RawValue<'a>
where
    T: Into<RawValue<'a>>,
{
    fn from(v: Option<T>) -> Self {
        v.map_or(RawValue::Null, Into::into)
    }
}

/// Coerced value — exactly one variant per supported declared kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedValue {
    Int64(i64),
    Int32(i32),
    Text(String),
    Timestamp(Timestamp),
}

impl TypedValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            TypedValue::Int64(_) => "int64",
            TypedValue::Int32(_) => "int32",
            TypedValue::Text(_) => "string",
            TypedValue::Timestamp(_) => "timestamp",
        }
    }
}

/// Portable point in time: seconds and nanoseconds since the Unix epoch, UTC.
///
/// Independent of any database wire format. Range is
/// `0001-01-01T00:00:00Z ..= 9999-12-31T23:59:59.999999999Z`; `nanos` is
/// always in `0..1_000_000_000`, also for instants before the epoch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Timestamp {
    pub seconds: i64,
    pub nanos: i32,
}

impl Timestamp {
    /// `0001-01-01T00:00:00Z`.
    pub const MIN_SECONDS: i64 = -62_135_596_800;
    /// `9999-12-31T23:59:59Z`.
    pub const MAX_SECONDS: i64 = 253_402_300_799;

    /// Returns `None` outside the valid range.
    pub fn from_datetime<Tz: TimeZone>(dt: &DateTime<Tz>) -> Option<Self> {
        let seconds = dt.timestamp();
        if !(Self::MIN_SECONDS..=Self::MAX_SECONDS).contains(&seconds) {
            return None;
        }
        // chrono folds leap seconds into nanos >= 1e9.
        let nanos = dt.timestamp_subsec_nanos();
        if nanos >= 1_000_000_000 {
            return None;
        }
        Some(Self {
            seconds,
            nanos: nanos as i32,
        })
    }

    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        let nanos = u32::try_from(self.nanos).ok()?;
        DateTime::from_timestamp(self.seconds, nanos)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Some(dt) => write!(f, "{}", dt.to_rfc3339()),
            None => write!(f, "{}s+{}ns", self.seconds, self.nanos),
        }
    }
}

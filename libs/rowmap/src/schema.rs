use std::any::TypeId;
use std::fmt;

use crate::error::WriteError;
use crate::value::{Timestamp, TypedValue};

/// Declared kind of a record field. Closed set plus an explicit escape for
/// field types the coercion engine cannot produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Int64,
    Int32,
    Text,
    Timestamp,
    /// Carries the Rust type name of the field.
    Unsupported(&'static str),
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Int64 => f.write_str("int64"),
            FieldKind::Int32 => f.write_str("int32"),
            FieldKind::Text => f.write_str("string"),
            FieldKind::Timestamp => f.write_str("timestamp"),
            FieldKind::Unsupported(name) => f.write_str(name),
        }
    }
}

/// A single field of a target record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Field name as declared on the record; `set_field` is addressed by it.
    pub name: &'static str,
    pub kind: FieldKind,
    /// Column name declared on the field (`#[column(name = "...")]`).
    pub tag: Option<&'static str>,
}

impl FieldDescriptor {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind, tag: None }
    }

    pub const fn tagged(name: &'static str, kind: FieldKind, tag: &'static str) -> Self {
        Self {
            name,
            kind,
            tag: Some(tag),
        }
    }
}

/// Identity and field layout of a record type.
///
/// `fields` is only called when a field table is (re)built, so a configure
/// that hits the cache enumerates nothing.
#[derive(Clone, Copy)]
pub struct RecordType {
    pub name: &'static str,
    pub type_id: TypeId,
    pub fields: fn() -> Vec<FieldDescriptor>,
}

impl RecordType {
    pub fn of<T: 'static>(name: &'static str, fields: fn() -> Vec<FieldDescriptor>) -> Self {
        Self {
            name,
            type_id: TypeId::of::<T>(),
            fields,
        }
    }
}

impl fmt::Debug for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordType").field("name", &self.name).finish()
    }
}

/// Structural shape of a mapping target.
///
/// Only `Record`, or `Reference` to a `Record`, can be configured.
#[derive(Debug, Clone)]
pub enum Shape {
    Record(RecordType),
    Reference(Box<Shape>),
    Scalar(&'static str),
    Sequence(Box<Shape>),
}

impl Shape {
    /// Resolve the record behind at most one level of reference.
    pub fn record(&self) -> Option<&RecordType> {
        match self {
            Shape::Record(record) => Some(record),
            Shape::Reference(inner) => match inner.as_ref() {
                Shape::Record(record) => Some(record),
                _ => None,
            },
            _ => None,
        }
    }

    /// Human-readable description used in `InvalidTargetKind`.
    pub fn describe(&self) -> String {
        match self {
            Shape::Record(record) => record.name.to_string(),
            Shape::Reference(inner) => format!("&{}", inner.describe()),
            Shape::Scalar(name) => (*name).to_string(),
            Shape::Sequence(inner) => format!("[{}]", inner.describe()),
        }
    }
}

/// A type rows can be mapped into.
///
/// Usually implemented with `#[derive(Record)]`. Hand-written impls are the
/// explicit registration path for types that cannot use the derive.
pub trait RecordShape: 'static {
    fn shape() -> Shape;

    /// Assign a coerced value to the field with the given declared name.
    fn set_field(&mut self, name: &str, value: TypedValue) -> Result<(), WriteError>;
}

impl<T: RecordShape> RecordShape for Box<T> {
    fn shape() -> Shape {
        Shape::Reference(Box::new(T::shape()))
    }

    fn set_field(&mut self, name: &str, value: TypedValue) -> Result<(), WriteError> {
        (**self).set_field(name, value)
    }
}

impl<T: RecordShape> RecordShape for Vec<T> {
    fn shape() -> Shape {
        Shape::Sequence(Box::new(T::shape()))
    }

    fn set_field(&mut self, name: &str, _value: TypedValue) -> Result<(), WriteError> {
        Err(WriteError::Unassignable(name.to_string()))
    }
}

macro_rules! scalar_shape {
    ($($ty:ty => $name:literal),* $(,)?) => {
        $(
            impl RecordShape for $ty {
                fn shape() -> Shape {
                    Shape::Scalar($name)
                }

                fn set_field(&mut self, name: &str, _value: TypedValue) -> Result<(), WriteError> {
                    Err(WriteError::Unassignable(name.to_string()))
                }
            }
        )*
    };
}

scalar_shape! {
    i64 => "i64",
    i32 => "i32",
    f64 => "f64",
    bool => "bool",
    String => "String",
    Timestamp => "Timestamp",
}

/// Field-level conversion from a coerced value into a Rust field type.
pub trait FromTypedValue: Sized {
    const EXPECTED: &'static str;

    fn from_typed(value: TypedValue) -> Option<Self>;

    /// Used by generated `set_field` impls.
    fn assign(slot: &mut Self, field: &str, value: TypedValue) -> Result<(), WriteError> {
        let found = value.type_name();
        match Self::from_typed(value) {
            Some(v) => {
                *slot = v;
                Ok(())
            }
            None => Err(WriteError::TypeMismatch {
                field: field.to_string(),
                expected: Self::EXPECTED,
                found,
            }),
        }
    }
}

impl FromTypedValue for i64 {
    const EXPECTED: &'static str = "int64";

    fn from_typed(value: TypedValue) -> Option<Self> {
        match value {
            TypedValue::Int64(v) => Some(v),
            _ => None,
        }
    }
}

impl FromTypedValue for i32 {
    const EXPECTED: &'static str = "int32";

    fn from_typed(value: TypedValue) -> Option<Self> {
        match value {
            TypedValue::Int32(v) => Some(v),
            _ => None,
        }
    }
}

impl FromTypedValue for String {
    const EXPECTED: &'static str = "string";

    fn from_typed(value: TypedValue) -> Option<Self> {
        match value {
            TypedValue::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl FromTypedValue for Timestamp {
    const EXPECTED: &'static str = "timestamp";

    fn from_typed(value: TypedValue) -> Option<Self> {
        match value {
            TypedValue::Timestamp(v) => Some(v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Point {
        x: i64,
    }

    impl RecordShape for Point {
        fn shape() -> Shape {
            Shape::Record(RecordType::of::<Point>("Point", || {
                vec![FieldDescriptor::new("x", FieldKind::Int64)]
            }))
        }

        fn set_field(&mut self, name: &str, value: TypedValue) -> Result<(), WriteError> {
            match name {
                "x" => FromTypedValue::assign(&mut self.x, name, value),
                _ => Err(WriteError::UnknownField(name.to_string())),
            }
        }
    }

    #[test]
    fn single_reference_resolves_to_record() {
        assert_eq!(Point::shape().record().map(|r| r.name), Some("Point"));
        assert_eq!(<Box<Point>>::shape().record().map(|r| r.name), Some("Point"));
    }

    #[test]
    fn double_reference_and_non_records_are_rejected() {
        assert!(<Box<Box<Point>>>::shape().record().is_none());
        assert!(i64::shape().record().is_none());
        assert!(<Vec<Point>>::shape().record().is_none());
        assert_eq!(<Vec<Point>>::shape().describe(), "[Point]");
        assert_eq!(<Box<Box<Point>>>::shape().describe(), "&&Point");
    }

    #[test]
    fn boxed_record_writes_through() {
        let mut p = Box::new(Point { x: 0 });
        p.set_field("x", TypedValue::Int64(7)).unwrap();
        assert_eq!(p.x, 7);
    }

    #[test]
    fn assign_rejects_mismatched_variant() {
        let mut p = Point { x: 1 };
        let err = p.set_field("x", TypedValue::Int32(2)).unwrap_err();
        assert_eq!(
            err,
            WriteError::TypeMismatch {
                field: "x".into(),
                expected: "int64",
                found: "int32",
            }
        );
        assert_eq!(p.x, 1);
    }
}

pub mod coerce;
pub mod config;
pub mod error;
pub mod mapper;
pub mod resolver;
pub mod schema;
pub mod value;

pub use rowmap_derive::Record;

pub use config::MapperConfig;
pub use error::{CoercionError, MapError, WriteError};
pub use mapper::{FieldFailure, MapReport, Mapper};
pub use resolver::Column;
pub use schema::{FieldDescriptor, FieldKind, RecordShape, RecordType, Shape};
pub use value::{RawValue, Timestamp, TypedValue};

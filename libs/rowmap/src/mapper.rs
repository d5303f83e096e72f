use crate::coerce::coerce;
use crate::config::MapperConfig;
use crate::error::MapError;
use crate::resolver::{fold, AliasTable, Resolver};
use crate::schema::{RecordShape, Shape};
use crate::value::RawValue;

/// One column that could not be mapped into the target record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFailure {
    /// Column name as stored in the column index (lower-cased).
    pub column: String,
    /// Target field, when resolution got that far.
    pub field: Option<&'static str>,
    pub error: MapError,
}

/// Outcome of mapping one row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapReport {
    /// Field names written in this pass.
    pub populated: Vec<&'static str>,
    pub failures: Vec<FieldFailure>,
}

impl MapReport {
    /// `true` when every column landed in a field.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failure(&self, column: &str) -> Option<&FieldFailure> {
        let column = fold(column);
        self.failures.iter().find(|f| f.column == column)
    }
}

/// Maps rows of raw column values into instances of a record type.
///
/// Owns mutable cache state: use one instance per thread, or serialize
/// access externally.
#[derive(Debug)]
pub struct Mapper {
    resolver: Resolver,
    log_failures: bool,
}

impl Default for Mapper {
    fn default() -> Self {
        Self::new()
    }
}

impl Mapper {
    pub fn new() -> Self {
        Self::with_config(MapperConfig::default())
    }

    pub fn with_config(config: MapperConfig) -> Self {
        Self {
            resolver: Resolver::new(config.alias_table()),
            log_failures: config.log_failures,
        }
    }

    /// Route `column` to `field`, ahead of tag and name matching.
    pub fn set_alias(&mut self, column: &str, field: &str) {
        self.resolver.aliases_mut().insert(column, field);
    }

    pub fn aliases(&self) -> &AliasTable {
        self.resolver.aliases()
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn configure<T: RecordShape>(&mut self) -> Result<(), MapError> {
        self.configure_shape(&T::shape())
    }

    pub fn configure_shape(&mut self, shape: &Shape) -> Result<(), MapError> {
        self.resolver.configure(shape)
    }

    /// Set the result shape. Call before mapping any row of a new query.
    pub fn configure_columns<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.resolver.configure_columns(names);
    }

    /// Best-effort: fill every field of `target` that a column maps to.
    ///
    /// Only a target that is not a record fails the call. Everything else is
    /// reported per column in the returned `MapReport`; fields that fail keep
    /// their previous value.
    pub fn map_row<T: RecordShape>(
        &mut self,
        row: &[RawValue<'_>],
        target: &mut T,
    ) -> Result<MapReport, MapError> {
        self.configure::<T>()?;

        let mut report = MapReport::default();
        for (column, ordinal) in self.resolver.columns().iter() {
            match self.map_column(column, ordinal, row, target) {
                Ok(field) => {
                    tracing::trace!(column, field, "field populated");
                    report.populated.push(field);
                }
                Err((field, error)) => {
                    if self.log_failures {
                        tracing::warn!(column, field, error = %error, "column skipped");
                    }
                    report.failures.push(FieldFailure {
                        column: column.to_string(),
                        field,
                        error,
                    });
                }
            }
        }
        Ok(report)
    }

    fn map_column<T: RecordShape>(
        &self,
        column: &str,
        ordinal: usize,
        row: &[RawValue<'_>],
        target: &mut T,
    ) -> Result<&'static str, (Option<&'static str>, MapError)> {
        let descriptor = self.resolver.resolve(column).map_err(|e| (None, e))?;
        let field = descriptor.name;

        let raw = row.get(ordinal).ok_or((
            Some(field),
            MapError::MissingValue {
                ordinal,
                len: row.len(),
            },
        ))?;
        let value = coerce(raw, descriptor.kind).map_err(|e| (Some(field), e.into()))?;
        target
            .set_field(field, value)
            .map_err(|e| (Some(field), e.into()))?;
        Ok(field)
    }
}

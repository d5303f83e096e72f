use std::any::TypeId;
use std::collections::HashMap;

use crate::error::MapError;
use crate::schema::{FieldDescriptor, RecordType, Shape};

pub(crate) fn fold(key: &str) -> String {
    key.to_lowercase()
}

/// Column descriptor of a result set, as reported by the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl AsRef<str> for Column {
    fn as_ref(&self) -> &str {
        &self.name
    }
}

/// Column name → position in a row. Built once per result shape.
///
/// Keys are lower-cased; duplicate names after folding keep the last ordinal.
/// Iteration is in ordinal order, so when two columns land in the same field
/// the later column wins.
#[derive(Debug, Clone, Default)]
pub struct ColumnIndex {
    ordinals: HashMap<String, usize>,
    ordered: Vec<(String, usize)>,
}

impl ColumnIndex {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ordinals: HashMap<String, usize> = names
            .into_iter()
            .enumerate()
            .map(|(ordinal, name)| (fold(name.as_ref()), ordinal))
            .collect();
        let mut ordered: Vec<(String, usize)> = ordinals
            .iter()
            .map(|(name, ordinal)| (name.clone(), *ordinal))
            .collect();
        ordered.sort_by_key(|(_, ordinal)| *ordinal);
        Self { ordinals, ordered }
    }

    pub fn ordinal(&self, column: &str) -> Option<usize> {
        self.ordinals.get(&fold(column)).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.ordered.iter().map(|(name, ordinal)| (name.as_str(), *ordinal))
    }

    pub fn len(&self) -> usize {
        self.ordinals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordinals.is_empty()
    }
}

/// Explicit column key → field key overrides. Both sides are lower-cased.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    entries: HashMap<String, String>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: &str, field: &str) {
        self.entries.insert(fold(column), fold(field));
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.entries.get(&fold(column)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for AliasTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (column, field) in iter {
            table.insert(column.as_ref(), field.as_ref());
        }
        table
    }
}

/// Field layout of the currently configured record type.
#[derive(Debug, Clone)]
pub struct FieldTable {
    type_id: TypeId,
    type_name: &'static str,
    fields: HashMap<String, FieldDescriptor>,
    /// Aliases declared on the record's own fields.
    tags: AliasTable,
}

impl FieldTable {
    /// Enumerates every declared field of `record`.
    pub fn build(record: &RecordType) -> Self {
        let mut fields = HashMap::new();
        let mut tags = AliasTable::new();
        for field in (record.fields)() {
            if let Some(tag) = field.tag {
                tags.insert(tag, field.name);
            }
            fields.insert(fold(field.name), field);
        }
        Self {
            type_id: record.type_id,
            type_name: record.name,
            fields,
            tags,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn get(&self, key: &str) -> Option<&FieldDescriptor> {
        self.fields.get(&fold(key))
    }

    pub fn tags(&self) -> &AliasTable {
        &self.tags
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Resolves source columns to target fields.
///
/// Holds the column index of the current result shape and a single-entry
/// field table cache for the most recently configured record type.
#[derive(Debug, Default)]
pub struct Resolver {
    columns: ColumnIndex,
    aliases: AliasTable,
    table: Option<FieldTable>,
    table_builds: u64,
}

impl Resolver {
    pub fn new(aliases: AliasTable) -> Self {
        Self {
            aliases,
            ..Self::default()
        }
    }

    /// Make `shape` the current target. A no-op when its record type is
    /// already cached; otherwise the field table is rebuilt from scratch.
    pub fn configure(&mut self, shape: &Shape) -> Result<(), MapError> {
        let record = shape
            .record()
            .ok_or_else(|| MapError::InvalidTargetKind(shape.describe()))?;

        if self
            .table
            .as_ref()
            .is_some_and(|table| table.type_id() == record.type_id)
        {
            tracing::trace!(record = record.name, "field table cache hit");
            return Ok(());
        }

        let table = FieldTable::build(record);
        self.table_builds += 1;
        tracing::debug!(
            record = record.name,
            fields = table.len(),
            tags = table.tags().len(),
            "field table rebuilt"
        );
        self.table = Some(table);
        Ok(())
    }

    /// Replace the column index with the given ordered column names.
    pub fn configure_columns<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.columns = ColumnIndex::from_names(names);
        tracing::debug!(columns = self.columns.len(), "column index configured");
    }

    /// Precedence: explicit alias, record tag, field name. An alias whose
    /// target field does not exist is `FieldNotMapped`.
    pub fn resolve(&self, column: &str) -> Result<&FieldDescriptor, MapError> {
        let not_mapped = || MapError::FieldNotMapped(column.to_string());
        let table = self.table.as_ref().ok_or_else(not_mapped)?;

        if let Some(field_key) = self.aliases.get(column) {
            return table.get(field_key).ok_or_else(not_mapped);
        }
        if let Some(field_key) = table.tags().get(column) {
            return table.get(field_key).ok_or_else(not_mapped);
        }
        table.get(column).ok_or_else(not_mapped)
    }

    pub fn columns(&self) -> &ColumnIndex {
        &self.columns
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    pub fn aliases_mut(&mut self) -> &mut AliasTable {
        &mut self.aliases
    }

    pub fn field_table(&self) -> Option<&FieldTable> {
        self.table.as_ref()
    }

    /// How many times a field table has been built.
    pub fn table_builds(&self) -> u64 {
        self.table_builds
    }
}

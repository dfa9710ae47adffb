//! Table definitions

use super::column::ColumnSpec;
use crate::error::{Result, VaultError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A foreign-key relation from a local column to `table(column)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    column: String,
    ref_table: String,
    ref_column: String,
}

impl ForeignKey {
    /// Build a foreign key from a local column and its referenced table and column.
    ///
    /// Blank names are rejected when the owning [`TableSpec`] is built.
    pub fn to(
        column: impl Into<String>,
        ref_table: impl Into<String>,
        ref_column: impl Into<String>,
    ) -> Self {
        Self {
            column: column.into(),
            ref_table: ref_table.into(),
            ref_column: ref_column.into(),
        }
    }

    /// Build a foreign key from a local column and a `table(column)` descriptor
    pub fn new(column: impl Into<String>, reference: &str) -> Result<Self> {
        let (ref_table, ref_column) = parse_reference(reference).ok_or_else(|| {
            VaultError::invalid_schema(
                reference.trim(),
                format!("foreign key reference '{reference}' must look like table(column)"),
            )
        })?;
        Ok(Self::to(column, ref_table, ref_column))
    }

    /// Local column holding the reference
    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn ref_table(&self) -> &str {
        &self.ref_table
    }

    pub fn ref_column(&self) -> &str {
        &self.ref_column
    }

    /// The `table(column)` descriptor
    pub fn reference(&self) -> String {
        format!("{}({})", self.ref_table, self.ref_column)
    }
}

fn parse_reference(reference: &str) -> Option<(&str, &str)> {
    let reference = reference.trim();
    let inner = reference.strip_suffix(')')?;
    let (table, column) = inner.split_once('(')?;
    let (table, column) = (table.trim(), column.trim());
    if table.is_empty() || column.is_empty() || column.contains(['(', ')']) {
        return None;
    }
    Some((table, column))
}

impl fmt::Display for ForeignKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.column, self.reference())
    }
}

/// A relational table: name, ordered columns, primary key and an optional
/// foreign key.
///
/// All invariants are checked by [`TableSpec::new`]; a `TableSpec` that
/// exists is always valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTableSpec", into = "RawTableSpec")]
pub struct TableSpec {
    pub(super) name: String,
    pub(super) primary_key: String,
    pub(super) foreign_key: Option<ForeignKey>,
    pub(super) columns: Vec<ColumnSpec>,
}

impl TableSpec {
    pub fn new(
        name: impl Into<String>,
        primary_key: impl Into<String>,
        foreign_key: Option<ForeignKey>,
        columns: Vec<ColumnSpec>,
    ) -> Result<Self> {
        let table = Self {
            name: name.into(),
            primary_key: primary_key.into(),
            foreign_key,
            columns,
        };
        table.validate()?;
        Ok(table)
    }

    fn validate(&self) -> Result<()> {
        let fail = |reason: String| Err(VaultError::invalid_schema(&self.name, reason));

        if self.name.trim().is_empty() {
            return fail("table name must not be empty".to_string());
        }
        if self.columns.is_empty() {
            return fail("table must declare at least one column".to_string());
        }
        if let Some(position) = self.columns.iter().position(|c| c.name().trim().is_empty()) {
            return fail(format!("column #{} has an empty name", position + 1));
        }
        for (i, column) in self.columns.iter().enumerate() {
            if self.columns[..i].iter().any(|c| c.name() == column.name()) {
                return fail(format!("column '{}' is declared twice", column.name()));
            }
        }
        if !self.has_column(&self.primary_key) {
            return fail(format!(
                "primary key '{}' is not one of the table's columns",
                self.primary_key
            ));
        }
        if let Some(fk) = &self.foreign_key {
            if !self.has_column(fk.column()) {
                return fail(format!(
                    "foreign key column '{}' is not one of the table's columns",
                    fk.column()
                ));
            }
            if fk.ref_table().trim().is_empty() || fk.ref_column().trim().is_empty() {
                return fail(format!(
                    "foreign key on '{}' must reference a table and a column, got '{}'",
                    fk.column(),
                    fk.reference()
                ));
            }
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    pub fn foreign_key(&self) -> Option<&ForeignKey> {
        self.foreign_key.as_ref()
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(ColumnSpec::name).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name() == name)
    }
}

/// Serialized shape of a table, checked on the way in
#[derive(Serialize, Deserialize)]
struct RawTableSpec {
    table: String,
    primary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    foreign: Option<RawForeignKey>,
    fields: Vec<ColumnSpec>,
}

#[derive(Serialize, Deserialize)]
struct RawForeignKey {
    column: String,
    references: String,
}

impl TryFrom<RawTableSpec> for TableSpec {
    type Error = VaultError;

    fn try_from(raw: RawTableSpec) -> Result<Self> {
        let foreign_key = match raw.foreign {
            Some(fk) => Some(ForeignKey::new(fk.column, &fk.references).map_err(|e| match e {
                VaultError::InvalidSchema { reason, .. } => {
                    VaultError::invalid_schema(&raw.table, reason)
                }
                other => other,
            })?),
            None => None,
        };
        TableSpec::new(raw.table, raw.primary, foreign_key, raw.fields)
    }
}

impl From<TableSpec> for RawTableSpec {
    fn from(table: TableSpec) -> Self {
        RawTableSpec {
            foreign: table.foreign_key.map(|fk| RawForeignKey {
                references: fk.reference(),
                column: fk.column,
            }),
            table: table.name,
            primary: table.primary_key,
            fields: table.columns,
        }
    }
}

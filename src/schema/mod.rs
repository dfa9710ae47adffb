//! Relational schema model
//!
//! - `ColumnSpec`: one column, rendered to a column-definition fragment
//! - `TableSpec`: a validated table with primary key and optional foreign key
//! - `SchemaCatalog`: the ordered set of tables to provision

mod catalog;
mod column;
mod table;

pub use catalog::SchemaCatalog;
pub use column::{ColumnSpec, DEFAULT_COLUMN_TYPE};
pub use table::{ForeignKey, TableSpec};

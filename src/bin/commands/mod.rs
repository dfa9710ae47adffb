pub mod columns;
pub mod config;
pub mod ddl;
pub mod provision;

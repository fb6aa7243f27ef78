//! Dialect-aware SQL fragments: identifier quoting, type mapping and the
//! DROP / FOREIGN KEY / table-option statements that differ per engine.

mod dialect;
mod quote;
mod statements;
mod types;

pub use dialect::{Dialect, DialectOptions, QuoteStyle};
pub use quote::{qualified_name, quote_identifier};
pub use statements::{ForeignKeySpec, drop_statement, foreign_key_constraint, table_options};
pub use types::map_type;

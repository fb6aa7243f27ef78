//! Whole statements whose shape depends on the dialect.

use super::{Dialect, DialectOptions, qualified_name, quote_identifier};
use crate::model::ReferentialAction;

/// `DROP TABLE` guarded so it succeeds when the table is absent.
///
/// `table` is the already-qualified, unquoted name used for Oracle's dynamic
/// SQL and SQL Server's `OBJECT_ID` lookup.
pub fn drop_statement(
    table: &str,
    dialect: Dialect,
    options: Option<&DialectOptions>,
    with_schema: bool,
) -> String {
    let quoted = qualified_name(table, dialect, options, with_schema);

    match dialect {
        Dialect::MySQL | Dialect::PostgreSQL | Dialect::SQLite => {
            format!("DROP TABLE IF EXISTS {quoted};")
        }
        // ORA-00942: table or view does not exist
        Dialect::Oracle => format!(
            "BEGIN\n  EXECUTE IMMEDIATE 'DROP TABLE {quoted}';\nEXCEPTION\n  WHEN OTHERS THEN\n    IF SQLCODE != -942 THEN\n      RAISE;\n    END IF;\nEND;\n/"
        ),
        Dialect::SqlServer => {
            let lookup = match options.and_then(|o| o.schema.as_deref()) {
                Some(schema) if with_schema && !schema.is_empty() => format!("{schema}.{table}"),
                _ => table.to_string(),
            };
            format!("IF OBJECT_ID('{lookup}', 'U') IS NOT NULL\n  DROP TABLE {quoted};")
        }
    }
}

/// Inputs for an `ALTER TABLE ... ADD CONSTRAINT ... FOREIGN KEY` statement.
#[derive(Debug, Clone)]
pub struct ForeignKeySpec<'a> {
    pub constraint_name: &'a str,
    /// Child table carrying the foreign key columns.
    pub table: &'a str,
    pub columns: Vec<&'a str>,
    /// Parent table being referenced.
    pub referenced_table: &'a str,
    pub referenced_columns: Vec<&'a str>,
    pub on_delete: Option<ReferentialAction>,
    pub on_update: Option<ReferentialAction>,
}

pub fn foreign_key_constraint(
    spec: &ForeignKeySpec<'_>,
    dialect: Dialect,
    options: Option<&DialectOptions>,
    with_schema: bool,
) -> String {
    let quote_all = |cols: &[&str]| {
        cols.iter()
            .map(|c| quote_identifier(c, dialect, options))
            .collect::<Vec<_>>()
            .join(", ")
    };

    let mut sql = format!(
        "ALTER TABLE {} ADD CONSTRAINT {}\n",
        qualified_name(spec.table, dialect, options, with_schema),
        quote_identifier(spec.constraint_name, dialect, options)
    );
    sql.push_str(&format!("  FOREIGN KEY ({})\n", quote_all(&spec.columns)));
    sql.push_str(&format!(
        "  REFERENCES {} ({})",
        qualified_name(spec.referenced_table, dialect, options, with_schema),
        quote_all(&spec.referenced_columns)
    ));

    if let Some(action) = spec.on_delete {
        sql.push_str(&format!("\n  ON DELETE {}", action.as_sql()));
    }
    if let Some(action) = spec.on_update {
        if dialect.supports_on_update() {
            sql.push_str(&format!("\n  ON UPDATE {}", action.as_sql()));
        }
    }

    sql.push(';');
    sql
}

/// Trailing table options appended after the closing parenthesis.
pub fn table_options(dialect: Dialect, options: Option<&DialectOptions>) -> String {
    let Some(options) = options else {
        return String::new();
    };

    match dialect {
        Dialect::MySQL => {
            let mut opts = Vec::new();
            if let Some(charset) = options.charset.as_deref().filter(|s| !s.is_empty()) {
                opts.push(format!("DEFAULT CHARACTER SET={charset}"));
            }
            if let Some(collation) = options.collation.as_deref().filter(|s| !s.is_empty()) {
                opts.push(format!("COLLATE={collation}"));
            }
            if opts.is_empty() {
                String::new()
            } else {
                format!(" {}", opts.join(" "))
            }
        }
        Dialect::PostgreSQL | Dialect::Oracle | Dialect::SqlServer | Dialect::SQLite => String::new(),
    }
}

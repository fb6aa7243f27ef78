//! DDL generation: renders tables and relationships into CREATE TABLE and
//! ALTER TABLE statements for a target dialect.

use crate::model::{Column, DefaultValue, Relationship, RelationshipKind, Table};
use crate::sql::{
    Dialect, DialectOptions, ForeignKeySpec, drop_statement, foreign_key_constraint, map_type,
    qualified_name, quote_identifier, table_options,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Returned instead of SQL when nothing is selected.
pub const EMPTY_SELECTION_PLACEHOLDER: &str =
    "/* No tables selected. Select one or more tables to generate DDL. */";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DdlOptions {
    #[serde(alias = "dbms")]
    pub dialect: Dialect,
    #[serde(alias = "dbmsOptions")]
    pub dialect_options: Option<DialectOptions>,
    pub include_drop_statements: bool,
    pub include_comments: bool,
    /// Qualify table names with `dialect_options.schema`.
    pub include_schema_prefix: bool,
}

impl DdlOptions {
    pub fn for_dialect(dialect: Dialect) -> Self {
        Self {
            dialect,
            ..Default::default()
        }
    }
}

pub struct DdlGenerator {
    options: DdlOptions,
    generated_on: Option<NaiveDate>,
}

impl DdlGenerator {
    pub fn new(options: DdlOptions) -> Self {
        Self {
            options,
            generated_on: None,
        }
    }

    /// Fix the date printed in the header comment.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.generated_on = Some(date);
        self
    }

    pub fn options(&self) -> &DdlOptions {
        &self.options
    }

    fn dialect(&self) -> Dialect {
        self.options.dialect
    }

    fn dialect_options(&self) -> Option<&DialectOptions> {
        self.options.dialect_options.as_ref()
    }

    fn quote(&self, name: &str) -> String {
        quote_identifier(name, self.dialect(), self.dialect_options())
    }

    fn table_name(&self, name: &str) -> String {
        qualified_name(
            name,
            self.dialect(),
            self.dialect_options(),
            self.options.include_schema_prefix,
        )
    }

    /// DDL for the selected tables and the relationships between them.
    ///
    /// Relationships with an endpoint outside the selection are dropped.
    pub fn generate_for_selection<'a, S: AsRef<str>>(
        &self,
        table_ids: &[S],
        tables: impl IntoIterator<Item = &'a Table>,
        relationships: &[Relationship],
    ) -> String {
        let selected: HashSet<&str> = table_ids.iter().map(|id| id.as_ref()).collect();

        let tables: Vec<&Table> = tables
            .into_iter()
            .filter(|t| selected.contains(t.id.as_str()))
            .collect();

        if tables.is_empty() {
            return EMPTY_SELECTION_PLACEHOLDER.to_string();
        }

        let relationships: Vec<&Relationship> = relationships
            .iter()
            .filter(|r| {
                selected.contains(r.source_table_id.as_str())
                    && selected.contains(r.target_table_id.as_str())
            })
            .collect();

        self.generate(&tables, &relationships)
    }

    /// DDL for every given table followed by the foreign keys between them.
    pub fn generate(&self, tables: &[&Table], relationships: &[&Relationship]) -> String {
        let mut sql = String::new();

        if self.options.include_comments {
            let date = self
                .generated_on
                .unwrap_or_else(|| chrono::Utc::now().date_naive());
            sql.push_str(&format!("-- DDL generated for {}\n", self.dialect()));
            sql.push_str(&format!("-- Generated on: {}\n\n", date.format("%Y-%m-%d")));
        }

        for table in tables {
            sql.push_str(&self.table_ddl(table));
            sql.push('\n');
        }

        for rel in relationships {
            if let Some(fk) = self.foreign_key_ddl(rel, tables) {
                sql.push_str(&fk);
                sql.push('\n');
            }
        }

        sql
    }

    /// CREATE TABLE block, preceded by the optional DROP and comment.
    pub fn table_ddl(&self, table: &Table) -> String {
        let dialect = self.dialect();
        let named = dialect.names_table_constraints();
        let mut sql = String::new();

        if self.options.include_drop_statements {
            sql.push_str(&drop_statement(
                &table.physical_name,
                dialect,
                self.dialect_options(),
                self.options.include_schema_prefix,
            ));
            sql.push_str("\n\n");
        }

        if self.options.include_comments {
            sql.push_str(&format!("-- {} table\n", table.logical_name));
        }

        sql.push_str(&format!("CREATE TABLE {} (\n", self.table_name(&table.physical_name)));

        let columns = table.ordered_columns();
        let mut definitions: Vec<String> = columns
            .iter()
            .map(|c| self.column_definition(c))
            .collect();

        let pk_columns: Vec<String> = columns
            .iter()
            .filter(|c| c.constraints.is_primary_key)
            .map(|c| self.quote(&c.physical_name))
            .collect();

        if !pk_columns.is_empty() {
            let body = format!("PRIMARY KEY ({})", pk_columns.join(", "));
            definitions.push(self.table_constraint(
                named,
                &format!("PK_{}", table.physical_name),
                &body,
            ));
        }

        for column in columns
            .iter()
            .filter(|c| c.constraints.is_unique && !c.constraints.is_primary_key)
        {
            let body = format!("UNIQUE ({})", self.quote(&column.physical_name));
            definitions.push(self.table_constraint(
                named,
                &format!("UQ_{}_{}", table.physical_name, column.physical_name),
                &body,
            ));
        }

        for column in &columns {
            let Some(check) = column.constraints.check.as_deref().filter(|c| !c.is_empty()) else {
                continue;
            };
            let body = format!("CHECK ({check})");
            definitions.push(self.table_constraint(
                named,
                &format!("CK_{}_{}", table.physical_name, column.physical_name),
                &body,
            ));
        }

        sql.push_str(&definitions.join(",\n"));
        sql.push_str("\n)");
        sql.push_str(&table_options(dialect, self.dialect_options()));
        sql.push_str(";\n");

        sql
    }

    fn table_constraint(&self, named: bool, name: &str, body: &str) -> String {
        if named {
            format!("  CONSTRAINT {} {}", self.quote(name), body)
        } else {
            format!("  {body}")
        }
    }

    /// `name TYPE [NOT NULL] [DEFAULT value]`, indented for a CREATE body.
    pub fn column_definition(&self, column: &Column) -> String {
        let mut def = format!(
            "  {} {}",
            self.quote(&column.physical_name),
            map_type(column.data_type, column.type_options.as_ref(), self.dialect())
        );

        if column.constraints.is_not_null {
            def.push_str(" NOT NULL");
        }

        match &column.constraints.default_value {
            Some(DefaultValue::Text(s)) => def.push_str(&format!(" DEFAULT '{s}'")),
            Some(DefaultValue::Number(n)) => def.push_str(&format!(" DEFAULT {n}")),
            Some(DefaultValue::Bool(b)) => def.push_str(&format!(" DEFAULT {b}")),
            None => {}
        }

        def
    }

    /// ALTER TABLE ... FOREIGN KEY on the child (target) table.
    ///
    /// Many-to-many relationships yield nothing: their keys live on the
    /// junction table's own columns.
    pub fn foreign_key_ddl(&self, rel: &Relationship, tables: &[&Table]) -> Option<String> {
        match rel.kind {
            RelationshipKind::ManyToMany => return None,
            RelationshipKind::OneToOne | RelationshipKind::OneToMany | RelationshipKind::ManyToOne => {}
        }

        let source = tables.iter().copied().find(|t| t.id == rel.source_table_id)?;
        let target = tables.iter().copied().find(|t| t.id == rel.target_table_id)?;

        let names = |table: &Table, ids: &[String]| -> Vec<String> {
            ids.iter()
                .filter_map(|id| table.column(id))
                .map(|c| c.physical_name.clone())
                .filter(|name| !name.is_empty())
                .collect()
        };
        let source_columns = names(source, &rel.source_column_ids);
        let target_columns = names(target, &rel.target_column_ids);

        if source_columns.is_empty() || target_columns.is_empty() {
            tracing::warn!(relationship = %rel.id, "skipping foreign key with unresolved columns");
            return None;
        }

        let constraint_name = format!("FK_{}_{}", target.physical_name, source.physical_name);
        let spec = ForeignKeySpec {
            constraint_name: &constraint_name,
            table: &target.physical_name,
            columns: target_columns.iter().map(String::as_str).collect(),
            referenced_table: &source.physical_name,
            referenced_columns: source_columns.iter().map(String::as_str).collect(),
            on_delete: rel.on_delete,
            on_update: rel.on_update,
        };

        let mut sql = String::new();
        if self.options.include_comments {
            sql.push_str(&format!("-- Foreign key for relationship {}\n", rel.name));
        }
        sql.push_str(&foreign_key_constraint(
            &spec,
            self.dialect(),
            self.dialect_options(),
            self.options.include_schema_prefix,
        ));
        Some(sql)
    }
}

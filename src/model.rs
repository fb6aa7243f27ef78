//! Relational model: tables, columns, constraints and relationships.
//!
//! These are plain values. Field names serialize in camelCase so the types
//! read and write the schema document format directly.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Fresh opaque id such as `col-3f2a...`.
pub fn new_id(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    #[default]
    Int,
    Float,
    Decimal,
    Varchar,
    Char,
    Text,
    Date,
    Datetime,
    Boolean,
}

impl DataType {
    pub const ALL: [DataType; 9] = [
        Self::Int,
        Self::Float,
        Self::Decimal,
        Self::Varchar,
        Self::Char,
        Self::Text,
        Self::Date,
        Self::Datetime,
        Self::Boolean,
    ];

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "int" | "integer" => Some(Self::Int),
            "float" => Some(Self::Float),
            "decimal" => Some(Self::Decimal),
            "varchar" => Some(Self::Varchar),
            "char" => Some(Self::Char),
            "text" => Some(Self::Text),
            "date" => Some(Self::Date),
            "datetime" => Some(Self::Datetime),
            "boolean" | "bool" => Some(Self::Boolean),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Decimal => "decimal",
            Self::Varchar => "varchar",
            Self::Char => "char",
            Self::Text => "text",
            Self::Date => "date",
            Self::Datetime => "datetime",
            Self::Boolean => "boolean",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Length for varchar/char, precision and scale for decimal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,
}

/// A column default as stored in the document: string, number or boolean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DefaultValue {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKeyRef {
    pub table_id: String,
    pub column_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnConstraints {
    #[serde(default)]
    pub is_primary_key: bool,
    #[serde(default)]
    pub is_unique: bool,
    #[serde(default)]
    pub is_not_null: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<DefaultValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_key: Option<ForeignKeyRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub logical_name: String,
    #[serde(default)]
    pub physical_name: String,
    #[serde(default)]
    pub data_type: DataType,
    #[serde(default)]
    pub order: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_options: Option<TypeOptions>,
    #[serde(default)]
    pub constraints: ColumnConstraints,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Column {
    pub fn is_foreign_key(&self) -> bool {
        self.constraints.foreign_key.is_some()
    }

    pub fn references_table(&self, table_id: &str) -> bool {
        self.constraints
            .foreign_key
            .as_ref()
            .is_some_and(|fk| fk.table_id == table_id)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub logical_name: String,
    #[serde(default)]
    pub physical_name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Canvas position; never affects generated SQL.
    #[serde(skip)]
    pub position: Position,
}

impl Table {
    pub fn column(&self, column_id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == column_id)
    }

    pub fn column_mut(&mut self, column_id: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.id == column_id)
    }

    /// Primary key column, falling back to the first column.
    pub fn key_column(&self) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.constraints.is_primary_key)
            .or_else(|| self.columns.first())
    }

    /// Columns sorted by their `order` rank.
    pub fn ordered_columns(&self) -> Vec<&Column> {
        let mut columns: Vec<&Column> = self.columns.iter().collect();
        columns.sort_by_key(|c| c.order);
        columns
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationshipKind {
    OneToOne,
    #[default]
    OneToMany,
    ManyToOne,
    ManyToMany,
}

impl RelationshipKind {
    /// Cardinality label, e.g. "1:N".
    pub fn label(&self) -> &'static str {
        match self {
            Self::OneToOne => "1:1",
            Self::OneToMany => "1:N",
            Self::ManyToOne => "N:1",
            Self::ManyToMany => "N:M",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferentialAction {
    #[serde(rename = "CASCADE")]
    Cascade,
    #[serde(rename = "SET NULL")]
    SetNull,
    #[serde(rename = "RESTRICT")]
    Restrict,
    #[serde(rename = "NO ACTION")]
    NoAction,
}

impl ReferentialAction {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Cascade => "CASCADE",
            Self::SetNull => "SET NULL",
            Self::Restrict => "RESTRICT",
            Self::NoAction => "NO ACTION",
        }
    }
}

/// Associative table realizing a many-to-many relationship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JunctionTable {
    pub table_id: String,
    #[serde(default)]
    pub source_column_ids: Vec<String>,
    #[serde(default)]
    pub target_column_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: RelationshipKind,
    #[serde(default)]
    pub source_table_id: String,
    #[serde(default)]
    pub source_column_ids: Vec<String>,
    #[serde(default)]
    pub target_table_id: String,
    #[serde(default)]
    pub target_column_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub junction_table: Option<JunctionTable>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_delete: Option<ReferentialAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_update: Option<ReferentialAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Relationship {
    pub fn references_table(&self, table_id: &str) -> bool {
        self.source_table_id == table_id
            || self.target_table_id == table_id
            || self
                .junction_table
                .as_ref()
                .is_some_and(|j| j.table_id == table_id)
    }

    pub fn references_column(&self, column_id: &str) -> bool {
        let contains = |ids: &[String]| ids.iter().any(|id| id == column_id);
        contains(&self.source_column_ids)
            || contains(&self.target_column_ids)
            || self.junction_table.as_ref().is_some_and(|j| {
                contains(&j.source_column_ids) || contains(&j.target_column_ids)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_id_prefix_and_uniqueness() {
        let a = new_id("col");
        let b = new_id("col");
        assert!(a.starts_with("col-"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_data_type_serde_names() {
        let json = serde_json::to_string(&DataType::Datetime).unwrap();
        assert_eq!(json, "\"datetime\"");
        let parsed: DataType = serde_json::from_str("\"varchar\"").unwrap();
        assert_eq!(parsed, DataType::Varchar);
    }

    #[test]
    fn test_data_type_from_str_aliases() {
        assert_eq!(DataType::from_str("INTEGER"), Some(DataType::Int));
        assert_eq!(DataType::from_str("Bool"), Some(DataType::Boolean));
        assert_eq!(DataType::from_str("blob"), None);
        for data_type in DataType::ALL {
            assert_eq!(DataType::from_str(&data_type.to_string()), Some(data_type));
        }
    }

    #[test]
    fn test_referential_action_names() {
        let parsed: ReferentialAction = serde_json::from_str("\"SET NULL\"").unwrap();
        assert_eq!(parsed, ReferentialAction::SetNull);
        assert_eq!(ReferentialAction::NoAction.as_sql(), "NO ACTION");
    }

    #[test]
    fn test_default_value_untagged() {
        let v: DefaultValue = serde_json::from_str("true").unwrap();
        assert_eq!(v, DefaultValue::Bool(true));
        let v: DefaultValue = serde_json::from_str("42").unwrap();
        assert!(matches!(v, DefaultValue::Number(_)));
        let v: DefaultValue = serde_json::from_str("\"active\"").unwrap();
        assert_eq!(v, DefaultValue::Text("active".to_string()));
    }

    #[test]
    fn test_relationship_defaults_when_missing() {
        let rel: Relationship = serde_json::from_str(r#"{"sourceTableId": "a"}"#).unwrap();
        assert_eq!(rel.kind, RelationshipKind::OneToMany);
        assert!(rel.source_column_ids.is_empty());
        assert!(rel.id.is_empty());
    }

    #[test]
    fn test_relationship_references_junction_columns() {
        let rel = Relationship {
            id: "r".to_string(),
            name: String::new(),
            kind: RelationshipKind::ManyToMany,
            source_table_id: "a".to_string(),
            source_column_ids: vec!["a1".to_string()],
            target_table_id: "b".to_string(),
            target_column_ids: vec!["b1".to_string()],
            source_handle: None,
            target_handle: None,
            junction_table: Some(JunctionTable {
                table_id: "ab".to_string(),
                source_column_ids: vec!["ab_a".to_string()],
                target_column_ids: vec!["ab_b".to_string()],
            }),
            on_delete: None,
            on_update: None,
            description: None,
        };
        assert!(rel.references_table("ab"));
        assert!(rel.references_column("ab_b"));
        assert!(!rel.references_column("zz"));
    }
}

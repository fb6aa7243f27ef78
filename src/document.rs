//! The `.scst` schema document: metadata, table nodes and relationships.
//!
//! Loading validates the overall shape and backfills whatever older or
//! hand-edited files leave out, so the result is always a structurally
//! valid model.

use crate::model::{Position, Relationship, Table, new_id};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const FORMAT_VERSION: &str = "1.0";

/// Node renderer type understood by the canvas.
pub const NODE_TYPE: &str = "SchemaNode";

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Malformed schema document: {0}")]
    Malformed(&'static str),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub last_modified: String,
    #[serde(default)]
    pub version: String,
}

impl DocumentMetadata {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        let now = timestamp();
        Self {
            name: name.into(),
            description: description.into(),
            created_at: now.clone(),
            last_modified: now,
            version: FORMAT_VERSION.to_string(),
        }
    }

    fn backfill(&mut self) {
        if self.name.is_empty() {
            self.name = "Imported Schema".to_string();
        }
        if self.created_at.is_empty() {
            self.created_at = timestamp();
        }
        if self.last_modified.is_empty() {
            self.last_modified = self.created_at.clone();
        }
        if self.version.is_empty() {
            self.version = FORMAT_VERSION.to_string();
        }
    }
}

/// A table as the canvas stores it: the table itself under `data`, with
/// the node's id, renderer type and position alongside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub position: Position,
    pub data: Table,
}

impl From<&Table> for StoredNode {
    fn from(table: &Table) -> Self {
        Self {
            id: table.id.clone(),
            node_type: NODE_TYPE.to_string(),
            position: table.position,
            data: table.clone(),
        }
    }
}

impl From<StoredNode> for Table {
    fn from(node: StoredNode) -> Self {
        Table {
            id: node.id,
            position: node.position,
            ..node.data
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDocument {
    pub metadata: DocumentMetadata,
    pub nodes: Vec<StoredNode>,
    pub relationships: Vec<Relationship>,
}

impl SchemaDocument {
    pub fn new<'a>(
        metadata: DocumentMetadata,
        tables: impl IntoIterator<Item = &'a Table>,
        relationships: &[Relationship],
    ) -> Self {
        Self {
            metadata,
            nodes: tables.into_iter().map(StoredNode::from).collect(),
            relationships: relationships.to_vec(),
        }
    }

    /// Tables and relationships in document order.
    pub fn into_parts(self) -> (Vec<Table>, Vec<Relationship>) {
        let tables = self.nodes.into_iter().map(Table::from).collect();
        (tables, self.relationships)
    }

    /// Refresh `lastModified` and the format version before writing.
    pub fn touch(&mut self) {
        self.metadata.last_modified = timestamp();
        self.metadata.version = FORMAT_VERSION.to_string();
        if self.metadata.created_at.is_empty() {
            self.metadata.created_at = self.metadata.last_modified.clone();
        }
    }
}

#[derive(Deserialize)]
struct RawNode {
    #[serde(default)]
    id: String,
    #[serde(rename = "type", default)]
    node_type: Option<String>,
    #[serde(default)]
    position: Position,
    #[serde(default)]
    data: Option<Table>,
}

#[derive(Deserialize)]
struct RawDocument {
    #[serde(default)]
    metadata: Option<DocumentMetadata>,
    nodes: Vec<RawNode>,
    #[serde(default)]
    relationships: Vec<Relationship>,
}

/// Parse and backfill a schema document.
///
/// A document whose `nodes` is missing or not a list is rejected; a
/// non-list `relationships` or `metadata` is treated as absent.
pub fn parse_document(input: &str) -> Result<SchemaDocument, DocumentError> {
    let mut value: Value = serde_json::from_str(input)?;
    let root = value
        .as_object_mut()
        .ok_or(DocumentError::Malformed("document is not an object"))?;

    if !matches!(root.get("nodes"), Some(Value::Array(_))) {
        return Err(DocumentError::Malformed("`nodes` must be a list"));
    }
    if !matches!(root.get("relationships"), Some(Value::Array(_))) {
        root.insert("relationships".to_string(), Value::Array(Vec::new()));
    }
    if !matches!(root.get("metadata"), Some(Value::Object(_))) {
        root.remove("metadata");
    }

    let raw: RawDocument = serde_json::from_value(value)?;

    let mut metadata = raw.metadata.unwrap_or_default();
    metadata.backfill();

    let nodes = raw.nodes.into_iter().map(backfill_node).collect();

    let relationships = raw
        .relationships
        .into_iter()
        .map(|mut rel| {
            if rel.id.is_empty() {
                rel.id = new_id("rel");
            }
            rel
        })
        .collect();

    Ok(SchemaDocument {
        metadata,
        nodes,
        relationships,
    })
}

fn backfill_node(raw: RawNode) -> StoredNode {
    let id = if raw.id.is_empty() {
        new_id("node")
    } else {
        raw.id
    };

    let mut data = raw.data.unwrap_or_else(|| Table {
        id: id.clone(),
        logical_name: "Restored Table".to_string(),
        physical_name: "RESTORED_TB".to_string(),
        color: String::new(),
        columns: Vec::new(),
        description: None,
        position: Position::default(),
    });
    data.id = id.clone();

    for column in &mut data.columns {
        if column.id.is_empty() {
            column.id = new_id("col");
        }
    }
    // Stable: columns without an order keep their array position.
    data.columns.sort_by_key(|c| c.order);
    for (i, column) in data.columns.iter_mut().enumerate() {
        column.order = i;
    }

    StoredNode {
        id,
        node_type: raw.node_type.unwrap_or_else(|| NODE_TYPE.to_string()),
        position: raw.position,
        data,
    }
}

/// Pretty-printed JSON, as written to disk.
pub fn to_json(document: &SchemaDocument) -> Result<String, DocumentError> {
    Ok(serde_json::to_string_pretty(document)?)
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DataType, RelationshipKind};

    const SAMPLE: &str = r#"{
        "metadata": {
            "name": "shop",
            "description": "demo",
            "createdAt": "2024-01-01T00:00:00.000Z",
            "lastModified": "2024-01-02T00:00:00.000Z",
            "version": "1.0"
        },
        "nodes": [
            {
                "id": "users",
                "type": "SchemaNode",
                "position": {"x": 100, "y": 100},
                "data": {
                    "id": "users",
                    "logicalName": "User",
                    "physicalName": "users",
                    "color": "bg-sky-200",
                    "columns": [
                        {
                            "id": "u.id",
                            "logicalName": "ID",
                            "physicalName": "id",
                            "dataType": "int",
                            "order": 0,
                            "constraints": {"isPrimaryKey": true, "isNotNull": true}
                        },
                        {
                            "id": "u.email",
                            "logicalName": "Email",
                            "physicalName": "email",
                            "dataType": "varchar",
                            "order": 1,
                            "typeOptions": {"length": 120},
                            "constraints": {"isUnique": true, "defaultValue": null}
                        }
                    ]
                }
            }
        ],
        "relationships": []
    }"#;

    #[test]
    fn test_parse_complete_document() {
        let doc = parse_document(SAMPLE).unwrap();
        assert_eq!(doc.metadata.name, "shop");
        assert_eq!(doc.metadata.created_at, "2024-01-01T00:00:00.000Z");
        assert_eq!(doc.nodes.len(), 1);

        let (tables, relationships) = doc.into_parts();
        assert!(relationships.is_empty());
        let users = &tables[0];
        assert_eq!(users.position, Position { x: 100.0, y: 100.0 });
        assert_eq!(users.columns[1].data_type, DataType::Varchar);
        assert_eq!(users.columns[1].type_options.unwrap().length, Some(120));
        assert!(users.columns[1].constraints.default_value.is_none());
    }

    #[test]
    fn test_rejects_non_list_nodes() {
        let err = parse_document(r#"{"nodes": {"a": 1}}"#).unwrap_err();
        assert!(matches!(err, DocumentError::Malformed(_)));

        let err = parse_document(r#"{"relationships": []}"#).unwrap_err();
        assert!(matches!(err, DocumentError::Malformed(_)));

        let err = parse_document("[]").unwrap_err();
        assert!(matches!(err, DocumentError::Malformed(_)));
    }

    #[test]
    fn test_rejects_invalid_json() {
        let err = parse_document("{nodes: [").unwrap_err();
        assert!(matches!(err, DocumentError::Json(_)));
    }

    #[test]
    fn test_backfills_missing_fields() {
        let input = r#"{
            "nodes": [
                {"position": {"x": 0, "y": 0}},
                {"id": "t", "data": {"physicalName": "t", "columns": [
                    {"physicalName": "b", "order": 1},
                    {"physicalName": "a"}
                ]}}
            ],
            "relationships": [{"sourceTableId": "t", "targetTableId": "t"}]
        }"#;
        let doc = parse_document(input).unwrap();

        assert_eq!(doc.metadata.version, FORMAT_VERSION);
        assert!(!doc.metadata.name.is_empty());

        let restored = &doc.nodes[0];
        assert!(restored.id.starts_with("node-"));
        assert_eq!(restored.data.id, restored.id);
        assert_eq!(restored.data.physical_name, "RESTORED_TB");
        assert_eq!(restored.node_type, NODE_TYPE);

        let t = &doc.nodes[1].data;
        assert_eq!(t.columns[0].physical_name, "a");
        assert_eq!(t.columns[0].order, 0);
        assert_eq!(t.columns[1].order, 1);
        assert!(t.columns.iter().all(|c| c.id.starts_with("col-")));
        assert_eq!(t.columns[0].data_type, DataType::Int);

        let rel = &doc.relationships[0];
        assert!(rel.id.starts_with("rel-"));
        assert_eq!(rel.kind, RelationshipKind::OneToMany);
    }

    #[test]
    fn test_non_list_relationships_become_empty() {
        let doc = parse_document(r#"{"nodes": [], "relationships": "oops"}"#).unwrap();
        assert!(doc.relationships.is_empty());
    }

    #[test]
    fn test_write_then_read_keeps_model() {
        let doc = parse_document(SAMPLE).unwrap();
        let mut copy = doc.clone();
        copy.touch();
        let json = to_json(&copy).unwrap();
        assert!(json.contains("\"type\": \"SchemaNode\""));
        assert!(json.contains("\"physicalName\": \"users\""));

        let reread = parse_document(&json).unwrap();
        assert_eq!(reread.nodes, doc.nodes);
        assert_eq!(reread.metadata.created_at, doc.metadata.created_at);
    }
}

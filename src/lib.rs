pub mod config;
pub mod ddl;
pub mod diagram;
pub mod document;
pub mod engine;
pub mod model;
pub mod placement;
pub mod sql;

pub use config::EngineConfig;
pub use ddl::{DdlGenerator, DdlOptions};
pub use document::{DocumentError, DocumentMetadata, SchemaDocument, parse_document, to_json};
pub use engine::{SchemaEngine, SchemaEvent, SchemaListener, Selection};
pub use sql::Dialect;

use wasm_bindgen::prelude::*;

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

fn load(document_json: &str) -> Result<SchemaEngine, String> {
    let document = parse_document(document_json).map_err(|e| e.to_string())?;
    let mut engine = SchemaEngine::default();
    engine.load_document(document);
    Ok(engine)
}

/// Generate DDL for the given tables of a schema document.
///
/// `options_json` uses the `DdlOptions` field names; `None` means MySQL
/// with no extras.
pub fn generate_ddl_from_json(
    document_json: &str,
    table_ids: &[String],
    options_json: Option<&str>,
) -> Result<String, String> {
    let options: DdlOptions = match options_json {
        Some(json) => serde_json::from_str(json).map_err(|e| format!("Invalid options: {e}"))?,
        None => DdlOptions::default(),
    };
    let engine = load(document_json)?;
    Ok(engine.generate_ddl(table_ids, options))
}

/// Load a document and write it back with ids filled in and dangling
/// relationships dropped.
pub fn normalize_document_json(document_json: &str) -> Result<String, String> {
    let document = parse_document(document_json).map_err(|e| e.to_string())?;
    let metadata = document.metadata.clone();
    let mut engine = SchemaEngine::default();
    engine.load_document(document);

    let mut document = engine.to_document(metadata);
    document.touch();
    to_json(&document).map_err(|e| e.to_string())
}

#[wasm_bindgen(js_name = "generateDdl")]
pub fn generate_ddl(
    document_json: &str,
    table_ids: js_sys::Array,
    options_json: Option<String>,
) -> Result<String, String> {
    let ids: Vec<String> = table_ids.iter().filter_map(|v| v.as_string()).collect();
    generate_ddl_from_json(document_json, &ids, options_json.as_deref())
}

/// Diagram edges for a document's relationships, as JSON.
#[wasm_bindgen(js_name = "projectEdges")]
pub fn project_edges(document_json: &str) -> Result<String, String> {
    let engine = load(document_json)?;
    serde_json::to_string(&engine.edges()).map_err(|e| e.to_string())
}

#[wasm_bindgen(js_name = "normalizeDocument")]
pub fn normalize_document(document_json: &str) -> Result<String, String> {
    normalize_document_json(document_json)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
        "nodes": [
            {"id": "users", "position": {"x": 100, "y": 100}, "data": {
                "physicalName": "users", "logicalName": "User",
                "columns": [{"id": "u.id", "physicalName": "id", "dataType": "int",
                             "constraints": {"isPrimaryKey": true, "isNotNull": true}}]
            }},
            {"id": "orders", "position": {"x": 500, "y": 100}, "data": {
                "physicalName": "orders", "logicalName": "Order",
                "columns": [
                    {"id": "o.id", "physicalName": "id", "order": 0,
                     "constraints": {"isPrimaryKey": true}},
                    {"id": "o.user", "physicalName": "user_id", "order": 1,
                     "constraints": {"foreignKey": {"tableId": "users", "columnId": "u.id"}}}
                ]
            }}
        ],
        "relationships": [
            {"id": "r1", "name": "places", "type": "ONE_TO_MANY",
             "sourceTableId": "users", "sourceColumnIds": ["u.id"],
             "targetTableId": "orders", "targetColumnIds": ["o.user"]},
            {"id": "r2", "sourceTableId": "ghost", "sourceColumnIds": ["g"],
             "targetTableId": "orders", "targetColumnIds": ["o.user"]}
        ]
    }"#;

    #[test]
    fn test_generate_ddl_from_json() {
        let ids = vec!["users".to_string(), "orders".to_string()];
        let options = r#"{"dbms": "PostgreSQL", "includeComments": true}"#;
        let sql = generate_ddl_from_json(DOC, &ids, Some(options)).unwrap();
        assert!(sql.starts_with("-- DDL generated for PostgreSQL"));
        assert!(sql.contains("CREATE TABLE \"orders\""));
        assert!(sql.contains("FOREIGN KEY (\"user_id\")"));
    }

    #[test]
    fn test_generate_ddl_rejects_bad_input() {
        assert!(generate_ddl_from_json("{}", &[], None).is_err());
        assert!(generate_ddl_from_json(DOC, &[], Some("{\"dialect\": 3}")).is_err());
    }

    #[test]
    fn test_normalize_drops_dangling_relationships() {
        let json = normalize_document_json(DOC).unwrap();
        let doc = parse_document(&json).unwrap();
        assert_eq!(doc.relationships.len(), 1);
        assert_eq!(doc.relationships[0].id, "r1");
        assert_eq!(doc.metadata.version, document::FORMAT_VERSION);
        assert_eq!(doc.metadata.name, "Imported Schema");
        assert_eq!(doc.nodes.len(), 2);
    }

    #[test]
    fn test_project_edges() {
        let json = project_edges(DOC).unwrap();
        let edges: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(edges.as_array().unwrap().len(), 1);
        assert_eq!(edges[0]["type"], "deletableEdge");
        assert_eq!(edges[0]["source"], "users");
    }
}

//! Projection of relationships onto diagram edges.
//!
//! Edges carry no state of their own: the whole list is rebuilt from the
//! relationship list every time it changes.

use crate::model::Relationship;
use serde::Serialize;

/// Edge renderer type understood by the canvas.
pub const EDGE_TYPE: &str = "deletableEdge";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub source_handle: Option<String>,
    pub target_handle: Option<String>,
    #[serde(rename = "type")]
    pub edge_type: &'static str,
    pub data: EdgeData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeData {
    pub relationship: Relationship,
}

/// One edge per relationship, in relationship order.
pub fn project_edges(relationships: &[Relationship]) -> Vec<DiagramEdge> {
    relationships
        .iter()
        .map(|rel| DiagramEdge {
            id: rel.id.clone(),
            source: rel.source_table_id.clone(),
            target: rel.target_table_id.clone(),
            source_handle: rel.source_handle.clone(),
            target_handle: rel.target_handle.clone(),
            edge_type: EDGE_TYPE,
            data: EdgeData {
                relationship: rel.clone(),
            },
        })
        .collect()
}

/// Relationship id addressed by an edge id. Junction halves of a
/// many-to-many relationship use `<id>-source` / `<id>-target`.
pub fn relationship_id_for_edge(edge_id: &str) -> &str {
    edge_id
        .strip_suffix("-source")
        .or_else(|| edge_id.strip_suffix("-target"))
        .unwrap_or(edge_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RelationshipKind;

    fn rel(id: &str, source: &str, target: &str) -> Relationship {
        Relationship {
            id: id.to_string(),
            name: format!("{source}-{target}"),
            kind: RelationshipKind::OneToMany,
            source_table_id: source.to_string(),
            source_column_ids: vec![format!("{source}.id")],
            target_table_id: target.to_string(),
            target_column_ids: vec![format!("{target}.{source}_id")],
            source_handle: Some("right".to_string()),
            target_handle: None,
            junction_table: None,
            on_delete: None,
            on_update: None,
            description: None,
        }
    }

    #[test]
    fn test_one_edge_per_relationship() {
        let rels = vec![rel("r1", "users", "orders"), rel("r2", "orders", "items")];
        let edges = project_edges(&rels);

        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].id, "r1");
        assert_eq!(edges[0].source, "users");
        assert_eq!(edges[0].target, "orders");
        assert_eq!(edges[0].source_handle.as_deref(), Some("right"));
        assert_eq!(edges[1].data.relationship, rels[1]);
    }

    #[test]
    fn test_empty() {
        assert!(project_edges(&[]).is_empty());
    }

    #[test]
    fn test_edge_id_suffixes() {
        assert_eq!(relationship_id_for_edge("rel-1-source"), "rel-1");
        assert_eq!(relationship_id_for_edge("rel-1-target"), "rel-1");
        assert_eq!(relationship_id_for_edge("rel-1"), "rel-1");
    }
}

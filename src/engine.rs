//! The schema consistency engine.
//!
//! `SchemaEngine` owns the canonical model. Every mutation keeps foreign
//! keys, junction mappings and diagram edges consistent: deletions cascade
//! to whatever referenced the deleted object, and requests that cannot be
//! satisfied are logged and ignored rather than applied halfway.

use crate::config::EngineConfig;
use crate::ddl::{DdlGenerator, DdlOptions};
use crate::diagram::{DiagramEdge, project_edges, relationship_id_for_edge};
use crate::document::{DocumentMetadata, SchemaDocument};
use crate::model::{
    Column, ColumnConstraints, DataType, DefaultValue, ForeignKeyRef, JunctionTable, Position,
    ReferentialAction, Relationship, RelationshipKind, Table, TypeOptions, new_id,
};
use crate::placement::{clone_position, next_table_position};
use indexmap::IndexMap;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Change notifications for the view layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SchemaEvent<'a> {
    TablesChanged,
    /// The complete, freshly projected edge list.
    EdgesChanged(&'a [DiagramEdge]),
    SelectionChanged,
}

pub trait SchemaListener {
    fn on_event(&mut self, event: SchemaEvent<'_>);
}

impl<F: FnMut(SchemaEvent<'_>)> SchemaListener for F {
    fn on_event(&mut self, event: SchemaEvent<'_>) {
        self(event)
    }
}

/// Which table, column and relationship are active for property editing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub table_id: Option<String>,
    pub column_id: Option<String>,
    pub relationship_id: Option<String>,
}

/// Fields to merge into a table; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableUpdate {
    pub logical_name: Option<String>,
    pub physical_name: Option<String>,
    pub color: Option<String>,
    pub description: Option<Option<String>>,
    pub position: Option<Position>,
    pub columns: Option<Vec<Column>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnUpdate {
    pub logical_name: Option<String>,
    pub physical_name: Option<String>,
    pub data_type: Option<DataType>,
    pub type_options: Option<Option<TypeOptions>>,
    pub is_primary_key: Option<bool>,
    pub is_unique: Option<bool>,
    pub is_not_null: Option<bool>,
    pub default_value: Option<Option<DefaultValue>>,
    pub check: Option<Option<String>>,
    pub description: Option<Option<String>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelationshipUpdate {
    pub name: Option<String>,
    pub kind: Option<RelationshipKind>,
    pub on_delete: Option<Option<ReferentialAction>>,
    pub on_update: Option<Option<ReferentialAction>>,
    pub description: Option<Option<String>>,
    pub junction_table: Option<Option<JunctionTable>>,
}

/// Canvas handles an edge was drawn between.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionHandles {
    pub source_handle: Option<String>,
    pub target_handle: Option<String>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
enum InvalidRelationship {
    #[error("source and target column lists must be non-empty")]
    EmptyColumns,
    #[error("{source_len} source columns paired with {target_len} target columns")]
    UnpairedColumns { source_len: usize, target_len: usize },
    #[error("junction columns do not pair with the relationship's columns")]
    UnpairedJunction,
    #[error("table {0} does not exist")]
    UnknownTable(String),
    #[error("column {column} does not exist in table {table}")]
    UnknownColumn { table: String, column: String },
}

pub struct SchemaEngine {
    config: EngineConfig,
    tables: IndexMap<String, Table>,
    relationships: Vec<Relationship>,
    selection: Selection,
    listeners: Vec<Box<dyn SchemaListener>>,
}

impl Default for SchemaEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl SchemaEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            tables: IndexMap::new(),
            relationships: Vec::new(),
            selection: Selection::default(),
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: impl SchemaListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ---- queries ----

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    pub fn table(&self, table_id: &str) -> Option<&Table> {
        self.tables.get(table_id)
    }

    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    pub fn relationship(&self, relationship_id: &str) -> Option<&Relationship> {
        self.relationships.iter().find(|r| r.id == relationship_id)
    }

    /// Diagram edges projected from the current relationships.
    pub fn edges(&self) -> Vec<DiagramEdge> {
        project_edges(&self.relationships)
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selected_table(&self) -> Option<&Table> {
        self.selection
            .table_id
            .as_deref()
            .and_then(|id| self.tables.get(id))
    }

    /// The selected column, looked up in the selected table.
    pub fn selected_column(&self) -> Option<&Column> {
        let column_id = self.selection.column_id.as_deref()?;
        self.selected_table()?.column(column_id)
    }

    pub fn selected_relationship(&self) -> Option<&Relationship> {
        self.selection
            .relationship_id
            .as_deref()
            .and_then(|id| self.relationship(id))
    }

    fn column_id_exists(&self, column_id: &str) -> bool {
        self.tables
            .values()
            .any(|t| t.columns.iter().any(|c| c.id == column_id))
    }

    // ---- notifications ----

    fn emit(&mut self, event: SchemaEvent<'_>) {
        for listener in &mut self.listeners {
            listener.on_event(event);
        }
    }

    fn tables_changed(&mut self) {
        self.emit(SchemaEvent::TablesChanged);
    }

    fn relationships_changed(&mut self) {
        let edges = project_edges(&self.relationships);
        self.emit(SchemaEvent::EdgesChanged(&edges));
    }

    fn selection_changed(&mut self) {
        self.emit(SchemaEvent::SelectionChanged);
    }

    // ---- tables ----

    fn default_table(&self) -> Table {
        let id = new_id("node");
        Table {
            id,
            logical_name: self.config.new_table_logical_name.clone(),
            physical_name: self.config.new_table_physical_name.clone(),
            color: self.config.color_for(self.tables.len()),
            columns: vec![Column {
                id: new_id("col"),
                logical_name: "ID".to_string(),
                physical_name: "ID".to_string(),
                data_type: DataType::Int,
                order: 0,
                type_options: None,
                constraints: ColumnConstraints {
                    is_primary_key: true,
                    is_not_null: true,
                    ..Default::default()
                },
                description: None,
            }],
            description: None,
            position: next_table_position(self.tables.values().map(|t| &t.position), &self.config),
        }
    }

    /// Give `table` an id, and column ids, that nothing else in the model uses.
    fn claim_ids(&self, table: &mut Table) {
        if table.id.is_empty() || self.tables.contains_key(&table.id) {
            table.id = new_id("node");
        }
        let mut seen = HashSet::new();
        for column in &mut table.columns {
            if column.id.is_empty()
                || self.column_id_exists(&column.id)
                || !seen.insert(column.id.clone())
            {
                column.id = new_id("col");
                seen.insert(column.id.clone());
            }
        }
    }

    /// Add `table`, or a default single-key table when `None`, and select it.
    pub fn add_table(&mut self, table: Option<Table>) -> String {
        let mut table = table.unwrap_or_else(|| self.default_table());
        self.claim_ids(&mut table);

        let id = table.id.clone();
        debug!(table = %id, name = %table.physical_name, "adding table");
        self.tables.insert(id.clone(), table);
        self.tables_changed();

        self.select_table(&id);
        id
    }

    /// Remove a table together with every relationship touching it.
    ///
    /// Columns on other tables keep existing but lose a `foreignKey` that
    /// pointed at the removed table.
    pub fn remove_table(&mut self, table_id: &str) {
        if self.tables.shift_remove(table_id).is_none() {
            warn!(table = %table_id, "remove_table: no such table");
            return;
        }

        let before = self.relationships.len();
        self.relationships.retain(|r| !r.references_table(table_id));
        let dropped = before - self.relationships.len();

        let mut stripped = 0;
        for table in self.tables.values_mut() {
            for column in &mut table.columns {
                if column.references_table(table_id) {
                    column.constraints.foreign_key = None;
                    stripped += 1;
                }
            }
        }
        debug!(table = %table_id, dropped, stripped, "removed table");

        let mut selection_moved = false;
        if self.selection.table_id.as_deref() == Some(table_id) {
            self.selection.table_id = None;
            self.selection.column_id = None;
            selection_moved = true;
        }
        selection_moved |= self.reconcile_relationship_selection();

        self.tables_changed();
        if dropped > 0 {
            self.relationships_changed();
        }
        if selection_moved {
            self.selection_changed();
        }
    }

    /// Copy a table without its foreign-key columns and select the copy.
    pub fn clone_table(&mut self, table_id: &str) -> Option<String> {
        let Some(origin) = self.tables.get(table_id) else {
            warn!(table = %table_id, "clone_table: no such table");
            return None;
        };

        let columns = origin
            .ordered_columns()
            .into_iter()
            .filter(|c| !c.is_foreign_key())
            .enumerate()
            .map(|(i, c)| Column {
                id: new_id("col"),
                order: i,
                ..c.clone()
            })
            .collect();

        let copy = Table {
            id: new_id("node"),
            logical_name: format!("{}-copy", origin.logical_name),
            physical_name: format!("{}-copy", origin.physical_name),
            color: origin.color.clone(),
            columns,
            description: origin.description.clone(),
            position: clone_position(&origin.position, &self.config),
        };

        Some(self.add_table(Some(copy)))
    }

    /// Merge `update` into a table.
    ///
    /// A replacement column list cascades like `remove_column` for every
    /// column id it leaves out.
    pub fn update_table(&mut self, table_id: &str, update: TableUpdate) {
        let Some(table) = self.tables.get_mut(table_id) else {
            warn!(table = %table_id, "update_table: no such table");
            return;
        };

        if let Some(name) = update.logical_name {
            table.logical_name = name;
        }
        if let Some(name) = update.physical_name {
            table.physical_name = name;
        }
        if let Some(color) = update.color {
            table.color = color;
        }
        if let Some(description) = update.description {
            table.description = description;
        }
        if let Some(position) = update.position {
            table.position = position;
        }
        let mut removed = Vec::new();
        if let Some(columns) = update.columns {
            let kept: HashSet<&str> = columns.iter().map(|c| c.id.as_str()).collect();
            removed = table
                .columns
                .iter()
                .filter(|c| !kept.contains(c.id.as_str()))
                .map(|c| c.id.clone())
                .collect();
            table.columns = columns;
            restamp_orders(&mut table.columns);
        }
        let first_remaining = table.columns.first().map(|c| c.id.clone());

        let dropped: usize = removed
            .iter()
            .map(|column_id| self.prune_column_references(table_id, column_id))
            .sum();
        if !removed.is_empty() {
            debug!(table = %table_id, removed = removed.len(), dropped, "replaced columns");
        }

        let mut selection_moved = false;
        let selected_removed = self.selection.table_id.as_deref() == Some(table_id)
            && self
                .selection
                .column_id
                .as_ref()
                .is_some_and(|c| removed.contains(c));
        if selected_removed {
            self.selection.column_id = first_remaining;
            selection_moved = true;
        }
        selection_moved |= self.reconcile_relationship_selection();

        self.tables_changed();
        if dropped > 0 {
            self.relationships_changed();
        }
        if selection_moved {
            self.selection_changed();
        }
    }

    // ---- columns ----

    /// Append a default integer column and select it.
    pub fn add_column(&mut self, table_id: &str) -> Option<String> {
        let Some(table) = self.tables.get_mut(table_id) else {
            warn!(table = %table_id, "add_column: no such table");
            return None;
        };

        let column_id = new_id("col");
        table.columns.push(Column {
            id: column_id.clone(),
            logical_name: self.config.new_column_logical_name.clone(),
            physical_name: self.config.new_column_physical_name.clone(),
            data_type: DataType::Int,
            order: table.columns.len(),
            type_options: None,
            constraints: ColumnConstraints::default(),
            description: None,
        });

        self.selection.table_id = Some(table_id.to_string());
        self.selection.column_id = Some(column_id.clone());

        self.tables_changed();
        self.selection_changed();
        Some(column_id)
    }

    /// Drop relationships mapping a removed column and strip foreign keys
    /// that pointed at it. Returns the number of relationships dropped.
    fn prune_column_references(&mut self, table_id: &str, column_id: &str) -> usize {
        let before = self.relationships.len();
        self.relationships.retain(|r| !r.references_column(column_id));

        for table in self.tables.values_mut() {
            for column in &mut table.columns {
                let dangling = column
                    .constraints
                    .foreign_key
                    .as_ref()
                    .is_some_and(|fk| fk.table_id == table_id && fk.column_id == column_id);
                if dangling {
                    column.constraints.foreign_key = None;
                }
            }
        }

        before - self.relationships.len()
    }

    /// Remove a column and every relationship that maps it.
    pub fn remove_column(&mut self, table_id: &str, column_id: &str) {
        let Some(table) = self.tables.get_mut(table_id) else {
            warn!(table = %table_id, "remove_column: no such table");
            return;
        };
        let Some(index) = table.columns.iter().position(|c| c.id == column_id) else {
            warn!(table = %table_id, column = %column_id, "remove_column: no such column");
            return;
        };

        table.columns.remove(index);
        restamp_orders(&mut table.columns);
        let first_remaining = table.columns.first().map(|c| c.id.clone());

        let dropped = self.prune_column_references(table_id, column_id);
        debug!(table = %table_id, column = %column_id, dropped, "removed column");

        let mut selection_moved = false;
        if self.selection.column_id.as_deref() == Some(column_id) {
            self.selection.column_id = first_remaining;
            selection_moved = true;
        }
        selection_moved |= self.reconcile_relationship_selection();

        self.tables_changed();
        if dropped > 0 {
            self.relationships_changed();
        }
        if selection_moved {
            self.selection_changed();
        }
    }

    /// Merge `update` into a column.
    ///
    /// Foreign-key columns keep the data type and primary-key flag derived
    /// from the column they reference.
    pub fn update_column(&mut self, table_id: &str, column_id: &str, update: ColumnUpdate) {
        let Some(column) = self
            .tables
            .get_mut(table_id)
            .and_then(|t| t.column_mut(column_id))
        else {
            warn!(table = %table_id, column = %column_id, "update_column: no such column");
            return;
        };

        let locked = column.is_foreign_key();

        if let Some(name) = update.logical_name {
            column.logical_name = name;
        }
        if let Some(name) = update.physical_name {
            column.physical_name = name;
        }
        if let Some(data_type) = update.data_type {
            if locked && data_type != column.data_type {
                warn!(column = %column_id, "data type of a foreign key column is fixed");
            } else {
                column.data_type = data_type;
            }
        }
        if let Some(options) = update.type_options {
            column.type_options = options;
        }
        if let Some(pk) = update.is_primary_key {
            if locked && pk != column.constraints.is_primary_key {
                warn!(column = %column_id, "primary key flag of a foreign key column is fixed");
            } else {
                column.constraints.is_primary_key = pk;
            }
        }
        if let Some(unique) = update.is_unique {
            column.constraints.is_unique = unique;
        }
        if let Some(not_null) = update.is_not_null {
            column.constraints.is_not_null = not_null;
        }
        if let Some(default_value) = update.default_value {
            column.constraints.default_value = default_value;
        }
        if let Some(check) = update.check {
            column.constraints.check = check;
        }
        if let Some(description) = update.description {
            column.description = description;
        }

        self.tables_changed();
    }

    /// Reorder a table's columns to follow `column_ids` and re-stamp every
    /// `order` to its new index. Column contents are left as stored.
    pub fn update_column_orders<S: AsRef<str>>(&mut self, table_id: &str, column_ids: &[S]) {
        let Some(table) = self.tables.get_mut(table_id) else {
            warn!(table = %table_id, "update_column_orders: no such table");
            return;
        };

        let current: HashSet<&str> = table.columns.iter().map(|c| c.id.as_str()).collect();
        let proposed: HashSet<&str> = column_ids.iter().map(|id| id.as_ref()).collect();
        if current != proposed || column_ids.len() != table.columns.len() {
            warn!(table = %table_id, "update_column_orders: columns are not a reordering");
            return;
        }

        let mut stored = std::mem::take(&mut table.columns);
        for id in column_ids {
            if let Some(index) = stored.iter().position(|c| c.id == id.as_ref()) {
                table.columns.push(stored.swap_remove(index));
            }
        }
        restamp_orders(&mut table.columns);
        self.tables_changed();
    }

    // ---- relationships ----

    fn validate_relationship(&self, rel: &Relationship) -> Result<(), InvalidRelationship> {
        if rel.source_column_ids.is_empty() || rel.target_column_ids.is_empty() {
            return Err(InvalidRelationship::EmptyColumns);
        }
        if rel.source_column_ids.len() != rel.target_column_ids.len() {
            return Err(InvalidRelationship::UnpairedColumns {
                source_len: rel.source_column_ids.len(),
                target_len: rel.target_column_ids.len(),
            });
        }

        let mut sides = vec![
            (&rel.source_table_id, &rel.source_column_ids),
            (&rel.target_table_id, &rel.target_column_ids),
        ];
        if let Some(junction) = &rel.junction_table {
            if junction.source_column_ids.len() != rel.source_column_ids.len()
                || junction.target_column_ids.len() != rel.target_column_ids.len()
            {
                return Err(InvalidRelationship::UnpairedJunction);
            }
            sides.push((&junction.table_id, &junction.source_column_ids));
            sides.push((&junction.table_id, &junction.target_column_ids));
        }

        for (table_id, column_ids) in sides {
            let table = self
                .tables
                .get(table_id)
                .ok_or_else(|| InvalidRelationship::UnknownTable(table_id.clone()))?;
            if let Some(missing) = column_ids.iter().find(|id| table.column(id).is_none()) {
                return Err(InvalidRelationship::UnknownColumn {
                    table: table_id.clone(),
                    column: missing.clone(),
                });
            }
        }

        Ok(())
    }

    /// Add `relationship`, or synthesize one from the selected table to the
    /// first other table when `None`.
    ///
    /// When the relationship cannot be created the model is left untouched;
    /// an id is returned either way.
    pub fn add_relationship(&mut self, relationship: Option<Relationship>) -> String {
        let fresh_id = new_id("rel");

        let Some(mut rel) = relationship else {
            return match self.default_relationship(fresh_id.clone()) {
                Some(rel) => {
                    self.relationships.push(rel);
                    self.selection.relationship_id = Some(fresh_id.clone());
                    self.relationships_changed();
                    self.selection_changed();
                    fresh_id
                }
                None => fresh_id,
            };
        };

        if rel.id.is_empty() || self.relationship(&rel.id).is_some() {
            rel.id = fresh_id;
        }
        if let Err(reason) = self.validate_relationship(&rel) {
            warn!(relationship = %rel.id, %reason, "add_relationship: ignored");
            return rel.id;
        }

        let id = rel.id.clone();
        debug!(relationship = %id, kind = ?rel.kind, "adding relationship");
        self.relationships.push(rel);
        self.relationships_changed();
        id
    }

    fn default_relationship(&self, id: String) -> Option<Relationship> {
        let source = self
            .selected_table()
            .or_else(|| self.tables.values().next());
        let Some(source) = source else {
            warn!("add_relationship: no source table");
            return None;
        };
        let Some(target) = self.tables.values().find(|t| t.id != source.id) else {
            warn!("add_relationship: no target table");
            return None;
        };

        let source_column = source.key_column();
        let target_column = target
            .columns
            .iter()
            .find(|c| c.is_foreign_key())
            .or_else(|| target.columns.first());
        let (Some(source_column), Some(target_column)) = (source_column, target_column) else {
            warn!(source = %source.id, target = %target.id, "add_relationship: no usable columns");
            return None;
        };

        Some(Relationship {
            id,
            name: format!("{}-{}", source.logical_name, target.logical_name),
            kind: RelationshipKind::OneToMany,
            source_table_id: source.id.clone(),
            source_column_ids: vec![source_column.id.clone()],
            target_table_id: target.id.clone(),
            target_column_ids: vec![target_column.id.clone()],
            source_handle: None,
            target_handle: None,
            junction_table: None,
            on_delete: Some(ReferentialAction::Cascade),
            on_update: None,
            description: Some(format!(
                "Relationship between {} and {}",
                source.logical_name, target.logical_name
            )),
        })
    }

    /// Merge `update` into a relationship. A merge that would reference a
    /// missing table or column, or unpair the column lists, is dropped whole.
    pub fn update_relationship(&mut self, relationship_id: &str, update: RelationshipUpdate) {
        let Some(index) = self
            .relationships
            .iter()
            .position(|r| r.id == relationship_id)
        else {
            warn!(relationship = %relationship_id, "update_relationship: no such relationship");
            return;
        };

        let mut rel = self.relationships[index].clone();

        if let Some(name) = update.name {
            rel.name = name;
        }
        if let Some(kind) = update.kind {
            rel.kind = kind;
        }
        if let Some(action) = update.on_delete {
            rel.on_delete = action;
        }
        if let Some(action) = update.on_update {
            rel.on_update = action;
        }
        if let Some(description) = update.description {
            rel.description = description;
        }
        if let Some(junction) = update.junction_table {
            rel.junction_table = junction;
        }

        if let Err(reason) = self.validate_relationship(&rel) {
            warn!(relationship = %relationship_id, %reason, "update_relationship: ignored");
            return;
        }
        self.relationships[index] = rel;
        self.relationships_changed();
    }

    pub fn remove_relationship(&mut self, relationship_id: &str) {
        let Some(index) = self
            .relationships
            .iter()
            .position(|r| r.id == relationship_id)
        else {
            warn!(relationship = %relationship_id, "remove_relationship: no such relationship");
            return;
        };

        self.relationships.remove(index);
        let selection_moved = self.reconcile_relationship_selection();

        self.relationships_changed();
        if selection_moved {
            self.selection_changed();
        }
    }

    /// Remove the relationship behind a diagram edge.
    pub fn remove_edge(&mut self, edge_id: &str) {
        if self.relationship(edge_id).is_some() {
            self.remove_relationship(edge_id);
        } else {
            let id = relationship_id_for_edge(edge_id).to_string();
            self.remove_relationship(&id);
        }
    }

    /// Point a stale relationship selection at the first remaining one.
    fn reconcile_relationship_selection(&mut self) -> bool {
        let Some(selected) = self.selection.relationship_id.as_deref() else {
            return false;
        };
        if self.relationships.iter().any(|r| r.id == selected) {
            return false;
        }
        self.selection.relationship_id = self.relationships.first().map(|r| r.id.clone());
        true
    }

    /// Draw a one-to-many edge from `source` (the "one" side) to `target`
    /// (the "many" side).
    ///
    /// The target's existing foreign-key column for the source is reused;
    /// otherwise one is added, typed like the source's key. Repeating the
    /// same connection returns the existing relationship.
    pub fn connect_tables(
        &mut self,
        source_table_id: &str,
        target_table_id: &str,
        handles: ConnectionHandles,
    ) -> Option<String> {
        let (Some(source), Some(target)) = (
            self.tables.get(source_table_id),
            self.tables.get(target_table_id),
        ) else {
            warn!(source = %source_table_id, target = %target_table_id, "connect_tables: no such table");
            return None;
        };

        let Some(parent) = source.key_column() else {
            warn!(source = %source_table_id, "connect_tables: source table has no columns");
            return None;
        };
        let parent_id = parent.id.clone();
        let parent_type = parent.data_type;
        let parent_options = parent.type_options;
        let source_logical = source.logical_name.clone();
        let source_physical = source.physical_name.clone();
        let target_logical = target.logical_name.clone();
        let existing_child = target
            .columns
            .iter()
            .find(|c| c.references_table(source_table_id))
            .map(|c| c.id.clone());

        let (child_id, created) = match existing_child {
            Some(id) => (id, false),
            None => {
                let target = self.tables.get_mut(target_table_id)?;
                let id = new_id("col");
                target.columns.push(Column {
                    id: id.clone(),
                    logical_name: format!("{source_logical} ID"),
                    physical_name: format!("{}_id", source_physical.to_lowercase().replace('-', "_")),
                    data_type: parent_type,
                    order: target.columns.len(),
                    type_options: parent_options,
                    constraints: ColumnConstraints {
                        is_not_null: true,
                        foreign_key: Some(ForeignKeyRef {
                            table_id: source_table_id.to_string(),
                            column_id: parent_id.clone(),
                        }),
                        ..Default::default()
                    },
                    description: None,
                });
                (id, true)
            }
        };

        if created {
            self.tables_changed();
        }

        let duplicate = self.relationships.iter().find(|r| {
            r.source_table_id == source_table_id
                && r.target_table_id == target_table_id
                && r.source_column_ids == [parent_id.as_str()]
                && r.target_column_ids == [child_id.as_str()]
        });
        if let Some(existing) = duplicate {
            debug!(relationship = %existing.id, "connect_tables: already connected");
            return Some(existing.id.clone());
        }

        let kind = RelationshipKind::OneToMany;
        let id = new_id("rel");
        self.relationships.push(Relationship {
            id: id.clone(),
            name: format!("{source_logical}-{target_logical}"),
            kind,
            source_table_id: source_table_id.to_string(),
            source_column_ids: vec![parent_id],
            target_table_id: target_table_id.to_string(),
            target_column_ids: vec![child_id],
            source_handle: handles.source_handle,
            target_handle: handles.target_handle,
            junction_table: None,
            on_delete: Some(ReferentialAction::Cascade),
            on_update: None,
            description: Some(format!(
                "{} relationship between {source_logical} (parent) and {target_logical} (child)",
                kind.label()
            )),
        });
        debug!(relationship = %id, source = %source_table_id, target = %target_table_id, "connected tables");

        self.relationships_changed();
        Some(id)
    }

    // ---- selection ----

    /// Select a table. Its first column becomes the selected column unless
    /// a column of this same table is already selected.
    pub fn select_table(&mut self, table_id: &str) {
        let Some(table) = self.tables.get(table_id) else {
            warn!(table = %table_id, "select_table: no such table");
            return;
        };

        let keeps_column = self.selection.table_id.as_deref() == Some(table_id)
            && self
                .selection
                .column_id
                .as_deref()
                .is_some_and(|c| table.column(c).is_some());

        if !keeps_column {
            self.selection.column_id = table.columns.first().map(|c| c.id.clone());
        }
        self.selection.table_id = Some(table_id.to_string());
        self.selection_changed();
    }

    /// Select a column; its table becomes the selected table.
    pub fn select_column(&mut self, column_id: &str) {
        let Some(table) = self
            .tables
            .values()
            .find(|t| t.column(column_id).is_some())
        else {
            warn!(column = %column_id, "select_column: no such column");
            return;
        };

        self.selection.table_id = Some(table.id.clone());
        self.selection.column_id = Some(column_id.to_string());
        self.selection_changed();
    }

    pub fn select_relationship(&mut self, relationship_id: &str) {
        if self.relationship(relationship_id).is_none() {
            warn!(relationship = %relationship_id, "select_relationship: no such relationship");
            return;
        }
        self.selection.relationship_id = Some(relationship_id.to_string());
        self.selection_changed();
    }

    pub fn clear_selection(&mut self) {
        self.selection = Selection::default();
        self.selection_changed();
    }

    // ---- whole model ----

    pub fn reset(&mut self) {
        self.tables.clear();
        self.relationships.clear();
        self.selection = Selection::default();
        self.tables_changed();
        self.relationships_changed();
        self.selection_changed();
    }

    /// Replace the model with a loaded document.
    ///
    /// Tables go in first, then relationships (dropping any that reference
    /// missing tables or columns), then listeners hear about it once.
    pub fn load_document(&mut self, document: SchemaDocument) {
        let (tables, relationships) = document.into_parts();

        self.tables.clear();
        self.relationships.clear();
        self.selection = Selection::default();

        for mut table in tables {
            self.claim_ids(&mut table);
            self.tables.insert(table.id.clone(), table);
        }

        let mut pruned = 0;
        for mut rel in relationships {
            if self.relationship(&rel.id).is_some() {
                rel.id = new_id("rel");
            }
            match self.validate_relationship(&rel) {
                Ok(()) => self.relationships.push(rel),
                Err(reason) => {
                    warn!(relationship = %rel.id, %reason, "load_document: dropping relationship");
                    pruned += 1;
                }
            }
        }
        debug!(
            tables = self.tables.len(),
            relationships = self.relationships.len(),
            pruned,
            "loaded document"
        );

        if let Some(first) = self.tables.values().next() {
            self.selection.table_id = Some(first.id.clone());
            self.selection.column_id = first.columns.first().map(|c| c.id.clone());
        }

        self.tables_changed();
        self.relationships_changed();
        self.selection_changed();
    }

    pub fn to_document(&self, metadata: DocumentMetadata) -> SchemaDocument {
        SchemaDocument::new(metadata, self.tables.values(), &self.relationships)
    }

    /// DDL for the given tables and the relationships among them.
    pub fn generate_ddl<S: AsRef<str>>(&self, table_ids: &[S], options: DdlOptions) -> String {
        self.generate_ddl_with(&DdlGenerator::new(options), table_ids)
    }

    pub fn generate_ddl_with<S: AsRef<str>>(&self, generator: &DdlGenerator, table_ids: &[S]) -> String {
        generator.generate_for_selection(table_ids, self.tables.values(), &self.relationships)
    }
}

fn restamp_orders(columns: &mut [Column]) {
    for (i, column) in columns.iter_mut().enumerate() {
        column.order = i;
    }
}

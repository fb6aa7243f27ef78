//! Engine configuration: placement constants and names given to new objects.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Position of the first table on an empty canvas.
    pub origin_x: f64,
    pub origin_y: f64,
    /// Horizontal distance between a new table and the rightmost one.
    pub table_gap_x: f64,
    /// Vertical distance to the next row once the viewport width is exceeded.
    pub table_gap_y: f64,
    pub viewport_width: f64,
    pub clone_offset_x: f64,
    pub clone_offset_y: f64,
    pub new_table_logical_name: String,
    pub new_table_physical_name: String,
    pub new_column_logical_name: String,
    pub new_column_physical_name: String,
    /// Colour tags picked for new tables.
    pub palette: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            origin_x: 100.0,
            origin_y: 100.0,
            table_gap_x: 400.0,
            table_gap_y: 400.0,
            viewport_width: 1500.0,
            clone_offset_x: 300.0,
            clone_offset_y: 350.0,
            new_table_logical_name: "New Table".to_string(),
            new_table_physical_name: "NEW_TB".to_string(),
            new_column_logical_name: "New Column".to_string(),
            new_column_physical_name: "NewColumn".to_string(),
            palette: [
                "red", "orange", "amber", "yellow", "lime", "green", "emerald", "teal", "cyan",
                "sky", "blue", "indigo", "violet", "purple", "fuchsia", "pink", "rose",
            ]
            .iter()
            .map(|c| format!("bg-{c}-200"))
            .collect(),
        }
    }
}

impl EngineConfig {
    /// Colour for the `n`th table, cycling through the palette.
    pub fn color_for(&self, n: usize) -> String {
        if self.palette.is_empty() {
            return String::new();
        }
        self.palette[n % self.palette.len()].clone()
    }
}

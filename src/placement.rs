//! Placement of newly added tables on the canvas.

use crate::config::EngineConfig;
use crate::model::Position;

/// Next free position: right of the rightmost table, on the bottom-most row,
/// wrapping to a new row once past the viewport width.
pub fn next_table_position<'a>(
    existing: impl IntoIterator<Item = &'a Position>,
    config: &EngineConfig,
) -> Position {
    let mut max_x: Option<f64> = None;
    let mut max_y: Option<f64> = None;
    for p in existing {
        max_x = Some(max_x.map_or(p.x, |x| x.max(p.x)));
        max_y = Some(max_y.map_or(p.y, |y| y.max(p.y)));
    }

    let (Some(rightmost), Some(bottom)) = (max_x, max_y) else {
        return Position {
            x: config.origin_x,
            y: config.origin_y,
        };
    };

    let x = rightmost + config.table_gap_x;
    if x > config.viewport_width {
        Position {
            x: config.origin_x,
            y: bottom + config.table_gap_y,
        }
    } else {
        Position { x, y: bottom }
    }
}

/// Position of a clone relative to its original.
pub fn clone_position(origin: &Position, config: &EngineConfig) -> Position {
    Position {
        x: origin.x + config.clone_offset_x,
        y: origin.y + config.clone_offset_y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(x: f64, y: f64) -> Position {
        Position { x, y }
    }

    #[test]
    fn test_first_table_at_origin() {
        let existing: [Position; 0] = [];
        let p = next_table_position(&existing, &EngineConfig::default());
        assert_eq!(p, pos(100.0, 100.0));
    }

    #[test]
    fn test_right_of_rightmost() {
        let existing = [pos(100.0, 100.0), pos(500.0, 100.0)];
        let p = next_table_position(&existing, &EngineConfig::default());
        assert_eq!(p, pos(900.0, 100.0));
    }

    #[test]
    fn test_uses_bottom_row() {
        let existing = [pos(500.0, 100.0), pos(100.0, 500.0)];
        let p = next_table_position(&existing, &EngineConfig::default());
        assert_eq!(p, pos(900.0, 500.0));
    }

    #[test]
    fn test_wraps_past_viewport() {
        let existing = [pos(1300.0, 100.0)];
        let p = next_table_position(&existing, &EngineConfig::default());
        assert_eq!(p, pos(100.0, 500.0));
    }

    #[test]
    fn test_clone_offset() {
        let p = clone_position(&pos(10.0, 20.0), &EngineConfig::default());
        assert_eq!(p, pos(310.0, 370.0));
    }
}

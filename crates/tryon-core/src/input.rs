//! Pointer input for the scene host.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Pointer event type for unified mouse/touch handling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PointerEvent {
    Down { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Up { x: f64, y: f64 },
}

impl PointerEvent {
    /// Position in canvas coordinates.
    pub fn position(&self) -> Point {
        match *self {
            PointerEvent::Down { x, y } | PointerEvent::Move { x, y } | PointerEvent::Up { x, y } => {
                Point::new(x, y)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pointer_script() {
        let events: Vec<PointerEvent> = serde_json::from_str(
            r#"[{"type":"down","x":1,"y":2},{"type":"move","x":3,"y":4},{"type":"up","x":5,"y":6}]"#,
        )
        .unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[1], PointerEvent::Move { x: 3.0, y: 4.0 });
        assert_eq!(events[2].position(), Point::new(5.0, 6.0));
    }
}

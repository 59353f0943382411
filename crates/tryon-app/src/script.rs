//! Recorded pointer input replayed against a session.

use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tryon_core::PointerEvent;

/// A JSON array of pointer events, e.g.
/// `[{"type": "down", "x": 620, "y": 812}, {"type": "up", "x": 240, "y": 432}]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointerScript {
    pub events: Vec<PointerEvent>,
}

impl PointerScript {
    pub fn from_json(json: &str) -> AppResult<Self> {
        serde_json::from_str(json).map_err(|e| AppError::Script(e.to_string()))
    }

    pub fn load(path: &Path) -> AppResult<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_script() {
        let script = PointerScript::from_json(
            r#"[{"type": "down", "x": 620, "y": 812}, {"type": "move", "x": 400, "y": 600}, {"type": "up", "x": 240, "y": 432}]"#,
        )
        .unwrap();
        assert_eq!(script.len(), 3);
        assert_eq!(script.events[0], PointerEvent::Down { x: 620.0, y: 812.0 });
        assert_eq!(script.events[2], PointerEvent::Up { x: 240.0, y: 432.0 });
    }

    #[test]
    fn test_bad_script() {
        assert!(matches!(PointerScript::from_json(r#"[{"type": "hover"}]"#), Err(AppError::Script(_))));
    }
}

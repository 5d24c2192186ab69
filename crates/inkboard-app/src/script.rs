//! Gesture scripts: recorded whiteboard input replayed by the app.
//!
//! ```json
//! { "origin": { "x": 0, "y": 0 },
//!   "steps": [
//!     { "type": "tool", "tool": "rectangle" },
//!     { "type": "down", "x": 10, "y": 10 },
//!     { "type": "move", "x": 80, "y": 60 },
//!     { "type": "up" },
//!     { "type": "export" } ] }
//! ```
//!
//! A bare array of steps is accepted too.

use inkboard_core::ToolKind;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// One recorded input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptStep {
    Tool { tool: ToolKind },
    /// Hex color, e.g. `#FF0000`.
    Color { color: String },
    BrushWidth { width: u32 },
    /// Pointer positions are device coordinates; the script origin is
    /// subtracted to get surface-local points.
    Down { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Up,
    Leave,
    /// Queue a reply for the next text prompt.
    Answer { text: String },
    Undo,
    Redo,
    PeerCursor {
        user_id: String,
        x: f64,
        y: f64,
        #[serde(default)]
        color: Option<String>,
    },
    /// Start a new presence tick.
    Tick,
    Export,
}

/// A whole script.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    /// Surface origin in device coordinates.
    #[serde(default)]
    pub origin: Point,
    pub steps: Vec<ScriptStep>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ScriptFile {
    Full(Script),
    Steps(Vec<ScriptStep>),
}

impl Script {
    /// Parse a script from JSON (object form or bare step array).
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(match serde_json::from_str(json)? {
            ScriptFile::Full(script) => script,
            ScriptFile::Steps(steps) => Script {
                origin: Point::ZERO,
                steps,
            },
        })
    }

    /// Replies queued by `answer` steps, in order.
    pub fn answers(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().filter_map(|step| match step {
            ScriptStep::Answer { text } => Some(text.as_str()),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_object_form() {
        let script = Script::from_json(
            r#"{"origin":{"x":100,"y":50},"steps":[
                {"type":"tool","tool":"circle"},
                {"type":"down","x":110,"y":60},
                {"type":"up"}
            ]}"#,
        )
        .unwrap();

        assert_eq!(script.origin, Point::new(100.0, 50.0));
        assert_eq!(script.steps[0], ScriptStep::Tool { tool: ToolKind::Circle });
        assert_eq!(script.steps[1], ScriptStep::Down { x: 110.0, y: 60.0 });
        assert_eq!(script.steps[2], ScriptStep::Up);
    }

    #[test]
    fn test_parse_bare_array() {
        let script = Script::from_json(
            r#"[{"type":"brush_width","width":5},{"type":"answer","text":"hello"},{"type":"export"}]"#,
        )
        .unwrap();

        assert_eq!(script.origin, Point::ZERO);
        assert_eq!(script.steps.len(), 3);
        assert_eq!(script.answers().collect::<Vec<_>>(), vec!["hello"]);
    }

    #[test]
    fn test_unknown_step_rejected() {
        assert!(Script::from_json(r#"[{"type":"zoom_in"}]"#).is_err());
    }

    #[test]
    fn test_peer_cursor_color_optional() {
        let script =
            Script::from_json(r#"[{"type":"peer_cursor","user_id":"ann","x":1,"y":2}]"#).unwrap();
        assert_eq!(
            script.steps[0],
            ScriptStep::PeerCursor {
                user_id: "ann".into(),
                x: 1.0,
                y: 2.0,
                color: None
            }
        );
    }
}

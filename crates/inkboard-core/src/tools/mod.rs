//! Tool system for the whiteboard.
//!
//! `ToolManager` interprets pointer input against the selected tool and
//! answers with [`ToolAction`]s. It never touches pixels itself; the
//! whiteboard session executes the actions against the surface and history.

use crate::style::{RgbColor, Style};
use crate::surface::{DrawOp, Paint};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// The eraser strokes at this multiple of the brush width.
pub const ERASER_WIDTH_FACTOR: f64 = 2.0;

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    Select,
    #[default]
    Pen,
    Rectangle,
    Circle,
    Text,
    Eraser,
}

impl ToolKind {
    /// All tools, in toolbar order.
    pub const ALL: [ToolKind; 6] = [
        ToolKind::Select,
        ToolKind::Pen,
        ToolKind::Rectangle,
        ToolKind::Circle,
        ToolKind::Text,
        ToolKind::Eraser,
    ];

    /// Toolbar label.
    pub fn label(self) -> &'static str {
        match self {
            ToolKind::Select => "Select",
            ToolKind::Pen => "Pen",
            ToolKind::Rectangle => "Rectangle",
            ToolKind::Circle => "Circle",
            ToolKind::Text => "Text",
            ToolKind::Eraser => "Eraser",
        }
    }
}

/// State of a tool interaction.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ToolState {
    /// Waiting for a pointer-down.
    #[default]
    Idle,
    /// A gesture is in progress.
    Active {
        /// Tool captured at pointer-down.
        tool: ToolKind,
        /// Where the gesture started.
        anchor: Point,
        /// Most recent pointer position (end of the open path for pen/eraser).
        last: Point,
        /// Whether any pointer-move arrived since pointer-down.
        moved: bool,
    },
}

/// Work the session must carry out in response to an input.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolAction {
    /// Restore the surface to the snapshot at the history cursor.
    RestoreCurrent,
    /// Apply a primitive to the surface.
    Draw(DrawOp),
    /// Ask the user for a line of text, then draw it at `anchor` and commit
    /// when the answer is non-empty.
    PromptText {
        anchor: Point,
        font_size: f64,
        color: RgbColor,
    },
    /// Commit the current surface as a new history entry.
    Commit,
}

/// Manages the current tool and its state.
#[derive(Debug, Clone, Default)]
pub struct ToolManager {
    /// Tool used by the next gesture.
    current_tool: ToolKind,
    /// Current state of the tool.
    state: ToolState,
}

impl ToolManager {
    /// Create a new tool manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tool that the next gesture will use.
    pub fn current_tool(&self) -> ToolKind {
        self.current_tool
    }

    pub fn state(&self) -> ToolState {
        self.state
    }

    /// Select a tool. An in-progress gesture keeps the tool it started with.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.current_tool = tool;
    }

    /// Check if a tool interaction is active.
    pub fn is_active(&self) -> bool {
        matches!(self.state, ToolState::Active { .. })
    }

    /// Tool of the gesture in progress, if any.
    pub fn active_tool(&self) -> Option<ToolKind> {
        match self.state {
            ToolState::Active { tool, .. } => Some(tool),
            ToolState::Idle => None,
        }
    }

    /// Begin a gesture. Returns false (and changes nothing) when a gesture
    /// is already active.
    pub fn begin(&mut self, point: Point) -> bool {
        if self.is_active() {
            return false;
        }
        self.state = ToolState::Active {
            tool: self.current_tool,
            anchor: point,
            last: point,
            moved: false,
        };
        true
    }

    /// Advance the gesture to `point`.
    pub fn update(&mut self, point: Point, style: &Style) -> Vec<ToolAction> {
        let ToolState::Active {
            tool,
            anchor,
            last,
            moved,
        } = &mut self.state
        else {
            return Vec::new();
        };
        let from = *last;
        *last = point;
        *moved = true;

        match *tool {
            ToolKind::Pen => vec![ToolAction::Draw(DrawOp::StrokeSegment {
                from,
                to: point,
                paint: Paint::Color(style.color),
                width: style.stroke_width(),
            })],
            ToolKind::Eraser => vec![ToolAction::Draw(DrawOp::StrokeSegment {
                from,
                to: point,
                paint: Paint::Background,
                width: style.stroke_width() * ERASER_WIDTH_FACTOR,
            })],
            ToolKind::Rectangle | ToolKind::Circle => vec![
                ToolAction::RestoreCurrent,
                ToolAction::Draw(shape_op(*tool, *anchor, point, style)),
            ],
            ToolKind::Select | ToolKind::Text => Vec::new(),
        }
    }

    /// Finish the gesture (pointer-up or pointer-leave).
    pub fn end(&mut self, style: &Style) -> Vec<ToolAction> {
        let ToolState::Active {
            tool,
            anchor,
            moved,
            ..
        } = std::mem::take(&mut self.state)
        else {
            return Vec::new();
        };

        match tool {
            ToolKind::Pen | ToolKind::Eraser => vec![ToolAction::Commit],
            ToolKind::Rectangle | ToolKind::Circle if !moved => vec![
                ToolAction::RestoreCurrent,
                ToolAction::Draw(shape_op(tool, anchor, anchor, style)),
                ToolAction::Commit,
            ],
            ToolKind::Rectangle | ToolKind::Circle => vec![ToolAction::Commit],
            ToolKind::Text => vec![ToolAction::PromptText {
                anchor,
                font_size: style.font_size(),
                color: style.color,
            }],
            ToolKind::Select => Vec::new(),
        }
    }

    /// Drop the current interaction without committing.
    pub fn cancel(&mut self) {
        self.state = ToolState::Idle;
    }
}

/// Outline for the rectangle and circle tools, from the anchor to `current`.
fn shape_op(tool: ToolKind, anchor: Point, current: Point, style: &Style) -> DrawOp {
    let paint = Paint::Color(style.color);
    let width = style.stroke_width();
    if tool == ToolKind::Circle {
        let radius = (current - anchor).hypot();
        DrawOp::StrokeEllipse {
            center: anchor,
            radii: Vec2::new(radius, radius),
            paint,
            width,
        }
    } else {
        DrawOp::StrokeRect {
            origin: anchor,
            size: current - anchor,
            paint,
            width,
        }
    }
}

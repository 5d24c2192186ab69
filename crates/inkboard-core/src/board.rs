//! Whiteboard session: surface, tools and history wired together.

use crate::collaboration::CollaborationOverlay;
use crate::export::{self, ExportError};
use crate::history::History;
use crate::input::PointerEvent;
use crate::style::{RgbColor, Style};
use crate::surface::{DrawOp, Paint, RasterSurface, SurfaceError};
use crate::tools::{ToolAction, ToolKind, ToolManager};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

/// Whiteboard errors.
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("Drawing surface is not available")]
    SurfaceUnavailable,
    #[error("Surface error: {0}")]
    Surface(#[from] SurfaceError),
    #[error("Export failed: {0}")]
    ExportFailed(#[from] ExportError),
}

/// Result type for whiteboard operations.
pub type BoardResult<T> = Result<T, BoardError>;

/// Informational outcome of an undo/redo request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryNotice {
    Undone { cursor: usize },
    Redone { cursor: usize },
    NothingToUndo,
    NothingToRedo,
}

impl HistoryNotice {
    /// Whether the request changed the surface.
    pub fn applied(self) -> bool {
        matches!(self, HistoryNotice::Undone { .. } | HistoryNotice::Redone { .. })
    }
}

impl fmt::Display for HistoryNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryNotice::Undone { .. } => write!(f, "Undo"),
            HistoryNotice::Redone { .. } => write!(f, "Redo"),
            HistoryNotice::NothingToUndo => write!(f, "Nothing to undo"),
            HistoryNotice::NothingToRedo => write!(f, "Nothing to redo"),
        }
    }
}

/// Source of text for the text tool.
///
/// Called synchronously when a text gesture ends; the gesture does not
/// finish until it answers. `None` or an empty string cancels.
pub trait TextPrompt {
    fn request_text(&mut self, anchor: Point) -> Option<String>;
}

impl<F> TextPrompt for F
where
    F: FnMut(Point) -> Option<String>,
{
    fn request_text(&mut self, anchor: Point) -> Option<String> {
        self(anchor)
    }
}

/// Prompt that always cancels.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoText;

impl TextPrompt for NoText {
    fn request_text(&mut self, _anchor: Point) -> Option<String> {
        None
    }
}

/// Surface and history settings for a whiteboard session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub width: u32,
    pub height: u32,
    pub background: RgbColor,
    /// Maximum history entries; `None` keeps every snapshot.
    pub history_limit: Option<usize>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 800,
            background: RgbColor::white(),
            history_limit: None,
        }
    }
}

/// One whiteboard session.
///
/// The surface and history only exist after [`Whiteboard::initialize`];
/// until then every drawing and history operation fails with
/// [`BoardError::SurfaceUnavailable`].
#[derive(Debug)]
pub struct Whiteboard {
    id: Uuid,
    config: BoardConfig,
    surface: Option<RasterSurface>,
    history: Option<History>,
    tools: ToolManager,
    style: Style,
    overlay: CollaborationOverlay,
}

impl Whiteboard {
    /// Create a session whose surface is not yet available.
    pub fn new(config: BoardConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            config,
            surface: None,
            history: None,
            tools: ToolManager::new(),
            style: Style::default(),
            overlay: CollaborationOverlay::new(),
        }
    }

    /// Create and initialize a session in one step.
    pub fn ready(config: BoardConfig) -> BoardResult<Self> {
        let mut board = Self::new(config);
        board.initialize()?;
        Ok(board)
    }

    /// Create the blank surface and seed history with it. Re-initializing
    /// discards the previous drawing, its history and any active gesture.
    pub fn initialize(&mut self) -> BoardResult<()> {
        let surface =
            RasterSurface::new(self.config.width, self.config.height, self.config.background)?;
        self.history = Some(History::with_limit(surface.snapshot(), self.config.history_limit));
        self.surface = Some(surface);
        self.tools.cancel();
        log::info!(
            "Whiteboard {} initialized at {}x{}",
            self.id,
            self.config.width,
            self.config.height
        );
        Ok(())
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn is_ready(&self) -> bool {
        self.surface.is_some() && self.history.is_some()
    }

    pub fn surface(&self) -> Option<&RasterSurface> {
        self.surface.as_ref()
    }

    pub fn history(&self) -> Option<&History> {
        self.history.as_ref()
    }

    // --- Tool and style selection ---

    /// Tool for the next gesture.
    pub fn tool(&self) -> ToolKind {
        self.tools.current_tool()
    }

    pub fn set_tool(&mut self, tool: ToolKind) {
        self.tools.set_tool(tool);
    }

    /// Whether a gesture is in progress.
    pub fn is_drawing(&self) -> bool {
        self.tools.is_active()
    }

    pub fn style(&self) -> Style {
        self.style
    }

    pub fn set_style(&mut self, style: Style) {
        self.style = style;
    }

    pub fn set_color(&mut self, color: RgbColor) {
        self.style.color = color;
    }

    /// Set the brush width, clamped into `[1, 20]`.
    pub fn set_brush_width(&mut self, width: u32) {
        self.style.set_brush_width(width);
    }

    // --- Collaboration ---

    pub fn overlay(&self) -> &CollaborationOverlay {
        &self.overlay
    }

    pub fn overlay_mut(&mut self) -> &mut CollaborationOverlay {
        &mut self.overlay
    }

    /// Inbound presence hook. Only the overlay changes.
    pub fn on_peer_cursor(&mut self, user_id: &str, point: Point, color_hint: Option<RgbColor>) {
        self.overlay.on_peer_cursor(user_id, point, color_hint);
    }

    // --- Pointer input ---

    /// Dispatch a pointer event. `prompt` answers the text tool.
    pub fn handle_pointer_event(
        &mut self,
        event: PointerEvent,
        prompt: &mut dyn TextPrompt,
    ) -> BoardResult<()> {
        match event {
            PointerEvent::Down { position } => self.pointer_down(position),
            PointerEvent::Move { position } => self.pointer_move(position),
            PointerEvent::Up { .. } => self.pointer_up(prompt),
            PointerEvent::Leave { .. } => self.pointer_leave(prompt),
        }
    }

    pub fn pointer_down(&mut self, point: Point) -> BoardResult<()> {
        self.ensure_ready()?;
        if self.tools.begin(point) {
            if let Some(tool) = self.tools.active_tool() {
                log::debug!("{} gesture started at {:?}", tool.label(), point);
            }
        } else {
            log::debug!("Ignoring pointer-down at {:?}: gesture already active", point);
        }
        Ok(())
    }

    pub fn pointer_move(&mut self, point: Point) -> BoardResult<()> {
        self.ensure_ready()?;
        let actions = self.tools.update(point, &self.style);
        self.run(actions, &mut NoText)
    }

    pub fn pointer_up(&mut self, prompt: &mut dyn TextPrompt) -> BoardResult<()> {
        self.ensure_ready()?;
        let actions = self.tools.end(&self.style);
        self.run(actions, prompt)
    }

    /// Pointer left the surface: the gesture is finalized, not discarded.
    pub fn pointer_leave(&mut self, prompt: &mut dyn TextPrompt) -> BoardResult<()> {
        self.pointer_up(prompt)
    }

    // --- History ---

    /// Append the current surface to history, cutting any redo branch.
    pub fn commit(&mut self) -> BoardResult<()> {
        let (surface, history) = self.parts_mut()?;
        history.commit(surface.snapshot());
        log::info!("Committed history entry {} of {}", history.cursor(), history.len());
        Ok(())
    }

    pub fn undo(&mut self) -> BoardResult<HistoryNotice> {
        let (surface, history) = self.parts_mut()?;
        let notice = match history.undo() {
            Some(snapshot) => {
                surface.restore(snapshot)?;
                HistoryNotice::Undone {
                    cursor: history.cursor(),
                }
            }
            None => HistoryNotice::NothingToUndo,
        };
        log::info!("{}", notice);
        Ok(notice)
    }

    pub fn redo(&mut self) -> BoardResult<HistoryNotice> {
        let (surface, history) = self.parts_mut()?;
        let notice = match history.redo() {
            Some(snapshot) => {
                surface.restore(snapshot)?;
                HistoryNotice::Redone {
                    cursor: history.cursor(),
                }
            }
            None => HistoryNotice::NothingToRedo,
        };
        log::info!("{}", notice);
        Ok(notice)
    }

    // --- Export ---

    /// Encode the current surface as PNG. History is not affected.
    pub fn export_png(&self) -> BoardResult<Vec<u8>> {
        let surface = self.surface.as_ref().ok_or(BoardError::SurfaceUnavailable)?;
        Ok(export::encode_png(surface)?)
    }

    /// Write `whiteboard.png` into `dir`.
    pub fn export_to_dir(&self, dir: &Path) -> BoardResult<PathBuf> {
        let surface = self.surface.as_ref().ok_or(BoardError::SurfaceUnavailable)?;
        Ok(export::write_png(surface, dir)?)
    }

    // --- Internals ---

    fn ensure_ready(&self) -> BoardResult<()> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(BoardError::SurfaceUnavailable)
        }
    }

    fn parts_mut(&mut self) -> BoardResult<(&mut RasterSurface, &mut History)> {
        match (self.surface.as_mut(), self.history.as_mut()) {
            (Some(surface), Some(history)) => Ok((surface, history)),
            _ => Err(BoardError::SurfaceUnavailable),
        }
    }

    /// Execute tool actions in order.
    fn run(&mut self, actions: Vec<ToolAction>, prompt: &mut dyn TextPrompt) -> BoardResult<()> {
        for action in actions {
            match action {
                ToolAction::RestoreCurrent => {
                    let (surface, history) = self.parts_mut()?;
                    surface.restore(history.peek_current())?;
                }
                ToolAction::Draw(op) => {
                    let (surface, _) = self.parts_mut()?;
                    surface.apply(&op);
                }
                ToolAction::PromptText {
                    anchor,
                    font_size,
                    color,
                } => match prompt.request_text(anchor) {
                    Some(text) if !text.is_empty() => {
                        let (surface, _) = self.parts_mut()?;
                        surface.apply(&DrawOp::FillText {
                            text,
                            origin: anchor,
                            font_size,
                            paint: Paint::Color(color),
                        });
                        self.commit()?;
                    }
                    _ => log::debug!("Text entry cancelled at {:?}", anchor),
                },
                ToolAction::Commit => self.commit()?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Snapshot;

    fn small_config() -> BoardConfig {
        BoardConfig {
            width: 120,
            height: 80,
            ..BoardConfig::default()
        }
    }

    fn board() -> Whiteboard {
        Whiteboard::ready(small_config()).unwrap()
    }

    fn snapshot(board: &Whiteboard) -> Snapshot {
        board.surface().unwrap().snapshot()
    }

    fn pixel(board: &Whiteboard, x: u32, y: u32) -> RgbColor {
        board.surface().unwrap().pixel(x, y).unwrap()
    }

    fn drag(board: &mut Whiteboard, points: &[(f64, f64)]) {
        let (first, rest) = points.split_first().unwrap();
        board.pointer_down(Point::new(first.0, first.1)).unwrap();
        for &(x, y) in rest {
            board.pointer_move(Point::new(x, y)).unwrap();
        }
        board.pointer_up(&mut NoText).unwrap();
    }

    #[test]
    fn test_uninitialized_board_rejects_operations() {
        let mut board = Whiteboard::new(small_config());
        assert!(!board.is_ready());
        assert!(matches!(board.pointer_down(Point::ZERO), Err(BoardError::SurfaceUnavailable)));
        assert!(matches!(board.pointer_move(Point::ZERO), Err(BoardError::SurfaceUnavailable)));
        assert!(matches!(board.pointer_up(&mut NoText), Err(BoardError::SurfaceUnavailable)));
        assert!(matches!(board.undo(), Err(BoardError::SurfaceUnavailable)));
        assert!(matches!(board.redo(), Err(BoardError::SurfaceUnavailable)));
        assert!(matches!(board.commit(), Err(BoardError::SurfaceUnavailable)));
        assert!(matches!(board.export_png(), Err(BoardError::SurfaceUnavailable)));

        board.initialize().unwrap();
        assert!(board.is_ready());
        assert_eq!(board.history().unwrap().len(), 1);
    }

    #[test]
    fn test_empty_surface_config_fails() {
        let config = BoardConfig {
            width: 0,
            ..BoardConfig::default()
        };
        assert!(matches!(
            Whiteboard::ready(config),
            Err(BoardError::Surface(SurfaceError::EmptySurface { .. }))
        ));
    }

    #[test]
    fn test_undo_redo_inverse_law() {
        let mut board = board();
        drag(&mut board, &[(10.0, 10.0), (50.0, 10.0)]);
        let before = snapshot(&board);

        board.set_tool(ToolKind::Rectangle);
        drag(&mut board, &[(20.0, 20.0), (60.0, 50.0)]);
        let after = snapshot(&board);
        assert_ne!(before, after);

        assert_eq!(board.undo().unwrap(), HistoryNotice::Undone { cursor: 1 });
        assert_eq!(snapshot(&board), before);

        assert_eq!(board.redo().unwrap(), HistoryNotice::Redone { cursor: 2 });
        assert_eq!(snapshot(&board), after);
    }

    #[test]
    fn test_branch_truncation() {
        let mut board = board();
        drag(&mut board, &[(10.0, 10.0), (50.0, 10.0)]);
        drag(&mut board, &[(10.0, 30.0), (50.0, 30.0)]);
        let s2 = snapshot(&board);

        board.undo().unwrap();
        drag(&mut board, &[(10.0, 60.0), (50.0, 60.0)]);
        let s3 = snapshot(&board);

        let history = board.history().unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history.cursor(), 2);
        assert_eq!(history.peek_current(), &s3);
        assert_ne!(history.get(2), Some(&s2));
        assert_eq!(board.redo().unwrap(), HistoryNotice::NothingToRedo);
    }

    #[test]
    fn test_no_op_boundaries() {
        let mut board = board();
        let blank = snapshot(&board);

        let notice = board.undo().unwrap();
        assert_eq!(notice, HistoryNotice::NothingToUndo);
        assert!(!notice.applied());
        assert_eq!(notice.to_string(), "Nothing to undo");
        assert_eq!(snapshot(&board), blank);

        drag(&mut board, &[(5.0, 5.0), (25.0, 25.0)]);
        let drawn = snapshot(&board);
        assert_eq!(board.redo().unwrap(), HistoryNotice::NothingToRedo);
        assert_eq!(board.history().unwrap().cursor(), 1);
        assert_eq!(board.history().unwrap().len(), 2);
        assert_eq!(snapshot(&board), drawn);
    }

    #[test]
    fn test_rectangle_preview_is_non_destructive() {
        let mut board = board();
        board.set_tool(ToolKind::Rectangle);
        drag(
            &mut board,
            &[(10.0, 10.0), (30.0, 30.0), (50.0, 50.0), (90.0, 60.0)],
        );

        let mut expected = RasterSurface::new(120, 80, RgbColor::white()).unwrap();
        expected.stroke_rect(
            Point::new(10.0, 10.0),
            kurbo::Vec2::new(80.0, 50.0),
            RgbColor::black().into(),
            2.0,
        );
        assert_eq!(snapshot(&board), expected.snapshot());
        assert_eq!(board.history().unwrap().len(), 2);
    }

    #[test]
    fn test_preview_keeps_earlier_drawing() {
        let mut board = board();
        drag(&mut board, &[(0.0, 70.0), (119.0, 70.0)]);

        board.set_tool(ToolKind::Circle);
        drag(&mut board, &[(60.0, 30.0), (70.0, 30.0), (80.0, 30.0)]);

        assert_eq!(pixel(&board, 60, 70), RgbColor::black());
        // Earlier preview radius (10) was rolled back, final radius is 20.
        assert_eq!(pixel(&board, 70, 30), RgbColor::white());
        assert_eq!(pixel(&board, 80, 30), RgbColor::black());
    }

    #[test]
    fn test_zero_size_shape_commits_once() {
        let mut board = board();
        board.set_tool(ToolKind::Rectangle);
        drag(&mut board, &[(40.0, 40.0)]);
        assert_eq!(board.history().unwrap().len(), 2);
        assert_eq!(board.history().unwrap().cursor(), 1);
    }

    #[test]
    fn test_pen_click_without_move_commits() {
        let mut board = board();
        let blank = snapshot(&board);
        drag(&mut board, &[(40.0, 40.0)]);
        assert_eq!(board.history().unwrap().len(), 2);
        assert_eq!(snapshot(&board), blank);
    }

    #[test]
    fn test_select_never_commits() {
        let mut board = board();
        board.set_tool(ToolKind::Select);
        drag(&mut board, &[(10.0, 10.0), (60.0, 60.0)]);
        assert_eq!(board.history().unwrap().len(), 1);
        assert!(!board.is_drawing());
    }

    #[test]
    fn test_style_change_mid_gesture_keeps_drawn_pixels() {
        let mut board = board();
        board.pointer_down(Point::new(10.0, 20.0)).unwrap();
        board.pointer_move(Point::new(50.0, 20.0)).unwrap();

        board.set_color(RgbColor::new(255, 0, 0));
        board.set_brush_width(6);
        board.pointer_move(Point::new(50.0, 60.0)).unwrap();
        board.pointer_up(&mut NoText).unwrap();

        // First segment keeps its black 2px stroke.
        assert_eq!(pixel(&board, 30, 20), RgbColor::black());
        assert_eq!(pixel(&board, 30, 22), RgbColor::white());
        // Second segment uses the new style.
        assert_eq!(pixel(&board, 50, 40), RgbColor::new(255, 0, 0));
        assert_eq!(pixel(&board, 52, 40), RgbColor::new(255, 0, 0));
        assert_eq!(board.history().unwrap().len(), 2);
    }

    #[test]
    fn test_eraser_restores_background() {
        let mut board = board();
        board.set_brush_width(4);
        drag(&mut board, &[(10.0, 40.0), (100.0, 40.0)]);
        assert_eq!(pixel(&board, 50, 40), RgbColor::black());

        board.set_tool(ToolKind::Eraser);
        board.set_brush_width(2);
        // Double width (4) covers the 4px pen line.
        drag(&mut board, &[(10.0, 40.0), (100.0, 40.0)]);
        assert_eq!(pixel(&board, 50, 40), RgbColor::white());
        assert_eq!(pixel(&board, 50, 38), RgbColor::white());
        assert_eq!(board.history().unwrap().len(), 3);
    }

    #[test]
    fn test_text_tool_renders_and_commits() {
        let mut board = board();
        board.set_tool(ToolKind::Text);
        board.set_color(RgbColor::new(255, 0, 0));
        board.set_brush_width(1);

        board.pointer_down(Point::new(10.0, 40.0)).unwrap();
        let mut asked_at = None;
        board
            .pointer_up(&mut |anchor: Point| {
                asked_at = Some(anchor);
                Some("HI".to_string())
            })
            .unwrap();

        assert_eq!(asked_at, Some(Point::new(10.0, 40.0)));
        assert_eq!(board.history().unwrap().len(), 2);
        // 10px font: 'H' left stem occupies x 10..11 from y 30 to 40.
        assert_eq!(pixel(&board, 10, 35), RgbColor::new(255, 0, 0));
    }

    #[test]
    fn test_empty_text_cancels() {
        let mut board = board();
        board.set_tool(ToolKind::Text);
        let blank = snapshot(&board);

        board.pointer_down(Point::new(10.0, 40.0)).unwrap();
        board.pointer_up(&mut |_: Point| Some(String::new())).unwrap();
        board.pointer_down(Point::new(10.0, 40.0)).unwrap();
        board.pointer_up(&mut NoText).unwrap();

        assert_eq!(board.history().unwrap().len(), 1);
        assert_eq!(snapshot(&board), blank);
        assert!(!board.is_drawing());
    }

    #[test]
    fn test_leave_finalizes_gesture() {
        let mut board = board();
        board.pointer_down(Point::new(10.0, 10.0)).unwrap();
        board.pointer_move(Point::new(40.0, 10.0)).unwrap();
        board
            .handle_pointer_event(
                PointerEvent::Leave {
                    position: Point::new(200.0, 10.0),
                },
                &mut NoText,
            )
            .unwrap();

        assert!(!board.is_drawing());
        assert_eq!(board.history().unwrap().len(), 2);
        assert_eq!(pixel(&board, 25, 10), RgbColor::black());
    }

    #[test]
    fn test_second_pointer_down_is_ignored() {
        let mut board = board();
        board.pointer_down(Point::new(10.0, 10.0)).unwrap();
        board.pointer_down(Point::new(90.0, 70.0)).unwrap();
        board.pointer_move(Point::new(30.0, 10.0)).unwrap();
        board.pointer_up(&mut NoText).unwrap();

        assert_eq!(pixel(&board, 20, 10), RgbColor::black());
        assert_eq!(board.history().unwrap().len(), 2);
    }

    #[test]
    fn test_pen_circle_undo_redo_scenario() {
        let mut board = board();
        let s0 = snapshot(&board);

        drag(&mut board, &[(10.0, 10.0), (40.0, 10.0), (40.0, 30.0)]);
        let s1 = snapshot(&board);
        assert_eq!(board.history().unwrap().len(), 2);

        board.set_tool(ToolKind::Circle);
        drag(&mut board, &[(80.0, 40.0), (95.0, 40.0)]);
        assert_eq!(board.history().unwrap().len(), 3);
        assert_eq!(board.history().unwrap().cursor(), 2);

        board.undo().unwrap();
        board.undo().unwrap();
        assert_eq!(board.history().unwrap().cursor(), 0);
        assert_eq!(snapshot(&board), s0);

        board.redo().unwrap();
        assert_eq!(board.history().unwrap().cursor(), 1);
        assert_eq!(snapshot(&board), s1);
        assert_eq!(pixel(&board, 95, 40), RgbColor::white());
    }

    #[test]
    fn test_export_leaves_history_untouched() {
        let mut board = board();
        drag(&mut board, &[(10.0, 10.0), (50.0, 10.0)]);
        let before = snapshot(&board);

        let bytes = board.export_png().unwrap();
        assert!(bytes.starts_with(b"\x89PNG"));
        assert_eq!(board.history().unwrap().len(), 2);
        assert_eq!(board.history().unwrap().cursor(), 1);
        assert_eq!(snapshot(&board), before);
    }

    #[test]
    fn test_export_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();

        let board = board();
        assert!(matches!(
            board.export_to_dir(&blocker),
            Err(BoardError::ExportFailed(ExportError::Io(_)))
        ));
        assert_eq!(board.history().unwrap().len(), 1);
    }

    #[test]
    fn test_peer_cursor_does_not_touch_surface() {
        let mut board = board();
        let blank = snapshot(&board);
        board.on_peer_cursor("alice", Point::new(5.0, 5.0), None);

        assert_eq!(board.overlay().peers().len(), 1);
        assert_eq!(snapshot(&board), blank);
        assert_eq!(board.history().unwrap().len(), 1);
    }

    #[test]
    fn test_reinitialize_resets_session() {
        let mut board = board();
        drag(&mut board, &[(10.0, 10.0), (50.0, 10.0)]);
        board.pointer_down(Point::new(1.0, 1.0)).unwrap();

        board.initialize().unwrap();
        assert!(!board.is_drawing());
        assert_eq!(board.history().unwrap().len(), 1);
    }
}

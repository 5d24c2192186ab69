//! Inkboard Core Library
//!
//! Platform-agnostic drawing surface, tool state machine and snapshot
//! history for the Inkboard whiteboard.

pub mod board;
pub mod collaboration;
pub mod export;
pub mod history;
pub mod input;
pub mod style;
pub mod surface;
pub mod tools;

pub use board::{BoardConfig, BoardError, BoardResult, HistoryNotice, NoText, TextPrompt, Whiteboard};
pub use collaboration::{CollaborationOverlay, Collaborator, PeerCursor, PresenceUpdate};
pub use export::{EXPORT_FILE_NAME, ExportError};
pub use history::History;
pub use input::{PointerEvent, PointerKind};
pub use style::{PALETTE, RgbColor, Style};
pub use surface::{DrawOp, Paint, RasterSurface, Snapshot, SurfaceError};
pub use tools::{ToolAction, ToolKind, ToolManager, ToolState};

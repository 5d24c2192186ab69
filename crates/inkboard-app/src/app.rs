//! Application state: configuration, command line and script replay.

use clap::Parser;
use inkboard_core::{
    BoardConfig, BoardError, HistoryNotice, PointerEvent, PointerKind, RgbColor, Style,
    TextPrompt, ToolKind, Whiteboard,
};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::prompt::{ScriptedPrompt, StdinPrompt};
use crate::script::{Script, ScriptStep};

/// Command-line arguments.
#[derive(Parser, Debug, Default)]
#[command(name = "inkboard")]
#[command(about = "Replay whiteboard gestures and export the board as PNG")]
#[command(version)]
pub struct Cli {
    /// JSON configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// JSON gesture script to replay
    #[arg(short, long, value_name = "FILE")]
    pub script: Option<PathBuf>,

    /// Directory that receives whiteboard.png
    #[arg(short, long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Read text-tool input from stdin instead of the script's answers
    #[arg(short, long)]
    pub interactive: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid configuration {path}: {message}")]
    Config { path: PathBuf, message: String },
    #[error("Invalid script {path}: {message}")]
    Script { path: PathBuf, message: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Board(#[from] BoardError),
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub title: String,
    pub board: BoardConfig,
    /// Tool selected at startup.
    pub tool: ToolKind,
    pub style: Style,
    pub output_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Inkboard".to_string(),
            board: BoardConfig::default(),
            tool: ToolKind::default(),
            style: Style::default(),
            output_dir: PathBuf::from("."),
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| AppError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self, AppError> {
        match path {
            Some(path) => {
                let config = Self::load(path)?;
                log::info!("Loaded configuration from {:?}", path);
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    /// Override the output directory when one is given.
    pub fn with_output_dir(mut self, dir: Option<PathBuf>) -> Self {
        if let Some(dir) = dir {
            self.output_dir = dir;
        }
        self
    }
}

/// What a run produced.
#[derive(Debug, Default)]
pub struct RunReport {
    pub notices: Vec<HistoryNotice>,
    pub exports: Vec<PathBuf>,
}

/// Main application struct.
pub struct App {
    config: AppConfig,
    board: Whiteboard,
}

impl App {
    pub fn new() -> Result<Self, AppError> {
        Self::with_config(AppConfig::default())
    }

    pub fn with_config(config: AppConfig) -> Result<Self, AppError> {
        let mut board = Whiteboard::ready(config.board.clone())?;
        board.set_tool(config.tool);
        board.set_style(config.style);
        Ok(Self { config, board })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn board(&self) -> &Whiteboard {
        &self.board
    }

    /// Replay the script named on the command line, or just export the
    /// blank board when there is none.
    pub fn run(&mut self, cli: &Cli) -> Result<RunReport, AppError> {
        let Some(path) = cli.script.as_deref() else {
            let mut report = RunReport::default();
            self.export(&mut report)?;
            return Ok(report);
        };

        let script = load_script(path)?;
        if cli.interactive {
            self.run_script(&script, Some(&mut StdinPrompt::new()))
        } else {
            self.run_script(&script, None)
        }
    }

    /// Replay `script` against the board.
    ///
    /// Text prompts are answered by `answer` steps queued so far, or by
    /// `interactive` when given. A script without an `export` step is
    /// exported once at the end.
    pub fn run_script(
        &mut self,
        script: &Script,
        interactive: Option<&mut dyn TextPrompt>,
    ) -> Result<RunReport, AppError> {
        let mut report = RunReport::default();
        let mut prompt = ReplayPrompt {
            scripted: ScriptedPrompt::new(),
            interactive,
        };

        for step in &script.steps {
            match step {
                ScriptStep::Tool { tool } => self.board.set_tool(*tool),
                ScriptStep::Color { color } => match RgbColor::from_hex(color) {
                    Some(color) => self.board.set_color(color),
                    None => log::warn!("Ignoring invalid color {:?}", color),
                },
                ScriptStep::BrushWidth { width } => self.board.set_brush_width(*width),
                ScriptStep::Down { x, y } => {
                    self.pointer(PointerKind::Down, *x, *y, script.origin, &mut prompt)?
                }
                ScriptStep::Move { x, y } => {
                    self.pointer(PointerKind::Move, *x, *y, script.origin, &mut prompt)?
                }
                ScriptStep::Up => {
                    self.board.pointer_up(&mut prompt)?;
                }
                ScriptStep::Leave => {
                    self.board.pointer_leave(&mut prompt)?;
                }
                ScriptStep::Answer { text } => prompt.scripted.push(text.clone()),
                ScriptStep::Undo => report.notices.push(self.board.undo()?),
                ScriptStep::Redo => report.notices.push(self.board.redo()?),
                ScriptStep::PeerCursor {
                    user_id,
                    x,
                    y,
                    color,
                } => {
                    let hint = color.as_deref().and_then(RgbColor::from_hex);
                    self.board.on_peer_cursor(user_id, Point::new(*x, *y), hint);
                }
                ScriptStep::Tick => self.board.overlay_mut().begin_tick(),
                ScriptStep::Export => self.export(&mut report)?,
            }
        }

        if !script.steps.iter().any(|s| matches!(s, ScriptStep::Export)) {
            self.export(&mut report)?;
        }
        Ok(report)
    }

    fn pointer(
        &mut self,
        kind: PointerKind,
        x: f64,
        y: f64,
        origin: Point,
        prompt: &mut dyn TextPrompt,
    ) -> Result<(), AppError> {
        let event = PointerEvent::from_device(kind, Point::new(x, y), origin);
        Ok(self.board.handle_pointer_event(event, prompt)?)
    }

    fn export(&self, report: &mut RunReport) -> Result<(), AppError> {
        let path = self.board.export_to_dir(&self.config.output_dir)?;
        report.exports.push(path);
        Ok(())
    }
}

fn load_script(path: &Path) -> Result<Script, AppError> {
    let content = std::fs::read_to_string(path)?;
    let script = Script::from_json(&content).map_err(|e| AppError::Script {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    log::info!("Loaded {} script steps from {:?}", script.steps.len(), path);
    Ok(script)
}

/// Scripted answers first, then the interactive prompt if any.
struct ReplayPrompt<'a> {
    scripted: ScriptedPrompt,
    interactive: Option<&'a mut dyn TextPrompt>,
}

impl TextPrompt for ReplayPrompt<'_> {
    fn request_text(&mut self, anchor: Point) -> Option<String> {
        match self.interactive.as_deref_mut() {
            Some(prompt) if self.scripted.pending() == 0 => prompt.request_text(anchor),
            _ => self.scripted.request_text(anchor),
        }
    }
}

//! Inkboard Application
//!
//! Command-line shell around the whiteboard core: loads configuration,
//! replays gesture scripts, answers text prompts and exports PNG.

mod app;
mod prompt;
mod script;

pub use app::{App, AppConfig, AppError, Cli, RunReport};
pub use prompt::{ScriptedPrompt, StdinPrompt};
pub use script::{Script, ScriptStep};

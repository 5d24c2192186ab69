//! Text prompts for the text tool.

use inkboard_core::TextPrompt;
use kurbo::Point;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// Answers prompts from a queue of scripted replies. An empty queue cancels.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPrompt {
    replies: VecDeque<String>,
}

impl ScriptedPrompt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, reply: impl Into<String>) {
        self.replies.push_back(reply.into());
    }

    pub fn pending(&self) -> usize {
        self.replies.len()
    }
}

impl TextPrompt for ScriptedPrompt {
    fn request_text(&mut self, anchor: Point) -> Option<String> {
        let reply = self.replies.pop_front();
        if reply.is_none() {
            log::warn!("No scripted text for prompt at {:?}; cancelling", anchor);
        }
        reply
    }
}

/// Reads one line from a reader for each prompt (stdin by default).
/// End of input or a read error cancels.
pub struct StdinPrompt<R = io::StdinLock<'static>> {
    reader: R,
}

impl StdinPrompt {
    pub fn new() -> Self {
        Self {
            reader: io::stdin().lock(),
        }
    }
}

impl Default for StdinPrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: BufRead> StdinPrompt<R> {
    pub fn from_reader(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> TextPrompt for StdinPrompt<R> {
    fn request_text(&mut self, anchor: Point) -> Option<String> {
        print!("Enter text at ({:.0}, {:.0}): ", anchor.x, anchor.y);
        if let Err(e) = io::stdout().flush() {
            log::warn!("Failed to flush text prompt: {}", e);
        }

        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
            Err(e) => {
                log::error!("Failed to read text input: {}", e);
                None
            }
        }
    }
}

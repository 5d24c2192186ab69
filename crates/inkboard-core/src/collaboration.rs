//! Collaboration overlay for peer cursors.
//!
//! Peers are driven by an external presence channel. The overlay only keeps
//! transient markers for rendering; it never touches the surface or history,
//! and nothing is sent back out (single-writer mode).

use crate::style::RgbColor;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Cursor color used when a presence update carries no usable color.
const FALLBACK_CURSOR_COLOR: RgbColor = RgbColor::new(0x80, 0x80, 0x80);

/// One update from the presence channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceUpdate {
    pub user_id: String,
    /// Hex color hint (`#rrggbb`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_color: Option<String>,
    pub cursor_position: CursorPosition,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CursorPosition {
    pub x: f64,
    pub y: f64,
}

/// Overlay marker for a remote user's cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct PeerCursor {
    pub user_id: String,
    pub position: Point,
    pub color: RgbColor,
    /// Tick of the most recent update.
    pub tick: u64,
}

/// A participant in the session, as shown in the collaborator list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collaborator {
    pub name: String,
    pub color: RgbColor,
    pub active: bool,
}

impl Collaborator {
    pub fn new(name: impl Into<String>, color: RgbColor, active: bool) -> Self {
        Self {
            name: name.into(),
            color,
            active,
        }
    }

    /// Badge initials: first letter of up to two words, uppercased.
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .take(2)
            .flat_map(char::to_uppercase)
            .collect()
    }
}

/// Transient peer-cursor markers keyed by user id.
#[derive(Debug, Clone, Default)]
pub struct CollaborationOverlay {
    peers: HashMap<String, PeerCursor>,
    collaborators: Vec<Collaborator>,
    tick: u64,
    /// Updates that replaced an earlier update from the same user in the same tick.
    coalesced: u64,
}

impl CollaborationOverlay {
    /// Create an empty overlay.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inbound hook: move (or create) a peer's cursor marker.
    pub fn on_peer_cursor(&mut self, user_id: &str, point: Point, color_hint: Option<RgbColor>) {
        let tick = self.tick;
        match self.peers.get_mut(user_id) {
            Some(peer) => {
                if peer.tick == tick {
                    self.coalesced += 1;
                    log::debug!("Coalesced cursor update for {} in tick {}", user_id, tick);
                }
                peer.position = point;
                peer.tick = tick;
                if let Some(color) = color_hint {
                    peer.color = color;
                }
            }
            None => {
                log::debug!("Peer cursor appeared: {}", user_id);
                self.peers.insert(
                    user_id.to_string(),
                    PeerCursor {
                        user_id: user_id.to_string(),
                        position: point,
                        color: color_hint.unwrap_or(FALLBACK_CURSOR_COLOR),
                        tick,
                    },
                );
            }
        }
    }

    /// Apply a decoded presence update.
    pub fn apply_update(&mut self, update: &PresenceUpdate) {
        let color = update.display_color.as_deref().and_then(RgbColor::from_hex);
        let point = Point::new(update.cursor_position.x, update.cursor_position.y);
        self.on_peer_cursor(&update.user_id, point, color);
    }

    /// Handle a raw JSON presence message. Malformed messages are dropped.
    /// Returns true if the overlay changed.
    pub fn handle_message(&mut self, json: &str) -> bool {
        match serde_json::from_str::<PresenceUpdate>(json) {
            Ok(update) => {
                self.apply_update(&update);
                true
            }
            Err(e) => {
                log::warn!("Dropping malformed presence message: {}", e);
                false
            }
        }
    }

    /// Start a new presence tick.
    pub fn begin_tick(&mut self) {
        self.tick += 1;
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Number of updates that were folded into an earlier one in the same tick.
    pub fn coalesced_updates(&self) -> u64 {
        self.coalesced
    }

    /// Remove a peer's marker (e.g., the peer left).
    pub fn remove_peer(&mut self, user_id: &str) -> Option<PeerCursor> {
        self.peers.remove(user_id)
    }

    pub fn peer(&self, user_id: &str) -> Option<&PeerCursor> {
        self.peers.get(user_id)
    }

    /// Peer markers, sorted by user id for stable rendering.
    pub fn peers(&self) -> Vec<&PeerCursor> {
        let mut peers: Vec<_> = self.peers.values().collect();
        peers.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        peers
    }

    pub fn set_collaborators(&mut self, collaborators: Vec<Collaborator>) {
        self.collaborators = collaborators;
    }

    pub fn collaborators(&self) -> &[Collaborator] {
        &self.collaborators
    }

    /// Number of collaborators currently marked active.
    pub fn active_count(&self) -> usize {
        self.collaborators.iter().filter(|c| c.active).count()
    }

    /// Drop all markers and collaborators.
    pub fn clear(&mut self) {
        self.peers.clear();
        self.collaborators.clear();
    }
}

//! Pointer input in surface-local coordinates.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Pointer event type. Positions are surface-local.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PointerEvent {
    Down { position: Point },
    Move { position: Point },
    Up { position: Point },
    /// The pointer left the surface. Finalizes a gesture like `Up`.
    Leave { position: Point },
}

impl PointerEvent {
    pub fn position(&self) -> Point {
        match *self {
            PointerEvent::Down { position }
            | PointerEvent::Move { position }
            | PointerEvent::Up { position }
            | PointerEvent::Leave { position } => position,
        }
    }

    /// Build an event from a device position and the surface's origin.
    pub fn from_device(kind: PointerKind, device: Point, surface_origin: Point) -> Self {
        let position = to_surface_local(device, surface_origin);
        match kind {
            PointerKind::Down => PointerEvent::Down { position },
            PointerKind::Move => PointerEvent::Move { position },
            PointerKind::Up => PointerEvent::Up { position },
            PointerKind::Leave => PointerEvent::Leave { position },
        }
    }
}

/// Discriminant of a [`PointerEvent`], for building events from device input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Down,
    Move,
    Up,
    Leave,
}

/// Convert a device position to surface-local coordinates.
pub fn to_surface_local(device: Point, surface_origin: Point) -> Point {
    (device - surface_origin).to_point()
}

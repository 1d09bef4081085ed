use serde::{Deserialize, Serialize};

use super::SWIPE_THRESHOLD;

/// Heading on the Snake grid. `Up` decreases `y`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Grid offset of one step in this direction.
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// Player input, normalized across keyboard, touch and pointer sources.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "intent", content = "value", rename_all = "snake_case")]
pub enum Intent {
    Steer(Direction),
    Jump,
    /// Toggle pause (Snake only)
    Pause,
    /// Reveal the card at the given index (Memory only)
    Flip(usize),
    /// Release the ball (Plinko only)
    Drop,
}

/// Map a `KeyboardEvent.key` (or `code`) value to an intent.
pub fn intent_for_key(key: &str) -> Option<Intent> {
    match key {
        "ArrowUp" => Some(Intent::Steer(Direction::Up)),
        "ArrowDown" => Some(Intent::Steer(Direction::Down)),
        "ArrowLeft" => Some(Intent::Steer(Direction::Left)),
        "ArrowRight" => Some(Intent::Steer(Direction::Right)),
        " " | "Space" => Some(Intent::Jump),
        "Escape" => Some(Intent::Pause),
        _ => None,
    }
}

/// Interpret a touch gesture from its start and end deltas.
///
/// Only the dominant axis counts, and it must exceed [SWIPE_THRESHOLD].
pub fn swipe_intent(dx: f64, dy: f64) -> Option<Intent> {
    if !dx.is_finite() || !dy.is_finite() {
        return None;
    }
    let direction = if dx.abs() > dy.abs() {
        if dx.abs() <= SWIPE_THRESHOLD {
            return None;
        }
        if dx > 0.0 {
            Direction::Right
        } else {
            Direction::Left
        }
    } else {
        if dy.abs() <= SWIPE_THRESHOLD {
            return None;
        }
        if dy > 0.0 {
            Direction::Down
        } else {
            Direction::Up
        }
    };
    Some(Intent::Steer(direction))
}

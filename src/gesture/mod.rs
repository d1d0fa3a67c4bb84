//! Swipe gestures and the decisions they produce.

mod animation;
mod engine;

pub use animation::{Spring, Timing};
pub use engine::GestureEngine;

use crate::state::Market;

/// Which way a card left the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Up,
}

impl Direction {
    /// The decision this direction stands for.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Right => "YES",
            Self::Left => "NO",
            Self::Up => "SKIP",
        }
    }
}

/// A point or displacement in screen pixels. `y` grows downwards.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Offset {
    pub x: f64,
    pub y: f64,
}

impl Offset {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Screen size in pixels, used for rotation and off-screen targets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 400.0,
            height: 800.0,
        }
    }
}

/// A resolved swipe, carrying the card that was on top when it began.
#[derive(Debug, Clone, PartialEq)]
pub enum SwipeOutcome {
    Right(Market),
    Left(Market),
    Up(Market),
}

impl SwipeOutcome {
    pub fn new(direction: Direction, market: Market) -> Self {
        match direction {
            Direction::Right => Self::Right(market),
            Direction::Left => Self::Left(market),
            Direction::Up => Self::Up(market),
        }
    }

    pub fn direction(&self) -> Direction {
        match self {
            Self::Right(_) => Direction::Right,
            Self::Left(_) => Direction::Left,
            Self::Up(_) => Direction::Up,
        }
    }

    pub fn market(&self) -> &Market {
        match self {
            Self::Right(m) | Self::Left(m) | Self::Up(m) => m,
        }
    }
}

/// Coarse gesture state, as seen by renderers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GesturePhase {
    #[default]
    Idle,
    Dragging,
    Committing(Direction),
    SpringingBack,
}

/// Everything a renderer needs to draw the top card for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureSnapshot {
    pub phase: GesturePhase,
    pub offset: Offset,
    /// Card tilt in degrees; positive leans right.
    pub rotation_deg: f64,
    /// Commit animation progress in `[0, 1]`; zero outside a commit.
    pub progress: f64,
    pub yes_opacity: f64,
    pub no_opacity: f64,
    pub skip_opacity: f64,
    /// Scale of the card peeking behind the top one.
    pub next_card_scale: f64,
}

impl Default for GestureSnapshot {
    fn default() -> Self {
        Self {
            phase: GesturePhase::Idle,
            offset: Offset::ZERO,
            rotation_deg: 0.0,
            progress: 0.0,
            yes_opacity: 0.0,
            no_opacity: 0.0,
            skip_opacity: 0.0,
            next_card_scale: 0.95,
        }
    }
}

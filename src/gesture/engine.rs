//! Pointer-driven state machine for the top card.

use super::animation::{Spring, Timing};
use super::{Direction, GesturePhase, GestureSnapshot, Offset, SwipeOutcome, Viewport};
use crate::config::GestureConfig;
use crate::state::Market;
use std::time::{Duration, Instant};
use tracing::debug;

/// Label opacity reaches 1 at this many pixels of travel.
const LABEL_RANGE: f64 = 50.0;
const NEXT_CARD_MIN_SCALE: f64 = 0.95;

#[derive(Debug, Clone)]
enum Phase {
    Idle,
    Dragging {
        /// Pointer position when the drag started.
        origin: Offset,
    },
    Committing {
        direction: Direction,
        market: Market,
        x: Timing,
        y: Timing,
    },
    SpringingBack {
        x: Spring,
        y: Spring,
    },
}

/// Tracks one card at a time from pointer-down to a decision.
///
/// Time is always passed in, so the engine never reads the clock.
#[derive(Debug, Clone)]
pub struct GestureEngine {
    phase: Phase,
    offset: Offset,
    viewport: Viewport,
    threshold: f64,
    swipe_out: Duration,
    tension: f64,
    friction: f64,
    max_rotation_deg: f64,
}

impl GestureEngine {
    pub fn new(config: &GestureConfig) -> Self {
        Self {
            phase: Phase::Idle,
            offset: Offset::ZERO,
            viewport: Viewport::default(),
            threshold: config.swipe_threshold,
            swipe_out: config.swipe_out_duration(),
            tension: config.spring_tension,
            friction: config.spring_friction,
            max_rotation_deg: config.max_rotation_deg,
        }
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn phase(&self) -> GesturePhase {
        match &self.phase {
            Phase::Idle => GesturePhase::Idle,
            Phase::Dragging { .. } => GesturePhase::Dragging,
            Phase::Committing { direction, .. } => GesturePhase::Committing(*direction),
            Phase::SpringingBack { .. } => GesturePhase::SpringingBack,
        }
    }

    /// An animation is running and [`tick`](Self::tick) should be called.
    pub fn is_animating(&self) -> bool {
        matches!(
            self.phase,
            Phase::Committing { .. } | Phase::SpringingBack { .. }
        )
    }

    /// Start a drag at `at`. Ignored mid-commit or with no card on top.
    pub fn pointer_down(&mut self, at: Offset, top: Option<&Market>) -> bool {
        if top.is_none() || matches!(self.phase, Phase::Committing { .. }) {
            return false;
        }

        // Grabbing a card that is still springing back continues from where it is.
        let origin = Offset::new(at.x - self.offset.x, at.y - self.offset.y);
        self.phase = Phase::Dragging { origin };
        true
    }

    /// Track the pointer 1:1 while dragging.
    pub fn pointer_move(&mut self, at: Offset) {
        if let Phase::Dragging { origin } = self.phase {
            self.offset = Offset::new(at.x - origin.x, at.y - origin.y);
        }
    }

    /// Release the card: commit past the threshold, spring back otherwise.
    pub fn pointer_up(&mut self, top: Option<&Market>, now: Instant) {
        if !matches!(self.phase, Phase::Dragging { .. }) {
            return;
        }

        let Offset { x: dx, y: dy } = self.offset;
        let direction = if dx > self.threshold {
            Some(Direction::Right)
        } else if dx < -self.threshold {
            Some(Direction::Left)
        } else if dy < -self.threshold {
            Some(Direction::Up)
        } else {
            None
        };

        match (direction, top) {
            (Some(direction), Some(market)) => self.start_commit(direction, market.clone(), now),
            _ => self.start_spring_back(now),
        }
    }

    /// Commit without a drag, e.g. from a key press.
    pub fn commit(&mut self, direction: Direction, top: Option<&Market>, now: Instant) -> bool {
        let Some(market) = top else {
            return false;
        };
        if matches!(
            self.phase,
            Phase::Committing { .. } | Phase::Dragging { .. }
        ) {
            return false;
        }

        self.start_commit(direction, market.clone(), now);
        true
    }

    /// Let go of a drag in progress, leaving the card where it rests.
    ///
    /// Animations keep running. Returns whether a drag was dropped.
    pub fn cancel_drag(&mut self) -> bool {
        if !matches!(self.phase, Phase::Dragging { .. }) {
            return false;
        }
        self.reset();
        true
    }

    /// Drop any in-flight gesture without producing an outcome.
    pub fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.offset = Offset::ZERO;
    }

    /// Advance animations to `now`. Yields the outcome once a commit lands.
    pub fn tick(&mut self, now: Instant) -> Option<SwipeOutcome> {
        match &mut self.phase {
            Phase::Idle | Phase::Dragging { .. } => None,
            Phase::SpringingBack { x, y } => {
                x.advance(now);
                y.advance(now);
                self.offset = Offset::new(x.position(), y.position());
                if x.is_at_rest() && y.is_at_rest() {
                    self.reset();
                }
                None
            }
            Phase::Committing { x, y, .. } => {
                self.offset = Offset::new(x.value(now), y.value(now));
                if !x.is_finished(now) {
                    return None;
                }

                let Phase::Committing {
                    direction, market, ..
                } = std::mem::replace(&mut self.phase, Phase::Idle)
                else {
                    return None;
                };
                self.offset = Offset::ZERO;
                debug!(?direction, market_id = %market.id, "Swipe committed");
                Some(SwipeOutcome::new(direction, market))
            }
        }
    }

    /// Current rendering state.
    pub fn poll_state(&self, now: Instant) -> GestureSnapshot {
        let Offset { x, y } = self.offset;
        let progress = match &self.phase {
            Phase::Committing { x, .. } => x.progress(now),
            _ => 0.0,
        };

        GestureSnapshot {
            phase: self.phase(),
            offset: self.offset,
            rotation_deg: self.rotation_deg(),
            progress,
            yes_opacity: (x / LABEL_RANGE).clamp(0.0, 1.0),
            no_opacity: (-x / LABEL_RANGE).clamp(0.0, 1.0),
            skip_opacity: (-y / LABEL_RANGE).clamp(0.0, 1.0),
            next_card_scale: NEXT_CARD_MIN_SCALE
                + (1.0 - NEXT_CARD_MIN_SCALE) * (x.abs() / self.viewport.width).min(1.0),
        }
    }

    /// Linear in `dx`, not clamped past half a screen.
    fn rotation_deg(&self) -> f64 {
        let half = self.viewport.width / 2.0;
        if half <= 0.0 {
            return 0.0;
        }
        self.offset.x / half * self.max_rotation_deg
    }

    fn start_commit(&mut self, direction: Direction, market: Market, now: Instant) {
        let target = match direction {
            Direction::Right => Offset::new(self.viewport.width, 0.0),
            Direction::Left => Offset::new(-self.viewport.width, 0.0),
            Direction::Up => Offset::new(0.0, -self.viewport.height),
        };

        debug!(?direction, market_id = %market.id, "Swiping out");
        self.phase = Phase::Committing {
            direction,
            market,
            x: Timing::new(self.offset.x, target.x, now, self.swipe_out),
            y: Timing::new(self.offset.y, target.y, now, self.swipe_out),
        };
    }

    fn start_spring_back(&mut self, now: Instant) {
        self.phase = Phase::SpringingBack {
            x: Spring::new(self.offset.x, self.tension, self.friction, now),
            y: Spring::new(self.offset.y, self.tension, self.friction, now),
        };
    }
}

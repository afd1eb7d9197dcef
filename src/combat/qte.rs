//! Block minigame: a cursor sweeps back and forth across a bar and the
//! player has to stop it inside a target zone.

use crate::core::constants::{
    FRAME_MS, QTE_CURSOR_MAX, QTE_CURSOR_MIN, QTE_TARGET_MAX_START, QTE_TARGET_MIN_START,
    QTE_TARGET_WIDTH,
};
use rand::Rng;

#[derive(Debug, Clone, PartialEq)]
pub struct QteState {
    /// Cursor position in percent of the bar, within [0, 98]
    pub position: f64,
    /// +1.0 moving right, -1.0 moving left
    pub direction: f64,
    /// Percent moved per frame
    pub speed: f64,
    /// Left edge of the target zone
    pub target_start: f64,
    /// Time not yet converted into whole frames
    frame_accum_ms: u64,
}

impl QteState {
    pub fn new(speed: f64, target_start: f64) -> Self {
        Self {
            position: QTE_CURSOR_MIN,
            direction: 1.0,
            speed,
            target_start,
            frame_accum_ms: 0,
        }
    }

    /// Starts a run with the target zone at a random offset.
    pub fn start<R: Rng>(speed: f64, rng: &mut R) -> Self {
        let target_start = rng.gen_range(QTE_TARGET_MIN_START..QTE_TARGET_MAX_START) as f64;
        Self::new(speed, target_start)
    }

    pub fn target_end(&self) -> f64 {
        self.target_start + QTE_TARGET_WIDTH
    }

    /// Moves the cursor one frame, bouncing off either end of the bar.
    pub fn advance_frame(&mut self) {
        self.position += self.speed * self.direction;

        if self.position >= QTE_CURSOR_MAX {
            self.position = QTE_CURSOR_MAX;
            self.direction = -1.0;
        } else if self.position <= QTE_CURSOR_MIN {
            self.position = QTE_CURSOR_MIN;
            self.direction = 1.0;
        }
    }

    /// Feeds elapsed time in; moves one step per full frame.
    pub fn advance(&mut self, delta_ms: u64) {
        self.frame_accum_ms += delta_ms;
        while self.frame_accum_ms >= FRAME_MS {
            self.frame_accum_ms -= FRAME_MS;
            self.advance_frame();
        }
    }

    /// Whether stopping now blocks the attack (zone edges count as inside).
    pub fn is_hit(&self) -> bool {
        self.position >= self.target_start && self.position <= self.target_end()
    }
}

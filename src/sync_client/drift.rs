use crate::domain::entities::{PlaybackState, MAX_PLAYBACK_RATE, MIN_PLAYBACK_RATE};

/// Drift below this is left alone
pub const SOFT_TOLERANCE_SECS: f64 = 0.5;
/// Drift above this forces a seek unless the caller picks another bound
pub const DEFAULT_HARD_TOLERANCE_SECS: f64 = 2.0;
/// Relative speed-up or slow-down used for gradual correction
pub const DEFAULT_NUDGE: f64 = 0.1;

/// What a client player should do to converge on the server clock
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Correction {
    /// Within soft tolerance; play at the room rate
    InSync { rate: f64 },
    /// Temporarily play at `rate` until back within tolerance
    Nudge { rate: f64 },
    /// Jump straight to the server position
    Seek { to: f64 },
}

/// Client-side drift policy. The server is authoritative: corrections only
/// ever move the local player toward the server's position.
#[derive(Debug, Clone, Copy)]
pub struct DriftCorrector {
    soft_tolerance: f64,
    hard_tolerance: f64,
    nudge: f64,
}

impl Default for DriftCorrector {
    fn default() -> Self {
        Self {
            soft_tolerance: SOFT_TOLERANCE_SECS,
            hard_tolerance: DEFAULT_HARD_TOLERANCE_SECS,
            nudge: DEFAULT_NUDGE,
        }
    }
}

impl DriftCorrector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hard tolerance never drops below the soft one
    pub fn with_hard_tolerance(mut self, seconds: f64) -> Self {
        self.hard_tolerance = seconds.max(self.soft_tolerance);
        self
    }

    pub fn with_nudge(mut self, nudge: f64) -> Self {
        self.nudge = nudge.abs();
        self
    }

    pub fn hard_tolerance(&self) -> f64 {
        self.hard_tolerance
    }

    /// Compare the local player position with the server's projected position
    pub fn evaluate(&self, local_position: f64, server_position: f64, room_rate: f64) -> Correction {
        let drift = server_position - local_position;

        if drift.abs() > self.hard_tolerance {
            return Correction::Seek {
                to: server_position.max(0.0),
            };
        }
        if drift.abs() <= self.soft_tolerance {
            return Correction::InSync { rate: room_rate };
        }

        // Behind the server: speed up. Ahead: slow down.
        let factor = if drift > 0.0 {
            1.0 + self.nudge
        } else {
            1.0 - self.nudge
        };
        Correction::Nudge {
            rate: (room_rate * factor).clamp(MIN_PLAYBACK_RATE, MAX_PLAYBACK_RATE),
        }
    }

    /// Evaluate against the last received authoritative state
    pub fn evaluate_state(&self, local_position: f64, state: &PlaybackState, now_ms: i64) -> Correction {
        if !state.is_playing {
            // A paused room has one exact position; anything outside soft tolerance is a seek
            let drift = (state.elapsed_seconds - local_position).abs();
            return if drift > self.soft_tolerance {
                Correction::Seek {
                    to: state.elapsed_seconds,
                }
            } else {
                Correction::InSync {
                    rate: state.playback_rate,
                }
            };
        }
        self.evaluate(local_position, state.position_at(now_ms), state.playback_rate)
    }
}

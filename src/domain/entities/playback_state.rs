use serde::{Deserialize, Serialize};

/// Lowest accepted playback rate
pub const MIN_PLAYBACK_RATE: f64 = 0.25;
/// Highest accepted playback rate
pub const MAX_PLAYBACK_RATE: f64 = 2.0;

/// Authoritative "now playing" record for a room.
///
/// `elapsed_seconds` is the position at `updated_at` (Unix millis). While
/// `is_playing` is set the live position keeps advancing with wall-clock time
/// scaled by `playback_rate`; see [`PlaybackState::position_at`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    pub room_id: String,
    pub video_id: Option<String>,
    pub elapsed_seconds: f64,
    pub is_playing: bool,
    pub playback_rate: f64,
    pub updated_at: i64,
}

impl PlaybackState {
    /// Empty state created alongside a room: nothing selected, paused, normal speed
    pub fn new(room_id: String) -> Self {
        Self {
            room_id,
            video_id: None,
            elapsed_seconds: 0.0,
            is_playing: false,
            playback_rate: 1.0,
            updated_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Projected position at `now_ms`
    pub fn position_at(&self, now_ms: i64) -> f64 {
        if !self.is_playing {
            return self.elapsed_seconds;
        }
        let elapsed_ms = (now_ms - self.updated_at).max(0) as f64;
        self.elapsed_seconds + (elapsed_ms / 1000.0) * self.playback_rate
    }

    pub fn play(&mut self, at_time: f64, now_ms: i64) {
        self.elapsed_seconds = at_time;
        self.is_playing = true;
        self.updated_at = now_ms;
    }

    pub fn pause(&mut self, at_time: f64, now_ms: i64) {
        self.elapsed_seconds = at_time;
        self.is_playing = false;
        self.updated_at = now_ms;
    }

    /// Move the clock without touching the playing flag
    pub fn seek(&mut self, at_time: f64, now_ms: i64) {
        self.elapsed_seconds = at_time;
        self.updated_at = now_ms;
    }

    /// Select a new video; the server never assumes autoplay
    pub fn change_video(&mut self, video_id: String, now_ms: i64) {
        self.video_id = Some(video_id);
        self.elapsed_seconds = 0.0;
        self.is_playing = false;
        self.updated_at = now_ms;
    }

    /// Change the rate, folding progress made at the old rate into the clock first
    pub fn set_rate(&mut self, rate: f64, now_ms: i64) {
        self.elapsed_seconds = self.position_at(now_ms);
        self.playback_rate = rate;
        self.updated_at = now_ms;
    }
}

/// Validate a client supplied clock value
pub fn validate_time(at_time: f64) -> Result<(), &'static str> {
    if !at_time.is_finite() || at_time < 0.0 {
        return Err("Time must be a finite, non-negative number of seconds");
    }
    Ok(())
}

/// Validate a client supplied playback rate
pub fn validate_rate(rate: f64) -> Result<(), &'static str> {
    if !rate.is_finite() || !(MIN_PLAYBACK_RATE..=MAX_PLAYBACK_RATE).contains(&rate) {
        return Err("Playback rate must be between 0.25 and 2.0");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_at(ms: i64) -> PlaybackState {
        let mut state = PlaybackState::new("room".into());
        state.updated_at = ms;
        state
    }

    #[test]
    fn test_paused_position_does_not_advance() {
        let state = state_at(1_000);
        assert_eq!(state.position_at(60_000), 0.0);
    }

    #[test]
    fn test_playing_position_advances_with_rate() {
        let mut state = state_at(0);
        state.play(10.0, 1_000);
        assert!((state.position_at(3_000) - 12.0).abs() < 1e-9);

        state.set_rate(2.0, 3_000);
        assert!((state.elapsed_seconds - 12.0).abs() < 1e-9);
        assert!((state.position_at(4_000) - 14.0).abs() < 1e-9);
    }

    #[test]
    fn test_play_and_pause_replace_both_fields() {
        let mut state = state_at(0);
        state.play(42.0, 5);
        assert!(state.is_playing);
        assert_eq!(state.elapsed_seconds, 42.0);
        assert_eq!(state.updated_at, 5);

        state.pause(50.5, 9);
        assert!(!state.is_playing);
        assert_eq!(state.elapsed_seconds, 50.5);
        assert_eq!(state.updated_at, 9);
    }

    #[test]
    fn test_seek_keeps_playing_flag() {
        let mut state = state_at(0);
        state.play(1.0, 1);
        state.seek(90.0, 2);
        assert!(state.is_playing);
        assert_eq!(state.elapsed_seconds, 90.0);
    }

    #[test]
    fn test_change_video_resets_clock_and_pauses() {
        let mut state = state_at(0);
        state.play(30.0, 1);
        state.change_video("dQw4w9WgXcQ".into(), 2);
        assert_eq!(state.video_id.as_deref(), Some("dQw4w9WgXcQ"));
        assert_eq!(state.elapsed_seconds, 0.0);
        assert!(!state.is_playing);
    }

    #[test]
    fn test_validation() {
        assert!(validate_time(0.0).is_ok());
        assert!(validate_time(-0.1).is_err());
        assert!(validate_time(f64::NAN).is_err());
        assert!(validate_rate(1.5).is_ok());
        assert!(validate_rate(0.1).is_err());
        assert!(validate_rate(f64::INFINITY).is_err());
    }
}

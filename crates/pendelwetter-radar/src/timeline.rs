//! The playback timeline over the unified past+forecast frame sequence.
//!
//! Pure state: the engine owns the timer and calls [`Timeline::tick`]; views
//! call the navigation operations. Every index stays within
//! `[0, frame_count)` whenever frames exist.

use chrono::{Local, TimeZone};

use crate::manifest::{RadarFrame, RadarManifest};

/// Relative quick-select offsets in minutes: -30 / now / +30 / +60.
pub const QUICK_SELECT_OFFSETS: [i64; 4] = [-30, 0, 30, 60];

/// Offsets within this many minutes of a quick-select button count as
/// matching it.
pub const QUICK_SELECT_TOLERANCE_MINUTES: i64 = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    frames: Vec<RadarFrame>,
    past_len: usize,
    current: usize,
    playing: bool,
    step_minutes: i64,
}

impl Timeline {
    /// Build the timeline from a freshly fetched manifest.
    ///
    /// The index starts at the most recent past frame (`max(0, past_len-1)`)
    /// and playback starts paused. `step_minutes` is the upstream frame
    /// spacing (10 minutes by convention, not independently verified).
    pub fn from_manifest(manifest: &RadarManifest, step_minutes: i64) -> Self {
        let mut frames = Vec::with_capacity(manifest.frame_count());
        frames.extend(manifest.past.iter().cloned());
        frames.extend(manifest.nowcast.iter().cloned());

        Self {
            past_len: manifest.past.len(),
            current: manifest.past.len().saturating_sub(1),
            playing: false,
            step_minutes: step_minutes.max(1),
            frames,
        }
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn past_len(&self) -> usize {
        self.past_len
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn current_frame(&self) -> Option<&RadarFrame> {
        self.frames.get(self.current)
    }

    pub fn frame(&self, index: usize) -> Option<&RadarFrame> {
        self.frames.get(index)
    }

    /// Advance one frame with wraparound. Only moves while playing.
    pub fn tick(&mut self) {
        if !self.playing || self.frames.is_empty() {
            return;
        }
        self.current = (self.current + 1) % self.frames.len();
    }

    /// Flip play/pause. No effect without frames.
    pub fn toggle_play(&mut self) {
        if self.frames.is_empty() {
            return;
        }
        self.playing = !self.playing;
    }

    /// Stop playback without touching the index. Idempotent.
    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Scrub to an absolute frame index, clamped. Playback state unchanged.
    pub fn scrub(&mut self, index: usize) {
        self.current = index.min(self.frames.len().saturating_sub(1));
    }

    /// Jump to the frame closest to `minutes` from now and pause playback.
    pub fn jump_to_offset(&mut self, minutes: i64) {
        self.pause();
        if self.frames.is_empty() {
            self.current = 0;
            return;
        }

        let target =
            self.past_len as i64 - 1 + minutes.div_euclid(self.step_minutes);
        self.current = target.clamp(0, self.frames.len() as i64 - 1) as usize;
    }

    /// Minutes relative to now for a frame index: positive is forecast,
    /// negative is past.
    pub fn minutes_offset(&self, index: usize) -> i64 {
        (index as i64 - self.past_len as i64 + 1) * self.step_minutes
    }

    pub fn current_minutes_offset(&self) -> i64 {
        self.minutes_offset(self.current)
    }

    /// Whether a frame belongs to the forecast part of the sequence.
    pub fn is_forecast(&self, index: usize) -> bool {
        index >= self.past_len
    }

    /// Whether a quick-select offset matches the current frame, within the
    /// ±5-minute tolerance.
    pub fn quick_select_active(&self, offset_minutes: i64) -> bool {
        (self.current_minutes_offset() - offset_minutes).abs() <= QUICK_SELECT_TOLERANCE_MINUTES
    }

    /// Local-time `HH:MM` label for a frame.
    pub fn frame_label(&self, index: usize) -> Option<String> {
        let frame = self.frames.get(index)?;
        let time = Local.timestamp_opt(frame.time, 0).single()?;
        Some(time.format("%H:%M").to_string())
    }

    /// Textual status for the current frame.
    pub fn status_text(&self) -> String {
        let offset = self.current_minutes_offset();
        if offset.abs() <= QUICK_SELECT_TOLERANCE_MINUTES {
            "aktuelle Daten".to_string()
        } else if offset > 0 {
            format!("Prognose: in {} Min", offset)
        } else {
            format!("vor {} Min", -offset)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest(past: usize, nowcast: usize) -> RadarManifest {
        let base = 1_700_000_000_i64;
        let frame = |i: usize| RadarFrame {
            time: base + i as i64 * 600,
            path: format!("/v2/radar/{}", i),
        };
        RadarManifest {
            past: (0..past).map(frame).collect(),
            nowcast: (past..past + nowcast).map(frame).collect(),
        }
    }

    #[test]
    fn test_initial_index_is_most_recent_past_frame() {
        let t = Timeline::from_manifest(&manifest(6, 4), 10);
        assert_eq!(t.current_index(), 5);
        assert!(!t.is_playing());
    }

    #[test]
    fn test_initial_index_with_empty_past() {
        let t = Timeline::from_manifest(&manifest(0, 4), 10);
        assert_eq!(t.current_index(), 0);
    }

    #[test]
    fn test_three_ticks_wrap_around_three_frames() {
        let mut t = Timeline::from_manifest(&manifest(3, 0), 10);
        t.toggle_play();
        let start = t.current_index();
        t.tick();
        t.tick();
        t.tick();
        assert_eq!(t.current_index(), start);
    }

    #[test]
    fn test_tick_does_nothing_while_paused() {
        let mut t = Timeline::from_manifest(&manifest(3, 2), 10);
        let start = t.current_index();
        t.tick();
        assert_eq!(t.current_index(), start);
    }

    #[test]
    fn test_empty_timeline_operations_are_safe() {
        let mut t = Timeline::from_manifest(&RadarManifest::default(), 10);
        t.toggle_play();
        assert!(!t.is_playing());
        t.tick();
        t.scrub(5);
        assert_eq!(t.current_index(), 0);
        t.jump_to_offset(60);
        assert_eq!(t.current_index(), 0);
        assert!(t.current_frame().is_none());
    }

    #[test]
    fn test_scrub_clamps_and_keeps_playing_flag() {
        let mut t = Timeline::from_manifest(&manifest(4, 2), 10);
        t.toggle_play();
        t.scrub(99);
        assert_eq!(t.current_index(), 5);
        assert!(t.is_playing());
        t.scrub(0);
        assert_eq!(t.current_index(), 0);
    }

    #[test]
    fn test_jump_to_zero_lands_within_now_tolerance() {
        let mut t = Timeline::from_manifest(&manifest(6, 4), 10);
        t.jump_to_offset(0);
        assert!(t.current_minutes_offset().abs() <= 5);
        assert!(t.quick_select_active(0));
    }

    #[test]
    fn test_jump_offsets_map_to_frame_steps() {
        let mut t = Timeline::from_manifest(&manifest(6, 8), 10);
        t.jump_to_offset(30);
        assert_eq!(t.current_index(), 8);
        assert_eq!(t.current_minutes_offset(), 30);

        t.jump_to_offset(-30);
        assert_eq!(t.current_index(), 2);
        assert_eq!(t.current_minutes_offset(), -30);
    }

    #[test]
    fn test_jump_clamps_at_both_boundaries() {
        // 2 past + 2 forecast frames: -30 underflows, +60 overflows.
        let mut t = Timeline::from_manifest(&manifest(2, 2), 10);
        t.jump_to_offset(-30);
        assert_eq!(t.current_index(), 0);
        t.jump_to_offset(60);
        assert_eq!(t.current_index(), 3);
    }

    #[test]
    fn test_pause_keeps_index_and_is_idempotent() {
        let mut t = Timeline::from_manifest(&manifest(3, 2), 10);
        t.toggle_play();
        t.tick();
        let index = t.current_index();
        t.pause();
        assert!(!t.is_playing());
        assert_eq!(t.current_index(), index);
        t.pause();
        assert!(!t.is_playing());
    }

    #[test]
    fn test_jump_forces_pause() {
        let mut t = Timeline::from_manifest(&manifest(6, 4), 10);
        t.toggle_play();
        assert!(t.is_playing());
        t.jump_to_offset(30);
        assert!(!t.is_playing());
    }

    #[test]
    fn test_forecast_boundary() {
        let t = Timeline::from_manifest(&manifest(3, 2), 10);
        assert!(!t.is_forecast(2));
        assert!(t.is_forecast(3));
    }

    #[test]
    fn test_minutes_offset_signs() {
        let t = Timeline::from_manifest(&manifest(3, 2), 10);
        assert_eq!(t.minutes_offset(2), 0);
        assert_eq!(t.minutes_offset(0), -20);
        assert_eq!(t.minutes_offset(4), 20);
    }

    #[test]
    fn test_status_text() {
        let mut t = Timeline::from_manifest(&manifest(3, 3), 10);
        assert_eq!(t.status_text(), "aktuelle Daten");
        t.scrub(0);
        assert_eq!(t.status_text(), "vor 20 Min");
        t.scrub(4);
        assert_eq!(t.status_text(), "Prognose: in 20 Min");
    }

    #[test]
    fn test_frame_label_is_hour_minute() {
        let t = Timeline::from_manifest(&manifest(1, 0), 10);
        let label = t.frame_label(0).unwrap();
        assert_eq!(label.len(), 5);
        assert_eq!(&label[2..3], ":");
    }
}

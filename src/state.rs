// state.rs: State of the track being followed and its lyrics

use crate::lyrics::{LyricsPayload, TrackIdentity};

/// Holds the current track, what was resolved for it, and the last cue shown.
#[derive(Debug, Default)]
pub struct LyricState {
    pub track: Option<TrackIdentity>,
    pub payload: Option<LyricsPayload>,
    /// Index of the last cue emitted for synced lyrics.
    pub index: Option<usize>,
    pub plain_shown: bool,
}

impl LyricState {
    pub fn has_changed(&self, track: &TrackIdentity) -> bool {
        self.track.as_ref() != Some(track)
    }

    /// Drop everything about the previous track.
    pub fn reset(&mut self, track: TrackIdentity) {
        self.track = Some(track);
        self.payload = None;
        self.index = None;
        self.plain_shown = false;
    }

    pub fn update_lyrics(&mut self, payload: Option<LyricsPayload>) {
        self.payload = payload;
        self.index = None;
    }

    /// Returns true when the index differs from the last one recorded.
    pub fn update_index(&mut self, new_index: usize) -> bool {
        if self.index != Some(new_index) {
            self.index = Some(new_index);
            true
        } else {
            false
        }
    }
}

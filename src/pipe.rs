use crate::lyrics::providers::LyricsSearch;
use crate::lyrics::{LyricsPayload, LyricsResolver};
use crate::mpris::PlaybackSource;
use crate::state::LyricState;
use std::io::{self, Write};
use std::time::Duration;
use tokio::time::MissedTickBehavior;

/// Follows the playing track and prints the current lyric line to `out`
/// whenever it changes (pipe mode, for scripting and status bars).
pub struct LyricSync<P, S> {
    source: P,
    resolver: LyricsResolver<S>,
    state: LyricState,
}

impl<P: PlaybackSource, S: LyricsSearch> LyricSync<P, S> {
    pub fn new(source: P, resolver: LyricsResolver<S>) -> Self {
        Self {
            source,
            resolver,
            state: LyricState::default(),
        }
    }

    /// One poll cycle: detect track changes, resolve once per track, then
    /// emit the active cue if it moved.
    pub async fn tick<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        let Some(track) = self.source.current_track().await else {
            return Ok(());
        };

        if self.state.has_changed(&track) {
            tracing::info!(
                title = %track.title,
                artist = %track.artist,
                duration = track.duration,
                "Track changed, loading lyrics"
            );
            self.state.reset(track.clone());
            let (payload, outcome) = self.resolver.resolve(&track).await;
            if outcome.is_failure() {
                tracing::warn!(title = %track.title, %outcome, "No lyrics");
            } else {
                tracing::info!(title = %track.title, %outcome, "Lyrics resolved");
            }
            if let Some(LyricsPayload::Synced(lyrics)) = &payload {
                if lyrics.is_empty() {
                    tracing::warn!(title = %track.title, "Synced lyrics have no cues");
                }
                tracing::debug!(cues = lyrics.len(), "Parsed synced lyrics");
            }
            self.state.update_lyrics(payload);
        }

        match &self.state.payload {
            Some(LyricsPayload::Plain(text)) if !self.state.plain_shown => {
                writeln!(out, "{text}")?;
                self.state.plain_shown = true;
            }
            Some(LyricsPayload::Synced(_)) => self.emit_cue(out).await?,
            _ => return Ok(()),
        }
        out.flush()
    }

    async fn emit_cue<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        let Some(position) = self.source.current_position().await else {
            return Ok(());
        };
        let cue = match &self.state.payload {
            Some(LyricsPayload::Synced(lyrics)) => lyrics.current_cue(position),
            _ => None,
        };
        let Some((index, offset)) = cue else {
            return Ok(());
        };
        if !self.state.update_index(index) {
            return Ok(());
        }
        tracing::debug!(index, offset, position, "Lyric changed");
        if let Some(LyricsPayload::Synced(lyrics)) = &self.state.payload {
            writeln!(out, "{}", lyrics.text_of(index).unwrap_or_default())?;
        }
        Ok(())
    }

    /// Poll until Ctrl-C.
    pub async fn run<W: Write>(&mut self, poll_interval: Duration, out: &mut W) -> io::Result<()> {
        let mut ticker = tokio::time::interval(poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => self.tick(out).await?,
            }
        }
        Ok(())
    }
}

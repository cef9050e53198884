//! MPRIS module: the playback source the lyrics driver polls.

pub mod connection;
pub mod metadata;
pub mod playback;

use crate::lyrics::TrackIdentity;
use crate::lyrics::parse::round2;
use std::future::Future;

use connection::find_playing_player;

/// Where the current track and playback position come from.
///
/// Either call may return `None` at any time (nothing playing, player gone).
pub trait PlaybackSource {
    fn current_track(&mut self) -> impl Future<Output = Option<TrackIdentity>> + Send;
    fn current_position(&mut self) -> impl Future<Output = Option<f64>> + Send;
}

/// Reads whichever MPRIS player is currently playing.
#[derive(Debug, Default)]
pub struct MprisSource {
    block: Vec<String>,
    /// Player service picked by the last `current_track` call.
    service: Option<String>,
}

impl MprisSource {
    pub fn new(block: Vec<String>) -> Self {
        Self {
            block,
            service: None,
        }
    }
}

impl PlaybackSource for MprisSource {
    async fn current_track(&mut self) -> Option<TrackIdentity> {
        self.service = match find_playing_player(&self.block).await {
            Ok(s) => s,
            Err(e) => {
                tracing::debug!(error = %e, "Player discovery failed");
                None
            }
        };
        let service = self.service.as_deref()?;
        match metadata::get_metadata(service).await {
            Ok(meta) => meta.to_identity(),
            Err(e) => {
                tracing::debug!(%service, error = %e, "D-Bus error getting metadata");
                None
            }
        }
    }

    async fn current_position(&mut self) -> Option<f64> {
        let service = self.service.as_deref()?;
        match playback::get_position(service).await {
            Ok(pos) => pos.map(round2),
            Err(e) => {
                tracing::debug!(%service, error = %e, "D-Bus error getting position");
                None
            }
        }
    }
}

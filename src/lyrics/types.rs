use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Identity of the track currently playing. Also the natural cache key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackIdentity {
    pub title: String,
    pub artist: String,
    /// Duration in seconds. Part of the key so remixes and covers sharing
    /// a title and artist do not collide.
    pub duration: f64,
}

impl TrackIdentity {
    pub fn new(title: impl Into<String>, artist: impl Into<String>, duration: f64) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            duration,
        }
    }

    /// Query string sent to the search endpoint.
    pub fn search_query(&self) -> String {
        format!("{} {}", self.title, self.artist)
    }
}

/// One persisted cache entry.
///
/// When `instrumental` is set both lyric fields are ignored. A
/// non-instrumental record without synced lyrics is stale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheRecord {
    pub source: String,
    pub track_title: String,
    pub track_artist: String,
    #[serde(default)]
    pub instrumental: bool,
    #[serde(default)]
    pub synced_lyrics: Option<String>,
    #[serde(default)]
    pub plain_lyrics: Option<String>,
}

impl CacheRecord {
    pub const SOURCE_LRCLIB: &'static str = "LRCLIB";

    pub fn instrumental(identity: &TrackIdentity) -> Self {
        Self {
            source: Self::SOURCE_LRCLIB.to_string(),
            track_title: identity.title.clone(),
            track_artist: identity.artist.clone(),
            instrumental: true,
            synced_lyrics: None,
            plain_lyrics: None,
        }
    }

    pub fn synced(identity: &TrackIdentity, synced: &str, plain: Option<&str>) -> Self {
        Self {
            source: Self::SOURCE_LRCLIB.to_string(),
            track_title: identity.title.clone(),
            track_artist: identity.artist.clone(),
            instrumental: false,
            synced_lyrics: Some(synced.to_string()),
            plain_lyrics: plain.map(str::to_string),
        }
    }

    /// Synced lyrics if present and non-empty.
    pub fn synced_text(&self) -> Option<&str> {
        non_empty(self.synced_lyrics.as_deref())
    }

    pub fn is_stale(&self) -> bool {
        !self.instrumental && self.synced_text().is_none()
    }
}

/// One entry of the search endpoint's JSON array.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub duration: f64,
    #[serde(default)]
    pub synced_lyrics: Option<String>,
    #[serde(default)]
    pub plain_lyrics: Option<String>,
    #[serde(default)]
    pub instrumental: bool,
}

impl Candidate {
    pub fn synced_text(&self) -> Option<&str> {
        non_empty(self.synced_lyrics.as_deref())
    }

    pub fn plain_text(&self) -> Option<&str> {
        non_empty(self.plain_lyrics.as_deref())
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

/// Result code of a resolve call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    SyncedReady,
    /// Degraded success. Never cached.
    PlainOnly,
    /// Terminal "no lyrics apply" state. Cached.
    Instrumental,
    NotFound,
    Timeout,
    TransportError,
    ServerError,
}

impl FetchOutcome {
    /// HTTP-like status code, handy for scripting and logs.
    pub fn status_code(self) -> u16 {
        match self {
            FetchOutcome::SyncedReady => 200,
            FetchOutcome::PlainOnly => 206,
            FetchOutcome::Instrumental => 204,
            FetchOutcome::NotFound => 404,
            FetchOutcome::Timeout => 408,
            FetchOutcome::TransportError => 400,
            FetchOutcome::ServerError => 500,
        }
    }

    pub fn is_failure(self) -> bool {
        matches!(
            self,
            FetchOutcome::NotFound
                | FetchOutcome::Timeout
                | FetchOutcome::TransportError
                | FetchOutcome::ServerError
        )
    }
}

impl fmt::Display for FetchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FetchOutcome::SyncedReady => "synced lyrics ready",
            FetchOutcome::PlainOnly => "only plain lyrics available",
            FetchOutcome::Instrumental => "instrumental",
            FetchOutcome::NotFound => "no lyrics found",
            FetchOutcome::Timeout => "request timed out",
            FetchOutcome::TransportError => "transport error",
            FetchOutcome::ServerError => "server error",
        };
        write!(f, "{} ({})", s, self.status_code())
    }
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Transport(reqwest::Error),
    #[error("server returned {0}")]
    Server(StatusCode),
    #[error("malformed response: {0}")]
    Decode(reqwest::Error),
}

impl FetchError {
    pub fn outcome(&self) -> FetchOutcome {
        match self {
            FetchError::Timeout => FetchOutcome::Timeout,
            FetchError::Transport(_) => FetchOutcome::TransportError,
            FetchError::Server(_) | FetchError::Decode(_) => FetchOutcome::ServerError,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if e.is_decode() {
            FetchError::Decode(e)
        } else {
            FetchError::Transport(e)
        }
    }
}

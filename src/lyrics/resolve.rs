//! Track identity to lyrics: cache first, then the remote search.
//!
//! ```text
//! resolve(identity)
//!   ├─ cache hit, instrumental ─────────▶ Instrumental
//!   ├─ cache hit, synced ───────────────▶ parse ─▶ SyncedReady
//!   ├─ cache hit, stale ─▶ remove ─┐
//!   └─ miss ───────────────────────┴─▶ search ─▶ select
//!                                        ├─ instrumental ─▶ put ─▶ Instrumental
//!                                        ├─ synced ───────▶ put ─▶ parse ─▶ SyncedReady
//!                                        ├─ plain only ───────────────────▶ PlainOnly
//!                                        └─ failure ──────────────────────▶ NotFound / Timeout / ...
//! ```
//!
//! Only instrumental and synced results are cached. Plain-only results are
//! not, so a later fetch can still pick up synced lyrics.

use crate::config::EngineConfig;
use crate::lyrics::cache::{CacheStore, cache_key};
use crate::lyrics::parse::SyncedLyrics;
use crate::lyrics::providers::{LyricsSearch, select_candidate};
use crate::lyrics::types::{CacheRecord, FetchOutcome, TrackIdentity};

/// What a resolve call hands to the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum LyricsPayload {
    Synced(SyncedLyrics),
    Plain(String),
}

#[derive(Debug)]
pub struct LyricsResolver<S> {
    cache: CacheStore,
    search: S,
    tolerance: f64,
}

impl<S: LyricsSearch> LyricsResolver<S> {
    pub fn new(config: &EngineConfig, search: S) -> Self {
        Self {
            cache: CacheStore::new(&config.cache_root),
            search,
            tolerance: config.duration_tolerance,
        }
    }

    /// Resolve lyrics for a track. Never fails; failures are outcome codes.
    pub async fn resolve(&self, identity: &TrackIdentity) -> (Option<LyricsPayload>, FetchOutcome) {
        let hash = cache_key(identity);

        if let Some(record) = self.cache.get(&hash).await {
            if record.instrumental {
                tracing::debug!(%hash, "Cache hit (instrumental)");
                return (None, FetchOutcome::Instrumental);
            }
            if let Some(synced) = record.synced_text() {
                tracing::debug!(%hash, "Cache hit");
                return (Some(synced_payload(synced, identity)), FetchOutcome::SyncedReady);
            }
            tracing::info!(%hash, "Stale cache entry, refetching");
            self.cache.remove(&hash).await;
        }

        self.fetch(identity, &hash).await
    }

    async fn fetch(&self, identity: &TrackIdentity, hash: &str) -> (Option<LyricsPayload>, FetchOutcome) {
        let candidates = match self.search.search(&identity.search_query()).await {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(error = %e, title = %identity.title, "Lyrics search failed");
                return (None, e.outcome());
            }
        };

        let Some(picked) = select_candidate(&candidates, identity.duration, self.tolerance) else {
            tracing::debug!(
                results = candidates.len(),
                duration = identity.duration,
                "No candidate within duration tolerance"
            );
            return (None, FetchOutcome::NotFound);
        };

        if picked.instrumental {
            self.store(hash, &CacheRecord::instrumental(identity)).await;
            return (None, FetchOutcome::Instrumental);
        }
        if let Some(synced) = picked.synced_text() {
            let record = CacheRecord::synced(identity, synced, picked.plain_text());
            self.store(hash, &record).await;
            return (Some(synced_payload(synced, identity)), FetchOutcome::SyncedReady);
        }
        if let Some(plain) = picked.plain_text() {
            return (Some(LyricsPayload::Plain(plain.to_string())), FetchOutcome::PlainOnly);
        }
        (None, FetchOutcome::NotFound)
    }

    // A failed write costs a refetch next time, nothing more.
    async fn store(&self, hash: &str, record: &CacheRecord) {
        if let Err(e) = self.cache.put(hash, record).await {
            tracing::warn!(%hash, error = %e, "Failed to cache lyrics");
        }
    }
}

fn synced_payload(raw: &str, identity: &TrackIdentity) -> LyricsPayload {
    LyricsPayload::Synced(SyncedLyrics::parse(raw).with_track(&identity.title, &identity.artist))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::lyrics::types::{Candidate, FetchError};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// Search stub returning canned responses and counting calls.
    pub(crate) struct StubSearch {
        pub calls: AtomicUsize,
        pub queries: Mutex<Vec<String>>,
        respond: fn() -> Result<Vec<Candidate>, FetchError>,
    }

    impl StubSearch {
        pub(crate) fn new(respond: fn() -> Result<Vec<Candidate>, FetchError>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                queries: Mutex::new(Vec::new()),
                respond,
            }
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl LyricsSearch for StubSearch {
        async fn search(&self, query: &str) -> Result<Vec<Candidate>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.queries.lock().unwrap().push(query.to_string());
            (self.respond)()
        }
    }

    impl LyricsSearch for &StubSearch {
        async fn search(&self, query: &str) -> Result<Vec<Candidate>, FetchError> {
            (**self).search(query).await
        }
    }

    pub(crate) fn synced_song() -> Result<Vec<Candidate>, FetchError> {
        Ok(vec![Candidate {
            duration: 201.0,
            synced_lyrics: Some("[00:01.00] Hello\n[00:05.00] World".into()),
            plain_lyrics: Some("Hello\nWorld".into()),
            instrumental: false,
        }])
    }

    pub(crate) fn plain_only() -> Result<Vec<Candidate>, FetchError> {
        Ok(vec![Candidate {
            duration: 200.0,
            synced_lyrics: None,
            plain_lyrics: Some("line one".into()),
            instrumental: false,
        }])
    }

    fn instrumental() -> Result<Vec<Candidate>, FetchError> {
        Ok(vec![Candidate {
            duration: 199.0,
            synced_lyrics: Some("[00:01.00] ignored".into()),
            plain_lyrics: None,
            instrumental: true,
        }])
    }

    fn wrong_durations() -> Result<Vec<Candidate>, FetchError> {
        Ok(vec![
            Candidate { duration: 100.0, ..Default::default() },
            Candidate { duration: 300.0, ..Default::default() },
        ])
    }

    fn empty() -> Result<Vec<Candidate>, FetchError> {
        Ok(Vec::new())
    }

    pub(crate) fn timeout() -> Result<Vec<Candidate>, FetchError> {
        Err(FetchError::Timeout)
    }

    fn server_error() -> Result<Vec<Candidate>, FetchError> {
        Err(FetchError::Server(reqwest::StatusCode::SERVICE_UNAVAILABLE))
    }

    pub(crate) fn config(tmp: &TempDir) -> EngineConfig {
        EngineConfig {
            cache_root: tmp.path().to_path_buf(),
            duration_tolerance: 2.0,
            ..EngineConfig::default()
        }
    }

    fn song() -> TrackIdentity {
        TrackIdentity::new("Song A", "Artist B", 200.0)
    }

    #[tokio::test]
    async fn end_to_end_synced_lyrics() {
        let tmp = TempDir::new().unwrap();
        let stub = StubSearch::new(synced_song);
        let resolver = LyricsResolver::new(&config(&tmp), &stub);

        let (payload, outcome) = resolver.resolve(&song()).await;
        assert_eq!(outcome, FetchOutcome::SyncedReady);
        let Some(LyricsPayload::Synced(lyrics)) = payload else {
            panic!("expected synced lyrics");
        };
        assert_eq!(lyrics.current_cue(0.5), Some((0, -0.5)));
        assert_eq!(lyrics.current_cue(3.0), Some((0, 2.0)));
        assert_eq!(lyrics.current_cue(6.0), Some((1, 1.0)));
        assert_eq!(lyrics.track_title, "Song A");
        assert_eq!(stub.queries.lock().unwrap().as_slice(), ["Song A Artist B"]);
    }

    #[tokio::test]
    async fn second_resolve_is_served_from_cache() {
        let tmp = TempDir::new().unwrap();
        let stub = StubSearch::new(synced_song);
        let resolver = LyricsResolver::new(&config(&tmp), &stub);

        let first = resolver.resolve(&song()).await;
        let second = resolver.resolve(&song()).await;
        assert_eq!(stub.calls(), 1);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn stale_entry_is_removed_and_refetched_once() {
        let tmp = TempDir::new().unwrap();
        let cfg = config(&tmp);
        let hash = cache_key(&song());
        let mut stale = CacheRecord::synced(&song(), "x", None);
        stale.synced_lyrics = None;
        CacheStore::new(&cfg.cache_root).put(&hash, &stale).await.unwrap();

        let stub = StubSearch::new(synced_song);
        let resolver = LyricsResolver::new(&cfg, &stub);
        let (_, outcome) = resolver.resolve(&song()).await;
        assert_eq!(outcome, FetchOutcome::SyncedReady);
        assert_eq!(stub.calls(), 1);

        let healed = CacheStore::new(&cfg.cache_root).get(&hash).await.unwrap();
        assert!(healed.synced_text().is_some());
    }

    #[tokio::test]
    async fn stale_entry_is_dropped_even_if_refetch_fails() {
        let tmp = TempDir::new().unwrap();
        let cfg = config(&tmp);
        let hash = cache_key(&song());
        let mut stale = CacheRecord::synced(&song(), "x", Some("p"));
        stale.synced_lyrics = Some(String::new());
        CacheStore::new(&cfg.cache_root).put(&hash, &stale).await.unwrap();

        let stub = StubSearch::new(timeout);
        let resolver = LyricsResolver::new(&cfg, &stub);
        assert_eq!(resolver.resolve(&song()).await, (None, FetchOutcome::Timeout));
        assert_eq!(CacheStore::new(&cfg.cache_root).get(&hash).await, None);
    }

    #[tokio::test]
    async fn plain_only_is_returned_but_not_cached() {
        let tmp = TempDir::new().unwrap();
        let stub = StubSearch::new(plain_only);
        let resolver = LyricsResolver::new(&config(&tmp), &stub);

        let expected = (
            Some(LyricsPayload::Plain("line one".into())),
            FetchOutcome::PlainOnly,
        );
        assert_eq!(resolver.resolve(&song()).await, expected);
        assert_eq!(resolver.resolve(&song()).await, expected);
        assert_eq!(stub.calls(), 2);
    }

    #[tokio::test]
    async fn instrumental_is_cached_and_wins_over_lyrics() {
        let tmp = TempDir::new().unwrap();
        let stub = StubSearch::new(instrumental);
        let resolver = LyricsResolver::new(&config(&tmp), &stub);

        assert_eq!(resolver.resolve(&song()).await, (None, FetchOutcome::Instrumental));
        assert_eq!(resolver.resolve(&song()).await, (None, FetchOutcome::Instrumental));
        assert_eq!(stub.calls(), 1);
    }

    #[tokio::test]
    async fn failures_propagate_and_are_not_cached() {
        let cases: [(fn() -> Result<Vec<Candidate>, FetchError>, FetchOutcome); 4] = [
            (wrong_durations, FetchOutcome::NotFound),
            (empty, FetchOutcome::NotFound),
            (timeout, FetchOutcome::Timeout),
            (server_error, FetchOutcome::ServerError),
        ];
        for (respond, want) in cases {
            let tmp = TempDir::new().unwrap();
            let stub = StubSearch::new(respond);
            let resolver = LyricsResolver::new(&config(&tmp), &stub);

            assert_eq!(resolver.resolve(&song()).await, (None, want));
            assert_eq!(resolver.resolve(&song()).await, (None, want));
            assert_eq!(stub.calls(), 2);
            assert!(!tmp.path().join("lyrics").exists());
        }
    }

    #[tokio::test]
    async fn malformed_cache_file_falls_back_to_fetch() {
        let tmp = TempDir::new().unwrap();
        let cfg = config(&tmp);
        let dir = tmp.path().join("lyrics");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(format!("{}.json", cache_key(&song()))), "garbage").unwrap();

        let stub = StubSearch::new(synced_song);
        let resolver = LyricsResolver::new(&cfg, &stub);
        assert_eq!(resolver.resolve(&song()).await.1, FetchOutcome::SyncedReady);
        assert_eq!(stub.calls(), 1);
    }
}

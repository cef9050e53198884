// lyrics/mod.rs - synced lyrics engine: parsing, cache, remote search, resolution
pub mod cache;
pub mod parse;
pub mod providers;
pub mod resolve;
pub mod types;

pub use providers::LrclibClient;
pub use resolve::{LyricsPayload, LyricsResolver};
pub use types::TrackIdentity;

pub mod lrclib;

pub use lrclib::{LrclibClient, LyricsSearch, select_candidate};

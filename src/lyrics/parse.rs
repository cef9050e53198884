//! LRC parsing and position lookup.
//!
//! Each line is classified on its own, top to bottom. A line starting with a
//! `[MM:SS.ff]` or `[MM:SS.fff]` tag is timed; anything else is untimed and
//! inherits the timestamp of the previous cue. A tag whose body does not
//! decode to a number also inherits, so parsing never fails.
//!
//! Cues keep source order. Timestamps are not guaranteed to be monotonic
//! and [`SyncedLyrics::current_cue`] does not assume they are.

use once_cell::sync::Lazy;
use regex::Regex;

// Any character may separate seconds from the fraction, so `[00:05:00]` is
// still a tag. It fails to decode and carries the previous timestamp.
static TAG_CENTIS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[(\d\d):(\d\d.\d\d)\]").unwrap());
static TAG_MILLIS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[(\d\d):(\d\d.\d\d\d)\]").unwrap());

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cue {
    /// Seconds, rounded to two decimals.
    pub time: f64,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncedLyrics {
    pub track_title: String,
    pub track_artist: String,
    cues: Vec<Cue>,
    plain: String,
}

impl SyncedLyrics {
    /// Parse raw LRC text. Never fails; a blank body gives zero cues.
    pub fn parse(raw: &str) -> Self {
        let cues = parse_cues(raw);
        let plain = cues
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        Self {
            track_title: String::new(),
            track_artist: String::new(),
            cues,
            plain,
        }
    }

    pub fn with_track(mut self, title: &str, artist: &str) -> Self {
        self.track_title = title.to_string();
        self.track_artist = artist.to_string();
        self
    }

    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    /// All cue texts joined by newline, in source order.
    pub fn plain_text(&self) -> &str {
        &self.plain
    }

    pub fn text_of(&self, index: usize) -> Option<&str> {
        self.cues.get(index).map(|c| c.text.as_str())
    }

    /// Active cue for a playback position, with the seconds elapsed since it
    /// started. Before the first cue the index is 0 and the offset negative.
    ///
    /// This is a forward scan returning the first cue whose successor starts
    /// after `position` (or the last cue). With non-monotonic timestamps the
    /// answer follows that scan order, not a sorted search.
    pub fn current_cue(&self, position: f64) -> Option<(usize, f64)> {
        let first = self.cues.first()?.time;
        if position < first {
            return Some((0, round2(position - first)));
        }
        let last = self.cues.len() - 1;
        let found = (0..=last).find(|&i| i == last || position < self.cues[i + 1].time);
        Some(match found {
            Some(i) => (i, round2(position - self.cues[i].time)),
            None => (0, round2(position - first)),
        })
    }
}

fn parse_cues(raw: &str) -> Vec<Cue> {
    let body = raw.trim();
    if body.is_empty() {
        return Vec::new();
    }
    body.lines()
        .scan(0.0, |last, line| {
            let cue = parse_line(line, *last);
            *last = cue.time;
            Some(cue)
        })
        .collect()
}

/// Classify one line. `last` is the previous cue's resolved timestamp.
fn parse_line(line: &str, last: f64) -> Cue {
    let caps = TAG_CENTIS_RE
        .captures(line)
        .or_else(|| TAG_MILLIS_RE.captures(line));
    let Some(caps) = caps else {
        return Cue {
            time: last,
            text: line.to_string(),
        };
    };

    let rest = &line[caps.get(0).map_or(0, |m| m.end())..];
    let text = rest.strip_prefix(' ').unwrap_or(rest).to_string();
    let time = decode_tag(&caps[1], &caps[2]).unwrap_or(last);
    Cue { time, text }
}

/// `None` means the tag body is not numeric and the caller carries forward.
fn decode_tag(minutes: &str, seconds: &str) -> Option<f64> {
    let minutes: u32 = minutes.parse().ok()?;
    let seconds: f64 = seconds.parse().ok()?;
    Some(round2(minutes as f64 * 60.0 + seconds))
}

/// Rounds to two decimals from the exact binary value, ties to even
/// (`1.125` -> `1.12`, `2.675` -> `2.67`).
pub fn round2(v: f64) -> f64 {
    format!("{v:.2}").parse().unwrap_or(v)
}

//! Minimal track metadata struct and metadata querying for MPRIS.

use crate::lyrics::TrackIdentity;
use crate::mpris::connection::{MprisError, get_dbus_conn};
use std::collections::HashMap;
use zbus::Proxy;
use zvariant::OwnedValue;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackMetadata {
    pub title: String,
    pub artist: String,
    /// Seconds.
    pub length: Option<f64>,
}

impl TrackMetadata {
    /// `None` when the player reports no title, i.e. nothing usable is playing.
    /// A missing length becomes 0 seconds.
    pub fn to_identity(&self) -> Option<TrackIdentity> {
        if self.title.is_empty() {
            return None;
        }
        Some(TrackIdentity::new(
            self.title.clone(),
            self.artist.clone(),
            self.length.unwrap_or(0.0),
        ))
    }
}

/// Extract metadata fields from a D-Bus property map.
///
/// The MPRIS spec says artist is an array of strings; only the first entry
/// is used, and a missing or empty array gives an empty artist.
pub fn extract_metadata(map: &HashMap<String, OwnedValue>) -> TrackMetadata {
    let title = map
        .get("xesam:title")
        .and_then(|v| String::try_from(v.clone()).ok())
        .unwrap_or_default();
    let artist = map
        .get("xesam:artist")
        .and_then(|v| Vec::<String>::try_from(v.clone()).ok())
        .and_then(|v| v.into_iter().next())
        .unwrap_or_default();
    let length = map.get("mpris:length").and_then(|v| {
        if let Ok(i) = i64::try_from(v.clone()) {
            return Some(i as f64 / 1_000_000.0);
        }
        if let Ok(u) = u64::try_from(v.clone()) {
            return Some(u as f64 / 1_000_000.0);
        }
        None
    });
    TrackMetadata { title, artist, length }
}

/// Query metadata for a specific MPRIS player service.
pub async fn get_metadata(service: &str) -> Result<TrackMetadata, MprisError> {
    if service.is_empty() {
        return Ok(TrackMetadata::default());
    }
    let conn = get_dbus_conn().await?;
    // Use targeted Properties.Get to avoid triggering GetAll
    let props_proxy = Proxy::new(&conn, service, "/org/mpris/MediaPlayer2", "org.freedesktop.DBus.Properties").await?;
    let reply = props_proxy
        .call_method("Get", &("org.mpris.MediaPlayer2.Player", "Metadata"))
        .await?;
    let val = reply.body().deserialize::<OwnedValue>()?;
    match HashMap::<String, OwnedValue>::try_from(val) {
        Ok(map) => Ok(extract_metadata(&map)),
        Err(_) => Ok(TrackMetadata::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zvariant::{Str, Value};

    fn owned(v: Value<'_>) -> OwnedValue {
        v.try_to_owned().unwrap()
    }

    #[test]
    fn extracts_title_first_artist_and_length() {
        let mut map = HashMap::new();
        map.insert("xesam:title".to_string(), owned(Value::from(Str::from("Song A"))));
        map.insert(
            "xesam:artist".to_string(),
            owned(Value::from(vec!["Artist B".to_string(), "Feat C".to_string()])),
        );
        map.insert("mpris:length".to_string(), owned(Value::from(200_500_000i64)));

        let md = extract_metadata(&map);
        assert_eq!(md.title, "Song A");
        assert_eq!(md.artist, "Artist B");
        assert_eq!(md.length, Some(200.5));
        assert_eq!(md.to_identity(), Some(TrackIdentity::new("Song A", "Artist B", 200.5)));
    }

    #[test]
    fn missing_artist_and_length_still_identify_track() {
        let mut map = HashMap::new();
        map.insert("xesam:title".to_string(), owned(Value::from("Solo")));
        let md = extract_metadata(&map);
        assert_eq!(md.artist, "");
        assert_eq!(md.to_identity(), Some(TrackIdentity::new("Solo", "", 0.0)));
    }

    #[test]
    fn no_title_means_no_track() {
        assert_eq!(extract_metadata(&HashMap::new()).to_identity(), None);
    }
}

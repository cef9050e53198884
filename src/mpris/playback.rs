//! Minimal playback status and position querying for MPRIS.

use crate::mpris::connection::{MprisError, get_dbus_conn};
use zbus::Proxy;
use zvariant::OwnedValue;

fn parse_position_from_owned(val: &OwnedValue) -> Option<f64> {
    if let Ok(i) = i64::try_from(val.clone()) {
        return Some(i as f64 / 1_000_000.0);
    }
    if let Ok(u) = u64::try_from(val.clone()) {
        return Some(u as f64 / 1_000_000.0);
    }
    None
}

async fn get_player_property(service: &str, name: &str) -> Result<OwnedValue, MprisError> {
    let conn = get_dbus_conn().await?;
    // Use targeted Properties.Get to avoid triggering GetAll on some players
    let props_proxy = Proxy::new(&conn, service, "/org/mpris/MediaPlayer2", "org.freedesktop.DBus.Properties").await?;
    let reply = props_proxy
        .call_method("Get", &("org.mpris.MediaPlayer2.Player", name))
        .await?;
    Ok(reply.body().deserialize::<OwnedValue>()?)
}

/// Query the playback position (seconds) for a specific MPRIS player service.
pub async fn get_position(service: &str) -> Result<Option<f64>, MprisError> {
    if service.is_empty() {
        return Ok(None);
    }
    let val = get_player_property(service, "Position").await?;
    Ok(parse_position_from_owned(&val))
}

/// Query the playback status for a specific MPRIS player service.
pub async fn get_playback_status(service: &str) -> Result<String, MprisError> {
    if service.is_empty() {
        return Ok("Stopped".to_string());
    }
    let val = get_player_property(service, "PlaybackStatus").await?;
    Ok(String::try_from(val).unwrap_or_else(|_| "Stopped".to_string()))
}

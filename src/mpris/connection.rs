//! D-Bus connection management and player discovery for MPRIS.

use crate::mpris::playback::get_playback_status;
use std::sync::Arc;
use tokio::sync::OnceCell;

const MPRIS_PREFIX: &str = "org.mpris.MediaPlayer2.";

/// Errors that can occur during MPRIS operations
#[derive(thiserror::Error, Debug)]
pub enum MprisError {
    #[error("D-Bus error: {0}")]
    ZBus(#[from] zbus::Error),
    #[error("D-Bus call failed: {0}")]
    Fdo(#[from] zbus::fdo::Error),
    #[error("Failed to establish D-Bus connection")]
    NoConnection,
}

/// Global D-Bus connection singleton
static DBUS_CONNECTION: OnceCell<Arc<zbus::Connection>> = OnceCell::const_new();

/// Get or create a shared D-Bus session connection
pub async fn get_dbus_conn() -> Result<Arc<zbus::Connection>, MprisError> {
    DBUS_CONNECTION
        .get_or_try_init(|| async {
            let conn = zbus::Connection::session()
                .await
                .map_err(|_| MprisError::NoConnection)?;
            Ok(Arc::new(conn))
        })
        .await
        .cloned()
}

/// All MPRIS player service names currently on the session bus.
pub async fn get_player_names() -> Result<Vec<String>, MprisError> {
    let conn = get_dbus_conn().await?;
    let dbus = zbus::fdo::DBusProxy::new(&conn).await?;
    let names = dbus.list_names().await?;
    Ok(names
        .into_iter()
        .map(|n| n.as_str().to_string())
        .filter(|n| n.starts_with(MPRIS_PREFIX))
        .collect())
}

/// First non-blocked player whose status is `Playing`, in bus order.
pub async fn find_playing_player(block_list: &[String]) -> Result<Option<String>, MprisError> {
    for service in get_player_names().await? {
        if is_blocked(&service, block_list) {
            continue;
        }
        if matches!(get_playback_status(&service).await.as_deref(), Ok("Playing")) {
            return Ok(Some(service));
        }
    }
    Ok(None)
}

/// Check if a player service name should be blocked
///
/// Returns true if the service name (case-insensitive) contains any blocked string.
pub fn is_blocked(service: &str, block_list: &[String]) -> bool {
    let service_lower = service.to_lowercase();
    block_list
        .iter()
        .any(|blocked| service_lower.contains(&blocked.to_lowercase()))
}

use crate::errors::AppError;
use crate::models::{AppData, LogEntry, UserSettings};
use crate::settings::ensure_sentinels;
use crate::stats::sort_newest_first;
use serde::{Serialize, de::DeserializeOwned};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, error, warn};

pub const ENTRIES_FILE: &str = "aquaflow_entries.json";
pub const SETTINGS_FILE: &str = "aquaflow_settings.json";
pub const CORRUPT_SUFFIX: &str = "corrupt";

/// Loads both snapshots from `dir`. Missing or unreadable files fall back to
/// defaults; stored settings are merged over the defaults field by field.
/// A file that fails to parse is renamed to `<name>.corrupt` first so the
/// next save cannot overwrite it.
pub async fn load_data(dir: &Path) -> AppData {
    let mut entries: Vec<LogEntry> = read_snapshot(&dir.join(ENTRIES_FILE))
        .await
        .unwrap_or_default();
    let mut settings: UserSettings = read_snapshot(&dir.join(SETTINGS_FILE))
        .await
        .unwrap_or_default();

    sort_newest_first(&mut entries);
    ensure_sentinels(&mut settings);
    debug!("loaded {} entries from {}", entries.len(), dir.display());

    AppData { entries, settings }
}

pub async fn persist_entries(dir: &Path, entries: &[LogEntry]) -> Result<(), AppError> {
    write_snapshot(&dir.join(ENTRIES_FILE), entries).await
}

pub async fn persist_settings(dir: &Path, settings: &UserSettings) -> Result<(), AppError> {
    write_snapshot(&dir.join(SETTINGS_FILE), settings).await
}

async fn read_snapshot<T: DeserializeOwned>(path: &Path) -> Option<T> {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(err) => {
                error!("failed to parse {}: {err}", path.display());
                set_aside(path).await;
                None
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
        Err(err) => {
            error!("failed to read {}: {err}", path.display());
            None
        }
    }
}

async fn set_aside(path: &Path) {
    let mut target = path.as_os_str().to_owned();
    target.push(".");
    target.push(CORRUPT_SUFFIX);
    let target = PathBuf::from(target);
    match fs::rename(path, &target).await {
        Ok(()) => warn!("moved unreadable {} to {}", path.display(), target.display()),
        Err(err) => error!("failed to move {} aside: {err}", path.display()),
    }
}

async fn write_snapshot<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(value)?;
    fs::write(path, payload).await?;
    Ok(())
}

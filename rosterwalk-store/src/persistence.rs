//! File persistence helpers.
//!
//! Default paths, and JSON files created with owner-only permissions.

use serde::{Serialize, de::DeserializeOwned};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::StoreError;

// ============================================================================
// Default Paths
// ============================================================================

/// Returns the default configuration directory.
///
/// - macOS: `~/Library/Application Support/rosterwalk`
/// - Linux: `~/.config/rosterwalk`
/// - Windows: `%APPDATA%\rosterwalk`
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|c| c.join("rosterwalk"))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns the default data directory.
///
/// - macOS: `~/Library/Application Support/rosterwalk`
/// - Linux: `~/.local/share/rosterwalk`
/// - Windows: `%APPDATA%\rosterwalk`
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("rosterwalk"))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns the default configuration file path.
pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.json")
}

/// Returns the directory output documents go to by default.
pub fn default_output_dir() -> PathBuf {
    default_data_dir().join("exports")
}

/// Returns the default Chrome profile directory for launched browsers.
pub fn default_browser_profile_dir() -> PathBuf {
    default_data_dir().join("chrome-profile")
}

// ============================================================================
// Security: File Permissions
// ============================================================================

/// Sets owner-only file permissions (0o600) on Unix systems.
#[cfg(unix)]
async fn set_restrictive_permissions(path: &Path) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = tokio::fs::metadata(path).await?;
    let mut perms = metadata.permissions();
    perms.set_mode(0o600);
    tokio::fs::set_permissions(path, perms).await?;

    debug!(path = %path.display(), mode = "0600", "Set restrictive permissions");
    Ok(())
}

/// Sets owner-only directory permissions (0o700) on Unix systems.
#[cfg(unix)]
async fn set_restrictive_dir_permissions(path: &Path) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = tokio::fs::metadata(path).await?;
    let mut perms = metadata.permissions();
    perms.set_mode(0o700);
    tokio::fs::set_permissions(path, perms).await?;

    debug!(path = %path.display(), mode = "0700", "Set restrictive directory permissions");
    Ok(())
}

/// No-op for non-Unix systems.
#[cfg(not(unix))]
async fn set_restrictive_permissions(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

/// No-op for non-Unix systems.
#[cfg(not(unix))]
async fn set_restrictive_dir_permissions(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

// ============================================================================
// File Operations
// ============================================================================

/// Writes data to a JSON file that must not exist yet.
///
/// Fails with [`std::io::ErrorKind::AlreadyExists`] instead of replacing an
/// existing file.
pub async fn create_json<T: Serialize>(path: &Path, data: &T) -> Result<(), StoreError> {
    let json = serde_json::to_vec_pretty(data)?;

    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    file.write_all(&json).await?;
    file.write_all(b"\n").await?;
    file.flush().await?;
    drop(file);

    set_restrictive_permissions(path).await?;

    debug!(path = %path.display(), bytes = json.len(), "JSON file created");
    Ok(())
}

/// Loads data from a JSON file.
pub async fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    debug!(path = %path.display(), "Loading JSON file");

    let content = tokio::fs::read_to_string(path).await?;
    let data = serde_json::from_str(&content)?;

    debug!(path = %path.display(), "JSON file loaded");
    Ok(data)
}

/// Ensures a directory exists, creating it owner-only if it does not.
pub async fn ensure_dir(path: &Path) -> Result<(), StoreError> {
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        debug!(path = %path.display(), "Creating directory");
        tokio::fs::create_dir_all(path).await?;
        set_restrictive_dir_permissions(path).await?;
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use crate::api::ClientConfig;
use crate::domain::AppError;

const USERNAME_VARS: [&str; 2] = ["INSTAGRAM_USERNAME", "INSTA_USERNAME"];
const PASSWORD_VARS: [&str; 2] = ["INSTAGRAM_PASSWORD", "INSTA_PASSWORD"];

/// Application settings, resolved once at startup
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub download_root: PathBuf,
    pub default_username: String,
    pub default_password: String,
    /// How often the UI drains worker events
    pub poll_interval: Duration,
    pub client: ClientConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config reading variables through `lookup`.
    ///
    /// For each credential the first non-empty variable wins.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let first_set = |names: &[&str]| {
            names
                .iter()
                .filter_map(|name| lookup(name))
                .find(|value| !value.is_empty())
                .unwrap_or_default()
        };

        Self {
            download_root: default_download_root(),
            default_username: first_set(&USERNAME_VARS),
            default_password: first_set(&PASSWORD_VARS),
            poll_interval: Duration::from_millis(100),
            client: ClientConfig::default(),
        }
    }

    /// Creates the download root if it does not exist yet.
    pub fn ensure_download_root(&self) -> Result<(), AppError> {
        std::fs::create_dir_all(&self.download_root).map_err(|e| {
            AppError::DependencyUnavailable(format!(
                "cannot create download folder {}: {}",
                self.download_root.display(),
                e
            ))
        })
    }
}

/// `downloads/` next to the executable, or in the working directory.
fn default_download_root() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("downloads")))
        .unwrap_or_else(|| PathBuf::from("./downloads"))
}

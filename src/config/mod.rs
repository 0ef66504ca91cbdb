use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// 0 leaves requests without a deadline
    pub timeout_secs: u64,
    pub stats_path: String,
    pub groups_path: String,
    /// `{id}` is replaced by the group id
    pub students_path: String,
    pub attendance_path: String,
    pub logout_path: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 0,
            stats_path: "/estadisticas/profesor".to_string(),
            groups_path: "/grupos/mis-grupos".to_string(),
            students_path: "/grupos/{id}/estudiantes".to_string(),
            attendance_path: "/asistencias".to_string(),
            logout_path: "/auth/logout".to_string(),
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StatsConfig {
    #[serde(default)]
    pub discard_stale: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub stats: StatsConfig,

    #[serde(default)]
    pub session_file: Option<String>,

    #[serde(default)]
    pub log_file: Option<String>,
}

impl Config {
    pub fn session_path(&self) -> Option<PathBuf> {
        self.session_file
            .as_deref()
            .and_then(expand_path)
            .or_else(default_session_path)
    }

    pub fn log_path(&self) -> Option<PathBuf> {
        self.log_file
            .as_deref()
            .and_then(expand_path)
            .or_else(|| data_dir().map(|dir| dir.join("attendance-dash.log")))
    }
}

/// A missing file yields defaults. A file that fails to parse is an error,
/// so the caller can report it once logging is up and fall back itself.
pub fn load() -> Result<Config> {
    let Some(path) = config_path() else {
        return Ok(Config::default());
    };
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(_) => return Ok(Config::default()),
    };
    parse(&content).with_context(|| format!("invalid config file {}", path.display()))
}

pub fn parse(content: &str) -> Result<Config, toml::de::Error> {
    toml::from_str(content)
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("ATTENDANCE_DASH_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("attendance-dash").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join("attendance-dash").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "attendance", "attendance-dash")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

pub fn data_dir() -> Option<PathBuf> {
    if let Some(xdg) = std::env::var_os("XDG_DATA_HOME").map(PathBuf::from) {
        return Some(xdg.join("attendance-dash"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".local").join("share").join("attendance-dash"));
    }
    directories::ProjectDirs::from("io", "attendance", "attendance-dash")
        .map(|dirs| dirs.data_dir().to_path_buf())
}

pub fn default_session_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("session.json"))
}

pub fn expand_path(path: &str) -> Option<PathBuf> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(rest) = trimmed.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
            return Some(home.join(rest));
        }
    }

    let mut buf = PathBuf::from(trimmed);
    if buf.is_relative() {
        if let Ok(cwd) = std::env::current_dir() {
            buf = cwd.join(buf);
        }
    }
    Some(buf)
}

pub fn normalize_base_url(endpoint: &str) -> String {
    let trimmed = endpoint.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse("").unwrap();
        assert_eq!(config.api, ApiConfig::default());
        assert!(!config.stats.discard_stale);
    }

    #[test]
    fn test_partial_api_section() {
        let config = parse(
            r#"
            [api]
            base_url = "https://school.example/api"

            [stats]
            discard_stale = true
            "#,
        )
        .unwrap();
        assert_eq!(config.api.base_url, "https://school.example/api");
        assert_eq!(config.api.stats_path, "/estadisticas/profesor");
        assert!(config.stats.discard_stale);
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        assert!(parse("api = 3").is_err());
        assert!(parse("[api\nbase_url = 1").is_err());
    }

    #[test]
    fn test_request_timeout() {
        assert_eq!(ApiConfig::default().request_timeout(), None);
        assert_eq!(parse("[api]\ntimeout_secs = 0").unwrap().api.request_timeout(), None);
        assert_eq!(
            parse("[api]\ntimeout_secs = 15").unwrap().api.request_timeout(),
            Some(Duration::from_secs(15))
        );
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(normalize_base_url("localhost:3000/api/"), "http://localhost:3000/api");
        assert_eq!(normalize_base_url("https://x.io"), "https://x.io");
    }
}

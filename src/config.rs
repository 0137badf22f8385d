use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default RSS feed for the show.
pub const DEFAULT_FEED_URL: &str = "https://anchor.fm/s/100da1de8/podcast/rss";

/// Top-level service configuration, loaded from `config.yaml`.
///
/// Every field has a default so a missing or partial file still yields a
/// runnable config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub feed: FeedConfig,
    pub server: ServerConfig,
    pub player: PlayerConfig,
    /// Directory for durable state (bookmarks). Defaults to the platform
    /// data dir under `thoughtcast/`.
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Initial volume, clamped to [0, 1] on use.
    pub volume: f32,
    /// Crossfade interval when switching episodes.
    pub crossfade_ms: u64,
    /// How often the position readout is refreshed while playing.
    pub poll_interval_ms: u64,
    /// Relative seek distance for skip forward/backward.
    pub skip_seconds: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed: FeedConfig::default(),
            server: ServerConfig::default(),
            player: PlayerConfig::default(),
            data_dir: None,
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_FEED_URL.to_string(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8787".to_string(),
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            volume: 0.7,
            crossfade_ms: 500,
            poll_interval_ms: 1000,
            skip_seconds: 15.0,
        }
    }
}

impl Config {
    /// Load from a YAML file, falling back to defaults when the file does
    /// not exist. A file that exists but fails to parse is an error — a
    /// silently ignored typo in config.yaml is worse than a refusal to start.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::info!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Config path from `THOUGHTCAST_CONFIG`, else `config.yaml` in the
    /// working directory.
    pub fn default_path() -> PathBuf {
        std::env::var_os("THOUGHTCAST_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("config.yaml"))
    }

    /// Resolved directory for durable state, created on demand by callers.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("thoughtcast")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_file_missing() {
        let config = Config::load(Path::new("/nonexistent/config.yaml")).unwrap();
        assert_eq!(config.feed.url, DEFAULT_FEED_URL);
        assert_eq!(config.player.crossfade_ms, 500);
        assert_eq!(config.player.skip_seconds, 15.0);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "feed:\n  url: https://example.com/rss\nplayer:\n  volume: 0.4\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.feed.url, "https://example.com/rss");
        assert_eq!(config.player.volume, 0.4);
        // Untouched sections fall back to defaults
        assert_eq!(config.player.poll_interval_ms, 1000);
        assert_eq!(config.server.bind, "127.0.0.1:8787");
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "feed: [this is not\n  a mapping").unwrap();
        assert!(Config::load(&path).is_err());
    }
}

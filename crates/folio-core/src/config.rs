//! Configuration - 保持期限・アップロード上限・リモート接続
//!
//! `Config::default()` がそのまま本番値です。環境変数で上書きできます。
//!
//! | 変数 | 既定値 |
//! |------|--------|
//! | `FOLIO_RETENTION_MINUTES` | 30 |
//! | `FOLIO_SWEEP_INTERVAL_SECS` | 300 |
//! | `FOLIO_MAX_UPLOAD_MB` | 50 |
//! | `FOLIO_REMOTE_URL` | (なし: リモート無効) |
//! | `FOLIO_REMOTE_TOKEN` | (なし) |
//! | `FOLIO_REMOTE_TIMEOUT_SECS` | 120 |

use std::env;
use std::time::Duration;

pub const DEFAULT_RETENTION_MINUTES: u64 = 30;
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 5 * 60;
pub const DEFAULT_MAX_UPLOAD_MB: u64 = 50;
pub const DEFAULT_REMOTE_TIMEOUT_SECS: u64 = 120;

/// One week.
const MAX_RETENTION_MINUTES: u64 = 7 * 24 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Config {
    pub retention: RetentionConfig,
    pub uploads: UploadConfig,
    pub remote: RemoteConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionConfig {
    pub window_minutes: u64,
    pub sweep_interval_secs: u64,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            window_minutes: DEFAULT_RETENTION_MINUTES,
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
        }
    }
}

impl RetentionConfig {
    pub fn window(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.window_minutes.min(MAX_RETENTION_MINUTES) as i64)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadConfig {
    pub max_file_bytes: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    /// `None` disables the remote boundary.
    pub base_url: Option<String>,
    pub token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            token: None,
            timeout_secs: DEFAULT_REMOTE_TIMEOUT_SECS,
        }
    }
}

impl RemoteConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}' ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Missing keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let lookup = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let window_minutes = number(
            "FOLIO_RETENTION_MINUTES",
            lookup("FOLIO_RETENTION_MINUTES"),
            defaults.retention.window_minutes,
        )?;
        if window_minutes == 0 || window_minutes > MAX_RETENTION_MINUTES {
            return Err(ConfigError::Invalid {
                key: "FOLIO_RETENTION_MINUTES",
                value: window_minutes.to_string(),
                reason: "must be between 1 and 10080",
            });
        }

        let sweep_interval_secs = number(
            "FOLIO_SWEEP_INTERVAL_SECS",
            lookup("FOLIO_SWEEP_INTERVAL_SECS"),
            defaults.retention.sweep_interval_secs,
        )?;
        if sweep_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "FOLIO_SWEEP_INTERVAL_SECS",
                value: "0".into(),
                reason: "must be positive",
            });
        }

        let max_upload_mb = number(
            "FOLIO_MAX_UPLOAD_MB",
            lookup("FOLIO_MAX_UPLOAD_MB"),
            DEFAULT_MAX_UPLOAD_MB,
        )?;

        let timeout_secs = number(
            "FOLIO_REMOTE_TIMEOUT_SECS",
            lookup("FOLIO_REMOTE_TIMEOUT_SECS"),
            defaults.remote.timeout_secs,
        )?;

        Ok(Config {
            retention: RetentionConfig {
                window_minutes,
                sweep_interval_secs,
            },
            uploads: UploadConfig {
                max_file_bytes: max_upload_mb.saturating_mul(1024 * 1024),
            },
            remote: RemoteConfig {
                base_url: lookup("FOLIO_REMOTE_URL"),
                token: lookup("FOLIO_REMOTE_TOKEN"),
                timeout_secs,
            },
        })
    }
}

fn number(key: &'static str, raw: Option<String>, default: u64) -> Result<u64, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
            key,
            value,
            reason: "not a whole number",
        }),
    }
}

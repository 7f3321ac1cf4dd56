use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub sync: SyncConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default)]
    pub token: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub database_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    pub reconnect_debounce_ms: u64,
    pub listing_page: u32,
    pub listing_page_size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// 表示上「古い」とみなすまでの秒数（削除はしない）
    pub stale_after_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            token: None,
            timeout_secs: 30,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            reconnect_debounce_ms: 1_000,
            listing_page: 0,
            listing_page_size: 200,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stale_after_secs: 7 * 24 * 60 * 60, // 7 days
        }
    }
}

impl SyncConfig {
    pub fn reconnect_debounce(&self) -> Duration {
        Duration::from_millis(self.reconnect_debounce_ms)
    }
}

/// chrono の `Duration` が表現できる秒数の上限
pub const MAX_STALE_AFTER_SECS: u64 = (i64::MAX / 1_000) as u64;

impl CacheConfig {
    pub fn stale_after(&self) -> chrono::Duration {
        let secs = self.stale_after_secs.min(MAX_STALE_AFTER_SECS) as i64;
        chrono::Duration::try_seconds(secs).unwrap_or(chrono::Duration::MAX)
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        // 既定値
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("OCCURRENCE_SYNC_API_BASE_URL") {
            let trimmed = v.trim().trim_end_matches('/');
            if !trimmed.is_empty() {
                cfg.api.base_url = trimmed.to_string();
            }
        }
        if let Ok(v) = std::env::var("OCCURRENCE_SYNC_API_TOKEN") {
            let trimmed = v.trim();
            cfg.api.token = if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            };
        }
        if let Some(value) = env_u64("OCCURRENCE_SYNC_API_TIMEOUT_SECS") {
            cfg.api.timeout_secs = value.max(1);
        }
        if let Ok(v) = std::env::var("OCCURRENCE_SYNC_DATABASE_URL") {
            if !v.trim().is_empty() {
                cfg.storage.database_url = v.trim().to_string();
            }
        }
        if let Some(value) = env_u64("OCCURRENCE_SYNC_RECONNECT_DEBOUNCE_MS") {
            cfg.sync.reconnect_debounce_ms = value;
        }
        if let Some(value) = env_u64("OCCURRENCE_SYNC_LISTING_PAGE_SIZE") {
            cfg.sync.listing_page_size = value.clamp(1, u32::MAX as u64) as u32;
        }
        if let Some(value) = env_u64("OCCURRENCE_SYNC_CACHE_STALE_AFTER_SECS") {
            cfg.cache.stale_after_secs = value.min(MAX_STALE_AFTER_SECS);
        }

        cfg
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.api.base_url.trim().is_empty() {
            return Err("API base_url must not be empty".to_string());
        }
        if !(self.api.base_url.starts_with("http://") || self.api.base_url.starts_with("https://"))
        {
            return Err("API base_url must start with http:// or https://".to_string());
        }
        if self.api.timeout_secs == 0 {
            return Err("API timeout_secs must be greater than 0".to_string());
        }
        if self.storage.database_url.trim().is_empty() {
            return Err("Storage database_url must not be empty".to_string());
        }
        if self.cache.stale_after_secs > MAX_STALE_AFTER_SECS {
            return Err(format!(
                "Cache stale_after_secs must not exceed {}",
                MAX_STALE_AFTER_SECS
            ));
        }
        if self.sync.listing_page_size == 0 {
            return Err("Sync listing_page_size must be greater than 0".to_string());
        }
        Ok(())
    }
}

fn default_database_url() -> String {
    let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("./data"));
    let path = base.join("occurrence-sync").join("outbox.db");
    format!("sqlite://{}?mode=rwc", path.display())
}

fn env_u64(name: &str) -> Option<u64> {
    std::env::var(name).ok().and_then(|v| parse_u64(&v))
}

fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = AppConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.sync.reconnect_debounce(), Duration::from_secs(1));
        assert_eq!(cfg.sync.listing_page_size, 200);
        assert!(cfg.storage.database_url.ends_with("outbox.db?mode=rwc"));
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut cfg = AppConfig::default();
        cfg.sync.listing_page_size = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.api.base_url = "ftp://example".into();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn huge_stale_after_is_clamped_instead_of_panicking() {
        let cache = CacheConfig {
            stale_after_secs: u64::MAX,
        };
        let stale_after = cache.stale_after();
        assert_eq!(stale_after.num_seconds(), MAX_STALE_AFTER_SECS as i64);

        let mut cfg = AppConfig::default();
        cfg.cache.stale_after_secs = u64::MAX;
        assert!(cfg.validate().is_err());

        cfg.cache.stale_after_secs = MAX_STALE_AFTER_SECS;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn parse_u64_trims_input() {
        assert_eq!(parse_u64(" 42 "), Some(42));
        assert_eq!(parse_u64("abc"), None);
    }
}

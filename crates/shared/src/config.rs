//! Configuration types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

fn default_page_size() -> usize {
    12
}

fn default_blocking_timeout_ms() -> u64 {
    10
}

fn default_remote_timeout_ms() -> u64 {
    5_000
}

fn default_economy_enabled() -> bool {
    true
}

/// Listing and name resolution settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingConfig {
    /// Rows per listing page
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// How long a listing waits for owner names before rendering raw identities
    #[serde(default = "default_blocking_timeout_ms")]
    pub blocking_timeout_ms: u64,

    /// Upper bound for a single remote lookup
    #[serde(default = "default_remote_timeout_ms")]
    pub remote_timeout_ms: u64,

    /// Maximum cached name mappings (None = unbounded)
    #[serde(default)]
    pub cache_capacity: Option<usize>,

    /// Age after which a cached name is stale (None = never)
    #[serde(default)]
    pub cache_ttl_secs: Option<u64>,

    /// Maximum identities per remote batch request (None = one request)
    #[serde(default)]
    pub batch_size: Option<usize>,

    /// Whether the for-sale listing is available
    #[serde(default = "default_economy_enabled")]
    pub economy_enabled: bool,

    /// Inactivity after which an owned resource counts as expired (None = expiry off)
    #[serde(default)]
    pub expiry_days: Option<u32>,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            blocking_timeout_ms: default_blocking_timeout_ms(),
            remote_timeout_ms: default_remote_timeout_ms(),
            cache_capacity: None,
            cache_ttl_secs: None,
            batch_size: None,
            economy_enabled: default_economy_enabled(),
            expiry_days: None,
        }
    }
}

impl ListingConfig {
    /// Load configuration from a YAML (`.yaml`/`.yml`) or JSON file
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
            .unwrap_or(false);

        let config: Self = if is_yaml {
            serde_yaml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the listing cannot work with
    pub fn validate(&self) -> crate::Result<()> {
        if self.page_size == 0 {
            return Err(crate::Error::Config("pageSize must be greater than 0".to_string()));
        }
        if self.batch_size == Some(0) {
            return Err(crate::Error::Config("batchSize must be greater than 0".to_string()));
        }
        if self.cache_capacity == Some(0) {
            return Err(crate::Error::Config("cacheCapacity must be greater than 0".to_string()));
        }
        Ok(())
    }

    pub fn blocking_timeout(&self) -> Duration {
        Duration::from_millis(self.blocking_timeout_ms)
    }

    pub fn remote_timeout(&self) -> Duration {
        Duration::from_millis(self.remote_timeout_ms)
    }

    pub fn cache_ttl(&self) -> Option<Duration> {
        self.cache_ttl_secs.map(Duration::from_secs)
    }
}

/// Logger interface for dependency injection
pub trait Logger: Send + Sync {
    fn debug(&self, message: &str, meta: Option<&HashMap<String, String>>);
    fn info(&self, message: &str, meta: Option<&HashMap<String, String>>);
    fn warn(&self, message: &str, meta: Option<&HashMap<String, String>>);
    fn error(&self, message: &str, meta: Option<&HashMap<String, String>>);
}

/// Simple console logger implementation
#[derive(Debug, Clone, Default)]
pub struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn debug(&self, message: &str, _meta: Option<&HashMap<String, String>>) {
        eprintln!("[DEBUG] {}", message);
    }

    fn info(&self, message: &str, _meta: Option<&HashMap<String, String>>) {
        eprintln!("[INFO] {}", message);
    }

    fn warn(&self, message: &str, _meta: Option<&HashMap<String, String>>) {
        eprintln!("[WARN] {}", message);
    }

    fn error(&self, message: &str, _meta: Option<&HashMap<String, String>>) {
        eprintln!("[ERROR] {}", message);
    }
}

/// Logger that forwards to `tracing`
#[derive(Debug, Clone, Default)]
pub struct TracingLogger;

fn render_meta(meta: Option<&HashMap<String, String>>) -> String {
    let Some(meta) = meta else {
        return String::new();
    };
    let mut pairs: Vec<String> = meta.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
    pairs.sort();
    pairs.join(" ")
}

impl Logger for TracingLogger {
    fn debug(&self, message: &str, meta: Option<&HashMap<String, String>>) {
        tracing::debug!(meta = %render_meta(meta), "{}", message);
    }

    fn info(&self, message: &str, meta: Option<&HashMap<String, String>>) {
        tracing::info!(meta = %render_meta(meta), "{}", message);
    }

    fn warn(&self, message: &str, meta: Option<&HashMap<String, String>>) {
        tracing::warn!(meta = %render_meta(meta), "{}", message);
    }

    fn error(&self, message: &str, meta: Option<&HashMap<String, String>>) {
        tracing::error!(meta = %render_meta(meta), "{}", message);
    }
}

/// No-op logger for testing
#[derive(Debug, Clone, Default)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn debug(&self, _message: &str, _meta: Option<&HashMap<String, String>>) {}
    fn info(&self, _message: &str, _meta: Option<&HashMap<String, String>>) {}
    fn warn(&self, _message: &str, _meta: Option<&HashMap<String, String>>) {}
    fn error(&self, _message: &str, _meta: Option<&HashMap<String, String>>) {}
}

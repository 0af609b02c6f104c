use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::models::{ContactSettings, Setting, Specialization};

// ─── Cached payload ──────────────────────────────────────────────────────────

/// Snapshot of the catalog root, saved after each successful sync so the
/// next launch can paint immediately. Lower levels of the hierarchy are
/// selection-dependent and always refetched live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheData {
    pub cached_at: DateTime<Utc>,
    pub specializations: Vec<Specialization>,
    pub settings: Vec<Setting>,
    pub contact: ContactSettings,
}

// ─── Path ────────────────────────────────────────────────────────────────────

fn cache_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|d| d.join("coursedesk").join("cache.json"))
}

/// Directory the log file lives in (same place as the cache).
pub fn log_dir() -> Option<PathBuf> {
    dirs::cache_dir().map(|d| d.join("coursedesk"))
}

// ─── I/O ─────────────────────────────────────────────────────────────────────

pub fn load_cache() -> Option<CacheData> {
    let path = cache_path()?;
    let contents = std::fs::read_to_string(&path).ok()?;
    serde_json::from_str(&contents).ok()
}

pub fn save_cache(data: &CacheData) -> Result<()> {
    let path = cache_path().ok_or_else(|| anyhow!("Could not determine cache directory"))?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(data)?;
    std::fs::write(&path, json)?;
    Ok(())
}

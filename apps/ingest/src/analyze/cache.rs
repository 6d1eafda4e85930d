use std::path::PathBuf;

use tracing::{debug, warn};

use crate::analyze::AnalysisResult;
use crate::fs_ops;

/// On-disk analysis cache, one JSON file per content fingerprint.
///
/// Failures never propagate: an unreadable entry is a miss and a failed
/// write is logged. There is no locking; one pipeline runs at a time.
#[derive(Debug, Clone)]
pub struct AnalysisCache {
    dir: PathBuf,
    enabled: bool,
}

impl AnalysisCache {
    pub fn new(dir: impl Into<PathBuf>, enabled: bool) -> Self {
        Self {
            dir: dir.into(),
            enabled,
        }
    }

    fn entry_path(&self, fingerprint: &str) -> PathBuf {
        self.dir.join(format!("{fingerprint}.json"))
    }

    pub async fn get(&self, fingerprint: &str) -> Option<AnalysisResult> {
        if !self.enabled {
            return None;
        }
        let path = self.entry_path(fingerprint);
        if !path.exists() {
            return None;
        }
        let body = match fs_ops::read_text(&path).await {
            Ok(body) => body,
            Err(e) => {
                warn!("Error reading analysis cache: {e}");
                return None;
            }
        };
        match serde_json::from_str::<AnalysisResult>(&body) {
            Ok(result) => Some(result),
            Err(e) => {
                warn!("Ignoring corrupt analysis cache entry {}: {e}", path.display());
                None
            }
        }
    }

    pub async fn put(&self, fingerprint: &str, result: &AnalysisResult) {
        if !self.enabled {
            return;
        }
        let path = self.entry_path(fingerprint);
        match fs_ops::write_json(&path, result).await {
            Ok(()) => debug!("Cached analysis at {}", path.display()),
            Err(e) => warn!("Error writing analysis cache: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::schema::validate_resume;
    use crate::analyze::simulated::simulated_resume;
    use crate::models::Provenance;
    use tempfile::TempDir;

    fn sample_result() -> AnalysisResult {
        let data = simulated_resume();
        AnalysisResult {
            success: true,
            validation_result: validate_resume(&data).outcome,
            data,
            content_fingerprint: "abc123".into(),
            model: "gpt-4o".into(),
            cached: false,
            provenance: Provenance::Real,
            source_provenance: Provenance::Real,
        }
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let dir = TempDir::new().unwrap();
        let cache = AnalysisCache::new(dir.path(), true);
        assert!(cache.get("abc123").await.is_none());

        cache.put("abc123", &sample_result()).await;
        let hit = cache.get("abc123").await.unwrap();
        assert_eq!(hit.data, simulated_resume());
        assert!(dir.path().join("abc123.json").exists());
    }

    #[tokio::test]
    async fn test_disabled_cache_never_hits() {
        let dir = TempDir::new().unwrap();
        let cache = AnalysisCache::new(dir.path(), false);
        cache.put("abc123", &sample_result()).await;
        assert!(cache.get("abc123").await.is_none());
        assert!(!dir.path().join("abc123.json").exists());
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_a_miss() {
        let dir = TempDir::new().unwrap();
        tokio::fs::write(dir.path().join("abc123.json"), "{not json")
            .await
            .unwrap();
        let cache = AnalysisCache::new(dir.path(), true);
        assert!(cache.get("abc123").await.is_none());
    }
}

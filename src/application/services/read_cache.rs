use crate::domain::entities::Occurrence;
use crate::domain::entities::offline::CacheSnapshot;
use crate::infrastructure::storage::DurableStore;
use crate::shared::config::CacheConfig;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

pub const CACHE_KEY: &str = "occurrences_cache";

/// 最後に取得できた一覧を保持するキャッシュ
///
/// 古さは表示用の情報にとどめ、期限切れで削除することはない。
pub struct ReadCache {
    store: Arc<DurableStore>,
    stale_after: Duration,
}

impl ReadCache {
    pub fn new(store: Arc<DurableStore>, config: &CacheConfig) -> Self {
        Self::with_stale_after(store, config.stale_after())
    }

    pub fn with_stale_after(store: Arc<DurableStore>, stale_after: Duration) -> Self {
        Self { store, stale_after }
    }

    pub async fn get_snapshot(&self) -> Option<CacheSnapshot> {
        let bytes = self.store.read(CACHE_KEY).await?;
        match serde_json::from_slice::<CacheSnapshot>(&bytes) {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                tracing::warn!(
                    target: "offline::cache",
                    error = %err,
                    "cached listing is unreadable; ignoring it"
                );
                None
            }
        }
    }

    /// 取得結果でスナップショットを丸ごと置き換える
    pub async fn put_snapshot(&self, records: Vec<Occurrence>) -> CacheSnapshot {
        let snapshot = CacheSnapshot::new(records, Utc::now());
        match serde_json::to_vec(&snapshot) {
            Ok(bytes) => {
                self.store.write(CACHE_KEY, &bytes).await;
                tracing::debug!(
                    target: "offline::cache",
                    records = snapshot.len(),
                    "listing snapshot replaced"
                );
            }
            Err(err) => {
                tracing::error!(
                    target: "offline::cache",
                    error = %err,
                    "failed to encode listing snapshot"
                );
            }
        }
        snapshot
    }

    pub async fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.get_snapshot().await.map(|snapshot| snapshot.fetched_at)
    }

    /// スナップショットが無い場合も「古い」とみなす
    pub async fn is_stale(&self, now: DateTime<Utc>) -> bool {
        match self.get_snapshot().await {
            Some(snapshot) => snapshot.is_older_than(self.stale_after, now),
            None => true,
        }
    }

    pub async fn clear(&self) {
        self.store.remove(CACHE_KEY).await;
    }
}

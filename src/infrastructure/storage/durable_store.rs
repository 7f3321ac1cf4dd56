use crate::application::ports::KeyValueStore;
use crate::infrastructure::storage::MemoryKeyValueStore;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// 各コンポーネントが使う永続化の窓口
///
/// 失敗を呼び出し側へ返さない。最初の書き込み失敗以降はセッション中ずっと
/// 縮退モードとなり、値はメモリ上のオーバーレイに保持される。オーバーレイに
/// あるキーはバックエンドより優先される（`None` は削除済みを表す）。
pub struct DurableStore {
    backend: Arc<dyn KeyValueStore>,
    overlay: RwLock<HashMap<String, Option<Vec<u8>>>>,
    degraded: AtomicBool,
}

impl DurableStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            backend,
            overlay: RwLock::new(HashMap::new()),
            degraded: AtomicBool::new(false),
        }
    }

    /// 永続化しないセッション限りのストア
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryKeyValueStore::new()))
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::SeqCst)
    }

    pub async fn read(&self, key: &str) -> Option<Vec<u8>> {
        if self.is_degraded() {
            if let Some(entry) = self.overlay.read().await.get(key) {
                return entry.clone();
            }
        }

        match self.backend.read(key).await {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(
                    target: "offline::store",
                    key,
                    error = %err,
                    "durable store read failed; treating as empty"
                );
                None
            }
        }
    }

    pub async fn write(&self, key: &str, value: &[u8]) {
        if !self.is_degraded() {
            match self.backend.write(key, value).await {
                Ok(()) => return,
                Err(err) => self.enter_degraded("write", key, &err.to_string()),
            }
        }
        self.overlay
            .write()
            .await
            .insert(key.to_string(), Some(value.to_vec()));
    }

    pub async fn remove(&self, key: &str) {
        if !self.is_degraded() {
            match self.backend.remove(key).await {
                Ok(()) => return,
                Err(err) => self.enter_degraded("remove", key, &err.to_string()),
            }
        }
        self.overlay.write().await.insert(key.to_string(), None);
    }

    fn enter_degraded(&self, operation: &str, key: &str, error: &str) {
        if !self.degraded.swap(true, Ordering::SeqCst) {
            tracing::warn!(
                target: "offline::store",
                operation,
                key,
                error,
                "durable store unavailable; keeping data in memory for this session"
            );
        }
    }
}

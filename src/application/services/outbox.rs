use crate::domain::entities::offline::QueuedItem;
use crate::domain::value_objects::{OccurrencePayload, QueueItemId, QueueItemStatus};
use crate::infrastructure::storage::DurableStore;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};

pub const OUTBOX_KEY: &str = "occurrence_outbox";

/// キュー内容が変化したことだけを伝える通知
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueChanged;

/// 未送信の作成リクエストを保持する永続キュー
///
/// すべての変更はリスト全体の読み込み→変更→書き戻しで行い、
/// `gate` によってプロセス内で直列化する。
pub struct OutboxQueue {
    store: Arc<DurableStore>,
    gate: Mutex<()>,
    changes: broadcast::Sender<QueueChanged>,
}

impl OutboxQueue {
    pub fn new(store: Arc<DurableStore>) -> Self {
        let (changes, _) = broadcast::channel(64);
        Self {
            store,
            gate: Mutex::new(()),
            changes,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<QueueChanged> {
        self.changes.subscribe()
    }

    pub async fn enqueue(&self, payload: OccurrencePayload) -> QueuedItem {
        let _guard = self.gate.lock().await;
        let mut items = self.load().await;
        let item = QueuedItem::new(payload);
        items.push(item.clone());
        self.persist(&items).await;

        tracing::info!(
            target: "offline::outbox",
            id = %item.id,
            pending = items.len(),
            "occurrence queued for sync"
        );
        item
    }

    /// 追加順の一覧
    pub async fn list(&self) -> Vec<QueuedItem> {
        self.load().await
    }

    pub async fn get(&self, id: &QueueItemId) -> Option<QueuedItem> {
        self.load().await.into_iter().find(|item| &item.id == id)
    }

    /// ステータスに関係なくキュー内の件数
    pub async fn pending_count(&self) -> usize {
        self.load().await.len()
    }

    pub async fn has_pending(&self) -> bool {
        self.pending_count().await > 0
    }

    pub async fn failed_items(&self) -> Vec<QueuedItem> {
        self.load()
            .await
            .into_iter()
            .filter(|item| item.status.is_failed())
            .collect()
    }

    /// `syncing` へ遷移させ、同じ書き込みで試行回数を加算する
    pub async fn mark_syncing(&self, id: &QueueItemId) -> Option<QueuedItem> {
        self.update(id, QueuedItem::begin_attempt).await
    }

    pub async fn mark_failed(&self, id: &QueueItemId) -> Option<QueuedItem> {
        self.update(id, QueuedItem::mark_failed).await
    }

    pub async fn remove(&self, id: &QueueItemId) -> Option<QueuedItem> {
        let _guard = self.gate.lock().await;
        let mut items = self.load().await;
        let index = items.iter().position(|item| &item.id == id)?;
        let removed = items.remove(index);
        self.persist(&items).await;
        Some(removed)
    }

    /// `failed_sync` の項目をすべて破棄し、破棄した件数を返す
    pub async fn clear_failed(&self) -> usize {
        let _guard = self.gate.lock().await;
        let mut items = self.load().await;
        let before = items.len();
        items.retain(|item| item.status != QueueItemStatus::FailedSync);
        let cleared = before - items.len();
        if cleared > 0 {
            self.persist(&items).await;
            tracing::info!(target: "offline::outbox", cleared, "failed items discarded");
        }
        cleared
    }

    async fn update<F>(&self, id: &QueueItemId, apply: F) -> Option<QueuedItem>
    where
        F: FnOnce(&mut QueuedItem),
    {
        let _guard = self.gate.lock().await;
        let mut items = self.load().await;
        let item = items.iter_mut().find(|item| &item.id == id)?;
        apply(item);
        let updated = item.clone();
        self.persist(&items).await;
        Some(updated)
    }

    async fn load(&self) -> Vec<QueuedItem> {
        let Some(bytes) = self.store.read(OUTBOX_KEY).await else {
            return Vec::new();
        };
        match serde_json::from_slice::<Vec<QueuedItem>>(&bytes) {
            Ok(items) => items,
            Err(err) => {
                tracing::warn!(
                    target: "offline::outbox",
                    error = %err,
                    "persisted outbox is unreadable; starting with an empty queue"
                );
                Vec::new()
            }
        }
    }

    async fn persist(&self, items: &[QueuedItem]) {
        match serde_json::to_vec(items) {
            Ok(bytes) => {
                self.store.write(OUTBOX_KEY, &bytes).await;
                // 受信者がいない場合の送信エラーは無視してよい
                let _ = self.changes.send(QueueChanged);
            }
            Err(err) => {
                tracing::error!(
                    target: "offline::outbox",
                    error = %err,
                    "failed to encode outbox"
                );
            }
        }
    }
}

use crate::application::ports::OccurrenceSubmitter;
use crate::application::services::connectivity::ConnectivityMonitor;
use crate::application::services::outbox::{OutboxQueue, QueueChanged};
use crate::application::services::read_cache::ReadCache;
use crate::application::services::reconciler::Reconciler;
use crate::domain::entities::Occurrence;
use crate::domain::entities::offline::{
    CacheSnapshot, DrainOutcome, QueuedItem, RetryOutcome, SyncNotice,
};
use crate::domain::value_objects::{OccurrencePayload, QueueItemId};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::broadcast;

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    /// サーバーが受理した
    Submitted(Occurrence),
    /// アウトボックスに保存した
    Queued(QueuedItem),
}

/// UI 層に渡すサービス。永続化には直接触れさせない。
#[derive(Clone)]
pub struct OfflineSyncService {
    outbox: Arc<OutboxQueue>,
    cache: Arc<ReadCache>,
    monitor: Arc<ConnectivityMonitor>,
    reconciler: Arc<Reconciler>,
    submitter: Arc<dyn OccurrenceSubmitter>,
    notices: broadcast::Sender<SyncNotice>,
}

impl OfflineSyncService {
    pub fn new(
        outbox: Arc<OutboxQueue>,
        cache: Arc<ReadCache>,
        monitor: Arc<ConnectivityMonitor>,
        reconciler: Arc<Reconciler>,
        submitter: Arc<dyn OccurrenceSubmitter>,
        notices: broadcast::Sender<SyncNotice>,
    ) -> Self {
        Self {
            outbox,
            cache,
            monitor,
            reconciler,
            submitter,
            notices,
        }
    }

    pub async fn enqueue(&self, payload: OccurrencePayload) -> QueuedItem {
        let item = self.outbox.enqueue(payload).await;
        let _ = self.notices.send(SyncNotice::Queued);
        item
    }

    /// オンラインなら直接送信し、失敗時やオフライン時はキューに積む
    pub async fn submit_or_enqueue(&self, payload: OccurrencePayload) -> SubmissionOutcome {
        if self.monitor.is_online() {
            match self.submitter.submit(&payload).await {
                Ok(created) => return SubmissionOutcome::Submitted(created),
                Err(err) => {
                    tracing::warn!(
                        target: "offline::outbox",
                        error = %err,
                        "direct submission failed; queueing occurrence"
                    );
                }
            }
        }
        SubmissionOutcome::Queued(self.enqueue(payload).await)
    }

    pub async fn pending_count(&self) -> usize {
        self.outbox.pending_count().await
    }

    pub async fn list_queue(&self) -> Vec<QueuedItem> {
        self.outbox.list().await
    }

    pub async fn failed_items(&self) -> Vec<QueuedItem> {
        self.outbox.failed_items().await
    }

    pub async fn clear_failed(&self) -> usize {
        self.outbox.clear_failed().await
    }

    pub async fn retry_item(&self, id: &QueueItemId) -> RetryOutcome {
        self.reconciler.retry_item(id).await
    }

    pub async fn retry_all(&self) -> DrainOutcome {
        self.reconciler.drain().await
    }

    pub async fn cached_records(&self) -> Vec<Occurrence> {
        self.cache
            .get_snapshot()
            .await
            .map(|snapshot| snapshot.records)
            .unwrap_or_default()
    }

    pub async fn cache_snapshot(&self) -> Option<CacheSnapshot> {
        self.cache.get_snapshot().await
    }

    pub async fn is_cache_stale(&self) -> bool {
        self.cache.is_stale(Utc::now()).await
    }

    pub fn subscribe_queue(&self) -> broadcast::Receiver<QueueChanged> {
        self.outbox.subscribe()
    }

    pub fn is_online(&self) -> bool {
        self.monitor.is_online()
    }
}

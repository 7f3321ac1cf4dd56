use crate::application::ports::{OccurrenceLister, OccurrenceSubmitter};
use crate::application::services::outbox::OutboxQueue;
use crate::application::services::read_cache::ReadCache;
use crate::domain::entities::offline::{CacheSnapshot, DrainOutcome, DrainResult, RetryOutcome};
use crate::domain::value_objects::QueueItemId;
use crate::shared::config::SyncConfig;
use crate::shared::error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, RwLock};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReconcilerStatus {
    pub is_draining: bool,
    pub last_drain_at: Option<DateTime<Utc>>,
    pub last_result: Option<DrainResult>,
}

enum Attempt {
    Synced,
    Failed,
    Vanished,
}

/// 実行中フラグを解除する RAII ガード
struct DrainGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// アウトボックスをサーバーへ送り出し、一覧キャッシュを更新する
pub struct Reconciler {
    outbox: Arc<OutboxQueue>,
    cache: Arc<ReadCache>,
    submitter: Arc<dyn OccurrenceSubmitter>,
    lister: Arc<dyn OccurrenceLister>,
    listing_page: u32,
    listing_page_size: u32,
    draining: AtomicBool,
    refresh_gate: Mutex<()>,
    last_drain: RwLock<Option<(DateTime<Utc>, DrainResult)>>,
}

impl Reconciler {
    pub fn new(
        outbox: Arc<OutboxQueue>,
        cache: Arc<ReadCache>,
        submitter: Arc<dyn OccurrenceSubmitter>,
        lister: Arc<dyn OccurrenceLister>,
        config: &SyncConfig,
    ) -> Self {
        Self {
            outbox,
            cache,
            submitter,
            lister,
            listing_page: config.listing_page,
            listing_page_size: config.listing_page_size,
            draining: AtomicBool::new(false),
            refresh_gate: Mutex::new(()),
            last_drain: RwLock::new(None),
        }
    }

    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::SeqCst)
    }

    pub async fn status(&self) -> ReconcilerStatus {
        let last = *self.last_drain.read().await;
        ReconcilerStatus {
            is_draining: self.is_draining(),
            last_drain_at: last.map(|(at, _)| at),
            last_result: last.map(|(_, result)| result),
        }
    }

    /// キュー内の全項目を順番に送信する。実行中なら即座に戻る。
    pub async fn drain(&self) -> DrainOutcome {
        let Some(_guard) = self.try_begin() else {
            tracing::debug!(target: "offline::reconciler", "drain already in progress");
            return DrainOutcome::AlreadyRunning;
        };

        let items = self.outbox.list().await;
        if items.is_empty() {
            let result = DrainResult::empty();
            self.record(result).await;
            return DrainOutcome::Completed(result);
        }

        tracing::info!(
            target: "offline::reconciler",
            queued = items.len(),
            "draining outbox"
        );

        let mut synced = 0u32;
        let mut failed = 0u32;
        for item in items {
            match self.attempt(&item.id).await {
                Attempt::Synced => synced += 1,
                Attempt::Failed => failed += 1,
                Attempt::Vanished => {}
            }
        }

        let refreshed = match self.refresh().await {
            Ok(_) => true,
            Err(err) => {
                tracing::warn!(
                    target: "offline::reconciler",
                    error = %err,
                    "listing refresh after drain failed"
                );
                false
            }
        };

        let result = DrainResult::new(synced, failed, refreshed);
        self.record(result).await;
        tracing::info!(
            target: "offline::reconciler",
            synced,
            failed,
            refreshed,
            "drain completed"
        );
        DrainOutcome::Completed(result)
    }

    /// 1 件だけ再送する。ドレインとは同じガードを共有する。
    pub async fn retry_item(&self, id: &QueueItemId) -> RetryOutcome {
        let Some(_guard) = self.try_begin() else {
            return RetryOutcome::DrainInProgress;
        };

        match self.attempt(id).await {
            Attempt::Vanished => RetryOutcome::NotFound,
            Attempt::Failed => RetryOutcome::Failed,
            Attempt::Synced => {
                if let Err(err) = self.refresh().await {
                    tracing::warn!(
                        target: "offline::reconciler",
                        error = %err,
                        "listing refresh after retry failed"
                    );
                }
                RetryOutcome::Synced
            }
        }
    }

    /// 一覧を取得してキャッシュを置き換える
    ///
    /// 取得から書き込みまでを直列化し、後から要求した取得結果が常に最後に残る。
    pub async fn refresh(&self) -> Result<CacheSnapshot, AppError> {
        let _gate = self.refresh_gate.lock().await;
        let page = self
            .lister
            .list(self.listing_page, self.listing_page_size)
            .await?;
        Ok(self.cache.put_snapshot(page.content).await)
    }

    fn try_begin(&self) -> Option<DrainGuard<'_>> {
        self.draining
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| DrainGuard {
                flag: &self.draining,
            })
    }

    async fn attempt(&self, id: &QueueItemId) -> Attempt {
        // 別インスタンスが先に処理した場合は送信しない
        let Some(item) = self.outbox.mark_syncing(id).await else {
            tracing::debug!(target: "offline::reconciler", id = %id, "queued item vanished");
            return Attempt::Vanished;
        };

        match self.submitter.submit(&item.payload).await {
            Ok(created) => {
                self.outbox.remove(id).await;
                tracing::debug!(
                    target: "offline::reconciler",
                    id = %id,
                    server_id = %created.id,
                    "queued occurrence accepted"
                );
                Attempt::Synced
            }
            Err(err) => {
                self.outbox.mark_failed(id).await;
                tracing::warn!(
                    target: "offline::reconciler",
                    id = %id,
                    attempts = item.attempts,
                    error = %err,
                    "queued occurrence submission failed"
                );
                Attempt::Failed
            }
        }
    }

    async fn record(&self, result: DrainResult) {
        *self.last_drain.write().await = Some((Utc::now(), result));
    }
}

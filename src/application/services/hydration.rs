use crate::application::services::connectivity::ConnectivityMonitor;
use crate::application::services::read_cache::ReadCache;
use crate::application::services::reconciler::Reconciler;
use crate::domain::entities::Occurrence;
use crate::domain::entities::offline::{DrainOutcome, SyncNotice};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{Mutex, broadcast, watch};
use tokio::task::JoinHandle;

pub type PublishedRecords = Arc<Vec<Occurrence>>;

/// 起動時にキャッシュ→ネットワークの順で一覧を組み立て、再接続時の同期を配線する
pub struct HydrationOrchestrator {
    cache: Arc<ReadCache>,
    reconciler: Arc<Reconciler>,
    monitor: Arc<ConnectivityMonitor>,
    reconnect_debounce: Duration,
    records: watch::Sender<PublishedRecords>,
    publish_gate: Mutex<()>,
    notices: broadcast::Sender<SyncNotice>,
}

/// 再接続リスナーの寿命を持つハンドル。破棄するとリスナーも止まる
#[must_use = "dropping the handle stops the reconnect listener"]
pub struct HydrationHandle {
    refresh: Option<JoinHandle<()>>,
    listener: JoinHandle<()>,
}

impl HydrationHandle {
    /// 起動時の一覧取得が終わるまで待つ
    pub async fn initial_refresh(&mut self) {
        if let Some(task) = self.refresh.take() {
            if let Err(err) = task.await {
                tracing::error!(
                    target: "offline::hydration",
                    error = %err,
                    "initial refresh task aborted"
                );
            }
        }
    }

    pub fn shutdown(self) {
        drop(self);
    }
}

impl Drop for HydrationHandle {
    fn drop(&mut self) {
        self.listener.abort();
    }
}

impl HydrationOrchestrator {
    pub fn new(
        cache: Arc<ReadCache>,
        reconciler: Arc<Reconciler>,
        monitor: Arc<ConnectivityMonitor>,
        reconnect_debounce: Duration,
    ) -> Self {
        let (records, _) = watch::channel(Arc::new(Vec::new()));
        let (notices, _) = broadcast::channel(32);
        Self {
            cache,
            reconciler,
            monitor,
            reconnect_debounce,
            records,
            publish_gate: Mutex::new(()),
            notices,
        }
    }

    pub fn records(&self) -> watch::Receiver<PublishedRecords> {
        self.records.subscribe()
    }

    pub fn current_records(&self) -> PublishedRecords {
        self.records.borrow().clone()
    }

    pub fn subscribe_notices(&self) -> broadcast::Receiver<SyncNotice> {
        self.notices.subscribe()
    }

    pub fn notice_sender(&self) -> broadcast::Sender<SyncNotice> {
        self.notices.clone()
    }

    pub async fn start(self: &Arc<Self>) -> HydrationHandle {
        // キャッシュを先に表示する
        let snapshot = self.cache.get_snapshot().await;
        if let Some(snapshot) = snapshot.as_ref().filter(|s| !s.is_empty()) {
            self.publish(snapshot.records.clone());
            tracing::debug!(
                target: "offline::hydration",
                records = snapshot.len(),
                "published cached listing"
            );
            if !self.monitor.is_online() {
                self.notify(SyncNotice::ShowingCached {
                    count: snapshot.len(),
                    fetched_at: snapshot.fetched_at,
                });
            }
        }

        // 購読はタスク生成前に行い、直後の遷移も取りこぼさない
        let mut came_online = self.monitor.subscribe_came_online();
        let listener = {
            let this = Arc::clone(self);
            tokio::spawn(async move {
                loop {
                    match came_online.recv().await {
                        Ok(_) | Err(RecvError::Lagged(_)) => this.on_came_online().await,
                        Err(RecvError::Closed) => break,
                    }
                }
            })
        };

        let refresh = {
            let this = Arc::clone(self);
            tokio::spawn(async move { this.refresh_and_publish().await })
        };

        HydrationHandle {
            refresh: Some(refresh),
            listener,
        }
    }

    async fn on_came_online(&self) {
        tokio::time::sleep(self.reconnect_debounce).await;
        if !self.monitor.is_online() {
            tracing::debug!(
                target: "offline::hydration",
                "went offline again during debounce; skipping drain"
            );
            return;
        }

        let result = match self.reconciler.drain().await {
            DrainOutcome::Completed(result) => result,
            DrainOutcome::AlreadyRunning => return,
        };

        if result.synced > 0 {
            self.notify(SyncNotice::Synced {
                count: result.synced,
            });
        }
        if result.failed > 0 {
            self.notify(SyncNotice::WillRetry {
                count: result.failed,
            });
        }

        if result.refreshed {
            self.publish_latest().await;
        } else {
            self.refresh_and_publish().await;
        }
    }

    async fn refresh_and_publish(&self) {
        match self.reconciler.refresh().await {
            Ok(snapshot) => {
                tracing::debug!(
                    target: "offline::hydration",
                    records = snapshot.len(),
                    "listing refreshed"
                );
                self.publish_latest().await;
            }
            Err(err) => {
                let has_cached = self
                    .cache
                    .get_snapshot()
                    .await
                    .is_some_and(|snapshot| !snapshot.is_empty());
                tracing::warn!(
                    target: "offline::hydration",
                    error = %err,
                    has_cached,
                    "listing refresh failed"
                );
                self.notify(if has_cached {
                    SyncNotice::RefreshFailedShowingCached
                } else {
                    SyncNotice::LoadFailed
                });
            }
        }
    }

    /// 取得後はキャッシュの最新内容を公開する。並行した更新でも古い一覧に戻らない
    async fn publish_latest(&self) {
        let _gate = self.publish_gate.lock().await;
        if let Some(snapshot) = self.cache.get_snapshot().await {
            self.publish(snapshot.records);
        }
    }

    fn publish(&self, records: Vec<Occurrence>) {
        self.records.send_replace(Arc::new(records));
    }

    fn notify(&self, notice: SyncNotice) {
        let _ = self.notices.send(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{OccurrenceLister, OccurrenceSubmitter, Page};
    use crate::application::services::connectivity::{ConnectivityEvent, ConnectivityState};
    use crate::application::services::outbox::OutboxQueue;
    use crate::domain::value_objects::OccurrencePayload;
    use crate::infrastructure::storage::DurableStore;
    use crate::shared::config::SyncConfig;
    use crate::shared::error::AppError;
    use async_trait::async_trait;
    use mockall::mock;
    use serde_json::json;

    mock! {
        pub Submitter {}

        #[async_trait]
        impl OccurrenceSubmitter for Submitter {
            async fn submit(&self, payload: &OccurrencePayload) -> Result<Occurrence, AppError>;
        }
    }

    mock! {
        pub Lister {}

        #[async_trait]
        impl OccurrenceLister for Lister {
            async fn list(&self, page: u32, size: u32) -> Result<Page<Occurrence>, AppError>;
        }
    }

    fn record(id: &str) -> Occurrence {
        serde_json::from_value(json!({"id": id, "description": format!("record {id}")})).unwrap()
    }

    struct Fixture {
        cache: Arc<ReadCache>,
        outbox: Arc<OutboxQueue>,
        monitor: Arc<ConnectivityMonitor>,
        orchestrator: Arc<HydrationOrchestrator>,
    }

    fn fixture(
        initial: ConnectivityState,
        submitter: MockSubmitter,
        lister: MockLister,
    ) -> Fixture {
        let store = Arc::new(DurableStore::in_memory());
        let outbox = Arc::new(OutboxQueue::new(store.clone()));
        let cache = Arc::new(ReadCache::with_stale_after(store, chrono::Duration::days(7)));
        let monitor = Arc::new(ConnectivityMonitor::new(initial));
        let reconciler = Arc::new(Reconciler::new(
            outbox.clone(),
            cache.clone(),
            Arc::new(submitter),
            Arc::new(lister),
            &SyncConfig::default(),
        ));
        let orchestrator = Arc::new(HydrationOrchestrator::new(
            cache.clone(),
            reconciler,
            monitor.clone(),
            Duration::from_millis(1_000),
        ));
        Fixture {
            cache,
            outbox,
            monitor,
            orchestrator,
        }
    }

    fn failing_lister() -> MockLister {
        let mut lister = MockLister::new();
        lister
            .expect_list()
            .returning(|_, _| Err(AppError::Network("unreachable".into())));
        lister
    }

    #[tokio::test]
    async fn offline_start_shows_cached_records_then_keeps_them_on_failure() {
        let fx = fixture(
            ConnectivityState::Offline,
            MockSubmitter::new(),
            failing_lister(),
        );
        fx.cache
            .put_snapshot((0..5).map(|i| record(&i.to_string())).collect())
            .await;
        let mut notices = fx.orchestrator.subscribe_notices();

        let mut handle = fx.orchestrator.start().await;
        assert_eq!(fx.orchestrator.current_records().len(), 5);
        handle.initial_refresh().await;

        assert!(matches!(
            notices.recv().await.unwrap(),
            SyncNotice::ShowingCached { count: 5, .. }
        ));
        assert_eq!(
            notices.recv().await.unwrap(),
            SyncNotice::RefreshFailedShowingCached
        );
        assert_eq!(fx.orchestrator.current_records().len(), 5);
        assert_eq!(fx.cache.get_snapshot().await.unwrap().len(), 5);
        handle.shutdown();
    }

    #[tokio::test]
    async fn failure_without_cache_reports_load_failed() {
        let fx = fixture(
            ConnectivityState::Online,
            MockSubmitter::new(),
            failing_lister(),
        );
        let mut notices = fx.orchestrator.subscribe_notices();

        let mut handle = fx.orchestrator.start().await;
        handle.initial_refresh().await;

        assert_eq!(notices.recv().await.unwrap(), SyncNotice::LoadFailed);
        assert!(fx.orchestrator.current_records().is_empty());
        handle.shutdown();
    }

    #[tokio::test]
    async fn successful_refresh_replaces_snapshot_and_republishes() {
        let mut lister = MockLister::new();
        lister
            .expect_list()
            .returning(|_, _| Ok(Page::single(vec![record("a"), record("b")])));
        let fx = fixture(ConnectivityState::Online, MockSubmitter::new(), lister);
        fx.cache.put_snapshot(vec![record("old")]).await;
        let mut records = fx.orchestrator.records();

        let mut handle = fx.orchestrator.start().await;
        handle.initial_refresh().await;

        let published = records.borrow_and_update().clone();
        let ids: Vec<&str> = published.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(fx.cache.get_snapshot().await.unwrap().len(), 2);
        handle.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn reconnect_drains_after_debounce() {
        let mut submitter = MockSubmitter::new();
        submitter.expect_submit().times(1).returning(|payload| {
            Ok(serde_json::from_value(json!({
                "id": "srv-1",
                "description": payload.description().unwrap_or_default()
            }))
            .unwrap())
        });
        let mut lister = MockLister::new();
        let mut calls = 0;
        lister.expect_list().returning(move |_, _| {
            calls += 1;
            if calls == 1 {
                Err(AppError::Network("offline".into()))
            } else {
                Ok(Page::single(vec![record("srv-1")]))
            }
        });
        let fx = fixture(ConnectivityState::Offline, submitter, lister);
        let mut notices = fx.orchestrator.subscribe_notices();
        let mut handle = fx.orchestrator.start().await;
        handle.initial_refresh().await;
        assert_eq!(notices.recv().await.unwrap(), SyncNotice::LoadFailed);

        fx.outbox
            .enqueue(OccurrencePayload::new(json!({"description": "pole out"})).unwrap())
            .await;
        fx.monitor.handle_event(ConnectivityEvent::Online);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(fx.outbox.pending_count().await, 1);

        assert_eq!(
            notices.recv().await.unwrap(),
            SyncNotice::Synced { count: 1 }
        );
        assert_eq!(fx.outbox.pending_count().await, 0);
        let mut records = fx.orchestrator.records();
        records
            .wait_for(|records| records.iter().any(|r| r.id == "srv-1"))
            .await
            .unwrap();
        handle.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn going_offline_during_debounce_skips_drain() {
        let mut submitter = MockSubmitter::new();
        submitter.expect_submit().never();
        let mut lister = MockLister::new();
        lister
            .expect_list()
            .returning(|_, _| Ok(Page::single(Vec::new())));
        let fx = fixture(ConnectivityState::Offline, submitter, lister);
        let mut handle = fx.orchestrator.start().await;
        handle.initial_refresh().await;
        fx.outbox
            .enqueue(OccurrencePayload::new(json!({"description": "x"})).unwrap())
            .await;

        fx.monitor.handle_event(ConnectivityEvent::Online);
        tokio::time::sleep(Duration::from_millis(200)).await;
        fx.monitor.handle_event(ConnectivityEvent::Offline);
        tokio::time::sleep(Duration::from_millis(2_000)).await;

        assert_eq!(fx.outbox.pending_count().await, 1);
        handle.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_handle_stops_the_reconnect_listener() {
        let mut submitter = MockSubmitter::new();
        submitter.expect_submit().never();
        let mut lister = MockLister::new();
        lister
            .expect_list()
            .times(1)
            .returning(|_, _| Ok(Page::single(Vec::new())));
        let fx = fixture(ConnectivityState::Offline, submitter, lister);
        let mut handle = fx.orchestrator.start().await;
        handle.initial_refresh().await;
        fx.outbox
            .enqueue(OccurrencePayload::new(json!({"description": "x"})).unwrap())
            .await;

        drop(handle);
        tokio::task::yield_now().await;
        fx.monitor.handle_event(ConnectivityEvent::Online);
        tokio::time::sleep(Duration::from_millis(2_000)).await;

        assert_eq!(fx.outbox.pending_count().await, 1);
        assert_eq!(Arc::strong_count(&fx.orchestrator), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn reconnect_with_empty_outbox_still_refreshes() {
        let mut lister = MockLister::new();
        let mut calls = 0;
        lister.expect_list().times(2).returning(move |_, _| {
            calls += 1;
            Ok(Page::single(vec![record(&format!("v{calls}"))]))
        });
        let fx = fixture(ConnectivityState::Offline, MockSubmitter::new(), lister);
        let mut handle = fx.orchestrator.start().await;
        handle.initial_refresh().await;

        fx.monitor.handle_event(ConnectivityEvent::Online);

        let mut records = fx.orchestrator.records();
        records
            .wait_for(|records| records.iter().any(|r| r.id == "v2"))
            .await
            .unwrap();
        handle.shutdown();
    }
}

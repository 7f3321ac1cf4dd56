use crate::application::ports::{KeyValueStore, OccurrenceLister, OccurrenceSubmitter};
use crate::application::services::{
    ConnectivityMonitor, ConnectivityState, HydrationOrchestrator, OfflineSyncService,
    OutboxQueue, ReadCache, Reconciler,
};
use crate::infrastructure::api::HttpOccurrenceApi;
use crate::infrastructure::storage::{Database, DurableStore, SqliteKeyValueStore};
use crate::shared::config::AppConfig;
use crate::shared::error::AppError;
use std::sync::Arc;
use tracing::info;

/// オフライン同期の各コンポーネントをまとめて保持する
#[derive(Clone)]
pub struct SyncState {
    pub store: Arc<DurableStore>,
    pub outbox: Arc<OutboxQueue>,
    pub cache: Arc<ReadCache>,
    pub monitor: Arc<ConnectivityMonitor>,
    pub reconciler: Arc<Reconciler>,
    pub hydration: Arc<HydrationOrchestrator>,
    pub service: OfflineSyncService,
}

impl SyncState {
    /// SQLite ストアと HTTP クライアントで組み立てる
    pub async fn initialize(
        config: &AppConfig,
        initial: ConnectivityState,
    ) -> Result<Self, AppError> {
        config.validate().map_err(AppError::ConfigurationError)?;

        let pool = Database::initialize(&config.storage.database_url).await?;
        let backend: Arc<dyn KeyValueStore> = Arc::new(SqliteKeyValueStore::new(pool));
        let api = Arc::new(HttpOccurrenceApi::new(&config.api)?);

        info!(
            target: "offline::store",
            api = %config.api.base_url,
            online = initial.is_online(),
            "offline sync initialized"
        );

        Ok(Self::assemble(config, backend, api.clone(), api, initial))
    }

    pub fn assemble(
        config: &AppConfig,
        backend: Arc<dyn KeyValueStore>,
        submitter: Arc<dyn OccurrenceSubmitter>,
        lister: Arc<dyn OccurrenceLister>,
        initial: ConnectivityState,
    ) -> Self {
        let store = Arc::new(DurableStore::new(backend));
        let outbox = Arc::new(OutboxQueue::new(store.clone()));
        let cache = Arc::new(ReadCache::new(store.clone(), &config.cache));
        let monitor = Arc::new(ConnectivityMonitor::new(initial));
        let reconciler = Arc::new(Reconciler::new(
            outbox.clone(),
            cache.clone(),
            submitter.clone(),
            lister,
            &config.sync,
        ));
        let hydration = Arc::new(HydrationOrchestrator::new(
            cache.clone(),
            reconciler.clone(),
            monitor.clone(),
            config.sync.reconnect_debounce(),
        ));
        let service = OfflineSyncService::new(
            outbox.clone(),
            cache.clone(),
            monitor.clone(),
            reconciler.clone(),
            submitter,
            hydration.notice_sender(),
        );

        Self {
            store,
            outbox,
            cache,
            monitor,
            reconciler,
            hydration,
            service,
        }
    }
}

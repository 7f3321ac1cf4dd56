pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;
pub mod state;

pub use application::services::{
    ConnectivityEvent, ConnectivityMonitor, ConnectivityState, HydrationHandle,
    HydrationOrchestrator, OfflineSyncService, OutboxQueue, ReadCache, Reconciler,
    SubmissionOutcome,
};
pub use shared::{AppConfig, AppError, Result};
pub use state::SyncState;

/// ログ設定の初期化（`RUST_LOG` が優先される）
pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "occurrence_sync=debug,offline=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

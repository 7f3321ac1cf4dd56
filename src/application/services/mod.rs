pub mod connectivity;
pub mod hydration;
pub mod offline_sync_service;
pub mod outbox;
pub mod read_cache;
pub mod reconciler;

pub use connectivity::{CameOnline, ConnectivityEvent, ConnectivityMonitor, ConnectivityState};
pub use hydration::{HydrationHandle, HydrationOrchestrator, PublishedRecords};
pub use offline_sync_service::{OfflineSyncService, SubmissionOutcome};
pub use outbox::{OutboxQueue, QueueChanged};
pub use read_cache::ReadCache;
pub use reconciler::{Reconciler, ReconcilerStatus};

pub mod cache_snapshot;
pub mod drain_result;
pub mod queued_item;
pub mod sync_notice;

pub use cache_snapshot::CacheSnapshot;
pub use drain_result::{DrainOutcome, DrainResult, RetryOutcome};
pub use queued_item::QueuedItem;
pub use sync_notice::SyncNotice;

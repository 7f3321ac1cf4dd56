pub mod offline;

pub use offline::{OccurrencePayload, QueueItemId, QueueItemStatus};

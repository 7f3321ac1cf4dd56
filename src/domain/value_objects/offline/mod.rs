pub mod occurrence_payload;
pub mod queue_item_id;
pub mod queue_item_status;

pub use occurrence_payload::OccurrencePayload;
pub use queue_item_id::QueueItemId;
pub use queue_item_status::QueueItemStatus;

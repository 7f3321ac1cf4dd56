pub mod durable_store;
pub mod occurrence_api;

pub use durable_store::KeyValueStore;
pub use occurrence_api::{OccurrenceLister, OccurrenceSubmitter, Page};

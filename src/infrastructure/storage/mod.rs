pub mod database;
pub mod durable_store;
pub mod memory_store;
pub mod sqlite_store;

pub use database::{Database, DbPool};
pub use durable_store::DurableStore;
pub use memory_store::MemoryKeyValueStore;
pub use sqlite_store::SqliteKeyValueStore;

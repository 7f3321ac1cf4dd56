use crate::shared::error::AppError;
use async_trait::async_trait;

/// キー単位で不透明なバイト列を永続化するストレージ
///
/// `write` は呼び出し側から見て原子的であること（部分的な値が読まれない）。
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, AppError>;
    async fn write(&self, key: &str, value: &[u8]) -> Result<(), AppError>;
    async fn remove(&self, key: &str) -> Result<(), AppError>;
}

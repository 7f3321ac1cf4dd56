use serde::{Deserialize, Serialize};
use std::fmt;

/// アウトボックス内アイテムの状態。送信成功時はキューから削除されるため
/// `synced` 状態は持たない。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum QueueItemStatus {
    #[default]
    PendingSync,
    Syncing,
    FailedSync,
}

impl QueueItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueueItemStatus::PendingSync => "pending_sync",
            QueueItemStatus::Syncing => "syncing",
            QueueItemStatus::FailedSync => "failed_sync",
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, QueueItemStatus::FailedSync)
    }
}

impl fmt::Display for QueueItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for QueueItemStatus {
    fn from(value: &str) -> Self {
        match value {
            "syncing" => QueueItemStatus::Syncing,
            "failed_sync" => QueueItemStatus::FailedSync,
            // 未知の値は未送信扱いにして次回のドレインで送る
            _ => QueueItemStatus::PendingSync,
        }
    }
}

impl From<String> for QueueItemStatus {
    fn from(value: String) -> Self {
        QueueItemStatus::from(value.as_str())
    }
}

impl From<QueueItemStatus> for String {
    fn from(status: QueueItemStatus) -> Self {
        status.as_str().to_string()
    }
}

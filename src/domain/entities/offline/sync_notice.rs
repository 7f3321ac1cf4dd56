use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// UI に表示する同期関連の通知
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SyncNotice {
    ShowingCached {
        count: usize,
        fetched_at: DateTime<Utc>,
    },
    RefreshFailedShowingCached,
    LoadFailed,
    Synced {
        count: u32,
    },
    WillRetry {
        count: u32,
    },
    Queued,
}

impl SyncNotice {
    pub fn is_error(&self) -> bool {
        matches!(self, SyncNotice::LoadFailed)
    }
}

impl fmt::Display for SyncNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncNotice::ShowingCached { count, fetched_at } => write!(
                f,
                "Offline: showing {} cached occurrence(s) from {}",
                count,
                fetched_at.format("%Y-%m-%d %H:%M UTC")
            ),
            SyncNotice::RefreshFailedShowingCached => {
                write!(f, "Could not refresh occurrences; showing cached data")
            }
            SyncNotice::LoadFailed => write!(f, "Could not load occurrences"),
            SyncNotice::Synced { count } => {
                write!(f, "{} offline occurrence(s) synchronized", count)
            }
            SyncNotice::WillRetry { count } => write!(
                f,
                "{} occurrence(s) failed to synchronize and will be retried",
                count
            ),
            SyncNotice::Queued => write!(
                f,
                "Saved offline; it will be sent when the connection returns"
            ),
        }
    }
}

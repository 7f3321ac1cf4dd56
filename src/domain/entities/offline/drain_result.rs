use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DrainResult {
    pub synced: u32,
    pub failed: u32,
    /// ドレイン後に一覧の再取得とキャッシュ更新まで成功したか
    pub refreshed: bool,
}

impl DrainResult {
    pub fn new(synced: u32, failed: u32, refreshed: bool) -> Self {
        Self {
            synced,
            failed,
            refreshed,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn attempted(&self) -> u32 {
        self.synced + self.failed
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DrainOutcome {
    Completed(DrainResult),
    AlreadyRunning,
}

impl DrainOutcome {
    pub fn result(&self) -> Option<DrainResult> {
        match self {
            DrainOutcome::Completed(result) => Some(*result),
            DrainOutcome::AlreadyRunning => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RetryOutcome {
    Synced,
    Failed,
    NotFound,
    DrainInProgress,
}

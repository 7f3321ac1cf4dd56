use crate::domain::entities::Occurrence;
use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// 最後に取得に成功した一覧のスナップショット
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CacheSnapshot {
    #[serde(default, alias = "occurrences")]
    pub records: Vec<Occurrence>,
    #[serde(with = "chrono::serde::ts_milliseconds", alias = "timestamp")]
    pub fetched_at: DateTime<Utc>,
}

impl CacheSnapshot {
    /// サーバー順を保ったまま ID 重複を除いてスナップショットを作る
    pub fn new(records: Vec<Occurrence>, fetched_at: DateTime<Utc>) -> Self {
        let mut seen = HashSet::with_capacity(records.len());
        let records = records
            .into_iter()
            .filter(|record| seen.insert(record.id.clone()))
            .collect();
        Self {
            records,
            fetched_at: fetched_at.trunc_subsecs(3),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now.signed_duration_since(self.fetched_at)
    }

    pub fn is_older_than(&self, max_age: Duration, now: DateTime<Utc>) -> bool {
        self.age(now) > max_age
    }
}

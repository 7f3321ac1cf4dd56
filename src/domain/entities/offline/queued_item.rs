use crate::domain::value_objects::{OccurrencePayload, QueueItemId, QueueItemStatus};
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueuedItem {
    pub id: QueueItemId,
    pub payload: OccurrencePayload,
    #[serde(default)]
    pub status: QueueItemStatus,
    #[serde(with = "chrono::serde::ts_milliseconds", default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub attempts: u32,
}

impl QueuedItem {
    pub fn new(payload: OccurrencePayload) -> Self {
        Self {
            id: QueueItemId::generate(),
            payload,
            status: QueueItemStatus::PendingSync,
            // 永続化はミリ秒精度なので作成時点で揃えておく
            created_at: Utc::now().trunc_subsecs(3),
            attempts: 0,
        }
    }

    /// 送信試行の開始。結果が分かる前に試行回数を加算する
    pub fn begin_attempt(&mut self) {
        self.status = QueueItemStatus::Syncing;
        self.attempts = self.attempts.saturating_add(1);
    }

    pub fn mark_failed(&mut self) {
        self.status = QueueItemStatus::FailedSync;
    }

    pub fn label(&self) -> String {
        self.payload
            .summary(40)
            .unwrap_or_else(|| "Ocorrência".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload() -> OccurrencePayload {
        OccurrencePayload::new(json!({"category": "LIGHTING", "description": "pole out"})).unwrap()
    }

    #[test]
    fn new_items_start_pending_with_no_attempts() {
        let item = QueuedItem::new(payload());
        assert_eq!(item.status, QueueItemStatus::PendingSync);
        assert_eq!(item.attempts, 0);
    }

    #[test]
    fn attempts_increase_on_every_begin() {
        let mut item = QueuedItem::new(payload());
        item.begin_attempt();
        item.mark_failed();
        item.begin_attempt();
        assert_eq!(item.status, QueueItemStatus::Syncing);
        assert_eq!(item.attempts, 2);
    }

    #[test]
    fn persisted_form_uses_camel_case_and_millis() {
        let item = QueuedItem::new(payload());
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["status"], "pending_sync");
        assert!(value["createdAt"].is_i64());
        assert_eq!(value["payload"]["description"], "pole out");
    }

    #[test]
    fn reloaded_item_equals_the_enqueued_one() {
        let item = QueuedItem::new(payload());
        let bytes = serde_json::to_vec(&item).unwrap();
        let reloaded: QueuedItem = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(reloaded, item);
    }

    #[test]
    fn missing_fields_are_defaulted_when_loading() {
        let item: QueuedItem = serde_json::from_value(json!({
            "id": "offline_1700000000000_abcdefg",
            "payload": {"description": "pole out"}
        }))
        .unwrap();
        assert_eq!(item.status, QueueItemStatus::PendingSync);
        assert_eq!(item.attempts, 0);
        assert_eq!(item.label(), "pole out");
    }
}

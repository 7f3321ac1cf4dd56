use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Remote Submission API へそのまま送る作成リクエスト本文。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct OccurrencePayload(Value);

impl OccurrencePayload {
    pub fn new(value: Value) -> Result<Self, String> {
        Self::validate(&value)?;
        Ok(Self(value))
    }

    pub fn from_json_str(json: &str) -> Result<Self, String> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| format!("Invalid JSON payload: {e}"))?;
        Self::new(value)
    }

    pub fn as_json(&self) -> &Value {
        &self.0
    }

    pub fn into_inner(self) -> Value {
        self.0
    }

    pub fn description(&self) -> Option<&str> {
        self.0.get("description").and_then(Value::as_str)
    }

    /// UI 表示用の短い説明（先頭 `max_chars` 文字、超過時は "..." 付き）
    pub fn summary(&self, max_chars: usize) -> Option<String> {
        let description = self.description()?.trim();
        if description.is_empty() {
            return None;
        }
        if description.chars().count() <= max_chars {
            return Some(description.to_string());
        }
        let head: String = description.chars().take(max_chars).collect();
        Some(format!("{head}..."))
    }

    fn validate(value: &Value) -> Result<(), String> {
        if !value.is_object() {
            return Err("Occurrence payload must be a JSON object".to_string());
        }
        Ok(())
    }
}

impl From<OccurrencePayload> for Value {
    fn from(payload: OccurrencePayload) -> Self {
        payload.0
    }
}

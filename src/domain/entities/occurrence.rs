use crate::domain::value_objects::OccurrencePayload;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OccurrenceCategory {
    #[default]
    UrbanMaintenance,
    Lighting,
    WasteDisposal,
    UrbanFurniture,
    Incident,
    Accessibility,
    Vulnerability,
    Environmental,
    Unknown(String),
}

impl OccurrenceCategory {
    pub fn as_str(&self) -> &str {
        match self {
            OccurrenceCategory::UrbanMaintenance => "URBAN_MAINTENANCE",
            OccurrenceCategory::Lighting => "LIGHTING",
            OccurrenceCategory::WasteDisposal => "WASTE_DISPOSAL",
            OccurrenceCategory::UrbanFurniture => "URBAN_FURNITURE",
            OccurrenceCategory::Incident => "INCIDENT",
            OccurrenceCategory::Accessibility => "ACCESSIBILITY",
            OccurrenceCategory::Vulnerability => "VULNERABILITY",
            OccurrenceCategory::Environmental => "ENVIRONMENTAL",
            OccurrenceCategory::Unknown(value) => value.as_str(),
        }
    }
}

impl From<&str> for OccurrenceCategory {
    fn from(value: &str) -> Self {
        match value {
            "URBAN_MAINTENANCE" => OccurrenceCategory::UrbanMaintenance,
            "LIGHTING" => OccurrenceCategory::Lighting,
            "WASTE_DISPOSAL" => OccurrenceCategory::WasteDisposal,
            "URBAN_FURNITURE" => OccurrenceCategory::UrbanFurniture,
            "INCIDENT" => OccurrenceCategory::Incident,
            "ACCESSIBILITY" => OccurrenceCategory::Accessibility,
            "VULNERABILITY" => OccurrenceCategory::Vulnerability,
            "ENVIRONMENTAL" => OccurrenceCategory::Environmental,
            other => OccurrenceCategory::Unknown(other.to_string()),
        }
    }
}

impl From<String> for OccurrenceCategory {
    fn from(value: String) -> Self {
        OccurrenceCategory::from(value.as_str())
    }
}

impl From<OccurrenceCategory> for String {
    fn from(value: OccurrenceCategory) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for OccurrenceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OccurrenceStatus {
    #[default]
    Received,
    Triage,
    Forwarded,
    InExecution,
    Completed,
    Scheduled,
    Unknown(String),
}

impl OccurrenceStatus {
    pub fn as_str(&self) -> &str {
        match self {
            OccurrenceStatus::Received => "RECEIVED",
            OccurrenceStatus::Triage => "TRIAGE",
            OccurrenceStatus::Forwarded => "FORWARDED",
            OccurrenceStatus::InExecution => "IN_EXECUTION",
            OccurrenceStatus::Completed => "COMPLETED",
            OccurrenceStatus::Scheduled => "SCHEDULED",
            OccurrenceStatus::Unknown(value) => value.as_str(),
        }
    }
}

impl From<&str> for OccurrenceStatus {
    fn from(value: &str) -> Self {
        match value {
            "RECEIVED" => OccurrenceStatus::Received,
            "TRIAGE" => OccurrenceStatus::Triage,
            "FORWARDED" => OccurrenceStatus::Forwarded,
            "IN_EXECUTION" => OccurrenceStatus::InExecution,
            "COMPLETED" => OccurrenceStatus::Completed,
            "SCHEDULED" => OccurrenceStatus::Scheduled,
            other => OccurrenceStatus::Unknown(other.to_string()),
        }
    }
}

impl From<String> for OccurrenceStatus {
    fn from(value: String) -> Self {
        OccurrenceStatus::from(value.as_str())
    }
}

impl From<OccurrenceStatus> for String {
    fn from(value: OccurrenceStatus) -> Self {
        value.as_str().to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UrgencyLevel {
    #[default]
    Low,
    Medium,
    High,
    Critical,
    Unknown(String),
}

impl UrgencyLevel {
    pub fn as_str(&self) -> &str {
        match self {
            UrgencyLevel::Low => "LOW",
            UrgencyLevel::Medium => "MEDIUM",
            UrgencyLevel::High => "HIGH",
            UrgencyLevel::Critical => "CRITICAL",
            UrgencyLevel::Unknown(value) => value.as_str(),
        }
    }
}

impl From<&str> for UrgencyLevel {
    fn from(value: &str) -> Self {
        match value {
            "LOW" => UrgencyLevel::Low,
            "MEDIUM" => UrgencyLevel::Medium,
            "HIGH" => UrgencyLevel::High,
            "CRITICAL" => UrgencyLevel::Critical,
            other => UrgencyLevel::Unknown(other.to_string()),
        }
    }
}

impl From<String> for UrgencyLevel {
    fn from(value: String) -> Self {
        UrgencyLevel::from(value.as_str())
    }
}

impl From<UrgencyLevel> for String {
    fn from(value: UrgencyLevel) -> Self {
        value.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinates {
    #[serde(default)]
    pub longitude: f64,
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub approx_address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusHistoryEntry {
    #[serde(default)]
    pub status: OccurrenceStatus,
    #[serde(default = "Utc::now")]
    pub changed_at: DateTime<Utc>,
    #[serde(default)]
    pub note: String,
}

/// サーバーから取得したオカレンス（キャッシュ・UI 表示用）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Occurrence {
    pub id: String,
    #[serde(default)]
    pub protocol_number: Option<String>,
    #[serde(default)]
    pub category: OccurrenceCategory,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub urgency: UrgencyLevel,
    #[serde(default)]
    pub current_status: OccurrenceStatus,
    #[serde(default)]
    pub coordinates: Coordinates,
    #[serde(default)]
    pub status_history: Vec<StatusHistoryEntry>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub reporter_identity_id: Option<String>,
    #[serde(default)]
    pub privacy_consent: bool,
    #[serde(default)]
    pub anonymous: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationInput {
    pub longitude: f64,
    pub latitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approx_address: Option<String>,
}

/// 市民が入力する新規オカレンス。添付ファイルは含めない。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOccurrence {
    pub category: OccurrenceCategory,
    pub description: String,
    pub urgency: UrgencyLevel,
    pub anonymous: bool,
    pub privacy_consent: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_status: Option<OccurrenceStatus>,
    #[serde(default)]
    pub reporter_identity_id: Option<String>,
    pub location: LocationInput,
}

impl NewOccurrence {
    pub fn into_payload(self) -> Result<OccurrencePayload, String> {
        if self.description.trim().is_empty() {
            return Err("Occurrence description cannot be empty".to_string());
        }
        let value = serde_json::to_value(&self)
            .map_err(|e| format!("Failed to serialize occurrence: {e}"))?;
        OccurrencePayload::new(value)
    }
}

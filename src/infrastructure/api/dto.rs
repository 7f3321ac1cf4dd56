use serde::Deserialize;

/// サーバーが返すオカレンス。`id` 以外は欠けていることがある。
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiOccurrence {
    pub id: String,
    #[serde(default)]
    pub protocol_number: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub urgency: Option<String>,
    #[serde(default)]
    pub current_status: Option<String>,
    #[serde(default)]
    pub anonymous: Option<bool>,
    #[serde(default)]
    pub privacy_consent: Option<bool>,
    #[serde(default)]
    pub reporter_identity_id: Option<String>,
    #[serde(default)]
    pub status_history: Option<Vec<ApiStatusHistoryEntry>>,
    #[serde(default)]
    pub location: Option<ApiLocation>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiStatusHistoryEntry {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub changed_at: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiLocation {
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub approx_address: Option<String>,
}

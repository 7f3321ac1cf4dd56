use super::dto::{ApiLocation, ApiOccurrence};
use crate::domain::entities::{
    Coordinates, Occurrence, OccurrenceCategory, OccurrenceStatus, StatusHistoryEntry,
    UrgencyLevel,
};
use chrono::{DateTime, NaiveDateTime, Utc};

const RECEIVED_NOTE: &str = "Registro recebido.";

pub fn map_api_occurrence(api: ApiOccurrence) -> Occurrence {
    let now = Utc::now();
    let created_at = parse_timestamp(api.created_at.as_deref()).unwrap_or(now);
    let updated_at = parse_timestamp(api.updated_at.as_deref()).unwrap_or(created_at);
    let current_status = api
        .current_status
        .as_deref()
        .map(OccurrenceStatus::from)
        .unwrap_or_default();

    let status_history = match api.status_history {
        Some(entries) if !entries.is_empty() => entries
            .into_iter()
            .map(|entry| StatusHistoryEntry {
                status: entry
                    .status
                    .as_deref()
                    .map(OccurrenceStatus::from)
                    .unwrap_or_else(|| current_status.clone()),
                changed_at: parse_timestamp(entry.changed_at.as_deref()).unwrap_or(now),
                note: entry.note.unwrap_or_default(),
            })
            .collect(),
        _ => vec![StatusHistoryEntry {
            status: current_status.clone(),
            changed_at: created_at,
            note: RECEIVED_NOTE.to_string(),
        }],
    };

    Occurrence {
        id: api.id,
        protocol_number: api.protocol_number,
        category: api
            .category
            .as_deref()
            .map(OccurrenceCategory::from)
            .unwrap_or_default(),
        description: api.description.unwrap_or_default(),
        urgency: api
            .urgency
            .as_deref()
            .map(UrgencyLevel::from)
            .unwrap_or_default(),
        current_status,
        coordinates: map_location(api.location),
        status_history,
        created_at,
        updated_at,
        reporter_identity_id: api.reporter_identity_id,
        privacy_consent: api.privacy_consent.unwrap_or(false),
        anonymous: api.anonymous,
    }
}

fn map_location(location: Option<ApiLocation>) -> Coordinates {
    let location = location.unwrap_or_default();
    Coordinates {
        longitude: location.longitude.unwrap_or(0.0),
        latitude: location.latitude.unwrap_or(0.0),
        approx_address: location.approx_address.unwrap_or_default(),
    }
}

/// RFC 3339 とタイムゾーン無しの ISO 形式（UTC とみなす）を受け付ける
fn parse_timestamp(value: Option<&str>) -> Option<DateTime<Utc>> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn api(value: serde_json::Value) -> ApiOccurrence {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn sparse_record_gets_defaults() {
        let occurrence = map_api_occurrence(api(json!({"id": "a"})));

        assert_eq!(occurrence.category, OccurrenceCategory::UrbanMaintenance);
        assert_eq!(occurrence.urgency, UrgencyLevel::Low);
        assert_eq!(occurrence.current_status, OccurrenceStatus::Received);
        assert_eq!(occurrence.description, "");
        assert_eq!(occurrence.coordinates, Coordinates::default());
        assert!(!occurrence.privacy_consent);
        assert_eq!(occurrence.updated_at, occurrence.created_at);

        assert_eq!(occurrence.status_history.len(), 1);
        let entry = &occurrence.status_history[0];
        assert_eq!(entry.status, OccurrenceStatus::Received);
        assert_eq!(entry.changed_at, occurrence.created_at);
        assert_eq!(entry.note, "Registro recebido.");
    }

    #[test]
    fn populated_record_is_mapped_field_by_field() {
        let occurrence = map_api_occurrence(api(json!({
            "id": "b",
            "protocolNumber": "2025-0001",
            "category": "LIGHTING",
            "description": "pole out",
            "urgency": "HIGH",
            "currentStatus": "TRIAGE",
            "privacyConsent": true,
            "anonymous": null,
            "location": {"longitude": -47.9, "latitude": -15.8, "approxAddress": "SQS 308"},
            "statusHistory": [
                {"status": "RECEIVED", "changedAt": "2025-03-01T10:00:00Z", "note": "ok"},
                {"changedAt": "not a date"}
            ],
            "createdAt": "2025-03-01T10:00:00",
            "updatedAt": "2025-03-02T08:30:00.123Z"
        })));

        assert_eq!(occurrence.protocol_number.as_deref(), Some("2025-0001"));
        assert_eq!(occurrence.category, OccurrenceCategory::Lighting);
        assert_eq!(occurrence.current_status, OccurrenceStatus::Triage);
        assert_eq!(occurrence.coordinates.approx_address, "SQS 308");
        assert!(occurrence.privacy_consent);
        assert_eq!(occurrence.anonymous, None);
        assert_eq!(
            occurrence.created_at.to_rfc3339(),
            "2025-03-01T10:00:00+00:00"
        );
        assert!(occurrence.updated_at > occurrence.created_at);

        assert_eq!(occurrence.status_history.len(), 2);
        assert_eq!(occurrence.status_history[0].note, "ok");
        assert_eq!(occurrence.status_history[1].status, OccurrenceStatus::Triage);
    }

    #[test]
    fn invalid_created_at_falls_back_to_now() {
        let before = Utc::now();
        let occurrence = map_api_occurrence(api(json!({"id": "c", "createdAt": "yesterday"})));
        assert!(occurrence.created_at >= before);
    }
}

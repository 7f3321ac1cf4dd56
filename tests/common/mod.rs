#![allow(dead_code)]

use async_trait::async_trait;
use occurrence_sync::application::ports::{OccurrenceLister, OccurrenceSubmitter, Page};
use occurrence_sync::domain::entities::Occurrence;
use occurrence_sync::domain::value_objects::OccurrencePayload;
use occurrence_sync::shared::error::AppError;
use serde_json::json;
use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// 受理したレコードを保持し、一覧でそれを返すサーバーの代役
#[derive(Default)]
pub struct FakeOccurrenceServer {
    accepted: Mutex<Vec<Occurrence>>,
    rejected_descriptions: Mutex<HashSet<String>>,
    listing_down: AtomicBool,
    submit_calls: AtomicUsize,
    list_calls: AtomicUsize,
}

impl FakeOccurrenceServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<Occurrence>) -> Self {
        let server = Self::default();
        *server.accepted.lock().unwrap() = records;
        server
    }

    pub fn reject_description(&self, description: &str) {
        self.rejected_descriptions
            .lock()
            .unwrap()
            .insert(description.to_string());
    }

    pub fn accept_all(&self) {
        self.rejected_descriptions.lock().unwrap().clear();
    }

    pub fn set_listing_down(&self, down: bool) {
        self.listing_down.store(down, Ordering::SeqCst);
    }

    pub fn submit_calls(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn accepted(&self) -> Vec<Occurrence> {
        self.accepted.lock().unwrap().clone()
    }
}

#[async_trait]
impl OccurrenceSubmitter for FakeOccurrenceServer {
    async fn submit(&self, payload: &OccurrencePayload) -> Result<Occurrence, AppError> {
        let call = self.submit_calls.fetch_add(1, Ordering::SeqCst) + 1;
        let description = payload.description().unwrap_or_default().to_string();
        if self.rejected_descriptions.lock().unwrap().contains(&description) {
            return Err(AppError::Network("503 Service Unavailable".to_string()));
        }

        let mut body = payload.as_json().clone();
        body["id"] = json!(format!("srv-{call}"));
        let created: Occurrence = serde_json::from_value(body)
            .map_err(|err| AppError::DeserializationError(err.to_string()))?;
        self.accepted.lock().unwrap().push(created.clone());
        Ok(created)
    }
}

#[async_trait]
impl OccurrenceLister for FakeOccurrenceServer {
    async fn list(&self, _page: u32, _size: u32) -> Result<Page<Occurrence>, AppError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.listing_down.load(Ordering::SeqCst) {
            return Err(AppError::Network("connection refused".to_string()));
        }
        Ok(Page::single(self.accepted()))
    }
}

pub fn payload(category: &str, description: &str) -> OccurrencePayload {
    OccurrencePayload::new(json!({
        "category": category,
        "description": description,
        "urgency": "MEDIUM",
        "anonymous": false,
        "privacyConsent": true,
        "location": {"longitude": -47.88, "latitude": -15.79}
    }))
    .unwrap()
}

pub fn record(id: &str, description: &str) -> Occurrence {
    serde_json::from_value(json!({"id": id, "description": description})).unwrap()
}

use super::dto::ApiOccurrence;
use super::mapper::map_api_occurrence;
use crate::application::ports::{OccurrenceLister, OccurrenceSubmitter, Page};
use crate::domain::entities::Occurrence;
use crate::domain::value_objects::OccurrencePayload;
use crate::shared::config::ApiConfig;
use crate::shared::error::AppError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

const OCCURRENCES_PATH: &str = "/api/v1/ombudsmans";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server responded with {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Decode(err) => AppError::DeserializationError(err.to_string()),
            other => AppError::Network(other.to_string()),
        }
    }
}

/// `/api/v1/ombudsmans` を叩く HTTP クライアント
pub struct HttpOccurrenceApi {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpOccurrenceApi {
    pub fn new(config: &ApiConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| AppError::ConfigurationError(err.to_string()))?;
        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: Client, config: &ApiConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, OCCURRENCES_PATH)
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.token.as_deref() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = self.authorize(builder).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::Status { status, body });
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl OccurrenceSubmitter for HttpOccurrenceApi {
    async fn submit(&self, payload: &OccurrencePayload) -> Result<Occurrence, AppError> {
        let builder = self.client.post(self.endpoint()).json(payload.as_json());
        let created: ApiOccurrence = self.send_json(builder).await.map_err(|err| {
            tracing::debug!(target: "offline::api", error = %err, "submission rejected");
            AppError::from(err)
        })?;
        Ok(map_api_occurrence(created))
    }
}

#[async_trait]
impl OccurrenceLister for HttpOccurrenceApi {
    async fn list(&self, page: u32, size: u32) -> Result<Page<Occurrence>, AppError> {
        let builder = self
            .client
            .get(self.endpoint())
            .query(&[("page", page), ("size", size)]);
        let page: Page<ApiOccurrence> = self.send_json(builder).await.map_err(|err| {
            tracing::debug!(target: "offline::api", error = %err, "listing request failed");
            AppError::from(err)
        })?;
        tracing::debug!(
            target: "offline::api",
            records = page.content.len(),
            total = page.total_elements,
            "listing fetched"
        );
        Ok(page.map(map_api_occurrence))
    }
}

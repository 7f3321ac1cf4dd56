use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use occurrence_sync::application::services::ConnectivityState;
use occurrence_sync::domain::entities::offline::{DrainOutcome, DrainResult};
use occurrence_sync::domain::value_objects::OccurrencePayload;
use occurrence_sync::{AppConfig, SyncState};
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HarnessMode {
    Enqueue,
    Drain,
    Status,
}

impl HarnessMode {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "enqueue" => Self::Enqueue,
            "drain" => Self::Drain,
            _ => Self::Status,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Enqueue => "enqueue",
            Self::Drain => "drain",
            Self::Status => "status",
        }
    }
}

#[derive(Debug, Clone)]
struct HarnessConfig {
    mode: HarnessMode,
    online: bool,
    payload_json: Option<String>,
    category: String,
    description: String,
    summary_path: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct HarnessSummary {
    mode: &'static str,
    online: bool,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    pending_before: usize,
    pending_after: usize,
    failed_after: usize,
    enqueued_id: Option<String>,
    drain: Option<DrainResult>,
    drain_skipped: bool,
    store_degraded: bool,
    cached_records: usize,
    cache_fetched_at: Option<DateTime<Utc>>,
    cache_stale: bool,
}

fn parse_optional_bool(raw: Option<String>) -> Option<bool> {
    raw.and_then(|value| match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    })
}

fn parse_required_string(key: &str, default_value: &str) -> String {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default_value.to_string())
}

fn build_config() -> HarnessConfig {
    HarnessConfig {
        mode: HarnessMode::parse(
            &std::env::var("HARNESS_MODE").unwrap_or_else(|_| "status".to_string()),
        ),
        online: parse_optional_bool(std::env::var("HARNESS_ONLINE").ok()).unwrap_or(true),
        payload_json: std::env::var("HARNESS_PAYLOAD")
            .ok()
            .filter(|value| !value.trim().is_empty()),
        category: parse_required_string("HARNESS_CATEGORY", "URBAN_MAINTENANCE"),
        description: parse_required_string("HARNESS_DESCRIPTION", "harness occurrence"),
        summary_path: std::env::var("HARNESS_SUMMARY_PATH")
            .ok()
            .map(|path| path.trim().to_string())
            .filter(|path| !path.is_empty())
            .map(PathBuf::from),
    }
}

fn build_payload(cfg: &HarnessConfig) -> anyhow::Result<OccurrencePayload> {
    let payload = match &cfg.payload_json {
        Some(raw) => OccurrencePayload::from_json_str(raw),
        None => OccurrencePayload::new(json!({
            "category": cfg.category,
            "description": cfg.description,
            "urgency": "LOW",
            "anonymous": true,
            "privacyConsent": true,
            "location": {"longitude": 0.0, "latitude": 0.0}
        })),
    };
    payload.map_err(|err| anyhow::anyhow!("invalid payload: {err}"))
}

fn write_summary(path: &PathBuf, summary: &HarnessSummary) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, serde_json::to_vec_pretty(summary)?)?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    occurrence_sync::init_logging();
    let cfg = build_config();
    let app_config = AppConfig::from_env();
    let started_at = Utc::now();

    info!(
        mode = cfg.mode.as_str(),
        online = cfg.online,
        api = %app_config.api.base_url,
        "starting outbox harness"
    );

    let state = SyncState::initialize(
        &app_config,
        ConnectivityState::from_reachable(cfg.online),
    )
    .await
    .map_err(|err| anyhow::anyhow!("failed to initialize offline sync: {err}"))?;
    let service = &state.service;

    let pending_before = service.pending_count().await;
    let mut enqueued_id = None;
    let mut drain = None;
    let mut drain_skipped = false;

    match cfg.mode {
        HarnessMode::Enqueue => {
            let item = service.enqueue(build_payload(&cfg)?).await;
            info!(id = %item.id, "occurrence queued");
            enqueued_id = Some(item.id.to_string());
        }
        HarnessMode::Drain => {
            if !cfg.online {
                warn!("harness is offline; skipping drain");
                drain_skipped = true;
            } else {
                match service.retry_all().await {
                    DrainOutcome::Completed(result) => drain = Some(result),
                    DrainOutcome::AlreadyRunning => drain_skipped = true,
                }
            }
        }
        HarnessMode::Status => {}
    }

    let snapshot = service.cache_snapshot().await;
    let summary = HarnessSummary {
        mode: cfg.mode.as_str(),
        online: cfg.online,
        started_at,
        finished_at: Utc::now(),
        pending_before,
        pending_after: service.pending_count().await,
        failed_after: service.failed_items().await.len(),
        enqueued_id,
        drain,
        drain_skipped,
        store_degraded: state.store.is_degraded(),
        cached_records: snapshot.as_ref().map(|s| s.len()).unwrap_or(0),
        cache_fetched_at: snapshot.as_ref().map(|s| s.fetched_at),
        cache_stale: service.is_cache_stale().await,
    };

    if let Some(path) = &cfg.summary_path {
        if let Err(err) = write_summary(path, &summary) {
            warn!(path = %path.display(), error = %err, "failed to write harness summary");
        }
    } else {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(())
}

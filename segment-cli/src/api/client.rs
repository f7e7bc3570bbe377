//! HTTP client for the Segment tracking API

use async_trait::async_trait;
use serde::Serialize;

use super::models::{BatchPayload, TrackEvent};
use super::sink::EventSink;
use crate::config::{ApiConfig, WriteKey};
use crate::error::{ImportError, ImportResult};

const TRACK_PATH: &str = "/v1/track";
const BATCH_PATH: &str = "/v1/batch";

/// Sends events to `POST /v1/track` and `POST /v1/batch`.
///
/// Authenticates with HTTP basic auth: the write key is the username and the
/// password is empty. Any non-2xx answer is an [`ImportError::Remote`].
pub struct SegmentClient {
    http: reqwest::Client,
    endpoint: String,
    write_key: WriteKey,
    requests: usize,
}

impl SegmentClient {
    /// Build a client; fails if the config carries no write key
    pub fn new(api: &ApiConfig) -> ImportResult<Self> {
        let write_key = api.require_write_key()?.clone();
        let http = reqwest::Client::builder()
            .user_agent(concat!("segment-cli/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            endpoint: api.endpoint.clone(),
            write_key,
            requests: 0,
        })
    }

    /// Requests that got a 2xx answer so far
    pub fn requests(&self) -> usize {
        self.requests
    }

    async fn post<T: Serialize + Sync>(&mut self, path: &str, body: &T) -> ImportResult<()> {
        let url = format!("{}{}", self.endpoint, path);
        log::debug!("POST {}", url);

        let response = self
            .http
            .post(&url)
            .basic_auth(self.write_key.as_str(), Some(""))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("POST {} failed with {}: {}", url, status, body);
            return Err(ImportError::Remote {
                status: status.as_u16(),
                body,
            });
        }

        self.requests += 1;
        log::trace!("POST {} -> {}", url, status);
        Ok(())
    }
}

#[async_trait]
impl EventSink for SegmentClient {
    async fn track(&mut self, event: &TrackEvent) -> ImportResult<()> {
        self.post(TRACK_PATH, event).await
    }

    async fn batch(&mut self, events: &[TrackEvent]) -> ImportResult<()> {
        self.post(BATCH_PATH, &BatchPayload::new(events)).await
    }
}

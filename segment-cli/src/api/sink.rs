//! Destination for mapped events

use std::io::Write;

use async_trait::async_trait;

use super::models::{BatchPayload, TrackEvent};
use crate::error::ImportResult;

/// Something that accepts `track` and `batch` calls
#[async_trait]
pub trait EventSink: Send {
    /// Send a single event
    async fn track(&mut self, event: &TrackEvent) -> ImportResult<()>;

    /// Send several events in one call
    async fn batch(&mut self, events: &[TrackEvent]) -> ImportResult<()>;
}

/// Prints each request body as JSON instead of sending it
pub struct DryRunSink<W: Write + Send> {
    out: W,
}

impl DryRunSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self {
            out: std::io::stdout(),
        }
    }
}

impl<W: Write + Send> DryRunSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn print(&mut self, endpoint: &str, body: String) -> ImportResult<()> {
        writeln!(self.out, "POST {}\n{}", endpoint, body)?;
        Ok(())
    }
}

#[async_trait]
impl<W: Write + Send> EventSink for DryRunSink<W> {
    async fn track(&mut self, event: &TrackEvent) -> ImportResult<()> {
        let body = serde_json::to_string_pretty(event)?;
        self.print("/v1/track", body)
    }

    async fn batch(&mut self, events: &[TrackEvent]) -> ImportResult<()> {
        let body = serde_json::to_string_pretty(&BatchPayload::new(events))?;
        self.print("/v1/batch", body)
    }
}

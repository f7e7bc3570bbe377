//! Event dispatch in single-event or batch mode

use crate::api::{EventSink, TrackEvent};
use crate::config::{DEFAULT_BATCH_SIZE, DispatchMode};
use crate::error::ImportResult;

/// Counters for a finished run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Events accepted by the sink
    pub events: usize,
    /// Calls made to the sink
    pub requests: usize,
}

/// Sends events through a sink in the configured mode.
///
/// In batch mode events are held until `size` are pending, then sent as one
/// call; [`Dispatcher::finish`] sends whatever is left. The first failed call
/// is returned as-is and nothing after it is sent.
pub struct Dispatcher<'a> {
    sink: &'a mut dyn EventSink,
    mode: DispatchMode,
    pending: Vec<TrackEvent>,
    stats: DispatchStats,
}

impl<'a> Dispatcher<'a> {
    pub fn new(sink: &'a mut dyn EventSink, mode: DispatchMode) -> Self {
        // Batch size is user input, so it only bounds the up-front allocation
        let capacity = match mode {
            DispatchMode::Single => 0,
            DispatchMode::Batch { size } => size.min(DEFAULT_BATCH_SIZE),
        };
        Self {
            sink,
            mode,
            pending: Vec::with_capacity(capacity),
            stats: DispatchStats::default(),
        }
    }

    /// Events waiting for the next batch call
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub async fn send(&mut self, event: TrackEvent) -> ImportResult<()> {
        match self.mode {
            DispatchMode::Single => {
                self.sink.track(&event).await?;
                self.stats.events += 1;
                self.stats.requests += 1;
                Ok(())
            }
            DispatchMode::Batch { size } => {
                self.pending.push(event);
                if self.pending.len() >= size {
                    self.flush().await?;
                }
                Ok(())
            }
        }
    }

    /// Send the partial batch, if any, and return the totals
    pub async fn finish(mut self) -> ImportResult<DispatchStats> {
        self.flush().await?;
        Ok(self.stats)
    }

    async fn flush(&mut self) -> ImportResult<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        log::debug!("Sending batch of {} events", self.pending.len());
        self.sink.batch(&self.pending).await?;
        self.stats.events += self.pending.len();
        self.stats.requests += 1;
        self.pending.clear();
        Ok(())
    }
}

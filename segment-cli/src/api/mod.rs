//! Segment tracking API
//!
//! Payload types, the [`EventSink`] seam the dispatcher sends through, and
//! its two implementations: the HTTP client and a dry-run printer.

pub mod client;
pub mod models;
pub mod sink;

pub use client::SegmentClient;
pub use models::{BatchPayload, EventContext, TrackEvent};
pub use sink::{DryRunSink, EventSink};

//! The import pipeline: load, validate, map, dispatch

use std::path::Path;

use crate::api::EventSink;
use crate::config::ImportConfig;
use crate::dispatch::{DispatchStats, Dispatcher};
use crate::error::ImportResult;
use crate::mapper::RowMapper;
use crate::sheet::Sheet;

/// Outcome of a completed run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Data rows read from the sheet
    pub rows: usize,
    pub events: usize,
    pub requests: usize,
}

impl From<(usize, DispatchStats)> for RunSummary {
    fn from((rows, stats): (usize, DispatchStats)) -> Self {
        Self {
            rows,
            events: stats.events,
            requests: stats.requests,
        }
    }
}

/// Load `path` and send every row through `sink`
pub async fn run_import<P: AsRef<Path>>(
    path: P,
    config: &ImportConfig,
    sink: &mut dyn EventSink,
) -> ImportResult<RunSummary> {
    let sheet = Sheet::open(path)?;
    import_sheet(&sheet, config, sink).await
}

/// Send every row of an already loaded sheet through `sink`.
///
/// All column checks happen before the first call to the sink.
pub async fn import_sheet(
    sheet: &Sheet,
    config: &ImportConfig,
    sink: &mut dyn EventSink,
) -> ImportResult<RunSummary> {
    let mapper = RowMapper::new(&config.mapping, sheet.headers().as_slice())?;
    if sheet.is_empty() {
        log::warn!("Sheet has no data rows, nothing to send");
    }

    log::info!(
        "Sending {} rows in {} mode, identifier from '{}'",
        sheet.len(),
        config.dispatch,
        mapper.identifier().column()
    );

    let mut dispatcher = Dispatcher::new(sink, config.dispatch);
    for record in sheet.records() {
        let event = mapper.map(&record)?;
        log::trace!("Row {} -> {} for {}", record.row, event.event, event.user_id);
        dispatcher.send(event).await?;
    }
    let stats = dispatcher.finish().await?;

    log::info!(
        "Sent {} events in {} requests",
        stats.events,
        stats.requests
    );
    Ok(RunSummary::from((sheet.len(), stats)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::DryRunSink;
    use crate::config::{ApiConfig, DispatchMode, MappingConfig};
    use crate::error::ImportError;
    use crate::sheet::CellValue;

    fn config(dispatch: DispatchMode) -> ImportConfig {
        ImportConfig {
            mapping: MappingConfig::default(),
            dispatch,
            api: ApiConfig::default(),
            dry_run: true,
        }
    }

    fn sheet(headers: &[&str], rows: usize) -> Sheet {
        Sheet::from_rows(
            headers.iter().map(|h| h.to_string()).collect(),
            (0..rows)
                .map(|i| {
                    headers
                        .iter()
                        .map(|h| CellValue::String(format!("{}-{}", h, i)))
                        .collect()
                })
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_import_sheet_summary() {
        let mut sink = DryRunSink::new(Vec::new());
        let summary = import_sheet(
            &sheet(&["userId", "event", "plan"], 5),
            &config(DispatchMode::Batch { size: 2 }),
            &mut sink,
        )
        .await
        .unwrap();

        assert_eq!(
            summary,
            RunSummary {
                rows: 5,
                events: 5,
                requests: 3
            }
        );
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(output.matches("POST /v1/batch").count(), 3);
    }

    #[tokio::test]
    async fn test_schema_checked_before_sending() {
        let mut sink = DryRunSink::new(Vec::new());
        let err = import_sheet(
            &sheet(&["name", "event"], 3),
            &config(DispatchMode::Single),
            &mut sink,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ImportError::Schema { .. }));
        assert!(sink.into_inner().is_empty());
    }

    #[tokio::test]
    async fn test_header_only_sheet_sends_nothing() {
        let empty = sheet(&["userId", "event"], 0);
        assert!(empty.is_empty());

        let mut sink = DryRunSink::new(Vec::new());
        let summary = import_sheet(&empty, &config(DispatchMode::batch(10).unwrap()), &mut sink)
            .await
            .unwrap();
        assert_eq!(summary.rows, 0);
        assert_eq!(summary.requests, 0);
        assert!(sink.into_inner().is_empty());
    }
}

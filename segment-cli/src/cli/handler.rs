//! Import command handler

use anyhow::{Context, Result};
use colored::*;
use std::time::Instant;

use super::ImportCommand;
use crate::api::{DryRunSink, EventSink, SegmentClient};
use crate::config::{
    ApiConfig, ENDPOINT_ENV, ImportConfig, Settings, WriteKey, resolve_endpoint,
};
use crate::import::{RunSummary, import_sheet};
use crate::sheet::Sheet;

/// Resolve configuration from flags, environment and settings file
pub fn resolve_config(args: &ImportCommand) -> Result<ImportConfig> {
    let file_settings = match &args.config {
        Some(path) => Settings::load(path)
            .with_context(|| format!("Failed to load settings: {}", path.display()))?,
        None => Settings::default(),
    };

    let endpoint = resolve_endpoint(
        args.endpoint.clone(),
        file_settings.endpoint.clone(),
        std::env::var(ENDPOINT_ENV).ok(),
    );

    let write_key = WriteKey::from_flag_or_env(args.write_key.clone());
    let api = ApiConfig::new(endpoint, write_key);
    if !args.dry_run {
        api.require_write_key()?;
    }

    let settings = file_settings.merge(args.settings());
    Ok(ImportConfig {
        mapping: settings.mapping(args.profile),
        dispatch: settings.dispatch()?,
        api,
        dry_run: args.dry_run,
    })
}

/// Handle the import command
pub async fn handle_import_command(args: ImportCommand) -> Result<RunSummary> {
    if args.no_color {
        colored::control::set_override(false);
    }

    let config = resolve_config(&args)?;
    log::debug!("Resolved configuration: {:?}", config);

    let start = Instant::now();
    let sheet = Sheet::open(&args.file)
        .with_context(|| format!("Failed to load {}", args.file.display()))?;

    let mut sink: Box<dyn EventSink> = if config.dry_run {
        Box::new(DryRunSink::stdout())
    } else {
        Box::new(SegmentClient::new(&config.api)?)
    };

    let summary = import_sheet(&sheet, &config, sink.as_mut())
        .await
        .with_context(|| format!("Import of {} aborted", args.file.display()))?;

    let verb = if config.dry_run { "Printed" } else { "Sent" };
    eprintln!(
        "{} {} events from {} rows in {} requests ({:.2}s)",
        verb.bright_green().bold(),
        summary.events.to_string().cyan(),
        summary.rows,
        summary.requests,
        start.elapsed().as_secs_f64()
    );

    Ok(summary)
}

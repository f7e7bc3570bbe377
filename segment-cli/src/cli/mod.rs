//! Command-line interface

pub mod handler;

use std::path::PathBuf;

use clap::Parser;

use crate::config::settings::ModeKind;
use crate::config::{Profile, Settings, TraitsMode};

pub use handler::handle_import_command;

/// Send spreadsheet rows to the Segment tracking API
#[derive(Debug, Parser)]
#[command(name = "segment-cli", version, about)]
pub struct ImportCommand {
    /// Spreadsheet to import (.xlsx, .xls, .ods, .csv, ...)
    pub file: PathBuf,

    /// Base settings to start from
    #[arg(long, value_enum, default_value_t = Profile::Generic)]
    pub profile: Profile,

    /// TOML settings file; flags override it
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Column holding the user identifier [default: userId]
    #[arg(long, value_name = "COL")]
    pub user_id_col: Option<String>,

    /// Email column, used as identifier when the user id column is absent [default: email]
    #[arg(long, value_name = "COL")]
    pub email_col: Option<String>,

    /// Phone column [default: phone_number]
    #[arg(long, value_name = "COL")]
    pub phone_col: Option<String>,

    /// Column holding the event name [default: event]
    #[arg(long, value_name = "COL", conflicts_with = "event_name")]
    pub event_col: Option<String>,

    /// Use this event name for every row
    #[arg(long, value_name = "NAME")]
    pub event_name: Option<String>,

    /// Column holding the event time
    #[arg(long, value_name = "COL")]
    pub timestamp_col: Option<String>,

    /// Fail before sending anything if this column is missing (repeatable)
    #[arg(long = "require", value_name = "COL")]
    pub require: Vec<String>,

    /// Send the SHA-256 of the user identifier instead of the identifier
    #[arg(long)]
    pub hash_id: bool,

    /// Send the SHA-256 of the normalized email instead of the email
    #[arg(long)]
    pub hash_email: bool,

    /// Send the SHA-256 of the normalized phone number instead of the number
    #[arg(long)]
    pub hash_phone: bool,

    /// Put email and phone in context.traits
    #[arg(long, value_enum, value_name = "MODE")]
    pub traits: Option<TraitsMode>,

    /// One request per row, or batched requests
    #[arg(long, value_enum)]
    pub mode: Option<ModeKind>,

    /// Events per batch request; implies --mode batch [default: 100]
    #[arg(long, value_name = "N")]
    pub batch_size: Option<usize>,

    /// Segment write key [env: SEGMENT_WRITE_KEY]
    #[arg(long, value_name = "KEY")]
    pub write_key: Option<String>,

    /// API base URL [env: SEGMENT_ENDPOINT] [default: https://api.segment.io]
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Print the request bodies instead of sending them
    #[arg(long)]
    pub dry_run: bool,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl ImportCommand {
    /// The flags as the top settings layer. Unset switches stay `None` so
    /// they don't mask the settings file.
    pub fn settings(&self) -> Settings {
        let flag = |set: bool| set.then_some(true);
        let mode = self
            .mode
            .or(self.batch_size.map(|_| ModeKind::Batch));

        Settings {
            user_id_col: self.user_id_col.clone(),
            email_col: self.email_col.clone(),
            phone_col: self.phone_col.clone(),
            event_col: self.event_col.clone(),
            event_name: self.event_name.clone(),
            timestamp_col: self.timestamp_col.clone(),
            require: Some(self.require.clone()).filter(|r| !r.is_empty()),
            hash_id: flag(self.hash_id),
            hash_email: flag(self.hash_email),
            hash_phone: flag(self.hash_phone),
            traits: self.traits,
            mode,
            batch_size: self.batch_size,
            endpoint: self.endpoint.clone(),
        }
    }

    /// Log filter for the verbosity count
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ImportCommand {
        let mut argv = vec!["segment-cli"];
        argv.extend_from_slice(args);
        ImportCommand::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_minimal_args() {
        let cmd = parse(&["rows.xlsx"]);
        assert_eq!(cmd.file, PathBuf::from("rows.xlsx"));
        assert_eq!(cmd.profile, Profile::Generic);
        assert_eq!(cmd.settings(), Settings::default());
        assert_eq!(cmd.log_level(), "warn");
    }

    #[test]
    fn test_flags_become_settings() {
        let cmd = parse(&[
            "rows.xlsx",
            "--user-id-col",
            "customer",
            "--hash-id",
            "--hash-phone",
            "--require",
            "a",
            "--require",
            "b",
            "--traits",
            "raw-and-hashed",
            "-vv",
        ]);
        let settings = cmd.settings();
        assert_eq!(settings.user_id_col.as_deref(), Some("customer"));
        assert_eq!(settings.hash_id, Some(true));
        assert_eq!(settings.hash_email, None);
        assert_eq!(settings.hash_phone, Some(true));
        assert_eq!(settings.require, Some(vec!["a".into(), "b".into()]));
        assert_eq!(settings.traits, Some(TraitsMode::RawAndHashed));
        assert_eq!(cmd.log_level(), "debug");
    }

    #[test]
    fn test_batch_size_implies_batch_mode() {
        let settings = parse(&["rows.xlsx", "--batch-size", "25"]).settings();
        assert_eq!(settings.mode, Some(ModeKind::Batch));

        let settings = parse(&["rows.xlsx", "--mode", "batch"]).settings();
        assert_eq!(settings.mode, Some(ModeKind::Batch));
        assert_eq!(settings.batch_size, None);
    }

    #[test]
    fn test_event_name_conflicts_with_event_col() {
        let result = ImportCommand::try_parse_from([
            "segment-cli",
            "rows.xlsx",
            "--event-col",
            "a",
            "--event-name",
            "b",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_check_in_profile() {
        let cmd = parse(&["rows.xlsx", "--profile", "check-in"]);
        assert_eq!(cmd.profile, Profile::CheckIn);
    }
}

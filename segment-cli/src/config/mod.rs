//! Import configuration
//!
//! One [`ImportConfig`] describes a whole run: how rows map to events, how
//! events are dispatched and where they go. It is resolved once at startup
//! from CLI flags, an optional settings file and a profile preset (see
//! [`settings`]) and passed down by reference.

pub mod settings;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{ImportError, ImportResult};

pub use settings::{Profile, Settings};

/// Environment variable holding the Segment write key
pub const WRITE_KEY_ENV: &str = "SEGMENT_WRITE_KEY";
/// Environment variable overriding the API base URL
pub const ENDPOINT_ENV: &str = "SEGMENT_ENDPOINT";
pub const DEFAULT_ENDPOINT: &str = "https://api.segment.io";
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Complete configuration for one import run
#[derive(Debug, Clone)]
pub struct ImportConfig {
    pub mapping: MappingConfig,
    pub dispatch: DispatchMode,
    pub api: ApiConfig,
    /// Print payloads instead of sending them
    pub dry_run: bool,
}

/// How a row becomes an event
#[derive(Debug, Clone, PartialEq)]
pub struct MappingConfig {
    /// Primary identifier column; `None` always identifies by email
    pub user_id_column: Option<String>,
    /// Email column, also the identifier fallback
    pub email_column: String,
    pub phone_column: String,
    pub event: EventSource,
    /// Column holding the event time, if events carry one
    pub timestamp_column: Option<String>,
    /// Columns that must exist before anything is sent
    pub required_columns: Vec<String>,
    pub hashing: HashingConfig,
    pub traits: TraitsMode,
}

/// Where the event name comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventSource {
    /// Same literal name for every row
    Fixed(String),
    /// Read from this column
    Column(String),
}

/// Which identity fields are replaced by their SHA-256 digest
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HashingConfig {
    pub identifier: bool,
    pub email: bool,
    pub phone: bool,
}

/// Placement of email and phone in the payload
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TraitsMode {
    /// Leave them in `properties`
    #[default]
    Off,
    /// Move them to `context.traits` as `hashed_<field>` only
    Hashed,
    /// Move them to `context.traits` as both `<field>` and `hashed_<field>`
    RawAndHashed,
}

/// One request per event, or grouped requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    Single,
    Batch { size: usize },
}

impl DispatchMode {
    pub fn batch(size: usize) -> ImportResult<Self> {
        if size == 0 {
            return Err(ImportError::Config(
                "batch size must be at least 1".to_string(),
            ));
        }
        Ok(DispatchMode::Batch { size })
    }
}

impl std::fmt::Display for DispatchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DispatchMode::Single => write!(f, "track"),
            DispatchMode::Batch { size } => write!(f, "batch (size {})", size),
        }
    }
}

/// Segment write key. Debug output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct WriteKey(String);

impl WriteKey {
    /// Flag value first, then the environment value; empty strings count as absent
    pub fn resolve(flag: Option<String>, env: Option<String>) -> Option<Self> {
        flag.into_iter()
            .chain(env)
            .map(|k| k.trim().to_string())
            .find(|k| !k.is_empty())
            .map(WriteKey)
    }

    /// [`WriteKey::resolve`] against the process environment
    pub fn from_flag_or_env(flag: Option<String>) -> Option<Self> {
        Self::resolve(flag, std::env::var(WRITE_KEY_ENV).ok())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for WriteKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "WriteKey(***)")
    }
}

/// Target of the HTTP sink
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL without the `/v1/...` path
    pub endpoint: String,
    pub write_key: Option<WriteKey>,
}

impl ApiConfig {
    pub fn new(endpoint: impl Into<String>, write_key: Option<WriteKey>) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            write_key,
        }
    }

    /// The write key, or a configuration error explaining how to supply one
    pub fn require_write_key(&self) -> ImportResult<&WriteKey> {
        self.write_key.as_ref().ok_or_else(|| {
            ImportError::Config(format!(
                "no Segment write key: pass --write-key or set {}",
                WRITE_KEY_ENV
            ))
        })
    }
}

/// Endpoint by precedence: flag, settings file, environment, built-in default.
/// Empty values count as absent.
pub fn resolve_endpoint(
    flag: Option<String>,
    file: Option<String>,
    env: Option<String>,
) -> String {
    flag.into_iter()
        .chain(file)
        .chain(env)
        .map(|e| e.trim().to_string())
        .find(|e| !e.is_empty())
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT, None)
    }
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            user_id_column: Some("userId".to_string()),
            email_column: "email".to_string(),
            phone_column: "phone_number".to_string(),
            event: EventSource::Column("event".to_string()),
            timestamp_column: None,
            required_columns: Vec::new(),
            hashing: HashingConfig::default(),
            traits: TraitsMode::Off,
        }
    }
}

impl MappingConfig {
    /// Gym check-in import: hashed email as identifier, raw and hashed
    /// contact traits, fixed event name, event time from the sheet
    pub fn check_in() -> Self {
        Self {
            user_id_column: None,
            email_column: "email".to_string(),
            phone_column: "phone".to_string(),
            event: EventSource::Fixed("Checked In".to_string()),
            timestamp_column: Some("timestamp".to_string()),
            required_columns: [
                "email",
                "phone",
                "club_name",
                "club_location",
                "membership_level",
                "timestamp",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            hashing: HashingConfig {
                identifier: true,
                email: true,
                phone: true,
            },
            traits: TraitsMode::RawAndHashed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mapping() {
        let config = MappingConfig::default();
        assert_eq!(config.user_id_column.as_deref(), Some("userId"));
        assert_eq!(config.email_column, "email");
        assert_eq!(config.phone_column, "phone_number");
        assert_eq!(config.event, EventSource::Column("event".to_string()));
        assert!(!config.hashing.identifier);
        assert_eq!(config.traits, TraitsMode::Off);
    }

    #[test]
    fn test_check_in_mapping() {
        let config = MappingConfig::check_in();
        assert_eq!(config.event, EventSource::Fixed("Checked In".to_string()));
        assert_eq!(config.timestamp_column.as_deref(), Some("timestamp"));
        assert_eq!(config.required_columns.len(), 6);
        assert_eq!(config.user_id_column, None);
        assert!(config.hashing.identifier);
        assert_eq!(config.traits, TraitsMode::RawAndHashed);
    }

    #[test]
    fn test_write_key_resolution() {
        assert_eq!(
            WriteKey::resolve(Some("flag".into()), Some("env".into())),
            Some(WriteKey("flag".into()))
        );
        assert_eq!(
            WriteKey::resolve(None, Some("env".into())),
            Some(WriteKey("env".into()))
        );
        assert_eq!(
            WriteKey::resolve(Some("  ".into()), Some("env".into())),
            Some(WriteKey("env".into()))
        );
        assert_eq!(WriteKey::resolve(None, Some(String::new())), None);
        assert_eq!(WriteKey::resolve(None, None), None);
    }

    #[test]
    fn test_write_key_debug_is_redacted() {
        let key = WriteKey("secret".into());
        assert!(!format!("{:?}", key).contains("secret"));
    }

    #[test]
    fn test_missing_write_key_message() {
        let api = ApiConfig::default();
        let err = api.require_write_key().unwrap_err().to_string();
        assert!(err.contains("--write-key"));
        assert!(err.contains(WRITE_KEY_ENV));
    }

    #[test]
    fn test_endpoint_trailing_slash() {
        let api = ApiConfig::new("http://localhost:8080/", None);
        assert_eq!(api.endpoint, "http://localhost:8080");
    }

    #[test]
    fn test_endpoint_precedence() {
        let some = |s: &str| Some(s.to_string());
        assert_eq!(
            resolve_endpoint(some("http://flag"), some("http://file"), some("http://env")),
            "http://flag"
        );
        assert_eq!(
            resolve_endpoint(None, some("http://file"), some("http://env")),
            "http://file"
        );
        assert_eq!(
            resolve_endpoint(None, None, some("http://env")),
            "http://env"
        );
        assert_eq!(resolve_endpoint(None, some(" "), None), DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_batch_size_zero_rejected() {
        assert!(DispatchMode::batch(0).is_err());
        assert_eq!(
            DispatchMode::batch(10).unwrap(),
            DispatchMode::Batch { size: 10 }
        );
    }
}

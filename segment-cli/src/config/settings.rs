//! Layered settings: profile preset < settings file < command-line flags
//!
//! Every field is optional so layers can be merged field by field. A settings
//! file looks like:
//!
//! ```toml
//! user_id_col = "customer_id"
//! event_col = "action"
//! hash_id = true
//! mode = "batch"
//! batch_size = 250
//! require = ["customer_id", "action"]
//! ```

use std::path::Path;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::{
    DEFAULT_BATCH_SIZE, DispatchMode, EventSource, HashingConfig, MappingConfig, TraitsMode,
};
use crate::error::{ImportError, ImportResult};

/// Named starting point for the settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Profile {
    /// Identifier and event name read from columns
    #[default]
    Generic,
    /// Gym check-in export
    CheckIn,
}

impl Profile {
    pub fn mapping(self) -> MappingConfig {
        match self {
            Profile::Generic => MappingConfig::default(),
            Profile::CheckIn => MappingConfig::check_in(),
        }
    }
}

/// Dispatch mode as written in settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeKind {
    /// One request per row
    Track,
    /// Rows grouped into batch requests
    Batch,
}

/// One layer of settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub user_id_col: Option<String>,
    pub email_col: Option<String>,
    pub phone_col: Option<String>,
    pub event_col: Option<String>,
    pub event_name: Option<String>,
    pub timestamp_col: Option<String>,
    pub require: Option<Vec<String>>,
    pub hash_id: Option<bool>,
    pub hash_email: Option<bool>,
    pub hash_phone: Option<bool>,
    pub traits: Option<TraitsMode>,
    pub mode: Option<ModeKind>,
    pub batch_size: Option<usize>,
    pub endpoint: Option<String>,
}

impl Settings {
    /// Read a TOML settings file
    pub fn load<P: AsRef<Path>>(path: P) -> ImportResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ImportError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
            .map_err(|e| ImportError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Fields set in `over` win; required columns accumulate
    pub fn merge(self, over: Settings) -> Settings {
        let require = match (self.require, over.require) {
            (Some(mut base), Some(extra)) => {
                for column in extra {
                    if !base.contains(&column) {
                        base.push(column);
                    }
                }
                Some(base)
            }
            (base, extra) => extra.or(base),
        };

        // A fixed name and a name column are alternatives: the upper layer's
        // choice replaces both
        let (event_col, event_name) = if over.event_col.is_some() || over.event_name.is_some() {
            (over.event_col, over.event_name)
        } else {
            (self.event_col, self.event_name)
        };

        Settings {
            user_id_col: over.user_id_col.or(self.user_id_col),
            email_col: over.email_col.or(self.email_col),
            phone_col: over.phone_col.or(self.phone_col),
            event_col,
            event_name,
            timestamp_col: over.timestamp_col.or(self.timestamp_col),
            require,
            hash_id: over.hash_id.or(self.hash_id),
            hash_email: over.hash_email.or(self.hash_email),
            hash_phone: over.hash_phone.or(self.hash_phone),
            traits: over.traits.or(self.traits),
            mode: over.mode.or(self.mode),
            batch_size: over.batch_size.or(self.batch_size),
            endpoint: over.endpoint.or(self.endpoint),
        }
    }

    /// Apply these settings on top of a profile's mapping
    pub fn mapping(&self, profile: Profile) -> MappingConfig {
        let base = profile.mapping();

        let event = match (&self.event_name, &self.event_col) {
            (Some(name), _) => EventSource::Fixed(name.clone()),
            (None, Some(column)) => EventSource::Column(column.clone()),
            (None, None) => base.event,
        };

        let mut required_columns = base.required_columns;
        for column in self.require.iter().flatten() {
            if !required_columns.contains(column) {
                required_columns.push(column.clone());
            }
        }

        MappingConfig {
            user_id_column: self.user_id_col.clone().or(base.user_id_column),
            email_column: self.email_col.clone().unwrap_or(base.email_column),
            phone_column: self.phone_col.clone().unwrap_or(base.phone_column),
            event,
            timestamp_column: self.timestamp_col.clone().or(base.timestamp_column),
            required_columns,
            hashing: HashingConfig {
                identifier: self.hash_id.unwrap_or(base.hashing.identifier),
                email: self.hash_email.unwrap_or(base.hashing.email),
                phone: self.hash_phone.unwrap_or(base.hashing.phone),
            },
            traits: self.traits.unwrap_or(base.traits),
        }
    }

    /// Dispatch mode; a batch size without an explicit mode means batch
    pub fn dispatch(&self) -> ImportResult<DispatchMode> {
        let mode = self.mode.unwrap_or(if self.batch_size.is_some() {
            ModeKind::Batch
        } else {
            ModeKind::Track
        });
        match mode {
            ModeKind::Track => Ok(DispatchMode::Single),
            ModeKind::Batch => DispatchMode::batch(self.batch_size.unwrap_or(DEFAULT_BATCH_SIZE)),
        }
    }
}

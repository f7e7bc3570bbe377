//! Row to event mapping

use serde_json::{Map, Value};

use super::normalize::{clean_email, clean_phone, hash_value};
use super::timestamp::normalize_timestamp;
use crate::api::{EventContext, TrackEvent};
use crate::config::{EventSource, HashingConfig, MappingConfig, TraitsMode};
use crate::error::{ImportError, ImportResult};
use crate::sheet::{CellValue, Record};

/// Column the user identifier is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentifierSource {
    /// The primary identifier column, used as written
    Column(String),
    /// Fallback to the email column, normalized
    Email(String),
}

impl IdentifierSource {
    pub fn column(&self) -> &str {
        match self {
            IdentifierSource::Column(c) | IdentifierSource::Email(c) => c,
        }
    }
}

/// Turns records into track events.
///
/// Built once per run against the sheet header, which is where every column
/// check happens; mapping a record afterwards only fails on bad cell values.
#[derive(Debug, Clone)]
pub struct RowMapper {
    identifier: IdentifierSource,
    event: EventSource,
    email_column: Option<String>,
    phone_column: Option<String>,
    timestamp_column: Option<String>,
    hashing: HashingConfig,
    traits: TraitsMode,
    /// Columns that never reach `properties`
    consumed: Vec<String>,
}

impl RowMapper {
    pub fn new<S: AsRef<str>>(config: &MappingConfig, headers: &[S]) -> ImportResult<Self> {
        let has = |column: &str| headers.iter().any(|h| h.as_ref() == column);

        let mut missing: Vec<String> = Vec::new();
        let mut require = |column: &str| {
            if !has(column) && !missing.iter().any(|m| m == column) {
                missing.push(column.to_string());
            }
        };

        for column in &config.required_columns {
            require(column.as_str());
        }
        if let EventSource::Column(column) = &config.event {
            require(column.as_str());
        }
        if let Some(column) = &config.timestamp_column {
            require(column.as_str());
        }

        let user_id_column = config.user_id_column.as_deref().filter(|c| has(*c));
        let identifier = if let Some(column) = user_id_column {
            Some(IdentifierSource::Column(column.to_string()))
        } else if has(config.email_column.as_str()) {
            Some(IdentifierSource::Email(config.email_column.clone()))
        } else {
            if let Some(column) = &config.user_id_column {
                require(column.as_str());
            }
            require(config.email_column.as_str());
            None
        };

        let identifier = match identifier {
            Some(identifier) if missing.is_empty() => identifier,
            _ => return Err(ImportError::Schema { missing }),
        };

        let email_column = Some(config.email_column.clone()).filter(|c| has(c.as_str()));
        let phone_column = Some(config.phone_column.clone()).filter(|c| has(c.as_str()));

        let mut consumed = vec![identifier.column().to_string()];
        if let EventSource::Column(column) = &config.event {
            consumed.push(column.clone());
        }
        if let Some(column) = &config.timestamp_column {
            consumed.push(column.clone());
        }
        if config.traits != TraitsMode::Off {
            consumed.extend(email_column.iter().cloned());
            consumed.extend(phone_column.iter().cloned());
        }

        log::debug!(
            "Identifier from '{}', {} columns kept out of properties",
            identifier.column(),
            consumed.len()
        );

        Ok(Self {
            identifier,
            event: config.event.clone(),
            email_column,
            phone_column,
            timestamp_column: config.timestamp_column.clone(),
            hashing: config.hashing,
            traits: config.traits,
            consumed,
        })
    }

    pub fn identifier(&self) -> &IdentifierSource {
        &self.identifier
    }

    /// Map one record to its event
    pub fn map(&self, record: &Record) -> ImportResult<TrackEvent> {
        let user_id = self.user_id(record)?;
        let event = self.event_name(record)?;

        let timestamp = match &self.timestamp_column {
            Some(column) => Some(
                normalize_timestamp(cell(record, column))
                    .map_err(|message| ImportError::value(record.row, column, message))?,
            ),
            None => None,
        };

        let mut properties = Map::new();
        for (name, value) in &record.fields {
            if self.consumed.contains(name) {
                continue;
            }
            properties.insert(name.clone(), self.property_value(name, value));
        }

        let traits = self.traits(record);
        let context = if traits.is_empty() {
            None
        } else {
            Some(EventContext { traits })
        };

        Ok(TrackEvent {
            user_id,
            event,
            properties,
            context,
            timestamp,
        })
    }

    fn user_id(&self, record: &Record) -> ImportResult<String> {
        let (column, raw, hash) = match &self.identifier {
            IdentifierSource::Column(column) => (
                column,
                cell(record, column).to_string(),
                self.hashing.identifier,
            ),
            IdentifierSource::Email(column) => (
                column,
                clean_email(&cell(record, column).to_string()),
                self.hashing.identifier || self.hashing.email,
            ),
        };

        if raw.trim().is_empty() {
            return Err(ImportError::value(record.row, column, "user identifier is empty"));
        }
        Ok(if hash { hash_value(&raw) } else { raw })
    }

    fn event_name(&self, record: &Record) -> ImportResult<String> {
        match &self.event {
            EventSource::Fixed(name) => Ok(name.clone()),
            EventSource::Column(column) => {
                let name = cell(record, column).to_string();
                if name.trim().is_empty() {
                    return Err(ImportError::value(record.row, column, "event name is empty"));
                }
                Ok(name)
            }
        }
    }

    /// Property value, with the digest standing in for hashed email/phone
    fn property_value(&self, name: &str, value: &CellValue) -> Value {
        if value.is_null() {
            return Value::Null;
        }
        if self.hashing.email && self.email_column.as_deref() == Some(name) {
            return Value::String(hash_value(&clean_email(&value.to_string())));
        }
        if self.hashing.phone && self.phone_column.as_deref() == Some(name) {
            return Value::String(hash_value(&clean_phone(&value.to_string())));
        }
        value.to_json()
    }

    fn traits(&self, record: &Record) -> Map<String, Value> {
        let mut traits = Map::new();
        if self.traits == TraitsMode::Off {
            return traits;
        }

        let fields = [
            ("email", &self.email_column, clean_email as fn(&str) -> String),
            ("phone", &self.phone_column, clean_phone as fn(&str) -> String),
        ];
        for (key, column, clean) in fields {
            let Some(column) = column else { continue };
            let value = clean(&cell(record, column).to_string());
            if value.is_empty() {
                continue;
            }
            let hashed = hash_value(&value);
            if self.traits == TraitsMode::RawAndHashed {
                traits.insert(key.to_string(), Value::String(value));
            }
            traits.insert(format!("hashed_{}", key), Value::String(hashed));
        }
        traits
    }
}

fn cell<'a>(record: &'a Record, column: &str) -> &'a CellValue {
    const NULL: &CellValue = &CellValue::Null;
    record.get(column).unwrap_or(NULL)
}

//! Record to event mapping
//!
//! Resolves the user identifier (primary column, else normalized email),
//! names the event, optionally hashes identity fields, normalizes the event
//! time and carries every other column through as a property.

mod normalize;
mod row;
mod timestamp;

pub use normalize::{clean_email, clean_phone, hash_value};
pub use row::{IdentifierSource, RowMapper};
pub use timestamp::{format_timestamp, normalize_timestamp, parse_timestamp};

//! Normalization and hashing of identity fields

use sha2::{Digest, Sha256};

/// Trim surrounding whitespace and lower-case
pub fn clean_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Keep only the digits
pub fn clean_phone(phone: &str) -> String {
    phone.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Lower-case hex SHA-256 of the value's UTF-8 bytes
pub fn hash_value(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    hex::encode(hasher.finalize())
}

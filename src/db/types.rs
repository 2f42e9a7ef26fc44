//! Key and value encodings for the database
//!
//! # Types
//!
//! - **`IndexKey`**: composite `owner \0 member` key used by the index trees.
//!   One sled key per edge keeps every index update a single atomic insert or
//!   remove, so concurrent deletes never lose updates.
//! - **`encode_record`** / **`decode_record`**: bincode encoding for
//!   [`ContentRecord`] values.
//!
//! Ids must not contain NUL bytes; [`check_id`] enforces this on every write.
//!
//! # Examples
//!
//! ```
//! use canopy::db::types::IndexKey;
//!
//! let key = IndexKey::new("season1", "ep1");
//! let bytes = key.to_bytes();
//! assert!(bytes.starts_with(&IndexKey::prefix("season1")));
//! assert_eq!(IndexKey::member_from_bytes("season1", &bytes).unwrap(), "ep1");
//! ```

use super::error::DbError;
use crate::tree::ContentRecord;

const SEPARATOR: u8 = 0;

/// Edge in an index tree: `owner` contains `member`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexKey {
    pub owner: String,
    pub member: String,
}

impl IndexKey {
    pub fn new(owner: impl Into<String>, member: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            member: member.into(),
        }
    }

    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Self::prefix(&self.owner);
        bytes.extend_from_slice(self.member.as_bytes());
        bytes
    }

    /// Scan prefix matching every member of `owner`
    #[must_use]
    pub fn prefix(owner: &str) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(owner.len() + 1);
        bytes.extend_from_slice(owner.as_bytes());
        bytes.push(SEPARATOR);
        bytes
    }

    /// Extract the member id from a key under `owner`
    ///
    /// # Errors
    ///
    /// Returns `DbError::SerializeError` if the key does not belong to `owner`
    /// or the member is not valid UTF-8.
    pub fn member_from_bytes(owner: &str, bytes: &[u8]) -> Result<String, DbError> {
        let prefix = Self::prefix(owner);
        let member = bytes
            .strip_prefix(prefix.as_slice())
            .ok_or_else(|| DbError::SerializeError(format!("Index key outside of {owner}")))?;
        String::from_utf8(member.to_vec())
            .map_err(|_| DbError::SerializeError("Invalid UTF-8 in index key".into()))
    }
}

/// Reject ids that cannot be stored in an [`IndexKey`]
///
/// # Errors
///
/// Returns `DbError::InvalidInput` if `id` is empty or contains a NUL byte.
pub fn check_id(id: &str) -> Result<(), DbError> {
    if id.is_empty() {
        return Err(DbError::InvalidInput("Id must not be empty".into()));
    }
    if id.as_bytes().contains(&SEPARATOR) {
        return Err(DbError::InvalidInput(format!("Id contains a NUL byte: {id:?}")));
    }
    Ok(())
}

/// # Errors
///
/// Returns `DbError::EncodeError` if the record cannot be serialized.
pub fn encode_record(record: &ContentRecord) -> Result<Vec<u8>, DbError> {
    Ok(bincode::encode_to_vec(record, bincode::config::standard())?)
}

/// # Errors
///
/// Returns `DbError::DecodeError` if the bytes are not a valid record.
pub fn decode_record(bytes: &[u8]) -> Result<ContentRecord, DbError> {
    let (record, _): (ContentRecord, usize) =
        bincode::decode_from_slice(bytes, bincode::config::standard())?;
    Ok(record)
}

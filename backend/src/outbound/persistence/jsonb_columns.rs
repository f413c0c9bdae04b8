//! Encoding helpers for JSONB and enum-like text columns.
//!
//! Decode failures mean the stored row no longer matches the domain model;
//! they surface as query errors naming the column rather than as panics.

use std::fmt::Display;
use std::str::FromStr;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::ports::RepositoryError;

pub(super) fn encode<T: Serialize + ?Sized>(
    value: &T,
    column: &str,
) -> Result<Value, RepositoryError> {
    serde_json::to_value(value)
        .map_err(|err| RepositoryError::query(format!("cannot encode {column}: {err}")))
}

pub(super) fn decode<T: DeserializeOwned>(value: Value, column: &str) -> Result<T, RepositoryError> {
    serde_json::from_value(value)
        .map_err(|err| RepositoryError::query(format!("corrupted {column} in database: {err}")))
}

/// Parse a text column through the domain type's `FromStr`.
pub(super) fn parse<T>(raw: &str, column: &str) -> Result<T, RepositoryError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.parse()
        .map_err(|err| RepositoryError::query(format!("corrupted {column} in database: {err}")))
}

/// Counts are stored as `INTEGER` with non-negative checks.
pub(super) fn count_from_db(raw: i32, column: &str) -> Result<u32, RepositoryError> {
    u32::try_from(raw)
        .map_err(|_| RepositoryError::query(format!("negative {column} in database")))
}

pub(super) fn count_to_db(count: u32, column: &str) -> Result<i32, RepositoryError> {
    i32::try_from(count)
        .map_err(|_| RepositoryError::query(format!("{column} exceeds column range")))
}

//! Entity trait - common interface for stored records

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

use crate::core::identity::{RecordId, RecordPrefix};

/// Common trait for stored records
pub trait Entity: Serialize + DeserializeOwned {
    /// The record type prefix
    const PREFIX: RecordPrefix;

    /// Get the record's unique ID
    fn id(&self) -> &RecordId;

    /// Short human-readable title for listings
    fn title(&self) -> String;

    /// Get the record's status
    fn status(&self) -> String;

    /// Get the creation timestamp
    fn created(&self) -> DateTime<Utc>;

    /// Get the author
    fn author(&self) -> &str;
}

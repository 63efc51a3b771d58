//! Record identifiers: a type prefix, the production or test date and a
//! daily sequence number (`LOT20250124001`, `SAMP20250124003`)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Record type prefixes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordPrefix {
    /// Production batch (lot number)
    Lot,
    /// Laboratory sample
    Samp,
    /// Energy consumption reading
    Nrg,
    /// Waste record
    Wst,
    /// Raw material receipt
    Mat,
}

impl RecordPrefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordPrefix::Lot => "LOT",
            RecordPrefix::Samp => "SAMP",
            RecordPrefix::Nrg => "NRG",
            RecordPrefix::Wst => "WST",
            RecordPrefix::Mat => "MAT",
        }
    }

    pub fn all() -> &'static [RecordPrefix] {
        &[
            RecordPrefix::Lot,
            RecordPrefix::Samp,
            RecordPrefix::Nrg,
            RecordPrefix::Wst,
            RecordPrefix::Mat,
        ]
    }

    /// Directory (relative to the project root) holding records of this type
    pub fn directory(&self) -> &'static str {
        match self {
            RecordPrefix::Lot => "batches",
            RecordPrefix::Samp => "samples",
            RecordPrefix::Nrg => "energy",
            RecordPrefix::Wst => "waste",
            RecordPrefix::Mat => "materials",
        }
    }
}

impl fmt::Display for RecordPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RecordPrefix {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "LOT" => Ok(RecordPrefix::Lot),
            "SAMP" => Ok(RecordPrefix::Samp),
            "NRG" => Ok(RecordPrefix::Nrg),
            "WST" => Ok(RecordPrefix::Wst),
            "MAT" => Ok(RecordPrefix::Mat),
            _ => Err(IdParseError::InvalidPrefix(s.to_string())),
        }
    }
}

/// A record identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId {
    prefix: RecordPrefix,
    date: NaiveDate,
    seq: u32,
}

impl RecordId {
    pub fn new(prefix: RecordPrefix, date: NaiveDate, seq: u32) -> Self {
        Self { prefix, date, seq }
    }

    /// Next free identifier for `date`: one past the highest sequence already
    /// used on that date
    pub fn next<'a>(
        prefix: RecordPrefix,
        date: NaiveDate,
        existing: impl IntoIterator<Item = &'a RecordId>,
    ) -> Self {
        let highest = existing
            .into_iter()
            .filter(|id| id.prefix == prefix && id.date == date)
            .map(|id| id.seq)
            .max()
            .unwrap_or(0);
        Self::new(prefix, date, highest + 1)
    }

    pub fn prefix(&self) -> RecordPrefix {
        self.prefix
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn seq(&self) -> u32 {
        self.seq
    }

    pub fn parse(s: &str) -> Result<Self, IdParseError> {
        s.parse()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{:03}",
            self.prefix,
            self.date.format("%Y%m%d"),
            self.seq
        )
    }
}

impl FromStr for RecordId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| IdParseError::MissingDate(s.to_string()))?;
        let (prefix_str, rest) = s.split_at(split);
        let prefix = prefix_str.parse()?;

        if rest.len() < 11 || !rest.chars().all(|c| c.is_ascii_digit()) {
            return Err(IdParseError::MissingDate(s.to_string()));
        }
        let (date_str, seq_str) = rest.split_at(8);
        let date = NaiveDate::parse_from_str(date_str, "%Y%m%d")
            .map_err(|_| IdParseError::InvalidDate(date_str.to_string()))?;
        let seq = seq_str
            .parse()
            .map_err(|_| IdParseError::InvalidSequence(seq_str.to_string()))?;

        Ok(Self { prefix, date, seq })
    }
}

impl Serialize for RecordId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors that can occur when parsing record IDs
#[derive(Debug, Error)]
pub enum IdParseError {
    #[error("invalid record prefix: '{0}' (valid: LOT, SAMP, NRG, WST, MAT)")]
    InvalidPrefix(String),

    #[error("expected <PREFIX><YYYYMMDD><NNN>, got '{0}'")]
    MissingDate(String),

    #[error("invalid date '{0}' in record ID")]
    InvalidDate(String),

    #[error("invalid sequence number '{0}'")]
    InvalidSequence(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 24).unwrap()
    }

    #[test]
    fn test_display() {
        assert_eq!(RecordId::new(RecordPrefix::Lot, day(), 1).to_string(), "LOT20250124001");
        assert_eq!(RecordId::new(RecordPrefix::Samp, day(), 42).to_string(), "SAMP20250124042");
        assert_eq!(RecordId::new(RecordPrefix::Samp, day(), 1234).to_string(), "SAMP202501241234");
    }

    #[test]
    fn test_parse() {
        let id = RecordId::parse("SAMP20250124007").unwrap();
        assert_eq!(id.prefix(), RecordPrefix::Samp);
        assert_eq!(id.date(), day());
        assert_eq!(id.seq(), 7);

        let lower = RecordId::parse("lot20250124001").unwrap();
        assert_eq!(lower.prefix(), RecordPrefix::Lot);

        assert_eq!(RecordId::parse("NRG20250124001").unwrap().prefix(), RecordPrefix::Nrg);
        assert_eq!(RecordId::parse("WST20250124001").unwrap().prefix(), RecordPrefix::Wst);
        assert_eq!(RecordId::parse("MAT20250124001").unwrap().prefix(), RecordPrefix::Mat);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            RecordId::parse("REQ20250124001").unwrap_err(),
            IdParseError::InvalidPrefix(_)
        ));
        assert!(matches!(
            RecordId::parse("SAMP2025").unwrap_err(),
            IdParseError::MissingDate(_)
        ));
        assert!(matches!(
            RecordId::parse("SAMP").unwrap_err(),
            IdParseError::MissingDate(_)
        ));
        assert!(matches!(
            RecordId::parse("LOT20251340001").unwrap_err(),
            IdParseError::InvalidDate(_)
        ));
    }

    #[test]
    fn test_next_sequence() {
        let other_day = NaiveDate::from_ymd_opt(2025, 1, 23).unwrap();
        let existing = vec![
            RecordId::new(RecordPrefix::Samp, day(), 1),
            RecordId::new(RecordPrefix::Samp, day(), 4),
            RecordId::new(RecordPrefix::Samp, other_day, 9),
            RecordId::new(RecordPrefix::Lot, day(), 12),
        ];
        let next = RecordId::next(RecordPrefix::Samp, day(), &existing);
        assert_eq!(next.to_string(), "SAMP20250124005");

        let first = RecordId::next(RecordPrefix::Lot, other_day, &existing);
        assert_eq!(first.seq(), 1);
    }

    #[test]
    fn test_serde_as_string() {
        let id = RecordId::new(RecordPrefix::Lot, day(), 3);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"LOT20250124003\"");
        let back: RecordId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}

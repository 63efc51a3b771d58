//! Production batch entity type (lot)

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::compliance::{ComplianceError, TileClassification};
use crate::core::entity::Entity;
use crate::core::identity::{RecordId, RecordPrefix};

/// Batch production status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum BatchStatus {
    #[default]
    Planned,
    InProgress,
    Completed,
    Approved,
    Rejected,
}

impl BatchStatus {
    /// Allowed next statuses
    pub fn allowed_transitions(&self) -> &'static [BatchStatus] {
        match self {
            BatchStatus::Planned => &[BatchStatus::InProgress],
            BatchStatus::InProgress => &[BatchStatus::Completed],
            BatchStatus::Completed => &[BatchStatus::Approved, BatchStatus::Rejected],
            // A rejected batch may be reworked
            BatchStatus::Rejected => &[BatchStatus::InProgress],
            BatchStatus::Approved => &[],
        }
    }

    pub fn can_transition_to(&self, to: BatchStatus) -> bool {
        self.allowed_transitions().contains(&to)
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchStatus::Planned => write!(f, "planned"),
            BatchStatus::InProgress => write!(f, "in_progress"),
            BatchStatus::Completed => write!(f, "completed"),
            BatchStatus::Approved => write!(f, "approved"),
            BatchStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl FromStr for BatchStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "planned" => Ok(BatchStatus::Planned),
            "in_progress" | "in-progress" | "inprogress" => Ok(BatchStatus::InProgress),
            "completed" => Ok(BatchStatus::Completed),
            "approved" => Ok(BatchStatus::Approved),
            "rejected" => Ok(BatchStatus::Rejected),
            _ => Err(format!(
                "Invalid batch status: {}. Use planned, in_progress, completed, approved, or rejected",
                s
            )),
        }
    }
}

/// Errors raised when changing a batch
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Invalid status transition: {from} → {to}")]
    InvalidTransition { from: BatchStatus, to: BatchStatus },
}

/// Declared tile format (width × length, cm)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProductFormat {
    F20x20,
    F25x40,
    F25x50,
    /// Any other format, kept verbatim in normalised `WxL` form
    Other(String),
}

impl ProductFormat {
    pub fn as_str(&self) -> &str {
        match self {
            ProductFormat::F20x20 => "20x20",
            ProductFormat::F25x40 => "25x40",
            ProductFormat::F25x50 => "25x50",
            ProductFormat::Other(s) => s,
        }
    }

    /// Formats with their own pressing tolerances
    pub fn known() -> &'static [ProductFormat] {
        &[ProductFormat::F20x20, ProductFormat::F25x40, ProductFormat::F25x50]
    }

    /// Find a format token inside a product description, e.g.
    /// "Faïence murale 25x40 blanc"
    pub fn from_product_type(product_type: &str) -> Option<ProductFormat> {
        product_type
            .split(|c: char| c.is_whitespace() || c == '-' || c == '_' || c == '/')
            .find_map(|token| token.parse().ok())
    }
}

impl fmt::Display for ProductFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ProductFormat {
    type Err = ComplianceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| if c == '×' || c == '*' { 'x' } else { c })
            .collect();
        let normalised = normalised.strip_suffix("cm").unwrap_or(normalised.as_str());

        let (a, b) = normalised
            .split_once('x')
            .ok_or_else(|| ComplianceError::InvalidFormat(s.to_string()))?;
        let a: u32 = a
            .parse()
            .map_err(|_| ComplianceError::InvalidFormat(s.to_string()))?;
        let b: u32 = b
            .parse()
            .map_err(|_| ComplianceError::InvalidFormat(s.to_string()))?;

        let (short, long) = if a <= b { (a, b) } else { (b, a) };
        Ok(match (short, long) {
            (20, 20) => ProductFormat::F20x20,
            (25, 40) => ProductFormat::F25x40,
            (25, 50) => ProductFormat::F25x50,
            _ => ProductFormat::Other(format!("{}x{}", a, b)),
        })
    }
}

impl Serialize for ProductFormat {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ProductFormat {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Nominal dimensions declared for a batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NominalBatchDimensions {
    /// Nominal length (mm)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,

    /// Nominal width (mm)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,

    /// Nominal thickness (mm)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thickness: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<ProductFormat>,

    /// Declared product classification
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<TileClassification>,
}

impl NominalBatchDimensions {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Production batch entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionBatch {
    /// Lot number (LOTYYYYMMDDNNN)
    pub id: RecordId,

    /// Product description, e.g. "Faïence 25x40 blanc"
    pub product_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planned_quantity: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_quantity: Option<u32>,

    pub production_date: NaiveDate,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kiln_number: Option<String>,

    /// Peak kiln temperature (°C)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kiln_temperature: Option<f64>,

    /// Firing cycle duration (minutes)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firing_duration: Option<f64>,

    #[serde(default)]
    pub status: BatchStatus,

    #[serde(default, skip_serializing_if = "NominalBatchDimensions::is_empty")]
    pub nominal: NominalBatchDimensions,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    /// Author
    pub author: String,
}

impl ProductionBatch {
    pub fn new(id: RecordId, product_type: impl Into<String>, author: impl Into<String>) -> Self {
        let production_date = id.date();
        Self {
            id,
            product_type: product_type.into(),
            planned_quantity: None,
            actual_quantity: None,
            production_date,
            kiln_number: None,
            kiln_temperature: None,
            firing_duration: None,
            status: BatchStatus::default(),
            nominal: NominalBatchDimensions::default(),
            notes: None,
            created: Utc::now(),
            author: author.into(),
        }
    }

    /// Nominal dimensions, with the format inferred from the product type
    /// when it was not declared
    pub fn nominal_dimensions(&self) -> NominalBatchDimensions {
        let mut nominal = self.nominal.clone();
        if nominal.format.is_none() {
            nominal.format = ProductFormat::from_product_type(&self.product_type);
        }
        nominal
    }

    pub fn set_status(&mut self, to: BatchStatus) -> Result<(), BatchError> {
        if !self.status.can_transition_to(to) {
            return Err(BatchError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }
}

impl Entity for ProductionBatch {
    const PREFIX: RecordPrefix = RecordPrefix::Lot;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn title(&self) -> String {
        self.product_type.clone()
    }

    fn status(&self) -> String {
        self.status.to_string()
    }

    fn created(&self) -> DateTime<Utc> {
        self.created
    }

    fn author(&self) -> &str {
        &self.author
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lot() -> RecordId {
        RecordId::parse("LOT20250124001").unwrap()
    }

    #[test]
    fn test_batch_creation() {
        let batch = ProductionBatch::new(lot(), "Faience 25x40", "Test Author");
        assert_eq!(batch.status, BatchStatus::Planned);
        assert_eq!(batch.production_date, NaiveDate::from_ymd_opt(2025, 1, 24).unwrap());
        assert_eq!(batch.nominal_dimensions().format, Some(ProductFormat::F25x40));
    }

    #[test]
    fn test_declared_format_wins() {
        let mut batch = ProductionBatch::new(lot(), "Faience 25x40", "Test Author");
        batch.nominal.format = Some(ProductFormat::F20x20);
        assert_eq!(batch.nominal_dimensions().format, Some(ProductFormat::F20x20));
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("25x40".parse::<ProductFormat>().unwrap(), ProductFormat::F25x40);
        assert_eq!("40 × 25".parse::<ProductFormat>().unwrap(), ProductFormat::F25x40);
        assert_eq!("20X20cm".parse::<ProductFormat>().unwrap(), ProductFormat::F20x20);
        assert_eq!(
            "60x60".parse::<ProductFormat>().unwrap(),
            ProductFormat::Other("60x60".to_string())
        );
        assert!("large".parse::<ProductFormat>().is_err());
        assert!(ProductFormat::from_product_type("Grès cérame").is_none());
    }

    #[test]
    fn test_status_transitions() {
        let mut batch = ProductionBatch::new(lot(), "Faience 20x20", "Test Author");
        assert!(batch.set_status(BatchStatus::Approved).is_err());
        batch.set_status(BatchStatus::InProgress).unwrap();
        batch.set_status(BatchStatus::Completed).unwrap();
        batch.set_status(BatchStatus::Rejected).unwrap();
        batch.set_status(BatchStatus::InProgress).unwrap();
        assert_eq!(batch.status, BatchStatus::InProgress);
    }

    #[test]
    fn test_batch_deserialization() {
        let yaml = r#"
id: LOT20250124001
product_type: "Faience murale 25x40 blanc"
planned_quantity: 12000
production_date: 2025-01-24
kiln_number: "F2"
kiln_temperature: 1140
status: in_progress
nominal:
  length: 400
  width: 250
  thickness: 7.1
  classification: BIII
created: 2025-01-24T07:30:00Z
author: "Test Author"
"#;
        let batch: ProductionBatch = serde_yml::from_str(yaml).unwrap();
        assert_eq!(batch.status, BatchStatus::InProgress);
        assert_eq!(batch.nominal.length, Some(400.0));
        assert_eq!(batch.nominal.classification, Some(TileClassification::BIII));
        assert_eq!(batch.kiln_temperature, Some(1140.0));
    }
}

//! Waste record entity type

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::entity::Entity;
use crate::core::identity::{RecordId, RecordPrefix};
use crate::entities::quantity::{self, QuantityError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WasteType {
    Liquid,
    Solid,
}

impl fmt::Display for WasteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WasteType::Liquid => write!(f, "liquid"),
            WasteType::Solid => write!(f, "solid"),
        }
    }
}

impl FromStr for WasteType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "liquid" => Ok(WasteType::Liquid),
            "solid" => Ok(WasteType::Solid),
            _ => Err(format!("Invalid waste type: {}. Use liquid or solid", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisposalMethod {
    Recycled,
    Reused,
    Disposed,
}

impl fmt::Display for DisposalMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisposalMethod::Recycled => write!(f, "recycled"),
            DisposalMethod::Reused => write!(f, "reused"),
            DisposalMethod::Disposed => write!(f, "disposed"),
        }
    }
}

impl FromStr for DisposalMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "recycled" => Ok(DisposalMethod::Recycled),
            "reused" => Ok(DisposalMethod::Reused),
            "disposed" => Ok(DisposalMethod::Disposed),
            _ => Err(format!(
                "Invalid disposal method: {}. Use recycled, reused, or disposed",
                s
            )),
        }
    }
}

/// Waste leaving the plant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WasteRecord {
    /// Record ID (WSTYYYYMMDDNNN)
    pub id: RecordId,

    pub date: NaiveDate,

    pub waste_type: WasteType,

    /// e.g. "glaze sludge", "fired rejects"
    pub category: String,

    pub quantity_kg: f64,

    pub disposal_method: DisposalMethod,

    /// Share of the quantity recycled (%)
    #[serde(default)]
    pub recycling_percentage: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environmental_impact: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    pub created: DateTime<Utc>,

    pub author: String,
}

impl WasteRecord {
    pub fn new(
        id: RecordId,
        waste_type: WasteType,
        category: impl Into<String>,
        quantity_kg: f64,
        disposal_method: DisposalMethod,
        author: impl Into<String>,
    ) -> Self {
        let date = id.date();
        Self {
            id,
            date,
            waste_type,
            category: category.into(),
            quantity_kg,
            disposal_method,
            recycling_percentage: 0.0,
            environmental_impact: None,
            notes: None,
            created: Utc::now(),
            author: author.into(),
        }
    }

    pub fn validate(&self) -> Result<(), QuantityError> {
        quantity::not_blank("category", &self.category)?;
        quantity::non_negative("quantity_kg", self.quantity_kg)?;
        quantity::percentage("recycling_percentage", self.recycling_percentage)
    }

    /// Mass diverted from disposal (kg)
    pub fn recycled_kg(&self) -> f64 {
        self.quantity_kg * self.recycling_percentage / 100.0
    }
}

impl Entity for WasteRecord {
    const PREFIX: RecordPrefix = RecordPrefix::Wst;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn title(&self) -> String {
        format!("{} {}", self.waste_type, self.category)
    }

    fn status(&self) -> String {
        self.disposal_method.to_string()
    }

    fn created(&self) -> DateTime<Utc> {
        self.created
    }

    fn author(&self) -> &str {
        &self.author
    }
}

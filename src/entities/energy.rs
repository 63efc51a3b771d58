//! Energy consumption entity type

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::entity::Entity;
use crate::core::identity::{RecordId, RecordPrefix};
use crate::entities::quantity::{self, QuantityError};

/// Where the energy came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergySource {
    Electricity,
    Gas,
    Solar,
}

impl EnergySource {
    pub fn all() -> &'static [EnergySource] {
        &[EnergySource::Electricity, EnergySource::Gas, EnergySource::Solar]
    }
}

impl fmt::Display for EnergySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnergySource::Electricity => write!(f, "electricity"),
            EnergySource::Gas => write!(f, "gas"),
            EnergySource::Solar => write!(f, "solar"),
        }
    }
}

impl FromStr for EnergySource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "electricity" | "electric" => Ok(EnergySource::Electricity),
            "gas" => Ok(EnergySource::Gas),
            "solar" => Ok(EnergySource::Solar),
            _ => Err(format!(
                "Invalid energy source: {}. Use electricity, gas, or solar",
                s
            )),
        }
    }
}

/// One energy meter reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyConsumption {
    /// Record ID (NRGYYYYMMDDNNN)
    pub id: RecordId,

    pub date: NaiveDate,

    pub energy_source: EnergySource,

    /// Energy consumed (kWh)
    pub consumption_kwh: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kiln_number: Option<String>,

    /// Efficiency rating (%)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub efficiency_rating: Option<f64>,

    /// Energy recovered from kiln exhaust (kWh)
    #[serde(default)]
    pub heat_recovery_kwh: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    pub created: DateTime<Utc>,

    pub author: String,
}

impl EnergyConsumption {
    pub fn new(
        id: RecordId,
        energy_source: EnergySource,
        consumption_kwh: f64,
        author: impl Into<String>,
    ) -> Self {
        let date = id.date();
        Self {
            id,
            date,
            energy_source,
            consumption_kwh,
            cost: None,
            kiln_number: None,
            efficiency_rating: None,
            heat_recovery_kwh: 0.0,
            notes: None,
            created: Utc::now(),
            author: author.into(),
        }
    }

    pub fn validate(&self) -> Result<(), QuantityError> {
        quantity::non_negative("consumption_kwh", self.consumption_kwh)?;
        quantity::non_negative_opt("cost", self.cost)?;
        quantity::non_negative("heat_recovery_kwh", self.heat_recovery_kwh)?;
        if let Some(rating) = self.efficiency_rating {
            quantity::percentage("efficiency_rating", rating)?;
        }
        Ok(())
    }

    /// Consumption after subtracting recovered heat, never below zero
    pub fn net_kwh(&self) -> f64 {
        (self.consumption_kwh - self.heat_recovery_kwh).max(0.0)
    }
}

impl Entity for EnergyConsumption {
    const PREFIX: RecordPrefix = RecordPrefix::Nrg;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn title(&self) -> String {
        match &self.kiln_number {
            Some(kiln) => format!("{} ({})", self.energy_source, kiln),
            None => self.energy_source.to_string(),
        }
    }

    fn status(&self) -> String {
        "recorded".to_string()
    }

    fn created(&self) -> DateTime<Utc> {
        self.created
    }

    fn author(&self) -> &str {
        &self.author
    }
}

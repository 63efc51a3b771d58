//! Raw material receipt entity type

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::{RecordId, RecordPrefix};
use crate::entities::quantity::{self, QuantityError};

/// A delivery of raw material (clay, feldspar, frit, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMaterial {
    /// Record ID (MATYYYYMMDDNNN)
    pub id: RecordId,

    pub name: String,

    pub supplier: String,

    /// e.g. "clay", "glaze", "frit"
    pub category: String,

    pub quantity_kg: f64,

    /// Cost per kg
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_cost: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_grade: Option<String>,

    pub date_received: NaiveDate,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<NaiveDate>,

    /// Supplier lot number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lot_number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specifications: Option<String>,

    #[serde(default)]
    pub quality_certified: bool,

    pub created: DateTime<Utc>,

    pub author: String,
}

impl RawMaterial {
    pub fn new(
        id: RecordId,
        name: impl Into<String>,
        supplier: impl Into<String>,
        category: impl Into<String>,
        quantity_kg: f64,
        author: impl Into<String>,
    ) -> Self {
        let date_received = id.date();
        Self {
            id,
            name: name.into(),
            supplier: supplier.into(),
            category: category.into(),
            quantity_kg,
            unit_cost: None,
            quality_grade: None,
            date_received,
            expiry_date: None,
            lot_number: None,
            specifications: None,
            quality_certified: false,
            created: Utc::now(),
            author: author.into(),
        }
    }

    pub fn validate(&self) -> Result<(), QuantityError> {
        quantity::not_blank("name", &self.name)?;
        quantity::not_blank("supplier", &self.supplier)?;
        quantity::not_blank("category", &self.category)?;
        quantity::non_negative("quantity_kg", self.quantity_kg)?;
        quantity::non_negative_opt("unit_cost", self.unit_cost)?;
        if let Some(expiry) = self.expiry_date {
            if expiry < self.date_received {
                return Err(QuantityError::ExpiresBeforeReceipt {
                    received: self.date_received,
                    expiry,
                });
            }
        }
        Ok(())
    }

    /// Expired on `day` (the expiry date itself is still usable)
    pub fn is_expired(&self, day: NaiveDate) -> bool {
        self.expiry_date.is_some_and(|expiry| expiry < day)
    }

    pub fn total_cost(&self) -> Option<f64> {
        self.unit_cost.map(|cost| cost * self.quantity_kg)
    }

    /// Case-insensitive match on name or supplier
    pub fn matches(&self, search: &str) -> bool {
        let search = search.to_lowercase();
        self.name.to_lowercase().contains(&search) || self.supplier.to_lowercase().contains(&search)
    }
}

impl Entity for RawMaterial {
    const PREFIX: RecordPrefix = RecordPrefix::Mat;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn title(&self) -> String {
        format!("{} ({})", self.name, self.supplier)
    }

    fn status(&self) -> String {
        if self.quality_certified {
            "certified".to_string()
        } else {
            "uncertified".to_string()
        }
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

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    fn clay() -> RawMaterial {
        let id = RecordId::parse("MAT20250124001").unwrap();
        RawMaterial::new(id, "Red clay", "Argiles du Sud", "clay", 25000.0, "store")
    }

    #[test]
    fn test_received_date_from_id() {
        assert_eq!(clay().date_received, day(24));
        assert_eq!(clay().status(), "uncertified");
    }

    #[test]
    fn test_expiry() {
        let mut m = clay();
        assert!(!m.is_expired(day(31)));
        m.expiry_date = Some(day(30));
        assert!(!m.is_expired(day(30)));
        assert!(m.is_expired(day(31)));
        assert!(m.validate().is_ok());

        m.expiry_date = Some(day(20));
        assert!(matches!(
            m.validate().unwrap_err(),
            QuantityError::ExpiresBeforeReceipt { .. }
        ));
    }

    #[test]
    fn test_total_cost_and_search() {
        let mut m = clay();
        assert_eq!(m.total_cost(), None);
        m.unit_cost = Some(0.04);
        assert!((m.total_cost().unwrap() - 1000.0).abs() < 1e-9);

        assert!(m.matches("red"));
        assert!(m.matches("SUD"));
        assert!(!m.matches("feldspar"));
    }
}

//! Tile classification from water absorption (ISO 13006)
//!
//! Water absorption E is partitioned into five half-open ranges. Each range
//! maps to an absorption group (A/B/C) and a classification code whose
//! first letter depends on the forming method (`A` extruded, `B` pressed).
//! Boundary values belong to the lower, stricter bucket.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::compliance::ComplianceError;

/// Upper bounds (inclusive) of the first four absorption ranges, in percent
const BOUNDARIES: [f64; 4] = [0.5, 3.0, 6.0, 10.0];

/// How the tile body was formed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FormingMethod {
    #[default]
    Pressed,
    Extruded,
}

impl fmt::Display for FormingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormingMethod::Pressed => write!(f, "pressed"),
            FormingMethod::Extruded => write!(f, "extruded"),
        }
    }
}

impl FromStr for FormingMethod {
    type Err = ComplianceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pressed" | "b" => Ok(FormingMethod::Pressed),
            "extruded" | "a" => Ok(FormingMethod::Extruded),
            _ => Err(ComplianceError::UnknownFormingMethod(s.to_string())),
        }
    }
}

/// ISO 13006 water absorption group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbsorptionGroup {
    /// Low absorption (E ≤ 0.5%)
    A,
    /// Medium absorption (0.5% < E ≤ 10%)
    B,
    /// High absorption (E > 10%)
    C,
}

impl fmt::Display for AbsorptionGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbsorptionGroup::A => write!(f, "A"),
            AbsorptionGroup::B => write!(f, "B"),
            AbsorptionGroup::C => write!(f, "C"),
        }
    }
}

/// Tile classification code
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileClassification {
    AIa,
    AIIa,
    AIIb,
    AIIc,
    AIII,
    BIa,
    BIIa,
    BIIb,
    BIIc,
    BIII,
}

impl TileClassification {
    /// Get the classification code as written on product documentation
    pub fn as_str(&self) -> &'static str {
        match self {
            TileClassification::AIa => "AIa",
            TileClassification::AIIa => "AIIa",
            TileClassification::AIIb => "AIIb",
            TileClassification::AIIc => "AIIc",
            TileClassification::AIII => "AIII",
            TileClassification::BIa => "BIa",
            TileClassification::BIIa => "BIIa",
            TileClassification::BIIb => "BIIb",
            TileClassification::BIIc => "BIIc",
            TileClassification::BIII => "BIII",
        }
    }

    /// Get all classification codes, extruded first
    pub fn all() -> &'static [TileClassification] {
        &[
            TileClassification::AIa,
            TileClassification::AIIa,
            TileClassification::AIIb,
            TileClassification::AIIc,
            TileClassification::AIII,
            TileClassification::BIa,
            TileClassification::BIIa,
            TileClassification::BIIb,
            TileClassification::BIIc,
            TileClassification::BIII,
        ]
    }

    /// Pressed porcelain tiles get the tight dimensional table
    pub fn is_porcelain(&self) -> bool {
        matches!(self, TileClassification::BIa)
    }

    pub fn forming_method(&self) -> FormingMethod {
        if self.as_str().starts_with('A') {
            FormingMethod::Extruded
        } else {
            FormingMethod::Pressed
        }
    }

    pub fn group(&self) -> AbsorptionGroup {
        match self {
            TileClassification::AIa | TileClassification::BIa => AbsorptionGroup::A,
            TileClassification::AIII | TileClassification::BIII => AbsorptionGroup::C,
            _ => AbsorptionGroup::B,
        }
    }
}

impl fmt::Display for TileClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TileClassification {
    type Err = ComplianceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::all()
            .iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .copied()
            .ok_or_else(|| ComplianceError::UnknownClassification(s.to_string()))
    }
}

/// Result of classifying a tile by its water absorption
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub group: AbsorptionGroup,
    pub code: TileClassification,
}

/// Classify a tile from its water absorption percentage
///
/// Returns `None` when no absorption value was measured.
pub fn classify(water_absorption: Option<f64>, method: FormingMethod) -> Option<Classification> {
    let e = water_absorption?;
    let bucket = BOUNDARIES
        .iter()
        .position(|upper| e <= *upper)
        .unwrap_or(BOUNDARIES.len());

    use TileClassification::*;
    let code = match (method, bucket) {
        (FormingMethod::Pressed, 0) => BIa,
        (FormingMethod::Pressed, 1) => BIIa,
        (FormingMethod::Pressed, 2) => BIIb,
        (FormingMethod::Pressed, 3) => BIIc,
        (FormingMethod::Pressed, _) => BIII,
        (FormingMethod::Extruded, 0) => AIa,
        (FormingMethod::Extruded, 1) => AIIa,
        (FormingMethod::Extruded, 2) => AIIb,
        (FormingMethod::Extruded, 3) => AIIc,
        (FormingMethod::Extruded, _) => AIII,
    };

    Some(Classification {
        group: code.group(),
        code,
    })
}

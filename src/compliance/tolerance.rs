//! Tolerance table
//!
//! Every check the engine runs looks its threshold up through the
//! [`ToleranceSource`] trait, keyed by test stage, parameter and a
//! [`Scope`] carrying the product format, tile classification and the few
//! measured values some rules branch on. A lookup that returns `None` means
//! the check cannot be evaluated and is left out of the score.
//!
//! Two tolerance idioms coexist:
//! - [`Tolerance::Bound`]: the value must lie in `[min, max]`
//! - [`Tolerance::Deviation`]: the deviation from a nominal dimension must
//!   satisfy both a percentage and an absolute (mm) limit

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::compliance::classification::TileClassification;
use crate::compliance::ComplianceError;
use crate::entities::batch::ProductFormat;
use crate::entities::sample::{PeiClass, TestStage};

/// Tiles at least this thick (mm) use the heavy-duty breaking thresholds
pub const THICK_TILE_MM: f64 = 7.5;

/// A measured quantity the engine knows how to check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    Length,
    Width,
    Thickness,
    Weight,
    Straightness,
    Flatness,
    Rectangularity,
    CentralCurvature,
    LateralCurvature,
    Angularity,
    Warping,
    WaterAbsorption,
    BreakingForce,
    BreakingStrength,
    PeiClass,
    AbrasionCycles,
    VolumeLoss,
    ClayHumidityCrusher,
    ClayHumidityHopper,
    ClayHumiditySilo,
    ClayHumidityPress,
    GranulometryRefusal,
    Carbonate,
    ResidualHumidity,
    ThermalShock,
    ShrinkageExpansion,
    LossOnIgnition,
    GlazeDensity,
    GlazeViscosity,
    GlazeRefusal,
    VisualDefects,
}

impl Parameter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Parameter::Length => "length",
            Parameter::Width => "width",
            Parameter::Thickness => "thickness",
            Parameter::Weight => "weight",
            Parameter::Straightness => "straightness",
            Parameter::Flatness => "flatness",
            Parameter::Rectangularity => "rectangularity",
            Parameter::CentralCurvature => "central_curvature",
            Parameter::LateralCurvature => "lateral_curvature",
            Parameter::Angularity => "angularity",
            Parameter::Warping => "warping",
            Parameter::WaterAbsorption => "water_absorption",
            Parameter::BreakingForce => "breaking_force",
            Parameter::BreakingStrength => "breaking_strength",
            Parameter::PeiClass => "pei_class",
            Parameter::AbrasionCycles => "abrasion_cycles",
            Parameter::VolumeLoss => "volume_loss",
            Parameter::ClayHumidityCrusher => "clay_humidity_crusher",
            Parameter::ClayHumidityHopper => "clay_humidity_hopper",
            Parameter::ClayHumiditySilo => "clay_humidity_silo",
            Parameter::ClayHumidityPress => "clay_humidity_press",
            Parameter::GranulometryRefusal => "granulometry_refusal",
            Parameter::Carbonate => "carbonate",
            Parameter::ResidualHumidity => "residual_humidity",
            Parameter::ThermalShock => "thermal_shock",
            Parameter::ShrinkageExpansion => "shrinkage_expansion",
            Parameter::LossOnIgnition => "loss_on_ignition",
            Parameter::GlazeDensity => "glaze_density",
            Parameter::GlazeViscosity => "glaze_viscosity",
            Parameter::GlazeRefusal => "glaze_refusal",
            Parameter::VisualDefects => "visual_defects",
        }
    }

    /// Human-readable label used in compliance detail lines
    pub fn label(&self) -> &'static str {
        match self {
            Parameter::Length => "Length",
            Parameter::Width => "Width",
            Parameter::Thickness => "Thickness",
            Parameter::Weight => "Weight",
            Parameter::Straightness => "Straightness",
            Parameter::Flatness => "Flatness",
            Parameter::Rectangularity => "Rectangularity",
            Parameter::CentralCurvature => "Central curvature",
            Parameter::LateralCurvature => "Lateral curvature",
            Parameter::Angularity => "Angularity",
            Parameter::Warping => "Warping",
            Parameter::WaterAbsorption => "Water absorption",
            Parameter::BreakingForce => "Breaking force",
            Parameter::BreakingStrength => "Breaking strength",
            Parameter::PeiClass => "PEI class",
            Parameter::AbrasionCycles => "Abrasion cycles",
            Parameter::VolumeLoss => "Deep abrasion volume loss",
            Parameter::ClayHumidityCrusher => "Crusher humidity",
            Parameter::ClayHumidityHopper => "Hopper humidity",
            Parameter::ClayHumiditySilo => "Silo humidity",
            Parameter::ClayHumidityPress => "Press feed humidity",
            Parameter::GranulometryRefusal => "Granulometry refusal",
            Parameter::Carbonate => "Carbonate content",
            Parameter::ResidualHumidity => "Residual humidity",
            Parameter::ThermalShock => "Thermal shock",
            Parameter::ShrinkageExpansion => "Shrinkage/expansion",
            Parameter::LossOnIgnition => "Loss on ignition",
            Parameter::GlazeDensity => "Glaze density",
            Parameter::GlazeViscosity => "Glaze viscosity",
            Parameter::GlazeRefusal => "Glaze 45µ refusal",
            Parameter::VisualDefects => "Visual defect",
        }
    }

    pub fn all() -> &'static [Parameter] {
        &[
            Parameter::Length,
            Parameter::Width,
            Parameter::Thickness,
            Parameter::Weight,
            Parameter::Straightness,
            Parameter::Flatness,
            Parameter::Rectangularity,
            Parameter::CentralCurvature,
            Parameter::LateralCurvature,
            Parameter::Angularity,
            Parameter::Warping,
            Parameter::WaterAbsorption,
            Parameter::BreakingForce,
            Parameter::BreakingStrength,
            Parameter::PeiClass,
            Parameter::AbrasionCycles,
            Parameter::VolumeLoss,
            Parameter::ClayHumidityCrusher,
            Parameter::ClayHumidityHopper,
            Parameter::ClayHumiditySilo,
            Parameter::ClayHumidityPress,
            Parameter::GranulometryRefusal,
            Parameter::Carbonate,
            Parameter::ResidualHumidity,
            Parameter::ThermalShock,
            Parameter::ShrinkageExpansion,
            Parameter::LossOnIgnition,
            Parameter::GlazeDensity,
            Parameter::GlazeViscosity,
            Parameter::GlazeRefusal,
            Parameter::VisualDefects,
        ]
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Parameter {
    type Err = ComplianceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        Self::all()
            .iter()
            .find(|p| p.as_str() == wanted)
            .copied()
            .ok_or_else(|| ComplianceError::UnknownParameter(s.to_string()))
    }
}

/// Direct bound: `min <= value <= max`, either side optional
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToleranceSpec {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    #[serde(default)]
    pub unit: String,
}

impl ToleranceSpec {
    pub fn range(name: impl Into<String>, min: f64, max: f64, unit: &str) -> Self {
        Self {
            name: name.into(),
            min: Some(min),
            max: Some(max),
            unit: unit.to_string(),
        }
    }

    pub fn at_least(name: impl Into<String>, min: f64, unit: &str) -> Self {
        Self {
            name: name.into(),
            min: Some(min),
            max: None,
            unit: unit.to_string(),
        }
    }

    pub fn at_most(name: impl Into<String>, max: f64, unit: &str) -> Self {
        Self {
            name: name.into(),
            min: None,
            max: Some(max),
            unit: unit.to_string(),
        }
    }

    /// Symmetric band `[-limit, +limit]`
    pub fn symmetric(name: impl Into<String>, limit: f64, unit: &str) -> Self {
        Self::range(name, -limit, limit, unit)
    }

    /// Check whether a value lies inside the bound (inclusive)
    pub fn contains(&self, value: f64) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }

    /// Describe the bound, e.g. `range 2.50-4.10 %` or `min 600.00 N`
    pub fn describe(&self) -> String {
        let unit = unit_suffix(&self.unit);
        match (self.min, self.max) {
            (Some(min), Some(max)) if (min + max).abs() < f64::EPSILON && max > 0.0 => {
                format!("limit ±{:.2}{}", max, unit)
            }
            (Some(min), Some(max)) => format!("range {:.2}-{:.2}{}", min, max, unit),
            (Some(min), None) => format!("min {:.2}{}", min, unit),
            (None, Some(max)) => format!("max {:.2}{}", max, unit),
            (None, None) => "unbounded".to_string(),
        }
    }
}

/// Outcome of comparing a measured dimension with its nominal value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviationCheck {
    pub deviation_pct: f64,
    pub deviation_mm: f64,
    pub compliant: bool,
}

/// Dual tolerance on the deviation from a nominal dimension
///
/// Both limits must hold; breaching either one fails the check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviationTolerance {
    /// Maximum deviation as a percentage of nominal
    pub pct: f64,
    /// Maximum absolute deviation in mm
    pub mm: f64,
}

impl DeviationTolerance {
    pub fn check(&self, measured: f64, nominal: f64) -> DeviationCheck {
        let deviation_mm = measured - nominal;
        let deviation_pct = if nominal != 0.0 {
            deviation_mm / nominal * 100.0
        } else {
            f64::INFINITY
        };
        DeviationCheck {
            deviation_pct,
            deviation_mm,
            compliant: deviation_pct.abs() <= self.pct && deviation_mm.abs() <= self.mm,
        }
    }

    pub fn describe(&self) -> String {
        format!("limit ±{:.2} % / ±{:.2} mm", self.pct, self.mm)
    }
}

/// A tolerance in one of the two supported idioms
#[derive(Debug, Clone, PartialEq)]
pub enum Tolerance {
    Bound(ToleranceSpec),
    Deviation(DeviationTolerance),
}

impl Tolerance {
    pub fn describe(&self) -> String {
        match self {
            Tolerance::Bound(spec) => spec.describe(),
            Tolerance::Deviation(dev) => dev.describe(),
        }
    }
}

/// Context for a tolerance lookup
#[derive(Debug, Clone, Copy, Default)]
pub struct Scope<'a> {
    pub format: Option<&'a ProductFormat>,
    pub classification: Option<TileClassification>,
    /// Tile thickness (mm) selecting the breaking-strength thresholds
    pub thickness: Option<f64>,
    /// Declared PEI class selecting the abrasion cycle minimum
    pub pei_class: Option<PeiClass>,
}

impl<'a> Scope<'a> {
    pub fn with_format(mut self, format: Option<&'a ProductFormat>) -> Self {
        self.format = format;
        self
    }

    pub fn with_classification(mut self, classification: Option<TileClassification>) -> Self {
        self.classification = classification;
        self
    }

    pub fn with_thickness(mut self, thickness: Option<f64>) -> Self {
        self.thickness = thickness;
        self
    }

    pub fn with_pei_class(mut self, pei_class: Option<PeiClass>) -> Self {
        self.pei_class = pei_class;
        self
    }
}

/// Anything that can answer tolerance lookups
pub trait ToleranceSource {
    /// Look up the tolerance for a parameter at a stage, or `None` when the
    /// check cannot be evaluated in this scope
    fn tolerance(&self, stage: TestStage, parameter: Parameter, scope: Scope<'_>)
        -> Option<Tolerance>;
}

/// Classification-dependent dimensional strictness
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DimensionalClass {
    /// Length/width (and squareness) tolerance in percent
    pub length_width_pct: f64,
    /// Thickness tolerance in percent
    pub thickness_pct: f64,
    /// Maximum absolute deviation in mm
    pub max_deviation_mm: f64,
    pub straightness_pct: f64,
    pub flatness_pct: f64,
}

const PORCELAIN_CLASS: DimensionalClass = DimensionalClass {
    length_width_pct: 0.6,
    thickness_pct: 5.0,
    max_deviation_mm: 2.0,
    straightness_pct: 0.5,
    flatness_pct: 0.5,
};

const STANDARD_CLASS: DimensionalClass = DimensionalClass {
    length_width_pct: 1.0,
    thickness_pct: 10.0,
    max_deviation_mm: 3.0,
    straightness_pct: 1.0,
    flatness_pct: 1.0,
};

/// Get the dimensional strictness for a classification
///
/// Porcelain (`BIa`) is held to the tight table; anything else, including
/// an unknown classification, uses the standard one.
pub fn dimensional_class(classification: Option<TileClassification>) -> DimensionalClass {
    match classification {
        Some(c) if c.is_porcelain() => PORCELAIN_CLASS,
        _ => STANDARD_CLASS,
    }
}

/// Length/width deviation from nominal: ±0.5 % capped at 2.0 mm
pub const LENGTH_WIDTH_DEVIATION: DeviationTolerance = DeviationTolerance { pct: 0.5, mm: 2.0 };

/// Thickness deviation from nominal: ±10 % capped at 0.5 mm
pub const THICKNESS_DEVIATION: DeviationTolerance = DeviationTolerance { pct: 10.0, mm: 0.5 };

/// Thickness deviation for a classification; a known classification sets
/// the percentage, the absolute cap stays at 0.5 mm
pub fn thickness_deviation(classification: Option<TileClassification>) -> DeviationTolerance {
    match classification {
        Some(c) => DeviationTolerance {
            pct: dimensional_class(Some(c)).thickness_pct,
            mm: THICKNESS_DEVIATION.mm,
        },
        None => THICKNESS_DEVIATION,
    }
}

/// Pressing thickness band (mm) per product format
pub fn pressing_thickness(format: &ProductFormat) -> Option<(f64, f64)> {
    match format {
        ProductFormat::F20x20 => Some((6.2, 7.2)),
        ProductFormat::F25x40 => Some((6.8, 7.4)),
        ProductFormat::F25x50 => Some((7.1, 7.7)),
        ProductFormat::Other(_) => None,
    }
}

/// Green tile weight band (kg) per product format
///
/// Declared for reference only: no measured weight field exists, so the
/// pressing stage never consumes it.
pub fn pressing_weight(format: &ProductFormat) -> Option<(f64, f64)> {
    match format {
        ProductFormat::F20x20 => Some((0.85, 0.95)),
        ProductFormat::F25x40 => Some((1.55, 1.70)),
        ProductFormat::F25x50 => Some((2.00, 2.20)),
        ProductFormat::Other(_) => None,
    }
}

/// Minimum abrasion revolutions before visible wear for a PEI class
pub fn pei_min_cycles(class: PeiClass) -> Option<f64> {
    match class.level() {
        1 => Some(150.0),
        2 => Some(600.0),
        3 => Some(750.0),
        4 => Some(2100.0),
        5 => Some(12000.0),
        _ => None,
    }
}

/// Maximum deep-abrasion volume loss (mm³) for unglazed tiles
pub fn max_volume_loss(classification: TileClassification) -> Option<f64> {
    match classification {
        TileClassification::BIa => Some(175.0),
        TileClassification::AIa => Some(275.0),
        TileClassification::BIIa => Some(345.0),
        TileClassification::AIIa => Some(393.0),
        TileClassification::BIIb => Some(540.0),
        TileClassification::AIIb => Some(649.0),
        _ => None,
    }
}

/// A defect keyword scanned for in free-text visual inspection notes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DefectRule {
    pub keyword: &'static str,
    /// Maximum share of defective tiles tolerated, in percent (documented,
    /// not measured)
    pub max_pct: f64,
}

const PRESSING_DEFECTS: &[DefectRule] = &[
    DefectRule { keyword: "fissures", max_pct: 0.0 },
    DefectRule { keyword: "ecornage", max_pct: 1.0 },
    DefectRule { keyword: "grains", max_pct: 2.0 },
];

const BISQUE_DEFECTS: &[DefectRule] = &[
    DefectRule { keyword: "fissures", max_pct: 0.0 },
    DefectRule { keyword: "ecornage", max_pct: 1.0 },
    DefectRule { keyword: "coeur noir", max_pct: 0.0 },
];

/// Get the visual defect checklist for a stage (empty when not scanned)
pub fn defect_checklist(stage: TestStage) -> &'static [DefectRule] {
    match stage {
        TestStage::Pressing => PRESSING_DEFECTS,
        TestStage::BisqueFiring => BISQUE_DEFECTS,
        _ => &[],
    }
}

/// The built-in ISO 13006 / ISO 10545 tolerance table
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinTolerances;

impl ToleranceSource for BuiltinTolerances {
    fn tolerance(
        &self,
        stage: TestStage,
        parameter: Parameter,
        scope: Scope<'_>,
    ) -> Option<Tolerance> {
        use Parameter as P;
        use TestStage as S;

        let label = parameter.label();
        let bound = match (stage, parameter) {
            (S::ClayTesting, P::ClayHumidityCrusher) => ToleranceSpec::range(label, 4.5, 6.0, "%"),
            (S::ClayTesting, P::ClayHumidityHopper) => ToleranceSpec::range(label, 2.5, 4.1, "%"),
            (S::ClayTesting, P::ClayHumiditySilo) => ToleranceSpec::range(label, 5.3, 6.3, "%"),
            (S::ClayTesting, P::ClayHumidityPress) => ToleranceSpec::range(label, 5.5, 6.5, "%"),
            (S::ClayTesting, P::GranulometryRefusal) => ToleranceSpec::at_most(label, 12.0, "%"),
            (S::ClayTesting, P::Carbonate) => ToleranceSpec::range(label, 10.0, 16.0, "%"),

            (S::Pressing, P::Thickness) => {
                let (min, max) = pressing_thickness(scope.format?)?;
                ToleranceSpec::range(label, min, max, "mm")
            }
            (S::Pressing, P::Weight) => {
                let (min, max) = pressing_weight(scope.format?)?;
                ToleranceSpec::range(label, min, max, "kg")
            }

            (S::Drying, P::ResidualHumidity) => ToleranceSpec::at_most(label, 1.0, "%"),

            (S::BisqueFiring, P::ShrinkageExpansion) => ToleranceSpec::symmetric(label, 0.5, "%"),
            (S::BisqueFiring, P::LossOnIgnition) => ToleranceSpec::range(label, 9.0, 13.0, "%"),

            (S::BreakingStrength, P::BreakingForce) => {
                let min = if scope.thickness? >= THICK_TILE_MM { 600.0 } else { 200.0 };
                ToleranceSpec::at_least(label, min, "N")
            }
            // Thinner tiles carry the higher modulus minimum.
            (S::BreakingStrength, P::BreakingStrength) => {
                let min = if scope.thickness? >= THICK_TILE_MM { 12.0 } else { 15.0 };
                ToleranceSpec::at_least(label, min, "N/mm²")
            }

            (S::Dimensional, P::Length) | (S::Dimensional, P::Width) => {
                return Some(Tolerance::Deviation(LENGTH_WIDTH_DEVIATION))
            }
            (S::Dimensional, P::Thickness) => {
                return Some(Tolerance::Deviation(thickness_deviation(scope.classification)))
            }
            (S::Dimensional, P::Straightness) => {
                let class = dimensional_class(scope.classification);
                ToleranceSpec::symmetric(label, class.straightness_pct, "%")
            }
            (S::Dimensional, P::Flatness)
            | (S::Dimensional, P::CentralCurvature)
            | (S::Dimensional, P::LateralCurvature) => {
                let class = dimensional_class(scope.classification);
                ToleranceSpec::symmetric(label, class.flatness_pct, "%")
            }
            (S::Dimensional, P::Rectangularity) | (S::Dimensional, P::Angularity) => {
                let class = dimensional_class(scope.classification);
                ToleranceSpec::symmetric(label, class.length_width_pct, "%")
            }
            (S::Dimensional, P::Warping) => {
                let class = dimensional_class(scope.classification);
                ToleranceSpec::symmetric(label, class.max_deviation_mm, "mm")
            }

            (S::WaterAbsorption, P::WaterAbsorption) => ToleranceSpec::at_least(label, 9.0, "%"),

            (S::SurfaceQuality, P::PeiClass) => ToleranceSpec::at_least(label, 1.0, ""),
            (S::SurfaceQuality, P::AbrasionCycles) => {
                let min = pei_min_cycles(scope.pei_class?)?;
                ToleranceSpec::at_least(label, min, "rev")
            }
            (S::SurfaceQuality, P::VolumeLoss) => {
                let max = max_volume_loss(scope.classification?)?;
                ToleranceSpec::at_most(label, max, "mm³")
            }

            (S::GlazeTesting, P::GlazeDensity) => ToleranceSpec::range(label, 1750.0, 1900.0, "g/l"),
            (S::GlazeTesting, P::GlazeViscosity) => ToleranceSpec::range(label, 30.0, 50.0, "s"),
            (S::GlazeTesting, P::GlazeRefusal) => ToleranceSpec::range(label, 0.5, 2.5, "ml"),

            _ => return None,
        };

        Some(Tolerance::Bound(bound))
    }
}

fn unit_suffix(unit: &str) -> String {
    if unit.is_empty() {
        String::new()
    } else {
        format!(" {}", unit)
    }
}

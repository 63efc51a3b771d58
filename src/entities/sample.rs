//! Sample entity type (one laboratory sample tested at one stage)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::compliance::{
    AbsorptionGroup, AbsorptionLabel, ComplianceError, Evaluation, FormingMethod,
    TileClassification,
};
use crate::core::entity::Entity;
use crate::core::identity::{RecordId, RecordPrefix};

/// Laboratory test stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestStage {
    ClayTesting,
    Pressing,
    Drying,
    BisqueFiring,
    BreakingStrength,
    Dimensional,
    WaterAbsorption,
    SurfaceQuality,
    GlazeTesting,
}

impl TestStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestStage::ClayTesting => "clay_testing",
            TestStage::Pressing => "pressing",
            TestStage::Drying => "drying",
            TestStage::BisqueFiring => "bisque_firing",
            TestStage::BreakingStrength => "breaking_strength",
            TestStage::Dimensional => "dimensional",
            TestStage::WaterAbsorption => "water_absorption",
            TestStage::SurfaceQuality => "surface_quality",
            TestStage::GlazeTesting => "glaze_testing",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TestStage::ClayTesting => "Clay testing",
            TestStage::Pressing => "Pressing",
            TestStage::Drying => "Drying",
            TestStage::BisqueFiring => "Bisque firing",
            TestStage::BreakingStrength => "Breaking strength",
            TestStage::Dimensional => "Dimensional",
            TestStage::WaterAbsorption => "Water absorption",
            TestStage::SurfaceQuality => "Surface quality",
            TestStage::GlazeTesting => "Glaze testing",
        }
    }

    /// Stages in production order
    pub fn all() -> &'static [TestStage] {
        &[
            TestStage::ClayTesting,
            TestStage::Pressing,
            TestStage::Drying,
            TestStage::BisqueFiring,
            TestStage::GlazeTesting,
            TestStage::BreakingStrength,
            TestStage::Dimensional,
            TestStage::WaterAbsorption,
            TestStage::SurfaceQuality,
        ]
    }
}

impl fmt::Display for TestStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TestStage {
    type Err = ComplianceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        Self::all()
            .iter()
            .find(|stage| stage.as_str() == wanted)
            .copied()
            .ok_or_else(|| ComplianceError::UnknownStage(s.to_string()))
    }
}

/// Overall pass/fail result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Pass,
    Fail,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Pass => write!(f, "pass"),
            Outcome::Fail => write!(f, "fail"),
        }
    }
}

impl FromStr for Outcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pass" | "conforme" => Ok(Outcome::Pass),
            "fail" | "non_conforme" | "non conforme" => Ok(Outcome::Fail),
            _ => Err(format!("Invalid result: {}. Use pass or fail", s)),
        }
    }
}

/// How the result on a sample was reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvaluationMode {
    Automatic,
    Manual,
}

impl fmt::Display for EvaluationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvaluationMode::Automatic => write!(f, "automatic"),
            EvaluationMode::Manual => write!(f, "manual"),
        }
    }
}

/// PEI surface abrasion class, 0 (not suitable for floors) to 5
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeiClass(u8);

const ROMAN: [&str; 6] = ["0", "I", "II", "III", "IV", "V"];

impl PeiClass {
    /// Levels above 5 are clamped
    pub fn new(level: u8) -> Self {
        Self(level.min(5))
    }

    pub fn level(&self) -> u8 {
        self.0
    }

    pub fn roman(&self) -> &'static str {
        ROMAN[usize::from(self.0)]
    }
}

impl fmt::Display for PeiClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PEI {}", self.roman())
    }
}

impl FromStr for PeiClass {
    type Err = ComplianceError;

    /// Accepts `3`, `III`, `PEI III` or `pei-3`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        let bare = upper
            .strip_prefix("PEI")
            .unwrap_or(upper.as_str())
            .trim_start_matches(['-', '_', ' '])
            .trim();

        if let Ok(level) = bare.parse::<u8>() {
            if level <= 5 {
                return Ok(Self(level));
            }
        }
        ROMAN
            .iter()
            .position(|r| *r == bare)
            .and_then(|level| u8::try_from(level).ok())
            .map(Self)
            .ok_or_else(|| ComplianceError::InvalidPeiClass(s.to_string()))
    }
}

impl Serialize for PeiClass {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for PeiClass {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Level(u8),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Level(level) if level <= 5 => Ok(Self(level)),
            Raw::Level(level) => Err(serde::de::Error::custom(
                ComplianceError::InvalidPeiClass(level.to_string()),
            )),
            Raw::Text(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Errors raised when editing a sample record
#[derive(Debug, Error)]
pub enum SampleError {
    #[error("Unknown sample field: '{0}'")]
    UnknownField(String),

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Sample {0} already has an automatic result or readings that evaluate; manual override is only allowed when evaluation is inconclusive")]
    AlreadyEvaluated(String),

    #[error("Score {0} is outside 0-100")]
    ScoreOutOfRange(f64),
}

/// A laboratory sample measured at a single stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleMeasurement {
    /// Sample ID (SAMPYYYYMMDDNNN)
    pub id: RecordId,

    /// Lot number of the batch the sample was taken from
    pub batch: String,

    /// Stage this sample was tested at
    pub test_stage: TestStage,

    // ----- Dimensional (mm / %) -----
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thickness: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub straightness: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flatness: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rectangularity: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub central_curvature: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lateral_curvature: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angularity: Option<f64>,

    /// Warping (mm)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warping: Option<f64>,

    // ----- Water absorption -----
    /// Water absorption E (%)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub water_absorption: Option<f64>,

    /// Forming method; pressed when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forming_method: Option<FormingMethod>,

    // ----- Breaking strength -----
    /// Breaking force (N)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breaking_force: Option<f64>,

    /// Modulus of rupture (N/mm²) as measured by the lab
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breaking_strength: Option<f64>,

    // ----- Surface abrasion -----
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pei_class: Option<PeiClass>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abrasion_cycles: Option<f64>,

    /// Deep abrasion volume loss (mm³)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_loss: Option<f64>,

    // ----- Clay (%) -----
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clay_humidity_crusher: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clay_humidity_hopper: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clay_humidity_silo: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clay_humidity_press: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub granulometry_refusal: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbonate: Option<f64>,

    // ----- Drying -----
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub residual_humidity: Option<f64>,

    // ----- Bisque firing -----
    /// Whether the tile survived thermal cycling without cracking
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thermal_shock: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shrinkage_expansion: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loss_on_ignition: Option<f64>,

    // ----- Glaze -----
    /// Slip density (g/l)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glaze_density: Option<f64>,

    /// Flow cup viscosity (s)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glaze_viscosity: Option<f64>,

    /// 45µ sieve refusal (ml)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glaze_refusal: Option<f64>,

    /// Free-text visual inspection notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_defects: Option<String>,

    // ----- Derived -----
    /// Tile classification; written by water absorption evaluation, may be
    /// set by hand for other stages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tile_classification: Option<TileClassification>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absorption_group: Option<AbsorptionGroup>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absorption_label: Option<AbsorptionLabel>,

    /// Modulus of rupture (N/mm²) computed from the breaking force and geometry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flexural_strength: Option<f64>,

    /// Percentage of checks passed (0-100)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compliance_score: Option<f64>,

    /// Check lines joined with ` | `
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compliance_details: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Outcome>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation_mode: Option<EvaluationMode>,

    /// Free-form notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    /// Technician who recorded the sample
    pub author: String,
}

impl SampleMeasurement {
    pub fn new(id: RecordId, batch: impl Into<String>, test_stage: TestStage, author: impl Into<String>) -> Self {
        Self {
            id,
            batch: batch.into(),
            test_stage,
            length: None,
            width: None,
            thickness: None,
            straightness: None,
            flatness: None,
            rectangularity: None,
            central_curvature: None,
            lateral_curvature: None,
            angularity: None,
            warping: None,
            water_absorption: None,
            forming_method: None,
            breaking_force: None,
            breaking_strength: None,
            pei_class: None,
            abrasion_cycles: None,
            volume_loss: None,
            clay_humidity_crusher: None,
            clay_humidity_hopper: None,
            clay_humidity_silo: None,
            clay_humidity_press: None,
            granulometry_refusal: None,
            carbonate: None,
            residual_humidity: None,
            thermal_shock: None,
            shrinkage_expansion: None,
            loss_on_ignition: None,
            glaze_density: None,
            glaze_viscosity: None,
            glaze_refusal: None,
            visual_defects: None,
            tile_classification: None,
            absorption_group: None,
            absorption_label: None,
            flexural_strength: None,
            compliance_score: None,
            compliance_details: None,
            result: None,
            evaluation_mode: None,
            notes: None,
            created: Utc::now(),
            author: author.into(),
        }
    }

    #[cfg(test)]
    pub fn for_test(stage: TestStage) -> Self {
        let date = chrono::NaiveDate::from_ymd_opt(2025, 1, 24).unwrap();
        Self::new(
            RecordId::new(RecordPrefix::Samp, date, 1),
            "LOT20250124001",
            stage,
            "test",
        )
    }

    /// Names accepted by [`SampleMeasurement::set_field`]
    pub fn field_names() -> &'static [&'static str] {
        &[
            "length",
            "width",
            "thickness",
            "straightness",
            "flatness",
            "rectangularity",
            "central_curvature",
            "lateral_curvature",
            "angularity",
            "warping",
            "water_absorption",
            "forming_method",
            "breaking_force",
            "breaking_strength",
            "pei_class",
            "abrasion_cycles",
            "volume_loss",
            "clay_humidity_crusher",
            "clay_humidity_hopper",
            "clay_humidity_silo",
            "clay_humidity_press",
            "granulometry_refusal",
            "carbonate",
            "residual_humidity",
            "thermal_shock",
            "shrinkage_expansion",
            "loss_on_ignition",
            "glaze_density",
            "glaze_viscosity",
            "glaze_refusal",
            "visual_defects",
            "tile_classification",
            "notes",
        ]
    }

    /// Set a reading from its textual form, e.g. `("clay_humidity_silo", "5.8")`
    ///
    /// An empty value clears the field.
    pub fn set_field(&mut self, name: &str, value: &str) -> Result<(), SampleError> {
        let field = name.trim().to_lowercase().replace('-', "_");
        let value = value.trim();

        let number = |v: &str| -> Result<Option<f64>, SampleError> {
            if v.is_empty() {
                return Ok(None);
            }
            // Lab sheets often use a decimal comma
            v.replace(',', ".")
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(Some)
                .ok_or_else(|| invalid(&field, v, "expected a number"))
        };
        let text = |v: &str| (!v.is_empty()).then(|| v.to_string());

        match field.as_str() {
            "length" => self.length = number(value)?,
            "width" => self.width = number(value)?,
            "thickness" => self.thickness = number(value)?,
            "straightness" => self.straightness = number(value)?,
            "flatness" => self.flatness = number(value)?,
            "rectangularity" => self.rectangularity = number(value)?,
            "central_curvature" => self.central_curvature = number(value)?,
            "lateral_curvature" => self.lateral_curvature = number(value)?,
            "angularity" => self.angularity = number(value)?,
            "warping" => self.warping = number(value)?,
            "water_absorption" => self.water_absorption = number(value)?,
            "forming_method" => {
                self.forming_method = parse_optional(value)
                    .map_err(|e: ComplianceError| invalid(&field, value, &e.to_string()))?
            }
            "breaking_force" => self.breaking_force = number(value)?,
            "breaking_strength" => self.breaking_strength = number(value)?,
            "pei_class" => {
                self.pei_class = parse_optional(value)
                    .map_err(|e: ComplianceError| invalid(&field, value, &e.to_string()))?
            }
            "abrasion_cycles" => self.abrasion_cycles = number(value)?,
            "volume_loss" => self.volume_loss = number(value)?,
            "clay_humidity_crusher" => self.clay_humidity_crusher = number(value)?,
            "clay_humidity_hopper" => self.clay_humidity_hopper = number(value)?,
            "clay_humidity_silo" => self.clay_humidity_silo = number(value)?,
            "clay_humidity_press" => self.clay_humidity_press = number(value)?,
            "granulometry_refusal" => self.granulometry_refusal = number(value)?,
            "carbonate" => self.carbonate = number(value)?,
            "residual_humidity" => self.residual_humidity = number(value)?,
            "thermal_shock" => {
                self.thermal_shock =
                    parse_bool(value).map_err(|reason| invalid(&field, value, reason))?
            }
            "shrinkage_expansion" => self.shrinkage_expansion = number(value)?,
            "loss_on_ignition" => self.loss_on_ignition = number(value)?,
            "glaze_density" => self.glaze_density = number(value)?,
            "glaze_viscosity" => self.glaze_viscosity = number(value)?,
            "glaze_refusal" => self.glaze_refusal = number(value)?,
            "visual_defects" => self.visual_defects = text(value),
            "tile_classification" => {
                self.tile_classification = parse_optional(value)
                    .map_err(|e: ComplianceError| invalid(&field, value, &e.to_string()))?
            }
            "notes" => self.notes = text(value),
            _ => return Err(SampleError::UnknownField(name.to_string())),
        }
        Ok(())
    }

    /// Write an evaluation's derived fields back onto the record
    ///
    /// Score, details, result and the computed flexural strength are always
    /// overwritten (to `None` when the evaluation was inconclusive).
    /// Classification fields are only touched by the water absorption stage.
    /// Readings are never modified.
    pub fn apply(&mut self, evaluation: &Evaluation) {
        self.compliance_score = evaluation.score();
        self.compliance_details = evaluation.details();
        self.result = evaluation.outcome();

        if evaluation.stage == TestStage::WaterAbsorption {
            self.tile_classification = evaluation.classification.map(|c| c.code);
            self.absorption_group = evaluation.classification.map(|c| c.group);
            self.absorption_label = evaluation.absorption_label;
        }
        self.flexural_strength = evaluation.flexural_strength;
        self.evaluation_mode = Some(EvaluationMode::Automatic);
    }

    /// Record a manual verdict where automatic evaluation is inconclusive
    ///
    /// `current` is a fresh evaluation of the record's readings, so a sample
    /// stored without evaluation cannot be overridden while its readings
    /// would decide the result.
    pub fn override_result(
        &mut self,
        outcome: Outcome,
        score: Option<f64>,
        current: &Evaluation,
    ) -> Result<(), SampleError> {
        let automatic =
            self.result.is_some() && self.evaluation_mode != Some(EvaluationMode::Manual);
        if automatic || current.is_applicable() {
            return Err(SampleError::AlreadyEvaluated(self.id.to_string()));
        }
        if let Some(score) = score {
            if !(0.0..=100.0).contains(&score) {
                return Err(SampleError::ScoreOutOfRange(score));
            }
        }

        self.result = Some(outcome);
        self.compliance_score = score;
        self.evaluation_mode = Some(EvaluationMode::Manual);
        Ok(())
    }

    /// Whether a manual verdict is in place
    pub fn is_manual(&self) -> bool {
        self.evaluation_mode == Some(EvaluationMode::Manual)
    }
}

impl Entity for SampleMeasurement {
    const PREFIX: RecordPrefix = RecordPrefix::Samp;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn title(&self) -> String {
        format!("{} ({})", self.test_stage.label(), self.batch)
    }

    fn status(&self) -> String {
        self.result
            .map(|r| r.to_string())
            .unwrap_or_else(|| "pending".to_string())
    }

    fn created(&self) -> DateTime<Utc> {
        self.created
    }

    fn author(&self) -> &str {
        &self.author
    }
}

fn invalid(field: &str, value: &str, reason: &str) -> SampleError {
    SampleError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_optional<T: FromStr>(value: &str) -> Result<Option<T>, T::Err> {
    if value.is_empty() {
        Ok(None)
    } else {
        value.parse().map(Some)
    }
}

fn parse_bool(value: &str) -> Result<Option<bool>, &'static str> {
    match value.to_lowercase().as_str() {
        "" => Ok(None),
        "true" | "yes" | "oui" | "pass" | "ok" => Ok(Some(true)),
        "false" | "no" | "non" | "fail" => Ok(Some(false)),
        _ => Err("expected true/false"),
    }
}

//! Quality compliance evaluation engine
//!
//! [`evaluate`] is a pure function: it reads one [`SampleMeasurement`] plus
//! immutable [`ReferenceData`] and returns an [`Evaluation`]. Writing the
//! derived fields back onto the record is a separate step
//! ([`SampleMeasurement::apply`]).
//!
//! Missing optional readings are never an error. A check whose reading or
//! reference data is absent is skipped and left out of the score; a sample
//! with no relevant reading at all is "not evaluable" and gets no score and
//! no result.

pub mod classification;
pub mod flexural;
pub mod scorer;
pub mod stages;
pub mod tolerance;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::entities::batch::{NominalBatchDimensions, ProductFormat};
use crate::entities::sample::{Outcome, SampleMeasurement, TestStage};

pub use classification::{classify, AbsorptionGroup, Classification, FormingMethod, TileClassification};
pub use flexural::flexural_strength;
pub use scorer::{Check, Scorecard, CONFORME, NON_CONFORME};
pub use stages::{AbsorptionLabel, StageReadings, StageRules};
pub use tolerance::{BuiltinTolerances, Parameter, Scope, Tolerance, ToleranceSource, ToleranceSpec};

/// Errors raised while interpreting compliance inputs
#[derive(Debug, Error)]
pub enum ComplianceError {
    #[error("Unknown test stage: '{0}'")]
    UnknownStage(String),

    #[error("Unknown forming method: '{0}'. Use 'pressed' or 'extruded'")]
    UnknownFormingMethod(String),

    #[error("Unknown tile classification: '{0}'")]
    UnknownClassification(String),

    #[error("Unknown parameter: '{0}'")]
    UnknownParameter(String),

    #[error("Invalid product format: '{0}'. Expected <width>x<length>, e.g. 25x40")]
    InvalidFormat(String),

    #[error("Invalid PEI class: '{0}'. Use 0-5 or roman numerals (PEI III)")]
    InvalidPeiClass(String),
}

/// Fallback reference values, passed explicitly to the engine
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineDefaults {
    /// Nominal tile length (mm) when the batch does not declare one
    pub nominal_length: f64,
    /// Nominal tile width (mm) when the batch does not declare one
    pub nominal_width: f64,
    /// Nominal tile thickness (mm) when the batch does not declare one
    pub nominal_thickness: f64,
    /// Whether to fall back to the values above at all; when false, checks
    /// needing a missing nominal dimension are skipped
    pub nominal_fallback: bool,
}

impl Default for EngineDefaults {
    fn default() -> Self {
        Self {
            nominal_length: 200.0,
            nominal_width: 200.0,
            nominal_thickness: 7.0,
            nominal_fallback: true,
        }
    }
}

/// Nominal dimensions after applying fallbacks
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ResolvedNominal {
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub thickness: Option<f64>,
}

/// Read-only reference data for one evaluation
#[derive(Clone, Copy)]
pub struct ReferenceData<'a> {
    /// Nominal dimensions of the sample's batch, if known
    pub batch: Option<&'a NominalBatchDimensions>,
    pub tolerances: &'a dyn ToleranceSource,
    pub defaults: &'a EngineDefaults,
}

impl<'a> ReferenceData<'a> {
    pub fn new(tolerances: &'a dyn ToleranceSource, defaults: &'a EngineDefaults) -> Self {
        Self {
            batch: None,
            tolerances,
            defaults,
        }
    }

    pub fn with_batch(mut self, batch: Option<&'a NominalBatchDimensions>) -> Self {
        self.batch = batch;
        self
    }

    /// Nominal dimensions from the batch, falling back to the configured defaults
    pub fn nominal(&self) -> ResolvedNominal {
        let (length, width, thickness) = match self.batch {
            Some(b) => (b.length, b.width, b.thickness),
            None => (None, None, None),
        };
        let fallback = self.defaults.nominal_fallback;

        let pick = |value: Option<f64>, default: f64, name: &str| match value {
            Some(v) => Some(v),
            None if fallback => {
                warn!(dimension = name, value = default, "using default nominal dimension");
                Some(default)
            }
            None => None,
        };

        ResolvedNominal {
            length: pick(length, self.defaults.nominal_length, "length"),
            width: pick(width, self.defaults.nominal_width, "width"),
            thickness: pick(thickness, self.defaults.nominal_thickness, "thickness"),
        }
    }

    /// Nominal dimensions exactly as the batch declares them, without defaults
    pub fn declared_nominal(&self) -> ResolvedNominal {
        match self.batch {
            Some(b) => ResolvedNominal {
                length: b.length,
                width: b.width,
                thickness: b.thickness,
            },
            None => ResolvedNominal::default(),
        }
    }

    pub fn product_format(&self) -> Option<&'a ProductFormat> {
        self.batch.and_then(|b| b.format.as_ref())
    }

    pub fn batch_classification(&self) -> Option<TileClassification> {
        self.batch.and_then(|b| b.classification)
    }
}

/// Everything one evaluation produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub stage: TestStage,
    pub scorecard: Scorecard,

    /// Set by the water absorption stage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<Classification>,

    /// Set by the water absorption stage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub absorption_label: Option<AbsorptionLabel>,

    /// Set by the breaking strength stage when computed from the breaking force
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flexural_strength: Option<f64>,
}

impl Evaluation {
    pub fn new(stage: TestStage) -> Self {
        Self {
            stage,
            scorecard: Scorecard::new(),
            classification: None,
            absorption_label: None,
            flexural_strength: None,
        }
    }

    pub fn total_checks(&self) -> usize {
        self.scorecard.total()
    }

    pub fn passed_checks(&self) -> usize {
        self.scorecard.passed()
    }

    /// Whether at least one check ran; `false` means the caller must decide
    /// (e.g. ask for a manual verdict)
    pub fn is_applicable(&self) -> bool {
        self.scorecard.is_evaluable()
    }

    pub fn score(&self) -> Option<f64> {
        self.scorecard.score()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.scorecard.outcome()
    }

    pub fn details(&self) -> Option<String> {
        self.scorecard.details()
    }
}

/// Evaluate one sample against the tolerance table
pub fn evaluate(sample: &SampleMeasurement, reference: &ReferenceData<'_>) -> Evaluation {
    let readings = StageReadings::from_sample(sample);
    let ctx = stages::StageContext::new(sample.test_stage, reference, sample.tile_classification);

    let mut evaluation = Evaluation::new(sample.test_stage);
    readings.rules().evaluate(&ctx, &mut evaluation);

    debug!(
        sample = %sample.id,
        stage = %sample.test_stage,
        total = evaluation.total_checks(),
        passed = evaluation.passed_checks(),
        "evaluated sample"
    );

    evaluation
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nominal_falls_back_to_defaults() {
        let defaults = EngineDefaults::default();
        let reference = ReferenceData::new(&BuiltinTolerances, &defaults);
        let nominal = reference.nominal();
        assert_eq!(nominal.length, Some(200.0));
        assert_eq!(nominal.width, Some(200.0));
        assert_eq!(nominal.thickness, Some(7.0));
    }

    #[test]
    fn test_nominal_prefers_batch_values() {
        let defaults = EngineDefaults::default();
        let batch = NominalBatchDimensions {
            length: Some(400.0),
            width: Some(250.0),
            thickness: None,
            format: Some(ProductFormat::F25x40),
            classification: None,
        };
        let reference = ReferenceData::new(&BuiltinTolerances, &defaults).with_batch(Some(&batch));
        let nominal = reference.nominal();
        assert_eq!(nominal.length, Some(400.0));
        assert_eq!(nominal.width, Some(250.0));
        assert_eq!(nominal.thickness, Some(7.0));
        assert_eq!(reference.product_format(), Some(&ProductFormat::F25x40));
    }

    #[test]
    fn test_declared_nominal_ignores_defaults() {
        let defaults = EngineDefaults::default();
        let batch = NominalBatchDimensions {
            length: Some(400.0),
            ..NominalBatchDimensions::default()
        };
        let reference = ReferenceData::new(&BuiltinTolerances, &defaults).with_batch(Some(&batch));
        let declared = reference.declared_nominal();
        assert_eq!(declared.length, Some(400.0));
        assert_eq!(declared.width, None);
        assert_eq!(declared.thickness, None);

        let bare = ReferenceData::new(&BuiltinTolerances, &defaults);
        assert_eq!(bare.declared_nominal(), ResolvedNominal::default());
    }

    #[test]
    fn test_disabled_fallback_leaves_gaps() {
        let defaults = EngineDefaults {
            nominal_fallback: false,
            ..EngineDefaults::default()
        };
        let reference = ReferenceData::new(&BuiltinTolerances, &defaults);
        assert_eq!(reference.nominal(), ResolvedNominal::default());
    }
}

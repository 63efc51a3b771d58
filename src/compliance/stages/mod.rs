//! Per-stage evaluation rules
//!
//! A sample is evaluated in exactly one laboratory stage. [`StageReadings`]
//! projects the flat sample record onto the readings that stage cares
//! about; each variant implements [`StageRules`], so every stage's rule set
//! can be exercised on its own.

mod absorption;
mod clay;
mod dimensional;
mod drying;
mod firing;
mod glaze;
mod pressing;
mod strength;
mod surface;

pub use absorption::{AbsorptionLabel, AbsorptionReadings};
pub use clay::ClayReadings;
pub use dimensional::DimensionalReadings;
pub use drying::DryingReadings;
pub use firing::BisqueReadings;
pub use glaze::GlazeReadings;
pub use pressing::PressingReadings;
pub use strength::StrengthReadings;
pub use surface::SurfaceReadings;

use crate::compliance::classification::TileClassification;
use crate::compliance::tolerance::{defect_checklist, Parameter, Scope, Tolerance};
use crate::compliance::{Evaluation, ReferenceData, ResolvedNominal};
use crate::entities::sample::{SampleMeasurement, TestStage};

/// The rule set for one laboratory stage
pub trait StageRules {
    /// Whether any reading relevant to this stage is present
    fn has_readings(&self) -> bool;

    /// Run every applicable check, recording results into `evaluation`
    fn evaluate(&self, ctx: &StageContext<'_>, evaluation: &mut Evaluation);
}

/// Stage-specific readings taken from a sample
#[derive(Debug, Clone, PartialEq)]
pub enum StageReadings {
    Clay(ClayReadings),
    Pressing(PressingReadings),
    Drying(DryingReadings),
    BisqueFiring(BisqueReadings),
    BreakingStrength(StrengthReadings),
    Dimensional(DimensionalReadings),
    WaterAbsorption(AbsorptionReadings),
    SurfaceQuality(SurfaceReadings),
    GlazeTesting(GlazeReadings),
}

impl StageReadings {
    /// Project a sample onto the readings of its declared stage
    pub fn from_sample(sample: &SampleMeasurement) -> Self {
        match sample.test_stage {
            TestStage::ClayTesting => StageReadings::Clay(ClayReadings {
                humidity_crusher: sample.clay_humidity_crusher,
                humidity_hopper: sample.clay_humidity_hopper,
                humidity_silo: sample.clay_humidity_silo,
                humidity_press: sample.clay_humidity_press,
                granulometry_refusal: sample.granulometry_refusal,
                carbonate: sample.carbonate,
            }),
            TestStage::Pressing => StageReadings::Pressing(PressingReadings {
                thickness: sample.thickness,
                visual_defects: sample.visual_defects.clone(),
            }),
            TestStage::Drying => StageReadings::Drying(DryingReadings {
                residual_humidity: sample.residual_humidity,
            }),
            TestStage::BisqueFiring => StageReadings::BisqueFiring(BisqueReadings {
                thermal_shock: sample.thermal_shock,
                shrinkage_expansion: sample.shrinkage_expansion,
                loss_on_ignition: sample.loss_on_ignition,
                visual_defects: sample.visual_defects.clone(),
            }),
            TestStage::BreakingStrength => StageReadings::BreakingStrength(StrengthReadings {
                breaking_force: sample.breaking_force,
                breaking_strength: sample.breaking_strength,
                length: sample.length,
                width: sample.width,
                thickness: sample.thickness,
            }),
            TestStage::Dimensional => StageReadings::Dimensional(DimensionalReadings {
                length: sample.length,
                width: sample.width,
                thickness: sample.thickness,
                straightness: sample.straightness,
                flatness: sample.flatness,
                rectangularity: sample.rectangularity,
                central_curvature: sample.central_curvature,
                lateral_curvature: sample.lateral_curvature,
                angularity: sample.angularity,
                warping: sample.warping,
            }),
            TestStage::WaterAbsorption => StageReadings::WaterAbsorption(AbsorptionReadings {
                water_absorption: sample.water_absorption,
                forming_method: sample.forming_method.unwrap_or_default(),
            }),
            TestStage::SurfaceQuality => StageReadings::SurfaceQuality(SurfaceReadings {
                pei_class: sample.pei_class,
                abrasion_cycles: sample.abrasion_cycles,
                volume_loss: sample.volume_loss,
            }),
            TestStage::GlazeTesting => StageReadings::GlazeTesting(GlazeReadings {
                density: sample.glaze_density,
                viscosity: sample.glaze_viscosity,
                refusal: sample.glaze_refusal,
            }),
        }
    }

    pub fn stage(&self) -> TestStage {
        match self {
            StageReadings::Clay(_) => TestStage::ClayTesting,
            StageReadings::Pressing(_) => TestStage::Pressing,
            StageReadings::Drying(_) => TestStage::Drying,
            StageReadings::BisqueFiring(_) => TestStage::BisqueFiring,
            StageReadings::BreakingStrength(_) => TestStage::BreakingStrength,
            StageReadings::Dimensional(_) => TestStage::Dimensional,
            StageReadings::WaterAbsorption(_) => TestStage::WaterAbsorption,
            StageReadings::SurfaceQuality(_) => TestStage::SurfaceQuality,
            StageReadings::GlazeTesting(_) => TestStage::GlazeTesting,
        }
    }

    pub fn rules(&self) -> &dyn StageRules {
        match self {
            StageReadings::Clay(r) => r,
            StageReadings::Pressing(r) => r,
            StageReadings::Drying(r) => r,
            StageReadings::BisqueFiring(r) => r,
            StageReadings::BreakingStrength(r) => r,
            StageReadings::Dimensional(r) => r,
            StageReadings::WaterAbsorption(r) => r,
            StageReadings::SurfaceQuality(r) => r,
            StageReadings::GlazeTesting(r) => r,
        }
    }

    pub fn has_readings(&self) -> bool {
        self.rules().has_readings()
    }
}

/// What a stage may consult while evaluating
pub struct StageContext<'a> {
    pub stage: TestStage,
    reference: &'a ReferenceData<'a>,
    classification: Option<TileClassification>,
}

impl<'a> StageContext<'a> {
    /// The sample's own classification wins over the batch's declared one
    pub fn new(
        stage: TestStage,
        reference: &'a ReferenceData<'a>,
        sample_classification: Option<TileClassification>,
    ) -> Self {
        Self {
            stage,
            reference,
            classification: sample_classification.or_else(|| reference.batch_classification()),
        }
    }

    pub fn classification(&self) -> Option<TileClassification> {
        self.classification
    }

    /// Lookup scope with the batch format and the resolved classification
    pub fn scope(&self) -> Scope<'a> {
        Scope::default()
            .with_format(self.reference.product_format())
            .with_classification(self.classification)
    }

    pub fn nominal(&self) -> ResolvedNominal {
        self.reference.nominal()
    }

    /// Batch-declared nominal dimensions only; never the configured defaults
    pub fn declared_nominal(&self) -> ResolvedNominal {
        self.reference.declared_nominal()
    }

    pub fn tolerance(&self, parameter: Parameter, scope: Scope<'_>) -> Option<Tolerance> {
        self.reference.tolerances.tolerance(self.stage, parameter, scope)
    }

    /// Check a reading against its direct bound in the default scope
    pub fn check_bound(&self, evaluation: &mut Evaluation, parameter: Parameter, value: Option<f64>) {
        self.check_bound_in(evaluation, parameter, value, self.scope());
    }

    /// Check a reading against its direct bound; absent readings and absent
    /// bounds are skipped
    pub fn check_bound_in(
        &self,
        evaluation: &mut Evaluation,
        parameter: Parameter,
        value: Option<f64>,
        scope: Scope<'_>,
    ) {
        let Some(value) = value else {
            return;
        };
        match self.tolerance(parameter, scope) {
            Some(Tolerance::Bound(spec)) => {
                evaluation.scorecard.check_bound(parameter, value, &spec);
            }
            Some(Tolerance::Deviation(_)) | None => {
                tracing::debug!(stage = %self.stage, %parameter, "no bound, check skipped");
            }
        }
    }

    /// Check a measured dimension either against its nominal value or, when
    /// the tolerance is a direct bound, against that bound
    pub fn check_dimension(
        &self,
        evaluation: &mut Evaluation,
        parameter: Parameter,
        measured: Option<f64>,
        nominal: Option<f64>,
    ) {
        let Some(measured) = measured else {
            return;
        };
        match (self.tolerance(parameter, self.scope()), nominal) {
            (Some(Tolerance::Deviation(tol)), Some(nominal)) => {
                evaluation
                    .scorecard
                    .check_deviation(parameter, measured, nominal, &tol);
            }
            (Some(Tolerance::Bound(spec)), _) => {
                evaluation.scorecard.check_bound(parameter, measured, &spec);
            }
            _ => {
                tracing::debug!(stage = %self.stage, %parameter, "no nominal reference, check skipped");
            }
        }
    }

    /// Scan free-text visual inspection notes for the stage's defect keywords
    ///
    /// Each keyword is one check, compliant when the keyword does not occur.
    /// Blank notes are treated as absent.
    pub fn scan_defects(&self, evaluation: &mut Evaluation, notes: Option<&str>) {
        let Some(notes) = notes.map(str::trim).filter(|n| !n.is_empty()) else {
            return;
        };
        let folded = fold_accents(&notes.to_lowercase());

        for rule in defect_checklist(self.stage) {
            let found = folded.contains(rule.keyword);
            evaluation.scorecard.record(
                Parameter::VisualDefects,
                !found,
                format!(
                    "'{}' {}, max {:.1} %",
                    rule.keyword,
                    if found { "reported" } else { "absent" },
                    rule.max_pct
                ),
            );
        }
    }
}

/// Fold French accented letters so "écornage" matches "ecornage"
fn fold_accents(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            'é' | 'è' | 'ê' | 'ë' => out.push('e'),
            'à' | 'â' => out.push('a'),
            'î' | 'ï' => out.push('i'),
            'ô' => out.push('o'),
            'ù' | 'û' => out.push('u'),
            'ç' => out.push('c'),
            'œ' => out.push_str("oe"),
            _ => out.push(ch),
        }
    }
    out
}

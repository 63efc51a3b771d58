//! Surface quality: PEI abrasion class (ISO 10545-7) and deep abrasion
//! volume loss (ISO 10545-6)

use super::{StageContext, StageRules};
use crate::compliance::tolerance::{Parameter, Tolerance};
use crate::compliance::Evaluation;
use crate::entities::sample::PeiClass;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceReadings {
    pub pei_class: Option<PeiClass>,
    /// Revolutions before visible wear
    pub abrasion_cycles: Option<f64>,
    /// Deep abrasion volume loss (mm³)
    pub volume_loss: Option<f64>,
}

impl StageRules for SurfaceReadings {
    fn has_readings(&self) -> bool {
        self.pei_class.is_some() || self.abrasion_cycles.is_some() || self.volume_loss.is_some()
    }

    fn evaluate(&self, ctx: &StageContext<'_>, evaluation: &mut Evaluation) {
        let scope = ctx.scope().with_pei_class(self.pei_class);

        if let Some(pei) = self.pei_class {
            if let Some(Tolerance::Bound(spec)) = ctx.tolerance(Parameter::PeiClass, scope) {
                let compliant = spec.contains(f64::from(pei.level()));
                evaluation.scorecard.record(
                    Parameter::PeiClass,
                    compliant,
                    format!("{}, {}", pei, spec.describe()),
                );
            }
        }

        // Cycle minimum comes from the declared PEI class; skipped without one.
        ctx.check_bound_in(evaluation, Parameter::AbrasionCycles, self.abrasion_cycles, scope);
        ctx.check_bound_in(evaluation, Parameter::VolumeLoss, self.volume_loss, scope);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliance::classification::TileClassification;
    use crate::compliance::stages::test_support::run;
    use crate::entities::sample::{Outcome, TestStage};

    #[test]
    fn test_cycles_against_declared_class() {
        let readings = SurfaceReadings {
            pei_class: Some(PeiClass::new(3)),
            abrasion_cycles: Some(700.0),
            volume_loss: None,
        };
        let eval = run(&readings, TestStage::SurfaceQuality, None, None);
        assert_eq!(eval.total_checks(), 2);
        assert_eq!(eval.passed_checks(), 1);
        assert!(eval.details().unwrap().contains("PEI class: CONFORME (PEI III"));
    }

    #[test]
    fn test_pei_zero_fails() {
        let readings = SurfaceReadings {
            pei_class: Some(PeiClass::new(0)),
            ..Default::default()
        };
        let eval = run(&readings, TestStage::SurfaceQuality, None, None);
        assert_eq!(eval.outcome(), Some(Outcome::Fail));
    }

    #[test]
    fn test_cycles_without_class_are_skipped() {
        let readings = SurfaceReadings {
            abrasion_cycles: Some(5000.0),
            ..Default::default()
        };
        let eval = run(&readings, TestStage::SurfaceQuality, None, None);
        assert!(!eval.is_applicable());
    }

    #[test]
    fn test_volume_loss_by_classification() {
        let readings = SurfaceReadings {
            volume_loss: Some(200.0),
            ..Default::default()
        };
        let porcelain = run(&readings, TestStage::SurfaceQuality, None, Some(TileClassification::BIa));
        assert_eq!(porcelain.outcome(), Some(Outcome::Fail));

        let extruded = run(&readings, TestStage::SurfaceQuality, None, Some(TileClassification::AIa));
        assert_eq!(extruded.outcome(), Some(Outcome::Pass));

        let unknown = run(&readings, TestStage::SurfaceQuality, None, None);
        assert!(!unknown.is_applicable());
    }
}

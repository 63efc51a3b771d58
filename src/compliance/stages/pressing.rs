//! Green tile pressing: thickness per format plus visual inspection

use super::{StageContext, StageRules};
use crate::compliance::tolerance::Parameter;
use crate::compliance::Evaluation;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PressingReadings {
    pub thickness: Option<f64>,
    pub visual_defects: Option<String>,
}

impl StageRules for PressingReadings {
    fn has_readings(&self) -> bool {
        self.thickness.is_some() || has_text(self.visual_defects.as_deref())
    }

    // Green weight bands exist in the table but no weight reading is recorded.
    fn evaluate(&self, ctx: &StageContext<'_>, evaluation: &mut Evaluation) {
        ctx.check_bound(evaluation, Parameter::Thickness, self.thickness);
        ctx.scan_defects(evaluation, self.visual_defects.as_deref());
    }
}

pub(super) fn has_text(text: Option<&str>) -> bool {
    text.is_some_and(|t| !t.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliance::stages::test_support::run;
    use crate::entities::batch::{NominalBatchDimensions, ProductFormat};
    use crate::entities::sample::{Outcome, TestStage};

    fn batch(format: ProductFormat) -> NominalBatchDimensions {
        NominalBatchDimensions {
            format: Some(format),
            ..Default::default()
        }
    }

    #[test]
    fn test_thickness_band_follows_format() {
        let readings = PressingReadings {
            thickness: Some(7.3),
            visual_defects: None,
        };
        let wide = batch(ProductFormat::F25x40);
        let eval = run(&readings, TestStage::Pressing, Some(&wide), None);
        assert_eq!(eval.outcome(), Some(Outcome::Pass));

        let small = batch(ProductFormat::F20x20);
        let eval = run(&readings, TestStage::Pressing, Some(&small), None);
        assert_eq!(eval.outcome(), Some(Outcome::Fail));
    }

    #[test]
    fn test_unknown_format_skips_thickness() {
        let readings = PressingReadings {
            thickness: Some(7.0),
            visual_defects: None,
        };
        let eval = run(&readings, TestStage::Pressing, None, None);
        assert!(!eval.is_applicable());
    }

    #[test]
    fn test_defect_keywords() {
        let readings = PressingReadings {
            thickness: None,
            visual_defects: Some("Quelques Fissures en bordure".to_string()),
        };
        let eval = run(&readings, TestStage::Pressing, None, None);
        assert_eq!(eval.total_checks(), 3);
        assert_eq!(eval.passed_checks(), 2);
        assert!(eval.details().unwrap().contains("'fissures' reported"));
    }

    #[test]
    fn test_accented_keyword_is_found() {
        let readings = PressingReadings {
            thickness: None,
            visual_defects: Some("écornage léger".to_string()),
        };
        let eval = run(&readings, TestStage::Pressing, None, None);
        assert_eq!(eval.passed_checks(), 2);
    }

    #[test]
    fn test_blank_notes_are_absent() {
        let readings = PressingReadings {
            thickness: None,
            visual_defects: Some("   ".to_string()),
        };
        assert!(!readings.has_readings());
        let eval = run(&readings, TestStage::Pressing, None, None);
        assert_eq!(eval.total_checks(), 0);
    }
}

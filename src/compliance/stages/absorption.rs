//! Water absorption (ISO 10545-3) and the classification it implies

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{StageContext, StageRules};
use crate::compliance::classification::{classify, FormingMethod};
use crate::compliance::tolerance::Parameter;
use crate::compliance::Evaluation;

/// Verdict label for a water absorption reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsorptionLabel {
    /// Below 9 %
    NonCompliant,
    /// 9 % to 10 % inclusive
    LimitAcceptable,
    /// Above 10 % up to 20 %
    Compliant,
    /// Above 20 %: the manufacturer must declare the value
    DeclarationRequired,
}

impl AbsorptionLabel {
    pub fn for_absorption(water_absorption: f64) -> Self {
        if water_absorption < 9.0 {
            AbsorptionLabel::NonCompliant
        } else if water_absorption <= 10.0 {
            AbsorptionLabel::LimitAcceptable
        } else if water_absorption <= 20.0 {
            AbsorptionLabel::Compliant
        } else {
            AbsorptionLabel::DeclarationRequired
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AbsorptionLabel::NonCompliant => "NON CONFORME",
            AbsorptionLabel::LimitAcceptable => "LIMITE ACCEPTABLE",
            AbsorptionLabel::Compliant => "CONFORME",
            AbsorptionLabel::DeclarationRequired => "DECLARATION FABRICANT REQUISE",
        }
    }
}

impl fmt::Display for AbsorptionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AbsorptionReadings {
    /// Water absorption E (%)
    pub water_absorption: Option<f64>,
    pub forming_method: FormingMethod,
}

impl StageRules for AbsorptionReadings {
    fn has_readings(&self) -> bool {
        self.water_absorption.is_some()
    }

    fn evaluate(&self, ctx: &StageContext<'_>, evaluation: &mut Evaluation) {
        let Some(e) = self.water_absorption else {
            return;
        };
        evaluation.classification = classify(Some(e), self.forming_method);
        evaluation.absorption_label = Some(AbsorptionLabel::for_absorption(e));
        ctx.check_bound(evaluation, Parameter::WaterAbsorption, Some(e));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliance::classification::{AbsorptionGroup, TileClassification};
    use crate::compliance::stages::test_support::run;
    use crate::entities::sample::{Outcome, TestStage};

    fn readings(e: f64) -> AbsorptionReadings {
        AbsorptionReadings {
            water_absorption: Some(e),
            forming_method: FormingMethod::Pressed,
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(AbsorptionLabel::for_absorption(8.99), AbsorptionLabel::NonCompliant);
        assert_eq!(AbsorptionLabel::for_absorption(9.0), AbsorptionLabel::LimitAcceptable);
        assert_eq!(AbsorptionLabel::for_absorption(10.0), AbsorptionLabel::LimitAcceptable);
        assert_eq!(AbsorptionLabel::for_absorption(15.0), AbsorptionLabel::Compliant);
        assert_eq!(AbsorptionLabel::for_absorption(20.0), AbsorptionLabel::Compliant);
        assert_eq!(
            AbsorptionLabel::for_absorption(20.5),
            AbsorptionLabel::DeclarationRequired
        );
    }

    #[test]
    fn test_limit_acceptable_still_passes() {
        let eval = run(&readings(9.5), TestStage::WaterAbsorption, None, None);
        assert_eq!(eval.outcome(), Some(Outcome::Pass));
        assert_eq!(eval.absorption_label, Some(AbsorptionLabel::LimitAcceptable));
        let c = eval.classification.unwrap();
        assert_eq!(c.group, AbsorptionGroup::B);
        assert_eq!(c.code, TileClassification::BIIc);
    }

    #[test]
    fn test_low_absorption_fails_but_classifies() {
        let eval = run(&readings(0.3), TestStage::WaterAbsorption, None, None);
        assert_eq!(eval.outcome(), Some(Outcome::Fail));
        assert_eq!(eval.absorption_label, Some(AbsorptionLabel::NonCompliant));
        assert_eq!(eval.classification.unwrap().code, TileClassification::BIa);
    }

    #[test]
    fn test_extruded_classification() {
        let extruded = AbsorptionReadings {
            water_absorption: Some(4.0),
            forming_method: FormingMethod::Extruded,
        };
        let eval = run(&extruded, TestStage::WaterAbsorption, None, None);
        assert_eq!(eval.classification.unwrap().code, TileClassification::AIIb);
    }

    #[test]
    fn test_missing_reading_leaves_classification_empty() {
        let eval = run(&AbsorptionReadings::default(), TestStage::WaterAbsorption, None, None);
        assert!(eval.classification.is_none());
        assert!(eval.absorption_label.is_none());
        assert!(!eval.is_applicable());
    }
}

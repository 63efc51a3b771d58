//! Bisque firing: thermal shock, dimensional change, loss on ignition and
//! visual inspection

use super::pressing::has_text;
use super::{StageContext, StageRules};
use crate::compliance::tolerance::Parameter;
use crate::compliance::Evaluation;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BisqueReadings {
    /// Whether the tile survived thermal cycling without cracking
    pub thermal_shock: Option<bool>,
    pub shrinkage_expansion: Option<f64>,
    pub loss_on_ignition: Option<f64>,
    pub visual_defects: Option<String>,
}

impl StageRules for BisqueReadings {
    fn has_readings(&self) -> bool {
        self.thermal_shock.is_some()
            || self.shrinkage_expansion.is_some()
            || self.loss_on_ignition.is_some()
            || has_text(self.visual_defects.as_deref())
    }

    fn evaluate(&self, ctx: &StageContext<'_>, evaluation: &mut Evaluation) {
        if let Some(survived) = self.thermal_shock {
            let detail = if survived {
                "no cracking after thermal cycling"
            } else {
                "cracked after thermal cycling"
            };
            evaluation
                .scorecard
                .record(Parameter::ThermalShock, survived, detail);
        }
        ctx.check_bound(evaluation, Parameter::ShrinkageExpansion, self.shrinkage_expansion);
        ctx.check_bound(evaluation, Parameter::LossOnIgnition, self.loss_on_ignition);
        ctx.scan_defects(evaluation, self.visual_defects.as_deref());
    }
}

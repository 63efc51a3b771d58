use super::{StageContext, StageRules};
use crate::compliance::tolerance::Parameter;
use crate::compliance::Evaluation;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DryingReadings {
    /// Residual humidity after the dryer (%)
    pub residual_humidity: Option<f64>,
}

impl StageRules for DryingReadings {
    fn has_readings(&self) -> bool {
        self.residual_humidity.is_some()
    }

    fn evaluate(&self, ctx: &StageContext<'_>, evaluation: &mut Evaluation) {
        ctx.check_bound(evaluation, Parameter::ResidualHumidity, self.residual_humidity);
    }
}

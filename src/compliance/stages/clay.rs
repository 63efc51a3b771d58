//! Raw clay preparation: humidity at each handling point, granulometry and
//! carbonate content

use super::{StageContext, StageRules};
use crate::compliance::tolerance::Parameter;
use crate::compliance::Evaluation;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClayReadings {
    pub humidity_crusher: Option<f64>,
    pub humidity_hopper: Option<f64>,
    pub humidity_silo: Option<f64>,
    pub humidity_press: Option<f64>,
    pub granulometry_refusal: Option<f64>,
    pub carbonate: Option<f64>,
}

impl StageRules for ClayReadings {
    fn has_readings(&self) -> bool {
        [
            self.humidity_crusher,
            self.humidity_hopper,
            self.humidity_silo,
            self.humidity_press,
            self.granulometry_refusal,
            self.carbonate,
        ]
        .iter()
        .any(Option::is_some)
    }

    fn evaluate(&self, ctx: &StageContext<'_>, evaluation: &mut Evaluation) {
        ctx.check_bound(evaluation, Parameter::ClayHumidityCrusher, self.humidity_crusher);
        ctx.check_bound(evaluation, Parameter::ClayHumidityHopper, self.humidity_hopper);
        ctx.check_bound(evaluation, Parameter::ClayHumiditySilo, self.humidity_silo);
        ctx.check_bound(evaluation, Parameter::ClayHumidityPress, self.humidity_press);
        ctx.check_bound(evaluation, Parameter::GranulometryRefusal, self.granulometry_refusal);
        ctx.check_bound(evaluation, Parameter::Carbonate, self.carbonate);
    }
}

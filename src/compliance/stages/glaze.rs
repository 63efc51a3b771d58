use super::{StageContext, StageRules};
use crate::compliance::tolerance::Parameter;
use crate::compliance::Evaluation;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlazeReadings {
    /// Slip density (g/l)
    pub density: Option<f64>,
    /// Flow cup viscosity (s)
    pub viscosity: Option<f64>,
    /// Refusal on the 45µ sieve (ml)
    pub refusal: Option<f64>,
}

impl StageRules for GlazeReadings {
    fn has_readings(&self) -> bool {
        self.density.is_some() || self.viscosity.is_some() || self.refusal.is_some()
    }

    fn evaluate(&self, ctx: &StageContext<'_>, evaluation: &mut Evaluation) {
        ctx.check_bound(evaluation, Parameter::GlazeDensity, self.density);
        ctx.check_bound(evaluation, Parameter::GlazeViscosity, self.viscosity);
        ctx.check_bound(evaluation, Parameter::GlazeRefusal, self.refusal);
    }
}

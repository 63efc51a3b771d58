//! Breaking strength (ISO 10545-4)
//!
//! Force and modulus thresholds both depend on tile thickness. The modulus
//! is computed from the breaking force when the sample or its batch gives
//! the full geometry; otherwise the recorded modulus is checked. Default
//! nominal dimensions only pick the thickness threshold, never the modulus.

use super::{StageContext, StageRules};
use crate::compliance::flexural::flexural_strength;
use crate::compliance::tolerance::Parameter;
use crate::compliance::Evaluation;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrengthReadings {
    /// Breaking force (N)
    pub breaking_force: Option<f64>,
    /// Recorded modulus of rupture (N/mm²)
    pub breaking_strength: Option<f64>,
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub thickness: Option<f64>,
}

impl StageRules for StrengthReadings {
    fn has_readings(&self) -> bool {
        self.breaking_force.is_some() || self.breaking_strength.is_some()
    }

    fn evaluate(&self, ctx: &StageContext<'_>, evaluation: &mut Evaluation) {
        if !self.has_readings() {
            return;
        }

        let declared = ctx.declared_nominal();
        let computed = flexural_strength(
            self.breaking_force,
            self.length.or(declared.length),
            self.width.or(declared.width),
            self.thickness.or(declared.thickness),
        );
        evaluation.flexural_strength = computed;

        let thickness = self.thickness.or_else(|| ctx.nominal().thickness);
        let scope = ctx.scope().with_thickness(thickness);
        ctx.check_bound_in(evaluation, Parameter::BreakingForce, self.breaking_force, scope);
        ctx.check_bound_in(
            evaluation,
            Parameter::BreakingStrength,
            computed.or(self.breaking_strength),
            scope,
        );
    }
}

//! Dimensional and surface geometry (ISO 10545-2)
//!
//! Length, width and thickness are compared with the batch nominal
//! dimensions; the remaining readings are percentages or millimetres
//! checked directly against the classification's limits.

use super::{StageContext, StageRules};
use crate::compliance::tolerance::Parameter;
use crate::compliance::Evaluation;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DimensionalReadings {
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub thickness: Option<f64>,
    pub straightness: Option<f64>,
    pub flatness: Option<f64>,
    pub rectangularity: Option<f64>,
    pub central_curvature: Option<f64>,
    pub lateral_curvature: Option<f64>,
    pub angularity: Option<f64>,
    pub warping: Option<f64>,
}

impl DimensionalReadings {
    fn has_measured_size(&self) -> bool {
        self.length.is_some() || self.width.is_some() || self.thickness.is_some()
    }
}

impl StageRules for DimensionalReadings {
    fn has_readings(&self) -> bool {
        self.has_measured_size()
            || [
                self.straightness,
                self.flatness,
                self.rectangularity,
                self.central_curvature,
                self.lateral_curvature,
                self.angularity,
                self.warping,
            ]
            .iter()
            .any(Option::is_some)
    }

    fn evaluate(&self, ctx: &StageContext<'_>, evaluation: &mut Evaluation) {
        if self.has_measured_size() {
            let nominal = ctx.nominal();
            ctx.check_dimension(evaluation, Parameter::Length, self.length, nominal.length);
            ctx.check_dimension(evaluation, Parameter::Width, self.width, nominal.width);
            ctx.check_dimension(evaluation, Parameter::Thickness, self.thickness, nominal.thickness);
        }

        ctx.check_bound(evaluation, Parameter::Straightness, self.straightness);
        ctx.check_bound(evaluation, Parameter::Flatness, self.flatness);
        ctx.check_bound(evaluation, Parameter::Rectangularity, self.rectangularity);
        ctx.check_bound(evaluation, Parameter::CentralCurvature, self.central_curvature);
        ctx.check_bound(evaluation, Parameter::LateralCurvature, self.lateral_curvature);
        ctx.check_bound(evaluation, Parameter::Angularity, self.angularity);
        ctx.check_bound(evaluation, Parameter::Warping, self.warping);
    }
}

//! Aggregate scoring of individual parameter checks

use serde::{Deserialize, Serialize};

use crate::compliance::tolerance::{DeviationCheck, DeviationTolerance, Parameter, ToleranceSpec};
use crate::entities::sample::Outcome;

/// Verdict label for a compliant check
pub const CONFORME: &str = "CONFORME";

/// Verdict label for a non-compliant check
pub const NON_CONFORME: &str = "NON CONFORME";

/// Separator between check lines in the details string
pub const DETAIL_SEPARATOR: &str = " | ";

/// The outcome of a single parameter check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Check {
    pub parameter: Parameter,
    pub compliant: bool,
    /// Measured value and applicable bound(s)
    pub detail: String,
}

impl Check {
    pub fn verdict_label(&self) -> &'static str {
        if self.compliant {
            CONFORME
        } else {
            NON_CONFORME
        }
    }

    /// Format as `<label>: <verdict> (<detail>)`
    pub fn line(&self) -> String {
        format!(
            "{}: {} ({})",
            self.parameter.label(),
            self.verdict_label(),
            self.detail
        )
    }
}

/// Accumulates checks for one evaluation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scorecard {
    checks: Vec<Check>,
}

impl Scorecard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a check result
    pub fn record(&mut self, parameter: Parameter, compliant: bool, detail: impl Into<String>) {
        self.checks.push(Check {
            parameter,
            compliant,
            detail: detail.into(),
        });
    }

    /// Check a value against a direct bound and record the result
    pub fn check_bound(&mut self, parameter: Parameter, value: f64, spec: &ToleranceSpec) -> bool {
        let compliant = spec.contains(value);
        let unit = if spec.unit.is_empty() {
            String::new()
        } else {
            format!(" {}", spec.unit)
        };
        self.record(
            parameter,
            compliant,
            format!("{:.2}{}, {}", value, unit, spec.describe()),
        );
        compliant
    }

    /// Check a measured dimension against its nominal value and record the result
    pub fn check_deviation(
        &mut self,
        parameter: Parameter,
        measured: f64,
        nominal: f64,
        tolerance: &DeviationTolerance,
    ) -> DeviationCheck {
        let check = tolerance.check(measured, nominal);
        self.record(
            parameter,
            check.compliant,
            format!(
                "{:.2} mm vs nominal {:.2} mm, deviation {:+.2} % / {:+.2} mm, {}",
                measured,
                nominal,
                check.deviation_pct,
                check.deviation_mm,
                tolerance.describe()
            ),
        );
        check
    }

    pub fn checks(&self) -> &[Check] {
        &self.checks
    }

    pub fn total(&self) -> usize {
        self.checks.len()
    }

    pub fn passed(&self) -> usize {
        self.checks.iter().filter(|c| c.compliant).count()
    }

    /// Whether any check ran at all
    pub fn is_evaluable(&self) -> bool {
        !self.checks.is_empty()
    }

    /// Compliance score (0-100), `None` when nothing could be evaluated
    pub fn score(&self) -> Option<f64> {
        if self.checks.is_empty() {
            return None;
        }
        Some(self.passed() as f64 / self.total() as f64 * 100.0)
    }

    /// Overall outcome: pass only if every check passed
    pub fn outcome(&self) -> Option<Outcome> {
        if self.checks.is_empty() {
            return None;
        }
        if self.passed() == self.total() {
            Some(Outcome::Pass)
        } else {
            Some(Outcome::Fail)
        }
    }

    /// Check lines joined with ` | `
    pub fn details(&self) -> Option<String> {
        if self.checks.is_empty() {
            return None;
        }
        Some(
            self.checks
                .iter()
                .map(Check::line)
                .collect::<Vec<_>>()
                .join(DETAIL_SEPARATOR),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_scorecard_is_not_evaluable() {
        let card = Scorecard::new();
        assert!(!card.is_evaluable());
        assert_eq!(card.total(), 0);
        assert!(card.score().is_none());
        assert!(card.outcome().is_none());
        assert!(card.details().is_none());
    }

    #[test]
    fn test_score_and_outcome() {
        let mut card = Scorecard::new();
        card.record(Parameter::ClayHumidityHopper, true, "ok");
        card.record(Parameter::ClayHumiditySilo, false, "too wet");
        assert_eq!(card.total(), 2);
        assert_eq!(card.passed(), 1);
        assert_eq!(card.score(), Some(50.0));
        assert_eq!(card.outcome(), Some(Outcome::Fail));

        let mut all_good = Scorecard::new();
        all_good.record(Parameter::Carbonate, true, "ok");
        assert_eq!(all_good.score(), Some(100.0));
        assert_eq!(all_good.outcome(), Some(Outcome::Pass));
    }

    #[test]
    fn test_detail_lines() {
        let mut card = Scorecard::new();
        let spec = ToleranceSpec::range("Hopper humidity", 2.5, 4.1, "%");
        assert!(card.check_bound(Parameter::ClayHumidityHopper, 3.0, &spec));
        let spec = ToleranceSpec::range("Silo humidity", 5.3, 6.3, "%");
        assert!(!card.check_bound(Parameter::ClayHumiditySilo, 7.0, &spec));

        assert_eq!(
            card.details().unwrap(),
            "Hopper humidity: CONFORME (3.00 %, range 2.50-4.10 %) | \
             Silo humidity: NON CONFORME (7.00 %, range 5.30-6.30 %)"
        );
    }

    #[test]
    fn test_deviation_line() {
        let mut card = Scorecard::new();
        let tol = DeviationTolerance { pct: 0.5, mm: 2.0 };
        let check = card.check_deviation(Parameter::Length, 202.5, 200.0, &tol);
        assert!(!check.compliant);
        let line = card.checks()[0].line();
        assert!(line.starts_with("Length: NON CONFORME"));
        assert!(line.contains("+1.25 %"));
        assert!(line.contains("+2.50 mm"));
    }
}

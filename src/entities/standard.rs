//! Reference standards catalog
//!
//! Rows describe the ISO / national standards the laboratory works to. A row
//! bound to a stage and parameter replaces the built-in bound for that
//! check; unbound rows are reference information only.

use serde::{Deserialize, Serialize};

use crate::compliance::tolerance::{BuiltinTolerances, Parameter, Scope, Tolerance, ToleranceSource, ToleranceSpec};
use crate::entities::sample::TestStage;

/// One standards catalog row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsoStandard {
    /// Standard code, e.g. "ISO 10545-3"
    pub code: String,

    pub title: String,

    pub category: String,

    /// Stage this row constrains
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<TestStage>,

    /// Parameter this row constrains
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<Parameter>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_threshold: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_threshold: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Inactive rows are ignored
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl IsoStandard {
    fn reference(code: &str, title: &str, category: &str, description: &str) -> Self {
        Self {
            code: code.to_string(),
            title: title.to_string(),
            category: category.to_string(),
            stage: None,
            parameter: None,
            min_threshold: None,
            max_threshold: None,
            unit: None,
            description: Some(description.to_string()),
            active: true,
        }
    }

    /// Whether this row replaces the built-in bound for `(stage, parameter)`
    pub fn overrides(&self, stage: TestStage, parameter: Parameter) -> bool {
        self.active
            && self.stage == Some(stage)
            && self.parameter == Some(parameter)
            && (self.min_threshold.is_some() || self.max_threshold.is_some())
    }

    pub fn spec(&self) -> ToleranceSpec {
        ToleranceSpec {
            name: self
                .parameter
                .map(|p| p.label().to_string())
                .unwrap_or_else(|| self.code.clone()),
            min: self.min_threshold,
            max: self.max_threshold,
            unit: self.unit.clone().unwrap_or_default(),
        }
    }

    /// Threshold summary for listings, e.g. "0.00-20.00 %"
    pub fn threshold(&self) -> String {
        let unit = self
            .unit
            .as_deref()
            .map(|u| format!(" {}", u))
            .unwrap_or_default();
        match (self.min_threshold, self.max_threshold) {
            (Some(min), Some(max)) => format!("{:.2}-{:.2}{}", min, max, unit),
            (Some(min), None) => format!(">= {:.2}{}", min, unit),
            (None, Some(max)) => format!("<= {:.2}{}", max, unit),
            (None, None) => "-".to_string(),
        }
    }
}

/// The catalog seeded by `cqt init`
pub fn default_catalog() -> Vec<IsoStandard> {
    let mut absorption = IsoStandard::reference(
        "ISO 10545-3",
        "Carreaux et dalles céramiques - Détermination de l'absorption d'eau",
        "Physical Properties",
        "Méthode d'essai pour déterminer l'absorption d'eau",
    );
    absorption.min_threshold = Some(0.0);
    absorption.max_threshold = Some(20.0);
    absorption.unit = Some("%".to_string());

    let mut breaking = IsoStandard::reference(
        "ISO 10545-4",
        "Carreaux et dalles céramiques - Détermination de la résistance à la rupture",
        "Mechanical Properties",
        "Méthode d'essai pour la résistance à la flexion",
    );
    breaking.min_threshold = Some(600.0);
    breaking.unit = Some("N".to_string());

    vec![
        IsoStandard::reference(
            "ISO 13006",
            "Carreaux et dalles céramiques - Définitions, classification, caractéristiques et marquage",
            "Classification",
            "Norme principale pour la classification des carreaux céramiques",
        ),
        absorption,
        breaking,
        IsoStandard::reference(
            "ISO 10545-7",
            "Carreaux et dalles céramiques - Détermination de la résistance à l'abrasion",
            "Surface Properties",
            "Classification PEI pour la résistance à l'abrasion",
        ),
        IsoStandard::reference(
            "NM 10.1.008",
            "Carreaux céramiques - Spécifications marocaines",
            "National Standards",
            "Normes marocaines pour les carreaux céramiques",
        ),
    ]
}

/// Standards catalog layered over the built-in tolerance table
#[derive(Debug, Clone, Default)]
pub struct StandardCatalog {
    rows: Vec<IsoStandard>,
}

impl StandardCatalog {
    pub fn new(rows: Vec<IsoStandard>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[IsoStandard] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<IsoStandard> {
        self.rows
    }

    /// Active rows matching every given filter (case-insensitive on text)
    pub fn active_rows(
        &self,
        code: Option<&str>,
        category: Option<&str>,
        stage: Option<TestStage>,
    ) -> Vec<&IsoStandard> {
        self.rows
            .iter()
            .filter(|r| r.active)
            .filter(|r| code.map_or(true, |c| r.code.eq_ignore_ascii_case(c)))
            .filter(|r| category.map_or(true, |c| r.category.eq_ignore_ascii_case(c)))
            .filter(|r| stage.map_or(true, |s| r.stage == Some(s)))
            .collect()
    }
}

impl ToleranceSource for StandardCatalog {
    /// Catalog bounds replace built-in bounds; nominal-deviation tolerances
    /// always come from the built-in table
    fn tolerance(&self, stage: TestStage, parameter: Parameter, scope: Scope<'_>) -> Option<Tolerance> {
        let builtin = BuiltinTolerances.tolerance(stage, parameter, scope);
        if matches!(builtin, Some(Tolerance::Deviation(_))) {
            return builtin;
        }

        match self.rows.iter().find(|r| r.overrides(stage, parameter)) {
            Some(row) => {
                tracing::debug!(code = %row.code, %stage, %parameter, "catalog bound overrides built-in");
                Some(Tolerance::Bound(row.spec()))
            }
            None => builtin,
        }
    }
}

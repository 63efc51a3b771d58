//! Compliance engine behaviour through the public library API

use chrono::NaiveDate;
use cqt::compliance::{
    classify, evaluate, flexural_strength, AbsorptionGroup, BuiltinTolerances, EngineDefaults,
    FormingMethod, ReferenceData, TileClassification,
};
use cqt::core::{RecordId, RecordPrefix};
use cqt::entities::{
    default_catalog, NominalBatchDimensions, Outcome, ProductFormat, SampleMeasurement,
    StandardCatalog, TestStage,
};

fn sample(stage: TestStage) -> SampleMeasurement {
    let date = NaiveDate::from_ymd_opt(2025, 1, 24).unwrap();
    SampleMeasurement::new(
        RecordId::new(RecordPrefix::Samp, date, 1),
        "LOT20250124001",
        stage,
        "lab",
    )
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

// ----- classification -----

#[test]
fn classification_boundaries_belong_to_lower_bucket() {
    let pressed = |e: f64| classify(Some(e), FormingMethod::Pressed).unwrap();

    let c = pressed(0.5);
    assert_eq!(c.group, AbsorptionGroup::A);
    assert_eq!(c.code, TileClassification::BIa);

    let c = pressed(3.0);
    assert_eq!(c.group, AbsorptionGroup::B);
    assert_eq!(c.code, TileClassification::BIIa);

    let c = pressed(10.0);
    assert_eq!(c.group, AbsorptionGroup::B);
    assert_eq!(c.code, TileClassification::BIIc);

    assert_eq!(pressed(10.01).code, TileClassification::BIII);
    assert_eq!(pressed(10.01).group, AbsorptionGroup::C);
}

#[test]
fn classification_covers_every_value_exactly_once() {
    let mut e = 0.0;
    let mut previous = TileClassification::BIa;
    while e <= 30.0 {
        let c = classify(Some(e), FormingMethod::Pressed).unwrap();
        let rank = |code: TileClassification| {
            TileClassification::all()
                .iter()
                .position(|c| *c == code)
                .unwrap()
        };
        // Codes never go back down as absorption rises
        assert!(rank(c.code) >= rank(previous), "E={} gave {}", e, c.code);
        assert_eq!(c.code.forming_method(), FormingMethod::Pressed);
        previous = c.code;
        e += 0.25;
    }
    assert!(classify(None, FormingMethod::Pressed).is_none());
}

#[test]
fn extruded_tiles_use_a_codes() {
    let c = classify(Some(4.0), FormingMethod::Extruded).unwrap();
    assert_eq!(c.code, TileClassification::AIIb);
    assert_eq!(c.code.forming_method(), FormingMethod::Extruded);
}

// ----- flexural strength -----

#[test]
fn flexural_reference_values_and_scaling() {
    let base = flexural_strength(Some(1000.0), Some(300.0), Some(150.0), Some(10.0)).unwrap();
    assert!(approx(base, 27.0));

    let doubled = flexural_strength(Some(2000.0), Some(300.0), Some(150.0), Some(10.0)).unwrap();
    assert!(approx(doubled, 2.0 * base));

    let thinner = flexural_strength(Some(1000.0), Some(300.0), Some(150.0), Some(5.0)).unwrap();
    assert!(approx(thinner, 4.0 * base));

    assert!(flexural_strength(Some(1000.0), Some(300.0), Some(0.0), Some(10.0)).is_none());
    assert!(flexural_strength(None, Some(300.0), Some(150.0), Some(10.0)).is_none());
}

// ----- evaluation -----

#[test]
fn evaluation_is_idempotent() {
    let defaults = EngineDefaults::default();
    let reference = ReferenceData::new(&BuiltinTolerances, &defaults);

    let mut s = sample(TestStage::WaterAbsorption);
    s.water_absorption = Some(12.0);

    let first = evaluate(&s, &reference);
    s.apply(&first);
    let snapshot = s.clone();

    let second = evaluate(&s, &reference);
    s.apply(&second);

    assert_eq!(first, second);
    assert_eq!(s, snapshot);
    assert_eq!(s.tile_classification, Some(TileClassification::BIII));
    assert_eq!(s.result, Some(Outcome::Pass));
}

#[test]
fn sample_without_relevant_readings_is_not_evaluable() {
    let defaults = EngineDefaults::default();
    let reference = ReferenceData::new(&BuiltinTolerances, &defaults);

    for stage in TestStage::all() {
        let mut s = sample(*stage);
        // Readings for another stage do not count
        s.glaze_density = if *stage == TestStage::GlazeTesting { None } else { Some(1800.0) };

        let evaluation = evaluate(&s, &reference);
        assert_eq!(evaluation.total_checks(), 0, "stage {}", stage);
        assert!(!evaluation.is_applicable());

        s.apply(&evaluation);
        assert!(s.result.is_none());
        assert!(s.compliance_score.is_none());
        assert!(s.compliance_details.is_none());
    }
}

#[test]
fn thick_tile_force_below_minimum_fails_independently_of_modulus() {
    let defaults = EngineDefaults::default();
    let reference = ReferenceData::new(&BuiltinTolerances, &defaults);

    let mut s = sample(TestStage::BreakingStrength);
    s.breaking_force = Some(550.0);
    s.length = Some(300.0);
    s.width = Some(100.0);
    s.thickness = Some(8.0);

    let evaluation = evaluate(&s, &reference);
    assert_eq!(evaluation.total_checks(), 2);
    assert_eq!(evaluation.passed_checks(), 1);
    assert_eq!(evaluation.outcome(), Some(Outcome::Fail));

    let details = evaluation.details().unwrap();
    assert!(details.contains("Breaking force: NON CONFORME"));
    assert!(details.contains("Breaking strength: CONFORME"));
}

#[test]
fn dimensional_deviation_beyond_both_limits_fails() {
    let defaults = EngineDefaults::default();
    let batch = NominalBatchDimensions {
        length: Some(200.0),
        ..NominalBatchDimensions::default()
    };
    let reference = ReferenceData::new(&BuiltinTolerances, &defaults).with_batch(Some(&batch));

    let mut s = sample(TestStage::Dimensional);
    s.length = Some(202.5);

    let evaluation = evaluate(&s, &reference);
    assert_eq!(evaluation.total_checks(), 1);
    assert_eq!(evaluation.outcome(), Some(Outcome::Fail));
    let details = evaluation.details().unwrap();
    assert!(details.starts_with("Length: NON CONFORME"));
    assert!(details.contains("+1.25 %"));
    assert!(details.contains("+2.50 mm"));
}

#[test]
fn clay_sample_with_one_out_of_range_humidity_scores_half() {
    let defaults = EngineDefaults::default();
    let reference = ReferenceData::new(&BuiltinTolerances, &defaults);

    let mut s = sample(TestStage::ClayTesting);
    s.clay_humidity_hopper = Some(3.0);
    s.clay_humidity_silo = Some(7.0);

    let evaluation = evaluate(&s, &reference);
    s.apply(&evaluation);

    assert_eq!(s.compliance_score, Some(50.0));
    assert_eq!(s.result, Some(Outcome::Fail));
    assert_eq!(
        s.compliance_details.as_deref(),
        Some(
            "Hopper humidity: CONFORME (3.00 %, range 2.50-4.10 %) | \
             Silo humidity: NON CONFORME (7.00 %, range 5.30-6.30 %)"
        )
    );
}

#[test]
fn pressing_thickness_follows_the_batch_format() {
    let defaults = EngineDefaults::default();
    let batch = NominalBatchDimensions {
        format: Some(ProductFormat::F25x40),
        ..NominalBatchDimensions::default()
    };
    let reference = ReferenceData::new(&BuiltinTolerances, &defaults).with_batch(Some(&batch));

    let mut s = sample(TestStage::Pressing);
    s.thickness = Some(7.3);
    assert_eq!(evaluate(&s, &reference).outcome(), Some(Outcome::Pass));

    s.thickness = Some(7.5);
    assert_eq!(evaluate(&s, &reference).outcome(), Some(Outcome::Fail));

    // Without a known format the thickness check cannot run
    let unknown = ReferenceData::new(&BuiltinTolerances, &defaults);
    assert_eq!(evaluate(&s, &unknown).total_checks(), 0);
}

#[test]
fn seeded_catalog_changes_no_builtin_verdicts() {
    let defaults = EngineDefaults::default();
    let catalog = StandardCatalog::new(default_catalog());
    let builtin = ReferenceData::new(&BuiltinTolerances, &defaults);
    let layered = ReferenceData::new(&catalog, &defaults);

    let mut s = sample(TestStage::Drying);
    s.residual_humidity = Some(1.2);
    assert_eq!(evaluate(&s, &builtin), evaluate(&s, &layered));
}
